use crate::profile::ProfileRecord;
use crate::workflow::types::{OutcomeRecord, Tally};

/// Upper bound on the length of a generated outreach message, in words.
pub const MAX_MESSAGE_WORDS: usize = 150;

pub fn system_prompt_for_decision() -> String {
    format!(
        r#"You are an assistant for LinkedIn outreach. Decide whether a member is a good fit for outreach given the outreach goal and their profile.

If they are a good fit, choose `send_message` or `send_connection` and write a personalized message. Otherwise choose `skip`.

Respond ONLY in this format:
ACTION: <send_message | send_connection | skip>
REASON: <one sentence explaining the decision>
MESSAGE: <the personalized message, on a single line; omit when skipping>

## Guidelines
- Work the goal's keywords in naturally and reference concrete profile details.
- Keep messages professional and concise (max {MAX_MESSAGE_WORDS} words).
- Do not invent facts that are not in the profile."#
    )
}

pub fn user_prompt_for_profile(query: &str, profile: &ProfileRecord) -> String {
    let mut prompt = format!(
        "Outreach goal: {query}\n\nProfile:\nName: {}\nHeadline: {}\nCompany: {}\nDesignation: {}\nURL: {}\n",
        profile.name, profile.headline, profile.company, profile.designation, profile.url
    );

    if !profile.summary.is_empty() {
        prompt.push_str(&format!("Experience summary: {}\n", profile.summary));
    }
    if !profile.skills.is_empty() {
        prompt.push_str(&format!("Skills: {}\n", profile.skills.join(", ")));
    }

    prompt.push_str("\nWhat action should be taken, and what message should be sent (if any)?");
    prompt
}

pub fn system_prompt_for_summary() -> String {
    r#"You are an assistant summarizing the results of a LinkedIn outreach session.
Write a concise summary of the profiles reviewed and the actions taken.
Include the key statistics and any notable patterns in who was contacted or skipped."#
        .to_string()
}

pub fn user_prompt_for_summary(query: &str, outcomes: &[OutcomeRecord], tally: &Tally) -> String {
    let rows = outcomes
        .iter()
        .map(|o| {
            format!(
                "- {} | {} | action: {} | final: {}{}",
                o.profile.name,
                o.profile.headline,
                o.decision.action,
                o.status,
                o.decision
                    .reason
                    .as_deref()
                    .map(|r| format!(" | reason: {r}"))
                    .unwrap_or_default()
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "Outreach goal: {query}\n\nResults:\n{rows}\n\nTotal profiles: {}\nMessages sent: {}\nConnections requested: {}\nSkipped: {}\nRejected: {}\n\nPlease summarize the results.",
        tally.total, tally.messages_sent, tally.connections_requested, tally.skipped, tally.rejected
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_prompt_includes_optional_sections_only_when_present() {
        let bare = ProfileRecord::unresolved("https://x/in/a").with_name("A");
        let prompt = user_prompt_for_profile("rust devs", &bare);
        assert!(prompt.contains("Outreach goal: rust devs"));
        assert!(prompt.contains("Name: A"));
        assert!(!prompt.contains("Skills:"));

        let rich = bare
            .with_summary("Built a compiler")
            .with_skills(vec!["Rust".to_string(), "LLVM".to_string()]);
        let prompt = user_prompt_for_profile("rust devs", &rich);
        assert!(prompt.contains("Experience summary: Built a compiler"));
        assert!(prompt.contains("Skills: Rust, LLVM"));
    }

    #[test]
    fn test_decision_prompt_states_word_limit() {
        assert!(system_prompt_for_decision().contains("max 150 words"));
    }
}
