pub mod claude;
pub mod llm;
pub mod prompt;

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::profile::ProfileRecord;

pub use llm::LlmOracle;

/// Outreach action proposed for one profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    SendMessage,
    SendConnection,
    Skip,
}

impl Action {
    /// Parse an `ACTION:` value. Anything unrecognised is `Skip`.
    pub fn parse(value: &str) -> Self {
        let normalized = value
            .trim()
            .trim_matches(|c: char| c == '\'' || c == '"' || c == '`' || c == '*')
            .to_ascii_lowercase()
            .replace([' ', '-'], "_");

        match normalized.as_str() {
            "send_message" => Action::SendMessage,
            "send_connection" | "send_connection_request" => Action::SendConnection,
            _ => Action::Skip,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Action::SendMessage => "send_message",
            Action::SendConnection => "send_connection",
            Action::Skip => "skip",
        }
    }

    /// Whether this action reaches the approval gate.
    pub fn is_outbound(&self) -> bool {
        !matches!(self, Action::Skip)
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The oracle's verdict for one profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Decision {
    pub action: Action,
    #[serde(default)]
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl Decision {
    pub fn skip(reason: impl Into<String>) -> Self {
        Self {
            action: Action::Skip,
            message: String::new(),
            reason: Some(reason.into()),
        }
    }

    pub fn send_message(message: impl Into<String>) -> Self {
        Self {
            action: Action::SendMessage,
            message: message.into(),
            reason: None,
        }
    }

    pub fn send_connection(message: impl Into<String>) -> Self {
        Self {
            action: Action::SendConnection,
            message: message.into(),
            reason: None,
        }
    }

    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }
}

/// Parse a line-oriented `ACTION:` / `MESSAGE:` / `REASON:` response.
///
/// The first line starting with each label wins. A missing `ACTION:` yields
/// `skip`, a missing `MESSAGE:` yields an empty message, and a skip never
/// carries a message.
pub fn parse_decision(response: &str) -> Decision {
    let action = field(response, "ACTION:").map(Action::parse).unwrap_or(Action::Skip);
    let message = match action {
        Action::Skip => String::new(),
        _ => field(response, "MESSAGE:").unwrap_or_default().to_string(),
    };
    let reason = field(response, "REASON:")
        .filter(|r| !r.is_empty())
        .map(str::to_string);

    Decision {
        action,
        message,
        reason,
    }
}

fn field<'a>(response: &'a str, label: &str) -> Option<&'a str> {
    response
        .lines()
        .map(str::trim)
        .find_map(|line| line.strip_prefix(label))
        .map(str::trim)
}

/// Maps a profile and the outreach goal to a decision.
#[async_trait]
pub trait DecisionOracle: Send + Sync {
    async fn decide(&self, query: &str, profile: &ProfileRecord) -> Result<Decision>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_response() {
        let decision = parse_decision(
            "ACTION: send_message\nREASON: Works on distributed AI\nMESSAGE: Hi Jane, loved your talk.",
        );
        assert_eq!(
            decision,
            Decision::send_message("Hi Jane, loved your talk.").with_reason("Works on distributed AI")
        );
    }

    #[test]
    fn test_missing_action_defaults_to_skip() {
        let decision = parse_decision("MESSAGE: Hello there\nThis person looks great.");
        assert_eq!(decision.action, Action::Skip);
        assert_eq!(decision.message, "");
        assert_eq!(decision.reason, None);
    }

    #[test]
    fn test_unknown_action_is_skip() {
        let decision = parse_decision("ACTION: endorse\nMESSAGE: hi");
        assert_eq!(decision.action, Action::Skip);
        assert_eq!(decision.message, "");
    }

    #[test]
    fn test_missing_message_is_empty() {
        let decision = parse_decision("ACTION: send_connection");
        assert_eq!(decision.action, Action::SendConnection);
        assert_eq!(decision.message, "");
    }

    #[test]
    fn test_first_matching_line_wins() {
        let decision = parse_decision(
            "ACTION: send_message\nACTION: skip\nMESSAGE: first\nMESSAGE: second",
        );
        assert_eq!(decision.action, Action::SendMessage);
        assert_eq!(decision.message, "first");
    }

    #[test]
    fn test_message_keeps_inner_colons() {
        let decision = parse_decision("ACTION: send_message\nMESSAGE: Hi: quick question");
        assert_eq!(decision.message, "Hi: quick question");
    }

    #[test]
    fn test_action_aliases_and_case() {
        assert_eq!(Action::parse("SEND_MESSAGE"), Action::SendMessage);
        assert_eq!(Action::parse("'send_connection_request'"), Action::SendConnection);
        assert_eq!(Action::parse("send connection"), Action::SendConnection);
        assert_eq!(Action::parse(""), Action::Skip);
    }

    #[test]
    fn test_indented_lines_are_recognised() {
        let decision = parse_decision("  ACTION: send_message\n  MESSAGE: Hey");
        assert_eq!(decision.action, Action::SendMessage);
        assert_eq!(decision.message, "Hey");
    }

    #[test]
    fn test_parsing_is_deterministic() {
        let response = "ACTION: send_connection\nREASON: match\nMESSAGE: Let's connect";
        assert_eq!(parse_decision(response), parse_decision(response));
    }
}
