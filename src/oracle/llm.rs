use async_trait::async_trait;

use crate::error::Result;
use crate::oracle::claude::ClaudeClient;
use crate::oracle::{parse_decision, prompt, Decision, DecisionOracle};
use crate::profile::ProfileRecord;
use crate::workflow::types::{OutcomeRecord, Tally};

/// Decision oracle backed by a single LLM call per profile, no retries.
pub struct LlmOracle {
    client: ClaudeClient,
}

impl LlmOracle {
    pub fn new(client: ClaudeClient) -> Self {
        Self { client }
    }

    /// Narrative summary of a finished run.
    pub async fn summarize(
        &self,
        query: &str,
        outcomes: &[OutcomeRecord],
        tally: &Tally,
    ) -> Result<String> {
        self.client
            .complete(
                &prompt::system_prompt_for_summary(),
                &prompt::user_prompt_for_summary(query, outcomes, tally),
            )
            .await
    }
}

#[async_trait]
impl DecisionOracle for LlmOracle {
    async fn decide(&self, query: &str, profile: &ProfileRecord) -> Result<Decision> {
        let response = self
            .client
            .complete(
                &prompt::system_prompt_for_decision(),
                &prompt::user_prompt_for_profile(query, profile),
            )
            .await?;

        tracing::debug!(profile = %profile.url, model = self.client.model(), response = %response, "Raw decision");

        Ok(parse_decision(&response))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::OracleConfig;
    use crate::oracle::Action;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, method};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_decide_parses_llm_reply() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_partial_json(json!({ "model": "claude-test" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "msg_1",
                "content": [{
                    "type": "text",
                    "text": "ACTION: send_connection\nREASON: Leads an ML platform team\nMESSAGE: Hi A, would love to connect."
                }],
                "stop_reason": "end_turn",
                "usage": { "input_tokens": 100, "output_tokens": 30 }
            })))
            .mount(&server)
            .await;

        let config = OracleConfig {
            api_url: server.uri(),
            model: "claude-test".to_string(),
            ..OracleConfig::default()
        };
        let oracle = LlmOracle::new(ClaudeClient::new("sk-test", &config).unwrap());

        let decision = oracle
            .decide("ML leaders", &ProfileRecord::unresolved("https://x/in/a").with_name("A"))
            .await
            .unwrap();

        assert_eq!(decision.action, Action::SendConnection);
        assert_eq!(decision.message, "Hi A, would love to connect.");
        assert_eq!(decision.reason.as_deref(), Some("Leads an ML platform team"));
    }
}
