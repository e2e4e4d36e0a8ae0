use async_trait::async_trait;

use crate::error::{AppError, Result};
use crate::oracle::Action;
use crate::pacing::Jitter;
use crate::profile::ProfileRecord;

/// Performs an approved outbound action and describes what happened.
#[async_trait]
pub trait ActionExecutor: Send + Sync {
    async fn execute(&self, action: Action, profile: &ProfileRecord, message: &str) -> Result<String>;
}

/// Stand-in executor: waits a human-like delay and reports a simulated send.
pub struct SimulatedExecutor {
    delay: Jitter,
}

impl SimulatedExecutor {
    pub fn new(delay: Jitter) -> Self {
        Self { delay }
    }
}

#[async_trait]
impl ActionExecutor for SimulatedExecutor {
    async fn execute(&self, action: Action, profile: &ProfileRecord, message: &str) -> Result<String> {
        let kind = match action {
            Action::SendMessage => "Message",
            Action::SendConnection => "Connection request",
            Action::Skip => {
                return Err(AppError::Execution(format!(
                    "nothing to execute for skipped profile {}",
                    profile.url
                )));
            }
        };

        tracing::info!(
            profile = %profile.url,
            action = %action,
            message_len = message.len(),
            "Sending (simulated)"
        );
        self.delay.wait().await;

        Ok(format!("{kind} SIMULATED sent to {}", profile.url))
    }
}
