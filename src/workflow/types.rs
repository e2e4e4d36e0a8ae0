use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::oracle::{Action, Decision};
use crate::profile::ProfileRecord;

/// Last control signal recorded by the workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    /// Loaded, or mid-iteration with nothing finalized yet.
    Continue,
    /// The last profile was skipped, by the oracle or at the gate.
    Skip,
    /// The last profile's action was vetoed at the gate.
    Rejected,
    /// The last profile's action was approved and executed.
    Processed,
    /// Every profile has been finalized.
    Done,
    /// The run aborted on an unrecovered failure.
    Error,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Status::Continue => "continue",
            Status::Skip => "skip",
            Status::Rejected => "rejected",
            Status::Processed => "processed",
            Status::Done => "done",
            Status::Error => "error",
        })
    }
}

/// Final disposition of one profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeStatus {
    Processed,
    Skipped,
    Rejected,
}

impl OutcomeStatus {
    /// The control signal left behind once a profile ends this way.
    pub fn signal(&self) -> Status {
        match self {
            OutcomeStatus::Processed => Status::Processed,
            OutcomeStatus::Skipped => Status::Skip,
            OutcomeStatus::Rejected => Status::Rejected,
        }
    }
}

impl fmt::Display for OutcomeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            OutcomeStatus::Processed => "processed",
            OutcomeStatus::Skipped => "skipped",
            OutcomeStatus::Rejected => "rejected",
        })
    }
}

/// Audit entry for one finalized profile.
#[derive(Debug, Clone, Serialize)]
pub struct OutcomeRecord {
    pub profile: ProfileRecord,
    pub decision: Decision,
    pub status: OutcomeStatus,
    /// Executor confirmation, or the failure that downgraded the outcome.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    pub recorded_at: DateTime<Utc>,
}

/// The cursor threaded through every workflow step.
#[derive(Debug, Clone, Serialize)]
pub struct WorkflowState {
    pub query: String,
    pub profiles: Vec<ProfileRecord>,
    pub cursor: usize,
    pub pending_decision: Option<Decision>,
    pub status: Status,
    pub results: Vec<OutcomeRecord>,
    pub error: Option<String>,
}

impl WorkflowState {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            profiles: Vec::new(),
            cursor: 0,
            pending_decision: None,
            status: Status::Continue,
            results: Vec::new(),
            error: None,
        }
    }

    pub fn current_profile(&self) -> Option<&ProfileRecord> {
        self.profiles.get(self.cursor)
    }

    pub fn is_exhausted(&self) -> bool {
        self.cursor >= self.profiles.len()
    }
}

/// Per-status counts over a run's results.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Tally {
    pub total: usize,
    pub processed: usize,
    pub skipped: usize,
    pub rejected: usize,
    pub messages_sent: usize,
    pub connections_requested: usize,
}

impl Tally {
    pub fn from_state(state: &WorkflowState) -> Self {
        let mut tally = Tally {
            total: state.profiles.len(),
            ..Tally::default()
        };

        for outcome in &state.results {
            match outcome.status {
                OutcomeStatus::Processed => {
                    tally.processed += 1;
                    match outcome.decision.action {
                        Action::SendMessage => tally.messages_sent += 1,
                        Action::SendConnection => tally.connections_requested += 1,
                        Action::Skip => {}
                    }
                }
                OutcomeStatus::Skipped => tally.skipped += 1,
                OutcomeStatus::Rejected => tally.rejected += 1,
            }
        }

        tally
    }
}

/// What a run hands back: the last state, always, plus its tally.
#[derive(Debug, Clone, Serialize)]
pub struct WorkflowReport {
    pub state: WorkflowState,
    pub tally: Tally,
}

impl WorkflowReport {
    pub fn new(state: WorkflowState) -> Self {
        let tally = Tally::from_state(&state);
        Self { state, tally }
    }

    /// Whether the run aborted before finishing the profile list.
    pub fn is_fatal(&self) -> bool {
        self.state.status == Status::Error
    }

    /// Human-readable end-of-run summary.
    pub fn render(&self) -> String {
        let mut out = format!(
            "Total profiles: {}\nProcessed: {} (messages: {}, connection requests: {})\nSkipped: {}\nRejected: {}\nFinal status: {}",
            self.tally.total,
            self.tally.processed,
            self.tally.messages_sent,
            self.tally.connections_requested,
            self.tally.skipped,
            self.tally.rejected,
            self.state.status,
        );
        if let Some(error) = &self.state.error {
            out.push_str(&format!("\nLast error: {error}"));
        }
        out
    }
}
