use crate::error::{AppError, Result};
use crate::executor::ActionExecutor;
use crate::gate::{Approval, ApprovalGate};
use crate::oracle::{Decision, DecisionOracle};
use crate::pacing::Jitter;
use crate::profile::{ProfileRecord, ProfileSource};
use crate::workflow::audit::AuditLog;
use crate::workflow::types::{OutcomeRecord, OutcomeStatus, Status, WorkflowReport, WorkflowState};

/// Where the workflow is between steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Loading,
    Deciding,
    AwaitingApproval,
    Executing,
    Advancing(OutcomeStatus),
    Done,
    Failed,
}

impl Phase {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Phase::Done | Phase::Failed)
    }
}

/// Sequential outreach over a batch of profiles.
///
/// Each call to [`step`](Self::step) performs exactly one transition:
///
/// | phase            | outcome                               | next                          |
/// |------------------|---------------------------------------|-------------------------------|
/// | Loading          | profiles loaded, cursor = 0           | Deciding, or Done when empty  |
/// | Deciding         | action is send_message/send_connection| AwaitingApproval              |
/// | Deciding         | action is skip (or oracle failed)     | Advancing(skipped)            |
/// | AwaitingApproval | approved                              | Executing                     |
/// | AwaitingApproval | skipped / rejected                    | Advancing(skipped / rejected) |
/// | Executing        | executor ran (or failed)              | Advancing(processed/skipped)  |
/// | Advancing        | outcome recorded, cursor += 1         | Deciding, or Done at the end  |
///
/// Any error escaping a step moves the workflow to `Failed` with the error
/// recorded on the state.
pub struct OutreachWorkflow<'a> {
    source: &'a dyn ProfileSource,
    oracle: &'a dyn DecisionOracle,
    gate: &'a mut dyn ApprovalGate,
    executor: &'a dyn ActionExecutor,
    pacing: Jitter,
    audit: Option<AuditLog>,
    state: WorkflowState,
    phase: Phase,
    detail: Option<String>,
}

impl<'a> OutreachWorkflow<'a> {
    pub fn new(
        query: impl Into<String>,
        source: &'a dyn ProfileSource,
        oracle: &'a dyn DecisionOracle,
        gate: &'a mut dyn ApprovalGate,
        executor: &'a dyn ActionExecutor,
    ) -> Self {
        Self {
            source,
            oracle,
            gate,
            executor,
            pacing: Jitter::none(),
            audit: None,
            state: WorkflowState::new(query),
            phase: Phase::Loading,
            detail: None,
        }
    }

    /// Delay inserted before deciding on the next profile after a skip or rejection.
    pub fn with_pacing(mut self, pacing: Jitter) -> Self {
        self.pacing = pacing;
        self
    }

    pub fn with_audit_log(mut self, audit: AuditLog) -> Self {
        self.audit = Some(audit);
        self
    }

    pub fn state(&self) -> &WorkflowState {
        &self.state
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Run to completion. Never fails: an aborted run is reported through the final state.
    pub async fn run(mut self) -> WorkflowReport {
        tracing::info!(source = %self.source.describe(), query = %self.state.query, "Starting outreach workflow");

        while !self.phase.is_terminal() {
            self.step().await;
        }

        let report = WorkflowReport::new(self.state);
        if report.is_fatal() {
            tracing::error!(
                cursor = report.state.cursor,
                error = report.state.error.as_deref().unwrap_or_default(),
                "Outreach workflow aborted"
            );
        } else {
            tracing::info!(
                profiles = report.tally.total,
                processed = report.tally.processed,
                skipped = report.tally.skipped,
                rejected = report.tally.rejected,
                "Outreach workflow finished"
            );
        }
        report
    }

    /// Perform one transition. A no-op once the workflow is terminal.
    pub async fn step(&mut self) -> Phase {
        let result = match self.phase {
            Phase::Loading => self.load().await,
            Phase::Deciding => self.decide().await,
            Phase::AwaitingApproval => self.await_approval().await,
            Phase::Executing => self.execute().await,
            Phase::Advancing(outcome) => self.advance(outcome).await,
            Phase::Done | Phase::Failed => Ok(self.phase),
        };

        self.phase = match result {
            Ok(next) => next,
            Err(e) => {
                tracing::error!(phase = ?self.phase, cursor = self.state.cursor, error = %e, "Workflow step failed");
                self.state.error = Some(e.to_string());
                self.state.status = Status::Error;
                Phase::Failed
            }
        };
        self.phase
    }

    async fn load(&mut self) -> Result<Phase> {
        let profiles = self.source.load().await?;
        tracing::info!(count = profiles.len(), "Loaded profiles");

        self.state.profiles = profiles;
        self.state.cursor = 0;
        self.state.results.clear();
        self.state.status = Status::Continue;
        Ok(self.next_or_done())
    }

    async fn decide(&mut self) -> Result<Phase> {
        if matches!(self.state.status, Status::Skip | Status::Rejected) {
            self.pacing.wait().await;
        }

        let profile = self
            .state
            .current_profile()
            .ok_or_else(|| AppError::Internal("deciding past the end of the profile list".to_string()))?;

        tracing::info!(cursor = self.state.cursor, profile = %profile.url, name = %profile.name, "Analyzing profile");

        let result = self.oracle.decide(&self.state.query, profile).await;
        let decision = match result {
            Ok(decision) => decision,
            Err(e) => {
                tracing::warn!(profile = %profile.url, error = %e, "Decision oracle failed, skipping profile");
                self.state.error = Some(e.to_string());
                Decision::skip(format!("oracle failure: {e}"))
            }
        };

        tracing::info!(action = %decision.action, reason = decision.reason.as_deref().unwrap_or_default(), "Decision");

        let next = if decision.action.is_outbound() {
            Phase::AwaitingApproval
        } else {
            Phase::Advancing(OutcomeStatus::Skipped)
        };
        self.state.pending_decision = Some(decision);
        Ok(next)
    }

    async fn await_approval(&mut self) -> Result<Phase> {
        let (decision, profile) = pending(&self.state)?;
        let approval = self.gate.confirm(decision, profile).await?;

        Ok(match approval {
            Approval::Approved => Phase::Executing,
            Approval::Skipped => Phase::Advancing(OutcomeStatus::Skipped),
            Approval::Rejected => Phase::Advancing(OutcomeStatus::Rejected),
        })
    }

    async fn execute(&mut self) -> Result<Phase> {
        let (decision, profile) = pending(&self.state)?;

        let result = self
            .executor
            .execute(decision.action, profile, &decision.message)
            .await;

        match result {
            Ok(confirmation) => {
                tracing::info!(profile = %profile.url, result = %confirmation, "Action executed");
                self.detail = Some(confirmation);
                Ok(Phase::Advancing(OutcomeStatus::Processed))
            }
            Err(e) => {
                tracing::warn!(profile = %profile.url, error = %e, "Action execution failed");
                let message = e.to_string();
                self.state.error = Some(message.clone());
                self.detail = Some(message);
                Ok(Phase::Advancing(OutcomeStatus::Skipped))
            }
        }
    }

    async fn advance(&mut self, status: OutcomeStatus) -> Result<Phase> {
        let profile = self
            .state
            .current_profile()
            .cloned()
            .ok_or_else(|| AppError::Internal("advancing past the end of the profile list".to_string()))?;
        let decision = self
            .state
            .pending_decision
            .take()
            .ok_or_else(|| AppError::Internal("advancing without a decision".to_string()))?;

        let outcome = OutcomeRecord {
            profile,
            decision,
            status,
            detail: self.detail.take(),
            recorded_at: chrono::Utc::now(),
        };

        if let Some(audit) = &self.audit {
            if let Err(e) = audit.append(&outcome).await {
                tracing::warn!(error = %e, "Failed to append audit log entry");
            }
        }

        tracing::info!(cursor = self.state.cursor, profile = %outcome.profile.url, status = %status, "Profile finalized");

        self.state.results.push(outcome);
        self.state.cursor += 1;
        self.state.status = status.signal();
        Ok(self.next_or_done())
    }

    fn next_or_done(&mut self) -> Phase {
        if self.state.is_exhausted() {
            self.state.status = Status::Done;
            Phase::Done
        } else {
            Phase::Deciding
        }
    }
}

fn pending(state: &WorkflowState) -> Result<(&Decision, &ProfileRecord)> {
    let decision = state
        .pending_decision
        .as_ref()
        .ok_or_else(|| AppError::Internal("no pending decision".to_string()))?;
    let profile = state
        .current_profile()
        .ok_or_else(|| AppError::Internal("no current profile".to_string()))?;
    Ok((decision, profile))
}
