pub mod audit;
pub mod engine;
pub mod types;

pub use audit::AuditLog;
pub use engine::{OutreachWorkflow, Phase};
pub use types::{OutcomeRecord, OutcomeStatus, Status, Tally, WorkflowReport, WorkflowState};
