use std::path::PathBuf;

use tokio::io::AsyncWriteExt;

use crate::error::Result;
use crate::workflow::types::OutcomeRecord;

/// Append-only JSON-lines log of finalized outcomes.
pub struct AuditLog {
    path: PathBuf,
}

impl AuditLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub async fn append(&self, outcome: &OutcomeRecord) -> Result<()> {
        let mut line = serde_json::to_vec(outcome)?;
        line.push(b'\n');

        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        file.write_all(&line).await?;
        file.flush().await?;
        Ok(())
    }
}
