use std::fmt;

use async_trait::async_trait;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader, Stdin, Stdout};

use crate::error::{AppError, Result};
use crate::oracle::Decision;
use crate::profile::ProfileRecord;

/// A human's answer to a proposed outbound action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Approval {
    Approved,
    Skipped,
    Rejected,
}

impl Approval {
    /// `y` approves, `s` skips, anything else rejects.
    pub fn from_answer(answer: &str) -> Self {
        match answer.trim().to_ascii_lowercase().as_str() {
            "y" => Approval::Approved,
            "s" => Approval::Skipped,
            _ => Approval::Rejected,
        }
    }
}

impl fmt::Display for Approval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Approval::Approved => "approved",
            Approval::Skipped => "skipped",
            Approval::Rejected => "rejected",
        })
    }
}

/// Human confirmation step in front of every outbound action.
#[async_trait]
pub trait ApprovalGate: Send {
    async fn confirm(&mut self, decision: &Decision, profile: &ProfileRecord) -> Result<Approval>;
}

/// Interactive gate that prints the proposal and blocks on one line of input.
pub struct ConsoleGate<R, W> {
    reader: R,
    writer: W,
}

impl ConsoleGate<BufReader<Stdin>, Stdout> {
    pub fn stdio() -> Self {
        Self::new(BufReader::new(tokio::io::stdin()), tokio::io::stdout())
    }
}

impl<R, W> ConsoleGate<R, W> {
    pub fn new(reader: R, writer: W) -> Self {
        Self { reader, writer }
    }

    pub fn into_writer(self) -> W {
        self.writer
    }
}

#[async_trait]
impl<R, W> ApprovalGate for ConsoleGate<R, W>
where
    R: AsyncBufRead + Unpin + Send,
    W: AsyncWrite + Unpin + Send,
{
    async fn confirm(&mut self, decision: &Decision, profile: &ProfileRecord) -> Result<Approval> {
        let review = format!(
            "\n--- HUMAN REVIEW ---\nProfile: {}\nURL: {}\nAction: {}\nReason: {}\nMessage:\n{}\nApprove action? (y/n/s for skip): ",
            profile.display_name(),
            profile.url,
            decision.action,
            decision.reason.as_deref().unwrap_or("-"),
            decision.message,
        );
        self.writer
            .write_all(review.as_bytes())
            .await
            .map_err(|e| AppError::Gate(e.to_string()))?;
        self.writer
            .flush()
            .await
            .map_err(|e| AppError::Gate(e.to_string()))?;

        let mut answer = String::new();
        let read = self
            .reader
            .read_line(&mut answer)
            .await
            .map_err(|e| AppError::Gate(e.to_string()))?;

        if read == 0 {
            tracing::warn!(profile = %profile.url, "Input closed at approval prompt, treating as rejection");
        }

        let approval = Approval::from_answer(&answer);
        tracing::info!(profile = %profile.url, approval = %approval, "Human review");
        Ok(approval)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_answer_mapping() {
        assert_eq!(Approval::from_answer("y\n"), Approval::Approved);
        assert_eq!(Approval::from_answer(" Y "), Approval::Approved);
        assert_eq!(Approval::from_answer("s"), Approval::Skipped);
        assert_eq!(Approval::from_answer("n"), Approval::Rejected);
        assert_eq!(Approval::from_answer("yes"), Approval::Rejected);
        assert_eq!(Approval::from_answer(""), Approval::Rejected);
    }

    #[tokio::test]
    async fn test_console_gate_prints_proposal_and_reads_answers() {
        let input: &[u8] = b"y\ns\n";
        let mut gate = ConsoleGate::new(input, Vec::new());
        let profile = ProfileRecord::unresolved("https://x/in/a")
            .with_name("A")
            .with_headline("CTO");
        let decision = Decision::send_message("Hi A").with_reason("Founder");

        assert_eq!(gate.confirm(&decision, &profile).await.unwrap(), Approval::Approved);
        assert_eq!(gate.confirm(&decision, &profile).await.unwrap(), Approval::Skipped);

        let printed = String::from_utf8(gate.into_writer()).unwrap();
        assert!(printed.contains("Profile: A (CTO)"));
        assert!(printed.contains("Action: send_message"));
        assert!(printed.contains("Reason: Founder"));
        assert!(printed.contains("Hi A"));
    }

    #[tokio::test]
    async fn test_closed_input_rejects() {
        let input: &[u8] = b"";
        let mut gate = ConsoleGate::new(input, Vec::new());
        let approval = gate
            .confirm(&Decision::send_connection(""), &ProfileRecord::unresolved("u"))
            .await
            .unwrap();
        assert_eq!(approval, Approval::Rejected);
    }
}
