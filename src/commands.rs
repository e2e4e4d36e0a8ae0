use std::path::PathBuf;
use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

use crate::browser::BrowserSession;
use crate::config::AppConfig;
use crate::error::{AppError, Result};
use crate::executor::SimulatedExecutor;
use crate::gate::ConsoleGate;
use crate::oracle::claude::ClaudeClient;
use crate::oracle::LlmOracle;
use crate::pacing::Jitter;
use crate::profile::{JsonFileSource, LiveSource, ProfileSource};
use crate::workflow::{AuditLog, OutreachWorkflow, WorkflowReport};

/// Goal used by `analyze` when none is given on the command line.
pub const DEFAULT_GOAL: &str = "Potential business opportunities and professional networking";

pub struct AnalyzeOptions {
    pub file: Option<PathBuf>,
    pub query: String,
    pub summarize: bool,
}

/// What a `scrape` run left behind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScrapeOutcome {
    Saved { count: usize, path: PathBuf },
    /// Nothing usable was scraped and no file was written.
    NothingFound { reason: String },
}

/// Search, enrich and persist profiles for a later `analyze` run.
pub async fn scrape(config: &AppConfig, query: Option<String>) -> Result<ScrapeOutcome> {
    let query = match query {
        Some(q) => q,
        None => prompt_line("Enter the search query: ").await?,
    };

    let session = Arc::new(BrowserSession::new(config.browser.clone()));
    let source = LiveSource::new(session.clone(), query);
    let loaded = source.load().await;
    session.close().await;

    let profiles = match loaded {
        Ok(profiles) => profiles,
        Err(AppError::ProfilesNotFound(reason)) => {
            tracing::warn!(reason = %reason, "No profiles scraped");
            return Ok(ScrapeOutcome::NothingFound { reason });
        }
        Err(e) => return Err(e),
    };

    let path = config.outreach.profiles_file.clone();
    JsonFileSource::new(&path).save(&profiles).await?;
    Ok(ScrapeOutcome::Saved {
        count: profiles.len(),
        path,
    })
}

/// Run the outreach workflow over a previously scraped profiles file.
pub async fn analyze(config: &AppConfig, options: AnalyzeOptions) -> Result<WorkflowReport> {
    let oracle = LlmOracle::new(ClaudeClient::new(config.oracle_api_key()?, &config.oracle)?);

    let path = options
        .file
        .unwrap_or_else(|| config.outreach.profiles_file.clone());
    let source = JsonFileSource::new(path);

    let report = run_workflow(config, &options.query, &source, &oracle).await;

    if options.summarize && !report.is_fatal() {
        match oracle
            .summarize(&options.query, &report.state.results, &report.tally)
            .await
        {
            Ok(summary) => println!("\n=== Analysis Summary ===\n{summary}"),
            Err(e) => tracing::warn!(error = %e, "Failed to summarize results"),
        }
    }

    Ok(report)
}

/// Search, enrich and work through profiles in one run, then release the browser.
pub async fn run_live(config: &AppConfig, query: &str) -> Result<WorkflowReport> {
    let oracle = LlmOracle::new(ClaudeClient::new(config.oracle_api_key()?, &config.oracle)?);

    let session = Arc::new(BrowserSession::new(config.browser.clone()));
    let source = LiveSource::new(session.clone(), query);

    let report = run_workflow(config, query, &source, &oracle).await;
    session.close().await;

    Ok(report)
}

async fn run_workflow(
    config: &AppConfig,
    query: &str,
    source: &dyn ProfileSource,
    oracle: &LlmOracle,
) -> WorkflowReport {
    let outreach = &config.outreach;
    let mut gate = ConsoleGate::stdio();
    let executor = SimulatedExecutor::new(Jitter::from_millis(
        outreach.send_delay_min_ms,
        outreach.send_delay_max_ms,
    ));

    let mut workflow = OutreachWorkflow::new(query, source, oracle, &mut gate, &executor)
        .with_pacing(Jitter::from_millis(outreach.pacing_min_ms, outreach.pacing_max_ms));
    if let Some(path) = &outreach.audit_log {
        workflow = workflow.with_audit_log(AuditLog::new(path));
    }

    workflow.run().await
}

async fn prompt_line(prompt: &str) -> Result<String> {
    let mut stdout = tokio::io::stdout();
    stdout.write_all(prompt.as_bytes()).await?;
    stdout.flush().await?;

    let mut line = String::new();
    BufReader::new(tokio::io::stdin()).read_line(&mut line).await?;

    let line = line.trim().to_string();
    if line.is_empty() {
        return Err(AppError::Config("search query must not be empty".to_string()));
    }
    Ok(line)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{BrowserConfig, OutreachConfig};
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_scrape_with_no_links_writes_nothing() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/session"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "value": { "sessionId": "s" }
            })))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/session/s/url"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "value": null })))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/session/s/elements"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "value": [] })))
            .mount(&server)
            .await;
        Mock::given(method("DELETE"))
            .and(path("/session/s"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "value": null })))
            .expect(1)
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let profiles_file = dir.path().join("linkedin_profiles.json");

        let config = AppConfig {
            browser: BrowserConfig {
                driver_url: server.uri(),
                page_load_wait_secs: 0,
                profile_load_delay_secs: 0,
                search_load_delay_secs: 0,
                ..BrowserConfig::default()
            },
            outreach: OutreachConfig {
                profiles_file: profiles_file.clone(),
                ..OutreachConfig::default()
            },
            ..AppConfig::default()
        };

        let outcome = scrape(&config, Some("nobody at all".to_string()))
            .await
            .unwrap();

        match outcome {
            ScrapeOutcome::NothingFound { reason } => {
                assert!(reason.contains("no profile links found"))
            }
            other => panic!("expected nothing found, got {other:?}"),
        }
        assert!(!profiles_file.exists());
    }
}
