use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use linkreach::commands::{self, AnalyzeOptions, ScrapeOutcome, DEFAULT_GOAL};
use linkreach::config::AppConfig;
use linkreach::workflow::WorkflowReport;

#[derive(Parser)]
#[command(name = "linkreach", about = "Human-gated LinkedIn outreach assistant")]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Search LinkedIn and save the found profiles to the profiles file
    Scrape {
        /// Search query (prompted for when omitted)
        #[arg(short, long)]
        query: Option<String>,
    },
    /// Review saved profiles one by one and send approved outreach
    Analyze {
        /// Profiles file (defaults to outreach.profiles_file)
        #[arg(short, long)]
        file: Option<PathBuf>,
        /// Outreach goal given to the decision model
        #[arg(short, long, default_value = DEFAULT_GOAL)]
        query: String,
        /// Ask the model for a narrative summary when done
        #[arg(long)]
        summarize: bool,
    },
    /// Search, enrich and review profiles in a single run
    Run {
        /// Search query, also used as the outreach goal
        query: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // A missing .env file is fine
    let _ = dotenvy::dotenv();

    // Initialize tracing
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if cli.json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }

    let config = AppConfig::load(cli.config.as_deref())?;
    tracing::debug!(?config, "Loaded configuration");

    match cli.command {
        Command::Scrape { query } => {
            match commands::scrape(&config, query).await? {
                ScrapeOutcome::Saved { count, path } => {
                    println!("Saved {count} profiles to {}.", path.display());
                }
                ScrapeOutcome::NothingFound { reason } => {
                    eprintln!("Nothing saved: {reason}.");
                }
            }
            Ok(())
        }
        Command::Analyze {
            file,
            query,
            summarize,
        } => {
            let report = commands::analyze(
                &config,
                AnalyzeOptions {
                    file,
                    query,
                    summarize,
                },
            )
            .await?;
            finish(&report)
        }
        Command::Run { query } => {
            let report = commands::run_live(&config, &query).await?;
            finish(&report)
        }
    }
}

fn finish(report: &WorkflowReport) -> anyhow::Result<()> {
    println!("\n=== Outreach Summary ===\n{}", report.render());
    if report.is_fatal() {
        anyhow::bail!(
            "outreach run aborted: {}",
            report.state.error.as_deref().unwrap_or("unknown error")
        );
    }
    Ok(())
}
