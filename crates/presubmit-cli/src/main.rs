//! Presubmit CLI
//!
//! The `presubmit` command sends batches of related CLs to presubmit
//! testing against a dry-run CI backend.
//!
//! ## Commands
//!
//! - `send`: run the dispatcher over a batches file and print the report
//! - `group`: show how each batch is grouped and which skip rules apply

mod config;
mod dry_run;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use presubmit_core::telemetry::{init_tracing, LogFormat};
use presubmit_core::{
    combine, decide_before_tests, BatchStatus, DispatchReport, Dispatcher, PresubmitPolicy,
};
use tracing::Level;

use crate::dry_run::DryRunWorkflow;

#[derive(Parser)]
#[command(name = "presubmit")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Send multi-part CLs to presubmit testing", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Dispatch every batch and print the run report
    Send {
        /// JSON file with an array of batches of change records
        #[arg(short, long, env = "PRESUBMIT_BATCHES")]
        batches: PathBuf,

        /// TOML policy file (trusted domain, report messages)
        #[arg(short, long, env = "PRESUBMIT_POLICY")]
        policy: Option<PathBuf>,

        /// Tests the dry-run backend reports (comma-separated)
        #[arg(short, long, default_value = "")]
        tests: String,

        /// Report format
        #[arg(long, value_enum, default_value_t = ReportFormat::Text)]
        format: ReportFormat,
    },

    /// Show grouping and author/trust flags without contacting CI
    Group {
        /// JSON file with an array of batches of change records
        #[arg(short, long, env = "PRESUBMIT_BATCHES")]
        batches: PathBuf,

        /// TOML policy file (trusted domain, report messages)
        #[arg(short, long, env = "PRESUBMIT_POLICY")]
        policy: Option<PathBuf>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ReportFormat {
    Text,
    Json,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    init_tracing(LogFormat::from_json_flag(cli.json), level);

    match cli.command {
        Commands::Send {
            batches,
            policy,
            tests,
            format,
        } => cmd_send(&batches, policy.as_deref(), &tests, format).await,
        Commands::Group { batches, policy } => cmd_group(&batches, policy.as_deref()),
    }
}

async fn cmd_send(
    batches_path: &std::path::Path,
    policy_path: Option<&std::path::Path>,
    tests: &str,
    format: ReportFormat,
) -> Result<()> {
    let batches = config::load_batches(batches_path)?;
    let policy = config::load_policy(policy_path)?;
    let workflow = Arc::new(DryRunWorkflow::new(config::parse_test_list(tests)));

    let report = Dispatcher::new(workflow)
        .with_policy(policy)
        .run(&batches)
        .await
        .context("Presubmit run aborted")?;

    match format {
        ReportFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        ReportFormat::Text => print_report(&report),
    }
    Ok(())
}

fn print_report(report: &DispatchReport) {
    println!("Run ID: {}", report.run_id);
    for batch in &report.batches {
        let label = if batch.label.is_empty() {
            "<none>"
        } else {
            batch.label.as_str()
        };
        let status = match &batch.status {
            BatchStatus::Malformed { reason } => format!("malformed ({})", reason),
            BatchStatus::Skipped { outcome, reported } => {
                if *reported {
                    format!("{} (reported)", outcome)
                } else {
                    outcome.to_string()
                }
            }
            BatchStatus::BuildFailed { reason } => format!("build failed ({})", reason),
            BatchStatus::Dispatched { tests } => format!("sent with {} test(s)", tests),
        };
        println!("  [{}] {}: {}", batch.index, label, status);
    }
    println!();
    println!(
        "Summary: {} CL(s) sent, {} batch(es) skipped, {} build failure(s)",
        report.dispatched,
        report.skipped_count(),
        report.failed_count()
    );
}

fn cmd_group(batches_path: &std::path::Path, policy_path: Option<&std::path::Path>) -> Result<()> {
    let batches = config::load_batches(batches_path)?;
    let policy: PresubmitPolicy = config::load_policy(policy_path)?;

    for (index, batch) in batches.iter().enumerate() {
        match combine(batch, &policy.trust) {
            Ok(group) => {
                let pending = decide_before_tests(&policy, &group)
                    .map(|d| d.outcome.to_string())
                    .unwrap_or_else(|| "needs test list".to_string());
                println!(
                    "  [{}] {} (skip requested: {}, all trusted: {}) -> {}",
                    index, group.label, group.skip_requested, group.all_trusted, pending
                );
            }
            Err(err) => println!("  [{}] malformed: {}", index, err),
        }
    }
    Ok(())
}
