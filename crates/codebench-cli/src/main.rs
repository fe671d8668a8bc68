//! Codebench - benchmark evaluation CLI
//!
//! The `codebench` command runs AI-generated candidate solutions against
//! benchmark oracles inside sandboxed interpreters and reports pass@k.
//!
//! ## Commands
//!
//! - `run`: execute a candidate batch against a task registry
//! - `validate`: load and validate a task registry without executing

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{info, Level};

use codebench_core::{init_tracing, CandidateSet, TaskRegistry};
use codebench_harness::{BenchRunner, EvalConfig, ExecutionLimits, RunReport};

#[derive(Parser)]
#[command(name = "codebench")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Sandboxed execution and pass@k scoring for code benchmarks", long_about = None)]
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
    /// Execute a candidate batch and compute aggregate metrics
    Run {
        /// Task registry (JSONL, one task per line)
        #[arg(long)]
        tasks: PathBuf,

        /// Candidate batch (JSONL, one candidate per line)
        #[arg(long)]
        candidates: PathBuf,

        /// Wall-clock budget per execution, in seconds
        #[arg(long, default_value = "5")]
        time_limit_secs: u64,

        /// Memory ceiling per execution, in MiB (0 disables)
        #[arg(long, default_value = "256")]
        memory_limit_mb: u64,

        /// Worker pool size
        #[arg(long, default_value = "4")]
        workers: usize,

        /// Comma-separated k values for pass@k
        #[arg(long, default_value = "1,10,100")]
        k: String,

        /// Write the full report to this path instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Validate a task registry without executing anything
    Validate {
        /// Task registry (JSONL, one task per line)
        #[arg(long)]
        tasks: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    init_tracing(cli.json, level);

    match cli.command {
        Commands::Run {
            tasks,
            candidates,
            time_limit_secs,
            memory_limit_mb,
            workers,
            k,
            output,
        } => {
            cmd_run(
                &tasks,
                &candidates,
                time_limit_secs,
                memory_limit_mb,
                workers,
                &k,
                output.as_deref(),
            )
            .await
        }
        Commands::Validate { tasks } => cmd_validate(&tasks),
    }
}

async fn cmd_run(
    tasks: &std::path::Path,
    candidates: &std::path::Path,
    time_limit_secs: u64,
    memory_limit_mb: u64,
    workers: usize,
    k: &str,
    output: Option<&std::path::Path>,
) -> Result<()> {
    let registry = TaskRegistry::load_jsonl(tasks)
        .with_context(|| format!("Failed to load tasks from {:?}", tasks))?;
    let batch = CandidateSet::load_jsonl(candidates)
        .with_context(|| format!("Failed to load candidates from {:?}", candidates))?;

    let config = EvalConfig {
        limits: ExecutionLimits {
            time_limit_ms: time_limit_secs.saturating_mul(1_000),
            memory_limit_bytes: memory_limit_mb.saturating_mul(1024 * 1024),
            ..Default::default()
        },
        worker_count: workers,
        k_values: parse_k_values(k)?,
    };

    let runner = BenchRunner::new(config).context("Invalid run configuration")?;
    let report = runner
        .run(&registry, &batch)
        .await
        .context("Evaluation run failed")?;

    print_summary(&report);

    let report_json = serde_json::to_string_pretty(&report)?;
    match output {
        Some(path) => {
            std::fs::write(path, &report_json)
                .with_context(|| format!("Failed to write report to {:?}", path))?;
            info!(path = %path.display(), "Report written");
        }
        None => println!("{}", report_json),
    }

    Ok(())
}

fn cmd_validate(tasks: &std::path::Path) -> Result<()> {
    let registry = TaskRegistry::load_jsonl(tasks)
        .with_context(|| format!("Failed to load tasks from {:?}", tasks))?;
    println!("{} task(s) valid", registry.len());
    Ok(())
}

/// Parse a comma-separated k list ("1,10,100").
fn parse_k_values(raw: &str) -> Result<Vec<u64>> {
    raw.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| {
            part.parse::<u64>()
                .with_context(|| format!("Invalid k value: {:?}", part))
        })
        .collect()
}

/// Human-readable summary on stderr; the JSON report owns stdout.
fn print_summary(report: &RunReport) {
    eprintln!(
        "run {}: {} executed, {} passed, {} failed, {} harness failure(s) in {}ms",
        report.run_id,
        report.results.len(),
        report.passed_count(),
        report.failed_count(),
        report.harness_failures.len(),
        report.duration_ms,
    );
    for metric in &report.metrics {
        let passes: Vec<String> = metric
            .pass_at_k
            .iter()
            .map(|(k, v)| format!("pass@{}={:.4}", k, v))
            .collect();
        eprintln!(
            "  {}: n={} c={} {}",
            metric.scope,
            metric.n_samples,
            metric.n_correct,
            passes.join(" ")
        );
    }
}
