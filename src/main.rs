//! spirv-batch command line interface
//!
//! Zero arguments compile the built-in shader set with the default layout;
//! two positional arguments override the source and output directories.
//! Exit status: `0` when every shader compiled, `1` when at least one
//! failed, `2` when the batch could not run at all.

use std::path::PathBuf;
use std::process;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use tracing::error;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use spirv_batch::batch::{BatchRunner, BatchSummary};
use spirv_batch::manifest;

#[derive(Parser)]
#[command(
    name = "spirv-batch",
    about = "Compile the renderer's GLSL shader set to SPIR-V in parallel",
    version
)]
struct Cli {
    /// Directory containing the GLSL sources (defaults to the compiled-in layout)
    #[arg(value_name = "SOURCE_DIR", requires = "output_dir")]
    source_dir: Option<PathBuf>,

    /// Directory the compiled .spv artifacts are written to
    #[arg(value_name = "OUTPUT_DIR")]
    output_dir: Option<PathBuf>,

    /// Number of shaders compiled concurrently (defaults to the CPU count)
    #[arg(short, long, value_name = "N")]
    jobs: Option<usize>,

    /// Fail any single compile that runs longer than this many seconds
    #[arg(long, value_name = "SECS")]
    timeout: Option<u64>,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "spirv_batch=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let code = exit_code(&run(cli).await);
    if code != 0 {
        process::exit(code);
    }
}

/// Maps the batch result onto the process exit status: `0` when every item
/// succeeded, `1` when any failed or timed out, `2` when the batch could not
/// run at all.
fn exit_code(result: &anyhow::Result<BatchSummary>) -> i32 {
    match result {
        Ok(summary) if summary.all_succeeded() => 0,
        Ok(summary) => {
            error!(
                failed = summary.failed + summary.timed_out,
                total = summary.total,
                "batch finished with failures"
            );
            1
        }
        Err(err) => {
            eprintln!("error: {err:#}");
            2
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<BatchSummary> {
    let source_dir = cli
        .source_dir
        .unwrap_or_else(|| PathBuf::from(manifest::DEFAULT_SOURCE_DIR));
    let output_dir = cli
        .output_dir
        .unwrap_or_else(|| PathBuf::from(manifest::DEFAULT_OUTPUT_DIR));

    let items = manifest::work_items(&source_dir, &output_dir);

    let mut runner = BatchRunner::new();
    if let Some(jobs) = cli.jobs {
        runner = runner.with_capacity(jobs);
    }
    if let Some(secs) = cli.timeout {
        runner = runner.with_timeout(Duration::from_secs(secs));
    }

    let outcomes = runner
        .run(&output_dir, items)
        .await
        .context("shader batch could not run")?;

    Ok(BatchSummary::from_outcomes(&outcomes))
}
