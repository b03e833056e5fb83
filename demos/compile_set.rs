//! Compile-set example demonstrating manifest expansion and batch execution

use async_trait::async_trait;
use spirv_batch::batch::{BatchRunner, BatchSummary};
use spirv_batch::manifest;
use spirv_batch::tool::{ToolError, ToolInvoker, ToolOutput};
use std::error::Error;
use std::path::Path;
use std::sync::Arc;

/// Stands in for glslangValidator so the example runs without it installed.
struct SimulatedCompiler;

#[async_trait]
impl ToolInvoker for SimulatedCompiler {
    async fn invoke(&self, source: &Path, dest: &Path) -> Result<ToolOutput, ToolError> {
        tokio::fs::write(dest, b"spv-demo")
            .await
            .map_err(|err| ToolError::Io {
                program: "simulated-compiler".to_string(),
                source: err,
            })?;
        Ok(ToolOutput {
            exit_code: 0,
            stdout: source.display().to_string(),
            stderr: String::new(),
        })
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    println!("🚀 spirv-batch - Compile Set Example\n");

    // Step 1: Expand the manifest into work items
    let output_dir = std::env::temp_dir().join("spirv-batch-demo");
    let items = manifest::work_items(Path::new("shaders"), &output_dir);
    println!("Manifest expanded to {} work items:", items.len());
    for item in &items {
        println!("  {} -> {}", item.source.display(), item.dest.display());
    }
    println!();

    // Step 2: Configure the runner
    let runner = BatchRunner::new()
        .with_capacity(4)
        .with_invoker(Arc::new(SimulatedCompiler));
    println!("✅ Runner configured with 4 workers\n");

    // Step 3: Run the batch to completion
    println!("Running batch...");
    let outcomes = runner.run(&output_dir, items).await?;
    println!("✅ Batch settled with {} outcomes\n", outcomes.len());

    // Step 4: Display results
    let summary = BatchSummary::from_outcomes(&outcomes);
    println!("Summary:");
    println!("  total:     {}", summary.total);
    println!("  succeeded: {}", summary.succeeded);
    println!("  failed:    {}", summary.failed);
    println!("  timed out: {}", summary.timed_out);

    println!("\nPer-shader outcomes:");
    for (i, outcome) in outcomes.iter().enumerate() {
        println!(
            "  {}. {} ({:?}, {}ms)",
            i + 1,
            outcome.item.dest.display(),
            outcome.status,
            outcome.duration.as_millis()
        );
    }

    std::fs::remove_dir_all(&output_dir)?;

    Ok(())
}
