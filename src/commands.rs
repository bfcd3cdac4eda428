use tracing::info;

use crate::Result;
use crate::config::Config;
use crate::pipeline::RagPipeline;

/// Build (or rebuild) the vector index from the configured document
/// patterns.
#[inline]
pub async fn build_index(config: Config) -> Result<()> {
    let mut pipeline = RagPipeline::new(config, true)?;

    println!("Loading documents...");
    let chunk_count = pipeline.build_index(None).await?;
    info!("Index build finished with {} chunks", chunk_count);

    println!("\nVector index build complete!");
    println!("Chunks indexed: {}", chunk_count);
    println!("Collection name: {}", pipeline.config().store.collection_name);
    println!("Database path: {}", pipeline.config().store.db_path.display());
    Ok(())
}

/// Answer one question against an already-built index and print the result.
#[inline]
pub async fn run_query(config: Config, question: &str) -> Result<()> {
    let mut pipeline = RagPipeline::new(config, false)?;

    println!("Question: {}\n", question);
    println!("Generating answer...\n");

    let answer = pipeline.query(question).await?;

    println!("{}", "=".repeat(50));
    println!("Answer:");
    println!("{}", "=".repeat(50));
    println!("{}", answer);
    Ok(())
}
