//! Ingest command - builds a policy index snapshot from documents on disk

use std::path::PathBuf;

use clap::Args;
use tracing::info;

use crate::infrastructure::index::{InMemoryPolicyIndex, IndexedDocument};
use crate::infrastructure::ingestion::{chunk_paragraphs, ChunkingConfig};
use crate::infrastructure::logging;

/// Arguments for the ingest command
#[derive(Args)]
pub struct IngestArgs {
    /// Directory containing policy documents (.md / .txt)
    #[arg(long)]
    pub source_dir: PathBuf,

    /// Where to write the index snapshot
    #[arg(long, default_value = "data/index.json")]
    pub output: PathBuf,

    /// Target chunk size in characters
    #[arg(long, default_value_t = 500)]
    pub chunk_size: usize,
}

/// Build the index snapshot
pub async fn run(args: IngestArgs) -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    logging::init_logging(&crate::config::LoggingConfig::default());

    let chunking = ChunkingConfig::new(args.chunk_size);
    let mut documents = Vec::new();
    let mut file_count = 0;

    let entries = std::fs::read_dir(&args.source_dir).map_err(|e| {
        anyhow::anyhow!("Failed to read {}: {}", args.source_dir.display(), e)
    })?;

    for entry in entries {
        let path = entry?.path();
        let is_policy_file = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| matches!(ext, "md" | "txt"))
            .unwrap_or(false);

        if !is_policy_file {
            continue;
        }

        let document_id = path
            .file_stem()
            .and_then(|stem| stem.to_str())
            .unwrap_or("unknown")
            .to_string();

        let content = std::fs::read_to_string(&path)?;
        let chunks = chunk_paragraphs(&content, &chunking)?;
        let chunk_count = chunks.len();

        for (index, chunk) in chunks.into_iter().enumerate() {
            documents.push(
                IndexedDocument::new(&document_id, chunk)
                    .with_section(format!("chunk-{}", index))
                    .with_metadata("source_file", serde_json::json!(path.display().to_string())),
            );
        }

        info!(document_id = %document_id, chunks = chunk_count, "Ingested document");
        file_count += 1;
    }

    if documents.is_empty() {
        anyhow::bail!(
            "No .md or .txt documents found in {}",
            args.source_dir.display()
        );
    }

    let index = InMemoryPolicyIndex::with_documents(documents);
    let written = index.save_snapshot(&args.output).await?;

    info!(
        files = file_count,
        passages = written,
        output = %args.output.display(),
        "Index snapshot written"
    );

    Ok(())
}
