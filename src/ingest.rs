//! Ingestion pipeline orchestration.
//!
//! Coordinates the full flow for one uploaded document: spool to a unique
//! temp path → partition → chunk → embed → store. The spool file is a
//! scoped resource deleted on every exit path (success, partition failure,
//! store failure) by its [`tempfile::NamedTempFile`] guard, and each request
//! gets its own generated path so concurrent ingestions never collide.
//!
//! Embedding is fail-soft per chunk: a failed or empty embedding stores the
//! chunk text with a NULL vector and moves on. A partition error aborts the
//! document; a store error aborts the remaining chunk stream without rolling
//! back chunks already written.

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use tracing::{info, warn};

use crate::chunk::chunk_blocks;
use crate::config::ChunkingConfig;
use crate::embedding::EmbeddingProvider;
use crate::error::{Error, Result};
use crate::extract;
use crate::models::Sender;
use crate::store::ContentStore;

/// Outcome of one document ingestion.
#[derive(Debug, Default, Clone, serde::Serialize)]
pub struct IngestReport {
    /// Non-empty units produced by the chunker.
    pub units: usize,
    /// Chunk rows written to the store (equals `units` on full success).
    pub stored: usize,
    /// Chunks stored with a usable embedding.
    pub embedded: usize,
    /// Chunks stored with a NULL embedding after an embedding failure.
    pub embedding_failures: usize,
}

pub struct IngestPipeline {
    store: ContentStore,
    embedder: Arc<dyn EmbeddingProvider>,
    chunking: ChunkingConfig,
    spool_dir: PathBuf,
}

impl IngestPipeline {
    pub fn new(
        store: ContentStore,
        embedder: Arc<dyn EmbeddingProvider>,
        chunking: ChunkingConfig,
    ) -> Self {
        Self {
            store,
            embedder,
            chunking,
            spool_dir: std::env::temp_dir(),
        }
    }

    /// Override where transient spool files are created.
    pub fn with_spool_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.spool_dir = dir.into();
        self
    }

    /// Ingest one PDF payload into `scope` on behalf of `producer`.
    ///
    /// Validation failures are rejected before any side effect. The
    /// transient spool file is gone by the time this returns, whatever the
    /// outcome.
    pub async fn ingest_document(
        &self,
        data: &[u8],
        scope: &str,
        producer: &Sender,
    ) -> Result<IngestReport> {
        if scope.is_empty() {
            return Err(Error::validation("missing scope"));
        }
        if producer.id.is_empty() || producer.role.is_empty() {
            return Err(Error::validation("missing sender identity or role"));
        }
        if data.is_empty() {
            return Err(Error::validation("empty document payload"));
        }

        // Unique spool path per request; the guard removes the file on drop,
        // covering every exit path below.
        let mut spool = tempfile::Builder::new()
            .prefix("docqa-ingest-")
            .suffix(".pdf")
            .tempfile_in(&self.spool_dir)
            .map_err(|e| Error::ingestion(format!("could not create spool file: {}", e)))?;
        spool
            .write_all(data)
            .and_then(|_| spool.flush())
            .map_err(|e| Error::ingestion(format!("could not write spool file: {}", e)))?;

        let blocks = extract::partition_pdf(spool.path())?;
        drop(spool);

        let units = chunk_blocks(&blocks, &self.chunking);

        let mut report = IngestReport {
            units: units.len(),
            ..Default::default()
        };

        for unit in &units {
            let embedding = match self.embedder.embed(&unit.text).await {
                Ok(vec) if !vec.is_empty() => {
                    report.embedded += 1;
                    Some(vec)
                }
                Ok(_) => {
                    // No usable vector; keep the text anyway.
                    report.embedding_failures += 1;
                    None
                }
                Err(e) => {
                    warn!(scope, error = %e, "chunk embedding failed, storing without vector");
                    report.embedding_failures += 1;
                    None
                }
            };

            self.store
                .insert_chunk(&unit.text, embedding.as_deref(), scope, producer)
                .await?;
            report.stored += 1;
        }

        info!(
            scope,
            units = report.units,
            embedded = report.embedded,
            embedding_failures = report.embedding_failures,
            "document ingested"
        );

        Ok(report)
    }
}
