//! Query answering pipeline.
//!
//! Order of operations for one question: validate → answer-cache lookup →
//! retrieve context → assemble prompt → generate → persist. A cache hit
//! returns before any retrieval or model call. Retrieval defaults to
//! fetching every chunk in the scope in insertion order; when `top_k` is
//! configured the query is embedded and chunks are ranked by cosine
//! similarity instead, with unranked rows (NULL embeddings) excluded.

use std::sync::Arc;

use tracing::{debug, info};

use crate::cache::AnswerCache;
use crate::embedding::{cosine_similarity, EmbeddingProvider};
use crate::error::{Error, Result};
use crate::generation::GenerationProvider;
use crate::models::Sender;
use crate::prompt::build_prompt;
use crate::store::ContentStore;

/// Result of one question, with provenance.
#[derive(Debug, Clone, serde::Serialize)]
pub struct AskOutcome {
    pub answer: String,
    /// True when the answer was served from the cache without touching the
    /// embedding or generation backends.
    pub cache_hit: bool,
}

pub struct AskPipeline {
    store: ContentStore,
    cache: AnswerCache,
    embedder: Arc<dyn EmbeddingProvider>,
    generator: Arc<dyn GenerationProvider>,
    top_k: Option<usize>,
}

impl AskPipeline {
    pub fn new(
        store: ContentStore,
        embedder: Arc<dyn EmbeddingProvider>,
        generator: Arc<dyn GenerationProvider>,
        top_k: Option<usize>,
    ) -> Self {
        let cache = AnswerCache::new(store.clone());
        Self {
            store,
            cache,
            embedder,
            generator,
            top_k,
        }
    }

    /// Answer one question against a scope's stored content.
    ///
    /// On a cache miss the generated answer is recorded twice: as the
    /// canonical `(query, scope)` answer and as an AI turn in the message
    /// log. An empty scope still produces a generation call with an empty
    /// context section.
    pub async fn ask(&self, query: &str, scope: &str, user_id: &str) -> Result<AskOutcome> {
        if query.is_empty() {
            return Err(Error::validation("missing query"));
        }
        if scope.is_empty() {
            return Err(Error::validation("missing scope"));
        }
        if user_id.is_empty() {
            return Err(Error::validation("missing user id"));
        }

        if let Some(answer) = self.cache.lookup(query, scope).await? {
            info!(scope, "answer served from cache");
            return Ok(AskOutcome {
                answer,
                cache_hit: true,
            });
        }

        let chunks = self.retrieve_context(query, scope).await?;
        debug!(scope, chunks = chunks.len(), "context retrieved");

        let prompt = build_prompt(query, &chunks);
        let answer = self.generator.generate(&prompt).await?;

        self.store
            .insert_message(scope, &Sender::ai(), &answer)
            .await?;
        self.cache.store(query, scope, &answer).await?;

        info!(scope, model = self.generator.model_name(), "answer generated");

        Ok(AskOutcome {
            answer,
            cache_hit: false,
        })
    }

    /// Fetch the context chunks for a query. Without `top_k` this is every
    /// chunk in the scope and the query is never embedded; with it, chunks
    /// are ranked by cosine similarity to the query embedding, keeping store
    /// order among the selected rows. A query embedding failure is fatal
    /// here because ranking cannot proceed without it.
    async fn retrieve_context(&self, query: &str, scope: &str) -> Result<Vec<String>> {
        let Some(k) = self.top_k else {
            return self.store.list_chunks(scope).await;
        };

        let query_vec = self.embedder.embed(query).await?;
        let rows = self.store.list_chunks_with_embeddings(scope).await?;

        let mut scored: Vec<(usize, f32, String)> = rows
            .into_iter()
            .enumerate()
            .filter_map(|(pos, (content, embedding))| {
                embedding.map(|vec| (pos, cosine_similarity(&query_vec, &vec), content))
            })
            .collect();

        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(k);
        // Back to insertion order so the prompt reads like the document.
        scored.sort_by_key(|(pos, _, _)| *pos);

        Ok(scored.into_iter().map(|(_, _, content)| content).collect())
    }
}
