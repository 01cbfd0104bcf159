//! Exact-match answer cache.
//!
//! Deduplicates identical queries within a scope: a hit short-circuits the
//! whole query pipeline (no embedding, no LLM call, no new store writes).
//! Cache keys are the raw query text — no trimming, casing, or semantic
//! normalization — so two paraphrases of one question are distinct entries
//! and both invoke the LLM.

use crate::error::Result;
use crate::store::ContentStore;

#[derive(Clone)]
pub struct AnswerCache {
    store: ContentStore,
}

impl AnswerCache {
    pub fn new(store: ContentStore) -> Self {
        Self { store }
    }

    /// Return the previously generated answer for this exact query in this
    /// scope, if one exists.
    pub async fn lookup(&self, query: &str, scope: &str) -> Result<Option<String>> {
        Ok(self
            .store
            .get_answer(query, scope)
            .await?
            .map(|a| a.answer))
    }

    /// Record a freshly generated answer for this query and scope.
    pub async fn store(&self, query: &str, scope: &str, answer: &str) -> Result<()> {
        self.store.put_answer(query, scope, answer).await
    }
}
