//! Core data types flowing through the ingestion and query pipeline.

/// A structural block produced by PDF partitioning, before chunking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    pub kind: BlockKind,
    pub text: String,
}

/// Classification of a partitioned block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockKind {
    /// A section heading; starts a new chunk during by-title chunking.
    Heading,
    /// Ordinary prose.
    Text,
    /// A column-aligned table, kept distinct from prose.
    Table,
}

/// A chunked unit ready for embedding and storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawUnit {
    pub kind: UnitKind,
    pub text: String,
}

/// Kind of a chunked unit. Tables are first-class and never merged with prose.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitKind {
    Text,
    Table,
}

impl RawUnit {
    pub fn text(text: impl Into<String>) -> Self {
        RawUnit {
            kind: UnitKind::Text,
            text: text.into(),
        }
    }

    pub fn table(text: impl Into<String>) -> Self {
        RawUnit {
            kind: UnitKind::Table,
            text: text.into(),
        }
    }
}

/// Identity under which a stored row was produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sender {
    pub id: String,
    pub role: String,
}

impl Sender {
    pub fn new(id: impl Into<String>, role: impl Into<String>) -> Self {
        Sender {
            id: id.into(),
            role: role.into(),
        }
    }

    /// Synthetic identity under which generated answers are stored.
    pub fn ai() -> Self {
        Sender::new("AI", "ai")
    }
}

/// A persisted chunk or conversational message row.
///
/// Chunks extracted from documents and chat turns share one append-only
/// table, partitioned by `scope`. `embedding` is `None` when the embedding
/// call failed or returned no vector; the content is stored regardless.
#[derive(Debug, Clone)]
pub struct MessageRecord {
    pub id: String,
    pub scope: String,
    pub sender_id: String,
    pub sender_role: String,
    pub content: String,
    pub embedding: Option<Vec<f32>>,
    pub created_at: i64,
}

/// A cached answer keyed by exact query text within a scope.
#[derive(Debug, Clone)]
pub struct Answer {
    pub query: String,
    pub scope: String,
    pub answer: String,
    pub created_at: i64,
}
