//! Document store abstraction.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// A schemaless stored document.
pub type Document = serde_json::Value;

/// The logical collections held by the document store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Collection {
    /// Registered critics, keyed by messaging-platform user id.
    Critics,
    /// Submitted critiques, keyed by store-assigned id.
    Critiques,
    /// Game registrations, keyed by store-assigned id.
    GameRegistrants,
}

impl Collection {
    /// Every collection, in index-listing order.
    pub const ALL: [Self; 3] = [Self::Critics, Self::Critiques, Self::GameRegistrants];

    /// Returns the physical index name backing this collection.
    #[must_use]
    pub fn index_name(self) -> &'static str {
        match self {
            Self::Critics => "telegram_critics",
            Self::Critiques => "telegram_critiques",
            Self::GameRegistrants => "game_registrants",
        }
    }

    /// Resolves a physical index name back to its collection.
    #[must_use]
    pub fn from_index_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.index_name() == name)
    }
}

/// A single full-text search match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    /// Index the document was found in.
    pub index: String,
    /// Document identifier.
    pub id: String,
    /// The stored document.
    pub source: Document,
}

/// Key/value access used by the conversation.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Fetch a document by id. A missing document is `Ok(None)`.
    async fn get(&self, collection: Collection, id: &str) -> Result<Option<Document>, DomainError>;

    /// Write a document and return its id.
    ///
    /// With `Some(id)` this is an upsert (last write wins). With `None` the
    /// store assigns a fresh identifier and the write is always an insert.
    async fn put(
        &self,
        collection: Collection,
        id: Option<&str>,
        document: Document,
    ) -> Result<String, DomainError>;
}

/// Read-only query access used by the HTTP query service.
#[async_trait]
pub trait DocumentSearch: Send + Sync {
    /// List up to `size` documents of a collection.
    async fn list(&self, collection: Collection, size: usize) -> Result<Vec<Document>, DomainError>;

    /// List up to `size` documents whose `field` equals `value` exactly.
    async fn find_by(
        &self,
        collection: Collection,
        field: &str,
        value: serde_json::Value,
        size: usize,
    ) -> Result<Vec<Document>, DomainError>;

    /// Free-text search across every collection.
    async fn search(&self, query: &str, size: usize) -> Result<Vec<SearchHit>, DomainError>;
}
