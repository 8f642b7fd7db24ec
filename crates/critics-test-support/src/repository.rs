//! Test document stores — mock `DocumentStore`/`DocumentSearch`
//! implementations for tests.

use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;

use async_trait::async_trait;
use critics_core::error::DomainError;
use critics_core::repository::{Collection, Document, DocumentSearch, DocumentStore, SearchHit};

/// A document store held entirely in memory. Store-assigned ids are
/// sequential (`auto-1`, `auto-2`, ...) so tests can predict them.
#[derive(Debug, Default)]
pub struct InMemoryDocumentStore {
    collections: Mutex<HashMap<Collection, BTreeMap<String, Document>>>,
    next_id: Mutex<u64>,
}

impl InMemoryDocumentStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a document under an explicit id.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn insert(&self, collection: Collection, id: &str, document: Document) {
        self.collections
            .lock()
            .unwrap()
            .entry(collection)
            .or_default()
            .insert(id.to_owned(), document);
    }

    /// Returns a snapshot of every document in a collection, ordered by id.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn documents(&self, collection: Collection) -> Vec<(String, Document)> {
        self.collections
            .lock()
            .unwrap()
            .get(&collection)
            .map(|docs| docs.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
            .unwrap_or_default()
    }

    /// Number of documents in a collection.
    pub fn count(&self, collection: Collection) -> usize {
        self.documents(collection).len()
    }

    /// Number of documents across all collections.
    pub fn total(&self) -> usize {
        Collection::ALL.into_iter().map(|c| self.count(c)).sum()
    }

    fn assign_id(&self) -> String {
        let mut next = self.next_id.lock().unwrap();
        *next += 1;
        format!("auto-{next}")
    }
}

fn matches_text(value: &Document, needle: &str) -> bool {
    match value {
        Document::String(s) => s.to_lowercase().contains(needle),
        Document::Number(n) => n.to_string() == needle,
        Document::Array(items) => items.iter().any(|v| matches_text(v, needle)),
        Document::Object(map) => map.values().any(|v| matches_text(v, needle)),
        Document::Bool(_) | Document::Null => false,
    }
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn get(&self, collection: Collection, id: &str) -> Result<Option<Document>, DomainError> {
        Ok(self
            .collections
            .lock()
            .unwrap()
            .get(&collection)
            .and_then(|docs| docs.get(id).cloned()))
    }

    async fn put(
        &self,
        collection: Collection,
        id: Option<&str>,
        document: Document,
    ) -> Result<String, DomainError> {
        let id = id.map_or_else(|| self.assign_id(), str::to_owned);
        self.insert(collection, &id, document);
        Ok(id)
    }
}

#[async_trait]
impl DocumentSearch for InMemoryDocumentStore {
    async fn list(&self, collection: Collection, size: usize) -> Result<Vec<Document>, DomainError> {
        Ok(self
            .documents(collection)
            .into_iter()
            .take(size)
            .map(|(_, doc)| doc)
            .collect())
    }

    async fn find_by(
        &self,
        collection: Collection,
        field: &str,
        value: serde_json::Value,
        size: usize,
    ) -> Result<Vec<Document>, DomainError> {
        Ok(self
            .documents(collection)
            .into_iter()
            .filter(|(_, doc)| doc.get(field) == Some(&value))
            .take(size)
            .map(|(_, doc)| doc)
            .collect())
    }

    async fn search(&self, query: &str, size: usize) -> Result<Vec<SearchHit>, DomainError> {
        let needle = query.to_lowercase();
        Ok(Collection::ALL
            .into_iter()
            .flat_map(|collection| {
                self.documents(collection)
                    .into_iter()
                    .map(move |(id, source)| (collection, id, source))
            })
            .filter(|(_, _, source)| matches_text(source, &needle))
            .take(size)
            .map(|(collection, id, source)| SearchHit {
                index: collection.index_name().to_owned(),
                id,
                source,
            })
            .collect())
    }
}

/// A document store that always returns a storage error. Useful for testing
/// error-handling paths.
#[derive(Debug)]
pub struct FailingDocumentStore;

fn connection_refused() -> DomainError {
    DomainError::Storage("connection refused".into())
}

#[async_trait]
impl DocumentStore for FailingDocumentStore {
    async fn get(&self, _collection: Collection, _id: &str) -> Result<Option<Document>, DomainError> {
        Err(connection_refused())
    }

    async fn put(
        &self,
        _collection: Collection,
        _id: Option<&str>,
        _document: Document,
    ) -> Result<String, DomainError> {
        Err(connection_refused())
    }
}

#[async_trait]
impl DocumentSearch for FailingDocumentStore {
    async fn list(&self, _collection: Collection, _size: usize) -> Result<Vec<Document>, DomainError> {
        Err(connection_refused())
    }

    async fn find_by(
        &self,
        _collection: Collection,
        _field: &str,
        _value: serde_json::Value,
        _size: usize,
    ) -> Result<Vec<Document>, DomainError> {
        Err(connection_refused())
    }

    async fn search(&self, _query: &str, _size: usize) -> Result<Vec<SearchHit>, DomainError> {
        Err(connection_refused())
    }
}

/// A document store whose reads are served from an inner in-memory store
/// while every write fails. Exercises failures that happen after a turn has
/// already read its preconditions.
#[derive(Debug, Default)]
pub struct ReadOnlyDocumentStore {
    inner: InMemoryDocumentStore,
}

impl ReadOnlyDocumentStore {
    /// Wrap a pre-seeded store.
    #[must_use]
    pub fn new(inner: InMemoryDocumentStore) -> Self {
        Self { inner }
    }

    /// The wrapped store, for assertions.
    #[must_use]
    pub fn inner(&self) -> &InMemoryDocumentStore {
        &self.inner
    }
}

#[async_trait]
impl DocumentStore for ReadOnlyDocumentStore {
    async fn get(&self, collection: Collection, id: &str) -> Result<Option<Document>, DomainError> {
        self.inner.get(collection, id).await
    }

    async fn put(
        &self,
        _collection: Collection,
        _id: Option<&str>,
        _document: Document,
    ) -> Result<String, DomainError> {
        Err(DomainError::Storage("index is read-only".into()))
    }
}
