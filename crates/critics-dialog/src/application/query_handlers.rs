//! Query handlers for the Dialog context.
//!
//! Read-only views over the records the conversation writes. Stored
//! documents are decoded into their typed records so a malformed document
//! surfaces as a storage error instead of leaking through.

use critics_core::error::DomainError;
use critics_core::repository::{Collection, Document, DocumentSearch, SearchHit};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::domain::programs::ProgramCatalog;
use crate::domain::records::{Critic, Critique, GameRegistrant, UserId, from_document};

/// Default page size for full collection listings.
pub const DEFAULT_LIST_SIZE: usize = 1000;

/// Default page size for filtered critique listings.
pub const DEFAULT_FILTER_SIZE: usize = 100;

/// Default page size for full-text search.
pub const DEFAULT_SEARCH_SIZE: usize = 100;

/// Largest page the store will return (Elasticsearch's default result
/// window).
pub const MAX_PAGE_SIZE: usize = 10_000;

/// The requested page size, or `default`, capped at [`MAX_PAGE_SIZE`].
#[must_use]
pub fn page_size(requested: Option<usize>, default: usize) -> usize {
    requested.unwrap_or(default).min(MAX_PAGE_SIZE)
}

/// The physical indices backing the store.
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct IndexListView {
    /// Index names in listing order.
    pub indices: Vec<&'static str>,
}

/// Lists the indices the bot writes to.
#[must_use]
pub fn index_names() -> IndexListView {
    IndexListView {
        indices: Collection::ALL.iter().map(|c| c.index_name()).collect(),
    }
}

/// Lists up to `size` registered critics.
///
/// # Errors
///
/// Returns `DomainError::Storage` if the store is unreachable or a document
/// does not decode.
pub async fn list_critics(
    size: usize,
    search: &dyn DocumentSearch,
) -> Result<Vec<Critic>, DomainError> {
    decode_all(search.list(Collection::Critics, size).await?)
}

/// Lists up to `size` critiques.
///
/// # Errors
///
/// Returns `DomainError::Storage` if the store is unreachable or a document
/// does not decode.
pub async fn list_critiques(
    size: usize,
    search: &dyn DocumentSearch,
) -> Result<Vec<Critique>, DomainError> {
    decode_all(search.list(Collection::Critiques, size).await?)
}

/// Lists up to `size` game registrants.
///
/// # Errors
///
/// Returns `DomainError::Storage` if the store is unreachable or a document
/// does not decode.
pub async fn list_game_registrants(
    size: usize,
    search: &dyn DocumentSearch,
) -> Result<Vec<GameRegistrant>, DomainError> {
    decode_all(search.list(Collection::GameRegistrants, size).await?)
}

/// Lists critiques of one program from the catalog.
///
/// # Errors
///
/// Returns `DomainError::Validation` if `program` is not in `catalog`, and
/// `DomainError::Storage` if the lookup fails.
pub async fn critiques_by_program(
    program: &str,
    size: usize,
    catalog: &ProgramCatalog,
    search: &dyn DocumentSearch,
) -> Result<Vec<Critique>, DomainError> {
    if !catalog.contains(program) {
        return Err(DomainError::Validation(format!(
            "invalid program name: {program}"
        )));
    }
    let documents = search
        .find_by(Collection::Critiques, "program", program.into(), size)
        .await?;
    decode_all(documents)
}

/// Lists critiques submitted by one user.
///
/// # Errors
///
/// Returns `DomainError::Storage` if the lookup fails.
pub async fn critiques_by_user(
    user_id: UserId,
    size: usize,
    search: &dyn DocumentSearch,
) -> Result<Vec<Critique>, DomainError> {
    let documents = search
        .find_by(Collection::Critiques, "user_id", user_id.into(), size)
        .await?;
    decode_all(documents)
}

/// Fuzzy full-text search across every index.
///
/// # Errors
///
/// Returns `DomainError::Validation` for a blank query and
/// `DomainError::Storage` if the search fails.
pub async fn search_all(
    query: &str,
    size: usize,
    search: &dyn DocumentSearch,
) -> Result<Vec<SearchHit>, DomainError> {
    let query = query.trim();
    if query.is_empty() {
        return Err(DomainError::Validation("query must not be empty".to_owned()));
    }
    search.search(query, size).await
}

fn decode_all<T: DeserializeOwned>(documents: Vec<Document>) -> Result<Vec<T>, DomainError> {
    documents.into_iter().map(from_document).collect()
}
