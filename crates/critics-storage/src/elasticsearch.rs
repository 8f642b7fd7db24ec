//! Elasticsearch implementation of the document store traits.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use thiserror::Error;
use tracing::{debug, info, instrument};

use critics_core::error::DomainError;
use critics_core::repository::{Collection, Document, DocumentSearch, DocumentStore, SearchHit};

use crate::schema::{KEYWORD_SUBFIELD, create_index_body};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Failures talking to Elasticsearch.
#[derive(Debug, Error)]
pub enum EsError {
    /// The request could not be sent or the response body not read.
    #[error("elasticsearch request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// Elasticsearch answered with a non-success status.
    #[error("elasticsearch returned {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body, usually a JSON error object.
        body: String,
    },
}

impl From<EsError> for DomainError {
    fn from(e: EsError) -> Self {
        Self::Storage(e.to_string())
    }
}

#[derive(Debug, Deserialize)]
struct GetResponse {
    #[serde(rename = "_source")]
    source: Option<Document>,
}

#[derive(Debug, Deserialize)]
struct WriteResponse {
    #[serde(rename = "_id")]
    id: String,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    hits: HitsEnvelope,
}

#[derive(Debug, Deserialize)]
struct HitsEnvelope {
    hits: Vec<RawHit>,
}

#[derive(Debug, Deserialize)]
struct RawHit {
    #[serde(rename = "_index")]
    index: String,
    #[serde(rename = "_id")]
    id: String,
    #[serde(rename = "_source", default)]
    source: Document,
}

/// `match_all` listing body.
#[must_use]
pub fn match_all_query(size: usize) -> Value {
    json!({ "query": { "match_all": {} }, "size": size })
}

/// Exact-match body. String values are matched against the field's
/// `keyword` sub-field.
#[must_use]
pub fn term_query(field: &str, value: &Value, size: usize) -> Value {
    let field = if value.is_string() {
        format!("{field}.{KEYWORD_SUBFIELD}")
    } else {
        field.to_owned()
    };
    json!({ "query": { "term": { field: value } }, "size": size })
}

/// Fuzzy free-text body over every field. `lenient` keeps numeric and date
/// fields from rejecting text queries.
#[must_use]
pub fn multi_match_query(query: &str, size: usize) -> Value {
    json!({
        "query": {
            "multi_match": {
                "query": query,
                "fields": ["*"],
                "fuzziness": "AUTO",
                "lenient": true
            }
        },
        "size": size
    })
}

/// Document store backed by an Elasticsearch cluster.
#[derive(Debug, Clone)]
pub struct EsDocumentStore {
    client: Client,
    base_url: String,
}

impl EsDocumentStore {
    /// Creates a store that talks to `base_url` (for example
    /// `http://localhost:9200`).
    ///
    /// # Errors
    ///
    /// Returns `EsError::Transport` if the HTTP client cannot be built.
    pub fn new(base_url: &str) -> Result<Self, EsError> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_owned(),
        })
    }

    /// Creates a store for a plain-HTTP node at `host:port`.
    ///
    /// # Errors
    ///
    /// See [`EsDocumentStore::new`].
    pub fn from_host_port(host: &str, port: u16) -> Result<Self, EsError> {
        Self::new(&format!("http://{host}:{port}"))
    }

    /// The cluster URL requests are sent to.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Creates every missing index with its mapping and returns the names
    /// of the indices that were created.
    ///
    /// # Errors
    ///
    /// Returns `EsError` if an existence check or a creation fails for any
    /// reason other than the index already existing.
    pub async fn ensure_indices(&self) -> Result<Vec<&'static str>, EsError> {
        let mut created = Vec::new();
        for collection in Collection::ALL {
            let index = collection.index_name();
            let url = format!("{}/{index}", self.base_url);
            let exists = self.client.head(&url).send().await?;
            match exists.status() {
                status if status.is_success() => {
                    debug!(index, "index present");
                    continue;
                }
                StatusCode::NOT_FOUND => {}
                status => {
                    return Err(EsError::Status {
                        status: status.as_u16(),
                        body: String::new(),
                    });
                }
            }

            let response = self
                .client
                .put(&url)
                .json(&create_index_body(collection))
                .send()
                .await?;
            let status = response.status();
            if status.is_success() {
                info!(index, "created index");
                created.push(index);
                continue;
            }
            let body = response.text().await.unwrap_or_default();
            if status == StatusCode::BAD_REQUEST && body.contains("resource_already_exists_exception")
            {
                debug!(index, "index created concurrently");
                continue;
            }
            return Err(EsError::Status {
                status: status.as_u16(),
                body,
            });
        }
        Ok(created)
    }

    async fn search_index(&self, target: &str, body: &Value) -> Result<Vec<RawHit>, EsError> {
        let url = format!("{}/{target}/_search", self.base_url);
        let response = self
            .client
            .post(&url)
            .query(&[("ignore_unavailable", "true")])
            .json(body)
            .send()
            .await?;
        let parsed: SearchResponse = decode(response).await?;
        Ok(parsed.hits.hits)
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, EsError> {
    let status = response.status();
    if status.is_success() {
        Ok(response.json().await?)
    } else {
        let body = response.text().await.unwrap_or_default();
        Err(EsError::Status {
            status: status.as_u16(),
            body,
        })
    }
}

#[async_trait]
impl DocumentStore for EsDocumentStore {
    #[instrument(skip(self), fields(index = collection.index_name()))]
    async fn get(&self, collection: Collection, id: &str) -> Result<Option<Document>, DomainError> {
        let url = format!("{}/{}/_doc/{id}", self.base_url, collection.index_name());
        let response = self.client.get(&url).send().await.map_err(EsError::from)?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let parsed: GetResponse = decode(response).await?;
        Ok(parsed.source)
    }

    #[instrument(skip(self, document), fields(index = collection.index_name()))]
    async fn put(
        &self,
        collection: Collection,
        id: Option<&str>,
        document: Document,
    ) -> Result<String, DomainError> {
        let index = collection.index_name();
        let request = match id {
            Some(id) => self
                .client
                .put(format!("{}/{index}/_doc/{id}", self.base_url)),
            None => self.client.post(format!("{}/{index}/_doc", self.base_url)),
        };
        let response = request
            .json(&document)
            .send()
            .await
            .map_err(EsError::from)?;
        let parsed: WriteResponse = decode(response).await?;
        debug!(id = %parsed.id, "document written");
        Ok(parsed.id)
    }
}

#[async_trait]
impl DocumentSearch for EsDocumentStore {
    #[instrument(skip(self), fields(index = collection.index_name()))]
    async fn list(&self, collection: Collection, size: usize) -> Result<Vec<Document>, DomainError> {
        let hits = self
            .search_index(collection.index_name(), &match_all_query(size))
            .await?;
        Ok(hits.into_iter().map(|hit| hit.source).collect())
    }

    #[instrument(skip(self), fields(index = collection.index_name()))]
    async fn find_by(
        &self,
        collection: Collection,
        field: &str,
        value: Value,
        size: usize,
    ) -> Result<Vec<Document>, DomainError> {
        let hits = self
            .search_index(collection.index_name(), &term_query(field, &value, size))
            .await?;
        Ok(hits.into_iter().map(|hit| hit.source).collect())
    }

    #[instrument(skip(self))]
    async fn search(&self, query: &str, size: usize) -> Result<Vec<SearchHit>, DomainError> {
        let indices = Collection::ALL
            .iter()
            .map(|c| c.index_name())
            .collect::<Vec<_>>()
            .join(",");
        let hits = self
            .search_index(&indices, &multi_match_query(query, size))
            .await?;
        Ok(hits
            .into_iter()
            .map(|hit| SearchHit {
                index: hit.index,
                id: hit.id,
                source: hit.source,
            })
            .collect())
    }
}
