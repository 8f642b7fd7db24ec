//! Integration tests for `EsDocumentStore` against a mock Elasticsearch node.

use critics_core::error::DomainError;
use critics_core::repository::{Collection, DocumentSearch, DocumentStore};
use critics_storage::elasticsearch::EsDocumentStore;
use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn store_for(server: &MockServer) -> EsDocumentStore {
    EsDocumentStore::new(&server.uri()).unwrap()
}

fn hits(hits: serde_json::Value) -> serde_json::Value {
    json!({ "took": 1, "timed_out": false, "hits": { "total": { "value": 0 }, "hits": hits } })
}

// --- get ---

#[tokio::test]
async fn test_get_returns_source_of_found_document() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/telegram_critics/_doc/42"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "_index": "telegram_critics",
            "_id": "42",
            "found": true,
            "_source": { "user_id": 42, "first_name": "Ana" }
        })))
        .mount(&server)
        .await;
    let store = store_for(&server);

    let doc = store.get(Collection::Critics, "42").await.unwrap();

    assert_eq!(doc.unwrap()["first_name"], "Ana");
}

#[tokio::test]
async fn test_get_missing_document_is_none() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/telegram_critics/_doc/7"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "_index": "telegram_critics",
            "_id": "7",
            "found": false
        })))
        .mount(&server)
        .await;
    let store = store_for(&server);

    let doc = store.get(Collection::Critics, "7").await.unwrap();

    assert!(doc.is_none());
}

#[tokio::test]
async fn test_get_server_error_is_storage_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503).set_body_string("cluster unavailable"))
        .mount(&server)
        .await;
    let store = store_for(&server);

    let result = store.get(Collection::Critics, "7").await;

    assert!(matches!(result, Err(DomainError::Storage(msg)) if msg.contains("503")));
}

#[tokio::test]
async fn test_unreachable_node_is_storage_error() {
    let store = EsDocumentStore::from_host_port("127.0.0.1", 1).unwrap();

    let result = store.get(Collection::Critics, "7").await;

    assert!(matches!(result, Err(DomainError::Storage(_))));
}

// --- put ---

#[tokio::test]
async fn test_put_with_id_upserts_at_that_id() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/telegram_critics/_doc/42"))
        .and(body_partial_json(json!({ "first_name": "Ana" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "_index": "telegram_critics",
            "_id": "42",
            "result": "updated"
        })))
        .expect(1)
        .mount(&server)
        .await;
    let store = store_for(&server);

    let id = store
        .put(
            Collection::Critics,
            Some("42"),
            json!({ "user_id": 42, "first_name": "Ana" }),
        )
        .await
        .unwrap();

    assert_eq!(id, "42");
}

#[tokio::test]
async fn test_put_without_id_lets_store_assign_one() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/telegram_critiques/_doc"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "_index": "telegram_critiques",
            "_id": "Xy12AbC",
            "result": "created"
        })))
        .expect(1)
        .mount(&server)
        .await;
    let store = store_for(&server);

    let id = store
        .put(Collection::Critiques, None, json!({ "program": "Love Island" }))
        .await
        .unwrap();

    assert_eq!(id, "Xy12AbC");
}

#[tokio::test]
async fn test_rejected_write_is_storage_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/game_registrants/_doc"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": { "type": "mapper_parsing_exception" },
            "status": 400
        })))
        .mount(&server)
        .await;
    let store = store_for(&server);

    let result = store
        .put(Collection::GameRegistrants, None, json!({ "user_id": "x" }))
        .await;

    assert!(
        matches!(result, Err(DomainError::Storage(msg)) if msg.contains("mapper_parsing_exception"))
    );
}

// --- search ---

#[tokio::test]
async fn test_list_sends_match_all_and_returns_sources() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/game_registrants/_search"))
        .and(body_partial_json(json!({ "query": { "match_all": {} }, "size": 1000 })))
        .respond_with(ResponseTemplate::new(200).set_body_json(hits(json!([
            { "_index": "game_registrants", "_id": "a", "_source": { "player_name": "P1" } },
            { "_index": "game_registrants", "_id": "b", "_source": { "player_name": "P2" } }
        ]))))
        .mount(&server)
        .await;
    let store = store_for(&server);

    let docs = store.list(Collection::GameRegistrants, 1000).await.unwrap();

    assert_eq!(docs.len(), 2);
    assert_eq!(docs[1]["player_name"], "P2");
}

#[tokio::test]
async fn test_find_by_program_uses_keyword_term() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/telegram_critiques/_search"))
        .and(body_partial_json(json!({
            "query": { "term": { "program.keyword": "Cooking Show" } }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(hits(json!([
            { "_index": "telegram_critiques", "_id": "a", "_source": { "program": "Cooking Show" } }
        ]))))
        .expect(1)
        .mount(&server)
        .await;
    let store = store_for(&server);

    let docs = store
        .find_by(Collection::Critiques, "program", json!("Cooking Show"), 100)
        .await
        .unwrap();

    assert_eq!(docs.len(), 1);
}

#[tokio::test]
async fn test_search_spans_every_index() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(
            "/telegram_critics,telegram_critiques,game_registrants/_search",
        ))
        .and(query_param("ignore_unavailable", "true"))
        .and(body_partial_json(json!({
            "query": { "multi_match": { "query": "episode", "fuzziness": "AUTO" } }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(hits(json!([
            {
                "_index": "telegram_critiques",
                "_id": "a",
                "_source": { "text_content": "Great episode!" }
            }
        ]))))
        .mount(&server)
        .await;
    let store = store_for(&server);

    let results = store.search("episode", 100).await.unwrap();

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].index, "telegram_critiques");
    assert_eq!(results[0].id, "a");
    assert_eq!(results[0].source["text_content"], "Great episode!");
}

// --- ensure_indices ---

#[tokio::test]
async fn test_ensure_indices_creates_only_missing_indices() {
    // Arrange
    let server = MockServer::start().await;
    Mock::given(method("HEAD"))
        .and(path("/telegram_critics"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;
    Mock::given(method("HEAD"))
        .and(path("/telegram_critiques"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    Mock::given(method("HEAD"))
        .and(path("/game_registrants"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/telegram_critiques"))
        .and(body_partial_json(json!({
            "mappings": { "properties": { "timestamp": { "type": "date" } } }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "acknowledged": true })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/game_registrants"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": { "type": "resource_already_exists_exception" },
            "status": 400
        })))
        .expect(1)
        .mount(&server)
        .await;
    let store = store_for(&server);

    // Act
    let created = store.ensure_indices().await.unwrap();

    // Assert
    assert_eq!(created, vec!["telegram_critiques"]);
}

#[tokio::test]
async fn test_ensure_indices_surfaces_cluster_errors() {
    let server = MockServer::start().await;
    Mock::given(method("HEAD"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;
    let store = store_for(&server);

    let result = store.ensure_indices().await;

    assert!(result.is_err());
}
