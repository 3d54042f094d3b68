//! Integration tests for the PostgREST store adapter.
//!
//! Exercises the wire protocol and the error classification against a
//! mock server, including the reconciliation engine's seeding flow end
//! to end over HTTP.

use std::sync::Arc;

use serde_json::{json, Value};
use wiremock::matchers::{body_string_contains, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use folio_core::{
    Contact, ProjectCatalog, ReconciliationEngine, RecordId, RecordSchema, RemoteStore, StoreError,
};
use folio_remote::PostgrestStore;

fn store_for(server: &MockServer) -> PostgrestStore {
    PostgrestStore::new(server.uri(), Some("test-key")).expect("store")
}

#[tokio::test]
async fn test_select_all_fetches_every_row() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/profiles"))
        .and(query_param("select", "*"))
        .and(header("apikey", "test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": RecordId::new().to_string(), "name": "Stored Name" }
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let rows = store_for(&server)
        .select_all("profiles")
        .await
        .expect("select");
    assert_eq!(rows.len(), 1);
    assert_eq!(
        rows[0].get("name").and_then(Value::as_str),
        Some("Stored Name")
    );
}

#[tokio::test]
async fn test_unauthorized_maps_to_permission_denied() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/contact_info"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "message": "JWT expired"
        })))
        .mount(&server)
        .await;

    let result = store_for(&server).select_all("contact_info").await;
    assert!(matches!(
        result,
        Err(StoreError::PermissionDenied { collection }) if collection == "contact_info"
    ));
}

#[tokio::test]
async fn test_row_policy_rejection_maps_to_permission_denied() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/contact_info"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "code": "42501",
            "message": "new row violates row-level security policy for table \"contact_info\""
        })))
        .mount(&server)
        .await;

    let result = store_for(&server)
        .insert("contact_info", json!({ "title": "x" }))
        .await;
    assert!(matches!(result, Err(StoreError::PermissionDenied { .. })));
}

#[tokio::test]
async fn test_missing_relation_maps_to_schema_missing() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/about"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "code": "42P01",
            "message": "relation \"public.about\" does not exist"
        })))
        .mount(&server)
        .await;

    let result = store_for(&server).select_all("about").await;
    assert!(matches!(
        result,
        Err(StoreError::SchemaMissing { collection }) if collection == "about"
    ));
}

#[tokio::test]
async fn test_schema_cache_miss_maps_to_schema_missing() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/projects"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "code": "PGRST205",
            "message": "Could not find the table 'public.projects' in the schema cache"
        })))
        .mount(&server)
        .await;

    let result = store_for(&server).select_all("projects").await;
    assert!(matches!(result, Err(StoreError::SchemaMissing { .. })));
}

#[tokio::test]
async fn test_insert_requests_representation_and_returns_row() {
    let server = MockServer::start().await;
    let id = RecordId::new();
    Mock::given(method("POST"))
        .and(path("/projects"))
        .and(header("Prefer", "return=representation"))
        .and(body_string_contains("New Project"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([
            { "id": id.to_string(), "title": "New Project" }
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let stored = store_for(&server)
        .insert("projects", json!({ "title": "New Project" }))
        .await
        .expect("insert");
    assert_eq!(
        stored.get("id").and_then(Value::as_str),
        Some(id.to_string().as_str())
    );
}

#[tokio::test]
async fn test_upsert_sends_merge_duplicates_preference() {
    let server = MockServer::start().await;
    let id = RecordId::new();
    Mock::given(method("POST"))
        .and(path("/profiles"))
        .and(header(
            "Prefer",
            "resolution=merge-duplicates,return=representation",
        ))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": id.to_string(), "name": "Updated" }
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let stored = store_for(&server)
        .upsert("profiles", json!({ "id": id.to_string(), "name": "Updated" }))
        .await
        .expect("upsert");
    assert_eq!(stored.get("name").and_then(Value::as_str), Some("Updated"));
}

#[tokio::test]
async fn test_delete_filters_by_id() {
    let server = MockServer::start().await;
    let id = RecordId::new();
    Mock::given(method("DELETE"))
        .and(path("/projects"))
        .and(query_param("id", format!("eq.{id}")))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    store_for(&server)
        .delete("projects", id)
        .await
        .expect("delete");
}

#[tokio::test]
async fn test_write_without_representation_is_row_decode() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/projects"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([])))
        .mount(&server)
        .await;

    let result = store_for(&server)
        .insert("projects", json!({ "title": "x" }))
        .await;
    assert!(matches!(result, Err(StoreError::RowDecode(_))));
}

// ---------------------------------------------------------------------------
// Reconciliation over HTTP
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_engine_seeds_empty_collection_over_http() {
    let server = MockServer::start().await;
    let id = RecordId::new();

    Mock::given(method("GET"))
        .and(path("/contact_info"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/contact_info"))
        .and(header("Prefer", "return=representation"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([
            { "id": id.to_string(), "title": "Get In Touch" }
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let store: Arc<dyn RemoteStore> = Arc::new(store_for(&server));
    let engine: ReconciliationEngine<Contact> = ReconciliationEngine::new(store);

    let record = engine.load().await.expect("load");
    assert_eq!(record.id, Some(id));
    assert_eq!(record.title, Contact::defaults().title);
}

#[tokio::test]
async fn test_engine_unflattens_existing_row_over_http() {
    let server = MockServer::start().await;
    let id = RecordId::new();

    // A row missing the github column: the compiled-in default fills it.
    Mock::given(method("GET"))
        .and(path("/contact_info"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            "id": id.to_string(),
            "title": "Say Hello",
            "subtitle": "sub",
            "description": "desc",
            "email": "stored@example.com",
            "phone": "1234",
            "linkedin": "https://linkedin.example/stored",
            "updated_at": 10,
        }])))
        .mount(&server)
        .await;

    let store: Arc<dyn RemoteStore> = Arc::new(store_for(&server));
    let engine: ReconciliationEngine<Contact> = ReconciliationEngine::new(store);

    let record = engine.load().await.expect("load");
    assert_eq!(record.id, Some(id));
    assert_eq!(record.title, "Say Hello");
    assert_eq!(record.socials.linkedin, "https://linkedin.example/stored");
    assert_eq!(record.socials.github, Contact::defaults().socials.github);
}

#[tokio::test]
async fn test_catalog_seed_failure_is_non_fatal_over_http() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/projects"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;
    // Every seed insert is rejected by the row policy.
    Mock::given(method("POST"))
        .and(path("/projects"))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({
            "message": "permission denied for table projects"
        })))
        .mount(&server)
        .await;

    let store: Arc<dyn RemoteStore> = Arc::new(store_for(&server));
    let catalog = ProjectCatalog::new(store);

    // The load itself succeeds; nothing was persisted.
    let projects = catalog.load().await.expect("load");
    assert!(projects.is_empty());
}
