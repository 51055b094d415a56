//! End-to-end API tests: open a package, query and edit it over HTTP

use axum_test::TestServer;
use hanji_core::edit::{self, ParaRef};
use hanji_core::{codec, Document};
use hanji_server::{routes, state::AppState};
use serde_json::{json, Value};

fn test_server() -> TestServer {
    TestServer::new(routes::create_router(AppState::new())).unwrap()
}

fn sample_package() -> Vec<u8> {
    let mut doc = Document::new("API test", "ko");
    edit::set_paragraph_text(&mut doc, ParaRef::new(0, 0), "alpha").unwrap();
    edit::append_paragraph(&mut doc, 0, "beta").unwrap();
    codec::encode(&doc).unwrap()
}

async fn open_sample(server: &TestServer) -> String {
    let response = server
        .post("/api/v1/documents?name=sample")
        .bytes(sample_package().into())
        .await;
    response.assert_status_ok();
    response.json::<Value>()["id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_health() {
    let server = test_server();
    let response = server.get("/health").await;
    response.assert_status_ok();
    assert_eq!(response.text(), "ok");
}

#[tokio::test]
async fn test_open_and_get_text() {
    let server = test_server();
    let id = open_sample(&server).await;

    let response = server.get(&format!("/api/v1/documents/{}/text", id)).await;
    response.assert_status_ok();
    assert_eq!(response.text(), "alpha\nbeta");
}

#[tokio::test]
async fn test_open_rejects_corrupt_package() {
    let server = test_server();
    let response = server
        .post("/api/v1/documents")
        .bytes(b"garbage".to_vec().into())
        .await;
    response.assert_status_bad_request();
    let body = response.json::<Value>();
    assert_eq!(body["error"], "corrupt_package");
}

#[tokio::test]
async fn test_search_and_replace() {
    let server = test_server();
    let id = open_sample(&server).await;

    let response = server
        .get(&format!("/api/v1/documents/{}/search?q=beta", id))
        .await;
    response.assert_status_ok();
    let matches = response.json::<Vec<Value>>();
    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0]["location"]["paragraph"], 1);

    let response = server
        .post(&format!("/api/v1/documents/{}/replace", id))
        .json(&json!({ "target": "beta", "replacement": "gamma" }))
        .await;
    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["replaced"], 1);

    let response = server.get(&format!("/api/v1/documents/{}/text", id)).await;
    assert_eq!(response.text(), "alpha\ngamma");
}

#[tokio::test]
async fn test_delete_last_paragraph_conflicts() {
    let server = test_server();
    let id = open_sample(&server).await;

    // Deleting both paragraphs: second delete would empty the section
    let response = server
        .delete(&format!("/api/v1/documents/{}/paragraphs/0/1", id))
        .await;
    response.assert_status_ok();

    let response = server
        .delete(&format!("/api/v1/documents/{}/paragraphs/0/0", id))
        .await;
    response.assert_status(axum::http::StatusCode::CONFLICT);
    assert_eq!(response.json::<Value>()["error"], "invariant_violation");
}

#[tokio::test]
async fn test_insert_table_and_enumerate() {
    let server = test_server();
    let id = open_sample(&server).await;

    let response = server
        .post(&format!("/api/v1/documents/{}/tables", id))
        .json(&json!({
            "after": { "section": 0, "paragraph": 0 },
            "rows": 3,
            "cols": 4
        }))
        .await;
    response.assert_status_ok();

    let response = server.get(&format!("/api/v1/documents/{}/tables", id)).await;
    let tables = response.json::<Vec<Value>>();
    assert_eq!(tables.len(), 1);
    assert_eq!(tables[0]["rows"], 3);
    assert_eq!(tables[0]["cols"], 4);
}

#[tokio::test]
async fn test_download_round_trips() {
    let server = test_server();
    let id = open_sample(&server).await;

    server
        .post(&format!("/api/v1/documents/{}/replace", id))
        .json(&json!({ "target": "alpha", "replacement": "edited" }))
        .await
        .assert_status_ok();

    let response = server
        .get(&format!("/api/v1/documents/{}/download", id))
        .await;
    response.assert_status_ok();
    let decoded = codec::decode(response.as_bytes()).unwrap();
    assert_eq!(decoded.sections[0].paragraphs[0].text(), "edited");
}

#[tokio::test]
async fn test_unknown_document_is_404() {
    let server = test_server();
    let response = server
        .get("/api/v1/documents/00000000-0000-0000-0000-000000000000/text")
        .await;
    response.assert_status_not_found();
}
