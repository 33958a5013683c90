//! End-to-end tests of the HTTP API with stubbed providers.

mod common;

use axum::http::StatusCode;
use axum::Router;
use common::{
    ask_request, build_pdf, get_request, json_body, upload_request, StubGenerator,
    SwitchableEmbedder, Utf8Extractor,
};
use docqa::config::Config;
use docqa::{app, router};
use docqa_core::TextExtractor;
use docqa_extract::PdfExtractor;
use serde_json::json;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;

const SKY: &str = "The sky is blue. The grass is green.";

struct Harness {
    app: Router,
    embedder: Arc<SwitchableEmbedder>,
    generator: Arc<StubGenerator>,
}

fn test_config() -> Config {
    let mut config = Config::default();
    config.server.static_dir = None;
    config
}

fn harness_with(
    config: Config,
    extractor: Arc<dyn TextExtractor>,
    generator: StubGenerator,
) -> Harness {
    let embedder = Arc::new(SwitchableEmbedder::new());
    let generator = Arc::new(generator);
    let state = app::build_state(
        &config,
        extractor,
        embedder.clone(),
        generator.clone(),
    )
    .unwrap();
    Harness {
        app: router(state, &config.server),
        embedder,
        generator,
    }
}

fn harness(reply: &str) -> Harness {
    harness_with(test_config(), Arc::new(Utf8Extractor), StubGenerator::new(reply))
}

impl Harness {
    async fn upload(&self, data: &[u8]) -> (StatusCode, serde_json::Value) {
        let response = self
            .app
            .clone()
            .oneshot(upload_request("file", data))
            .await
            .unwrap();
        let status = response.status();
        (status, json_body(response).await)
    }

    async fn ask(&self, body: &str) -> (StatusCode, serde_json::Value) {
        let response = self.app.clone().oneshot(ask_request(body)).await.unwrap();
        let status = response.status();
        (status, json_body(response).await)
    }
}

#[tokio::test]
async fn test_single_chunk_document_answer_passes_through() {
    let h = harness("blue");

    let (status, body) = h.upload(SKY.as_bytes()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "ok": true, "chunks": 1, "provider": "HuggingFace" }));

    let (status, body) = h.ask(r#"{"question":"What color is the sky?"}"#).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({
            "answer": "blue",
            "sources": [{ "chunk": 0 }],
            "chunks": 1,
            "llmProvider": "HuggingFace Inference"
        })
    );

    let prompt = h.generator.last_user_prompt().unwrap();
    assert!(prompt.starts_with("QUESTION: What color is the sky?\n\nCONTEXT:\n"));
    assert!(prompt.contains("Chunk 0:\nThe sky is blue."));
}

#[tokio::test]
async fn test_ask_before_upload() {
    let h = harness("unused");
    let (status, body) = h.ask(r#"{"question":"What color is the sky?"}"#).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "error": "No index yet. Upload a PDF first." }));
}

#[tokio::test]
async fn test_upload_without_file_field() {
    let h = harness("unused");
    let response = h
        .app
        .clone()
        .oneshot(upload_request("attachment", SKY.as_bytes()))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        json_body(response).await,
        json!({ "error": "No file uploaded." })
    );
}

#[tokio::test]
async fn test_upload_not_multipart() {
    let h = harness("unused");
    let request = axum::http::Request::builder()
        .method("POST")
        .uri("/api/index")
        .header("content-type", "application/json")
        .body(axum::body::Body::from("{}"))
        .unwrap();
    let response = h.app.clone().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        json_body(response).await,
        json!({ "error": "No file uploaded." })
    );
}

#[tokio::test]
async fn test_upload_empty_file() {
    let h = harness("unused");
    let (status, body) = h.upload(b"").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "error": "No file uploaded." }));
}

#[tokio::test]
async fn test_upload_without_text() {
    let h = harness("unused");
    let (status, body) = h.upload(b"  \n\n \t ").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "error": "No textual content found in PDF." }));
}

#[tokio::test]
async fn test_ask_invalid_question_bodies() {
    let h = harness("unused");
    h.upload(SKY.as_bytes()).await;

    for body in [
        r#"{"question":""}"#,
        r#"{"question":"   "}"#,
        r#"{}"#,
        r#"{"question":42}"#,
        "not json",
    ] {
        let (status, json) = h.ask(body).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "body {body}");
        assert_eq!(json, json!({ "error": "Missing 'question'." }), "body {body}");
    }
    assert!(h.generator.last_user_prompt().is_none());
}

#[tokio::test]
async fn test_blank_question_rejected_before_index_check() {
    let h = harness("unused");
    let (status, body) = h.ask(r#"{"question":" "}"#).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "error": "Missing 'question'." }));
}

#[tokio::test]
async fn test_failed_rebuild_keeps_previous_index() {
    let h = harness("blue");
    let (status, _) = h.upload(SKY.as_bytes()).await;
    assert_eq!(status, StatusCode::OK);

    h.embedder.fail.store(true, Ordering::SeqCst);
    let long = "A different document. ".repeat(400);
    let (status, body) = h.upload(long.as_bytes()).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["error"].as_str().unwrap().contains("503"));

    h.embedder.fail.store(false, Ordering::SeqCst);
    let (status, body) = h.ask(r#"{"question":"What color is the sky?"}"#).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["chunks"], 1);
    assert_eq!(body["sources"], json!([{ "chunk": 0 }]));
}

#[tokio::test]
async fn test_reupload_replaces_index() {
    let h = harness("ok");
    h.upload(SKY.as_bytes()).await;

    let long = "Paragraph text goes here.\n\n".repeat(300);
    let (status, body) = h.upload(long.as_bytes()).await;
    assert_eq!(status, StatusCode::OK);
    let chunks = body["chunks"].as_u64().unwrap();
    assert!(chunks > 1);

    let (_, body) = h.ask(r#"{"question":"paragraph"}"#).await;
    assert_eq!(body["chunks"].as_u64().unwrap(), chunks);
    assert_eq!(body["sources"].as_array().unwrap().len(), 4);
}

#[tokio::test]
async fn test_embedding_timeout_is_gateway_timeout() {
    let mut config = test_config();
    config.embedding.timeout_secs = 1;
    let h = harness_with(config, Arc::new(Utf8Extractor), StubGenerator::new("x"));

    h.embedder.stall.store(true, Ordering::SeqCst);
    let (status, body) = h.upload(SKY.as_bytes()).await;

    assert_eq!(status, StatusCode::GATEWAY_TIMEOUT);
    assert!(body["error"].as_str().unwrap().contains("timed out"));
}

#[tokio::test]
async fn test_generation_timeout_is_gateway_timeout() {
    let mut config = test_config();
    config.generation.timeout_secs = 1;
    let h = harness_with(
        config,
        Arc::new(Utf8Extractor),
        StubGenerator::with_delay("late", Duration::from_secs(30)),
    );
    h.upload(SKY.as_bytes()).await;

    let (status, body) = h.ask(r#"{"question":"What color is the sky?"}"#).await;
    assert_eq!(status, StatusCode::GATEWAY_TIMEOUT);
    assert!(body["error"].as_str().unwrap().contains("timed out"));
}

#[tokio::test]
async fn test_oversized_upload_is_rejected() {
    let mut config = test_config();
    config.server.max_upload_bytes = 1024;
    let h = harness_with(config, Arc::new(Utf8Extractor), StubGenerator::new("x"));

    let big = "x".repeat(8 * 1024);
    let (status, body) = h.upload(big.as_bytes()).await;

    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert!(body["error"].as_str().unwrap().contains("1024"));
}

#[tokio::test]
async fn test_too_many_chunks_is_rejected() {
    let mut config = test_config();
    config.index.max_chunks = 2;
    let h = harness_with(config, Arc::new(Utf8Extractor), StubGenerator::new("x"));

    let long = "word ".repeat(3000);
    let (status, body) = h.upload(long.as_bytes()).await;

    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert!(body["error"].as_str().unwrap().contains("limit is 2"));
}

#[tokio::test]
async fn test_health_reports_index_state() {
    let h = harness("x");

    let response = h.app.clone().oneshot(get_request("/api/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        json_body(response).await,
        json!({ "ok": true, "indexed": false, "chunks": 0 })
    );

    h.upload(SKY.as_bytes()).await;
    let response = h.app.clone().oneshot(get_request("/api/health")).await.unwrap();
    assert_eq!(
        json_body(response).await,
        json!({ "ok": true, "indexed": true, "chunks": 1 })
    );
}

#[tokio::test]
async fn test_real_pdf_upload() {
    let h = harness_with(
        test_config(),
        Arc::new(PdfExtractor::new()),
        StubGenerator::new("blue"),
    );

    let (status, body) = h.upload(&build_pdf(&[SKY])).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["chunks"], 1);

    let (status, body) = h.ask(r#"{"question":"What color is the sky?"}"#).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["answer"], "blue");
    assert!(h.generator.last_user_prompt().unwrap().contains("sky"));
}

#[tokio::test]
async fn test_corrupt_pdf_upload() {
    let h = harness_with(
        test_config(),
        Arc::new(PdfExtractor::new()),
        StubGenerator::new("x"),
    );

    let (status, body) = h.upload(b"%PDF-1.5 this is not really a pdf").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().is_some());
}

#[tokio::test]
async fn test_static_dir_served_as_fallback() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("index.html"), "<h1>docqa</h1>").unwrap();

    let mut config = test_config();
    config.server.static_dir = Some(dir.path().to_path_buf());
    let h = harness_with(config, Arc::new(Utf8Extractor), StubGenerator::new("x"));

    let response = h.app.clone().oneshot(get_request("/")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert_eq!(&bytes[..], b"<h1>docqa</h1>");
}
