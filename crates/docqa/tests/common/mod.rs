//! Stubs and request helpers shared by the integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, Response};
use docqa_core::{
    AnswerGenerator, EmbedError, EmbeddingConfig, EmbeddingProvider, ExtractError,
    ExtractedContent, GenerateError, GenerationConfig, TextExtractor,
};
use docqa_embed::HashEmbedder;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};
use serde_json::Value;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use std::time::Duration;

pub const BOUNDARY: &str = "docqa-test-boundary";

/// Treats uploaded bytes as the document text.
pub struct Utf8Extractor;

#[async_trait]
impl TextExtractor for Utf8Extractor {
    fn supported_types(&self) -> &[&str] {
        &["text/plain"]
    }

    async fn extract_bytes(&self, data: &[u8]) -> Result<ExtractedContent, ExtractError> {
        let text = std::str::from_utf8(data)
            .map_err(|e| ExtractError::Parse(e.to_string()))?
            .to_string();
        Ok(ExtractedContent {
            text,
            page_count: Some(1),
        })
    }
}

/// Hash embeddings that can be switched to fail or stall.
pub struct SwitchableEmbedder {
    inner: HashEmbedder,
    pub fail: AtomicBool,
    pub stall: AtomicBool,
}

impl SwitchableEmbedder {
    pub fn new() -> Self {
        Self {
            inner: HashEmbedder::new(),
            fail: AtomicBool::new(false),
            stall: AtomicBool::new(false),
        }
    }
}

#[async_trait]
impl EmbeddingProvider for SwitchableEmbedder {
    fn model_name(&self) -> &str {
        "switchable"
    }

    async fn embed_text(
        &self,
        texts: &[&str],
        config: &EmbeddingConfig,
    ) -> Result<Vec<Vec<f32>>, EmbedError> {
        if self.stall.load(Ordering::SeqCst) {
            tokio::time::sleep(Duration::from_secs(30)).await;
        }
        if self.fail.load(Ordering::SeqCst) {
            return Err(EmbedError::Http {
                status: 503,
                message: "Model is currently loading".to_string(),
            });
        }
        self.inner.embed_text(texts, config).await
    }
}

/// Replies with a fixed answer and records every prompt.
pub struct StubGenerator {
    reply: String,
    delay: Duration,
    pub prompts: Mutex<Vec<(String, String)>>,
}

impl StubGenerator {
    pub fn new(reply: &str) -> Self {
        Self::with_delay(reply, Duration::ZERO)
    }

    pub fn with_delay(reply: &str, delay: Duration) -> Self {
        Self {
            reply: reply.to_string(),
            delay,
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn last_user_prompt(&self) -> Option<String> {
        self.prompts.lock().unwrap().last().map(|(_, u)| u.clone())
    }
}

#[async_trait]
impl AnswerGenerator for StubGenerator {
    fn model_name(&self) -> &str {
        "stub"
    }

    async fn complete(
        &self,
        system: &str,
        user: &str,
        _config: &GenerationConfig,
    ) -> Result<String, GenerateError> {
        self.prompts
            .lock()
            .unwrap()
            .push((system.to_string(), user.to_string()));
        tokio::time::sleep(self.delay).await;
        Ok(self.reply.clone())
    }
}

/// Multipart upload with a single field.
pub fn upload_request(field: &str, data: &[u8]) -> Request<Body> {
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
    body.extend_from_slice(
        format!(
            "Content-Disposition: form-data; name=\"{field}\"; filename=\"doc.pdf\"\r\n\
             Content-Type: application/pdf\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

    Request::builder()
        .method("POST")
        .uri("/api/index")
        .header(
            "content-type",
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

/// JSON POST to `/api/ask`.
pub fn ask_request(body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/ask")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn get_request(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

/// Read a JSON response body.
pub async fn json_body(response: Response<Body>) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

/// Build a PDF with one page per entry, each page showing its string.
pub fn build_pdf(pages: &[&str]) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });

    let mut kids = Vec::new();
    for text in pages {
        let content = Content {
            operations: vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), 12.into()]),
                Operation::new("Td", vec![72.into(), 720.into()]),
                Operation::new("Tj", vec![Object::string_literal(*text)]),
                Operation::new("ET", vec![]),
            ],
        };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(page_id.into());
    }

    let count = i64::try_from(kids.len()).unwrap();
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut buf = Vec::new();
    doc.save_to(&mut buf).unwrap();
    buf
}
