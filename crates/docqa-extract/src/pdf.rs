//! PDF content extractor.
//!
//! Uses pdf-extract for text, page by page, and falls back to lopdf's
//! per-page text operator decoding when pdf-extract fails or yields nothing.

use async_trait::async_trait;
use docqa_core::{ExtractError, ExtractedContent, TextExtractor};
use lopdf::Document;
use std::panic::{catch_unwind, AssertUnwindSafe};
use tracing::{debug, warn};

/// Extractor for PDF documents held in memory.
pub struct PdfExtractor;

impl PdfExtractor {
    /// Create a new PDF extractor.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Default for PdfExtractor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TextExtractor for PdfExtractor {
    fn supported_types(&self) -> &[&str] {
        &["application/pdf"]
    }

    async fn extract_bytes(&self, data: &[u8]) -> Result<ExtractedContent, ExtractError> {
        debug!("Extracting PDF ({} bytes)", data.len());

        if data.is_empty() {
            return Err(ExtractError::Parse("empty document".to_string()));
        }

        // Both parsers are blocking
        let bytes = data.to_vec();
        tokio::task::spawn_blocking(move || extract_pdf(&bytes))
            .await
            .map_err(|e| ExtractError::Failed(format!("Task join error: {e}")))?
    }
}

/// Extract text from PDF bytes, pages in document order.
fn extract_pdf(bytes: &[u8]) -> Result<ExtractedContent, ExtractError> {
    let primary = match extract_with_pdf_extract(bytes) {
        Ok(pages) => {
            let page_count = u32::try_from(pages.len()).ok();
            let text = join_pages(pages);
            if text.trim().is_empty() {
                debug!("pdf-extract found no text, trying lopdf");
                None
            } else {
                return Ok(ExtractedContent { text, page_count });
            }
        }
        Err(e) => {
            warn!("pdf-extract failed ({}), trying lopdf", e);
            Some(e)
        }
    };

    match extract_with_lopdf(bytes) {
        Ok(content) => Ok(content),
        // Report the first parser's error; it is usually the more specific one.
        Err(fallback) => Err(ExtractError::Parse(
            primary.unwrap_or_else(|| fallback.to_string()),
        )),
    }
}

/// Run pdf-extract, turning panics on malformed input into errors.
fn extract_with_pdf_extract(bytes: &[u8]) -> Result<Vec<String>, String> {
    match catch_unwind(AssertUnwindSafe(|| {
        pdf_extract::extract_text_from_mem_by_pages(bytes)
    })) {
        Ok(Ok(pages)) => Ok(pages),
        Ok(Err(e)) => Err(e.to_string()),
        Err(_) => Err("pdf-extract panicked on malformed input".to_string()),
    }
}

/// Decode text operators page by page with lopdf.
fn extract_with_lopdf(bytes: &[u8]) -> Result<ExtractedContent, lopdf::Error> {
    let doc = Document::load_mem(bytes)?;
    let pages = doc.get_pages();

    let mut page_texts = Vec::with_capacity(pages.len());
    for page_num in pages.keys() {
        match doc.extract_text(&[*page_num]) {
            Ok(text) => page_texts.push(text),
            Err(e) => {
                debug!("lopdf could not read page {}: {}", page_num, e);
                page_texts.push(String::new());
            }
        }
    }

    Ok(ExtractedContent {
        text: join_pages(page_texts),
        page_count: u32::try_from(pages.len()).ok(),
    })
}

/// Concatenate pages, each terminated by a newline.
fn join_pages(pages: Vec<String>) -> String {
    let mut text = String::new();
    for page in pages {
        text.push_str(page.trim_end_matches('\n'));
        text.push('\n');
    }
    text
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use lopdf::content::{Content, Operation};
    use lopdf::{dictionary, Object, Stream};

    /// Build a PDF with one page per entry, each page showing its string.
    pub(crate) fn build_pdf(pages: &[&str]) -> Vec<u8> {
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
            let content_id =
                doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
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

    #[tokio::test]
    async fn test_extract_single_page() {
        let pdf = build_pdf(&["The sky is blue. The grass is green."]);
        let content = PdfExtractor::new().extract_bytes(&pdf).await.unwrap();

        assert!(content.text.contains("sky"), "got {:?}", content.text);
        assert_eq!(content.page_count, Some(1));
    }

    #[tokio::test]
    async fn test_extract_preserves_page_order() {
        let pdf = build_pdf(&["Alpha page", "Omega page"]);
        let content = PdfExtractor::new().extract_bytes(&pdf).await.unwrap();

        let alpha = content.text.find("Alpha").expect("first page text");
        let omega = content.text.find("Omega").expect("second page text");
        assert!(alpha < omega);
        assert_eq!(content.page_count, Some(2));
    }

    #[tokio::test]
    async fn test_extract_corrupt_bytes() {
        let err = PdfExtractor::new()
            .extract_bytes(b"definitely not a pdf")
            .await
            .unwrap_err();
        assert!(matches!(err, ExtractError::Parse(_)));
    }

    #[tokio::test]
    async fn test_extract_empty_bytes() {
        let err = PdfExtractor::new().extract_bytes(&[]).await.unwrap_err();
        assert!(matches!(err, ExtractError::Parse(_)));
    }

    #[test]
    fn test_lopdf_fallback_reads_text() {
        let pdf = build_pdf(&["Fallback text here"]);
        let content = extract_with_lopdf(&pdf).unwrap();
        assert!(content.text.contains("Fallback"), "got {:?}", content.text);
    }

    #[test]
    fn test_join_pages() {
        let text = join_pages(vec!["one\n".to_string(), "two".to_string()]);
        assert_eq!(text, "one\ntwo\n");
    }

    #[test]
    fn test_supported_types() {
        assert_eq!(PdfExtractor::new().supported_types(), &["application/pdf"]);
    }
}
