//! # docqa-extract
//!
//! Text extraction for uploaded documents.
//!
//! [`PdfExtractor`] implements [`TextExtractor`](docqa_core::TextExtractor)
//! over in-memory PDF bytes:
//!
//! - Text comes from `pdf-extract`, one string per page, pages kept in order
//! - When `pdf-extract` fails or finds nothing, `lopdf` decodes the text
//!   operators of each page instead
//! - Malformed input surfaces as [`ExtractError::Parse`](docqa_core::ExtractError::Parse)
//!
//! ```rust,ignore
//! use docqa_extract::PdfExtractor;
//! use docqa_core::TextExtractor;
//!
//! let content = PdfExtractor::new().extract_bytes(&bytes).await?;
//! println!("{} pages, {} chars", content.page_count.unwrap_or(0), content.text.len());
//! ```

pub mod pdf;

pub use pdf::PdfExtractor;
