//! # docqa
//!
//! Answers questions about an uploaded PDF. The document is split into
//! overlapping chunks and embedded into an in-memory index; each question
//! retrieves the closest chunks and a chat model answers from them alone.
//!
//! - [`config`]: TOML and environment configuration
//! - [`app`]: Wiring of extractor, chunker, embedder, index and generator
//! - [`server`]: The axum HTTP API

pub mod app;
pub mod config;
pub mod server;

pub use config::Config;
pub use server::{router, AppState};
