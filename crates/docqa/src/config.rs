//! Configuration handling for docqa.
//!
//! Values come from built-in defaults, then an optional TOML file, then
//! environment variables (`HUGGINGFACEHUB_API_KEY`, `PORT`). Variables may
//! also be set in a `.env` file in the working directory; the process
//! environment takes precedence over it.

use anyhow::{bail, Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::warn;

/// Environment variable holding the Hugging Face API token.
pub const API_KEY_ENV: &str = "HUGGINGFACEHUB_API_KEY";

/// Dotenv file read from the working directory.
pub const DOTENV_FILE: &str = ".env";

/// Main configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// HTTP server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Chunking configuration
    #[serde(default)]
    pub chunking: ChunkingConfig,

    /// Index configuration
    #[serde(default)]
    pub index: IndexConfig,

    /// Embedding configuration
    #[serde(default)]
    pub embedding: EmbeddingConfig,

    /// Answer generation configuration
    #[serde(default)]
    pub generation: GenerationConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Hugging Face API token, only ever read from the environment
    #[serde(skip)]
    pub api_key: Option<String>,
}

/// HTTP server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Bind address
    #[serde(default = "default_host")]
    pub host: String,

    /// Listen port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Largest accepted upload body (bytes)
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,

    /// Directory served as the web UI, if it exists
    #[serde(default = "default_static_dir")]
    pub static_dir: Option<PathBuf>,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3001
}

fn default_max_upload_bytes() -> usize {
    20 * 1024 * 1024 // 20MB
}

fn default_static_dir() -> Option<PathBuf> {
    Some(PathBuf::from("public"))
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            max_upload_bytes: default_max_upload_bytes(),
            static_dir: default_static_dir(),
        }
    }
}

/// Chunking configuration. Sizes count characters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkingConfig {
    /// Maximum chunk size
    #[serde(default = "default_chunk_size")]
    pub size: usize,

    /// Overlap between consecutive chunks
    #[serde(default = "default_overlap")]
    pub overlap: usize,
}

fn default_chunk_size() -> usize {
    2000
}

fn default_overlap() -> usize {
    300
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            size: default_chunk_size(),
            overlap: default_overlap(),
        }
    }
}

/// Index configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexConfig {
    /// Maximum chunks per document
    #[serde(default = "default_max_chunks")]
    pub max_chunks: usize,

    /// Chunks retrieved per question
    #[serde(default = "default_top_k")]
    pub top_k: usize,
}

fn default_max_chunks() -> usize {
    docqa_store::DEFAULT_MAX_CHUNKS
}

fn default_top_k() -> usize {
    docqa_core::DEFAULT_TOP_K
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            max_chunks: default_max_chunks(),
            top_k: default_top_k(),
        }
    }
}

/// Which embedding backend to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum EmbeddingProviderKind {
    /// Hugging Face Inference API
    #[default]
    HuggingFace,
    /// Local feature hashing, no network
    Hash,
}

/// Embedding configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    /// Backend
    #[serde(default)]
    pub provider: EmbeddingProviderKind,

    /// Model to use
    #[serde(default = "default_embedding_model")]
    pub model: String,

    /// Inference endpoint
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Texts per request
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Max concurrent embedding requests
    #[serde(default = "default_max_concurrent")]
    pub max_concurrent: usize,

    /// Per-request timeout (seconds)
    #[serde(default = "default_embedding_timeout")]
    pub timeout_secs: u64,

    /// Replace newlines with spaces before embedding
    #[serde(default = "default_strip_newlines")]
    pub strip_newlines: bool,
}

fn default_embedding_model() -> String {
    docqa_embed::huggingface::DEFAULT_MODEL.to_string()
}

fn default_base_url() -> String {
    docqa_embed::huggingface::DEFAULT_BASE_URL.to_string()
}

fn default_batch_size() -> usize {
    32
}

fn default_max_concurrent() -> usize {
    4
}

fn default_embedding_timeout() -> u64 {
    60
}

fn default_strip_newlines() -> bool {
    true
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: EmbeddingProviderKind::default(),
            model: default_embedding_model(),
            base_url: default_base_url(),
            batch_size: default_batch_size(),
            max_concurrent: default_max_concurrent(),
            timeout_secs: default_embedding_timeout(),
            strip_newlines: default_strip_newlines(),
        }
    }
}

/// Answer generation configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationConfig {
    /// Chat model
    #[serde(default = "default_chat_model")]
    pub model: String,

    /// Inference endpoint
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Upper bound on generated tokens
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Sampling temperature
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Request timeout (seconds)
    #[serde(default = "default_generation_timeout")]
    pub timeout_secs: u64,
}

fn default_chat_model() -> String {
    docqa_generate::huggingface::DEFAULT_MODEL.to_string()
}

fn default_max_tokens() -> u32 {
    512
}

fn default_temperature() -> f32 {
    0.2
}

fn default_generation_timeout() -> u64 {
    120
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            model: default_chat_model(),
            base_url: default_base_url(),
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
            timeout_secs: default_generation_timeout(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl Config {
    /// Load from `path` (or the default path), then apply the environment.
    ///
    /// A missing file at the default path yields the defaults; a missing file
    /// at an explicit path is an error.
    pub fn load_from(path: Option<PathBuf>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(&path)?,
            None => match Self::config_path() {
                Some(path) if path.exists() => Self::from_file(&path)?,
                _ => Self::default(),
            },
        };
        let dotenv = read_dotenv(Path::new(DOTENV_FILE))?;
        config.apply_env(layered_env(dotenv, |key| std::env::var(key).ok()));
        config.validate()?;
        Ok(config)
    }

    /// Parse a TOML file without applying the environment.
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        toml::from_str(&text).with_context(|| format!("Failed to parse {}", path.display()))
    }

    /// Apply environment overrides read through `lookup`.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(key) = lookup(API_KEY_ENV).filter(|k| !k.trim().is_empty()) {
            self.api_key = Some(key);
        }
        if let Some(port) = lookup("PORT") {
            match port.trim().parse() {
                Ok(port) => self.server.port = port,
                Err(_) => warn!("Ignoring invalid PORT value: {:?}", port),
            }
        }
    }

    /// Reject settings the pipeline cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.chunking.size == 0 {
            bail!("chunking.size must be greater than 0");
        }
        if self.chunking.overlap >= self.chunking.size {
            bail!(
                "chunking.overlap ({}) must be smaller than chunking.size ({})",
                self.chunking.overlap,
                self.chunking.size
            );
        }
        if self.index.top_k == 0 {
            bail!("index.top_k must be greater than 0");
        }
        if self.embedding.batch_size == 0 {
            bail!("embedding.batch_size must be greater than 0");
        }
        Ok(())
    }

    /// Address the server binds to.
    pub fn socket_addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .with_context(|| {
                format!(
                    "Invalid listen address {}:{}",
                    self.server.host, self.server.port
                )
            })
    }

    /// Chunker settings.
    pub fn chunk_config(&self) -> docqa_core::ChunkConfig {
        docqa_core::ChunkConfig {
            size: self.chunking.size,
            overlap: self.chunking.overlap,
        }
    }

    /// Embedding call settings.
    pub fn embedding_call_config(&self) -> docqa_core::EmbeddingConfig {
        docqa_core::EmbeddingConfig {
            batch_size: self.embedding.batch_size,
            strip_newlines: self.embedding.strip_newlines,
        }
    }

    /// Generation call settings.
    pub fn generation_call_config(&self) -> docqa_core::GenerationConfig {
        docqa_core::GenerationConfig {
            max_tokens: self.generation.max_tokens,
            temperature: self.generation.temperature,
        }
    }

    /// Embedding request timeout.
    pub fn embedding_timeout(&self) -> Duration {
        Duration::from_secs(self.embedding.timeout_secs)
    }

    /// Generation request timeout.
    pub fn generation_timeout(&self) -> Duration {
        Duration::from_secs(self.generation.timeout_secs)
    }

    /// Default config file location.
    pub fn config_path() -> Option<PathBuf> {
        config_dir().map(|dir| dir.join("config.toml"))
    }

    /// Sample configuration file with every option at its default.
    pub fn sample_toml() -> &'static str {
        r#"# docqa configuration
# The Hugging Face token is read from HUGGINGFACEHUB_API_KEY, never from this file.

[server]
host = "0.0.0.0"
port = 3001                      # overridden by PORT
max_upload_bytes = 20971520      # 20MB
static_dir = "public"

[chunking]
size = 2000                      # characters
overlap = 300

[index]
max_chunks = 2000
top_k = 4

[embedding]
provider = "huggingface"         # or "hash" for offline use
model = "sentence-transformers/all-MiniLM-L6-v2"
base_url = "https://router.huggingface.co"
batch_size = 32
max_concurrent = 4
timeout_secs = 60
strip_newlines = true

[generation]
model = "HuggingFaceH4/zephyr-7b-beta"
base_url = "https://router.huggingface.co"
max_tokens = 512
temperature = 0.2
timeout_secs = 120

[logging]
level = "info"
"#
    }
}

/// Read `KEY=value` pairs from a dotenv file. A missing file yields no pairs.
pub fn read_dotenv(path: &Path) -> Result<HashMap<String, String>> {
    if !path.is_file() {
        return Ok(HashMap::new());
    }
    dotenvy::from_path_iter(path)
        .with_context(|| format!("Failed to read {}", path.display()))?
        .collect::<std::result::Result<HashMap<_, _>, _>>()
        .with_context(|| format!("Failed to parse {}", path.display()))
}

/// Environment lookup that consults `process` first, then the dotenv pairs.
pub fn layered_env(
    dotenv: HashMap<String, String>,
    process: impl Fn(&str) -> Option<String>,
) -> impl Fn(&str) -> Option<String> {
    move |key| process(key).or_else(|| dotenv.get(key).cloned())
}

/// Get the config directory for docqa.
pub fn config_dir() -> Option<PathBuf> {
    if let Ok(dir) = std::env::var("DOCQA_CONFIG_DIR") {
        return Some(PathBuf::from(dir));
    }

    ProjectDirs::from("", "", "docqa").map(|dirs| dirs.config_dir().to_path_buf())
}
