use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::document::YearSource;
use crate::ingest::CollaboratorError;

pub const DEFAULT_INDEX_DIR: &str = "vector_index";

/// Settings for the corpus indexing pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexerConfig {
    /// Where the index lives. Relative paths resolve against the caller's
    /// working directory.
    pub index_dir: PathBuf,
    /// Target chunk size, in characters.
    pub chunk_size: usize,
    /// Characters shared between neighbouring chunks.
    pub chunk_overlap: usize,
    /// Cap applied when a build does not pass its own document count.
    pub default_documents: Option<usize>,
    /// Part of each file's source path the `year` is read from.
    #[serde(default)]
    pub year_source: YearSource,
}

impl IndexerConfig {
    pub fn v0() -> Self {
        Self {
            index_dir: PathBuf::from(DEFAULT_INDEX_DIR),
            chunk_size: 1000,
            chunk_overlap: 100,
            default_documents: Some(5),
            year_source: YearSource::SourcePath,
        }
    }

    pub fn with_index_dir(mut self, index_dir: impl AsRef<Path>) -> Self {
        self.index_dir = index_dir.as_ref().to_path_buf();
        self
    }

    pub fn with_year_source(mut self, year_source: YearSource) -> Self {
        self.year_source = year_source;
        self
    }
}

impl Default for IndexerConfig {
    fn default() -> Self {
        Self::v0()
    }
}

/// Settings for the OpenAI-compatible embedding endpoint.
#[derive(Clone, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    pub model: String,
    pub api_base: String,
    #[serde(default, skip_serializing)]
    pub api_key: String,
    pub timeout_secs: u64,
    /// Maximum number of inputs per embeddings request.
    pub batch_size: usize,
}

impl EmbeddingConfig {
    pub const API_KEY_ENV: &'static str = "OPENAI_API_KEY";
    pub const API_BASE_ENV: &'static str = "OPENAI_API_BASE";

    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            model: "text-embedding-ada-002".into(),
            api_base: "https://api.openai.com/v1".into(),
            api_key: api_key.into(),
            timeout_secs: 30,
            batch_size: 64,
        }
    }

    /// Read the API key (required) and base URL (optional) from the
    /// environment.
    pub fn from_env() -> Result<Self, CollaboratorError> {
        let api_key = std::env::var(Self::API_KEY_ENV).map_err(|_| {
            CollaboratorError::Embedding(format!("{} is not set", Self::API_KEY_ENV))
        })?;

        let mut config = Self::new(api_key);
        if let Ok(base) = std::env::var(Self::API_BASE_ENV) {
            config.api_base = base.trim_end_matches('/').to_string();
        }
        Ok(config)
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }
}

// Keeps the key out of logs.
impl std::fmt::Debug for EmbeddingConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmbeddingConfig")
            .field("model", &self.model)
            .field("api_base", &self.api_base)
            .field("timeout_secs", &self.timeout_secs)
            .field("batch_size", &self.batch_size)
            .finish_non_exhaustive()
    }
}
