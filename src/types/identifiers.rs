use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::path::Path;
use thiserror::Error;

/// Identity of one chunk inside the index.
///
/// Format: `<file name>#p<page>.c<ordinal>`, lowercased.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChunkId(String);

#[derive(Debug, Error)]
pub enum ChunkIdError {
    #[error("Source path has no file name: {0}")]
    MissingFileName(String),
    #[error("Path involves invalid UTF-8")]
    InvalidUtf8,
}

impl ChunkId {
    pub fn new(source: &Path, page: u32, ordinal: usize) -> Result<Self, ChunkIdError> {
        let name = source
            .file_name()
            .ok_or_else(|| ChunkIdError::MissingFileName(source.display().to_string()))?;
        let name = name.to_str().ok_or(ChunkIdError::InvalidUtf8)?;

        Ok(ChunkId(format!("{}#p{page}.c{ordinal}", name.to_lowercase())))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Stable file stem for this chunk: first 12 hex chars of sha256(id).
    pub fn file_stem(&self) -> String {
        let hash = Sha256::digest(self.0.as_bytes());
        hex::encode(hash)[..12].to_string()
    }
}

/// Content hash version.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContentVersion(String);

impl ContentVersion {
    pub fn from_content(content: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(content);

        let hash = hasher.finalize();
        let hex = hex::encode(hash);

        ContentVersion(format!("sha256:{hex}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}
