use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum IndexError {
    #[error("No index found at {0}; a rebuild is required")]
    NotFound(PathBuf),
    #[error("Index location has no usable directory name: {0}")]
    InvalidLocation(PathBuf),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("Duplicate chunk ID: {0}")]
    DuplicateChunkId(String),
    #[error("Empty embedding for chunk {0}")]
    EmptyEmbedding(String),
    #[error("Invalid embedding dimension for chunk {id}: expected {expected}, got {actual}")]
    InvalidDimension {
        id: String,
        expected: usize,
        actual: usize,
    },
    #[error("Index integrity error: {0}")]
    Integrity(String),
}
