use std::path::PathBuf;

use thiserror::Error;

use crate::document::MetadataExtractionError;
use crate::index::IndexError;
use crate::types::ChunkIdError;

/// Failure of an external collaborator (document loader or embedding
/// service), passed through unchanged.
#[derive(Debug, Error)]
pub enum CollaboratorError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Embedding service error: {0}")]
    Embedding(String),
    #[error("Failed to load {path}: {message}")]
    Load { path: PathBuf, message: String },
}

#[derive(Debug, Error)]
pub enum IndexerError {
    #[error("Source directory not found: {0}")]
    SourceDirMissing(PathBuf),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid chunking configuration: {0}")]
    Chunking(String),
    #[error(transparent)]
    Metadata(#[from] MetadataExtractionError),
    #[error(transparent)]
    ChunkId(#[from] ChunkIdError),
    #[error(transparent)]
    Collaborator(#[from] CollaboratorError),
    #[error(transparent)]
    Index(#[from] IndexError),
}
