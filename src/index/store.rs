// Read side of the index:
// no mutation
// no "update" methods
// a rebuild is the only way to change what is stored

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::document::Passage;
use crate::index::{IndexError, IndexManifest};
use crate::types::{ChunkId, ContentVersion};

pub const MANIFEST_FILE: &str = "manifest.json";
pub const LOOKUP_FILE: &str = "index.json";
pub const CHUNKS_DIR: &str = "chunks";

/// One persisted chunk: its passage and embedding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexedChunk {
    pub id: ChunkId,
    pub version: ContentVersion,
    pub passage: Passage,
    pub embedding: Vec<f32>,
}

impl IndexedChunk {
    pub fn new(id: ChunkId, passage: Passage, embedding: Vec<f32>) -> Self {
        let version = ContentVersion::from_content(passage.content().as_bytes());
        Self {
            id,
            version,
            passage,
            embedding,
        }
    }
}

#[derive(Debug)]
pub struct VectorIndex {
    pub root: PathBuf,
    pub manifest: IndexManifest,
}

impl VectorIndex {
    /// Open an existing index for reading. Never builds one.
    pub fn open(location: &Path) -> Result<Self, IndexError> {
        if !location.is_dir() {
            return Err(IndexError::NotFound(location.to_path_buf()));
        }

        let manifest_path = location.join(MANIFEST_FILE);
        if !manifest_path.is_file() {
            return Err(IndexError::Integrity(format!(
                "{} has no {MANIFEST_FILE}",
                location.display()
            )));
        }

        let f = fs::File::open(&manifest_path)?;
        let manifest: IndexManifest = serde_json::from_reader(f)?;

        if manifest.chunk_count != manifest.chunks.len() {
            return Err(IndexError::Integrity(format!(
                "manifest lists {} chunks but records chunk_count {}",
                manifest.chunks.len(),
                manifest.chunk_count
            )));
        }

        info!(
            location = %location.display(),
            chunks = manifest.chunk_count,
            index_version = %manifest.index_version,
            "opened index"
        );

        Ok(VectorIndex {
            root: location.to_path_buf(),
            manifest,
        })
    }

    pub fn len(&self) -> usize {
        self.manifest.chunk_count
    }

    pub fn is_empty(&self) -> bool {
        self.manifest.chunk_count == 0
    }

    pub fn dimensions(&self) -> Option<usize> {
        self.manifest.dimensions
    }

    pub fn load_chunks(&self) -> Result<Vec<IndexedChunk>, IndexError> {
        let mut loaded = Vec::with_capacity(self.manifest.chunks.len());
        for entry in &self.manifest.chunks {
            let path = self.root.join(&entry.file);
            let f = fs::File::open(&path)?;
            let chunk: IndexedChunk = serde_json::from_reader(f)?;

            if chunk.id != entry.id {
                return Err(IndexError::Integrity(format!(
                    "chunk ID mismatch in {}: manifest says {}, file holds {}",
                    entry.file,
                    entry.id.as_str(),
                    chunk.id.as_str(),
                )));
            }

            // Recompute from content rather than trusting the stored version.
            let expected_version = ContentVersion::from_content(chunk.passage.content().as_bytes());
            if expected_version != entry.version {
                return Err(IndexError::Integrity(format!(
                    "chunk version mismatch for {}: manifest says {}, content hashes to {}",
                    entry.id.as_str(),
                    entry.version.as_str(),
                    expected_version.as_str(),
                )));
            }

            if let Some(expected) = self.manifest.dimensions {
                if chunk.embedding.len() != expected {
                    return Err(IndexError::InvalidDimension {
                        id: entry.id.as_str().to_string(),
                        expected,
                        actual: chunk.embedding.len(),
                    });
                }
            }

            loaded.push(chunk);
        }
        Ok(loaded)
    }

    pub fn passages(&self) -> Result<Vec<Passage>, IndexError> {
        Ok(self
            .load_chunks()?
            .into_iter()
            .map(|chunk| chunk.passage)
            .collect())
    }
}
