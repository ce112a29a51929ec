use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

use crate::types::{ChunkId, ContentVersion};

// Hashed into the index version: changing any field invalidates the index.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct IndexBuildConfig {
    pub version: String,
    pub hash_algorithm: String,
    pub embedding_model: String,
}

impl IndexBuildConfig {
    pub fn v0(embedding_model: impl Into<String>) -> Self {
        Self {
            version: "1".into(),
            hash_algorithm: "sha256".into(),
            embedding_model: embedding_model.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ManifestChunkEntry {
    pub id: ChunkId,
    pub version: ContentVersion,
    pub file: String,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct IndexManifest {
    pub index_version: String,
    pub build_config: IndexBuildConfig,
    pub created_at: DateTime<Utc>, // informational only
    pub chunk_count: usize,
    pub dimensions: Option<usize>,
    pub chunks: Vec<ManifestChunkEntry>,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct ChunkLookup {
    entries: BTreeMap<ChunkId, String>,
}

impl ChunkLookup {
    pub fn new(entries: BTreeMap<ChunkId, String>) -> Self {
        Self { entries }
    }

    pub fn file_for(&self, id: &ChunkId) -> Option<&str> {
        self.entries.get(id).map(String::as_str)
    }
}
