use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::config::IndexerConfig;
use crate::document::{keys, Passage};
use crate::index::{IndexBuildConfig, IndexBuilder, IndexedChunk, VectorIndex};
use crate::ingest::{ChunkSplitter, CollaboratorError, DocumentLoader, Embedder, IndexerError};
use crate::types::ChunkId;

/// What to do with the index at the configured location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IndexMode {
    /// Rebuild from `source_dir`, replacing any existing index.
    Build {
        source_dir: PathBuf,
        documents: Option<usize>,
    },
    /// Open the existing index; fail if there is none.
    Open,
}

/// Loads, chunks, embeds and persists a directory of documents.
pub struct CorpusIndexer<L, E> {
    config: IndexerConfig,
    loader: L,
    embedder: E,
    splitter: ChunkSplitter,
}

impl<L, E> CorpusIndexer<L, E>
where
    L: DocumentLoader,
    E: Embedder,
{
    pub fn new(config: IndexerConfig, loader: L, embedder: E) -> Result<Self, IndexerError> {
        let splitter = ChunkSplitter::new(config.chunk_size, config.chunk_overlap)?;
        Ok(Self {
            config,
            loader,
            embedder,
            splitter,
        })
    }

    pub fn config(&self) -> &IndexerConfig {
        &self.config
    }

    pub fn run(&self, mode: IndexMode) -> Result<VectorIndex, IndexerError> {
        match mode {
            IndexMode::Build {
                source_dir,
                documents,
            } => self.build(&source_dir, documents),
            IndexMode::Open => self.open(),
        }
    }

    pub fn open(&self) -> Result<VectorIndex, IndexerError> {
        Ok(VectorIndex::open(&self.config.index_dir)?)
    }

    /// Build using the configured default document cap.
    pub fn build_default(&self, source_dir: &Path) -> Result<VectorIndex, IndexerError> {
        self.build(source_dir, self.config.default_documents)
    }

    /// Rebuild the index from the files in `source_dir`.
    ///
    /// With `documents = Some(n)` only the last `n` files in listing order
    /// are read. Nothing is retried; the first failure is returned and any
    /// previous index stays in place.
    pub fn build(
        &self,
        source_dir: &Path,
        documents: Option<usize>,
    ) -> Result<VectorIndex, IndexerError> {
        let files = select_documents(source_dir, documents)?;
        info!(
            source_dir = %source_dir.display(),
            files = files.len(),
            "building index"
        );

        let mut passages = Vec::new();
        for file in &files {
            for passage in self.loader.load(file)? {
                passages.push(passage.with_year(self.config.year_source)?);
            }
        }
        debug!(passages = passages.len(), "loaded passages");

        let mut ids = Vec::new();
        let mut chunks = Vec::new();
        for passage in &passages {
            for (ordinal, chunk) in self.splitter.split(passage).into_iter().enumerate() {
                ids.push(chunk_id(&chunk, ordinal)?);
                chunks.push(chunk);
            }
        }
        debug!(chunks = chunks.len(), "split passages");

        let texts: Vec<String> = chunks.iter().map(|c| c.content().to_string()).collect();
        let embeddings = self.embedder.embed_batch(&texts)?;
        if embeddings.len() != chunks.len() {
            return Err(CollaboratorError::Embedding(format!(
                "embedded {} of {} chunks",
                embeddings.len(),
                chunks.len()
            ))
            .into());
        }

        let records: Vec<IndexedChunk> = ids
            .into_iter()
            .zip(chunks)
            .zip(embeddings)
            .map(|((id, chunk), embedding)| IndexedChunk::new(id, chunk, embedding))
            .collect();

        let builder = IndexBuilder::new(IndexBuildConfig::v0(self.embedder.model()));
        Ok(builder.build(records, &self.config.index_dir)?)
    }
}

fn chunk_id(chunk: &Passage, ordinal: usize) -> Result<ChunkId, IndexerError> {
    let source = chunk.source().unwrap_or_default();
    let page = chunk
        .metadata()
        .get_i64(keys::PAGE)
        .and_then(|page| u32::try_from(page).ok())
        .unwrap_or(0);
    Ok(ChunkId::new(Path::new(source), page, ordinal)?)
}

/// Regular files of `source_dir` sorted by file name; with a cap, only the
/// last `min(cap, len)` of them.
pub fn select_documents(
    source_dir: &Path,
    documents: Option<usize>,
) -> Result<Vec<PathBuf>, IndexerError> {
    if !source_dir.is_dir() {
        return Err(IndexerError::SourceDirMissing(source_dir.to_path_buf()));
    }

    let mut files = Vec::new();
    for entry in fs::read_dir(source_dir)? {
        let entry = entry?;
        if entry.file_type()?.is_file() {
            files.push(entry.path());
        }
    }
    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));

    if let Some(cap) = documents {
        let keep = cap.min(files.len());
        files = files.split_off(files.len() - keep);
    }

    Ok(files)
}
