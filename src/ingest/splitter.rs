use text_splitter::{Characters, ChunkConfig, TextSplitter};

use crate::document::{keys, Metadata, Passage};
use crate::ingest::IndexerError;

/// Overlapping, character-bounded chunks that break at paragraph and line
/// boundaries before falling back to sentences and words.
pub struct ChunkSplitter {
    splitter: TextSplitter<Characters>,
}

impl ChunkSplitter {
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Result<Self, IndexerError> {
        let config = ChunkConfig::new(chunk_size)
            .with_overlap(chunk_overlap)
            .map_err(|err| IndexerError::Chunking(err.to_string()))?;

        Ok(Self {
            splitter: TextSplitter::new(config),
        })
    }

    /// Split a passage; every chunk inherits its metadata plus `chunk_index`.
    /// Whitespace-only content yields no chunks.
    pub fn split(&self, passage: &Passage) -> Vec<Passage> {
        self.splitter
            .chunks(passage.content())
            .enumerate()
            .map(|(ordinal, chunk)| {
                let mut extra = Metadata::new();
                extra.insert_number(keys::CHUNK_INDEX, ordinal as i64);
                passage.derive(chunk, extra)
            })
            .collect()
    }
}
