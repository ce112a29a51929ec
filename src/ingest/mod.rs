pub mod embedding;
pub mod error;
pub mod indexer;
pub mod loader;
pub mod splitter;

pub use embedding::{Embedder, OpenAiEmbedder};
pub use error::{CollaboratorError, IndexerError};
pub use indexer::{select_documents, CorpusIndexer, IndexMode};
pub use loader::{DocumentLoader, PdfLoader, PlainTextLoader};
pub use splitter::ChunkSplitter;
