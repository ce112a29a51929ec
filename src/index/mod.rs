pub mod builder;
pub mod error;
pub mod manifest;
pub mod store;

pub use builder::IndexBuilder;
pub use error::IndexError;
pub use manifest::{ChunkLookup, IndexBuildConfig, IndexManifest, ManifestChunkEntry};
pub use store::{IndexedChunk, VectorIndex};
