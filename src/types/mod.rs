pub mod context_bundle;
pub mod identifiers;

pub use context_bundle::{AdmissionPolicy, BudgetMetadata, BudgetedContext};
pub use identifiers::{ChunkId, ChunkIdError, ContentVersion};
