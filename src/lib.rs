//! Corpus indexing and token-budgeted context selection for
//! retrieval-augmented generation.
//!
//! `rag-context` loads PDF collections into overlapping chunks, embeds and
//! persists them in an on-disk vector index, and at query time trims a
//! relevance-ordered list of retrieved passages to what fits in a target
//! model's context, counted with that model's exact tokenizer.

pub mod config;
pub mod document;
pub mod index;
pub mod ingest;
pub mod selection;
pub mod types;

pub use selection::filter_context;
