pub mod metadata;
pub mod passage;

pub use metadata::{keys, Metadata, MetadataValue};
pub use passage::{extract_year, extract_year_with, MetadataExtractionError, Passage, YearSource};
