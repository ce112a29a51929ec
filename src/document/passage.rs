use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use super::metadata::{keys, Metadata};

#[derive(Debug, Error)]
#[error("No digit run in source to derive a year from: {path}")]
pub struct MetadataExtractionError {
    pub path: String,
}

/// Which part of `source` the year is read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum YearSource {
    /// First digit run anywhere in the source path, directories included.
    #[default]
    SourcePath,
    /// First digit run in the final path component only.
    FileName,
}

/// The atomic unit of retrievable text.
///
/// Content is fixed at construction; only metadata can be enriched, and only
/// by consuming the passage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Passage {
    content: String,
    metadata: Metadata,
}

impl Passage {
    pub fn new(content: impl Into<String>, metadata: Metadata) -> Self {
        Passage {
            content: content.into(),
            metadata,
        }
    }

    /// Build a passage attributed to `source`, recording both `source` and
    /// the `year` parsed from the first digit run of `source`.
    pub fn from_source(
        content: impl Into<String>,
        source: &str,
        metadata: Metadata,
    ) -> Result<Self, MetadataExtractionError> {
        let mut metadata = metadata;
        metadata.insert_string(keys::SOURCE, source);
        Passage::new(content, metadata).with_year_from_source()
    }

    /// Derive `year` from the `source` metadata field.
    pub fn with_year_from_source(self) -> Result<Self, MetadataExtractionError> {
        self.with_year(YearSource::default())
    }

    pub fn with_year(mut self, rule: YearSource) -> Result<Self, MetadataExtractionError> {
        let source = self.metadata.get_str(keys::SOURCE).unwrap_or_default();
        let year = extract_year_with(source, rule)?;
        self.metadata.insert_number(keys::YEAR, year);
        Ok(self)
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    pub fn source(&self) -> Option<&str> {
        self.metadata.get_str(keys::SOURCE)
    }

    pub fn year(&self) -> Option<i64> {
        self.metadata.get_i64(keys::YEAR)
    }

    /// Derive a new passage sharing this one's metadata plus `extra`.
    pub fn derive(&self, content: impl Into<String>, extra: Metadata) -> Passage {
        let mut metadata = self.metadata.clone();
        metadata.merge(extra);
        Passage::new(content, metadata)
    }
}

/// Parse the first run of ASCII digits in `source`.
pub fn extract_year(source: &str) -> Result<i64, MetadataExtractionError> {
    extract_year_with(source, YearSource::SourcePath)
}

pub fn extract_year_with(source: &str, rule: YearSource) -> Result<i64, MetadataExtractionError> {
    let haystack = match rule {
        YearSource::SourcePath => source,
        YearSource::FileName => Path::new(source)
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or(source),
    };

    let digits: String = haystack
        .chars()
        .skip_while(|c| !c.is_ascii_digit())
        .take_while(|c| c.is_ascii_digit())
        .collect();

    digits.parse::<i64>().map_err(|_| MetadataExtractionError {
        path: source.to_string(),
    })
}
