use std::fs;
use std::path::Path;

use tracing::debug;

use crate::document::{keys, Metadata, Passage};
use crate::ingest::CollaboratorError;

/// Turns one source file into passages carrying `source` metadata.
pub trait DocumentLoader {
    fn load(&self, path: &Path) -> Result<Vec<Passage>, CollaboratorError>;
}

impl<T: DocumentLoader + ?Sized> DocumentLoader for &T {
    fn load(&self, path: &Path) -> Result<Vec<Passage>, CollaboratorError> {
        (**self).load(path)
    }
}

fn load_error(path: &Path, err: impl std::fmt::Display) -> CollaboratorError {
    CollaboratorError::Load {
        path: path.to_path_buf(),
        message: err.to_string(),
    }
}

fn page_metadata(path: &Path, page: usize, total_pages: usize) -> Metadata {
    let source = path.display().to_string();
    let mut metadata = Metadata::new();
    metadata.insert_string(keys::SOURCE, source.clone());
    metadata.insert_string(keys::FILE_PATH, source);
    metadata.insert_number(keys::PAGE, page as i64);
    metadata.insert_number(keys::TOTAL_PAGES, total_pages as i64);
    metadata
}

/// One passage per PDF page, from the document's text layer.
#[derive(Debug, Default, Clone, Copy)]
pub struct PdfLoader;

impl DocumentLoader for PdfLoader {
    fn load(&self, path: &Path) -> Result<Vec<Passage>, CollaboratorError> {
        let document = lopdf::Document::load(path).map_err(|err| load_error(path, err))?;

        // BTreeMap: page numbers come out sorted.
        let page_numbers: Vec<u32> = document.get_pages().keys().copied().collect();
        let total_pages = page_numbers.len();

        let mut passages = Vec::with_capacity(total_pages);
        for (page, number) in page_numbers.into_iter().enumerate() {
            let text = document
                .extract_text(&[number])
                .map_err(|err| load_error(path, err))?;
            passages.push(Passage::new(text, page_metadata(path, page, total_pages)));
        }

        debug!(path = %path.display(), pages = total_pages, "loaded pdf");
        Ok(passages)
    }
}

/// Whole UTF-8 text file as a single page.
#[derive(Debug, Default, Clone, Copy)]
pub struct PlainTextLoader;

impl DocumentLoader for PlainTextLoader {
    fn load(&self, path: &Path) -> Result<Vec<Passage>, CollaboratorError> {
        let text = fs::read_to_string(path).map_err(|err| load_error(path, err))?;
        Ok(vec![Passage::new(text, page_metadata(path, 0, 1))])
    }
}
