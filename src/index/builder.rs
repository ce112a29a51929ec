use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};

use chrono::Utc;
use sha2::{Digest, Sha256};
use tracing::{debug, info, warn};

use crate::index::manifest::{ChunkLookup, IndexBuildConfig, IndexManifest, ManifestChunkEntry};
use crate::index::store::{IndexedChunk, VectorIndex, CHUNKS_DIR, LOOKUP_FILE, MANIFEST_FILE};
use crate::index::IndexError;

/// IndexBuilder is single-threaded and non-reentrant for a given location.
pub struct IndexBuilder {
    config: IndexBuildConfig,
}

impl IndexBuilder {
    pub fn new(config: IndexBuildConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &IndexBuildConfig {
        &self.config
    }

    /// Write `chunks` as a complete index at `output_dir`.
    ///
    /// The index is staged in a sibling directory and only swapped in once
    /// fully written, so a failed build leaves any previous index intact.
    /// The swap itself is two renames (old index aside, staged index in); a
    /// crash between them leaves the old index at `<name>.previous-<hash>`.
    pub fn build(
        &self,
        chunks: Vec<IndexedChunk>,
        output_dir: &Path,
    ) -> Result<VectorIndex, IndexError> {
        // 1. Sort by ID so the output is independent of input order
        let mut sorted = chunks;
        sorted.sort_by(|a, b| a.id.cmp(&b.id));

        for pair in sorted.windows(2) {
            if pair[0].id == pair[1].id {
                return Err(IndexError::DuplicateChunkId(pair[0].id.as_str().to_string()));
            }
        }

        let dimensions = check_dimensions(&sorted)?;

        // 2. Entries, lookup table and the index version
        // "config_json + sorted(chunk_id + ":" + content_version)"
        let mut version_hasher = Sha256::new();
        version_hasher.update(serde_json::to_vec(&self.config)?);

        let mut entries = Vec::with_capacity(sorted.len());
        let mut lookup = BTreeMap::new();
        let mut seen_files = BTreeSet::new();

        for chunk in &sorted {
            let line = format!("{}:{}", chunk.id.as_str(), chunk.version.as_str());
            version_hasher.update(line.as_bytes());

            let file = format!("{CHUNKS_DIR}/{}.json", chunk.id.file_stem());
            if !seen_files.insert(file.clone()) {
                return Err(IndexError::Integrity(format!(
                    "file name collision for chunk {}",
                    chunk.id.as_str()
                )));
            }

            lookup.insert(chunk.id.clone(), file.clone());
            entries.push(ManifestChunkEntry {
                id: chunk.id.clone(),
                version: chunk.version.clone(),
                file,
            });
        }

        let index_version = format!("sha256:{}", hex::encode(version_hasher.finalize()));

        let manifest = IndexManifest {
            index_version: index_version.clone(),
            build_config: self.config.clone(),
            created_at: Utc::now(),
            chunk_count: entries.len(),
            dimensions,
            chunks: entries,
        };

        // 3. Stage
        let tag = &index_version[7..19];
        let staging = sibling(output_dir, "staging", tag)?;

        if staging.exists() {
            warn!(path = %staging.display(), "removing stale staging directory");
            fs::remove_dir_all(&staging)?;
        }
        fs::create_dir_all(staging.join(CHUNKS_DIR))?;

        if let Err(err) = write_staged(&staging, &sorted, &ChunkLookup::new(lookup), &manifest) {
            let _ = fs::remove_dir_all(&staging);
            return Err(err);
        }
        debug!(path = %staging.display(), chunks = sorted.len(), "staged index");

        // 4. Swap
        swap_into_place(&staging, output_dir, tag)?;

        info!(
            location = %output_dir.display(),
            chunks = manifest.chunk_count,
            index_version = %manifest.index_version,
            "index built"
        );

        Ok(VectorIndex {
            root: output_dir.to_path_buf(),
            manifest,
        })
    }
}

fn check_dimensions(chunks: &[IndexedChunk]) -> Result<Option<usize>, IndexError> {
    let Some(first) = chunks.first() else {
        return Ok(None);
    };

    let expected = first.embedding.len();
    for chunk in chunks {
        if chunk.embedding.is_empty() {
            return Err(IndexError::EmptyEmbedding(chunk.id.as_str().to_string()));
        }
        if chunk.embedding.len() != expected {
            return Err(IndexError::InvalidDimension {
                id: chunk.id.as_str().to_string(),
                expected,
                actual: chunk.embedding.len(),
            });
        }
    }
    Ok(Some(expected))
}

fn write_staged(
    staging: &Path,
    chunks: &[IndexedChunk],
    lookup: &ChunkLookup,
    manifest: &IndexManifest,
) -> Result<(), IndexError> {
    for chunk in chunks {
        let file = lookup
            .file_for(&chunk.id)
            .ok_or_else(|| IndexError::Integrity(format!("no file for {}", chunk.id.as_str())))?;
        let f = fs::File::create(staging.join(file))?;
        serde_json::to_writer(&f, chunk)?;
        f.sync_all()?;
    }

    // BTreeMap keeps keys sorted
    let f_lookup = fs::File::create(staging.join(LOOKUP_FILE))?;
    serde_json::to_writer_pretty(&f_lookup, lookup)?;
    f_lookup.sync_all()?;

    let f_manifest = fs::File::create(staging.join(MANIFEST_FILE))?;
    serde_json::to_writer_pretty(&f_manifest, manifest)?;
    f_manifest.sync_all()?;

    Ok(())
}

fn swap_into_place(staging: &Path, output_dir: &Path, tag: &str) -> Result<(), IndexError> {
    if !output_dir.exists() {
        fs::rename(staging, output_dir)?;
        return Ok(());
    }

    let previous = sibling(output_dir, "previous", tag)?;
    if previous.exists() {
        fs::remove_dir_all(&previous)?;
    }

    fs::rename(output_dir, &previous)?;
    if let Err(err) = fs::rename(staging, output_dir) {
        // Put the old index back before reporting.
        if let Err(restore_err) = fs::rename(&previous, output_dir) {
            warn!(
                previous = %previous.display(),
                location = %output_dir.display(),
                error = %restore_err,
                "could not restore previous index; it remains at the backup path"
            );
        }
        return Err(err.into());
    }

    discard_previous(&previous);
    Ok(())
}

// The new index is already live at this point, so a failed cleanup is only
// reported.
fn discard_previous(previous: &Path) {
    debug!(path = %previous.display(), "removing replaced index");
    if let Err(err) = fs::remove_dir_all(previous) {
        warn!(
            path = %previous.display(),
            error = %err,
            "could not remove replaced index"
        );
    }
}

fn sibling(dir: &Path, label: &str, tag: &str) -> Result<PathBuf, IndexError> {
    let name = dir
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| IndexError::InvalidLocation(dir.to_path_buf()))?;
    Ok(dir.with_file_name(format!("{name}.{label}-{tag}")))
}
