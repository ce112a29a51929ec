use std::fs;
use std::path::Path;

use chrono::{TimeZone, Utc};
use rag_context::document::{Metadata, Passage};
use rag_context::index::{IndexBuildConfig, IndexBuilder, IndexError, IndexManifest, IndexedChunk, VectorIndex};
use rag_context::types::ChunkId;
use tempfile::tempdir;

fn chunk(file: &str, ordinal: usize, content: &str, embedding: Vec<f32>) -> IndexedChunk {
    let source = format!("corpus/{file}");
    let passage = Passage::from_source(content, &source, Metadata::new()).unwrap();
    let id = ChunkId::new(Path::new(&source), 0, ordinal).unwrap();
    IndexedChunk::new(id, passage, embedding)
}

fn builder() -> IndexBuilder {
    IndexBuilder::new(IndexBuildConfig::v0("test-embedding"))
}

fn sample_chunks() -> Vec<IndexedChunk> {
    vec![
        chunk("report_2021.pdf", 0, "Revenue grew.", vec![0.1, 0.2, 0.3]),
        chunk("report_2021.pdf", 1, "Costs fell.", vec![0.3, 0.2, 0.1]),
        chunk("report_2022.pdf", 0, "Outlook stable.", vec![0.5, 0.5, 0.0]),
    ]
}

#[test]
fn build_then_open_round_trips_chunks() {
    let dir = tempdir().unwrap();
    let location = dir.path().join("vector_index");

    let built = builder().build(sample_chunks(), &location).unwrap();
    assert_eq!(built.len(), 3);
    assert_eq!(built.dimensions(), Some(3));

    let opened = VectorIndex::open(&location).unwrap();
    assert_eq!(opened.manifest.index_version, built.manifest.index_version);

    let chunks = opened.load_chunks().unwrap();
    let ids: Vec<&str> = chunks.iter().map(|c| c.id.as_str()).collect();
    assert_eq!(
        ids,
        vec!["report_2021.pdf#p0.c0", "report_2021.pdf#p0.c1", "report_2022.pdf#p0.c0"]
    );
    assert_eq!(chunks[2].embedding, vec![0.5, 0.5, 0.0]);
    assert_eq!(chunks[2].passage.year(), Some(2022));

    let passages = opened.passages().unwrap();
    assert_eq!(passages[0].content(), "Revenue grew.");
}

#[test]
fn open_missing_location_fails_without_building() {
    let dir = tempdir().unwrap();
    let location = dir.path().join("vector_index");

    let err = VectorIndex::open(&location).unwrap_err();
    assert!(matches!(err, IndexError::NotFound(ref path) if path == &location));
    assert!(!location.exists(), "open must never create an index");
}

#[test]
fn open_directory_without_manifest_is_an_integrity_error() {
    let dir = tempdir().unwrap();
    let location = dir.path().join("vector_index");
    fs::create_dir(&location).unwrap();

    assert!(matches!(
        VectorIndex::open(&location),
        Err(IndexError::Integrity(_))
    ));
}

#[test]
fn rebuild_replaces_previous_index() {
    let dir = tempdir().unwrap();
    let location = dir.path().join("vector_index");

    builder().build(sample_chunks(), &location).unwrap();
    let rebuilt = builder()
        .build(vec![chunk("memo_2023.pdf", 0, "Only chunk.", vec![1.0, 0.0])], &location)
        .unwrap();

    let opened = VectorIndex::open(&location).unwrap();
    assert_eq!(opened.len(), 1);
    assert_eq!(opened.manifest.index_version, rebuilt.manifest.index_version);
    assert_eq!(opened.load_chunks().unwrap()[0].passage.content(), "Only chunk.");

    // No staging or backup directories are left behind.
    let leftovers: Vec<String> = fs::read_dir(dir.path())
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    assert_eq!(leftovers, vec!["vector_index".to_string()]);
}

#[test]
fn failed_rebuild_keeps_previous_index() {
    let dir = tempdir().unwrap();
    let location = dir.path().join("vector_index");

    let original = builder().build(sample_chunks(), &location).unwrap();

    let mismatched = vec![
        chunk("a_2020.pdf", 0, "one", vec![1.0, 2.0]),
        chunk("b_2020.pdf", 0, "two", vec![1.0]),
    ];
    let err = builder().build(mismatched, &location).unwrap_err();
    assert!(matches!(
        err,
        IndexError::InvalidDimension { expected: 2, actual: 1, .. }
    ));

    let opened = VectorIndex::open(&location).unwrap();
    assert_eq!(opened.manifest.index_version, original.manifest.index_version);
    assert_eq!(opened.load_chunks().unwrap().len(), 3);
}

#[test]
fn duplicate_chunk_ids_are_rejected() {
    let dir = tempdir().unwrap();
    let location = dir.path().join("vector_index");

    let chunks = vec![
        chunk("a_2020.pdf", 0, "one", vec![1.0]),
        chunk("a_2020.pdf", 0, "two", vec![1.0]),
    ];

    let err = builder().build(chunks, &location).unwrap_err();
    assert!(matches!(err, IndexError::DuplicateChunkId(ref id) if id == "a_2020.pdf#p0.c0"));
    assert!(!location.exists());
}

#[test]
fn empty_embeddings_are_rejected() {
    let dir = tempdir().unwrap();
    let location = dir.path().join("vector_index");

    let err = builder()
        .build(vec![chunk("a_2020.pdf", 0, "one", Vec::new())], &location)
        .unwrap_err();
    assert!(matches!(err, IndexError::EmptyEmbedding(_)));
}

#[test]
fn empty_corpus_builds_an_empty_index() {
    let dir = tempdir().unwrap();
    let location = dir.path().join("vector_index");

    let index = builder().build(Vec::new(), &location).unwrap();
    assert!(index.is_empty());
    assert_eq!(index.dimensions(), None);
    assert!(VectorIndex::open(&location).unwrap().load_chunks().unwrap().is_empty());
}

#[test]
fn index_version_ignores_input_order() {
    let dir = tempdir().unwrap();

    let mut reversed = sample_chunks();
    reversed.reverse();

    let a = builder().build(sample_chunks(), &dir.path().join("a")).unwrap();
    let b = builder().build(reversed, &dir.path().join("b")).unwrap();

    assert_eq!(a.manifest.index_version, b.manifest.index_version);
}

#[test]
fn embedding_model_change_changes_index_version() {
    let dir = tempdir().unwrap();

    let a = builder().build(sample_chunks(), &dir.path().join("a")).unwrap();
    let b = IndexBuilder::new(IndexBuildConfig::v0("other-embedding"))
        .build(sample_chunks(), &dir.path().join("b"))
        .unwrap();

    assert_ne!(a.manifest.index_version, b.manifest.index_version);
}

#[test]
fn tampered_chunk_content_fails_integrity_check() {
    let dir = tempdir().unwrap();
    let location = dir.path().join("vector_index");
    let index = builder().build(sample_chunks(), &location).unwrap();

    let entry = &index.manifest.chunks[0];
    let path = location.join(&entry.file);
    let mut stored: serde_json::Value = serde_json::from_slice(&fs::read(&path).unwrap()).unwrap();
    stored["passage"]["content"] = serde_json::Value::String("Revenue shrank.".into());
    fs::write(&path, serde_json::to_vec(&stored).unwrap()).unwrap();

    let opened = VectorIndex::open(&location).unwrap();
    assert!(matches!(opened.load_chunks(), Err(IndexError::Integrity(_))));
}

#[test]
fn rebuilt_files_are_byte_identical_apart_from_timestamp() {
    let dir = tempdir().unwrap();
    let path1 = dir.path().join("one");
    let path2 = dir.path().join("two");

    let index1 = builder().build(sample_chunks(), &path1).unwrap();
    builder().build(sample_chunks(), &path2).unwrap();

    let mut manifest_1: IndexManifest =
        serde_json::from_slice(&fs::read(path1.join("manifest.json")).unwrap()).unwrap();
    let mut manifest_2: IndexManifest =
        serde_json::from_slice(&fs::read(path2.join("manifest.json")).unwrap()).unwrap();
    let fixed_time = Utc.timestamp_opt(0, 0).unwrap();
    manifest_1.created_at = fixed_time;
    manifest_2.created_at = fixed_time;
    assert_eq!(
        serde_json::to_string_pretty(&manifest_1).unwrap(),
        serde_json::to_string_pretty(&manifest_2).unwrap()
    );

    assert_eq!(
        fs::read(path1.join("index.json")).unwrap(),
        fs::read(path2.join("index.json")).unwrap()
    );

    for entry in &index1.manifest.chunks {
        assert_eq!(
            fs::read(path1.join(&entry.file)).unwrap(),
            fs::read(path2.join(&entry.file)).unwrap(),
            "chunk file mismatch: {}",
            entry.file
        );
    }
}
