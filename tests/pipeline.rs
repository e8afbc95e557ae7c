//! End-to-end pipeline tests with a deterministic stub embedder, so
//! rankings are mechanically verifiable without model files.

use std::path::PathBuf;

use docgrep::db::Database;
use docgrep::error::Result;
use docgrep::indexer::embedder::TextEmbedder;
use docgrep::indexer::{self, EmbedStats};
use docgrep::loader::{fingerprint, Document};
use docgrep::search::store::{MemoryStore, VectorStore};
use docgrep::search;

const DIM: usize = 32;

/// Bag-of-words stub: each token hashes to a bucket, buckets count
/// occurrences. Shared tokens produce positive cosine similarity.
struct StubEmbedder {
    model_id: String,
    calls: usize,
}

impl StubEmbedder {
    fn new(model_id: &str) -> Self {
        Self {
            model_id: model_id.to_string(),
            calls: 0,
        }
    }
}

fn token_bucket(token: &str) -> usize {
    let mut h: u64 = 0;
    for b in token.bytes() {
        h = h.wrapping_mul(31).wrapping_add(b as u64);
    }
    (h % DIM as u64) as usize
}

impl TextEmbedder for StubEmbedder {
    fn embed(&mut self, text: &str) -> Result<Vec<f32>> {
        self.calls += 1;
        let mut v = vec![0.0f32; DIM];
        for token in text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|t| !t.is_empty())
        {
            v[token_bucket(&token.to_lowercase())] += 1.0;
        }
        Ok(v)
    }

    fn dimension(&self) -> usize {
        DIM
    }

    fn model_id(&self) -> &str {
        &self.model_id
    }
}

fn doc(path: &str, content: &str) -> Document {
    Document {
        path: PathBuf::from(path),
        content: content.to_string(),
        fingerprint: fingerprint(content),
    }
}

fn fox_corpus() -> Vec<Document> {
    vec![
        doc("a.txt", "the quick brown fox"),
        doc("b.txt", "lazy dog"),
    ]
}

fn embed(
    db: &Database,
    embedder: &mut StubEmbedder,
    docs: &[Document],
) -> (MemoryStore, EmbedStats) {
    let mut store = MemoryStore::new();
    let stats = indexer::embed_corpus(db, embedder, docs, &mut store).unwrap();
    (store, stats)
}

#[test]
fn test_fox_query_ranks_fox_file_first() {
    let db = Database::open_in_memory().unwrap();
    let mut embedder = StubEmbedder::new("stub-bow-v1");

    let (store, _) = embed(&db, &mut embedder, &fox_corpus());
    let matches = search::rank(&mut embedder, &store, "fox", 1).unwrap();

    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0].path, "a.txt");
    assert!(matches[0].score > 0.0);
}

#[test]
fn test_identical_content_embeds_once() {
    let db = Database::open_in_memory().unwrap();
    let mut embedder = StubEmbedder::new("stub-bow-v1");

    let docs = vec![
        doc("a.txt", "the quick brown fox"),
        doc("a_copy.txt", "the quick brown fox"),
    ];

    let (store, stats) = embed(&db, &mut embedder, &docs);

    // One computation, one cache hit; both files still searchable
    assert_eq!(embedder.calls, 1);
    assert_eq!(stats.embedded, 1);
    assert_eq!(stats.cache_hits, 1);
    assert_eq!(store.len(), 2);
}

#[test]
fn test_second_run_is_all_cache_hits() {
    let db = Database::open_in_memory().unwrap();
    let mut embedder = StubEmbedder::new("stub-bow-v1");

    let (_, first) = embed(&db, &mut embedder, &fox_corpus());
    assert_eq!(first.embedded, 2);

    let calls_after_first = embedder.calls;
    let (_, second) = embed(&db, &mut embedder, &fox_corpus());

    assert_eq!(second.embedded, 0);
    assert_eq!(second.cache_hits, 2);
    assert_eq!(embedder.calls, calls_after_first);
}

#[test]
fn test_model_change_never_reuses_cached_vectors() {
    let db = Database::open_in_memory().unwrap();

    let mut v1 = StubEmbedder::new("stub-bow-v1");
    embed(&db, &mut v1, &fox_corpus());

    // Same content, different model id: everything recomputes
    let mut v2 = StubEmbedder::new("stub-bow-v2");
    let (_, stats) = embed(&db, &mut v2, &fox_corpus());

    assert_eq!(stats.cache_hits, 0);
    assert_eq!(stats.embedded, 2);
    assert_eq!(v2.calls, 2);
}

#[test]
fn test_ranking_is_idempotent() {
    let db = Database::open_in_memory().unwrap();
    let mut embedder = StubEmbedder::new("stub-bow-v1");

    let corpus = vec![
        doc("a.txt", "the quick brown fox jumps over the lazy dog"),
        doc("b.txt", "lazy dog"),
        doc("c.txt", "quick brown cache semantics"),
    ];

    let (store, _) = embed(&db, &mut embedder, &corpus);
    let first = search::rank(&mut embedder, &store, "quick brown", 3).unwrap();

    let (store2, _) = embed(&db, &mut embedder, &corpus);
    let second = search::rank(&mut embedder, &store2, "quick brown", 3).unwrap();

    let flat = |ms: &[search::Match]| -> Vec<(String, f32)> {
        ms.iter().map(|m| (m.path.clone(), m.score)).collect()
    };
    assert_eq!(flat(&first), flat(&second));
}

#[test]
fn test_k_larger_than_corpus_returns_corpus() {
    let db = Database::open_in_memory().unwrap();
    let mut embedder = StubEmbedder::new("stub-bow-v1");

    let (store, _) = embed(&db, &mut embedder, &fox_corpus());
    let matches = search::rank(&mut embedder, &store, "fox", 50).unwrap();

    assert_eq!(matches.len(), 2);
    assert_eq!(matches[0].path, "a.txt");
}

#[test]
fn test_query_is_not_cached() {
    let db = Database::open_in_memory().unwrap();
    let mut embedder = StubEmbedder::new("stub-bow-v1");

    let (store, _) = embed(&db, &mut embedder, &fox_corpus());
    let cached_before = db.count_embeddings().unwrap();

    search::rank(&mut embedder, &store, "fox", 1).unwrap();
    search::rank(&mut embedder, &store, "fox", 1).unwrap();

    // Query embeddings never land in the cache, and are recomputed each time
    assert_eq!(db.count_embeddings().unwrap(), cached_before);
    assert_eq!(embedder.calls, 4);
}
