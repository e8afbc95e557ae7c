pub mod embedder;

use indicatif::{ProgressBar, ProgressStyle};

use crate::db::Database;
use crate::error::Result;
use crate::loader::Document;
use crate::search::store::VectorStore;
use embedder::TextEmbedder;

/// Outcome of one embed-with-cache pass over the corpus
#[derive(Debug, Default)]
pub struct EmbedStats {
    pub embedded: usize,
    pub cache_hits: usize,
}

/// Embeds every document, consulting the cache first, and upserts the
/// vectors into the store. The embedder runs only on cache misses; a
/// fingerprint seen twice in one corpus embeds once.
pub fn embed_corpus(
    db: &Database,
    embedder: &mut dyn TextEmbedder,
    docs: &[Document],
    store: &mut dyn VectorStore,
) -> Result<EmbedStats> {
    let mut stats = EmbedStats::default();
    let model = embedder.model_id().to_string();

    let pb = ProgressBar::new(docs.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} embedding [{bar:40.cyan/blue}] {pos}/{len}")
            .expect("Invalid progress bar template")
            .progress_chars("#>-"),
    );

    for doc in docs {
        let id = doc.path.to_string_lossy().to_string();

        let cached = db.lookup_embedding(&doc.fingerprint, &model)?;
        let vector = match cached {
            Some(v) if v.len() == embedder.dimension() => {
                stats.cache_hits += 1;
                v
            }
            Some(v) => {
                log::warn!(
                    "Cached vector for {:?} has dimension {} (expected {}), re-embedding",
                    doc.path,
                    v.len(),
                    embedder.dimension()
                );
                let v = embedder.embed(&doc.content)?;
                stats.embedded += 1;
                v
            }
            None => {
                let v = embedder.embed(&doc.content)?;
                db.store_embedding(&doc.fingerprint, &model, &v)?;
                stats.embedded += 1;
                v
            }
        };

        store.upsert(&id, vector)?;
        pb.inc(1);
    }

    pb.finish_and_clear();
    log::debug!(
        "Corpus embedded: {} computed, {} cache hits",
        stats.embedded,
        stats.cache_hits
    );

    Ok(stats)
}
