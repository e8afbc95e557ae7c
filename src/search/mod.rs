pub mod store;

use crate::error::Result;
use crate::indexer::embedder::TextEmbedder;
use store::VectorStore;

/// A ranked search result
#[derive(Debug, Clone, serde::Serialize)]
pub struct Match {
    pub path: String,
    pub score: f32,
}

/// Embeds the query and ranks the stored corpus against it.
///
/// The query vector is computed fresh on every invocation and never
/// cached. Scores are 1 - distance, descending; k larger than the corpus
/// returns the whole corpus ranked. No reranking pass.
pub fn rank(
    embedder: &mut dyn TextEmbedder,
    store: &dyn VectorStore,
    query: &str,
    k: usize,
) -> Result<Vec<Match>> {
    let query_vector = embedder.embed(query)?;
    let hits = store.query(&query_vector, k)?;

    Ok(hits
        .into_iter()
        .map(|(path, distance)| Match {
            path,
            score: 1.0 - distance,
        })
        .collect())
}
