use std::collections::BTreeMap;

use crate::error::Result;

/// Nearest-neighbor storage over document vectors.
///
/// `query` returns (id, distance) ordered ascending by distance, so lower
/// distance always ranks first regardless of the backing metric.
pub trait VectorStore {
    /// Inserts or replaces the vector stored under `id`
    fn upsert(&mut self, id: &str, vector: Vec<f32>) -> Result<()>;

    /// Returns the k nearest stored vectors, clamped to the store size
    fn query(&self, vector: &[f32], k: usize) -> Result<Vec<(String, f32)>>;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Brute-force cosine store for one run's corpus.
///
/// Distance is 1 - cosine similarity. Ties break on id, so output is
/// deterministic for a fixed corpus.
#[derive(Default)]
pub struct MemoryStore {
    vectors: BTreeMap<String, Vec<f32>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl VectorStore for MemoryStore {
    fn upsert(&mut self, id: &str, vector: Vec<f32>) -> Result<()> {
        self.vectors.insert(id.to_string(), vector);
        Ok(())
    }

    fn query(&self, vector: &[f32], k: usize) -> Result<Vec<(String, f32)>> {
        let mut scored: Vec<(String, f32)> = self
            .vectors
            .iter()
            .map(|(id, v)| (id.clone(), 1.0 - cosine_similarity(vector, v)))
            .collect();

        scored.sort_by(|a, b| {
            a.1.partial_cmp(&b.1)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.0.cmp(&b.0))
        });
        scored.truncate(k);

        Ok(scored)
    }

    fn len(&self) -> usize {
        self.vectors.len()
    }
}

/// Computes cosine similarity between two vectors. Zero-norm input
/// yields 0 rather than NaN.
fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot / (norm_a * norm_b)
}
