use std::path::Path;

use ort::value::Tensor;

use crate::error::{Error, Result};
use crate::model::ModelSpec;

/// Converts text into a fixed-dimension vector. The pipeline treats this
/// as opaque and potentially slow; any error aborts the run.
pub trait TextEmbedder {
    fn embed(&mut self, text: &str) -> Result<Vec<f32>>;

    /// Length of every vector this embedder produces
    fn dimension(&self) -> usize;

    /// Identifier used to partition the embedding cache
    fn model_id(&self) -> &str;
}

/// ONNX Runtime embedder over a sentence-transformers model
pub struct OnnxEmbedder {
    session: ort::session::Session,
    tokenizer: tokenizers::Tokenizer,
    dimension: usize,
    model_id: String,
    max_tokens: usize,
}

impl OnnxEmbedder {
    /// Loads model.onnx and tokenizer.json from the model directory
    pub fn load(model_dir: &Path, spec: &ModelSpec) -> Result<Self> {
        let model_path = model_dir.join("model.onnx");
        let tokenizer_path = model_dir.join("tokenizer.json");

        let session = ort::session::Session::builder()
            .map_err(|e| Error::Embedder(format!("failed to create ONNX session builder: {}", e)))?
            .with_intra_threads(1)
            .map_err(|e| Error::Embedder(format!("failed to set thread count: {}", e)))?
            .commit_from_file(&model_path)
            .map_err(|e| {
                Error::Embedder(format!("failed to load ONNX model from {:?}: {}", model_path, e))
            })?;

        let tokenizer = tokenizers::Tokenizer::from_file(&tokenizer_path)
            .map_err(|e| Error::Embedder(format!("failed to load tokenizer: {}", e)))?;

        Ok(Self {
            session,
            tokenizer,
            dimension: spec.dimension,
            model_id: spec.id.to_string(),
            max_tokens: 512,
        })
    }

    /// Embeds a single token sequence
    fn embed_tokens(&mut self, input_ids: &[u32], attention_mask: &[u32]) -> Result<Vec<f32>> {
        let seq_len = input_ids.len();

        let input_ids_i64: Vec<i64> = input_ids.iter().map(|&x| x as i64).collect();
        let attention_mask_i64: Vec<i64> = attention_mask.iter().map(|&x| x as i64).collect();
        let token_type_ids: Vec<i64> = vec![0i64; seq_len];

        let shape = vec![1i64, seq_len as i64];

        let input_ids_tensor = Tensor::from_array((shape.clone(), input_ids_i64))
            .map_err(|e| Error::Embedder(format!("failed to create input_ids tensor: {}", e)))?;
        let attention_mask_tensor = Tensor::from_array((shape.clone(), attention_mask_i64))
            .map_err(|e| Error::Embedder(format!("failed to create attention_mask tensor: {}", e)))?;
        let token_type_ids_tensor = Tensor::from_array((shape, token_type_ids))
            .map_err(|e| Error::Embedder(format!("failed to create token_type_ids tensor: {}", e)))?;

        let outputs = self
            .session
            .run(ort::inputs! {
                "input_ids" => input_ids_tensor,
                "attention_mask" => attention_mask_tensor,
                "token_type_ids" => token_type_ids_tensor,
            })
            .map_err(|e| Error::Embedder(format!("ONNX inference failed: {}", e)))?;

        // last_hidden_state: [1, seq_len, dimension]
        let (_shape, data) = outputs[0]
            .try_extract_tensor::<f32>()
            .map_err(|e| Error::Embedder(format!("failed to extract output tensor: {}", e)))?;

        let mask_f32: Vec<f32> = attention_mask.iter().map(|&x| x as f32).collect();
        let embedding = mean_pool_flat(data, &mask_f32, seq_len, self.dimension);

        Ok(l2_normalize(&embedding))
    }

    /// Chunks long text and mean-pools the chunk embeddings
    fn embed_chunked(&mut self, text: &str) -> Result<Vec<f32>> {
        let chunk_size = self.max_tokens - 2; // room for [CLS] and [SEP]
        let overlap = 50;

        let encoding = self
            .tokenizer
            .encode(text, false)
            .map_err(|e| Error::Embedder(format!("tokenization failed: {}", e)))?;

        let all_ids = encoding.get_ids();
        let mut embeddings: Vec<Vec<f32>> = Vec::new();
        let mut start = 0;

        while start < all_ids.len() {
            let end = (start + chunk_size).min(all_ids.len());
            let chunk_ids = &all_ids[start..end];

            let mut padded_ids = vec![101u32]; // [CLS]
            padded_ids.extend_from_slice(chunk_ids);
            padded_ids.push(102); // [SEP]

            let attention_mask: Vec<u32> = vec![1; padded_ids.len()];

            let emb = self.embed_tokens(&padded_ids, &attention_mask)?;
            embeddings.push(emb);

            if end >= all_ids.len() {
                break;
            }
            start = end - overlap;
        }

        if embeddings.is_empty() {
            return Ok(vec![0.0; self.dimension]);
        }

        let mut result = vec![0.0f32; self.dimension];
        for emb in &embeddings {
            for (i, val) in emb.iter().enumerate() {
                result[i] += val;
            }
        }
        let n = embeddings.len() as f32;
        for val in &mut result {
            *val /= n;
        }

        Ok(l2_normalize(&result))
    }
}

impl TextEmbedder for OnnxEmbedder {
    /// Generates an embedding for the given text. Long texts are chunked
    /// with token overlap and mean-pooled. Empty input embeds to the zero
    /// vector without touching the model.
    fn embed(&mut self, text: &str) -> Result<Vec<f32>> {
        let text = text.trim();
        if text.is_empty() {
            return Ok(vec![0.0; self.dimension]);
        }

        let encoding = self
            .tokenizer
            .encode(text, true)
            .map_err(|e| Error::Embedder(format!("tokenization failed: {}", e)))?;

        let token_count = encoding.get_ids().len();

        if token_count <= self.max_tokens {
            self.embed_tokens(encoding.get_ids(), encoding.get_attention_mask())
        } else {
            self.embed_chunked(text)
        }
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn model_id(&self) -> &str {
        &self.model_id
    }
}

/// Mean pooling on a flat f32 slice with shape [1, seq_len, dim]
fn mean_pool_flat(data: &[f32], mask: &[f32], seq_len: usize, dim: usize) -> Vec<f32> {
    let mut result = vec![0.0f32; dim];
    let mut total_weight = 0.0f32;

    for (i, &w) in mask.iter().enumerate().take(seq_len) {
        total_weight += w;
        let offset = i * dim;
        for j in 0..dim {
            result[j] += data[offset + j] * w;
        }
    }

    if total_weight > 0.0 {
        for val in &mut result {
            *val /= total_weight;
        }
    }

    result
}

/// L2 normalization
fn l2_normalize(vec: &[f32]) -> Vec<f32> {
    let norm: f32 = vec.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        vec.iter().map(|x| x / norm).collect()
    } else {
        vec.to_vec()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_l2_normalize() {
        let v = vec![3.0, 4.0];
        let n = l2_normalize(&v);
        assert!((n[0] - 0.6).abs() < 1e-6);
        assert!((n[1] - 0.8).abs() < 1e-6);
    }

    #[test]
    fn test_l2_normalize_zero() {
        let v = vec![0.0, 0.0];
        let n = l2_normalize(&v);
        assert_eq!(n, vec![0.0, 0.0]);
    }

    #[test]
    fn test_mean_pool_flat() {
        // 1 token, dim=3
        let data = vec![1.0, 2.0, 3.0];
        let mask = vec![1.0];
        let result = mean_pool_flat(&data, &mask, 1, 3);
        assert_eq!(result, vec![1.0, 2.0, 3.0]);

        // 2 tokens, dim=2, one masked out
        let data = vec![1.0, 2.0, 3.0, 4.0];
        let mask = vec![1.0, 0.0];
        let result = mean_pool_flat(&data, &mask, 2, 2);
        assert_eq!(result, vec![1.0, 2.0]);
    }
}
