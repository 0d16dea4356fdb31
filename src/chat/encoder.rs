//! Candle-based sentence encoder.
//!
//! Runs sentence-transformers/all-MiniLM-L6-v2 locally on CPU: tokenize,
//! BERT forward pass, mean pooling over real tokens, unit normalization.
//! Model files are fetched from HuggingFace Hub on first run and cached.

use candle_core::{DType, Device, Tensor};
use candle_nn::VarBuilder;
use candle_transformers::models::bert::{BertModel, Config as BertConfig};
use std::path::{Path, PathBuf};
use tokenizers::Tokenizer;

use super::embedding::{Embedding, SentenceEncoder};
use super::ChatError;

/// HuggingFace repository the model is pulled from
pub const MODEL_REPO: &str = "sentence-transformers/all-MiniLM-L6-v2";

/// Embedding dimension of all-MiniLM-L6-v2
pub const EMBEDDING_DIM: usize = 384;

/// Token sequence length cap
pub const MAX_SEQ_LEN: usize = 256;

const MODEL_FILES: [&str; 3] = ["config.json", "tokenizer.json", "model.safetensors"];

/// CPU inference encoder for all-MiniLM-L6-v2.
pub struct MiniLmEncoder {
    model: BertModel,
    tokenizer: Tokenizer,
    device: Device,
}

impl MiniLmEncoder {
    /// Load the model from `cache_dir`, downloading missing files first.
    pub fn load(cache_dir: &Path) -> Result<Self, ChatError> {
        let model_dir = ensure_model_files(cache_dir)?;

        tracing::info!(model = MODEL_REPO, "Loading embedding model");

        let device = Device::Cpu;

        let config_str = std::fs::read_to_string(model_dir.join("config.json"))?;
        let config: BertConfig = serde_json::from_str(&config_str)
            .map_err(|e| ChatError::Encode(format!("Invalid model config: {}", e)))?;

        let tokenizer = Tokenizer::from_file(model_dir.join("tokenizer.json"))
            .map_err(|e| ChatError::Tokenizer(e.to_string()))?;

        let vb = unsafe {
            VarBuilder::from_mmaped_safetensors(
                &[model_dir.join("model.safetensors")],
                DType::F32,
                &device,
            )?
        };
        let model = BertModel::load(vb, &config)?;

        tracing::info!(dim = EMBEDDING_DIM, "Embedding model ready");

        Ok(Self {
            model,
            tokenizer,
            device,
        })
    }
}

impl SentenceEncoder for MiniLmEncoder {
    fn encode(&self, text: &str) -> Result<Embedding, ChatError> {
        let mut embeddings = self.encode_batch(&[text])?;
        embeddings
            .pop()
            .ok_or_else(|| ChatError::Encode("empty batch result".to_string()))
    }

    fn encode_batch(&self, texts: &[&str]) -> Result<Vec<Embedding>, ChatError> {
        if texts.is_empty() {
            return Ok(vec![]);
        }

        let encodings = self
            .tokenizer
            .encode_batch(texts.to_vec(), true)
            .map_err(|e| ChatError::Tokenizer(e.to_string()))?;

        let seq_len = encodings
            .iter()
            .map(|e| e.get_ids().len())
            .max()
            .unwrap_or(0)
            .min(MAX_SEQ_LEN);

        // Flatten into padded (batch, seq_len) buffers
        let batch = texts.len();
        let mut ids = Vec::with_capacity(batch * seq_len);
        let mut mask = Vec::with_capacity(batch * seq_len);
        for encoding in &encodings {
            let take = encoding.get_ids().len().min(seq_len);
            ids.extend_from_slice(&encoding.get_ids()[..take]);
            mask.extend_from_slice(&encoding.get_attention_mask()[..take]);
            ids.extend(std::iter::repeat(0u32).take(seq_len - take));
            mask.extend(std::iter::repeat(0u32).take(seq_len - take));
        }

        let input_ids = Tensor::from_vec(ids, (batch, seq_len), &self.device)?;
        let attention_mask = Tensor::from_vec(mask, (batch, seq_len), &self.device)?;
        let token_type_ids = Tensor::zeros_like(&input_ids)?;

        let hidden = self
            .model
            .forward(&input_ids, &token_type_ids, Some(&attention_mask))?;

        let pooled = mean_pool(&hidden, &attention_mask)?;
        let rows: Vec<Vec<f32>> = pooled.to_vec2()?;

        Ok(rows.into_iter().map(Embedding::new).collect())
    }
}

/// Mean pooling over token embeddings, ignoring padding positions.
fn mean_pool(hidden: &Tensor, attention_mask: &Tensor) -> Result<Tensor, ChatError> {
    let mask = attention_mask
        .unsqueeze(2)?
        .broadcast_as(hidden.shape())?
        .to_dtype(DType::F32)?;

    let summed = hidden.broadcast_mul(&mask)?.sum(1)?;
    let counts = mask.sum(1)?.clamp(1e-9, f64::MAX)?;

    Ok(summed.broadcast_div(&counts)?)
}

/// Make sure all model files exist under the cache, downloading any that
/// are missing. Returns the model directory.
fn ensure_model_files(cache_dir: &Path) -> Result<PathBuf, ChatError> {
    let model_dir = cache_dir.join(MODEL_REPO.replace('/', "_"));

    let cached = MODEL_FILES.iter().all(|f| model_dir.join(f).exists());
    if cached {
        tracing::debug!(path = ?model_dir, "Using cached model files");
        return Ok(model_dir);
    }

    tracing::info!(repo = MODEL_REPO, "Downloading model files");
    std::fs::create_dir_all(&model_dir)?;

    let api = hf_hub::api::sync::Api::new().map_err(|e| ChatError::Download(e.to_string()))?;
    let repo = api.model(MODEL_REPO.to_string());

    for filename in MODEL_FILES {
        let fetched = repo
            .get(filename)
            .map_err(|e| ChatError::Download(format!("{}: {}", filename, e)))?;
        std::fs::copy(&fetched, model_dir.join(filename))?;
        tracing::debug!(file = filename, "Model file cached");
    }

    Ok(model_dir)
}

#[cfg(test)]
mod tests {
    use super::*;

    // Model-dependent tests need a downloaded all-MiniLM-L6-v2; run with
    // cargo test -- --ignored when the cache is populated.

    #[test]
    fn test_cache_miss_on_empty_dir() {
        let temp = tempfile::TempDir::new().unwrap();
        let model_dir = temp.path().join(MODEL_REPO.replace('/', "_"));
        assert!(!MODEL_FILES.iter().all(|f| model_dir.join(f).exists()));
    }

    #[test]
    #[ignore = "requires model download"]
    fn test_encode_single() {
        let cache = dirs::cache_dir().unwrap().join("bizbuddy").join("models");
        let encoder = MiniLmEncoder::load(&cache).unwrap();
        let emb = encoder.encode("How do I grow my business?").unwrap();
        assert_eq!(emb.dimension(), EMBEDDING_DIM);
        // Unit normalized
        let norm: f32 = emb.values.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-4);
    }

    #[test]
    #[ignore = "requires model download"]
    fn test_similar_texts_score_higher() {
        let cache = dirs::cache_dir().unwrap().join("bizbuddy").join("models");
        let encoder = MiniLmEncoder::load(&cache).unwrap();
        let a = encoder.encode("How do I boost social media engagement?").unwrap();
        let b = encoder.encode("How can I increase social media engagement?").unwrap();
        let c = encoder.encode("What is the capital of France?").unwrap();
        assert!(a.dot(&b) > a.dot(&c));
        assert!(a.dot(&b) > 0.7);
    }
}
