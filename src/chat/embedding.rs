//! Embedding vector type and the encoder seam.

use super::ChatError;

/// A unit-normalized embedding vector.
///
/// All vectors are normalized at construction so cosine similarity reduces
/// to an inner product.
#[derive(Debug, Clone)]
pub struct Embedding {
    pub values: Vec<f32>,
}

impl Embedding {
    /// Create an embedding, normalizing to unit length.
    pub fn new(values: Vec<f32>) -> Self {
        let norm: f32 = values.iter().map(|x| x * x).sum::<f32>().sqrt();
        let values = if norm > 0.0 {
            values.iter().map(|x| x / norm).collect()
        } else {
            values
        };
        Self { values }
    }

    pub fn dimension(&self) -> usize {
        self.values.len()
    }

    /// Inner product; cosine similarity for unit vectors, range [-1, 1].
    pub fn dot(&self, other: &Embedding) -> f32 {
        if self.values.len() != other.values.len() {
            return 0.0;
        }
        self.values
            .iter()
            .zip(other.values.iter())
            .map(|(a, b)| a * b)
            .sum()
    }
}

/// Frozen sentence-embedding model.
///
/// Implementations must be thread-safe; the index is shared read-only across
/// request handlers.
pub trait SentenceEncoder: Send + Sync {
    /// Encode a single text into a unit-normalized vector.
    fn encode(&self, text: &str) -> Result<Embedding, ChatError>;

    /// Encode several texts in one batch.
    fn encode_batch(&self, texts: &[&str]) -> Result<Vec<Embedding>, ChatError> {
        texts.iter().map(|text| self.encode(text)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalization() {
        let emb = Embedding::new(vec![3.0, 4.0]);
        assert!((emb.values[0] - 0.6).abs() < 1e-6);
        assert!((emb.values[1] - 0.8).abs() < 1e-6);
    }

    #[test]
    fn test_zero_vector_left_alone() {
        let emb = Embedding::new(vec![0.0, 0.0]);
        assert_eq!(emb.values, vec![0.0, 0.0]);
    }

    #[test]
    fn test_dot_identical_is_one() {
        let a = Embedding::new(vec![1.0, 2.0, 2.0]);
        let b = Embedding::new(vec![1.0, 2.0, 2.0]);
        assert!((a.dot(&b) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_dot_orthogonal_is_zero() {
        let a = Embedding::new(vec![1.0, 0.0]);
        let b = Embedding::new(vec![0.0, 1.0]);
        assert!(a.dot(&b).abs() < 1e-6);
    }

    #[test]
    fn test_dot_dimension_mismatch_is_zero() {
        let a = Embedding::new(vec![1.0, 0.0]);
        let b = Embedding::new(vec![1.0, 0.0, 0.0]);
        assert_eq!(a.dot(&b), 0.0);
    }
}
