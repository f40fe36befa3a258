//! Encoder trait and ONNX-backed implementation
//!
//! The HTTP handlers only ever see `Arc<dyn TextEncoder>`, so the model can
//! be swapped for a stub in tests.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::model::{Embedding, EmbeddingResult};

/// Information about the loaded model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelInfo {
    /// Model identifier (HuggingFace repo name)
    pub identifier: String,
    /// Embedding dimension
    pub dimension: usize,
    /// Maximum sequence length
    pub max_sequence_length: usize,
    /// Pooling mode
    pub pooling_mode: String,
}

/// Core encoder trait
#[async_trait]
pub trait TextEncoder: Send + Sync {
    /// Get model information
    fn info(&self) -> &ModelInfo;

    /// Generate the embedding for a single text
    async fn encode(&self, text: &str) -> EmbeddingResult<Embedding>;

    /// Get the embedding dimension
    fn dimension(&self) -> usize {
        self.info().dimension
    }
}

/// ONNX-backed sentence encoder
#[cfg(feature = "onnx")]
pub struct OnnxSentenceEncoder {
    info: ModelInfo,
    engine: tokio::sync::RwLock<crate::onnx::OnnxEncoderEngine>,
}

#[cfg(feature = "onnx")]
impl OnnxSentenceEncoder {
    /// Load the model and tokenizer from the configured paths
    pub fn new(config: &crate::model::ModelConfig) -> EmbeddingResult<Self> {
        let engine = crate::onnx::OnnxEncoderEngine::new(
            &config.model_path,
            &config.tokenizer_path,
            config.num_threads,
            config.max_sequence_length,
        )?;

        let info = ModelInfo {
            identifier: config.identifier.clone(),
            dimension: config.embedding_dimension,
            max_sequence_length: config.max_sequence_length,
            pooling_mode: config.pooling_mode.clone(),
        };

        Ok(Self {
            info,
            engine: tokio::sync::RwLock::new(engine),
        })
    }
}

#[cfg(feature = "onnx")]
#[async_trait]
impl TextEncoder for OnnxSentenceEncoder {
    fn info(&self) -> &ModelInfo {
        &self.info
    }

    async fn encode(&self, text: &str) -> EmbeddingResult<Embedding> {
        // Session inference needs &mut, so every call takes the write lock.
        // Inference is therefore serialized no matter how many requests the
        // server has in flight.
        let mut engine = self.engine.write().await;
        engine.encode_one(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_info() {
        let info = ModelInfo {
            identifier: "sentence-transformers/distiluse-base-multilingual-cased-v2".to_string(),
            dimension: 512,
            max_sequence_length: 128,
            pooling_mode: "mean".to_string(),
        };

        assert_eq!(info.dimension, 512);
        assert_eq!(info.pooling_mode, "mean");
    }

    #[tokio::test]
    async fn test_trait_default_dimension() {
        struct Fixed(ModelInfo);

        #[async_trait]
        impl TextEncoder for Fixed {
            fn info(&self) -> &ModelInfo {
                &self.0
            }

            async fn encode(&self, _text: &str) -> EmbeddingResult<Embedding> {
                Ok(vec![0.0; self.0.dimension])
            }
        }

        let encoder = Fixed(ModelInfo {
            identifier: "test".to_string(),
            dimension: 4,
            max_sequence_length: 16,
            pooling_mode: "mean".to_string(),
        });

        assert_eq!(encoder.dimension(), 4);
        assert_eq!(encoder.encode("hello").await.unwrap().len(), 4);
    }
}
