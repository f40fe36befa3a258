//! Model configuration
//!
//! Settings for the single embedding model this server hosts. The defaults
//! describe distiluse-base-multilingual-cased-v2; a `[model]` section in
//! config.toml can override paths and performance knobs.

use serde::{Deserialize, Serialize};

use crate::model::loader::DEFAULT_MODEL_ID;

/// Configuration for the embedding model
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Model identifier (HuggingFace repo name)
    pub identifier: String,

    /// File paths
    pub model_path: String,
    pub tokenizer_path: String,

    /// Model parameters
    pub max_sequence_length: usize,
    pub embedding_dimension: usize,
    pub pooling_mode: String,

    /// Performance settings
    pub num_threads: usize,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            identifier: DEFAULT_MODEL_ID.to_string(),
            model_path: "models/distiluse-base-multilingual-cased-v2/model.onnx".to_string(),
            tokenizer_path: "models/distiluse-base-multilingual-cased-v2/tokenizer.json"
                .to_string(),
            max_sequence_length: 128,
            embedding_dimension: 512,
            pooling_mode: "mean".to_string(),
            num_threads: 4,
        }
    }
}

impl ModelConfig {
    /// Validate the configuration
    pub fn validate(&self) -> crate::model::EmbeddingResult<()> {
        if self.identifier.is_empty() {
            return Err(crate::model::EmbeddingError::ConfigError {
                message: "Model identifier cannot be empty".to_string(),
            });
        }

        if self.model_path.is_empty() || self.tokenizer_path.is_empty() {
            return Err(crate::model::EmbeddingError::ConfigError {
                message: "Model and tokenizer paths cannot be empty".to_string(),
            });
        }

        if self.embedding_dimension == 0 {
            return Err(crate::model::EmbeddingError::ConfigError {
                message: "Embedding dimension must be greater than zero".to_string(),
            });
        }

        if self.max_sequence_length == 0 {
            return Err(crate::model::EmbeddingError::ConfigError {
                message: "Max sequence length must be greater than zero".to_string(),
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = ModelConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.identifier, DEFAULT_MODEL_ID);
        assert_eq!(config.embedding_dimension, 512);
    }

    #[test]
    fn test_invalid_dimension() {
        let config = ModelConfig {
            embedding_dimension: 0,
            ..ModelConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: ModelConfig = toml::from_str(
            r#"
            model_path = "custom/model.onnx"
            tokenizer_path = "custom/tokenizer.json"
            "#,
        )
        .unwrap();

        assert_eq!(config.model_path, "custom/model.onnx");
        assert_eq!(config.identifier, DEFAULT_MODEL_ID);
        assert_eq!(config.max_sequence_length, 128);
    }
}
