//! One-shot model loading at process startup
//!
//! The model is loaded exactly once, before the server binds. Load failure
//! is fatal: there is no fallback model and no retry, the process must not
//! come up without a working encoder.

use std::sync::Arc;

use tracing::info;

use crate::model::{EmbeddingResult, ModelConfig, TextEncoder};

/// The model this server hosts
pub const DEFAULT_MODEL_ID: &str = "sentence-transformers/distiluse-base-multilingual-cased-v2";

/// Load the embedding model described by `config`.
///
/// Blocks until the ONNX session and tokenizer are fully initialized, which
/// can take a while on first start.
pub fn load_model(config: &ModelConfig) -> EmbeddingResult<Arc<dyn TextEncoder>> {
    config.validate()?;

    info!(
        "Loading embedding model {} ({} dimensions)",
        config.identifier, config.embedding_dimension
    );

    #[cfg(feature = "onnx")]
    {
        let encoder = crate::model::encoder::OnnxSentenceEncoder::new(config)?;
        info!("Model loaded: {}", config.identifier);
        Ok(Arc::new(encoder))
    }

    #[cfg(not(feature = "onnx"))]
    {
        Err(crate::model::EmbeddingError::ModelLoadFailed {
            error: "server was built without the `onnx` feature".to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_rejects_invalid_config() {
        let config = ModelConfig {
            model_path: String::new(),
            tokenizer_path: String::new(),
            ..ModelConfig::default()
        };
        assert!(load_model(&config).is_err());
    }

    #[test]
    fn test_load_fails_on_missing_files() {
        let config = ModelConfig {
            model_path: "does/not/exist/model.onnx".to_string(),
            tokenizer_path: "does/not/exist/tokenizer.json".to_string(),
            ..ModelConfig::default()
        };
        // Startup errors are fatal, never deferred to request time
        assert!(load_model(&config).is_err());
    }
}
