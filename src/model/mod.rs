pub mod config;
pub mod encoder;
pub mod loader;

// Re-exports
pub use config::ModelConfig;
pub use encoder::{ModelInfo, TextEncoder};
pub use loader::{load_model, DEFAULT_MODEL_ID};

/// Embedding vector type
pub type Embedding = Vec<f32>;

/// Result type for embedding operations
pub type EmbeddingResult<T> = Result<T, EmbeddingError>;

/// Errors that can occur while loading the model or running inference
#[derive(Debug, thiserror::Error)]
pub enum EmbeddingError {
    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Model load failed: {error}")]
    ModelLoadFailed { error: String },

    #[error("Inference failed: {error}")]
    InferenceError { error: String },

    #[error("IO error: {error}")]
    IoError { error: std::io::Error },

    #[error("TOML parsing error: {error}")]
    TomlError { error: toml::de::Error },
}

impl From<std::io::Error> for EmbeddingError {
    fn from(error: std::io::Error) -> Self {
        EmbeddingError::IoError { error }
    }
}

impl From<toml::de::Error> for EmbeddingError {
    fn from(error: toml::de::Error) -> Self {
        EmbeddingError::TomlError { error }
    }
}

#[cfg(feature = "onnx")]
impl<R> From<ort::Error<R>> for EmbeddingError {
    fn from(error: ort::Error<R>) -> Self {
        EmbeddingError::ModelLoadFailed { error: error.to_string() }
    }
}
