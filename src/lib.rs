//! Sentence Embedding Server Library
//!
//! HTTP server that embeds text with a single ONNX sentence-transformer model

pub mod model;
#[cfg(feature = "onnx")]
pub mod onnx;
pub mod protocol;
pub mod server;

// Re-exports
pub use model::{Embedding, EmbeddingError, EmbeddingResult, ModelInfo, TextEncoder};
pub use protocol::{EmbedRequest, EmbedResponse, ErrorResponse};
pub use server::{start_http_server, ServerConfig};
