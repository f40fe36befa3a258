//! ONNX inference module
//!
//! Session and tokenizer plumbing for the sentence-transformer model

pub mod engine;
pub use engine::OnnxEncoderEngine;
