//! # ONNX Encoder Engine
//!
//! Runs the sentence-transformer forward pass with ONNX Runtime: tokenize,
//! run the session, mean-pool the token embeddings, L2-normalize.
//!
//! The engine is model-agnostic within the BERT family. DistilBERT-based
//! exports (like distiluse-base-multilingual-cased-v2) have no segment
//! embeddings, so `token_type_ids` is only fed when the graph declares that
//! input.

use ndarray::ArrayViewD;
use ort::session::{builder::GraphOptimizationLevel, Session};
use ort::value::Tensor;
use tokenizers::{Tokenizer, TruncationParams};
use tracing::{debug, info};

use crate::model::{Embedding, EmbeddingError, EmbeddingResult};

/// ONNX-based engine for generating sentence embeddings
#[derive(Debug)]
pub struct OnnxEncoderEngine {
    /// ONNX Runtime session for model inference
    session: Session,
    /// HuggingFace tokenizer for text preprocessing
    tokenizer: Tokenizer,
    /// Whether the graph takes a token_type_ids input
    needs_token_type_ids: bool,
}

impl OnnxEncoderEngine {
    /// Create a new engine from a model file and tokenizer file
    ///
    /// # Arguments
    /// * `model_path` - Path to the ONNX model file (model.onnx)
    /// * `tokenizer_path` - Path to the tokenizer configuration (tokenizer.json)
    /// * `num_threads` - Intra-op thread pool size for inference
    /// * `max_seq_length` - Inputs are truncated to this many tokens
    pub fn new(
        model_path: &str,
        tokenizer_path: &str,
        num_threads: usize,
        max_seq_length: usize,
    ) -> EmbeddingResult<Self> {
        info!("Initializing ONNX encoder engine with model: {}", model_path);

        let session = Session::builder()?
            .with_optimization_level(GraphOptimizationLevel::Level3)?
            .with_intra_threads(num_threads)?
            .commit_from_file(model_path)
            .map_err(|e| EmbeddingError::ModelLoadFailed {
                error: format!("Failed to load ONNX model: {}", e),
            })?;

        let needs_token_type_ids = session
            .inputs()
            .iter()
            .any(|input| input.name() == "token_type_ids");

        let mut tokenizer =
            Tokenizer::from_file(tokenizer_path).map_err(|e| EmbeddingError::ModelLoadFailed {
                error: format!("Failed to load tokenizer: {}", e),
            })?;

        tokenizer
            .with_truncation(Some(TruncationParams {
                max_length: max_seq_length,
                ..TruncationParams::default()
            }))
            .map_err(|e| EmbeddingError::ModelLoadFailed {
                error: format!("Failed to configure tokenizer truncation: {}", e),
            })?;

        info!(
            "ONNX encoder engine initialized with {} threads (token_type_ids: {})",
            num_threads, needs_token_type_ids
        );

        Ok(Self {
            session,
            tokenizer,
            needs_token_type_ids,
        })
    }

    /// Generate the embedding for a single text
    ///
    /// The empty string is a valid input: the tokenizer still emits the
    /// special tokens, which pool to the model's embedding of "".
    pub fn encode_one(&mut self, text: &str) -> EmbeddingResult<Embedding> {
        let encoding = self
            .tokenizer
            .encode(text, true)
            .map_err(|e| EmbeddingError::InferenceError {
                error: format!("Tokenization failed: {}", e),
            })?;

        let input_ids = encoding.get_ids();
        let attention_mask = encoding.get_attention_mask();

        debug!("Encoding text of {} tokens", input_ids.len());

        // 2D tensors [batch_size=1, seq_len]
        let input_ids_vec: Vec<i64> = input_ids.iter().map(|&x| x as i64).collect();
        let attention_mask_vec: Vec<i64> = attention_mask.iter().map(|&x| x as i64).collect();
        let seq_len = input_ids_vec.len() as i64;

        let input_ids_tensor = Tensor::from_array(([1i64, seq_len], input_ids_vec)).map_err(
            |e| EmbeddingError::InferenceError {
                error: format!("Failed to create input_ids tensor: {}", e),
            },
        )?;

        let attention_mask_tensor = Tensor::from_array(([1i64, seq_len], attention_mask_vec))
            .map_err(|e| EmbeddingError::InferenceError {
                error: format!("Failed to create attention_mask tensor: {}", e),
            })?;

        let mut inputs = vec![
            ("input_ids", input_ids_tensor),
            ("attention_mask", attention_mask_tensor),
        ];

        if self.needs_token_type_ids {
            // All zeros for a single sequence
            let token_type_ids_vec: Vec<i64> = vec![0i64; seq_len as usize];
            let token_type_ids_tensor = Tensor::from_array(([1i64, seq_len], token_type_ids_vec))
                .map_err(|e| EmbeddingError::InferenceError {
                    error: format!("Failed to create token_type_ids tensor: {}", e),
                })?;
            inputs.push(("token_type_ids", token_type_ids_tensor));
        }

        let outputs = self
            .session
            .run(inputs)
            .map_err(|e| EmbeddingError::InferenceError {
                error: format!("ONNX inference failed: {}", e),
            })?;

        let (shape, data) = outputs["last_hidden_state"]
            .try_extract_tensor::<f32>()
            .map_err(|e| EmbeddingError::InferenceError {
                error: format!("Failed to extract output tensor: {}", e),
            })?;

        let dims: Vec<usize> = shape.iter().map(|&x| x as usize).collect();
        let output_array = ndarray::ArrayView::from_shape(dims.as_slice(), data).map_err(|e| {
            EmbeddingError::InferenceError {
                error: format!("Failed to create output array view: {:?}", e),
            }
        })?;

        // Mean pooling over the sequence dimension (excluding padding tokens)
        let embedding = Self::mean_pooling(&output_array, attention_mask)?;

        // L2 normalization
        Self::normalize_embedding(&embedding)
    }

    /// Apply mean pooling to the token embeddings
    ///
    /// # Arguments
    /// * `output_tensor` - Output tensor from the model [batch_size, seq_len, hidden_size]
    /// * `attention_mask` - Attention mask indicating which tokens are real (1) vs padding (0)
    fn mean_pooling(
        output_tensor: &ArrayViewD<f32>,
        attention_mask: &[u32],
    ) -> EmbeddingResult<Vec<f32>> {
        let shape = output_tensor.shape();
        if shape.len() != 3 {
            return Err(EmbeddingError::InferenceError {
                error: format!("Expected 3D output tensor, got {}D", shape.len()),
            });
        }

        let seq_len = shape[1];
        let hidden_size = shape[2];

        if attention_mask.len() != seq_len {
            return Err(EmbeddingError::InferenceError {
                error: format!(
                    "Attention mask length {} doesn't match sequence length {}",
                    attention_mask.len(),
                    seq_len
                ),
            });
        }

        let mut pooled = vec![0.0f32; hidden_size];
        let mut valid_tokens = 0;

        for seq_idx in 0..seq_len {
            if attention_mask[seq_idx] == 1 {
                for hidden_idx in 0..hidden_size {
                    pooled[hidden_idx] += output_tensor[[0, seq_idx, hidden_idx]];
                }
                valid_tokens += 1;
            }
        }

        if valid_tokens == 0 {
            return Err(EmbeddingError::InferenceError {
                error: "No valid tokens found in attention mask".to_string(),
            });
        }

        for val in &mut pooled {
            *val /= valid_tokens as f32;
        }

        Ok(pooled)
    }

    /// Normalize embedding using L2 normalization
    fn normalize_embedding(embedding: &[f32]) -> EmbeddingResult<Vec<f32>> {
        let norm: f32 = embedding.iter().map(|x| x * x).sum::<f32>().sqrt();

        if norm == 0.0 {
            return Err(EmbeddingError::InferenceError {
                error: "Cannot normalize zero vector".to_string(),
            });
        }

        Ok(embedding.iter().map(|x| x / norm).collect())
    }
}
