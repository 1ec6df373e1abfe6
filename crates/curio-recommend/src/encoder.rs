//! Text encoders for the embedding families.
//!
//! - [`FastEmbedEncoder`] (feature `fastembed`): all-MiniLM-L6-v2 sentence
//!   embeddings, the model the exported item embeddings are built with.
//! - [`HashingEncoder`]: deterministic feature hashing, used in tests and
//!   when the MiniLM model cannot be loaded.

use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

/// Default output width, matching the MiniLM-sized embeddings exported offline.
pub const DEFAULT_DIMENSION: usize = 384;

/// Errors produced while encoding text.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EncodeError {
    /// The text contained no tokens.
    #[error("cannot encode empty text")]
    EmptyText,

    /// The encoder backend failed.
    #[error("encoder backend failed: {0}")]
    Backend(String),
}

/// Turns free text into a dense vector comparable with item embeddings.
pub trait TextEncoder: Send + Sync + std::fmt::Debug {
    /// Encode `text` into a vector of [`TextEncoder::dimension`] values.
    fn encode(&self, text: &str) -> Result<Vec<f32>, EncodeError>;

    /// Output width.
    fn dimension(&self) -> usize;
}

/// Deterministic feature-hashing encoder.
///
/// Lower-cased word unigrams and bigrams are hashed with 64-bit FNV-1a into
/// `dimension` signed buckets, then the vector is L2-normalized. Item
/// embeddings produced offline with the same scheme are directly comparable.
#[derive(Debug, Clone)]
pub struct HashingEncoder {
    dimension: usize,
}

impl Default for HashingEncoder {
    fn default() -> Self {
        Self { dimension: DEFAULT_DIMENSION }
    }
}

impl HashingEncoder {
    /// Encoder with a custom output width. A width of 0 is bumped to 1.
    #[must_use]
    pub fn new(dimension: usize) -> Self {
        Self { dimension: dimension.max(1) }
    }
}

const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

fn fnv1a(bytes: &[u8]) -> u64 {
    bytes.iter().fold(FNV_OFFSET, |hash, byte| (hash ^ u64::from(*byte)).wrapping_mul(FNV_PRIME))
}

fn tokens(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|token| !token.is_empty())
        .map(str::to_lowercase)
        .collect()
}

impl TextEncoder for HashingEncoder {
    fn encode(&self, text: &str) -> Result<Vec<f32>, EncodeError> {
        let tokens = tokens(text);
        if tokens.is_empty() {
            return Err(EncodeError::EmptyText);
        }

        let mut vector = vec![0.0_f32; self.dimension];
        let bigrams = tokens.windows(2).map(|pair| format!("{} {}", pair[0], pair[1]));
        for feature in tokens.iter().cloned().chain(bigrams) {
            let hash = fnv1a(feature.as_bytes());
            let bucket = (hash % self.dimension as u64) as usize;
            let sign = if hash >> 63 == 0 { 1.0 } else { -1.0 };
            vector[bucket] += sign;
        }

        let norm = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
        if norm > 0.0 {
            for value in &mut vector {
                *value /= norm;
            }
        }
        Ok(vector)
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}

/// Sentence-transformer encoder backed by fastembed's all-MiniLM-L6-v2.
#[cfg(feature = "fastembed")]
pub struct FastEmbedEncoder {
    model: std::sync::Mutex<fastembed::TextEmbedding>,
}

#[cfg(feature = "fastembed")]
impl std::fmt::Debug for FastEmbedEncoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FastEmbedEncoder").field("model", &"all-MiniLM-L6-v2").finish()
    }
}

#[cfg(feature = "fastembed")]
impl FastEmbedEncoder {
    /// Load the MiniLM model, downloading it into fastembed's cache on first use.
    pub fn new() -> Result<Self, EncodeError> {
        let options = fastembed::InitOptions::new(fastembed::EmbeddingModel::AllMiniLML6V2)
            .with_show_download_progress(false);
        let model = fastembed::TextEmbedding::try_new(options)
            .map_err(|e| EncodeError::Backend(e.to_string()))?;
        Ok(Self { model: std::sync::Mutex::new(model) })
    }
}

#[cfg(feature = "fastembed")]
impl TextEncoder for FastEmbedEncoder {
    fn encode(&self, text: &str) -> Result<Vec<f32>, EncodeError> {
        if tokens(text).is_empty() {
            return Err(EncodeError::EmptyText);
        }
        let model = self.model.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        model
            .embed(vec![text], None)
            .map_err(|e| EncodeError::Backend(e.to_string()))?
            .into_iter()
            .next()
            .ok_or_else(|| EncodeError::Backend("no embedding returned".to_string()))
    }

    fn dimension(&self) -> usize {
        DEFAULT_DIMENSION
    }
}

/// Encoder used when opening an artifact root.
///
/// MiniLM when the `fastembed` feature is enabled and the model loads,
/// otherwise the hashing encoder.
#[must_use]
pub fn default_encoder() -> Arc<dyn TextEncoder> {
    #[cfg(feature = "fastembed")]
    match FastEmbedEncoder::new() {
        Ok(encoder) => {
            info!("Using all-MiniLM-L6-v2 text encoder");
            return Arc::new(encoder);
        }
        Err(e) => warn!(error = %e, "MiniLM encoder unavailable; falling back to hashing"),
    }
    #[cfg(not(feature = "fastembed"))]
    warn!("Built without fastembed; embedding families use the hashing encoder");
    info!(dimension = DEFAULT_DIMENSION, "Using hashing text encoder");
    Arc::new(HashingEncoder::default())
}
