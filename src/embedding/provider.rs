//! Encoder trait and FastEmbed implementation
use fastembed::{EmbeddingModel, InitOptions, TextEmbedding};
use std::sync::Arc;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EmbeddingError {
    #[error("Model initialization failed: {0}")]
    InitializationError(String),

    #[error("Embedding generation failed: {0}")]
    GenerationError(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },
}

/// Text encoder supplied by the host process
///
/// Implementations must return unit-normalized vectors of [`Encoder::dimension`]
/// length, and must report a stable [`Encoder::model_name`] so corpus and query
/// vectors can be checked for comparability.
pub trait Encoder: Send + Sync {
    /// Encode a single text
    fn encode(&self, text: &str) -> Result<Vec<f32>, EmbeddingError>;

    /// Encode many texts, one vector per input in input order
    fn encode_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError>;

    /// Get the embedding dimension
    fn dimension(&self) -> usize;

    /// Get the model name
    fn model_name(&self) -> &str;
}

/// FastEmbed encoder for local embedding generation
///
/// Uses all-MiniLM-L6-v2 (384 dimensions) by default.
pub struct FastEmbedEncoder {
    model: Arc<TextEmbedding>,
    model_name: String,
    dimension: usize,
}

impl FastEmbedEncoder {
    /// Create a new FastEmbed encoder with the specified model
    ///
    /// Models are downloaded on first use to the local cache:
    /// - all-MiniLM-L6-v2: 90MB (384 dims)
    /// - bge-small-en-v1.5: 130MB (384 dims)
    /// - bge-base-en-v1.5: 440MB (768 dims)
    pub fn new(model_name: &str) -> Result<Self, EmbeddingError> {
        let choice = resolve_model(model_name)?;

        tracing::info!(
            "Initializing embedding model: {} ({}D, ~{}MB download if not cached)",
            choice.name,
            choice.dimension,
            choice.size_mb
        );

        let init_options = InitOptions::new(choice.model).with_show_download_progress(true);

        let model = TextEmbedding::try_new(init_options)
            .map_err(|e| EmbeddingError::InitializationError(e.to_string()))?;

        Ok(Self {
            model: Arc::new(model),
            model_name: choice.name.to_string(),
            dimension: choice.dimension,
        })
    }

    /// Create encoder with default model (all-MiniLM-L6-v2)
    pub fn with_default_model() -> Result<Self, EmbeddingError> {
        Self::new("all-MiniLM-L6-v2")
    }

    fn check_dimension(&self, embedding: &[f32]) -> Result<(), EmbeddingError> {
        if embedding.len() != self.dimension {
            return Err(EmbeddingError::DimensionMismatch {
                expected: self.dimension,
                actual: embedding.len(),
            });
        }
        Ok(())
    }
}

/// A supported fastembed model and its canonical name
struct ModelChoice {
    model: EmbeddingModel,
    name: &'static str,
    dimension: usize,
    size_mb: usize,
}

/// Map a configured model name (any case) to its canonical choice
///
/// The canonical name is what gets recorded in the embeddings sidecar, so
/// differently cased spellings of one model stay compatible.
fn resolve_model(model_name: &str) -> Result<ModelChoice, EmbeddingError> {
    let key = model_name.trim().to_ascii_lowercase();
    let (model, name, dimension, size_mb) = match key.as_str() {
        "all-minilm-l6-v2" => (EmbeddingModel::AllMiniLML6V2, "all-MiniLM-L6-v2", 384, 90),
        "bge-small-en-v1.5" => (EmbeddingModel::BGESmallENV15, "bge-small-en-v1.5", 384, 130),
        "bge-base-en-v1.5" => (EmbeddingModel::BGEBaseENV15, "bge-base-en-v1.5", 768, 440),
        _ => {
            return Err(EmbeddingError::InitializationError(format!(
                "Unsupported model: {}. Supported: all-MiniLM-L6-v2, bge-small-en-v1.5, bge-base-en-v1.5",
                model_name
            )));
        }
    };

    Ok(ModelChoice {
        model,
        name,
        dimension,
        size_mb,
    })
}

impl Encoder for FastEmbedEncoder {
    fn encode(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        if text.trim().is_empty() {
            return Err(EmbeddingError::InvalidInput("Empty text".to_string()));
        }

        let embedding = self
            .model
            .embed(vec![text.to_string()], None)
            .map_err(|e| EmbeddingError::GenerationError(e.to_string()))?
            .into_iter()
            .next()
            .ok_or_else(|| EmbeddingError::GenerationError("No embeddings generated".to_string()))?;

        self.check_dimension(&embedding)?;

        Ok(super::normalize(embedding))
    }

    fn encode_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        // Rows must stay aligned with inputs, so empty texts are not filtered out
        let embeddings = self
            .model
            .embed(texts.to_vec(), None)
            .map_err(|e| EmbeddingError::GenerationError(e.to_string()))?;

        if embeddings.len() != texts.len() {
            return Err(EmbeddingError::GenerationError(format!(
                "Embedding count mismatch: expected {}, got {}",
                texts.len(),
                embeddings.len()
            )));
        }

        embeddings
            .into_iter()
            .map(|embedding| {
                self.check_dimension(&embedding)?;
                Ok(super::normalize(embedding))
            })
            .collect()
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn model_name(&self) -> &str {
        &self.model_name
    }
}
