use crate::config::Config;
use crate::error::{MediaseekError, Result, ValidationError};

/// Configuration validator
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate the configuration
    pub fn validate(config: &Config) -> Result<()> {
        let mut errors = Vec::new();

        Self::validate_schema_version(config, &mut errors);
        Self::validate_ranking(config, &mut errors);
        Self::validate_corpus(config, &mut errors);
        Self::validate_embedding(config, &mut errors);

        if errors.is_empty() {
            Ok(())
        } else {
            Err(MediaseekError::ConfigValidation { errors })
        }
    }

    fn validate_schema_version(config: &Config, errors: &mut Vec<ValidationError>) {
        let version = &config.meta.schema_version;
        if version != "1.0.0" {
            errors.push(ValidationError::new(
                "_meta.schema_version",
                format!("Unsupported schema version: {}", version),
            ));
        }
    }

    fn validate_ranking(config: &Config, errors: &mut Vec<ValidationError>) {
        let ranking = &config.ranking;

        if ranking.top_k == 0 {
            errors.push(ValidationError::new(
                "ranking.top_k",
                "top_k must be greater than 0",
            ));
        }

        let values = [
            ("ranking.window_seconds", ranking.window_seconds),
            ("ranking.min_total", ranking.min_total),
            ("ranking.min_semantic", ranking.min_semantic),
            ("ranking.keyword_weight", ranking.keyword_weight),
            ("ranking.semantic_weight", ranking.semantic_weight),
            (
                "ranking.early_time_bonus_threshold_seconds",
                ranking.early_time_bonus_threshold_seconds,
            ),
            (
                "ranking.early_time_bonus_amount",
                ranking.early_time_bonus_amount,
            ),
        ];

        for (path, value) in values {
            if !value.is_finite() {
                errors.push(ValidationError::new(
                    path,
                    format!("Value must be finite, got {}", value),
                ));
            } else if value < 0.0 {
                errors.push(ValidationError::new(
                    path,
                    format!("Value must not be negative, got {}", value),
                ));
            }
        }
    }

    fn validate_corpus(config: &Config, errors: &mut Vec<ValidationError>) {
        // Existence is not checked: a missing index is an empty corpus
        if config.corpus.index_path.as_os_str().is_empty() {
            errors.push(ValidationError::new(
                "corpus.index_path",
                "Index path cannot be empty",
            ));
        }

        if config.corpus.embeddings_path.as_os_str().is_empty() {
            errors.push(ValidationError::new(
                "corpus.embeddings_path",
                "Embeddings path cannot be empty",
            ));
        }
    }

    fn validate_embedding(config: &Config, errors: &mut Vec<ValidationError>) {
        if config.embedding.batch_size == 0 {
            errors.push(ValidationError::new(
                "embedding.batch_size",
                "Batch size must be greater than 0",
            ));
        }

        if config.embedding.model.is_empty() {
            errors.push(ValidationError::new(
                "embedding.model",
                "Model name cannot be empty",
            ));
        }

        if config.embedding.query_timeout_ms == 0 {
            errors.push(ValidationError::new(
                "embedding.query_timeout_ms",
                "Query timeout must be greater than 0",
            ));
        }
    }
}
