//! Configuration management for mediaseek
//!
//! Loads the TOML configuration, applies profile and environment overrides,
//! and validates every tunable before anything is served.

use crate::error::{MediaseekError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::str::FromStr;

mod validator;

pub use validator::ConfigValidator;

/// Prefix for environment variable overrides
pub const ENV_PREFIX: &str = "MEDIASEEK_";

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(rename = "_meta")]
    pub meta: MetaConfig,
    pub ranking: RankingConfig,
    pub corpus: CorpusConfig,
    pub embedding: EmbeddingConfig,
    #[serde(default)]
    pub profiles: HashMap<String, ProfileOverrides>,
}

/// Metadata about the configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetaConfig {
    pub schema_version: String,
    #[serde(default = "current_timestamp")]
    pub created_at: String,
    #[serde(default = "current_timestamp")]
    pub last_modified: String,
}

fn current_timestamp() -> String {
    chrono::Utc::now().to_rfc3339()
}

/// Ranking weights and thresholds
///
/// Copied into every [`crate::corpus::Snapshot`] and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankingConfig {
    /// Maximum number of hits returned per query
    pub top_k: usize,
    /// Width of the per-file suppression neighborhood, in seconds
    pub window_seconds: f64,
    /// Total-score floor for candidates without a keyword hit
    pub min_total: f64,
    /// Semantic floor for candidates without a keyword hit
    pub min_semantic: f64,
    pub keyword_weight: f64,
    pub semantic_weight: f64,
    /// Neighbors merged before a hit for display
    pub context_before: usize,
    /// Neighbors merged after a hit for display
    pub context_after: usize,
    /// Segments starting at or before this time get the early bonus
    pub early_time_bonus_threshold_seconds: f64,
    pub early_time_bonus_amount: f64,
}

impl Default for RankingConfig {
    fn default() -> Self {
        Self {
            top_k: 4,
            window_seconds: 20.0,
            min_total: 0.18,
            min_semantic: 0.30,
            keyword_weight: 0.35,
            semantic_weight: 0.65,
            context_before: 1,
            context_after: 1,
            early_time_bonus_threshold_seconds: 0.0,
            early_time_bonus_amount: 0.0,
        }
    }
}

/// Corpus file locations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorpusConfig {
    pub index_path: PathBuf,
    pub embeddings_path: PathBuf,
    pub transcripts_dir: PathBuf,
}

/// Query encoder configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    pub enabled: bool,
    pub model: String,
    pub batch_size: usize,
    /// Budget for encoding one query before falling back to keyword-only.
    /// A timed-out encode still occupies a tokio blocking thread until the
    /// encoder returns, so a persistently slow encoder can exhaust the
    /// blocking pool (512 threads by default).
    pub query_timeout_ms: u64,
}

/// Profile-specific configuration overrides
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProfileOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_k: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_total: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_semantic: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub embedding_enabled: Option<bool>,
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self> {
        Self::load_inner(path, None)
    }

    /// Load configuration with a specific profile applied
    pub fn load_with_profile(path: &Path, profile: &str) -> Result<Self> {
        Self::load_inner(path, Some(profile))
    }

    fn load_inner(path: &Path, profile: Option<&str>) -> Result<Self> {
        if !path.exists() {
            return Err(MediaseekError::ConfigNotFound {
                path: path.to_path_buf(),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| {
            MediaseekError::io(e, format!("Failed to read config file: {:?}", path))
        })?;
        let mut config: Config = toml::from_str(&content)?;

        if let Some(profile) = profile {
            config.apply_profile(profile)?;
        }

        config.apply_env_overrides()?;

        ConfigValidator::validate(&config)?;

        Ok(config)
    }

    /// Save configuration to a file
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content).map_err(|e| {
            MediaseekError::io(e, format!("Failed to write config file: {:?}", path))
        })?;
        Ok(())
    }

    /// Apply a profile's overrides to the configuration
    pub fn apply_profile(&mut self, profile: &str) -> Result<()> {
        let overrides = self
            .profiles
            .get(profile)
            .cloned()
            .ok_or_else(|| MediaseekError::Config(format!("Unknown profile: {}", profile)))?;

        if let Some(top_k) = overrides.top_k {
            self.ranking.top_k = top_k;
        }
        if let Some(min_total) = overrides.min_total {
            self.ranking.min_total = min_total;
        }
        if let Some(min_semantic) = overrides.min_semantic {
            self.ranking.min_semantic = min_semantic;
        }
        if let Some(enabled) = overrides.embedding_enabled {
            self.embedding.enabled = enabled;
        }
        Ok(())
    }

    /// Apply environment variable overrides
    /// Environment variables in format: MEDIASEEK_SECTION__KEY=value
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        self.apply_overrides(std::env::vars())
    }

    /// Apply `MEDIASEEK_`-prefixed key/value overrides from any source
    pub fn apply_overrides<I>(&mut self, vars: I) -> Result<()>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        for (key, value) in vars {
            if let Some(config_key) = key.strip_prefix(ENV_PREFIX) {
                self.set_value_from_env(config_key, &value)?;
                tracing::debug!("Applied config override {}", key);
            }
        }
        Ok(())
    }

    fn set_value_from_env(&mut self, path: &str, value: &str) -> Result<()> {
        match path {
            "RANKING__TOP_K" => self.ranking.top_k = parse_value(path, value)?,
            "RANKING__WINDOW_SECONDS" => self.ranking.window_seconds = parse_value(path, value)?,
            "RANKING__MIN_TOTAL" => self.ranking.min_total = parse_value(path, value)?,
            "RANKING__MIN_SEMANTIC" => self.ranking.min_semantic = parse_value(path, value)?,
            "RANKING__KEYWORD_WEIGHT" => self.ranking.keyword_weight = parse_value(path, value)?,
            "RANKING__SEMANTIC_WEIGHT" => {
                self.ranking.semantic_weight = parse_value(path, value)?
            }
            "RANKING__CONTEXT_BEFORE" => self.ranking.context_before = parse_value(path, value)?,
            "RANKING__CONTEXT_AFTER" => self.ranking.context_after = parse_value(path, value)?,
            "RANKING__EARLY_TIME_BONUS_THRESHOLD_SECONDS" => {
                self.ranking.early_time_bonus_threshold_seconds = parse_value(path, value)?
            }
            "RANKING__EARLY_TIME_BONUS_AMOUNT" => {
                self.ranking.early_time_bonus_amount = parse_value(path, value)?
            }
            "CORPUS__INDEX_PATH" => self.corpus.index_path = PathBuf::from(value),
            "CORPUS__EMBEDDINGS_PATH" => self.corpus.embeddings_path = PathBuf::from(value),
            "CORPUS__TRANSCRIPTS_DIR" => self.corpus.transcripts_dir = PathBuf::from(value),
            "EMBEDDING__ENABLED" => self.embedding.enabled = parse_value(path, value)?,
            "EMBEDDING__MODEL" => self.embedding.model = value.to_string(),
            "EMBEDDING__BATCH_SIZE" => self.embedding.batch_size = parse_value(path, value)?,
            "EMBEDDING__QUERY_TIMEOUT_MS" => {
                self.embedding.query_timeout_ms = parse_value(path, value)?
            }
            _ => {
                tracing::debug!("Unknown env config key: {}", path);
            }
        }
        Ok(())
    }

    /// Get the default configuration file path
    pub fn default_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| MediaseekError::Config("Cannot determine config directory".to_string()))?;

        Ok(config_dir.join("mediaseek").join("config.toml"))
    }
}

fn parse_value<T: FromStr>(path: &str, value: &str) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| MediaseekError::InvalidConfigValue {
            path: path.to_string(),
            message: format!(
                "Cannot parse '{}' as {}",
                value,
                std::any::type_name::<T>()
            ),
        })
}

impl Default for Config {
    fn default() -> Self {
        let index_dir = PathBuf::from("index");

        let mut profiles = HashMap::new();
        profiles.insert(
            "diagnostic".to_string(),
            ProfileOverrides {
                min_total: Some(0.0),
                min_semantic: Some(0.0),
                ..ProfileOverrides::default()
            },
        );

        Self {
            meta: MetaConfig {
                schema_version: "1.0.0".to_string(),
                created_at: current_timestamp(),
                last_modified: current_timestamp(),
            },
            ranking: RankingConfig::default(),
            corpus: CorpusConfig {
                index_path: index_dir.join("search_index.json"),
                embeddings_path: index_dir.join("embeddings.json"),
                transcripts_dir: PathBuf::from("data").join("transcripts"),
            },
            embedding: EmbeddingConfig {
                enabled: true,
                model: "all-MiniLM-L6-v2".to_string(),
                batch_size: 32,
                query_timeout_ms: 2000,
            },
            profiles,
        }
    }
}
