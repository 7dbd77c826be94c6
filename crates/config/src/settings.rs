//! Main settings module

use std::time::Duration;

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Main application settings
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Settings {
    /// Retrieval and ranking configuration
    #[serde(default)]
    pub retrieval: RetrievalConfig,

    /// Index configuration
    #[serde(default)]
    pub index: IndexConfig,
}

/// Retrieval and ranking configuration
///
/// The candidate pool is the per-method top-N pulled before fusion; keeping
/// it wider than the final `top_k` measurably improves the reranked result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalConfig {
    /// RRF smoothing constant
    #[serde(default = "default_rrf_k")]
    pub rrf_k: f64,

    /// Candidates pulled from each method before fusion
    #[serde(default = "default_candidate_pool_size")]
    pub candidate_pool_size: usize,

    /// Final result count when the caller does not specify one
    #[serde(default = "default_top_k")]
    pub top_k_default: usize,

    /// BM25 term-frequency saturation
    #[serde(default = "default_bm25_k1")]
    pub bm25_k1: f64,

    /// BM25 length normalization
    #[serde(default = "default_bm25_b")]
    pub bm25_b: f64,

    /// BM25 negative-idf floor factor
    #[serde(default = "default_bm25_epsilon")]
    pub bm25_epsilon: f64,

    /// Timeout applied to each external oracle call (embedding, reranking)
    #[serde(default = "default_oracle_timeout_ms")]
    pub oracle_timeout_ms: u64,
}

fn default_rrf_k() -> f64 {
    60.0
}

fn default_candidate_pool_size() -> usize {
    20
}

fn default_top_k() -> usize {
    5
}

fn default_bm25_k1() -> f64 {
    1.5
}

fn default_bm25_b() -> f64 {
    0.75
}

fn default_bm25_epsilon() -> f64 {
    0.25
}

fn default_oracle_timeout_ms() -> u64 {
    3_000
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            rrf_k: default_rrf_k(),
            candidate_pool_size: default_candidate_pool_size(),
            top_k_default: default_top_k(),
            bm25_k1: default_bm25_k1(),
            bm25_b: default_bm25_b(),
            bm25_epsilon: default_bm25_epsilon(),
            oracle_timeout_ms: default_oracle_timeout_ms(),
        }
    }
}

impl RetrievalConfig {
    /// Oracle timeout as a [`Duration`]
    pub fn oracle_timeout(&self) -> Duration {
        Duration::from_millis(self.oracle_timeout_ms)
    }
}

/// Index configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexConfig {
    /// Embedding dimension the vector index is built with
    #[serde(default = "default_vector_dim")]
    pub vector_dim: usize,

    /// Path the vector index is persisted to
    #[serde(default = "default_index_path")]
    pub index_path: String,
}

fn default_vector_dim() -> usize {
    1024
}

fn default_index_path() -> String {
    "data/vector_index.bin".to_string()
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            vector_dim: default_vector_dim(),
            index_path: default_index_path(),
        }
    }
}

impl Settings {
    /// Create default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate settings
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_retrieval()?;
        self.validate_index()?;
        Ok(())
    }

    fn validate_retrieval(&self) -> Result<(), ConfigError> {
        let retrieval = &self.retrieval;

        if retrieval.rrf_k <= 0.0 {
            return Err(ConfigError::InvalidValue {
                field: "retrieval.rrf_k".to_string(),
                message: format!("Must be positive, got {}", retrieval.rrf_k),
            });
        }

        if retrieval.top_k_default == 0 {
            return Err(ConfigError::InvalidValue {
                field: "retrieval.top_k_default".to_string(),
                message: "Must be at least 1".to_string(),
            });
        }

        if retrieval.candidate_pool_size < retrieval.top_k_default {
            return Err(ConfigError::InvalidValue {
                field: "retrieval.candidate_pool_size".to_string(),
                message: format!(
                    "Must be >= top_k_default ({}), got {}",
                    retrieval.top_k_default, retrieval.candidate_pool_size
                ),
            });
        }

        if retrieval.bm25_k1 < 0.0 {
            return Err(ConfigError::InvalidValue {
                field: "retrieval.bm25_k1".to_string(),
                message: format!("Must be non-negative, got {}", retrieval.bm25_k1),
            });
        }

        if !(0.0..=1.0).contains(&retrieval.bm25_b) {
            return Err(ConfigError::InvalidValue {
                field: "retrieval.bm25_b".to_string(),
                message: format!("Must be between 0.0 and 1.0, got {}", retrieval.bm25_b),
            });
        }

        if retrieval.oracle_timeout_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "retrieval.oracle_timeout_ms".to_string(),
                message: "Must be at least 1ms".to_string(),
            });
        }

        Ok(())
    }

    fn validate_index(&self) -> Result<(), ConfigError> {
        if self.index.vector_dim == 0 {
            return Err(ConfigError::InvalidValue {
                field: "index.vector_dim".to_string(),
                message: "Must be at least 1".to_string(),
            });
        }

        if self.index.index_path.is_empty() {
            return Err(ConfigError::MissingField("index.index_path".to_string()));
        }

        Ok(())
    }
}

/// Load settings from config files and environment
pub fn load_settings(env: Option<&str>) -> Result<Settings, ConfigError> {
    let mut builder = Config::builder();

    // Load default config
    builder = builder.add_source(File::with_name("config/default").required(false));

    // Load environment-specific config
    if let Some(env_name) = env {
        builder =
            builder.add_source(File::with_name(&format!("config/{}", env_name)).required(false));
    }

    // Load from environment variables
    builder = builder.add_source(
        Environment::with_prefix("POWERSYNC")
            .separator("__")
            .try_parsing(true),
    );

    let config = builder.build()?;
    let settings: Settings = config.try_deserialize()?;

    settings.validate()?;

    Ok(settings)
}
