//! Environment-backed configuration.
//!
//! Every setting has a default. Override with `TA_*` environment variables.

pub mod error;

#[cfg(test)]
mod tests;

pub use error::ConfigError;

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::constants::{
    DEFAULT_EMBEDDING_BASE_URL, DEFAULT_EMBEDDING_MODEL, DEFAULT_REQUEST_TIMEOUT_SECS,
    DEFAULT_THRESHOLD, DEFAULT_TOP_N, MAX_CHARS_PER_BATCH, MAX_CHARS_PER_TEXT,
};
use crate::corpus::Corpus;

/// Retrieval configuration loaded from environment variables.
///
/// Use [`Config::from_env`] to read `TA_*` overrides on top of defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Root directory for record snapshots and embedding artifacts. Default: `./data`.
    pub data_dir: PathBuf,

    /// OpenAI-compatible API base URL (the `/embeddings` path is appended).
    pub embedding_base_url: String,

    /// Bearer token for the embedding provider.
    pub api_key: Option<String>,

    /// Embedding model identifier. Default: `text-embedding-3-small`.
    pub embedding_model: String,

    /// Per-request provider timeout. Default: 60 s.
    pub request_timeout: Duration,

    /// Characters kept per text before embedding. Default: `2000`.
    pub max_chars_per_text: usize,

    /// Summed characters per provider request. Default: `10_000`.
    pub max_chars_per_batch: usize,

    /// Matches returned per query. Default: `1`.
    pub top_n: usize,

    /// Minimum cosine similarity (inclusive). Default: `0.5`.
    pub threshold: f32,

    /// Delete and rebuild persisted embeddings on first use. Default: `false`.
    pub force_rebuild: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./data"),
            embedding_base_url: DEFAULT_EMBEDDING_BASE_URL.to_string(),
            api_key: None,
            embedding_model: DEFAULT_EMBEDDING_MODEL.to_string(),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            max_chars_per_text: MAX_CHARS_PER_TEXT,
            max_chars_per_batch: MAX_CHARS_PER_BATCH,
            top_n: DEFAULT_TOP_N,
            threshold: DEFAULT_THRESHOLD,
            force_rebuild: false,
        }
    }
}

impl Config {
    const ENV_DATA_DIR: &'static str = "TA_DATA_DIR";
    const ENV_BASE_URL: &'static str = "TA_EMBEDDING_BASE_URL";
    const ENV_API_KEY: &'static str = "TA_API_KEY";
    const ENV_OPENAI_API_KEY: &'static str = "OPENAI_API_KEY";
    const ENV_MODEL: &'static str = "TA_EMBEDDING_MODEL";
    const ENV_TIMEOUT_SECS: &'static str = "TA_REQUEST_TIMEOUT_SECS";
    const ENV_MAX_CHARS_PER_TEXT: &'static str = "TA_MAX_CHARS_PER_TEXT";
    const ENV_MAX_CHARS_PER_BATCH: &'static str = "TA_MAX_CHARS_PER_BATCH";
    const ENV_TOP_N: &'static str = "TA_TOP_N";
    const ENV_THRESHOLD: &'static str = "TA_THRESHOLD";
    const ENV_FORCE_REBUILD: &'static str = "TA_FORCE_REBUILD";

    /// Loads configuration from environment variables (falling back to defaults).
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let data_dir = Self::parse_path_from_env(Self::ENV_DATA_DIR, defaults.data_dir);
        let embedding_base_url =
            Self::parse_string_from_env(Self::ENV_BASE_URL, defaults.embedding_base_url);
        let api_key = Self::parse_optional_string_from_env(Self::ENV_API_KEY)
            .or_else(|| Self::parse_optional_string_from_env(Self::ENV_OPENAI_API_KEY));
        let embedding_model =
            Self::parse_string_from_env(Self::ENV_MODEL, defaults.embedding_model);
        let request_timeout = Duration::from_secs(Self::parse_number_from_env(
            Self::ENV_TIMEOUT_SECS,
            defaults.request_timeout.as_secs(),
        )?);
        let max_chars_per_text =
            Self::parse_number_from_env(Self::ENV_MAX_CHARS_PER_TEXT, defaults.max_chars_per_text)?;
        let max_chars_per_batch = Self::parse_number_from_env(
            Self::ENV_MAX_CHARS_PER_BATCH,
            defaults.max_chars_per_batch,
        )?;
        let top_n = Self::parse_number_from_env(Self::ENV_TOP_N, defaults.top_n)?;
        let threshold = Self::parse_number_from_env(Self::ENV_THRESHOLD, defaults.threshold)?;
        let force_rebuild = Self::parse_bool_from_env(Self::ENV_FORCE_REBUILD, false)?;

        Ok(Self {
            data_dir,
            embedding_base_url,
            api_key,
            embedding_model,
            request_timeout,
            max_chars_per_text,
            max_chars_per_batch,
            top_n,
            threshold,
            force_rebuild,
        })
    }

    /// Validates paths and numeric invariants (does not create directories).
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.data_dir.exists() && !self.data_dir.is_dir() {
            return Err(ConfigError::NotADirectory {
                path: self.data_dir.clone(),
            });
        }

        match reqwest::Url::parse(&self.embedding_base_url) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => {}
            _ => {
                return Err(ConfigError::InvalidBaseUrl {
                    value: self.embedding_base_url.clone(),
                });
            }
        }

        if self.max_chars_per_text == 0 {
            return Err(ConfigError::ZeroLimit {
                name: Self::ENV_MAX_CHARS_PER_TEXT,
            });
        }

        if self.max_chars_per_batch == 0 {
            return Err(ConfigError::ZeroLimit {
                name: Self::ENV_MAX_CHARS_PER_BATCH,
            });
        }

        if self.max_chars_per_batch < self.max_chars_per_text {
            return Err(ConfigError::BatchBudgetTooSmall {
                batch: self.max_chars_per_batch,
                text: self.max_chars_per_text,
            });
        }

        if !self.threshold.is_finite() || !(-1.0..=1.0).contains(&self.threshold) {
            return Err(ConfigError::InvalidThreshold {
                value: self.threshold,
            });
        }

        Ok(())
    }

    /// Returns the API key or [`ConfigError::MissingEnvVar`].
    pub fn require_api_key(&self) -> Result<&str, ConfigError> {
        self.api_key
            .as_deref()
            .ok_or(ConfigError::MissingEnvVar {
                name: Self::ENV_API_KEY,
            })
    }

    /// Directory holding the artifacts and snapshot of `corpus`.
    pub fn corpus_dir(&self, corpus: Corpus) -> PathBuf {
        self.data_dir.join(corpus.id())
    }

    fn parse_path_from_env(var_name: &str, default: PathBuf) -> PathBuf {
        env::var(var_name)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .map(PathBuf::from)
            .unwrap_or(default)
    }

    fn parse_optional_string_from_env(var_name: &str) -> Option<String> {
        env::var(var_name)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    fn parse_string_from_env(var_name: &str, default: String) -> String {
        Self::parse_optional_string_from_env(var_name).unwrap_or(default)
    }

    fn parse_number_from_env<T>(name: &'static str, default: T) -> Result<T, ConfigError>
    where
        T: std::str::FromStr,
        T::Err: std::fmt::Display,
    {
        match env::var(name) {
            Ok(value) => value
                .trim()
                .parse()
                .map_err(|e: T::Err| ConfigError::InvalidNumber {
                    name,
                    value: value.clone(),
                    reason: e.to_string(),
                }),
            Err(_) => Ok(default),
        }
    }

    fn parse_bool_from_env(name: &'static str, default: bool) -> Result<bool, ConfigError> {
        match env::var(name) {
            Ok(value) => match value.trim().to_lowercase().as_str() {
                "1" | "true" | "yes" => Ok(true),
                "0" | "false" | "no" | "" => Ok(false),
                _ => Err(ConfigError::InvalidBool { name, value }),
            },
            Err(_) => Ok(default),
        }
    }
}
