//! Config struct and loading logic.
//!
//! Priority (highest to lowest):
//! 1. CLI flags
//! 2. Environment variables
//! 3. `.reposum.toml` in the working directory
//! 4. `~/.config/reposum/config.toml` (global defaults)
//! 5. Built-in defaults

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::warn;

use crate::env::Env;
use crate::models::ProviderName;

/// Errors during config loading.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    ReadFile {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    ParseFile {
        path: PathBuf,
        source: toml::de::Error,
    },
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub limits: LimitsConfig,
    pub provider: ProviderConfig,
    pub github: GithubConfig,
    pub request: RequestConfig,
}

/// Ranking, assembly, and chunking limits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Estimated-token ceiling for the single-call context.
    pub token_budget: usize,
    /// Characters per estimated token.
    pub chars_per_token: usize,
    /// Estimated-token target per map-reduce chunk.
    pub chunk_tokens: usize,
    /// Maximum number of file contents fetched per request.
    pub max_files: usize,
    /// Files larger than this (bytes) are excluded from ranking.
    pub max_file_size: u64,
    /// Files with more slashes in their path than this are excluded.
    pub max_tree_depth: usize,
    /// Concurrent content fetches in flight.
    pub fetch_concurrency: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            token_budget: 100_000,
            chars_per_token: 3,
            chunk_tokens: 30_000,
            max_files: 50,
            max_file_size: 100_000,
            max_tree_depth: 8,
            fetch_concurrency: 10,
        }
    }
}

/// LLM provider configuration.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    pub name: ProviderName,
    /// Model used for the single call and the reduce call.
    pub model: String,
    /// Cheaper model used for map (extraction) calls. Falls back to `model`.
    pub map_model: Option<String>,
    pub base_url: Option<String>,
    pub api_key: Option<String>,
    pub temperature: f64,
    pub max_tokens: u64,
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("name", &self.name)
            .field("model", &self.model)
            .field("map_model", &self.map_model)
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .finish()
    }
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            name: ProviderName::OpenAI,
            model: "gpt-4o".to_string(),
            map_model: Some("gpt-4o-mini".to_string()),
            base_url: None,
            api_key: None,
            temperature: 0.2,
            max_tokens: 2000,
        }
    }
}

impl ProviderConfig {
    /// Model for extraction calls.
    pub fn map_model(&self) -> &str {
        self.map_model.as_deref().unwrap_or(&self.model)
    }
}

/// GitHub API configuration.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GithubConfig {
    /// Optional credential, passed through as-is.
    pub token: Option<String>,
    pub api_base: String,
    /// Per-HTTP-request timeout in seconds.
    pub request_timeout_secs: u64,
}

impl std::fmt::Debug for GithubConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GithubConfig")
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .field("api_base", &self.api_base)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .finish()
    }
}

impl Default for GithubConfig {
    fn default() -> Self {
        Self {
            token: None,
            api_base: crate::constants::GITHUB_API_BASE.to_string(),
            request_timeout_secs: 30,
        }
    }
}

/// Whole-request settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RequestConfig {
    /// End-to-end deadline in seconds.
    pub timeout_secs: u64,
}

impl Default for RequestConfig {
    fn default() -> Self {
        Self { timeout_secs: 120 }
    }
}

impl RequestConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Config {
    /// Load configuration with proper layering.
    ///
    /// Reads from global config, local config, then applies
    /// environment variable overrides.
    pub fn load(local_dir: Option<&Path>, env: &Env) -> Result<Self, ConfigError> {
        let mut config = Config::default();

        // Layer 4: global config
        if let Some(global_path) = Self::global_config_path() {
            if global_path.exists() {
                let global = Self::load_file(&global_path)?;
                config.merge(global);
            }
        }

        // Layer 3: local config
        if let Some(dir) = local_dir {
            let local_path = dir.join(crate::constants::CONFIG_FILENAME);
            if local_path.exists() {
                let local = Self::load_file(&local_path)?;
                config.merge(local);
            }
        }

        // Layer 2: environment variables
        config.apply_env_vars(env);

        Ok(config)
    }

    /// Load a config from a specific file.
    fn load_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFile {
            path: path.to_path_buf(),
            source: e,
        })?;
        toml::from_str(&content).map_err(|e| ConfigError::ParseFile {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Get the global config file path.
    fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join(crate::constants::CONFIG_DIR).join("config.toml"))
    }

    /// Merge another config into this one (other takes precedence for non-default values).
    fn merge(&mut self, other: Config) {
        let default_limits = LimitsConfig::default();
        macro_rules! merge_limit {
            ($field:ident) => {
                if other.limits.$field != default_limits.$field {
                    self.limits.$field = other.limits.$field;
                }
            };
        }
        merge_limit!(token_budget);
        merge_limit!(chars_per_token);
        merge_limit!(chunk_tokens);
        merge_limit!(max_files);
        merge_limit!(max_file_size);
        merge_limit!(max_tree_depth);
        merge_limit!(fetch_concurrency);

        // Provider settings
        let default_provider = ProviderConfig::default();
        if other.provider.name != default_provider.name {
            self.provider.name = other.provider.name;
        }
        if other.provider.model != default_provider.model {
            self.provider.model = other.provider.model;
        }
        if other.provider.map_model != default_provider.map_model {
            self.provider.map_model = other.provider.map_model;
        }
        if other.provider.base_url.is_some() {
            self.provider.base_url = other.provider.base_url;
        }
        if other.provider.api_key.is_some() {
            self.provider.api_key = other.provider.api_key;
        }
        if other.provider.temperature != default_provider.temperature {
            self.provider.temperature = other.provider.temperature;
        }
        if other.provider.max_tokens != default_provider.max_tokens {
            self.provider.max_tokens = other.provider.max_tokens;
        }

        // GitHub settings
        let default_github = GithubConfig::default();
        if other.github.token.is_some() {
            self.github.token = other.github.token;
        }
        if other.github.api_base != default_github.api_base {
            self.github.api_base = other.github.api_base;
        }
        if other.github.request_timeout_secs != default_github.request_timeout_secs {
            self.github.request_timeout_secs = other.github.request_timeout_secs;
        }

        if other.request.timeout_secs != RequestConfig::default().timeout_secs {
            self.request.timeout_secs = other.request.timeout_secs;
        }
    }

    /// Apply environment variable overrides.
    fn apply_env_vars(&mut self, env: &Env) {
        use crate::constants as c;

        if let Ok(val) = env.var(c::ENV_PROVIDER) {
            if let Ok(name) = val.parse::<ProviderName>() {
                self.provider.name = name;
            } else {
                warn!("ignoring invalid {} value: {val}", c::ENV_PROVIDER);
            }
        }
        if let Ok(val) = env.var(c::ENV_MODEL) {
            self.provider.model = val;
        }
        if let Ok(val) = env.var(c::ENV_MAP_MODEL) {
            self.provider.map_model = Some(val);
        }
        if let Ok(val) = env.var(c::ENV_BASE_URL) {
            self.provider.base_url = Some(val);
        }

        // Provider-specific API key resolution
        let api_key = env
            .var(c::ENV_API_KEY)
            .or_else(|_| env.var(self.provider.name.api_key_env_var()))
            .ok();
        if api_key.is_some() {
            self.provider.api_key = api_key;
        }

        if let Ok(val) = env.var(c::ENV_GITHUB_TOKEN) {
            if !val.trim().is_empty() {
                self.github.token = Some(val);
            }
        }

        apply_parsed(env, c::ENV_TOKEN_BUDGET, &mut self.limits.token_budget);
        apply_parsed(env, c::ENV_CHUNK_TOKENS, &mut self.limits.chunk_tokens);
        apply_parsed(env, c::ENV_MAX_FILES, &mut self.limits.max_files);
        apply_parsed(env, c::ENV_MAX_FILE_SIZE, &mut self.limits.max_file_size);
        apply_parsed(env, c::ENV_MAX_TREE_DEPTH, &mut self.limits.max_tree_depth);
        apply_parsed(env, c::ENV_TIMEOUT_SECS, &mut self.request.timeout_secs);
    }
}

/// Overwrite `slot` with a parsed env var, warning on unparseable values.
fn apply_parsed<T: std::str::FromStr>(env: &Env, name: &str, slot: &mut T) {
    match env.parsed::<T>(name) {
        Ok(Some(value)) => *slot = value,
        Ok(None) => {}
        Err(invalid) => warn!("ignoring invalid {} value: {}", invalid.name, invalid.value),
    }
}
