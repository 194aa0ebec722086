//! App-wide constants.
//!
//! Centralises the tool name, config paths, environment variable names,
//! and URLs so a rename only requires changing this file.

/// Display name of the tool (lowercase).
pub const APP_NAME: &str = "reposum";

/// Crate version, baked in at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Target triple the binary was built for (set by `build.rs`).
pub const TARGET: &str = env!("TARGET");

/// User agent sent with every GitHub API request.
pub const USER_AGENT: &str = concat!("reposum/", env!("CARGO_PKG_VERSION"));

/// Local config filename (e.g. `.reposum.toml` in the working directory).
pub const CONFIG_FILENAME: &str = ".reposum.toml";

/// Directory name under `~/.config/` for global config.
pub const CONFIG_DIR: &str = "reposum";

/// Default GitHub REST API base URL.
pub const GITHUB_API_BASE: &str = "https://api.github.com";

// ── Environment variable names ──────────────────────────────────────

pub const ENV_PROVIDER: &str = "REPOSUM_PROVIDER";
pub const ENV_MODEL: &str = "REPOSUM_MODEL";
pub const ENV_MAP_MODEL: &str = "REPOSUM_MAP_MODEL";
pub const ENV_API_KEY: &str = "REPOSUM_API_KEY";
pub const ENV_BASE_URL: &str = "REPOSUM_BASE_URL";
pub const ENV_GITHUB_TOKEN: &str = "GITHUB_TOKEN";
pub const ENV_TOKEN_BUDGET: &str = "REPOSUM_TOKEN_BUDGET";
pub const ENV_CHUNK_TOKENS: &str = "REPOSUM_CHUNK_TOKENS";
pub const ENV_MAX_FILES: &str = "REPOSUM_MAX_FILES";
pub const ENV_MAX_FILE_SIZE: &str = "REPOSUM_MAX_FILE_SIZE";
pub const ENV_MAX_TREE_DEPTH: &str = "REPOSUM_MAX_TREE_DEPTH";
pub const ENV_TIMEOUT_SECS: &str = "REPOSUM_TIMEOUT_SECS";
