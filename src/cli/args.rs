//! Clap argument types and config overrides.

use clap::{Parser, ValueEnum};

use reposum::config::Config;
use reposum::models::ProviderName;
use reposum::output::OutputRenderer;
use reposum::output::json::JsonRenderer;
use reposum::output::terminal::TerminalRenderer;

/// Summarize a GitHub repository with an LLM.
#[derive(Parser, Debug)]
#[command(name = "reposum", version = reposum::constants::VERSION)]
pub struct Cli {
    /// Show debug logs (per-file scores, HTTP requests).
    #[arg(long, short = 'v', global = true, default_value_t = false, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Only show warnings and errors on stderr.
    #[arg(long, short = 'q', global = true, default_value_t = false)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(clap::Subcommand, Debug)]
pub enum Command {
    /// Summarize a repository: what it does, its technologies, its layout.
    Summarize(Box<SummarizeArgs>),

    /// Show how the files of a repository are ranked, without calling a model.
    Rank(RankArgs),

    /// Print version and build information.
    Version,
}

/// Arguments for the `summarize` subcommand.
#[derive(Parser, Debug)]
pub struct SummarizeArgs {
    /// Repository URL, e.g. https://github.com/owner/repo.
    pub url: String,

    /// Output format.
    #[arg(long, default_value = "terminal")]
    pub format: OutputFormat,

    // --- Budgets ---
    /// Estimated-token budget for the single-call context.
    #[arg(long)]
    pub token_budget: Option<usize>,

    /// Estimated-token ceiling per map-reduce chunk.
    #[arg(long)]
    pub chunk_tokens: Option<usize>,

    /// Maximum number of ranked files to fetch.
    #[arg(long)]
    pub max_files: Option<usize>,

    /// Files larger than this many bytes are excluded.
    #[arg(long)]
    pub max_file_size: Option<u64>,

    /// Files nested deeper than this many directories are excluded.
    #[arg(long)]
    pub max_depth: Option<usize>,

    /// End-to-end deadline in seconds.
    #[arg(long)]
    pub timeout: Option<u64>,

    // --- Provider ---
    /// LLM provider (anthropic, openai, gemini, deepseek, groq, openai-compatible).
    #[arg(long)]
    pub provider: Option<ProviderName>,

    /// Model for the single call and the reduce step.
    #[arg(long)]
    pub model: Option<String>,

    /// Model for map-step extraction calls.
    #[arg(long)]
    pub map_model: Option<String>,
}

impl SummarizeArgs {
    /// Apply CLI flags on top of the loaded configuration.
    pub fn apply_overrides(&self, config: &mut Config) {
        let limits = &mut config.limits;
        if let Some(v) = self.token_budget {
            limits.token_budget = v;
        }
        if let Some(v) = self.chunk_tokens {
            limits.chunk_tokens = v;
        }
        if let Some(v) = self.max_files {
            limits.max_files = v;
        }
        if let Some(v) = self.max_file_size {
            limits.max_file_size = v;
        }
        if let Some(v) = self.max_depth {
            limits.max_tree_depth = v;
        }
        if let Some(v) = self.timeout {
            config.request.timeout_secs = v;
        }
        if let Some(v) = self.provider {
            config.provider.name = v;
        }
        if let Some(ref v) = self.model {
            config.provider.model = v.clone();
        }
        if let Some(ref v) = self.map_model {
            config.provider.map_model = Some(v.clone());
        }
    }
}

/// Arguments for the `rank` subcommand.
#[derive(Parser, Debug)]
pub struct RankArgs {
    /// Repository URL, e.g. https://github.com/owner/repo.
    pub url: String,

    /// Output format.
    #[arg(long, default_value = "terminal")]
    pub format: OutputFormat,

    /// Show only the top N files.
    #[arg(long)]
    pub limit: Option<usize>,

    /// Files larger than this many bytes are excluded.
    #[arg(long)]
    pub max_file_size: Option<u64>,

    /// Files nested deeper than this many directories are excluded.
    #[arg(long)]
    pub max_depth: Option<usize>,
}

impl RankArgs {
    /// Apply CLI flags on top of the loaded configuration.
    pub fn apply_overrides(&self, config: &mut Config) {
        if let Some(v) = self.max_file_size {
            config.limits.max_file_size = v;
        }
        if let Some(v) = self.max_depth {
            config.limits.max_tree_depth = v;
        }
    }
}

/// Output format options.
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum OutputFormat {
    Terminal,
    Json,
}

impl OutputFormat {
    /// Renderer for this format.
    pub fn renderer(&self) -> &'static dyn OutputRenderer {
        match self {
            OutputFormat::Terminal => &TerminalRenderer,
            OutputFormat::Json => &JsonRenderer,
        }
    }
}
