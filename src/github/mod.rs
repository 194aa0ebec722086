//! GitHub access: URL parsing, tree listing, and file content.
//!
//! The pipeline only sees the [`TreeProvider`] and [`ContentProvider`]
//! traits; [`GithubClient`] is the REST implementation of both.

pub mod client;
pub mod url;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::{FileDescriptor, RepoId};

pub use client::GithubClient;
pub use url::parse_repo_url;

/// Errors from the GitHub REST API or from URL parsing.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GithubError {
    #[error("invalid GitHub URL: {0}")]
    InvalidUrl(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("GitHub API rate limit exceeded. Set GITHUB_TOKEN to increase the limit.")]
    RateLimited,

    #[error("access denied: {0}")]
    AccessDenied(String),

    #[error("GitHub API error: {0}")]
    Api(String),

    #[error("network error: {0}")]
    Network(String),
}

/// Full recursive listing of a repository's default branch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RepoTree {
    pub files: Vec<FileDescriptor>,
    /// GitHub stopped listing before the end of a very large tree.
    pub truncated: bool,
}

/// Decoded content of a single file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileContent {
    Text(String),
    /// Content that is not valid UTF-8.
    Binary,
}

/// Source of repository tree listings.
#[async_trait]
pub trait TreeProvider: Send + Sync {
    async fn tree(&self, repo: &RepoId) -> Result<RepoTree, GithubError>;
}

/// Source of file contents.
#[async_trait]
pub trait ContentProvider: Send + Sync {
    async fn content(&self, repo: &RepoId, path: &str) -> Result<FileContent, GithubError>;
}
