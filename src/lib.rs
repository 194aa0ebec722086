//! reposum: LLM-backed GitHub repository summarizer (library crate).
//!
//! Re-exports public modules for integration tests and external use.

pub mod config;
pub mod constants;
pub mod context;
pub mod env;
pub mod github;
pub mod models;
pub mod orchestrator;
pub mod output;
pub mod providers;
pub mod ranker;
