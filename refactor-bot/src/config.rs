//! Startup configuration.
//!
//! Everything the pipeline needs is resolved here once, into a [`Config`]
//! passed by reference into each component. CI drives the binary through
//! environment variables; clap binds each one to a flag, so a missing
//! credential fails at argument parsing, before any subprocess runs.

use chrono::{DateTime, Utc};
use clap::Parser;

/// CLI surface. Each flag is also readable from the environment.
#[derive(Debug, Parser)]
#[command(
    name = "refactor-bot",
    version,
    about = "Nightly automated refactor bot"
)]
pub struct Cli {
    /// Branch to sync from before generating changes.
    #[arg(long, env = "BASE_BRANCH", default_value = "master")]
    pub base_branch: String,

    /// Branch created for the generated result. Defaults to a
    /// timestamp-derived name, which keeps branches unique per run.
    #[arg(long, env = "CHANGE_BRANCH")]
    pub change_branch: Option<String>,

    /// Model identifier sent to the generation API.
    #[arg(long, env = "OPENAI_MODEL", default_value = "gpt-5-codex")]
    pub model: String,

    /// API credential. Required; startup fails if absent.
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    pub api_key: String,
}

/// Resolved run configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub base_branch: String,
    pub change_branch: String,
    pub model: String,
    pub api_key: String,
}

impl Cli {
    pub fn into_config(self) -> Config {
        let change_branch = self
            .change_branch
            .unwrap_or_else(|| default_change_branch(Utc::now()));
        Config {
            base_branch: self.base_branch,
            change_branch,
            model: self.model,
            api_key: self.api_key,
        }
    }
}

fn default_change_branch(now: DateTime<Utc>) -> String {
    format!("codex/refactor-{}", now.format("%Y%m%d%H%M%S"))
}
