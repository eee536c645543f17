//! Prompt pair assembly.
//!
//! The instruction texts live as markdown files under `prompts/` so they can
//! be revised without touching pipeline code. Rendering is pure: the same
//! snapshot always yields the same pair.

use anyhow::{Context, Result};
use minijinja::{Environment, context};

const CONTRACT_TEMPLATE: &str = include_str!("prompts/contract.md");
const GOAL_TEMPLATE: &str = include_str!("prompts/goal.md");

/// System and user instructions, passed verbatim to the model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptPair {
    /// Output-format contract: a single unified diff, nothing else.
    pub system: String,
    /// Refactor goal plus the embedded repo map.
    pub user: String,
}

/// Render the fixed instruction pair around a repository snapshot.
pub fn build_prompts(repo_map: &str) -> Result<PromptPair> {
    let mut env = Environment::new();
    env.add_template("contract", CONTRACT_TEMPLATE)
        .context("contract template")?;
    env.add_template("goal", GOAL_TEMPLATE)
        .context("goal template")?;

    let system = env
        .get_template("contract")?
        .render(context! {})
        .context("render contract")?;
    let user = env
        .get_template("goal")?
        .render(context! { repo_map => repo_map })
        .context("render goal")?;

    Ok(PromptPair {
        system: system.trim().to_string(),
        user: user.trim().to_string(),
    })
}
