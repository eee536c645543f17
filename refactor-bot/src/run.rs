//! Pipeline orchestration: Sync, Collect, Generate, Apply, Publish.
//!
//! Five sequential phases with exactly two early exits, both clean no-ops:
//! a reply that is not a unified diff, and a patch that leaves the tree
//! unchanged. Everything else either succeeds or aborts on the first failed
//! step.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::{debug, info};

use crate::config::Config;
use crate::io::git::VersionControl;
use crate::io::snapshot::{SnapshotLimits, build_snapshot, select_files};
use crate::model::ModelClient;
use crate::prompt::build_prompts;

/// Fixed path the model reply is written to before apply. Left on disk
/// after the run.
pub const PATCH_FILE: &str = ".codex.patch";

/// Commit message for every generated change.
pub const COMMIT_MESSAGE: &str = "Nightly automated refactor (Codex)";

/// Reply prefixes accepted as a unified diff.
const DIFF_MARKERS: [&str; 2] = ["diff --git", "--- "];

/// How much of a non-diff reply is echoed for diagnosis.
const PREVIEW_CHARS: usize = 2000;

/// Terminal states of a run. All three exit 0.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// Change branch committed and pushed upstream.
    Pushed { branch: String },
    /// The model declined or misformatted; repository untouched.
    NonDiffResponse,
    /// The patch applied but left the tree identical to HEAD.
    NoChanges,
}

/// Drive one full refactor run against the repository at `root`.
pub fn run_refactor<V: VersionControl, M: ModelClient>(
    root: &Path,
    config: &Config,
    vcs: &V,
    model: &M,
) -> Result<RunOutcome> {
    vcs.checkout(&config.base_branch)?;
    vcs.pull_ff_only()?;

    let files = select_files(&vcs.list_tracked_files()?);
    debug!(files = files.len(), "selected snapshot candidates");
    let snapshot = build_snapshot(root, &files, &SnapshotLimits::default());
    if snapshot.skipped > 0 {
        println!(
            "Skipped {} unreadable file(s) while building the repo map.",
            snapshot.skipped
        );
    }
    let prompts = build_prompts(&snapshot.text)?;

    let reply = model.generate(&config.model, &prompts)?;
    if !looks_like_diff(&reply) {
        println!("Model did not return a unified diff; exiting without changes.");
        println!("{}", preview(&reply, PREVIEW_CHARS));
        return Ok(RunOutcome::NonDiffResponse);
    }

    vcs.checkout_new_branch(&config.change_branch)?;
    let patch_path = root.join(PATCH_FILE);
    fs::write(&patch_path, &reply).with_context(|| format!("write {}", patch_path.display()))?;
    vcs.apply_patch(PATCH_FILE)?;

    // The patch artifact stays on disk and must not count as a change.
    let changes: Vec<_> = vcs
        .status_porcelain()?
        .into_iter()
        .filter(|entry| entry.path != PATCH_FILE)
        .collect();
    if changes.is_empty() {
        println!("No changes to commit.");
        return Ok(RunOutcome::NoChanges);
    }

    vcs.commit(COMMIT_MESSAGE)?;
    vcs.push_upstream(&config.change_branch)?;
    println!("Branch pushed; PR step will create/update the pull request.");
    info!(branch = %config.change_branch, "change branch pushed");
    Ok(RunOutcome::Pushed {
        branch: config.change_branch.clone(),
    })
}

fn looks_like_diff(reply: &str) -> bool {
    DIFF_MARKERS.iter().any(|marker| reply.starts_with(marker))
}

fn preview(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}
