//! Test-only scaffolding: scratch git repositories and scripted seams.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::Mutex;

use anyhow::{Context, Result, anyhow};

use crate::config::Config;
use crate::io::git::{StatusEntry, VersionControl};
use crate::model::ModelClient;
use crate::prompt::PromptPair;

/// Deterministic config for pipeline tests.
pub fn test_config() -> Config {
    Config {
        base_branch: "master".to_string(),
        change_branch: "codex/refactor-test".to_string(),
        model: "gpt-5-codex".to_string(),
        api_key: "test-key".to_string(),
    }
}

/// Scratch repository with an initial commit and a bare `origin`, so
/// `pull --ff-only` and `push -u` run against a real remote.
pub struct TestRepo {
    dir: tempfile::TempDir,
}

impl TestRepo {
    pub fn new() -> Result<Self> {
        let dir = tempfile::tempdir().context("tempdir")?;
        let work = dir.path().join("work");
        let origin = dir.path().join("origin.git");
        fs::create_dir_all(&work).context("create workdir")?;

        git_in(dir.path(), &["init", "--bare", "origin.git"])?;
        git_in(&work, &["init", "-b", "master"])?;
        git_in(&work, &["config", "user.email", "bot@example.com"])?;
        git_in(&work, &["config", "user.name", "bot"])?;

        fs::write(work.join("README.md"), "# fixture\n").context("write README")?;
        fs::write(work.join("main.py"), "print('hello')\n").context("write main.py")?;
        git_in(&work, &["add", "."])?;
        git_in(&work, &["commit", "-m", "chore: init"])?;

        let origin_str = origin
            .to_str()
            .ok_or_else(|| anyhow!("origin path not utf-8"))?
            .to_string();
        git_in(&work, &["remote", "add", "origin", &origin_str])?;
        git_in(&work, &["push", "-u", "origin", "master"])?;

        Ok(Self { dir })
    }

    pub fn workdir(&self) -> PathBuf {
        self.dir.path().join("work")
    }

    pub fn current_branch(&self) -> Result<String> {
        git_capture(&self.workdir(), &["rev-parse", "--abbrev-ref", "HEAD"])
    }

    pub fn head_message(&self) -> Result<String> {
        git_capture(&self.workdir(), &["log", "-1", "--pretty=%s"])
    }

    /// True when `branch` exists in the bare origin.
    pub fn origin_has_branch(&self, branch: &str) -> Result<bool> {
        let refname = format!("refs/heads/{branch}");
        let status = Command::new("git")
            .args(["show-ref", "--verify", "--quiet", &refname])
            .current_dir(self.dir.path().join("origin.git"))
            .status()
            .context("spawn git show-ref")?;
        Ok(status.success())
    }
}

fn git_in(dir: &Path, args: &[&str]) -> Result<()> {
    let output = Command::new("git")
        .args(args)
        .current_dir(dir)
        .output()
        .with_context(|| format!("spawn git {}", args.join(" ")))?;
    if !output.status.success() {
        return Err(anyhow!(
            "git {} failed in {}: {}",
            args.join(" "),
            dir.display(),
            String::from_utf8_lossy(&output.stderr).trim()
        ));
    }
    Ok(())
}

fn git_capture(dir: &Path, args: &[&str]) -> Result<String> {
    let output = Command::new("git")
        .args(args)
        .current_dir(dir)
        .output()
        .with_context(|| format!("spawn git {}", args.join(" ")))?;
    if !output.status.success() {
        return Err(anyhow!("git {} failed in {}", args.join(" "), dir.display()));
    }
    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
}

/// Model seam returning a canned reply.
pub struct ScriptedModel {
    reply: String,
}

impl ScriptedModel {
    pub fn new(reply: impl Into<String>) -> Self {
        Self {
            reply: reply.into(),
        }
    }
}

impl ModelClient for ScriptedModel {
    fn generate(&self, _model: &str, _prompts: &PromptPair) -> Result<String> {
        Ok(self.reply.trim().to_string())
    }
}

/// Version-control seam that records every call and returns canned data.
///
/// Mutating calls are distinguishable from read calls so tests can assert
/// the zero-mutation property for non-diff replies.
pub struct RecordingVcs {
    calls: Mutex<Vec<String>>,
    tracked_files: Vec<String>,
    status_entries: Vec<StatusEntry>,
}

impl RecordingVcs {
    pub fn new(tracked_files: Vec<String>, status_entries: Vec<StatusEntry>) -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            tracked_files,
            status_entries,
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().expect("calls lock").clone()
    }

    /// Calls that mutate repository state (branch creation, apply, commit,
    /// push). The initial sync checkout/pull are reads of the base branch.
    pub fn mutations(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter(|call| {
                ["checkout-new", "apply", "commit", "push"]
                    .iter()
                    .any(|prefix| call.starts_with(prefix))
            })
            .collect()
    }

    fn record(&self, call: String) {
        self.calls.lock().expect("calls lock").push(call);
    }
}

impl VersionControl for RecordingVcs {
    fn checkout(&self, branch: &str) -> Result<()> {
        self.record(format!("checkout {branch}"));
        Ok(())
    }

    fn checkout_new_branch(&self, branch: &str) -> Result<()> {
        self.record(format!("checkout-new {branch}"));
        Ok(())
    }

    fn pull_ff_only(&self) -> Result<()> {
        self.record("pull".to_string());
        Ok(())
    }

    fn list_tracked_files(&self) -> Result<Vec<String>> {
        self.record("ls-files".to_string());
        Ok(self.tracked_files.clone())
    }

    fn apply_patch(&self, patch_file: &str) -> Result<()> {
        self.record(format!("apply {patch_file}"));
        Ok(())
    }

    fn status_porcelain(&self) -> Result<Vec<StatusEntry>> {
        self.record("status".to_string());
        Ok(self.status_entries.clone())
    }

    fn commit(&self, message: &str) -> Result<()> {
        self.record(format!("commit {message}"));
        Ok(())
    }

    fn push_upstream(&self, branch: &str) -> Result<()> {
        self.record(format!("push {branch}"));
        Ok(())
    }
}
