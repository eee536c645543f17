//! Git adapter for pipeline commands.
//!
//! The pipeline drives git through a narrow capability trait so tests can
//! script the boundary without spawning processes. [`Git`] is the production
//! implementation: it prefixes the `git` binary and delegates to the command
//! runner, nothing more.

use std::path::{Path, PathBuf};

use anyhow::Result;
use tracing::{debug, warn};

use crate::io::process::{run_checked, run_unchecked};

/// Parsed `git status --porcelain` entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusEntry {
    /// 2-letter XY code, or "??" for untracked.
    pub code: String,
    /// Path for the changed file (renames report the new path).
    pub path: String,
}

/// The version-control operations the pipeline needs.
pub trait VersionControl {
    fn checkout(&self, branch: &str) -> Result<()>;
    fn checkout_new_branch(&self, branch: &str) -> Result<()>;
    fn pull_ff_only(&self) -> Result<()>;
    /// Tracked files in listing order, repo-relative, no duplicates.
    fn list_tracked_files(&self) -> Result<Vec<String>>;
    /// Apply a patch file with index update and whitespace fixing.
    fn apply_patch(&self, patch_file: &str) -> Result<()>;
    /// Working-tree changes. Tolerates failure: a failed query reads as
    /// "no entries" rather than aborting the run.
    fn status_porcelain(&self) -> Result<Vec<StatusEntry>>;
    fn commit(&self, message: &str) -> Result<()>;
    /// Push `branch`, creating the remote tracking branch.
    fn push_upstream(&self, branch: &str) -> Result<()>;
}

/// Runs `git` subcommands in a working directory.
#[derive(Debug, Clone)]
pub struct Git {
    workdir: PathBuf,
}

impl Git {
    pub fn new(workdir: impl Into<PathBuf>) -> Self {
        Self {
            workdir: workdir.into(),
        }
    }

    pub fn workdir(&self) -> &Path {
        &self.workdir
    }

    fn git(&self, args: &[&str]) -> Result<String> {
        run_checked(&self.workdir, "git", args)
    }
}

impl VersionControl for Git {
    fn checkout(&self, branch: &str) -> Result<()> {
        debug!(branch, "checking out branch");
        self.git(&["checkout", branch])?;
        Ok(())
    }

    fn checkout_new_branch(&self, branch: &str) -> Result<()> {
        debug!(branch, "creating and checking out new branch");
        self.git(&["checkout", "-b", branch])?;
        Ok(())
    }

    fn pull_ff_only(&self) -> Result<()> {
        self.git(&["pull", "--ff-only"])?;
        Ok(())
    }

    fn list_tracked_files(&self) -> Result<Vec<String>> {
        let out = self.git(&["ls-files"])?;
        Ok(out
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(str::to_string)
            .collect())
    }

    fn apply_patch(&self, patch_file: &str) -> Result<()> {
        self.git(&["apply", "--index", "--whitespace=fix", patch_file])?;
        Ok(())
    }

    fn status_porcelain(&self) -> Result<Vec<StatusEntry>> {
        let out = run_unchecked(&self.workdir, "git", &["status", "--porcelain"])?;
        Ok(parse_porcelain(&out))
    }

    fn commit(&self, message: &str) -> Result<()> {
        self.git(&["commit", "-m", message])?;
        Ok(())
    }

    fn push_upstream(&self, branch: &str) -> Result<()> {
        self.git(&["push", "-u", "origin", branch])?;
        Ok(())
    }
}

fn parse_porcelain(out: &str) -> Vec<StatusEntry> {
    let mut entries = Vec::new();
    for line in out.lines() {
        if line.trim().is_empty() {
            continue;
        }
        match parse_status_line(line) {
            Some(entry) => entries.push(entry),
            None => warn!(line, "skipping unparseable status line"),
        }
    }
    entries
}

/// Parse one porcelain line. The capture is trimmed before it reaches us, so
/// the first line may have lost the leading column of its XY code.
fn parse_status_line(line: &str) -> Option<StatusEntry> {
    if let Some(path) = line.strip_prefix("?? ") {
        return Some(StatusEntry {
            code: "??".to_string(),
            path: path.trim().to_string(),
        });
    }
    let (code, rest) = if line.len() > 3 && line.as_bytes()[2] == b' ' {
        (&line[..2], &line[3..])
    } else {
        line.split_once(' ')?
    };
    let mut path = rest.trim().to_string();
    if let Some((_, renamed)) = path.split_once(" -> ") {
        path = renamed.trim().to_string();
    }
    if path.is_empty() {
        return None;
    }
    Some(StatusEntry {
        code: code.to_string(),
        path,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::TestRepo;

    #[test]
    fn parses_untracked_line() {
        let e = parse_status_line("?? foo.txt").expect("parse");
        assert_eq!(e.code, "??");
        assert_eq!(e.path, "foo.txt");
    }

    #[test]
    fn parses_modified_line() {
        let e = parse_status_line(" M src/main.rs").expect("parse");
        assert_eq!(e.code, " M");
        assert_eq!(e.path, "src/main.rs");
    }

    #[test]
    fn parses_line_with_trimmed_leading_column() {
        let e = parse_status_line("M src/main.rs").expect("parse");
        assert_eq!(e.path, "src/main.rs");
    }

    #[test]
    fn parses_rename_line_uses_new_path() {
        let e = parse_status_line("R  old.txt -> new.txt").expect("parse");
        assert_eq!(e.path, "new.txt");
    }

    #[test]
    fn lists_tracked_files_in_a_real_repo() {
        let repo = TestRepo::new().expect("repo");
        let git = Git::new(repo.workdir());
        let files = git.list_tracked_files().expect("ls-files");
        assert!(files.contains(&"README.md".to_string()));
    }

    #[test]
    fn status_is_empty_on_clean_repo() {
        let repo = TestRepo::new().expect("repo");
        let git = Git::new(repo.workdir());
        assert!(git.status_porcelain().expect("status").is_empty());
    }

    #[test]
    fn apply_rejects_garbage_patch() {
        let repo = TestRepo::new().expect("repo");
        let git = Git::new(repo.workdir());
        std::fs::write(repo.workdir().join("bad.patch"), "not a diff\n").expect("write");
        assert!(git.apply_patch("bad.patch").is_err());
    }
}
