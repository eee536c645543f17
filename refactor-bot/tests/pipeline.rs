//! End-to-end pipeline scenarios against real git repositories.
//!
//! Each test builds a scratch repository with a bare `origin` (see
//! `test_support::TestRepo`), scripts only the model seam, and drives the
//! full pipeline through the production `Git` adapter.

use std::fs;

use refactor_bot::io::git::Git;
use refactor_bot::io::process::CommandFailed;
use refactor_bot::run::{COMMIT_MESSAGE, PATCH_FILE, RunOutcome, run_refactor};
use refactor_bot::test_support::{ScriptedModel, TestRepo, test_config};

const APPLYING_DIFF: &str = "\
diff --git a/README.md b/README.md
--- a/README.md
+++ b/README.md
@@ -1 +1,2 @@
 # fixture
+Generated line.
";

const MISAPPLYING_DIFF: &str = "\
diff --git a/README.md b/README.md
--- a/README.md
+++ b/README.md
@@ -1 +1,2 @@
 # context that does not exist
+boom
";

/// A well-formed diff ends as a new branch with one commit, pushed upstream.
#[test]
fn applied_diff_is_committed_and_pushed() {
    let repo = TestRepo::new().expect("repo");
    let config = test_config();
    let vcs = Git::new(repo.workdir());
    let model = ScriptedModel::new(APPLYING_DIFF);

    let outcome = run_refactor(&repo.workdir(), &config, &vcs, &model).expect("run");

    assert_eq!(
        outcome,
        RunOutcome::Pushed {
            branch: config.change_branch.clone()
        }
    );
    assert_eq!(repo.current_branch().expect("branch"), config.change_branch);
    assert_eq!(repo.head_message().expect("message"), COMMIT_MESSAGE);
    assert!(repo.origin_has_branch(&config.change_branch).expect("origin"));

    let readme = fs::read_to_string(repo.workdir().join("README.md")).expect("read README");
    assert!(readme.contains("Generated line."));
    // The patch artifact is persisted, not cleaned up.
    assert!(repo.workdir().join(PATCH_FILE).exists());
}

/// A refusal reply is a clean no-op: no branch beyond the sync, no patch
/// file, nothing pushed.
#[test]
fn refusal_reply_leaves_the_repository_untouched() {
    let repo = TestRepo::new().expect("repo");
    let config = test_config();
    let vcs = Git::new(repo.workdir());
    let model = ScriptedModel::new("I cannot help with that.");

    let outcome = run_refactor(&repo.workdir(), &config, &vcs, &model).expect("run");

    assert_eq!(outcome, RunOutcome::NonDiffResponse);
    assert_eq!(repo.current_branch().expect("branch"), "master");
    assert!(!repo.workdir().join(PATCH_FILE).exists());
    assert!(!repo.origin_has_branch(&config.change_branch).expect("origin"));
}

/// A diff that fails to apply aborts the run with the subprocess's exit
/// code; nothing is committed or pushed.
#[test]
fn misapplying_diff_aborts_without_commit_or_push() {
    let repo = TestRepo::new().expect("repo");
    let config = test_config();
    let vcs = Git::new(repo.workdir());
    let model = ScriptedModel::new(MISAPPLYING_DIFF);

    let err = run_refactor(&repo.workdir(), &config, &vcs, &model).expect_err("should fail");
    let failed = err
        .chain()
        .find_map(|cause| cause.downcast_ref::<CommandFailed>())
        .expect("CommandFailed in chain");
    assert_ne!(failed.code, 0);

    // The change branch exists locally (created before apply), but holds no
    // new commit and was never pushed.
    assert_eq!(repo.head_message().expect("message"), "chore: init");
    assert!(!repo.origin_has_branch(&config.change_branch).expect("origin"));
}

/// The sync phase fails fatally when the base branch does not exist.
#[test]
fn missing_base_branch_aborts_the_sync() {
    let repo = TestRepo::new().expect("repo");
    let mut config = test_config();
    config.base_branch = "does-not-exist".to_string();
    let vcs = Git::new(repo.workdir());
    let model = ScriptedModel::new(APPLYING_DIFF);

    let err = run_refactor(&repo.workdir(), &config, &vcs, &model).expect_err("should fail");
    assert!(
        err.chain()
            .any(|cause| cause.downcast_ref::<CommandFailed>().is_some())
    );
    assert!(!repo.workdir().join(PATCH_FILE).exists());
}
