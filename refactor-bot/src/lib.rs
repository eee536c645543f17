//! Nightly automated-refactor bot.
//!
//! One invocation drives a single linear pipeline: sync the base branch,
//! snapshot tracked source files, ask a hosted model for a unified diff,
//! apply it on a fresh change branch, commit, and push. There is no retry,
//! caching, or concurrency anywhere; the first failed checked subprocess
//! aborts the run with that subprocess's exit code.
//!
//! - **[`io`]**: side-effecting boundaries (subprocess execution, git,
//!   file snapshots). The git surface is a trait so tests script it.
//! - **[`model`]**: the single outbound API call, also behind a trait.
//! - **[`run`]**: orchestration of the pipeline over those seams.

pub mod config;
pub mod io;
pub mod logging;
pub mod model;
pub mod prompt;
pub mod run;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
