//! Nightly automated refactor bot.
//!
//! Syncs the base branch, snapshots tracked sources, asks a hosted model for
//! a unified diff, applies it on a fresh branch, commits, and pushes. A
//! non-diff reply or an empty result is a clean no-op; a failed checked
//! subprocess aborts with that subprocess's exit code.

use anyhow::Context;
use clap::Parser;

use refactor_bot::config::Cli;
use refactor_bot::io::git::Git;
use refactor_bot::io::process::CommandFailed;
use refactor_bot::logging;
use refactor_bot::model::OpenAiClient;
use refactor_bot::run::run_refactor;

fn main() {
    logging::init();
    let config = Cli::parse().into_config();

    let result = (|| -> anyhow::Result<()> {
        let root = std::env::current_dir().context("resolve working directory")?;
        let vcs = Git::new(&root);
        let model = OpenAiClient::new(config.api_key.clone());
        run_refactor(&root, &config, &vcs, &model)?;
        Ok(())
    })();

    if let Err(err) = result {
        eprintln!("{:#}", err);
        std::process::exit(exit_code_for(&err));
    }
}

/// A failed subprocess aborts the run with the child's own exit status;
/// everything else exits 1.
fn exit_code_for(err: &anyhow::Error) -> i32 {
    err.chain()
        .find_map(|cause| cause.downcast_ref::<CommandFailed>())
        .map_or(1, |failed| failed.code)
}
