//! Subprocess execution with captured output.
//!
//! Every external command the bot runs goes through here. The command line
//! is echoed to stdout before execution so CI logs show exactly what ran.
//! Commands are spawned argv-style (no shell interpretation); arguments with
//! spaces need no quoting.

use std::fmt;
use std::path::Path;
use std::process::{Command, Output};

use anyhow::{Context, Result};
use tracing::{debug, warn};

/// A checked command exited non-zero. Carries the child's exit code so the
/// entry point can terminate the process with the same status.
#[derive(Debug)]
pub struct CommandFailed {
    pub command: String,
    pub code: i32,
}

impl fmt::Display for CommandFailed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "command `{}` exited with status {}",
            self.command, self.code
        )
    }
}

impl std::error::Error for CommandFailed {}

/// Run a command in `workdir` and return its trimmed stdout.
///
/// On non-zero exit the captured stdout is replayed to stdout and stderr to
/// stderr for diagnosis, and a [`CommandFailed`] carrying the exit code is
/// returned. A signal death maps to code 1.
pub fn run_checked(workdir: &Path, program: &str, args: &[&str]) -> Result<String> {
    let (line, output) = spawn(workdir, program, args)?;
    let stdout = String::from_utf8_lossy(&output.stdout);
    if !output.status.success() {
        let code = output.status.code().unwrap_or(1);
        warn!(command = %line, code, "command failed");
        print!("{stdout}");
        eprint!("{}", String::from_utf8_lossy(&output.stderr));
        return Err(CommandFailed {
            command: line,
            code,
        }
        .into());
    }
    Ok(stdout.trim().to_string())
}

/// Run a command and return trimmed stdout regardless of exit status.
///
/// Only for operations where a failure reads as empty output (the porcelain
/// status query). The tolerance is per-operation, not a general policy.
pub fn run_unchecked(workdir: &Path, program: &str, args: &[&str]) -> Result<String> {
    let (line, output) = spawn(workdir, program, args)?;
    if !output.status.success() {
        debug!(command = %line, code = ?output.status.code(), "tolerated failure");
    }
    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
}

fn spawn(workdir: &Path, program: &str, args: &[&str]) -> Result<(String, Output)> {
    let line = render(program, args);
    println!("$ {line}");
    debug!(command = %line, workdir = %workdir.display(), "running");
    let output = Command::new(program)
        .args(args)
        .current_dir(workdir)
        .output()
        .with_context(|| format!("spawn {line}"))?;
    Ok((line, output))
}

fn render(program: &str, args: &[&str]) -> String {
    let mut line = String::from(program);
    for arg in args {
        line.push(' ');
        line.push_str(arg);
    }
    line
}
