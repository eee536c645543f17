//! Side-effecting boundaries: subprocess execution, git, file snapshots.

pub mod git;
pub mod process;
pub mod snapshot;
