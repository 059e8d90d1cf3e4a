//! Hidden internal commands for git hooks.

use crate::enforce::runner;
use crate::error::Error;

/// Pre-commit enforcement pass (called by the installed hook artifact).
///
/// Returns the exit code for git: 0 allows the commit, 1 blocks it.
pub async fn pre_commit() -> Result<i32, Error> {
    let project_root = std::env::current_dir()?;
    runner::run(&project_root).await
}
