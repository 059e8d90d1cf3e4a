//! Git plumbing helpers.
//!
//! Shells out to the git CLI so the hook sees exactly the staging area git
//! itself operates on.

use std::path::{Path, PathBuf};
use std::process::Command;

use crate::error::Error;

/// Check if git is initialized in the project.
pub fn has_git(project_root: &Path) -> bool {
    project_root.join(".git").exists()
}

/// List staged files, relative to the project root.
///
/// Deleted files are excluded; there is nothing to enforce on them.
pub fn staged_files(project_root: &Path) -> Result<Vec<PathBuf>, Error> {
    let stdout = run_git(
        project_root,
        &["diff", "--cached", "--name-only", "--diff-filter=ACM"],
    )?;

    Ok(stdout
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(PathBuf::from)
        .collect())
}

/// Re-stage a file after an automatic rewrite.
pub fn stage_file(project_root: &Path, file: &Path) -> Result<(), Error> {
    let file_str = file.to_string_lossy().to_string();
    run_git(project_root, &["add", "--", &file_str])?;
    Ok(())
}

/// Run a git command in the project root, returning stdout.
fn run_git(project_root: &Path, args: &[&str]) -> Result<String, Error> {
    let output = Command::new("git")
        .args(args)
        .current_dir(project_root)
        .output()
        .map_err(|e| Error::Git(format!("failed to run git {}: {}", args.join(" "), e)))?;

    if !output.status.success() {
        return Err(Error::Git(format!(
            "git {} failed: {}",
            args.join(" "),
            String::from_utf8_lossy(&output.stderr).trim()
        )));
    }

    Ok(String::from_utf8_lossy(&output.stdout).to_string())
}
