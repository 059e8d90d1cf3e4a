//! Hook installation and removal.

use std::fs;
use std::path::Path;

use tracing::info;

use crate::error::{Error, InstallError};
use crate::git;
use crate::hook::artifact;
use crate::hook::mode::{self, HookMode};
use crate::report::{self, HookStatus};

/// Result of an install call.
#[derive(Debug)]
pub struct InstallOutcome {
    pub status: HookStatus,
    /// True when `--force` overwrote an unrelated hook; the caller records
    /// an info event for the replacement.
    pub replaced_external: bool,
}

/// Install the pre-commit hook at the requested mode.
///
/// Re-installing the same mode is idempotent: the artifact stays
/// byte-identical and nothing is written. An unrelated hook in the slot is
/// refused unless `force` is set; a Husky script is chained after, never
/// replaced.
pub fn install(
    project_root: &Path,
    target_mode: HookMode,
    force: bool,
) -> Result<InstallOutcome, Error> {
    if !git::has_git(project_root) {
        return Err(InstallError::NoGitRepo.into());
    }

    let husky = mode::has_husky(project_root);
    let path = mode::hook_path(project_root);
    let mut replaced_external = false;

    let existing = if path.exists() {
        Some(fs::read_to_string(&path)?)
    } else {
        None
    };

    let new_content = match &existing {
        Some(content) if artifact::is_ours(content) => {
            // Reinstall: replace our section in place.
            let rest = artifact::strip_our_section(content);
            if is_effectively_empty(&rest) {
                artifact::render_standalone(target_mode)
            } else {
                chain_after(&rest, target_mode)
            }
        }
        Some(content) => {
            if husky {
                chain_after(content, target_mode)
            } else if force {
                replaced_external = true;
                artifact::render_standalone(target_mode)
            } else {
                return Err(InstallError::UnrelatedHookPresent(path).into());
            }
        }
        None => {
            if husky {
                format!("#!/bin/sh\n\n{}", artifact::render_chain_block(target_mode))
            } else {
                artifact::render_standalone(target_mode)
            }
        }
    };

    if existing.as_deref() != Some(new_content.as_str()) {
        write_hook(&path, &new_content)?;
        info!(path = %path.display(), mode = %target_mode, "Installed pre-commit hook");
    }

    Ok(InstallOutcome {
        status: report::hook_status(project_root),
        replaced_external,
    })
}

/// Remove the docsentry hook, preserving chained third-party content.
pub fn uninstall(project_root: &Path) -> Result<(), Error> {
    let path = mode::hook_path(project_root);
    if !path.exists() {
        return Ok(());
    }

    let content = fs::read_to_string(&path)?;
    if !artifact::is_ours(&content) {
        return Ok(());
    }

    let rest = artifact::strip_our_section(&content);
    if is_effectively_empty(&rest) {
        fs::remove_file(&path)?;
    } else {
        write_hook(&path, &format!("{}\n", rest.trim_end()))?;
    }
    info!(path = %path.display(), "Removed pre-commit hook");

    Ok(())
}

/// Append our chain block after an existing script.
fn chain_after(existing: &str, target_mode: HookMode) -> String {
    format!(
        "{}\n\n{}",
        existing.trim_end(),
        artifact::render_chain_block(target_mode)
    )
}

/// Leftover content that only amounts to a shebang.
fn is_effectively_empty(content: &str) -> bool {
    content.trim().is_empty() || content.trim() == "#!/bin/sh"
}

fn write_hook(path: &Path, content: &str) -> Result<(), Error> {
    artifact::write_artifact(path, content).map_err(|e| match e {
        Error::Io(io) if io.kind() == std::io::ErrorKind::PermissionDenied => {
            InstallError::PermissionDenied(path.to_path_buf()).into()
        }
        other => other,
    })
}
