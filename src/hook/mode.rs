//! Hook mode state machine.
//!
//! The mode is a closed enum; the installed artifact on disk is its single
//! source of truth. `detect` classifies the hook slot as not installed,
//! installed by docsentry at some mode, or occupied by an external hook.

use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::Serialize;

use crate::error::Error;
use crate::hook::artifact;

/// Hook behavior mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum HookMode {
    /// Hook installed but inert.
    Off,
    /// Print warnings for missing/stale headers; never block.
    Warn,
    /// Block the commit when any header is missing or stale.
    Block,
    /// Generate and write headers automatically, subject to validation.
    AutoUpdate,
    /// A non-docsentry hook occupies the slot. Never installable.
    #[value(skip)]
    External,
}

impl std::fmt::Display for HookMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let token = match self {
            HookMode::Off => "off",
            HookMode::Warn => "warn",
            HookMode::Block => "block",
            HookMode::AutoUpdate => "auto-update",
            HookMode::External => "external",
        };
        write!(f, "{}", token)
    }
}

impl FromStr for HookMode {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "off" => Ok(HookMode::Off),
            "warn" => Ok(HookMode::Warn),
            "block" => Ok(HookMode::Block),
            "auto-update" => Ok(HookMode::AutoUpdate),
            "external" => Ok(HookMode::External),
            _ => Err(()),
        }
    }
}

/// Result of inspecting the hook slot.
#[derive(Debug, Clone)]
pub struct Detection {
    /// `None` when nothing occupies the pre-commit slot.
    pub mode: Option<HookMode>,
    pub has_husky: bool,
    pub has_external: bool,
    pub version: Option<String>,
    pub hook_path: PathBuf,
}

/// Check for a Husky-managed hooks directory.
pub fn has_husky(project_root: &Path) -> bool {
    project_root.join(".husky").is_dir()
}

/// Resolve where the pre-commit artifact lives for this project.
///
/// Husky redirects `core.hooksPath`, so its script is the slot we must
/// chain into rather than `.git/hooks`.
pub fn hook_path(project_root: &Path) -> PathBuf {
    if has_husky(project_root) {
        project_root.join(".husky").join("pre-commit")
    } else {
        project_root.join(".git").join("hooks").join("pre-commit")
    }
}

/// Inspect the on-disk hook artifact. Never reads cached state.
pub fn detect(project_root: &Path) -> Detection {
    let husky = has_husky(project_root);
    let path = hook_path(project_root);

    let content = match fs::read_to_string(&path) {
        Ok(content) => content,
        Err(_) => {
            return Detection {
                mode: None,
                has_husky: husky,
                has_external: false,
                version: None,
                hook_path: path,
            }
        }
    };

    if artifact::is_ours(&content) {
        Detection {
            mode: artifact::parse_mode(&content),
            has_husky: husky,
            has_external: false,
            version: artifact::parse_version(&content),
            hook_path: path,
        }
    } else {
        Detection {
            mode: Some(HookMode::External),
            has_husky: husky,
            has_external: true,
            version: None,
            hook_path: path,
        }
    }
}

/// Rewrite the installed artifact to `warn`.
///
/// Invoked only by the health supervisor when the failure streak crosses
/// the downgrade threshold. Only the mode marker line changes, so Husky
/// chains and surrounding script content survive.
pub fn downgrade(project_root: &Path) -> Result<(), Error> {
    let path = hook_path(project_root);
    let content = fs::read_to_string(&path)?;

    if !artifact::is_ours(&content) {
        // Slot no longer ours; nothing to rewrite.
        return Ok(());
    }

    let rewritten = artifact::replace_mode(&content, HookMode::Warn);
    artifact::write_artifact(&path, &rewritten)
}
