//! Point-in-time status and health snapshots.
//!
//! Every function here is a pure read. Hook status is recomputed from the
//! on-disk artifact on each call; the hosting application must reconcile
//! from these reads rather than trust any cached mode.

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::db::{Database, EnforcementEvent, HookHealth};
use crate::error::Error;
use crate::git;
use crate::hook::artifact;
use crate::hook::mode::{self, HookMode};

/// Snapshot of the hook slot for one project.
#[derive(Debug, Clone, Serialize)]
pub struct HookStatus {
    pub installed: bool,
    pub hook_path: PathBuf,
    /// `None` when nothing occupies the pre-commit slot.
    pub mode: Option<HookMode>,
    pub has_husky: bool,
    pub has_git: bool,
    pub version: Option<String>,
    /// Installed artifact predates the current runner; reinstall advised.
    pub outdated: bool,
    pub current_version: String,
}

/// Compute the hook status by reading the hook slot on disk.
pub fn hook_status(project_root: &Path) -> HookStatus {
    let detection = mode::detect(project_root);

    // An external hook occupying the slot is not an installation of ours.
    let installed = matches!(detection.mode, Some(m) if m != HookMode::External);
    let outdated =
        installed && detection.version.as_deref() != Some(artifact::CURRENT_VERSION);

    HookStatus {
        installed,
        hook_path: detection.hook_path,
        mode: detection.mode,
        has_husky: detection.has_husky,
        has_git: git::has_git(project_root),
        version: detection.version,
        outdated,
        current_version: artifact::CURRENT_VERSION.to_string(),
    }
}

/// Read the health record, zeroed when the hook has never run.
pub fn hook_health(db: &Database, project_id: &str) -> Result<HookHealth, Error> {
    Ok(db
        .get_health(project_id)?
        .unwrap_or_else(|| HookHealth::new(project_id)))
}

/// Recent enforcement events, newest first.
pub fn enforcement_events(
    db: &Database,
    project_id: &str,
    limit: usize,
) -> Result<Vec<EnforcementEvent>, Error> {
    db.get_events(project_id, limit)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hook::installer;
    use tempfile::TempDir;

    #[test]
    fn test_status_fresh_repo_nothing_installed() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join(".git").join("hooks")).unwrap();

        let status = hook_status(dir.path());
        assert!(!status.installed);
        assert_eq!(status.mode, None);
        assert!(status.has_git);
        assert!(!status.has_husky);
        assert!(!status.outdated);
        assert_eq!(status.version, None);
    }

    #[test]
    fn test_status_after_install() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join(".git").join("hooks")).unwrap();
        installer::install(dir.path(), HookMode::AutoUpdate, false).unwrap();

        let status = hook_status(dir.path());
        assert!(status.installed);
        assert_eq!(status.mode, Some(HookMode::AutoUpdate));
        assert_eq!(status.version.as_deref(), Some(artifact::CURRENT_VERSION));
        assert!(!status.outdated);
    }

    #[test]
    fn test_status_external_hook_not_installed() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join(".git").join("hooks")).unwrap();
        std::fs::write(mode::hook_path(dir.path()), "#!/bin/sh\nmake lint\n").unwrap();

        let status = hook_status(dir.path());
        // mode external implies installed false
        assert_eq!(status.mode, Some(HookMode::External));
        assert!(!status.installed);
        assert!(!status.outdated);
    }

    #[test]
    fn test_status_outdated_artifact() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join(".git").join("hooks")).unwrap();
        let stale = artifact::render_standalone(HookMode::Warn)
            .replace(artifact::CURRENT_VERSION, "0.0.1");
        artifact::write_artifact(&mode::hook_path(dir.path()), &stale).unwrap();

        let status = hook_status(dir.path());
        assert!(status.installed);
        assert!(status.outdated);
        assert_eq!(status.version.as_deref(), Some("0.0.1"));
    }

    #[test]
    fn test_hook_health_defaults_to_zeroed() {
        let db = Database::open_memory().unwrap();
        let health = hook_health(&db, "p1").unwrap();
        assert_eq!(health.consecutive_failures, 0);
        assert_eq!(health.total_failures, 0);
        assert!(!health.downgraded);
    }
}
