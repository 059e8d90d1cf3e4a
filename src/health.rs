//! Hook health supervision.
//!
//! Tracks failure/success streaks across commits and downgrades the hook
//! out of auto-update once failures persist. The supervisor is the only
//! writer of the health record; each commit produces exactly one atomic
//! update.

use std::path::Path;

use tracing::warn;

use crate::db::{Database, EnforcementEvent, EventType, HookHealth};
use crate::error::Error;
use crate::hook::mode;

/// Aggregate outcome of one commit attempt, reported once per commit.
#[derive(Debug, Default)]
pub struct CommitReport {
    /// At least one generation/validation failure occurred.
    pub any_failure: bool,
    /// Files successfully rewritten and re-staged.
    pub files_rewritten: usize,
    pub failed_file: Option<String>,
    pub failure_reason: Option<String>,
}

/// Record a commit outcome, downgrading the hook when the failure streak
/// crosses the threshold.
pub fn record_commit(
    db: &Database,
    project_root: &Path,
    project_id: &str,
    threshold: u32,
    report: &CommitReport,
) -> Result<HookHealth, Error> {
    let mut health = db
        .get_health(project_id)?
        .unwrap_or_else(|| HookHealth::new(project_id));

    if report.any_failure {
        health.consecutive_failures += 1;
        health.total_failures += 1;
        health.last_failure_file = report.failed_file.clone();
        health.last_failure_reason = report.failure_reason.clone();
        health.last_failure_time = Some(chrono::Utc::now().to_rfc3339());

        if health.consecutive_failures >= threshold && !health.downgraded {
            apply_downgrade(db, project_root, &mut health)?;
        }
    } else {
        health.consecutive_failures = 0;
        health.total_successes += report.files_rewritten as u64;
    }

    db.upsert_health(&health)?;
    Ok(health)
}

/// Manual recovery: zero the streak and clear the downgrade flag.
///
/// Never touches the hook mode. Re-enabling auto-update takes an explicit
/// reinstall, since whatever caused the downgrade may persist.
pub fn reset(db: &Database, project_id: &str) -> Result<HookHealth, Error> {
    let mut health = db
        .get_health(project_id)?
        .unwrap_or_else(|| HookHealth::new(project_id));

    health.consecutive_failures = 0;
    health.downgraded = false;

    db.upsert_health(&health)?;
    Ok(health)
}

fn apply_downgrade(
    db: &Database,
    project_root: &Path,
    health: &mut HookHealth,
) -> Result<(), Error> {
    mode::downgrade(project_root)?;
    health.downgraded = true;
    health.downgrade_time = Some(chrono::Utc::now().to_rfc3339());

    let message = format!(
        "Auto-Update Disabled (Self-Healed): {} consecutive failures (last: {})",
        health.consecutive_failures,
        health.last_failure_reason.as_deref().unwrap_or("unknown"),
    );
    warn!(project_id = %health.project_id, "{}", message);

    let event = EnforcementEvent::new(
        &health.project_id,
        EventType::Block,
        "health-supervisor",
        message,
        health.last_failure_file.as_deref(),
    );
    db.insert_event(&event)?;

    Ok(())
}
