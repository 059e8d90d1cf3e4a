//! Database schema definitions for docsentry.

use rusqlite::{Connection, Result, Row};
use serde::Serialize;

use crate::error::Error;

/// Initialize database with all tables.
pub fn init_db(conn: &Connection) -> Result<(), Error> {
    // One row per project; rewritten as a single atomic upsert so UI reads
    // never observe a torn update.
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS hook_health (
            project_id           TEXT PRIMARY KEY,
            consecutive_failures INTEGER NOT NULL DEFAULT 0,
            last_failure_file    TEXT,
            last_failure_reason  TEXT,
            last_failure_time    TEXT,
            downgraded           INTEGER NOT NULL DEFAULT 0,
            downgrade_time       TEXT,
            total_successes      INTEGER NOT NULL DEFAULT 0,
            total_failures       INTEGER NOT NULL DEFAULT 0
        );
        "#,
    )?;

    // Append-only audit log.
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS enforcement_events (
            id          TEXT PRIMARY KEY,
            project_id  TEXT NOT NULL,
            event_type  TEXT NOT NULL,
            source      TEXT NOT NULL,
            message     TEXT NOT NULL,
            file_path   TEXT,
            created_at  TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_events_project ON enforcement_events(project_id);
        CREATE INDEX IF NOT EXISTS idx_events_created ON enforcement_events(created_at);
        "#,
    )?;

    Ok(())
}

/// Hook health record: failure streaks and downgrade state for one project.
#[derive(Debug, Clone, Serialize)]
pub struct HookHealth {
    pub project_id: String,
    pub consecutive_failures: u32,
    pub last_failure_file: Option<String>,
    pub last_failure_reason: Option<String>,
    pub last_failure_time: Option<String>,
    pub downgraded: bool,
    pub downgrade_time: Option<String>,
    pub total_successes: u64,
    pub total_failures: u64,
}

impl HookHealth {
    /// Zeroed record for a project that has never run the hook.
    pub fn new(project_id: &str) -> Self {
        Self {
            project_id: project_id.to_string(),
            consecutive_failures: 0,
            last_failure_file: None,
            last_failure_reason: None,
            last_failure_time: None,
            downgraded: false,
            downgrade_time: None,
            total_successes: 0,
            total_failures: 0,
        }
    }

    pub fn from_row(row: &Row<'_>) -> Result<Self> {
        Ok(Self {
            project_id: row.get("project_id")?,
            consecutive_failures: row.get("consecutive_failures")?,
            last_failure_file: row.get("last_failure_file")?,
            last_failure_reason: row.get("last_failure_reason")?,
            last_failure_time: row.get("last_failure_time")?,
            downgraded: row.get::<_, i64>("downgraded")? != 0,
            downgrade_time: row.get("downgrade_time")?,
            total_successes: row.get::<_, i64>("total_successes")? as u64,
            total_failures: row.get::<_, i64>("total_failures")? as u64,
        })
    }
}

/// Severity of an enforcement event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    Warning,
    Block,
    AutoFix,
    Info,
}

impl EventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::Warning => "warning",
            EventType::Block => "block",
            EventType::AutoFix => "auto_fix",
            EventType::Info => "info",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "warning" => Some(EventType::Warning),
            "block" => Some(EventType::Block),
            "auto_fix" => Some(EventType::AutoFix),
            "info" => Some(EventType::Info),
            _ => None,
        }
    }
}

/// Immutable audit record of a warning/block/auto-fix/info occurrence.
#[derive(Debug, Clone, Serialize)]
pub struct EnforcementEvent {
    pub id: String,
    pub project_id: String,
    pub event_type: EventType,
    pub source: String,
    pub message: String,
    pub file_path: Option<String>,
    pub created_at: String,
}

impl EnforcementEvent {
    pub fn new(
        project_id: &str,
        event_type: EventType,
        source: &str,
        message: impl Into<String>,
        file_path: Option<&str>,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            project_id: project_id.to_string(),
            event_type,
            source: source.to_string(),
            message: message.into(),
            file_path: file_path.map(|s| s.to_string()),
            created_at: chrono::Utc::now().to_rfc3339(),
        }
    }

    pub fn from_row(row: &Row<'_>) -> Result<Self> {
        let raw_type: String = row.get("event_type")?;
        Ok(Self {
            id: row.get("id")?,
            project_id: row.get("project_id")?,
            // Rows are only ever written by us; anything unrecognized reads
            // back as info rather than failing the whole query.
            event_type: EventType::parse(&raw_type).unwrap_or(EventType::Info),
            source: row.get("source")?,
            message: row.get("message")?,
            file_path: row.get("file_path")?,
            created_at: row.get("created_at")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_type_roundtrip() {
        for t in [
            EventType::Warning,
            EventType::Block,
            EventType::AutoFix,
            EventType::Info,
        ] {
            assert_eq!(EventType::parse(t.as_str()), Some(t));
        }
        assert_eq!(EventType::parse("bogus"), None);
    }
}
