//! SQLite state store for docsentry.
//!
//! Holds the per-project hook health record and the append-only
//! enforcement event log under `.docsentry/state.db`.

mod schema;

pub use schema::{init_db, EnforcementEvent, EventType, HookHealth};

use std::path::{Path, PathBuf};

use rusqlite::Connection;

use crate::config::Config;
use crate::error::Error;

/// Get the state database path for a project.
pub fn state_db_path(project_root: &Path) -> PathBuf {
    Config::dir(project_root).join("state.db")
}

/// Database connection wrapper.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open or create database at path.
    pub fn open(path: &Path) -> Result<Self, Error> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)?;
        init_db(&conn)?;
        Ok(Self { conn })
    }

    /// Open the state database for a project.
    pub fn open_project(project_root: &Path) -> Result<Self, Error> {
        Self::open(&state_db_path(project_root))
    }

    /// Open in-memory database for testing.
    #[allow(dead_code)]
    pub fn open_memory() -> Result<Self, Error> {
        let conn = Connection::open_in_memory()?;
        init_db(&conn)?;
        Ok(Self { conn })
    }

    // ========== Hook health ==========

    /// Get the health record for a project.
    pub fn get_health(&self, project_id: &str) -> Result<Option<HookHealth>, Error> {
        let mut stmt = self
            .conn
            .prepare("SELECT * FROM hook_health WHERE project_id = ?1")?;
        let mut rows = stmt.query([project_id])?;

        if let Some(row) = rows.next()? {
            Ok(Some(HookHealth::from_row(row)?))
        } else {
            Ok(None)
        }
    }

    /// Write the full health record as one atomic upsert.
    ///
    /// Concurrent UI reads during a commit must see either the old or the
    /// new record, never a mix.
    pub fn upsert_health(&self, health: &HookHealth) -> Result<(), Error> {
        self.conn.execute(
            r#"
            INSERT INTO hook_health (
                project_id, consecutive_failures, last_failure_file,
                last_failure_reason, last_failure_time, downgraded,
                downgrade_time, total_successes, total_failures
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            ON CONFLICT(project_id) DO UPDATE SET
                consecutive_failures = excluded.consecutive_failures,
                last_failure_file    = excluded.last_failure_file,
                last_failure_reason  = excluded.last_failure_reason,
                last_failure_time    = excluded.last_failure_time,
                downgraded           = excluded.downgraded,
                downgrade_time       = excluded.downgrade_time,
                total_successes      = excluded.total_successes,
                total_failures       = excluded.total_failures
            "#,
            rusqlite::params![
                health.project_id,
                health.consecutive_failures,
                health.last_failure_file,
                health.last_failure_reason,
                health.last_failure_time,
                health.downgraded as i64,
                health.downgrade_time,
                health.total_successes as i64,
                health.total_failures as i64,
            ],
        )?;
        Ok(())
    }

    // ========== Enforcement events ==========

    /// Append an enforcement event. Rows are immutable once written.
    pub fn insert_event(&self, event: &EnforcementEvent) -> Result<(), Error> {
        self.conn.execute(
            r#"
            INSERT INTO enforcement_events (
                id, project_id, event_type, source, message, file_path, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
            rusqlite::params![
                event.id,
                event.project_id,
                event.event_type.as_str(),
                event.source,
                event.message,
                event.file_path,
                event.created_at,
            ],
        )?;
        Ok(())
    }

    /// Get recent events for a project, newest first.
    pub fn get_events(
        &self,
        project_id: &str,
        limit: usize,
    ) -> Result<Vec<EnforcementEvent>, Error> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT * FROM enforcement_events
            WHERE project_id = ?1
            ORDER BY created_at DESC
            LIMIT ?2
            "#,
        )?;
        let rows = stmt.query_map(
            rusqlite::params![project_id, limit as i64],
            EnforcementEvent::from_row,
        )?;

        let mut events = Vec::new();
        for row in rows {
            events.push(row?);
        }
        Ok(events)
    }
}
