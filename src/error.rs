//! Error types for docsentry.

use std::path::PathBuf;

use thiserror::Error;

/// Top-level error type.
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IPC error: {0}")]
    Ipc(String),

    #[error("config not found: {0}")]
    ConfigNotFound(PathBuf),

    #[error("config parse error: {0}")]
    ConfigParse(String),

    #[error("git error: {0}")]
    Git(String),

    #[error(transparent)]
    Install(#[from] InstallError),

    #[error(transparent)]
    Generation(#[from] GenerationError),
}

/// Hook installation failures.
///
/// Surfaced synchronously and typed; a failed install performs no partial
/// write to the hook slot.
#[derive(Error, Debug)]
pub enum InstallError {
    #[error("not a git repository (no .git directory)")]
    NoGitRepo,

    #[error("permission denied writing {0}")]
    PermissionDenied(PathBuf),

    #[error("unrelated pre-commit hook present at {0}, pass --force to replace it")]
    UnrelatedHookPresent(PathBuf),
}

/// Header generation failures from the IPC collaborator.
///
/// The enforcement runner treats every variant like a validation failure:
/// the file is left untouched and the failure is recorded.
#[derive(Error, Debug)]
pub enum GenerationError {
    #[error("header generation timed out after {0}s")]
    Timeout(u64),

    #[error("header generation service unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("header generation returned an empty header")]
    EmptyResponse,

    #[error("header generation RPC error: {0}")]
    Rpc(String),
}
