//! Commit-time documentation-header enforcement.

pub mod engine;
pub mod header;
pub mod runner;
pub mod validator;

pub use header::{classify, HeaderState};
pub use validator::{validate, FailureKind, FileValidationOutcome, Verdict};
