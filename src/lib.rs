//! docsentry library.
//!
//! Self-healing documentation-header enforcement for git commits.

pub mod cli;
pub mod config;
pub mod db;
pub mod enforce;
pub mod error;
pub mod git;
pub mod health;
pub mod hook;
pub mod ipc;
pub mod report;

pub use error::Error;
