//! CLI commands for docsentry.

pub mod events;
pub mod health;
pub mod init;
pub mod install;
pub mod internal;
pub mod reset;
pub mod status;
pub mod uninstall;
