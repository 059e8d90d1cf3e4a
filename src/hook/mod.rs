//! Pre-commit hook artifact management.

pub mod artifact;
pub mod installer;
pub mod mode;

pub use installer::{install, uninstall, InstallOutcome};
pub use mode::{detect, Detection, HookMode};
