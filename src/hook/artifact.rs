//! Hook artifact rendering and parsing.
//!
//! The installed pre-commit script is the authoritative store of the
//! current mode and version, encoded as marker lines:
//!
//! ```text
//! # docsentry:mode=auto-update
//! # docsentry:version=0.1.0
//! ```
//!
//! External tooling inspecting `.git/hooks` sees the true state; docsentry
//! itself re-reads the artifact on every status query and hook run.

use std::fs;
use std::io::Write;
use std::os::unix::fs::PermissionsExt;
use std::path::Path;

use regex::Regex;

use crate::error::Error;
use crate::hook::mode::HookMode;

/// Signature identifying an artifact as ours.
pub const SIGNATURE: &str = "docsentry:mode=";

/// Version of the runner the current binary installs.
pub const CURRENT_VERSION: &str = env!("CARGO_PKG_VERSION");

fn mode_re() -> Regex {
    Regex::new(r"(?m)^# docsentry:mode=([a-z-]+)\s*$").unwrap()
}

fn version_re() -> Regex {
    Regex::new(r"(?m)^# docsentry:version=(\S+)\s*$").unwrap()
}

/// Render a standalone pre-commit artifact owning the hook slot.
pub fn render_standalone(mode: HookMode) -> String {
    format!(
        "#!/bin/sh\n\
         # docsentry pre-commit hook (auto-installed)\n\
         # docsentry:mode={mode}\n\
         # docsentry:version={version}\n\
         \n\
         exec docsentry _internal pre-commit \"$@\"\n",
        mode = mode,
        version = CURRENT_VERSION,
    )
}

/// Render the block appended after an existing hook-manager script.
///
/// `|| exit $?` makes a blocking verdict from either script block the
/// commit (exit codes combine as logical AND).
pub fn render_chain_block(mode: HookMode) -> String {
    format!(
        "# docsentry pre-commit hook (auto-installed)\n\
         # docsentry:mode={mode}\n\
         # docsentry:version={version}\n\
         docsentry _internal pre-commit \"$@\" || exit $?\n",
        mode = mode,
        version = CURRENT_VERSION,
    )
}

/// Check whether hook content was installed by docsentry.
pub fn is_ours(content: &str) -> bool {
    content.contains(SIGNATURE)
}

/// Extract the mode marker from hook content.
pub fn parse_mode(content: &str) -> Option<HookMode> {
    let captures = mode_re().captures(content)?;
    captures[1].parse().ok()
}

/// Extract the version marker from hook content.
pub fn parse_version(content: &str) -> Option<String> {
    let captures = version_re().captures(content)?;
    Some(captures[1].to_string())
}

/// Rewrite only the mode marker line, preserving everything else.
///
/// Used by downgrade so a Husky chain around our block survives intact.
pub fn replace_mode(content: &str, mode: HookMode) -> String {
    mode_re()
        .replace(content, format!("# docsentry:mode={}", mode))
        .into_owned()
}

/// Remove the docsentry section from chained hook content.
pub fn strip_our_section(content: &str) -> String {
    content
        .lines()
        .filter(|line| !line.contains("docsentry"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Write hook content atomically and mark it executable.
///
/// Temp-file-then-rename so a crash mid-write never leaves a truncated
/// hook in the slot.
pub fn write_artifact(path: &Path, content: &str) -> Result<(), Error> {
    let parent = path.parent().ok_or_else(|| {
        Error::Io(std::io::Error::other(format!(
            "hook path has no parent: {}",
            path.display()
        )))
    })?;
    fs::create_dir_all(parent)?;

    let mut tmp = tempfile::NamedTempFile::new_in(parent)?;
    tmp.write_all(content.as_bytes())?;
    tmp.flush()?;

    let mut perms = tmp.as_file().metadata()?.permissions();
    perms.set_mode(0o755);
    tmp.as_file().set_permissions(perms)?;

    tmp.persist(path).map_err(|e| Error::Io(e.error))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_and_parse() {
        let content = render_standalone(HookMode::Block);
        assert!(is_ours(&content));
        assert_eq!(parse_mode(&content), Some(HookMode::Block));
        assert_eq!(parse_version(&content).as_deref(), Some(CURRENT_VERSION));
    }

    #[test]
    fn test_parse_foreign_content() {
        let content = "#!/bin/sh\nnpx lint-staged\n";
        assert!(!is_ours(content));
        assert_eq!(parse_mode(content), None);
        assert_eq!(parse_version(content), None);
    }

    #[test]
    fn test_replace_mode_preserves_chain() {
        let husky = "#!/bin/sh\nnpx lint-staged\n";
        let chained = format!("{}\n{}", husky, render_chain_block(HookMode::AutoUpdate));

        let downgraded = replace_mode(&chained, HookMode::Warn);
        assert_eq!(parse_mode(&downgraded), Some(HookMode::Warn));
        assert!(downgraded.contains("npx lint-staged"));
        assert!(downgraded.contains("docsentry _internal pre-commit"));
    }

    #[test]
    fn test_strip_our_section() {
        let husky = "#!/bin/sh\nnpx lint-staged";
        let chained = format!("{}\n\n{}", husky, render_chain_block(HookMode::Warn));

        let stripped = strip_our_section(&chained);
        assert!(!stripped.contains("docsentry"));
        assert!(stripped.contains("npx lint-staged"));
    }

    #[test]
    fn test_write_artifact_is_executable() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("hooks").join("pre-commit");

        write_artifact(&path, &render_standalone(HookMode::Warn)).unwrap();

        let meta = fs::metadata(&path).unwrap();
        assert_eq!(meta.permissions().mode() & 0o755, 0o755);
        assert_eq!(
            parse_mode(&fs::read_to_string(&path).unwrap()),
            Some(HookMode::Warn)
        );
    }
}
