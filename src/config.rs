//! Project configuration.
//!
//! Handles loading and saving `.docsentry/config.toml`.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Project configuration stored in `.docsentry/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Which files the hook inspects.
    #[serde(default)]
    pub enforce: EnforceConfig,

    /// Auto-update (AI header generation) settings.
    #[serde(default)]
    pub auto_update: AutoUpdateConfig,

    /// Hook health / self-healing settings.
    #[serde(default)]
    pub health: HealthConfig,

    /// Hook installation behavior.
    #[serde(default)]
    pub install: InstallConfig,

    /// Internal state (not user-editable).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub internal: Option<InternalConfig>,
}

/// Which files the hook inspects.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnforceConfig {
    /// File extensions with documentation-header requirements.
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,

    /// Path prefixes to skip (relative to project root).
    #[serde(default = "default_exclude_paths")]
    pub exclude_paths: Vec<String>,
}

/// Auto-update settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AutoUpdateConfig {
    /// Unix socket of the header generation service.
    #[serde(default = "default_socket_path")]
    pub socket_path: String,

    /// Per-file generation timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Maximum bytes a rewrite may grow a file by.
    #[serde(default = "default_max_header_delta")]
    pub max_header_delta: usize,
}

/// Hook health settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthConfig {
    /// Consecutive failed commits before auto-update downgrades to warn.
    #[serde(default = "default_downgrade_threshold")]
    pub downgrade_threshold: u32,
}

/// Hook installation behavior.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstallConfig {
    /// Install hooks during `docsentry init` when git is detected.
    #[serde(default = "default_true")]
    pub auto_install: bool,
}

/// Internal state (managed by docsentry, not user).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InternalConfig {
    pub project_id: String,
    pub initialized_at: String,
}

// Default value functions
fn default_true() -> bool {
    true
}

fn default_extensions() -> Vec<String> {
    ["rs", "ts", "tsx", "js", "jsx", "py", "go"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_exclude_paths() -> Vec<String> {
    ["node_modules/", "target/", ".git/", "vendor/", "dist/"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_socket_path() -> String {
    "/tmp/docsentry_gen.sock".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_max_header_delta() -> usize {
    4096
}

fn default_downgrade_threshold() -> u32 {
    3
}

impl Default for EnforceConfig {
    fn default() -> Self {
        Self {
            extensions: default_extensions(),
            exclude_paths: default_exclude_paths(),
        }
    }
}

impl Default for AutoUpdateConfig {
    fn default() -> Self {
        Self {
            socket_path: default_socket_path(),
            timeout_secs: default_timeout_secs(),
            max_header_delta: default_max_header_delta(),
        }
    }
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            downgrade_threshold: default_downgrade_threshold(),
        }
    }
}

impl Default for InstallConfig {
    fn default() -> Self {
        Self { auto_install: true }
    }
}

impl Config {
    /// Create a config with fresh internal state for a new project.
    pub fn new_project() -> Self {
        Self {
            internal: Some(InternalConfig {
                project_id: uuid::Uuid::new_v4().to_string(),
                initialized_at: chrono::Utc::now().to_rfc3339(),
            }),
            ..Self::default()
        }
    }

    /// Get the docsentry state directory for a project.
    pub fn dir(project_root: &Path) -> PathBuf {
        project_root.join(".docsentry")
    }

    /// Get the config file path for a project.
    pub fn path(project_root: &Path) -> PathBuf {
        Self::dir(project_root).join("config.toml")
    }

    /// Load config from a project directory.
    pub fn load(project_root: &Path) -> Result<Self, Error> {
        let config_path = Self::path(project_root);
        if !config_path.exists() {
            return Err(Error::ConfigNotFound(config_path));
        }
        let content = fs::read_to_string(&config_path)?;
        let config: Config =
            toml::from_str(&content).map_err(|e| Error::ConfigParse(e.to_string()))?;
        Ok(config)
    }

    /// Load config, falling back to defaults when the project has none.
    ///
    /// The hook payload must keep working in repos where `init` was never
    /// run, so a missing or unparseable config degrades to defaults.
    pub fn load_or_default(project_root: &Path) -> Self {
        Self::load(project_root).unwrap_or_default()
    }

    /// Save config to a project directory.
    pub fn save(&self, project_root: &Path) -> Result<(), Error> {
        let config_path = Self::path(project_root);
        let content = toml::to_string(self).map_err(|e| Error::ConfigParse(e.to_string()))?;

        // Add header comment
        let with_header = format!(
            "# docsentry project configuration\n# Edit directly or re-run 'docsentry init'\n\n{}",
            content
        );

        fs::write(&config_path, with_header)?;
        Ok(())
    }

    /// Stable project identifier for health/event records.
    ///
    /// Projects without a config (hook running where `init` never ran) fall
    /// back to the root path as the identifier.
    pub fn project_id(&self, project_root: &Path) -> String {
        match &self.internal {
            Some(internal) => internal.project_id.clone(),
            None => project_root.to_string_lossy().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.enforce.extensions.contains(&"rs".to_string()));
        assert_eq!(config.auto_update.timeout_secs, 30);
        assert_eq!(config.auto_update.max_header_delta, 4096);
        assert_eq!(config.health.downgrade_threshold, 3);
        assert!(config.install.auto_install);
        assert!(config.internal.is_none());
    }

    #[test]
    fn test_save_and_load() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(Config::dir(dir.path())).unwrap();

        let config = Config::new_project();
        config.save(dir.path()).unwrap();

        let loaded = Config::load(dir.path()).unwrap();
        assert_eq!(
            loaded.project_id(dir.path()),
            config.project_id(dir.path())
        );
        assert_eq!(loaded.health.downgrade_threshold, 3);
    }

    #[test]
    fn test_load_or_default_without_config() {
        let dir = TempDir::new().unwrap();
        let config = Config::load_or_default(dir.path());
        assert!(config.internal.is_none());
        // Falls back to the root path as project id
        assert_eq!(
            config.project_id(dir.path()),
            dir.path().to_string_lossy().to_string()
        );
    }
}
