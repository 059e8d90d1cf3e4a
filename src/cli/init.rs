//! Initialize docsentry for a project.

use std::fs;
use std::path::Path;

use tracing::{info, warn};

use crate::config::Config;
use crate::db::Database;
use crate::error::Error;
use crate::git;
use crate::hook::{installer, HookMode};

/// Run the init command.
pub async fn run(no_hooks: bool) -> Result<(), Error> {
    let project_root = std::env::current_dir()?;
    let state_dir = Config::dir(&project_root);

    if state_dir.exists() {
        println!("docsentry already initialized in this project.");
        println!("Edit .docsentry/config.toml to change settings.");
        return Ok(());
    }

    fs::create_dir_all(&state_dir)?;
    info!(path = %state_dir.display(), "Created .docsentry directory");

    // Create the state database so first hook runs don't race on schema
    Database::open_project(&project_root)?;

    add_to_gitignore(&project_root)?;

    let config = Config::new_project();
    config.save(&project_root)?;
    info!("Created config.toml");

    if !no_hooks && config.install.auto_install && git::has_git(&project_root) {
        match installer::install(&project_root, HookMode::Warn, false) {
            Ok(outcome) => {
                println!(
                    "Pre-commit hook installed in warn mode at {}.",
                    outcome.status.hook_path.display()
                );
            }
            Err(e) => {
                warn!(error = %e, "Failed to install pre-commit hook");
                println!("Warning: could not install pre-commit hook: {}", e);
            }
        }
    }

    println!("docsentry initialized.");
    println!("Run 'docsentry install --mode block' or '--mode auto-update' to enforce headers.");

    Ok(())
}

/// Add .docsentry/ to .gitignore if not already present.
fn add_to_gitignore(project_root: &Path) -> Result<(), Error> {
    let gitignore_path = project_root.join(".gitignore");

    let content = if gitignore_path.exists() {
        fs::read_to_string(&gitignore_path)?
    } else {
        String::new()
    };

    if content
        .lines()
        .any(|line| line.trim() == ".docsentry/" || line.trim() == ".docsentry")
    {
        return Ok(());
    }

    let new_content = if content.is_empty() || content.ends_with('\n') {
        format!("{}.docsentry/\n", content)
    } else {
        format!("{}\n.docsentry/\n", content)
    };

    fs::write(&gitignore_path, new_content)?;
    info!("Added .docsentry/ to .gitignore");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_add_to_gitignore() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(".gitignore"), "target/\n").unwrap();

        add_to_gitignore(dir.path()).unwrap();
        let content = fs::read_to_string(dir.path().join(".gitignore")).unwrap();
        assert_eq!(content, "target/\n.docsentry/\n");

        // Idempotent
        add_to_gitignore(dir.path()).unwrap();
        let again = fs::read_to_string(dir.path().join(".gitignore")).unwrap();
        assert_eq!(again, content);
    }
}
