//! Install or update the pre-commit hook.

use crate::config::Config;
use crate::db::{Database, EnforcementEvent, EventType};
use crate::error::Error;
use crate::hook::{installer, HookMode};

/// Run the install command.
pub async fn run(mode: HookMode, force: bool) -> Result<(), Error> {
    let project_root = std::env::current_dir()?;

    let outcome = installer::install(&project_root, mode, force)?;

    if outcome.replaced_external {
        println!("Replaced pre-existing pre-commit hook.");
        // Audit the replacement; a store failure shouldn't undo a
        // successful install.
        match Database::open_project(&project_root) {
            Ok(db) => {
                let config = Config::load_or_default(&project_root);
                let event = EnforcementEvent::new(
                    &config.project_id(&project_root),
                    EventType::Info,
                    "installer",
                    "Replaced an unrelated pre-commit hook (--force)",
                    Some(&outcome.status.hook_path.to_string_lossy()),
                );
                if let Err(e) = db.insert_event(&event) {
                    eprintln!("docsentry: warning: failed to record event: {}", e);
                }
            }
            Err(e) => {
                eprintln!("docsentry: warning: state store unavailable: {}", e);
            }
        }
    }

    println!(
        "Pre-commit hook installed in {} mode at {}.",
        mode,
        outcome.status.hook_path.display()
    );
    if outcome.status.has_husky {
        println!("Husky detected: chained after the existing script.");
    }
    if mode == HookMode::AutoUpdate {
        println!("Auto-update enabled. Run 'docsentry health' to monitor self-healing state.");
    }

    Ok(())
}
