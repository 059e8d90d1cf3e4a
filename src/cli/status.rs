//! Show hook installation status.

use crate::error::Error;
use crate::report;

/// Run the status command.
pub async fn run(json: bool) -> Result<(), Error> {
    let project_root = std::env::current_dir()?;
    let status = report::hook_status(&project_root);

    if json {
        println!("{}", serde_json::to_string_pretty(&status)?);
        return Ok(());
    }

    let mode = status
        .mode
        .map(|m| m.to_string())
        .unwrap_or_else(|| "none".to_string());

    println!("docsentry hook status");
    println!("  git repo:   {}", status.has_git);
    println!("  installed:  {}", status.installed);
    println!("  mode:       {}", mode);
    println!("  hook path:  {}", status.hook_path.display());
    if status.has_husky {
        println!("  husky:      detected (chained)");
    }
    if let Some(version) = &status.version {
        println!("  version:    {}", version);
    }
    if status.outdated {
        println!(
            "  outdated:   installed hook is {}, current is {}; re-run 'docsentry install'",
            status.version.as_deref().unwrap_or("unknown"),
            status.current_version
        );
    }

    Ok(())
}
