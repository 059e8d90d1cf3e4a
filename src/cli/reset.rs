//! Reset hook health after a downgrade.

use crate::config::Config;
use crate::db::Database;
use crate::error::Error;
use crate::health;

/// Run the reset command.
pub async fn run() -> Result<(), Error> {
    let project_root = std::env::current_dir()?;
    let config = Config::load_or_default(&project_root);
    let db = Database::open_project(&project_root)?;

    let record = health::reset(&db, &config.project_id(&project_root))?;

    println!("Hook health reset: failure streak cleared.");
    println!(
        "Totals kept: {} successes, {} failures.",
        record.total_successes, record.total_failures
    );
    println!("The hook mode was not changed. To re-enable auto-update:");
    println!("  docsentry install --mode auto-update");

    Ok(())
}
