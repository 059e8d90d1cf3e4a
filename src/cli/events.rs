//! Show recent enforcement events.

use crate::config::Config;
use crate::db::Database;
use crate::error::Error;
use crate::report;

/// Run the events command.
pub async fn run(limit: usize, json: bool) -> Result<(), Error> {
    let project_root = std::env::current_dir()?;
    let config = Config::load_or_default(&project_root);
    let db = Database::open_project(&project_root)?;

    let events = report::enforcement_events(&db, &config.project_id(&project_root), limit)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&events)?);
        return Ok(());
    }

    if events.is_empty() {
        println!("No enforcement events recorded.");
        return Ok(());
    }

    for event in &events {
        let file = event.file_path.as_deref().unwrap_or("-");
        println!(
            "{}  [{}]  {}  {}",
            event.created_at,
            event.event_type.as_str(),
            file,
            event.message
        );
    }

    Ok(())
}
