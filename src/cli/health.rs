//! Show hook health and self-healing state.

use crate::config::Config;
use crate::db::Database;
use crate::error::Error;
use crate::report;

/// Run the health command.
pub async fn run(json: bool) -> Result<(), Error> {
    let project_root = std::env::current_dir()?;
    let config = Config::load_or_default(&project_root);
    let db = Database::open_project(&project_root)?;
    let health = report::hook_health(&db, &config.project_id(&project_root))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&health)?);
        return Ok(());
    }

    if health.downgraded {
        println!("!! Auto-Update Disabled (Self-Healed) !!");
        println!(
            "   {} consecutive failures, last: {} ({})",
            health.consecutive_failures,
            health.last_failure_reason.as_deref().unwrap_or("unknown"),
            health.last_failure_file.as_deref().unwrap_or("unknown file"),
        );
        println!("   Run 'docsentry reset' then 'docsentry install --mode auto-update' to re-enable.");
        println!();
    }

    println!("docsentry hook health");
    println!("  consecutive failures: {}", health.consecutive_failures);
    println!("  total successes:      {}", health.total_successes);
    println!("  total failures:       {}", health.total_failures);
    println!("  downgraded:           {}", health.downgraded);
    if let Some(time) = &health.downgrade_time {
        println!("  downgraded at:        {}", time);
    }
    if let Some(reason) = &health.last_failure_reason {
        println!("  last failure:         {}", reason);
    }
    if let Some(file) = &health.last_failure_file {
        println!("  last failure file:    {}", file);
    }
    if let Some(time) = &health.last_failure_time {
        println!("  last failure time:    {}", time);
    }

    Ok(())
}
