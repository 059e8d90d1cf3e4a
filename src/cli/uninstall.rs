//! Remove the pre-commit hook.

use crate::error::Error;
use crate::hook::installer;

/// Run the uninstall command.
pub async fn run() -> Result<(), Error> {
    let project_root = std::env::current_dir()?;
    installer::uninstall(&project_root)?;
    println!("Pre-commit hook removed.");
    Ok(())
}
