use std::io::IsTerminal;
use std::path::Path;

use dialoguer::{theme::ColorfulTheme, Confirm};

use crate::error::{EolError, Result};
use crate::executor::create_demo_script;

/// Write the demo script to `output`.
///
/// An existing file is only replaced with `--force` or after confirmation on
/// an interactive terminal.
pub fn handle_demo_command(output: &Path, force: bool) -> Result<()> {
    if output.exists() && !force {
        if !std::io::stdin().is_terminal() {
            return Err(EolError::InvalidInput(format!(
                "{} already exists (use --force to overwrite)",
                output.display()
            )));
        }

        let overwrite = Confirm::with_theme(&ColorfulTheme::default())
            .with_prompt(format!("{} already exists. Overwrite?", output.display()))
            .default(false)
            .interact()
            .map_err(|e| EolError::InvalidInput(format!("Confirmation failed: {}", e)))?;
        if !overwrite {
            println!("○ Kept existing {}", output.display());
            return Ok(());
        }
    }

    create_demo_script(output)?;
    println!("✓ Demo script created: {}", output.display());
    println!("  Run it with: eol batch {}", output.display());
    Ok(())
}
