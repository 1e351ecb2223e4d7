use crate::cli::ConfigCommands;
use crate::config::ConfigReader;
use crate::error::{EolError, Result};

use super::utils::{is_json_format, print_json};

/// Handle all `eol config` subcommands
pub fn handle_config_command(cmd: ConfigCommands, config: &ConfigReader) -> Result<()> {
    match cmd {
        ConfigCommands::Show { format } => handle_show(config, &format),
        ConfigCommands::Validate => handle_validate(config),
    }
}

fn handle_show(config: &ConfigReader, format: &str) -> Result<()> {
    let summary = config.summary();

    if is_json_format(format)? {
        return print_json(&summary);
    }

    println!("Configuration: {}", summary.loaded_from);
    println!("Hardware mode: {}", config.hardware_mode_name());
    println!("Supported commands: {}", summary.supported_commands.join(", "));
    println!(
        "Configured commands: {}",
        summary.configured_commands.join(", ")
    );
    println!("Monitor refresh: {:.3}s", config.monitor_refresh_rate().as_secs_f64());
    println!("Preferences:");
    let prefs = &summary.preferences;
    println!("  auto_connect: {}", prefs.auto_connect);
    println!("  show_progress: {}", prefs.show_progress);
    println!("  verbose_errors: {}", prefs.verbose_errors);
    println!("  confirmation_required: {}", prefs.confirmation_required);
    println!("  retry_attempts: {}", prefs.retry_attempts);
    println!("  command_timeout: {}s", prefs.command_timeout);
    Ok(())
}

fn handle_validate(config: &ConfigReader) -> Result<()> {
    let problems = config.validate();
    let source = config
        .loaded_from()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "defaults".to_string());

    if problems.is_empty() {
        println!("✓ Configuration is valid ({})", source);
        return Ok(());
    }

    for problem in &problems {
        println!("✗ {}", problem);
    }
    Err(EolError::ConfigError(format!(
        "{} problem(s) found in {}",
        problems.len(),
        source
    )))
}
