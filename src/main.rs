use clap::Parser;
use eol_tester::cli::{Cli, Commands};
use eol_tester::cli_handlers::{
    handle_batch_command, handle_config_command, handle_demo_command, handle_run_command,
    handle_shell_command,
};
use eol_tester::config::ConfigReader;
use eol_tester::error::{EolError, Result};
use eol_tester::logging::{
    cleanup_old_logs, init_logging, log_dir, retention_days, ApplicationMode, LoggingConfig,
};

#[tokio::main]
async fn main() {
    // Parse CLI arguments first to get logging configuration
    let cli = Cli::parse();

    let mode = match cli.command {
        Commands::Shell => ApplicationMode::Interactive,
        _ => ApplicationMode::Batch,
    };
    let mut log_config = if cli.quiet || cli.verbose > 0 || cli.json {
        LoggingConfig::from_args(cli.quiet, cli.verbose, cli.json)
    } else {
        LoggingConfig::for_mode(mode)
    };
    if mode == ApplicationMode::Interactive {
        log_config = log_config.with_shell_file_output();
    }
    let file_logging = log_config.file_output.is_some();

    if let Err(e) = init_logging(log_config) {
        eprintln!("Failed to initialize logging: {}", e);
        std::process::exit(1);
    }

    // Clean up rotated logs once file logging is active
    if file_logging {
        cleanup_old_logs(&log_dir(), retention_days()).ok();
    }

    if let Err(e) = run(&cli).await {
        let error_response = e.to_error_response();
        match serde_json::to_string_pretty(&error_response) {
            Ok(json) => eprintln!("{}", json),
            Err(_) => eprintln!("{}", e),
        }
        std::process::exit(1);
    }
}

async fn run(cli: &Cli) -> Result<()> {
    if let Some(path) = &cli.config {
        if !path.is_file() {
            return Err(EolError::ConfigError(format!(
                "Configuration file not found: {}",
                path.display()
            )));
        }
    }
    let config = ConfigReader::load(cli.config.as_deref());

    match cli.command.clone() {
        Commands::Run { words, format } => handle_run_command(&config, &words, &format).await?,

        Commands::Batch { file, format } => handle_batch_command(&config, &file, &format).await?,

        Commands::Demo { output, force } => handle_demo_command(&output, force)?,

        Commands::Shell => handle_shell_command(&config).await?,

        Commands::Config(config_cmd) => handle_config_command(config_cmd, &config)?,
    }

    Ok(())
}
