//! `eol run`, `eol batch` and `eol shell`

use std::path::Path;

use serde::Serialize;

use super::utils::{console_for_format, is_json_format, print_json};
use crate::config::ConfigReader;
use crate::console::Console;
use crate::error::{EolError, ErrorResponse, Result};
use crate::executor::create_executor;

#[derive(Serialize)]
struct RunResult {
    command: String,
    success: bool,
    output: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<ErrorResponse>,
}

/// Run one slash command built from `words`.
pub async fn handle_run_command(config: &ConfigReader, words: &[String], format: &str) -> Result<()> {
    let command = words.join(" ");
    let json = is_json_format(format)?;
    let executor = create_executor(config, console_for_format(format)?)?;

    let result = executor.handler().execute(&command).await;

    if json {
        print_json(&RunResult {
            command: command.clone(),
            success: result.is_ok(),
            output: executor.handler().console().contents(),
            error: result.as_ref().err().map(|e| e.to_error_response()),
        })?;
    }

    result.map_err(|e| EolError::CommandFailed(e.to_string()))
}

/// Run a script file; fails when any command in it failed.
pub async fn handle_batch_command(config: &ConfigReader, file: &Path, format: &str) -> Result<()> {
    let json = is_json_format(format)?;
    let executor = create_executor(config, console_for_format(format)?)?;

    let report = executor.execute_from_file(file).await?;
    if json {
        print_json(&report)?;
    }
    report.into_result().map(|_| ())
}

pub async fn handle_shell_command(config: &ConfigReader) -> Result<()> {
    let executor = create_executor(config, Console::stdout())?;
    executor.run_interactive().await?;
    Ok(())
}
