//! Utility functions for CLI handlers

use serde::Serialize;

use crate::console::Console;
use crate::error::{EolError, Result};

/// Check a `--format` value.
pub fn is_json_format(format: &str) -> Result<bool> {
    match format {
        "json" => Ok(true),
        "text" => Ok(false),
        other => Err(EolError::InvalidInput(format!(
            "Unknown format '{}' (expected 'text' or 'json')",
            other
        ))),
    }
}

/// Console for a command's output: stdout for text, an in-memory buffer for
/// JSON so that stdout carries only the JSON document.
pub fn console_for_format(format: &str) -> Result<Console> {
    Ok(if is_json_format(format)? {
        Console::buffered()
    } else {
        Console::stdout()
    })
}

pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
