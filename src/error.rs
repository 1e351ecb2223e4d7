use serde::Serialize;
use thiserror::Error;

use crate::hardware::{Device, HardwareError};

#[derive(Error, Debug)]
pub enum EolError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Unsupported hardware mode '{0}': only 'mock' services are available in this build")]
    UnsupportedHardwareMode(String),

    #[error("Command failed: {0}")]
    CommandFailed(String),

    #[error("{failed} of {total} batch commands failed")]
    BatchFailed { failed: usize, total: usize },
}

#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

impl EolError {
    pub fn to_error_code(&self) -> &'static str {
        match self {
            EolError::ConfigError(_) => "CONFIG_ERROR",
            EolError::InvalidInput(_) => "INVALID_INPUT",
            EolError::UnsupportedHardwareMode(_) => "UNSUPPORTED_HARDWARE_MODE",
            EolError::CommandFailed(_) => "COMMAND_FAILED",
            EolError::BatchFailed { .. } => "BATCH_FAILED",
            _ => "INTERNAL_ERROR",
        }
    }

    pub fn to_error_response(&self) -> ErrorResponse {
        ErrorResponse {
            error: self.to_string(),
            code: self.to_error_code().to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, EolError>;

/// Failure of a single slash command.
///
/// Every variant is rendered to the console and logged by the handler that
/// produced it; none of them terminates the session.
#[derive(Error, Debug)]
pub enum CommandError {
    #[error("Invalid command format. Type '/help' for available commands.")]
    Parse { input: String },

    #[error("Invalid command: {input}")]
    Validation { input: String },

    #[error(transparent)]
    Argument(#[from] ArgumentError),

    #[error("{action} failed: {source}")]
    Hardware {
        device: Device,
        action: &'static str,
        #[source]
        source: HardwareError,
    },
}

impl CommandError {
    pub fn hardware(device: Device, action: &'static str, source: HardwareError) -> Self {
        CommandError::Hardware {
            device,
            action,
            source,
        }
    }

    pub fn to_error_code(&self) -> &'static str {
        match self {
            CommandError::Parse { .. } => "PARSE_ERROR",
            CommandError::Validation { .. } => "VALIDATION_ERROR",
            CommandError::Argument(_) => "ARGUMENT_ERROR",
            CommandError::Hardware { .. } => "HARDWARE_ERROR",
        }
    }

    pub fn to_error_response(&self) -> ErrorResponse {
        ErrorResponse {
            error: self.to_string(),
            code: self.to_error_code().to_string(),
        }
    }
}

/// Problems with the arguments of an otherwise valid command.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ArgumentError {
    #[error("{usage}")]
    Missing { usage: &'static str },

    #[error("Invalid {name} value: {value}")]
    InvalidNumber { name: String, value: String },

    #[error("{name} must be between {min}-{max}{unit}, got {value}")]
    OutOfRange {
        name: &'static str,
        value: f64,
        min: f64,
        max: f64,
        unit: &'static str,
    },
}

pub type CommandResult<T> = std::result::Result<T, CommandError>;
