//! Per-instrument command handlers.
//!
//! Each handler owns one hardware service client and maps the subcommands of
//! its namespace onto service calls through a static command table.

pub mod loadcell;
pub mod mcu;
pub mod power;
pub mod robot;

use std::future::Future;

use serde::de::DeserializeOwned;

use super::CommandInfo;
use crate::config::ConfigReader;
use crate::console::Console;
use crate::error::{ArgumentError, CommandError, CommandResult};
use crate::hardware::Device;

pub use loadcell::LoadCellCommandHandler;
pub use mcu::McuCommandHandler;
pub use power::PowerCommandHandler;
pub use robot::RobotCommandHandler;

/// One row of a handler's command table.
#[derive(Debug, Clone, Copy)]
pub struct CommandSpec<Op: 'static> {
    pub name: &'static str,
    pub op: Op,
    pub description: &'static str,
}

/// Find the operation bound to the command's subcommand.
pub fn lookup<Op: Copy>(table: &[CommandSpec<Op>], info: &CommandInfo) -> CommandResult<Op> {
    let subcommand = info.subcommand.as_deref();
    table
        .iter()
        .find(|spec| Some(spec.name) == subcommand)
        .map(|spec| spec.op)
        .ok_or_else(|| CommandError::Validation {
            input: info.raw_input.clone(),
        })
}

fn help_from_table<Op>(table: &[CommandSpec<Op>]) -> Vec<(&'static str, &'static str)> {
    table
        .iter()
        .map(|spec| (spec.name, spec.description))
        .collect()
}

pub trait HardwareCommandHandler {
    fn device(&self) -> Device;

    fn console(&self) -> &Console;

    /// `(subcommand, one-line description)` in display order.
    fn get_help_info(&self) -> Vec<(&'static str, &'static str)>;

    /// Run the command without rendering failures.
    fn execute(&self, info: &CommandInfo) -> impl Future<Output = CommandResult<()>>;

    /// Run the command; failures are logged and rendered before being returned.
    fn dispatch(&self, info: &CommandInfo) -> impl Future<Output = CommandResult<()>> {
        async move {
            let result = self.execute(info).await;
            if let Err(e) = &result {
                report_failure(self.console(), info, e);
            }
            result
        }
    }

    /// `true` on success. Never propagates a failure.
    fn handle_command(&self, info: &CommandInfo) -> impl Future<Output = bool> {
        async move { self.dispatch(info).await.is_ok() }
    }
}

/// Log a failed command and show it to the operator.
pub fn report_failure(console: &Console, info: &CommandInfo, error: &CommandError) {
    crate::log_command_error!(error, info.raw_input);
    match error {
        CommandError::Argument(ArgumentError::Missing { .. }) => console.warning(&error.to_string()),
        _ => console.error(&error.to_string()),
    }
}

/// Connection parameters from `config`, or `fallback` when the reader is
/// absent or cannot provide them.
pub(crate) fn resolve_connection<T: DeserializeOwned>(
    config: Option<&ConfigReader>,
    device: Device,
    fallback: impl FnOnce() -> T,
) -> T {
    match config.map(|c| c.connection_params::<T>(device)) {
        Some(Ok(params)) => params,
        Some(Err(e)) => {
            tracing::warn!("Failed to load {} config, using defaults: {}", device, e);
            fallback()
        },
        None => fallback(),
    }
}

/// Inclusive bounds for a numeric argument.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Limit {
    pub name: &'static str,
    pub min: f64,
    pub max: f64,
    pub unit: &'static str,
}

impl Limit {
    /// Bounds from the `key` range of the device defaults, else `default`.
    pub(crate) fn resolve(
        config: Option<&ConfigReader>,
        device: Device,
        key: &str,
        name: &'static str,
        default: (f64, f64),
        unit: &'static str,
    ) -> Self {
        let (min, max) = config
            .and_then(|c| c.range(device, key))
            .unwrap_or(default);
        Self {
            name,
            min,
            max,
            unit,
        }
    }

    pub fn check(&self, value: f64) -> Result<f64, ArgumentError> {
        if (self.min..=self.max).contains(&value) {
            Ok(value)
        } else {
            Err(ArgumentError::OutOfRange {
                name: self.name,
                value,
                min: self.min,
                max: self.max,
                unit: self.unit,
            })
        }
    }

    /// Parse `text` as a finite number and check it against the bounds.
    pub fn parse(&self, text: &str) -> Result<f64, ArgumentError> {
        let value = parse_number(&self.name.to_lowercase(), text)?;
        self.check(value)
    }
}

pub(crate) fn parse_number(name: &str, text: &str) -> Result<f64, ArgumentError> {
    text.trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| ArgumentError::InvalidNumber {
            name: name.to_string(),
            value: text.to_string(),
        })
}

pub(crate) fn connection_state(connected: bool) -> &'static str {
    if connected {
        "CONNECTED"
    } else {
        "DISCONNECTED"
    }
}

/// Leading rows of every status block.
pub(crate) fn base_status_details(connected: bool, hardware_type: &str) -> Vec<(String, String)> {
    vec![
        (
            "Connection".to_string(),
            if connected { "Connected" } else { "Disconnected" }.to_string(),
        ),
        ("Type".to_string(), hardware_type.to_string()),
    ]
}
