//! Slash-command interpreter for direct hardware control.
//!
//! Input lines of the form `/<namespace> [<subcommand> [<args...>]]` are
//! parsed into a [`CommandInfo`], validated against the namespace allow-list
//! and dispatched by [`SlashCommandHandler`] to one of the per-instrument
//! handlers in [`handlers`].

pub mod handlers;
pub mod parser;
pub mod slash;
pub mod stop;

use std::fmt;

use serde::Serialize;

use crate::hardware::Device;

pub use parser::CommandParser;
pub use slash::{HardwareServices, SlashCommandHandler};
pub use stop::StopSignal;

/// Command namespaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CommandType {
    Robot,
    Mcu,
    #[serde(rename = "loadcell")]
    LoadCell,
    Power,
    All,
    Help,
}

impl CommandType {
    pub const ALL: [CommandType; 6] = [
        CommandType::Robot,
        CommandType::Mcu,
        CommandType::LoadCell,
        CommandType::Power,
        CommandType::All,
        CommandType::Help,
    ];

    /// Namespace prefix including the slash.
    pub fn prefix(&self) -> &'static str {
        match self {
            CommandType::Robot => "/robot",
            CommandType::Mcu => "/mcu",
            CommandType::LoadCell => "/loadcell",
            CommandType::Power => "/power",
            CommandType::All => "/all",
            CommandType::Help => "/help",
        }
    }

    /// Namespace name without the slash.
    pub fn name(&self) -> &'static str {
        &self.prefix()[1..]
    }

    /// Allowed subcommands, in display order.
    pub fn subcommands(&self) -> &'static [&'static str] {
        match self {
            CommandType::Robot => &["connect", "disconnect", "status", "init", "stop"],
            CommandType::Mcu => &["connect", "disconnect", "status", "temp", "testmode", "fan"],
            CommandType::LoadCell => &["connect", "disconnect", "status", "read", "zero", "monitor"],
            CommandType::Power => &[
                "connect",
                "disconnect",
                "status",
                "on",
                "off",
                "voltage",
                "current",
            ],
            CommandType::All => &["status"],
            CommandType::Help => &[],
        }
    }

    /// Resolve a namespace name such as `mcu` (case-insensitive, no slash).
    pub fn from_name(name: &str) -> Option<CommandType> {
        let name = name.to_lowercase();
        Self::ALL.into_iter().find(|t| t.name() == name)
    }

    /// Instrument addressed by this namespace, if any.
    pub fn device(&self) -> Option<Device> {
        match self {
            CommandType::Robot => Some(Device::Robot),
            CommandType::Mcu => Some(Device::Mcu),
            CommandType::LoadCell => Some(Device::LoadCell),
            CommandType::Power => Some(Device::Power),
            CommandType::All | CommandType::Help => None,
        }
    }
}

impl From<Device> for CommandType {
    fn from(device: Device) -> Self {
        match device {
            Device::Robot => CommandType::Robot,
            Device::Mcu => CommandType::Mcu,
            Device::LoadCell => CommandType::LoadCell,
            Device::Power => CommandType::Power,
        }
    }
}

impl fmt::Display for CommandType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.prefix())
    }
}

/// One parsed input line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommandInfo {
    pub command_type: CommandType,
    pub subcommand: Option<String>,
    pub arguments: Vec<String>,
    pub raw_input: String,
}

impl CommandInfo {
    pub fn new(command_type: CommandType, subcommand: Option<&str>, arguments: Vec<String>) -> Self {
        let raw_input = match subcommand {
            Some(sub) if arguments.is_empty() => format!("{} {}", command_type.prefix(), sub),
            Some(sub) => format!("{} {} {}", command_type.prefix(), sub, arguments.join(" ")),
            None => command_type.prefix().to_string(),
        };
        Self {
            command_type,
            subcommand: subcommand.map(str::to_string),
            arguments,
            raw_input,
        }
    }

    /// `status` request for one instrument, as issued by `/all status`.
    pub fn status_for(device: Device) -> Self {
        Self::new(CommandType::from(device), Some("status"), Vec::new())
    }

    pub fn first_argument(&self) -> Option<&str> {
        self.arguments.first().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_name_is_case_insensitive() {
        assert_eq!(CommandType::from_name("MCU"), Some(CommandType::Mcu));
        assert_eq!(
            CommandType::from_name("loadcell"),
            Some(CommandType::LoadCell)
        );
        assert_eq!(CommandType::from_name("/robot"), None);
        assert_eq!(CommandType::from_name("scope"), None);
    }

    #[test]
    fn test_device_namespaces_round_trip() {
        for device in Device::ALL {
            let ct = CommandType::from(device);
            assert_eq!(ct.device(), Some(device));
            assert_eq!(ct.name(), device.key());
        }
        assert_eq!(CommandType::All.device(), None);
        assert_eq!(CommandType::Help.device(), None);
    }

    #[test]
    fn test_status_for_builds_raw_input() {
        let info = CommandInfo::status_for(Device::Power);
        assert_eq!(info.command_type, CommandType::Power);
        assert_eq!(info.subcommand.as_deref(), Some("status"));
        assert!(info.arguments.is_empty());
        assert_eq!(info.raw_input, "/power status");
    }
}
