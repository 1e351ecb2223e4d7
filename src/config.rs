//! Station configuration
//!
//! Reads the JSON configuration document used by the slash commands. A
//! built-in default document is always present; the first configuration file
//! found on the search path is deep-merged over it.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::error::{EolError, Result};
use crate::hardware::mock::MockTiming;
use crate::hardware::Device;

/// Environment variable naming an explicit configuration file.
pub const CONFIG_ENV_VAR: &str = "EOL_CONFIG";

/// File names probed in `./configuration/` and the working directory.
const CONFIG_FILENAMES: &[&str] = &["cli_config.json", "cli_commands.json"];

const DEFAULT_MONITOR_REFRESH_SECS: f64 = 0.5;

fn default_document() -> Value {
    json!({
        "cli_config": {
            "hardware_mode": "mock",
            "mock": {
                "connect_delay_ms": 200,
                "response_delay_ms": 20
            },
            "commands": {
                "robot": {
                    "connection": { "axis_id": 0, "irq_no": 7 },
                    "defaults": {
                        "velocity": 200.0,
                        "acceleration": 1000.0,
                        "deceleration": 1000.0
                    }
                },
                "mcu": {
                    "connection": {
                        "port": "/dev/ttyUSB1",
                        "baudrate": 115200,
                        "timeout": 2.0,
                        "bytesize": 8,
                        "stopbits": 1,
                        "parity": null
                    },
                    "defaults": {
                        "temperature_range": [20.0, 100.0],
                        "fan_speed_range": [0, 100]
                    }
                },
                "loadcell": {
                    "connection": {
                        "port": "/dev/ttyUSB0",
                        "baudrate": 9600,
                        "timeout": 1.0,
                        "bytesize": 8,
                        "stopbits": 1,
                        "parity": "even",
                        "indicator_id": 1
                    },
                    "defaults": {
                        "force_range": [-1000.0, 1000.0],
                        "calibration_timeout": 10.0,
                        "monitor_refresh_rate": DEFAULT_MONITOR_REFRESH_SECS
                    }
                },
                "power": {
                    "connection": {
                        "host": "192.168.1.100",
                        "port": 5025,
                        "timeout": 5.0,
                        "channel": 1
                    },
                    "defaults": {
                        "voltage_range": [0.0, 30.0],
                        "current_limit_range": [0.0, 5.0],
                        "output_enabled": false
                    }
                }
            },
            "preferences": {
                "auto_connect": false,
                "show_progress": true,
                "verbose_errors": true,
                "confirmation_required": true,
                "retry_attempts": 3,
                "command_timeout": 30.0
            },
            "display": {
                "refresh_rate": 2.0,
                "decimal_precision": 3,
                "show_timestamps": true,
                "color_theme": "default"
            }
        }
    })
}

/// Overwrite `base` with `overlay`, recursing into objects present in both.
fn deep_merge(base: &mut Value, overlay: Value) {
    match (base, overlay) {
        (Value::Object(base_map), Value::Object(overlay_map)) => {
            for (key, value) in overlay_map {
                match base_map.get_mut(&key) {
                    Some(existing) if existing.is_object() && value.is_object() => {
                        deep_merge(existing, value)
                    },
                    _ => {
                        base_map.insert(key, value);
                    },
                }
            }
        },
        (base, overlay) => *base = overlay,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HardwareMode {
    Mock,
    Real,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Preferences {
    pub auto_connect: bool,
    pub show_progress: bool,
    pub verbose_errors: bool,
    pub confirmation_required: bool,
    pub retry_attempts: u32,
    pub command_timeout: f64,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            auto_connect: false,
            show_progress: true,
            verbose_errors: true,
            confirmation_required: true,
            retry_attempts: 3,
            command_timeout: 30.0,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ConfigSummary {
    pub loaded_from: String,
    pub hardware_mode: HardwareMode,
    pub supported_commands: Vec<&'static str>,
    pub configured_commands: Vec<&'static str>,
    pub preferences: Preferences,
}

#[derive(Debug, Clone)]
pub struct ConfigReader {
    explicit_path: Option<PathBuf>,
    data: Value,
    loaded_from: Option<PathBuf>,
}

impl ConfigReader {
    /// Built-in defaults only; no file is read.
    pub fn defaults() -> Self {
        Self {
            explicit_path: None,
            data: default_document(),
            loaded_from: None,
        }
    }

    /// Defaults with `overlay` merged on top.
    pub fn from_value(overlay: Value) -> Self {
        let mut reader = Self::defaults();
        deep_merge(&mut reader.data, overlay);
        reader
    }

    /// Search the standard locations (after `explicit_path`, if any) and merge
    /// the first readable file over the defaults.
    ///
    /// Never fails: unreadable files are logged and skipped.
    pub fn load(explicit_path: Option<&Path>) -> Self {
        let mut reader = Self {
            explicit_path: explicit_path.map(Path::to_path_buf),
            ..Self::defaults()
        };
        reader.load_from_search_path();
        reader
    }

    fn search_paths(&self) -> Vec<PathBuf> {
        let mut paths = Vec::new();
        if let Some(path) = &self.explicit_path {
            paths.push(path.clone());
        }
        if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
            if !path.is_empty() {
                paths.push(PathBuf::from(path));
            }
        }
        if let Ok(cwd) = std::env::current_dir() {
            for name in CONFIG_FILENAMES {
                paths.push(cwd.join("configuration").join(name));
                paths.push(cwd.join(name));
            }
        }
        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(".eol-tester").join("cli_config.json"));
        }
        paths
    }

    fn load_from_search_path(&mut self) {
        for path in self.search_paths() {
            if !path.is_file() {
                continue;
            }
            match read_config_file(&path) {
                Ok(overlay) => {
                    deep_merge(&mut self.data, overlay);
                    tracing::info!("Loaded CLI configuration from {}", path.display());
                    self.loaded_from = Some(path);
                    return;
                },
                Err(e) => {
                    tracing::warn!("Failed to load config from {}: {}", path.display(), e);
                },
            }
        }
        tracing::debug!("No CLI configuration file found, using defaults");
    }

    /// Re-read configuration, optionally from a new explicit path.
    pub fn reload(&mut self, explicit_path: Option<&Path>) {
        if let Some(path) = explicit_path {
            self.explicit_path = Some(path.to_path_buf());
        }
        self.data = default_document();
        self.loaded_from = None;
        self.load_from_search_path();
        tracing::info!("CLI configuration reloaded");
    }

    pub fn loaded_from(&self) -> Option<&Path> {
        self.loaded_from.as_deref()
    }

    /// Look up a value by dotted path, e.g. `cli_config.preferences.auto_connect`.
    pub fn get(&self, path: &str) -> Option<&Value> {
        path.split('.')
            .try_fold(&self.data, |current, key| current.get(key))
    }

    fn command_section(&self, device: Device, section: &str) -> Option<&Value> {
        self.get(&format!("cli_config.commands.{}.{}", device.key(), section))
    }

    /// Typed connection parameters for `device`.
    pub fn connection_params<T: DeserializeOwned>(&self, device: Device) -> Result<T> {
        let section = self.command_section(device, "connection").ok_or_else(|| {
            EolError::ConfigError(format!("missing connection section for {}", device.key()))
        })?;
        serde_json::from_value(section.clone()).map_err(|e| {
            EolError::ConfigError(format!("invalid {} connection parameters: {}", device.key(), e))
        })
    }

    pub fn command_defaults(&self, device: Device) -> Option<&Value> {
        self.command_section(device, "defaults")
    }

    /// A `[min, max]` pair from the device defaults.
    pub fn range(&self, device: Device, key: &str) -> Option<(f64, f64)> {
        let pair = self.command_defaults(device)?.get(key)?.as_array()?;
        match pair.as_slice() {
            [min, max] => {
                let (min, max) = (min.as_f64()?, max.as_f64()?);
                (min <= max).then_some((min, max))
            },
            _ => None,
        }
    }

    fn monitor_refresh_setting(&self) -> Option<&Value> {
        self.command_defaults(Device::LoadCell)
            .and_then(|d| d.get("monitor_refresh_rate"))
    }

    /// Polling interval of `/loadcell monitor`.
    ///
    /// Values that are not a representable non-negative number of seconds
    /// fall back to the default.
    pub fn monitor_refresh_rate(&self) -> Duration {
        let default = Duration::from_secs_f64(DEFAULT_MONITOR_REFRESH_SECS);
        match self.monitor_refresh_setting() {
            None => default,
            Some(value) => parse_refresh_rate(value).unwrap_or_else(|| {
                tracing::warn!(
                    "Invalid monitor_refresh_rate {}, using {}s",
                    value,
                    DEFAULT_MONITOR_REFRESH_SECS
                );
                default
            }),
        }
    }

    /// Simulated latencies of the mock instruments.
    pub fn mock_timing(&self) -> MockTiming {
        let millis = |key: &str| {
            self.get(&format!("cli_config.mock.{}", key))
                .and_then(Value::as_u64)
                .map(Duration::from_millis)
        };
        let defaults = MockTiming::default();
        MockTiming {
            connect_delay: millis("connect_delay_ms").unwrap_or(defaults.connect_delay),
            response_delay: millis("response_delay_ms").unwrap_or(defaults.response_delay),
        }
    }

    pub fn hardware_mode_name(&self) -> String {
        self.get("cli_config.hardware_mode")
            .and_then(Value::as_str)
            .unwrap_or("mock")
            .to_lowercase()
    }

    pub fn hardware_mode(&self) -> Result<HardwareMode> {
        match self.hardware_mode_name().as_str() {
            "mock" => Ok(HardwareMode::Mock),
            "real" => Ok(HardwareMode::Real),
            other => Err(EolError::ConfigError(format!(
                "unknown hardware_mode '{}' (expected 'mock' or 'real')",
                other
            ))),
        }
    }

    pub fn preferences(&self) -> Preferences {
        self.get("cli_config.preferences")
            .and_then(|v| serde_json::from_value(v.clone()).ok())
            .unwrap_or_default()
    }

    pub fn has_command_config(&self, device: Device) -> bool {
        self.get(&format!("cli_config.commands.{}", device.key()))
            .is_some_and(|v| !v.is_null())
    }

    /// Check the document structure.
    ///
    /// Returns the list of problems found; an empty list means the
    /// configuration is usable.
    pub fn validate(&self) -> Vec<String> {
        let mut problems = Vec::new();

        if !self.get("cli_config").is_some_and(Value::is_object) {
            problems.push("Missing 'cli_config' section".to_string());
            return problems;
        }
        if !self.get("cli_config.commands").is_some_and(Value::is_object) {
            problems.push("Missing 'commands' section".to_string());
            return problems;
        }
        if let Err(e) = self.hardware_mode() {
            problems.push(e.to_string());
        }
        if let Some(value) = self.monitor_refresh_setting() {
            if parse_refresh_rate(value).is_none() {
                problems.push(format!(
                    "Invalid loadcell monitor_refresh_rate: {} (expected seconds)",
                    value
                ));
            }
        }

        for device in Device::ALL {
            if !self.has_command_config(device) {
                problems.push(format!("Missing configuration for command: {}", device.key()));
                continue;
            }
            let parsed = match device {
                Device::Robot => self
                    .connection_params::<crate::hardware::RobotConnection>(device)
                    .map(|_| ()),
                Device::Mcu | Device::LoadCell => self
                    .connection_params::<crate::hardware::SerialConnection>(device)
                    .map(|_| ()),
                Device::Power => self
                    .connection_params::<crate::hardware::PowerConnection>(device)
                    .map(|_| ()),
            };
            if let Err(e) = parsed {
                problems.push(e.to_string());
            }
        }

        problems
    }

    pub fn summary(&self) -> ConfigSummary {
        ConfigSummary {
            loaded_from: self
                .loaded_from
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "defaults".to_string()),
            hardware_mode: self.hardware_mode().unwrap_or(HardwareMode::Mock),
            supported_commands: Device::ALL.iter().map(Device::key).collect(),
            configured_commands: Device::ALL
                .iter()
                .filter(|d| self.has_command_config(**d))
                .map(Device::key)
                .collect(),
            preferences: self.preferences(),
        }
    }
}

impl Default for ConfigReader {
    fn default() -> Self {
        Self::defaults()
    }
}

fn parse_refresh_rate(value: &Value) -> Option<Duration> {
    value
        .as_f64()
        .and_then(|secs| Duration::try_from_secs_f64(secs).ok())
}

fn read_config_file(path: &Path) -> Result<Value> {
    let content = std::fs::read_to_string(path)?;
    let value: Value = serde_json::from_str(&content)?;
    if !value.is_object() {
        return Err(EolError::ConfigError(format!(
            "{} does not contain a JSON object",
            path.display()
        )));
    }
    Ok(value)
}
