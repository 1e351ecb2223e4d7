//! Hardware service abstractions for the test station instruments.
//!
//! These traits define the async interface each instrument driver exposes to
//! the command handlers. Vendor drivers live outside this crate; the `mock`
//! module provides simulated implementations of every trait.

pub mod mock;

use std::fmt;
use std::future::Future;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Instruments attached to the station.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Device {
    Robot,
    Mcu,
    #[serde(rename = "loadcell")]
    LoadCell,
    Power,
}

impl Device {
    pub const ALL: [Device; 4] = [Device::Robot, Device::Mcu, Device::LoadCell, Device::Power];

    /// Key used in configuration documents and command namespaces.
    pub fn key(&self) -> &'static str {
        match self {
            Device::Robot => "robot",
            Device::Mcu => "mcu",
            Device::LoadCell => "loadcell",
            Device::Power => "power",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Device::Robot => "Robot",
            Device::Mcu => "MCU",
            Device::LoadCell => "LoadCell",
            Device::Power => "Power supply",
        }
    }
}

impl fmt::Display for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum HardwareError {
    #[error("{0} is not connected")]
    NotConnected(Device),

    #[error("{device} connection error: {reason}")]
    Connection { device: Device, reason: String },

    #[error("{device} operation error: {reason}")]
    Operation { device: Device, reason: String },
}

pub type HwResult<T> = std::result::Result<T, HardwareError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MotionStatus {
    Idle,
    Homing,
    EmergencyStop,
}

impl MotionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MotionStatus::Idle => "idle",
            MotionStatus::Homing => "homing",
            MotionStatus::EmergencyStop => "emergency_stop",
        }
    }
}

/// MCU operating modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TestMode {
    Mode1 = 1,
}

// ── Connection parameters ───────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RobotConnection {
    pub axis_id: u32,
    pub irq_no: u32,
}

impl Default for RobotConnection {
    fn default() -> Self {
        Self {
            axis_id: 0,
            irq_no: 7,
        }
    }
}

/// RS-232 parameters shared by the MCU and the load-cell indicator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SerialConnection {
    pub port: String,
    pub baudrate: u32,
    /// Seconds
    pub timeout: f64,
    pub bytesize: u8,
    pub stopbits: u8,
    pub parity: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub indicator_id: Option<u32>,
}

impl SerialConnection {
    pub fn mcu_default() -> Self {
        Self {
            port: "/dev/ttyUSB1".to_string(),
            baudrate: 115_200,
            timeout: 2.0,
            bytesize: 8,
            stopbits: 1,
            parity: None,
            indicator_id: None,
        }
    }

    pub fn loadcell_default() -> Self {
        Self {
            port: "/dev/ttyUSB0".to_string(),
            baudrate: 9600,
            timeout: 1.0,
            bytesize: 8,
            stopbits: 1,
            parity: Some("even".to_string()),
            indicator_id: Some(1),
        }
    }
}

impl Default for SerialConnection {
    fn default() -> Self {
        Self::mcu_default()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PowerConnection {
    pub host: String,
    pub port: u16,
    /// Seconds
    pub timeout: f64,
    pub channel: u32,
}

impl Default for PowerConnection {
    fn default() -> Self {
        Self {
            host: "192.168.1.100".to_string(),
            port: 5025,
            timeout: 5.0,
            channel: 1,
        }
    }
}

// ── Service traits ──────────────────────────────────────────────────

/// Motion controller.
pub trait RobotService: Send + Sync {
    fn connect(&self, params: &RobotConnection) -> impl Future<Output = HwResult<()>> + Send;

    fn disconnect(&self) -> impl Future<Output = HwResult<()>> + Send;

    fn is_connected(&self) -> impl Future<Output = HwResult<bool>> + Send;

    fn get_motion_status(&self) -> impl Future<Output = HwResult<MotionStatus>> + Send;

    fn get_primary_axis_id(&self) -> impl Future<Output = HwResult<u32>> + Send;

    fn home_axis(&self, axis: u32) -> impl Future<Output = HwResult<()>> + Send;

    fn emergency_stop(&self, axis: u32) -> impl Future<Output = HwResult<()>> + Send;
}

/// Heater / temperature controller.
pub trait McuService: Send + Sync {
    fn connect(&self, params: &SerialConnection) -> impl Future<Output = HwResult<()>> + Send;

    fn disconnect(&self) -> impl Future<Output = HwResult<()>> + Send;

    fn is_connected(&self) -> impl Future<Output = HwResult<bool>> + Send;

    /// Current temperature in °C.
    fn get_temperature(&self) -> impl Future<Output = HwResult<f64>> + Send;

    fn set_temperature(&self, celsius: f64) -> impl Future<Output = HwResult<()>> + Send;

    fn set_test_mode(&self, mode: TestMode) -> impl Future<Output = HwResult<()>> + Send;

    /// Fan speed in percent.
    fn set_fan_speed(&self, percent: f64) -> impl Future<Output = HwResult<()>> + Send;
}

/// Force sensor indicator.
pub trait LoadCellService: Send + Sync {
    fn connect(&self, params: &SerialConnection) -> impl Future<Output = HwResult<()>> + Send;

    fn disconnect(&self) -> impl Future<Output = HwResult<()>> + Send;

    fn is_connected(&self) -> impl Future<Output = HwResult<bool>> + Send;

    /// Force in newtons.
    fn read_force(&self) -> impl Future<Output = HwResult<f64>> + Send;

    fn zero_calibration(&self) -> impl Future<Output = HwResult<()>> + Send;
}

/// Programmable power supply.
pub trait PowerService: Send + Sync {
    fn connect(&self, params: &PowerConnection) -> impl Future<Output = HwResult<()>> + Send;

    fn disconnect(&self) -> impl Future<Output = HwResult<()>> + Send;

    fn is_connected(&self) -> impl Future<Output = HwResult<bool>> + Send;

    fn enable_output(&self) -> impl Future<Output = HwResult<()>> + Send;

    fn disable_output(&self) -> impl Future<Output = HwResult<()>> + Send;

    fn is_output_enabled(&self) -> impl Future<Output = HwResult<bool>> + Send;

    fn get_voltage(&self) -> impl Future<Output = HwResult<f64>> + Send;

    fn set_voltage(&self, volts: f64) -> impl Future<Output = HwResult<()>> + Send;

    fn get_current(&self) -> impl Future<Output = HwResult<f64>> + Send;

    fn set_current_limit(&self, amps: f64) -> impl Future<Output = HwResult<()>> + Send;
}
