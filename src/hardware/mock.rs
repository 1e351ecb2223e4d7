//! Simulated instruments.
//!
//! Used when the station runs in `mock` hardware mode and by the test suite.
//! Each mock keeps its state behind a `tokio::sync::Mutex` and never holds
//! the lock across a simulated delay.

use std::time::Duration;

use tokio::sync::Mutex;

use super::{
    Device, HardwareError, HwResult, LoadCellService, McuService, MotionStatus, PowerConnection,
    PowerService, RobotConnection, RobotService, SerialConnection, TestMode,
};

/// Simulated I/O latencies.
#[derive(Debug, Clone, Copy)]
pub struct MockTiming {
    pub connect_delay: Duration,
    pub response_delay: Duration,
}

impl MockTiming {
    /// No latency at all, for tests.
    pub fn instant() -> Self {
        Self {
            connect_delay: Duration::ZERO,
            response_delay: Duration::ZERO,
        }
    }

    async fn connect(&self) {
        if !self.connect_delay.is_zero() {
            tokio::time::sleep(self.connect_delay).await;
        }
    }

    async fn respond(&self) {
        if !self.response_delay.is_zero() {
            tokio::time::sleep(self.response_delay).await;
        }
    }
}

impl Default for MockTiming {
    fn default() -> Self {
        Self {
            connect_delay: Duration::from_millis(200),
            response_delay: Duration::from_millis(20),
        }
    }
}

/// Uniform noise in `[-amplitude, amplitude)`.
fn noise(amplitude: f64) -> f64 {
    (rand::random::<f64>() * 2.0 - 1.0) * amplitude
}

fn ensure_connected(connected: bool, device: Device) -> HwResult<()> {
    if connected {
        Ok(())
    } else {
        Err(HardwareError::NotConnected(device))
    }
}

// ── Robot ───────────────────────────────────────────────────────────

const ROBOT_AXIS_COUNT: u32 = 6;

#[derive(Debug)]
struct RobotState {
    connected: bool,
    primary_axis: u32,
    motion: MotionStatus,
    homed: bool,
}

#[derive(Debug)]
pub struct MockRobot {
    timing: MockTiming,
    state: Mutex<RobotState>,
}

impl MockRobot {
    pub fn new(timing: MockTiming) -> Self {
        Self {
            timing,
            state: Mutex::new(RobotState {
                connected: false,
                primary_axis: 0,
                motion: MotionStatus::Idle,
                homed: false,
            }),
        }
    }

    pub async fn is_homed(&self) -> bool {
        self.state.lock().await.homed
    }
}

impl Default for MockRobot {
    fn default() -> Self {
        Self::new(MockTiming::default())
    }
}

impl RobotService for MockRobot {
    async fn connect(&self, params: &RobotConnection) -> HwResult<()> {
        if params.axis_id >= ROBOT_AXIS_COUNT {
            return Err(HardwareError::Connection {
                device: Device::Robot,
                reason: format!(
                    "axis {} out of range (controller has {} axes)",
                    params.axis_id, ROBOT_AXIS_COUNT
                ),
            });
        }
        self.timing.connect().await;
        let mut state = self.state.lock().await;
        state.connected = true;
        state.primary_axis = params.axis_id;
        state.motion = MotionStatus::Idle;
        Ok(())
    }

    async fn disconnect(&self) -> HwResult<()> {
        self.timing.respond().await;
        let mut state = self.state.lock().await;
        state.connected = false;
        state.homed = false;
        Ok(())
    }

    async fn is_connected(&self) -> HwResult<bool> {
        Ok(self.state.lock().await.connected)
    }

    async fn get_motion_status(&self) -> HwResult<MotionStatus> {
        self.timing.respond().await;
        let state = self.state.lock().await;
        ensure_connected(state.connected, Device::Robot)?;
        Ok(state.motion)
    }

    async fn get_primary_axis_id(&self) -> HwResult<u32> {
        let state = self.state.lock().await;
        ensure_connected(state.connected, Device::Robot)?;
        Ok(state.primary_axis)
    }

    async fn home_axis(&self, axis: u32) -> HwResult<()> {
        {
            let mut state = self.state.lock().await;
            ensure_connected(state.connected, Device::Robot)?;
            if axis >= ROBOT_AXIS_COUNT {
                return Err(HardwareError::Operation {
                    device: Device::Robot,
                    reason: format!("invalid axis {}", axis),
                });
            }
            state.motion = MotionStatus::Homing;
        }
        self.timing.connect().await;
        let mut state = self.state.lock().await;
        state.motion = MotionStatus::Idle;
        state.homed = true;
        Ok(())
    }

    async fn emergency_stop(&self, axis: u32) -> HwResult<()> {
        let mut state = self.state.lock().await;
        ensure_connected(state.connected, Device::Robot)?;
        tracing::warn!(axis, "Mock robot emergency stop");
        state.motion = MotionStatus::EmergencyStop;
        Ok(())
    }
}

// ── MCU ─────────────────────────────────────────────────────────────

const MCU_MIN_TEMPERATURE: f64 = -40.0;
const MCU_MAX_TEMPERATURE: f64 = 150.0;
/// Largest temperature change between two reads, in °C.
const MCU_RAMP_STEP: f64 = 2.0;

#[derive(Debug)]
struct McuState {
    connected: bool,
    temperature: f64,
    target: f64,
    fan_speed: f64,
    test_mode: Option<TestMode>,
}

#[derive(Debug)]
pub struct MockMcu {
    timing: MockTiming,
    state: Mutex<McuState>,
}

impl MockMcu {
    pub fn new(timing: MockTiming) -> Self {
        Self {
            timing,
            state: Mutex::new(McuState {
                connected: false,
                temperature: 25.0,
                target: 25.0,
                fan_speed: 50.0,
                test_mode: None,
            }),
        }
    }

    pub async fn fan_speed(&self) -> f64 {
        self.state.lock().await.fan_speed
    }

    pub async fn target_temperature(&self) -> f64 {
        self.state.lock().await.target
    }

    pub async fn test_mode(&self) -> Option<TestMode> {
        self.state.lock().await.test_mode
    }
}

impl Default for MockMcu {
    fn default() -> Self {
        Self::new(MockTiming::default())
    }
}

impl McuService for MockMcu {
    async fn connect(&self, params: &SerialConnection) -> HwResult<()> {
        if params.port.is_empty() || params.baudrate == 0 {
            return Err(HardwareError::Connection {
                device: Device::Mcu,
                reason: format!("invalid serial settings {}@{}", params.port, params.baudrate),
            });
        }
        self.timing.connect().await;
        self.state.lock().await.connected = true;
        Ok(())
    }

    async fn disconnect(&self) -> HwResult<()> {
        self.timing.respond().await;
        let mut state = self.state.lock().await;
        state.connected = false;
        state.test_mode = None;
        Ok(())
    }

    async fn is_connected(&self) -> HwResult<bool> {
        Ok(self.state.lock().await.connected)
    }

    async fn get_temperature(&self) -> HwResult<f64> {
        self.timing.respond().await;
        let mut state = self.state.lock().await;
        ensure_connected(state.connected, Device::Mcu)?;
        let delta = (state.target - state.temperature).clamp(-MCU_RAMP_STEP, MCU_RAMP_STEP);
        state.temperature += delta;
        Ok(state.temperature + noise(0.05))
    }

    async fn set_temperature(&self, celsius: f64) -> HwResult<()> {
        self.timing.respond().await;
        let mut state = self.state.lock().await;
        ensure_connected(state.connected, Device::Mcu)?;
        if !(MCU_MIN_TEMPERATURE..=MCU_MAX_TEMPERATURE).contains(&celsius) {
            return Err(HardwareError::Operation {
                device: Device::Mcu,
                reason: format!(
                    "temperature {:.1}°C outside controller limits {}..{}°C",
                    celsius, MCU_MIN_TEMPERATURE, MCU_MAX_TEMPERATURE
                ),
            });
        }
        state.target = celsius;
        Ok(())
    }

    async fn set_test_mode(&self, mode: TestMode) -> HwResult<()> {
        self.timing.respond().await;
        let mut state = self.state.lock().await;
        ensure_connected(state.connected, Device::Mcu)?;
        state.test_mode = Some(mode);
        Ok(())
    }

    async fn set_fan_speed(&self, percent: f64) -> HwResult<()> {
        self.timing.respond().await;
        let mut state = self.state.lock().await;
        ensure_connected(state.connected, Device::Mcu)?;
        state.fan_speed = percent;
        Ok(())
    }
}

// ── LoadCell ────────────────────────────────────────────────────────

/// Force resting on the cell before any zeroing, in newtons.
const LOADCELL_PRELOAD: f64 = 12.5;

#[derive(Debug)]
struct LoadCellState {
    connected: bool,
    offset: f64,
}

#[derive(Debug)]
pub struct MockLoadCell {
    timing: MockTiming,
    state: Mutex<LoadCellState>,
}

impl MockLoadCell {
    pub fn new(timing: MockTiming) -> Self {
        Self {
            timing,
            state: Mutex::new(LoadCellState {
                connected: false,
                offset: 0.0,
            }),
        }
    }
}

impl Default for MockLoadCell {
    fn default() -> Self {
        Self::new(MockTiming::default())
    }
}

impl LoadCellService for MockLoadCell {
    async fn connect(&self, params: &SerialConnection) -> HwResult<()> {
        if params.port.is_empty() || params.baudrate == 0 {
            return Err(HardwareError::Connection {
                device: Device::LoadCell,
                reason: format!("invalid serial settings {}@{}", params.port, params.baudrate),
            });
        }
        self.timing.connect().await;
        self.state.lock().await.connected = true;
        Ok(())
    }

    async fn disconnect(&self) -> HwResult<()> {
        self.timing.respond().await;
        self.state.lock().await.connected = false;
        Ok(())
    }

    async fn is_connected(&self) -> HwResult<bool> {
        Ok(self.state.lock().await.connected)
    }

    async fn read_force(&self) -> HwResult<f64> {
        self.timing.respond().await;
        let state = self.state.lock().await;
        ensure_connected(state.connected, Device::LoadCell)?;
        Ok(LOADCELL_PRELOAD - state.offset + noise(0.02))
    }

    async fn zero_calibration(&self) -> HwResult<()> {
        self.timing.connect().await;
        let mut state = self.state.lock().await;
        ensure_connected(state.connected, Device::LoadCell)?;
        state.offset = LOADCELL_PRELOAD;
        Ok(())
    }
}

// ── Power ───────────────────────────────────────────────────────────

/// Resistive dummy load on the supply output, in ohms.
const POWER_LOAD_RESISTANCE: f64 = 12.0;

#[derive(Debug)]
struct PowerState {
    connected: bool,
    output_enabled: bool,
    voltage: f64,
    current_limit: f64,
}

#[derive(Debug)]
pub struct MockPower {
    timing: MockTiming,
    state: Mutex<PowerState>,
}

impl MockPower {
    pub fn new(timing: MockTiming) -> Self {
        Self {
            timing,
            state: Mutex::new(PowerState {
                connected: false,
                output_enabled: false,
                voltage: 0.0,
                current_limit: 1.0,
            }),
        }
    }
}

impl Default for MockPower {
    fn default() -> Self {
        Self::new(MockTiming::default())
    }
}

impl PowerService for MockPower {
    async fn connect(&self, params: &PowerConnection) -> HwResult<()> {
        if params.host.is_empty() {
            return Err(HardwareError::Connection {
                device: Device::Power,
                reason: "host must not be empty".to_string(),
            });
        }
        self.timing.connect().await;
        self.state.lock().await.connected = true;
        Ok(())
    }

    async fn disconnect(&self) -> HwResult<()> {
        self.timing.respond().await;
        let mut state = self.state.lock().await;
        state.connected = false;
        state.output_enabled = false;
        Ok(())
    }

    async fn is_connected(&self) -> HwResult<bool> {
        Ok(self.state.lock().await.connected)
    }

    async fn enable_output(&self) -> HwResult<()> {
        self.timing.respond().await;
        let mut state = self.state.lock().await;
        ensure_connected(state.connected, Device::Power)?;
        state.output_enabled = true;
        Ok(())
    }

    async fn disable_output(&self) -> HwResult<()> {
        self.timing.respond().await;
        let mut state = self.state.lock().await;
        ensure_connected(state.connected, Device::Power)?;
        state.output_enabled = false;
        Ok(())
    }

    async fn is_output_enabled(&self) -> HwResult<bool> {
        let state = self.state.lock().await;
        ensure_connected(state.connected, Device::Power)?;
        Ok(state.output_enabled)
    }

    async fn get_voltage(&self) -> HwResult<f64> {
        self.timing.respond().await;
        let state = self.state.lock().await;
        ensure_connected(state.connected, Device::Power)?;
        Ok(if state.output_enabled {
            state.voltage
        } else {
            0.0
        })
    }

    async fn set_voltage(&self, volts: f64) -> HwResult<()> {
        self.timing.respond().await;
        let mut state = self.state.lock().await;
        ensure_connected(state.connected, Device::Power)?;
        state.voltage = volts;
        Ok(())
    }

    async fn get_current(&self) -> HwResult<f64> {
        self.timing.respond().await;
        let state = self.state.lock().await;
        ensure_connected(state.connected, Device::Power)?;
        if !state.output_enabled {
            return Ok(0.0);
        }
        Ok((state.voltage / POWER_LOAD_RESISTANCE).min(state.current_limit))
    }

    async fn set_current_limit(&self, amps: f64) -> HwResult<()> {
        self.timing.respond().await;
        let mut state = self.state.lock().await;
        ensure_connected(state.connected, Device::Power)?;
        state.current_limit = amps;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_mcu_requires_connection() {
        let mcu = MockMcu::new(MockTiming::instant());
        assert_eq!(
            mcu.get_temperature().await,
            Err(HardwareError::NotConnected(Device::Mcu))
        );

        mcu.connect(&SerialConnection::mcu_default()).await.unwrap();
        let t = mcu.get_temperature().await.unwrap();
        assert!((t - 25.0).abs() < 0.1);
    }

    #[tokio::test]
    async fn test_mock_mcu_ramps_towards_target() {
        let mcu = MockMcu::new(MockTiming::instant());
        mcu.connect(&SerialConnection::mcu_default()).await.unwrap();
        mcu.set_temperature(85.0).await.unwrap();

        let first = mcu.get_temperature().await.unwrap();
        assert!(first < 28.0, "ramp is bounded per read, got {}", first);

        let mut last = first;
        for _ in 0..40 {
            last = mcu.get_temperature().await.unwrap();
        }
        assert!((last - 85.0).abs() < 0.1);
    }

    #[tokio::test]
    async fn test_mock_mcu_rejects_temperature_outside_limits() {
        let mcu = MockMcu::new(MockTiming::instant());
        mcu.connect(&SerialConnection::mcu_default()).await.unwrap();
        assert!(mcu.set_temperature(500.0).await.is_err());
        assert_eq!(mcu.target_temperature().await, 25.0);
    }

    #[tokio::test]
    async fn test_mock_loadcell_zero_removes_preload() {
        let cell = MockLoadCell::new(MockTiming::instant());
        cell.connect(&SerialConnection::loadcell_default())
            .await
            .unwrap();
        let before = cell.read_force().await.unwrap();
        assert!((before - LOADCELL_PRELOAD).abs() < 0.05);

        cell.zero_calibration().await.unwrap();
        let after = cell.read_force().await.unwrap();
        assert!(after.abs() < 0.05);
    }

    #[tokio::test]
    async fn test_mock_power_output_and_current_limit() {
        let psu = MockPower::new(MockTiming::instant());
        psu.connect(&PowerConnection::default()).await.unwrap();
        psu.set_voltage(24.0).await.unwrap();
        psu.set_current_limit(1.5).await.unwrap();

        assert_eq!(psu.get_voltage().await.unwrap(), 0.0);
        psu.enable_output().await.unwrap();
        assert_eq!(psu.get_voltage().await.unwrap(), 24.0);
        assert_eq!(psu.get_current().await.unwrap(), 1.5);

        psu.disable_output().await.unwrap();
        psu.disable_output().await.unwrap();
        assert!(!psu.is_output_enabled().await.unwrap());
    }

    #[tokio::test]
    async fn test_mock_robot_home_and_stop() {
        let robot = MockRobot::new(MockTiming::instant());
        assert!(robot.get_primary_axis_id().await.is_err());

        robot
            .connect(&RobotConnection {
                axis_id: 2,
                irq_no: 7,
            })
            .await
            .unwrap();
        let axis = robot.get_primary_axis_id().await.unwrap();
        assert_eq!(axis, 2);

        robot.home_axis(axis).await.unwrap();
        assert!(robot.is_homed().await);
        assert_eq!(robot.get_motion_status().await.unwrap(), MotionStatus::Idle);

        robot.emergency_stop(axis).await.unwrap();
        assert_eq!(
            robot.get_motion_status().await.unwrap(),
            MotionStatus::EmergencyStop
        );
    }

    #[tokio::test]
    async fn test_mock_robot_rejects_unknown_axis() {
        let robot = MockRobot::new(MockTiming::instant());
        let params = RobotConnection {
            axis_id: 9,
            irq_no: 7,
        };
        assert!(matches!(
            robot.connect(&params).await,
            Err(HardwareError::Connection { .. })
        ));
    }
}
