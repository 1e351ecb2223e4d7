#[cfg(test)]
pub mod test_helpers {
    use std::collections::HashSet;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::{Arc, Mutex};

    use serde_json::json;

    use crate::commands::HardwareServices;
    use crate::config::ConfigReader;
    use crate::hardware::{
        Device, HardwareError, HwResult, LoadCellService, McuService, MotionStatus,
        PowerConnection, PowerService, RobotConnection, RobotService, SerialConnection, TestMode,
    };

    pub const FAKE_TEMPERATURE: f64 = 25.0;
    pub const FAKE_FORCE: f64 = 1.234;
    pub const FAKE_VOLTAGE: f64 = 24.0;
    pub const FAKE_CURRENT: f64 = 1.5;

    /// Shared record of fake service calls, e.g. `"power.disable_output"`.
    ///
    /// Any call listed through [`CallLog::fail_on`] is still recorded and
    /// then fails with an operation error.
    #[derive(Debug, Default)]
    pub struct CallLog {
        calls: Mutex<Vec<&'static str>>,
        failing: Mutex<HashSet<&'static str>>,
    }

    impl CallLog {
        pub fn new() -> Arc<Self> {
            Arc::new(Self::default())
        }

        pub fn fail_on(&self, call: &'static str) {
            self.failing.lock().unwrap().insert(call);
        }

        pub fn calls(&self) -> Vec<&'static str> {
            self.calls.lock().unwrap().clone()
        }

        pub fn count(&self, call: &str) -> usize {
            self.calls.lock().unwrap().iter().filter(|c| **c == call).count()
        }

        fn record(&self, device: Device, call: &'static str) -> HwResult<()> {
            self.calls.lock().unwrap().push(call);
            if self.failing.lock().unwrap().contains(call) {
                Err(HardwareError::Operation {
                    device,
                    reason: format!("{} failed", call),
                })
            } else {
                Ok(())
            }
        }
    }

    #[derive(Debug)]
    pub struct FakeRobot {
        log: Arc<CallLog>,
        connected: AtomicBool,
    }

    impl FakeRobot {
        pub fn new(log: &Arc<CallLog>) -> Self {
            Self {
                log: Arc::clone(log),
                connected: AtomicBool::new(false),
            }
        }
    }

    impl RobotService for FakeRobot {
        async fn connect(&self, _params: &RobotConnection) -> HwResult<()> {
            self.log.record(Device::Robot, "robot.connect")?;
            self.connected.store(true, Ordering::SeqCst);
            Ok(())
        }

        async fn disconnect(&self) -> HwResult<()> {
            self.log.record(Device::Robot, "robot.disconnect")?;
            self.connected.store(false, Ordering::SeqCst);
            Ok(())
        }

        async fn is_connected(&self) -> HwResult<bool> {
            self.log.record(Device::Robot, "robot.is_connected")?;
            Ok(self.connected.load(Ordering::SeqCst))
        }

        async fn get_motion_status(&self) -> HwResult<MotionStatus> {
            self.log.record(Device::Robot, "robot.get_motion_status")?;
            Ok(MotionStatus::Idle)
        }

        async fn get_primary_axis_id(&self) -> HwResult<u32> {
            self.log.record(Device::Robot, "robot.get_primary_axis_id")?;
            Ok(0)
        }

        async fn home_axis(&self, _axis: u32) -> HwResult<()> {
            self.log.record(Device::Robot, "robot.home_axis")
        }

        async fn emergency_stop(&self, _axis: u32) -> HwResult<()> {
            self.log.record(Device::Robot, "robot.emergency_stop")
        }
    }

    #[derive(Debug)]
    pub struct FakeMcu {
        log: Arc<CallLog>,
        connected: AtomicBool,
        last_fan_speed: Mutex<Option<f64>>,
    }

    impl FakeMcu {
        pub fn new(log: &Arc<CallLog>) -> Self {
            Self {
                log: Arc::clone(log),
                connected: AtomicBool::new(false),
                last_fan_speed: Mutex::new(None),
            }
        }

        pub fn last_fan_speed(&self) -> Option<f64> {
            *self.last_fan_speed.lock().unwrap()
        }
    }

    impl McuService for FakeMcu {
        async fn connect(&self, _params: &SerialConnection) -> HwResult<()> {
            self.log.record(Device::Mcu, "mcu.connect")?;
            self.connected.store(true, Ordering::SeqCst);
            Ok(())
        }

        async fn disconnect(&self) -> HwResult<()> {
            self.log.record(Device::Mcu, "mcu.disconnect")?;
            self.connected.store(false, Ordering::SeqCst);
            Ok(())
        }

        async fn is_connected(&self) -> HwResult<bool> {
            self.log.record(Device::Mcu, "mcu.is_connected")?;
            Ok(self.connected.load(Ordering::SeqCst))
        }

        async fn get_temperature(&self) -> HwResult<f64> {
            self.log.record(Device::Mcu, "mcu.get_temperature")?;
            Ok(FAKE_TEMPERATURE)
        }

        async fn set_temperature(&self, _celsius: f64) -> HwResult<()> {
            self.log.record(Device::Mcu, "mcu.set_temperature")
        }

        async fn set_test_mode(&self, _mode: TestMode) -> HwResult<()> {
            self.log.record(Device::Mcu, "mcu.set_test_mode")
        }

        async fn set_fan_speed(&self, percent: f64) -> HwResult<()> {
            self.log.record(Device::Mcu, "mcu.set_fan_speed")?;
            *self.last_fan_speed.lock().unwrap() = Some(percent);
            Ok(())
        }
    }

    #[derive(Debug)]
    pub struct FakeLoadCell {
        log: Arc<CallLog>,
        connected: AtomicBool,
    }

    impl FakeLoadCell {
        pub fn new(log: &Arc<CallLog>) -> Self {
            Self {
                log: Arc::clone(log),
                connected: AtomicBool::new(false),
            }
        }
    }

    impl LoadCellService for FakeLoadCell {
        async fn connect(&self, _params: &SerialConnection) -> HwResult<()> {
            self.log.record(Device::LoadCell, "loadcell.connect")?;
            self.connected.store(true, Ordering::SeqCst);
            Ok(())
        }

        async fn disconnect(&self) -> HwResult<()> {
            self.log.record(Device::LoadCell, "loadcell.disconnect")?;
            self.connected.store(false, Ordering::SeqCst);
            Ok(())
        }

        async fn is_connected(&self) -> HwResult<bool> {
            self.log.record(Device::LoadCell, "loadcell.is_connected")?;
            Ok(self.connected.load(Ordering::SeqCst))
        }

        async fn read_force(&self) -> HwResult<f64> {
            self.log.record(Device::LoadCell, "loadcell.read_force")?;
            Ok(FAKE_FORCE)
        }

        async fn zero_calibration(&self) -> HwResult<()> {
            self.log.record(Device::LoadCell, "loadcell.zero_calibration")
        }
    }

    #[derive(Debug)]
    pub struct FakePower {
        log: Arc<CallLog>,
        connected: AtomicBool,
        output: AtomicBool,
    }

    impl FakePower {
        pub fn new(log: &Arc<CallLog>) -> Self {
            Self {
                log: Arc::clone(log),
                connected: AtomicBool::new(false),
                output: AtomicBool::new(false),
            }
        }
    }

    impl PowerService for FakePower {
        async fn connect(&self, _params: &PowerConnection) -> HwResult<()> {
            self.log.record(Device::Power, "power.connect")?;
            self.connected.store(true, Ordering::SeqCst);
            Ok(())
        }

        async fn disconnect(&self) -> HwResult<()> {
            self.log.record(Device::Power, "power.disconnect")?;
            self.connected.store(false, Ordering::SeqCst);
            Ok(())
        }

        async fn is_connected(&self) -> HwResult<bool> {
            self.log.record(Device::Power, "power.is_connected")?;
            Ok(self.connected.load(Ordering::SeqCst))
        }

        async fn enable_output(&self) -> HwResult<()> {
            self.log.record(Device::Power, "power.enable_output")?;
            self.output.store(true, Ordering::SeqCst);
            Ok(())
        }

        async fn disable_output(&self) -> HwResult<()> {
            self.log.record(Device::Power, "power.disable_output")?;
            self.output.store(false, Ordering::SeqCst);
            Ok(())
        }

        async fn is_output_enabled(&self) -> HwResult<bool> {
            self.log.record(Device::Power, "power.is_output_enabled")?;
            Ok(self.output.load(Ordering::SeqCst))
        }

        async fn get_voltage(&self) -> HwResult<f64> {
            self.log.record(Device::Power, "power.get_voltage")?;
            Ok(FAKE_VOLTAGE)
        }

        async fn set_voltage(&self, _volts: f64) -> HwResult<()> {
            self.log.record(Device::Power, "power.set_voltage")
        }

        async fn get_current(&self) -> HwResult<f64> {
            self.log.record(Device::Power, "power.get_current")?;
            Ok(FAKE_CURRENT)
        }

        async fn set_current_limit(&self, _amps: f64) -> HwResult<()> {
            self.log.record(Device::Power, "power.set_current_limit")
        }
    }

    pub type FakeServices = HardwareServices<FakeRobot, FakeMcu, FakeLoadCell, FakePower>;

    /// One fake per instrument, all recording into `log`.
    pub fn fake_services(log: &Arc<CallLog>) -> FakeServices {
        HardwareServices {
            robot: FakeRobot::new(log),
            mcu: FakeMcu::new(log),
            loadcell: FakeLoadCell::new(log),
            power: FakePower::new(log),
        }
    }

    /// Defaults with a near-zero monitor refresh rate.
    pub fn fast_config() -> ConfigReader {
        ConfigReader::from_value(json!({
            "cli_config": {
                "mock": { "connect_delay_ms": 0, "response_delay_ms": 0 },
                "commands": { "loadcell": { "defaults": { "monitor_refresh_rate": 0.001 } } }
            }
        }))
    }
}
