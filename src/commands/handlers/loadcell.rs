use std::time::Duration;

use super::{
    base_status_details, connection_state, help_from_table, lookup, resolve_connection,
    CommandSpec, HardwareCommandHandler,
};
use crate::commands::{CommandInfo, StopSignal};
use crate::config::ConfigReader;
use crate::console::{Console, MessageKind};
use crate::error::{ArgumentError, CommandError, CommandResult};
use crate::hardware::{Device, HardwareError, LoadCellService, SerialConnection};
use crate::log_hardware_operation;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LoadCellOp {
    Connect,
    Disconnect,
    Status,
    Read,
    Zero,
    Monitor,
}

const COMMANDS: &[CommandSpec<LoadCellOp>] = &[
    CommandSpec {
        name: "connect",
        op: LoadCellOp::Connect,
        description: "Connect to the LoadCell hardware",
    },
    CommandSpec {
        name: "disconnect",
        op: LoadCellOp::Disconnect,
        description: "Disconnect from the LoadCell hardware",
    },
    CommandSpec {
        name: "status",
        op: LoadCellOp::Status,
        description: "Show LoadCell connection and force status",
    },
    CommandSpec {
        name: "read",
        op: LoadCellOp::Read,
        description: "Read current force measurement",
    },
    CommandSpec {
        name: "zero",
        op: LoadCellOp::Zero,
        description: "Perform zero calibration on the LoadCell",
    },
    CommandSpec {
        name: "monitor",
        op: LoadCellOp::Monitor,
        description: "Start real-time force monitoring (Ctrl+C to stop)",
    },
];

fn hw(action: &'static str) -> impl FnOnce(HardwareError) -> CommandError {
    move |source| CommandError::hardware(Device::LoadCell, action, source)
}

fn parse_sample_count(text: &str) -> Result<u64, ArgumentError> {
    text.trim()
        .parse::<u64>()
        .ok()
        .filter(|n| *n > 0)
        .ok_or_else(|| ArgumentError::InvalidNumber {
            name: "sample count".to_string(),
            value: text.to_string(),
        })
}

/// `/loadcell` commands for the force indicator.
#[derive(Debug)]
pub struct LoadCellCommandHandler<L> {
    service: L,
    console: Console,
    connection: SerialConnection,
    refresh_rate: Duration,
}

impl<L: LoadCellService> LoadCellCommandHandler<L> {
    pub fn new(service: L, console: Console, config: Option<&ConfigReader>) -> Self {
        let refresh_rate = config
            .map(ConfigReader::monitor_refresh_rate)
            .unwrap_or_else(|| ConfigReader::defaults().monitor_refresh_rate());
        Self {
            service,
            console,
            connection: resolve_connection(
                config,
                Device::LoadCell,
                SerialConnection::loadcell_default,
            ),
            refresh_rate,
        }
    }

    pub fn service(&self) -> &L {
        &self.service
    }

    pub fn connection(&self) -> &SerialConnection {
        &self.connection
    }

    async fn connect(&self) -> CommandResult<()> {
        self.console
            .info(&format!("Connecting to LoadCell on {}...", self.connection.port));
        self.service
            .connect(&self.connection)
            .await
            .map_err(hw("LoadCell connection"))?;
        log_hardware_operation!(Device::LoadCell, "connect", self.connection.port);
        self.console.success("LoadCell connected successfully");
        Ok(())
    }

    async fn disconnect(&self) -> CommandResult<()> {
        self.service
            .disconnect()
            .await
            .map_err(hw("LoadCell disconnection"))?;
        log_hardware_operation!(Device::LoadCell, "disconnect");
        self.console.success("LoadCell disconnected successfully");
        Ok(())
    }

    async fn show_status(&self) -> CommandResult<()> {
        let connected = self
            .service
            .is_connected()
            .await
            .map_err(hw("LoadCell status query"))?;

        let mut details = base_status_details(connected, "BS205 Force Measurement");
        if connected {
            match self.service.read_force().await {
                Ok(force) => {
                    details.push(("Current Force".to_string(), format!("{:.3} N", force)));
                    details.push(("Status".to_string(), "Ready".to_string()));
                },
                Err(e) => details.push(("Status Error".to_string(), e.to_string())),
            }
        }

        self.console
            .print_status("LoadCell Hardware Status", connection_state(connected), &details);
        Ok(())
    }

    async fn read_force(&self) -> CommandResult<()> {
        let force = self
            .service
            .read_force()
            .await
            .map_err(hw("Force reading"))?;
        self.console
            .info(&format!("Current force reading: {:.3} N", force));
        Ok(())
    }

    async fn zero(&self) -> CommandResult<()> {
        self.console.info("Performing zero calibration...");
        self.service
            .zero_calibration()
            .await
            .map_err(hw("Zero calibration"))?;
        log_hardware_operation!(Device::LoadCell, "zero_calibration");
        self.console.success("Zero calibration completed successfully");
        Ok(())
    }

    /// Print a force reading every refresh interval until `stop` fires or
    /// `max_samples` readings have been taken. Returns the sample count.
    ///
    /// A failed reading ends the monitor with that error.
    pub async fn monitor_force(
        &self,
        stop: &StopSignal,
        max_samples: Option<u64>,
    ) -> CommandResult<u64> {
        self.console.print_message(
            MessageKind::Info,
            "Starting force monitoring. Press Ctrl+C to stop.",
            Some("Force Monitor"),
        );
        tracing::info!(
            refresh_ms = self.refresh_rate.as_millis() as u64,
            max_samples,
            "Force monitoring started"
        );

        let mut samples = 0;
        while !stop.is_stopped() {
            let force = self
                .service
                .read_force()
                .await
                .map_err(hw("Force monitoring"))?;
            samples += 1;
            let timestamp = chrono::Local::now().format("%H:%M:%S%.3f");
            self.console
                .print_line(&format!("   [{}] Force: {:>9.3} N", timestamp, force));

            if max_samples.is_some_and(|max| samples >= max) {
                break;
            }
            if stop.sleep(self.refresh_rate).await {
                break;
            }
        }

        tracing::info!(samples, "Force monitoring stopped");
        self.console.info("Force monitoring stopped");
        Ok(samples)
    }
}

impl<L: LoadCellService> HardwareCommandHandler for LoadCellCommandHandler<L> {
    fn device(&self) -> Device {
        Device::LoadCell
    }

    fn console(&self) -> &Console {
        &self.console
    }

    fn get_help_info(&self) -> Vec<(&'static str, &'static str)> {
        help_from_table(COMMANDS)
    }

    async fn execute(&self, info: &CommandInfo) -> CommandResult<()> {
        match lookup(COMMANDS, info)? {
            LoadCellOp::Connect => self.connect().await,
            LoadCellOp::Disconnect => self.disconnect().await,
            LoadCellOp::Status => self.show_status().await,
            LoadCellOp::Read => self.read_force().await,
            LoadCellOp::Zero => self.zero().await,
            LoadCellOp::Monitor => {
                let max_samples = info.first_argument().map(parse_sample_count).transpose()?;
                let stop = StopSignal::new();
                let _ctrl_c = stop.stop_on_ctrl_c();
                self.monitor_force(&stop, max_samples).await.map(|_| ())
            },
        }
    }
}
