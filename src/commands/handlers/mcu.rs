use super::{
    base_status_details, connection_state, help_from_table, lookup, resolve_connection,
    CommandSpec, HardwareCommandHandler, Limit,
};
use crate::commands::CommandInfo;
use crate::config::ConfigReader;
use crate::console::Console;
use crate::error::{ArgumentError, CommandError, CommandResult};
use crate::hardware::{Device, HardwareError, McuService, SerialConnection, TestMode};
use crate::log_hardware_operation;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum McuOp {
    Connect,
    Disconnect,
    Status,
    Temp,
    TestMode,
    Fan,
}

const COMMANDS: &[CommandSpec<McuOp>] = &[
    CommandSpec {
        name: "connect",
        op: McuOp::Connect,
        description: "Connect to the MCU hardware",
    },
    CommandSpec {
        name: "disconnect",
        op: McuOp::Disconnect,
        description: "Disconnect from the MCU hardware",
    },
    CommandSpec {
        name: "status",
        op: McuOp::Status,
        description: "Show MCU connection and temperature status",
    },
    CommandSpec {
        name: "temp",
        op: McuOp::Temp,
        description: "Get current temperature or set temperature with argument (°C)",
    },
    CommandSpec {
        name: "testmode",
        op: McuOp::TestMode,
        description: "Enter test mode for MCU operations",
    },
    CommandSpec {
        name: "fan",
        op: McuOp::Fan,
        description: "Set fan speed with argument (0-100%)",
    },
];

const FAN_SPEED_REQUIRED: &str = "Fan speed argument required (0-100)";

fn hw(action: &'static str) -> impl FnOnce(HardwareError) -> CommandError {
    move |source| CommandError::hardware(Device::Mcu, action, source)
}

/// `/mcu` commands for the temperature controller.
#[derive(Debug)]
pub struct McuCommandHandler<M> {
    service: M,
    console: Console,
    connection: SerialConnection,
    temperature: Limit,
    fan_speed: Limit,
}

impl<M: McuService> McuCommandHandler<M> {
    pub fn new(service: M, console: Console, config: Option<&ConfigReader>) -> Self {
        Self {
            service,
            console,
            connection: resolve_connection(config, Device::Mcu, SerialConnection::mcu_default),
            temperature: Limit::resolve(
                config,
                Device::Mcu,
                "temperature_range",
                "Temperature",
                (20.0, 100.0),
                "°C",
            ),
            fan_speed: Limit::resolve(
                config,
                Device::Mcu,
                "fan_speed_range",
                "Fan speed",
                (0.0, 100.0),
                "%",
            ),
        }
    }

    pub fn service(&self) -> &M {
        &self.service
    }

    pub fn connection(&self) -> &SerialConnection {
        &self.connection
    }

    async fn connect(&self) -> CommandResult<()> {
        self.console
            .info(&format!("Connecting to MCU on {}...", self.connection.port));
        self.service
            .connect(&self.connection)
            .await
            .map_err(hw("MCU connection"))?;
        log_hardware_operation!(Device::Mcu, "connect", self.connection.port);
        self.console.success("MCU connected successfully");
        Ok(())
    }

    async fn disconnect(&self) -> CommandResult<()> {
        self.service
            .disconnect()
            .await
            .map_err(hw("MCU disconnection"))?;
        log_hardware_operation!(Device::Mcu, "disconnect");
        self.console.success("MCU disconnected successfully");
        Ok(())
    }

    async fn show_status(&self) -> CommandResult<()> {
        let connected = self
            .service
            .is_connected()
            .await
            .map_err(hw("MCU status query"))?;

        let mut details = base_status_details(connected, "LMA Temperature Controller");
        if connected {
            match self.service.get_temperature().await {
                Ok(temp) => {
                    details.push(("Temperature".to_string(), format!("{:.2}°C", temp)));
                    details.push(("Test Mode".to_string(), "Available".to_string()));
                },
                Err(e) => details.push(("Status Error".to_string(), e.to_string())),
            }
        }

        self.console
            .print_status("MCU Hardware Status", connection_state(connected), &details);
        Ok(())
    }

    async fn temperature(&self, info: &CommandInfo) -> CommandResult<()> {
        match info.first_argument() {
            None => {
                let temp = self
                    .service
                    .get_temperature()
                    .await
                    .map_err(hw("Temperature read"))?;
                self.console
                    .info(&format!("Current temperature: {:.2}°C", temp));
            },
            Some(arg) => {
                let target = self.temperature.parse(arg)?;
                self.service
                    .set_temperature(target)
                    .await
                    .map_err(hw("Temperature update"))?;
                log_hardware_operation!(Device::Mcu, "set_temperature", target);
                self.console
                    .success(&format!("Operating temperature set to {:.2}°C", target));
            },
        }
        Ok(())
    }

    async fn enter_test_mode(&self) -> CommandResult<()> {
        self.service
            .set_test_mode(TestMode::Mode1)
            .await
            .map_err(hw("Test mode entry"))?;
        log_hardware_operation!(Device::Mcu, "set_test_mode", TestMode::Mode1 as u8);
        self.console.success("Entered test mode successfully");
        Ok(())
    }

    async fn fan_speed(&self, info: &CommandInfo) -> CommandResult<()> {
        let arg = info.first_argument().ok_or(ArgumentError::Missing {
            usage: FAN_SPEED_REQUIRED,
        })?;
        let speed = self.fan_speed.parse(arg)?;
        self.service
            .set_fan_speed(speed)
            .await
            .map_err(hw("Fan speed update"))?;
        log_hardware_operation!(Device::Mcu, "set_fan_speed", speed);
        self.console
            .success(&format!("Fan speed set to {:.1}%", speed));
        Ok(())
    }
}

impl<M: McuService> HardwareCommandHandler for McuCommandHandler<M> {
    fn device(&self) -> Device {
        Device::Mcu
    }

    fn console(&self) -> &Console {
        &self.console
    }

    fn get_help_info(&self) -> Vec<(&'static str, &'static str)> {
        help_from_table(COMMANDS)
    }

    async fn execute(&self, info: &CommandInfo) -> CommandResult<()> {
        match lookup(COMMANDS, info)? {
            McuOp::Connect => self.connect().await,
            McuOp::Disconnect => self.disconnect().await,
            McuOp::Status => self.show_status().await,
            McuOp::Temp => self.temperature(info).await,
            McuOp::TestMode => self.enter_test_mode().await,
            McuOp::Fan => self.fan_speed(info).await,
        }
    }
}
