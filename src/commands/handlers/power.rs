use super::{
    base_status_details, connection_state, help_from_table, lookup, resolve_connection,
    CommandSpec, HardwareCommandHandler, Limit,
};
use crate::commands::CommandInfo;
use crate::config::ConfigReader;
use crate::console::{Console, MessageKind};
use crate::error::{CommandError, CommandResult};
use crate::hardware::{Device, HardwareError, PowerConnection, PowerService};
use crate::log_hardware_operation;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PowerOp {
    Connect,
    Disconnect,
    Status,
    On,
    Off,
    Voltage,
    Current,
}

const COMMANDS: &[CommandSpec<PowerOp>] = &[
    CommandSpec {
        name: "connect",
        op: PowerOp::Connect,
        description: "Connect to the Power supply hardware",
    },
    CommandSpec {
        name: "disconnect",
        op: PowerOp::Disconnect,
        description: "Disconnect from the Power supply hardware",
    },
    CommandSpec {
        name: "status",
        op: PowerOp::Status,
        description: "Show Power supply connection and output status",
    },
    CommandSpec {
        name: "on",
        op: PowerOp::On,
        description: "Enable power output",
    },
    CommandSpec {
        name: "off",
        op: PowerOp::Off,
        description: "Disable power output",
    },
    CommandSpec {
        name: "voltage",
        op: PowerOp::Voltage,
        description: "Get current voltage or set voltage with argument (V)",
    },
    CommandSpec {
        name: "current",
        op: PowerOp::Current,
        description: "Get current reading or set current limit with argument (A)",
    },
];

fn hw(action: &'static str) -> impl FnOnce(HardwareError) -> CommandError {
    move |source| CommandError::hardware(Device::Power, action, source)
}

/// `/power` commands for the programmable supply.
#[derive(Debug)]
pub struct PowerCommandHandler<P> {
    service: P,
    console: Console,
    connection: PowerConnection,
    voltage: Limit,
    current_limit: Limit,
}

impl<P: PowerService> PowerCommandHandler<P> {
    pub fn new(service: P, console: Console, config: Option<&ConfigReader>) -> Self {
        Self {
            service,
            console,
            connection: resolve_connection(config, Device::Power, PowerConnection::default),
            voltage: Limit::resolve(
                config,
                Device::Power,
                "voltage_range",
                "Voltage",
                (0.0, 30.0),
                "V",
            ),
            current_limit: Limit::resolve(
                config,
                Device::Power,
                "current_limit_range",
                "Current",
                (0.0, 5.0),
                "A",
            ),
        }
    }

    pub fn service(&self) -> &P {
        &self.service
    }

    pub fn connection(&self) -> &PowerConnection {
        &self.connection
    }

    async fn connect(&self) -> CommandResult<()> {
        self.console.info(&format!(
            "Connecting to Power supply at {}:{}...",
            self.connection.host, self.connection.port
        ));
        self.service
            .connect(&self.connection)
            .await
            .map_err(hw("Power supply connection"))?;
        log_hardware_operation!(Device::Power, "connect", self.connection.host);
        self.console.success("Power supply connected successfully");
        Ok(())
    }

    async fn disconnect(&self) -> CommandResult<()> {
        self.service
            .disconnect()
            .await
            .map_err(hw("Power supply disconnection"))?;
        log_hardware_operation!(Device::Power, "disconnect");
        self.console.success("Power supply disconnected successfully");
        Ok(())
    }

    async fn show_status(&self) -> CommandResult<()> {
        let connected = self
            .service
            .is_connected()
            .await
            .map_err(hw("Power supply status query"))?;

        let mut details = base_status_details(connected, "ODA Power Supply");
        if connected {
            let readings = async {
                let voltage = self.service.get_voltage().await?;
                let current = self.service.get_current().await?;
                let output = self.service.is_output_enabled().await?;
                Ok::<_, HardwareError>((voltage, current, output))
            }
            .await;
            match readings {
                Ok((voltage, current, output)) => {
                    details.push(("Voltage".to_string(), format!("{:.2}V", voltage)));
                    details.push(("Current".to_string(), format!("{:.3}A", current)));
                    details.push((
                        "Output".to_string(),
                        if output { "ON" } else { "OFF" }.to_string(),
                    ));
                },
                Err(e) => details.push(("Status Error".to_string(), e.to_string())),
            }
        }

        self.console
            .print_status("Power Hardware Status", connection_state(connected), &details);
        Ok(())
    }

    async fn enable_output(&self) -> CommandResult<()> {
        self.service
            .enable_output()
            .await
            .map_err(hw("Output enable"))?;
        log_hardware_operation!(Device::Power, "enable_output");
        self.console.success("Power output enabled");
        Ok(())
    }

    async fn disable_output(&self) -> CommandResult<()> {
        self.service
            .disable_output()
            .await
            .map_err(hw("Output disable"))?;
        log_hardware_operation!(Device::Power, "disable_output");
        self.console.print_message(
            MessageKind::Warning,
            "Power output disabled",
            Some("Output Disabled"),
        );
        Ok(())
    }

    async fn voltage(&self, info: &CommandInfo) -> CommandResult<()> {
        match info.first_argument() {
            None => {
                let volts = self
                    .service
                    .get_voltage()
                    .await
                    .map_err(hw("Voltage read"))?;
                self.console.info(&format!("Current voltage: {:.2}V", volts));
            },
            Some(arg) => {
                let volts = self.voltage.parse(arg)?;
                self.service
                    .set_voltage(volts)
                    .await
                    .map_err(hw("Voltage update"))?;
                log_hardware_operation!(Device::Power, "set_voltage", volts);
                self.console.success(&format!("Voltage set to {:.2}V", volts));
            },
        }
        Ok(())
    }

    async fn current(&self, info: &CommandInfo) -> CommandResult<()> {
        match info.first_argument() {
            None => {
                let amps = self
                    .service
                    .get_current()
                    .await
                    .map_err(hw("Current read"))?;
                self.console.info(&format!("Current reading: {:.3}A", amps));
            },
            Some(arg) => {
                let amps = self.current_limit.parse(arg)?;
                self.service
                    .set_current_limit(amps)
                    .await
                    .map_err(hw("Current limit update"))?;
                log_hardware_operation!(Device::Power, "set_current_limit", amps);
                self.console
                    .success(&format!("Current limit set to {:.3}A", amps));
            },
        }
        Ok(())
    }
}

impl<P: PowerService> HardwareCommandHandler for PowerCommandHandler<P> {
    fn device(&self) -> Device {
        Device::Power
    }

    fn console(&self) -> &Console {
        &self.console
    }

    fn get_help_info(&self) -> Vec<(&'static str, &'static str)> {
        help_from_table(COMMANDS)
    }

    async fn execute(&self, info: &CommandInfo) -> CommandResult<()> {
        match lookup(COMMANDS, info)? {
            PowerOp::Connect => self.connect().await,
            PowerOp::Disconnect => self.disconnect().await,
            PowerOp::Status => self.show_status().await,
            PowerOp::On => self.enable_output().await,
            PowerOp::Off => self.disable_output().await,
            PowerOp::Voltage => self.voltage(info).await,
            PowerOp::Current => self.current(info).await,
        }
    }
}
