use super::handlers::{
    report_failure, HardwareCommandHandler, LoadCellCommandHandler, McuCommandHandler,
    PowerCommandHandler, RobotCommandHandler,
};
use super::{CommandInfo, CommandParser, CommandType};
use crate::config::ConfigReader;
use crate::console::Console;
use crate::error::{CommandError, CommandResult};
use crate::hardware::mock::{MockLoadCell, MockMcu, MockPower, MockRobot, MockTiming};
use crate::hardware::{Device, LoadCellService, McuService, PowerService, RobotService};

/// One service client per instrument.
#[derive(Debug)]
pub struct HardwareServices<R, M, L, P> {
    pub robot: R,
    pub mcu: M,
    pub loadcell: L,
    pub power: P,
}

pub type MockServices = HardwareServices<MockRobot, MockMcu, MockLoadCell, MockPower>;

impl MockServices {
    pub fn mock(timing: MockTiming) -> Self {
        Self {
            robot: MockRobot::new(timing),
            mcu: MockMcu::new(timing),
            loadcell: MockLoadCell::new(timing),
            power: MockPower::new(timing),
        }
    }
}

/// `true` when the trimmed text starts with `/`.
pub fn is_slash_command(text: &str) -> bool {
    text.trim_start().starts_with('/')
}

fn namespace_description(command_type: CommandType) -> &'static str {
    match command_type {
        CommandType::Robot => "Control robot hardware (AJINEXTEK)",
        CommandType::Mcu => "Control MCU hardware (LMA Temperature)",
        CommandType::LoadCell => "Control LoadCell hardware (BS205)",
        CommandType::Power => "Control Power supply hardware (ODA)",
        CommandType::All => "Show all hardware status",
        CommandType::Help => "Show help information",
    }
}

const GENERAL_EXAMPLES: &str = "/robot connect        - Connect to robot
/mcu temp 85.0        - Set MCU temperature to 85°C
/loadcell monitor     - Start force monitoring
/power voltage 24.0   - Set power voltage to 24V
/all status           - Show all hardware status
/help robot           - Show robot command help";

fn device_examples(device: Device) -> &'static str {
    match device {
        Device::Robot => "/robot connect    - Connect to robot
/robot init       - Initialize robot axes
/robot status     - Show robot status
/robot stop       - Emergency stop",
        Device::Mcu => "/mcu connect      - Connect to MCU
/mcu temp         - Get current temperature
/mcu temp 85.0    - Set temperature to 85°C
/mcu fan 75       - Set fan speed to 75%
/mcu testmode     - Enter test mode",
        Device::LoadCell => "/loadcell connect   - Connect to LoadCell
/loadcell read      - Read current force
/loadcell zero      - Zero calibration
/loadcell monitor   - Start real-time monitoring
/loadcell monitor 10 - Take ten readings, then stop",
        Device::Power => "/power connect        - Connect to Power supply
/power on             - Enable output
/power voltage 24.0   - Set voltage to 24V
/power current 2.5    - Set current limit to 2.5A
/power off            - Disable output",
    }
}

/// Entry point for slash commands: parses input, routes it to the matching
/// handler and renders every failure.
#[derive(Debug)]
pub struct SlashCommandHandler<R, M, L, P> {
    parser: CommandParser,
    console: Console,
    robot: RobotCommandHandler<R>,
    mcu: McuCommandHandler<M>,
    loadcell: LoadCellCommandHandler<L>,
    power: PowerCommandHandler<P>,
}

pub type MockSlashCommandHandler = SlashCommandHandler<MockRobot, MockMcu, MockLoadCell, MockPower>;

impl<R, M, L, P> SlashCommandHandler<R, M, L, P>
where
    R: RobotService,
    M: McuService,
    L: LoadCellService,
    P: PowerService,
{
    pub fn new(
        services: HardwareServices<R, M, L, P>,
        console: Console,
        config: Option<&ConfigReader>,
    ) -> Self {
        Self {
            parser: CommandParser::new(),
            robot: RobotCommandHandler::new(services.robot, console.clone(), config),
            mcu: McuCommandHandler::new(services.mcu, console.clone(), config),
            loadcell: LoadCellCommandHandler::new(services.loadcell, console.clone(), config),
            power: PowerCommandHandler::new(services.power, console.clone(), config),
            console,
        }
    }

    pub fn console(&self) -> &Console {
        &self.console
    }

    pub fn robot(&self) -> &RobotCommandHandler<R> {
        &self.robot
    }

    pub fn mcu(&self) -> &McuCommandHandler<M> {
        &self.mcu
    }

    pub fn loadcell(&self) -> &LoadCellCommandHandler<L> {
        &self.loadcell
    }

    pub fn power(&self) -> &PowerCommandHandler<P> {
        &self.power
    }

    pub fn is_slash_command(&self, text: &str) -> bool {
        is_slash_command(text)
    }

    /// Run one input line. `true` on success; failures have already been
    /// rendered.
    pub async fn execute_command(&self, input: &str) -> bool {
        self.execute(input).await.is_ok()
    }

    /// Run one input line and return the typed failure, if any.
    pub async fn execute(&self, input: &str) -> CommandResult<()> {
        tracing::debug!(command = input.trim(), "Executing slash command");

        let Some(info) = self.parser.parse_command(input) else {
            let err = CommandError::Parse {
                input: input.trim().to_string(),
            };
            self.report(input, &err);
            return Err(err);
        };

        if !self.parser.validate_command(&info) {
            let err = CommandError::Validation {
                input: info.raw_input.clone(),
            };
            report_failure(&self.console, &info, &err);
            return Err(err);
        }

        match info.command_type {
            CommandType::Help => {
                self.show_help(&info.arguments);
                Ok(())
            },
            CommandType::All => {
                self.show_all_status().await;
                Ok(())
            },
            CommandType::Robot => self.robot.dispatch(&info).await,
            CommandType::Mcu => self.mcu.dispatch(&info).await,
            CommandType::LoadCell => self.loadcell.dispatch(&info).await,
            CommandType::Power => self.power.dispatch(&info).await,
        }
    }

    fn report(&self, input: &str, err: &CommandError) {
        crate::log_command_error!(err, input.trim());
        self.console.error(&err.to_string());
    }

    /// Status of every instrument in order. A failing instrument is reported
    /// and the rest are still queried. Returns the number of failures.
    pub async fn show_all_status(&self) -> usize {
        self.console
            .print_header("All Hardware Status", "Overview of all hardware components");

        let mut failures = 0;
        for device in Device::ALL {
            let info = CommandInfo::status_for(device);
            let result = match device {
                Device::Robot => self.robot.execute(&info).await,
                Device::Mcu => self.mcu.execute(&info).await,
                Device::LoadCell => self.loadcell.execute(&info).await,
                Device::Power => self.power.execute(&info).await,
            };
            if let Err(e) = result {
                failures += 1;
                crate::log_command_error!(e, info.raw_input);
                self.console
                    .error(&format!("Failed to get {} status: {}", device.key(), e));
            }
            self.console.blank_line();
        }

        tracing::debug!(failures, "All hardware status complete");
        failures
    }

    fn show_help(&self, arguments: &[String]) {
        let device = arguments
            .first()
            .and_then(|name| CommandType::from_name(name))
            .and_then(|t| t.device());
        match device {
            Some(device) => self.show_specific_help(device),
            None => self.show_general_help(),
        }
    }

    fn show_general_help(&self) {
        self.console
            .print_header("Slash Commands", "Direct hardware control for the EOL tester");

        let rows: Vec<Vec<String>> = CommandType::ALL
            .iter()
            .map(|t| {
                let subcommands = match t {
                    CommandType::Help => "[command]".to_string(),
                    _ => t.subcommands().join(", "),
                };
                vec![
                    t.prefix().to_string(),
                    subcommands,
                    namespace_description(*t).to_string(),
                ]
            })
            .collect();
        self.console.print_table(
            "Available Commands",
            &["Command", "Subcommands", "Description"],
            &rows,
        );
        self.console.blank_line();
        self.console.print_panel("Usage Examples", GENERAL_EXAMPLES);
    }

    fn show_specific_help(&self, device: Device) {
        let command_type = CommandType::from(device);
        let help_info = match device {
            Device::Robot => self.robot.get_help_info(),
            Device::Mcu => self.mcu.get_help_info(),
            Device::LoadCell => self.loadcell.get_help_info(),
            Device::Power => self.power.get_help_info(),
        };

        self.console.print_header(
            &format!("{} Command Help", command_type.name().to_uppercase()),
            &format!("Detailed help for {} commands", command_type.prefix()),
        );
        let rows: Vec<Vec<String>> = help_info
            .into_iter()
            .map(|(name, description)| vec![name.to_string(), description.to_string()])
            .collect();
        self.console.print_table(
            &format!("{} Subcommands", command_type.prefix()),
            &["Subcommand", "Description"],
            &rows,
        );
        self.console.blank_line();
        self.console
            .print_panel(&format!("{} Examples", command_type.prefix()), device_examples(device));
    }
}

impl MockSlashCommandHandler {
    /// Slash command handler backed by simulated instruments.
    pub fn with_mock_hardware(console: Console, config: &ConfigReader) -> Self {
        Self::new(MockServices::mock(config.mock_timing()), console, Some(config))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::test_helpers::{
        fake_services, fast_config, CallLog, FakeLoadCell, FakeMcu, FakePower, FakeRobot,
    };
    use std::sync::Arc;

    type FakeHandler = SlashCommandHandler<FakeRobot, FakeMcu, FakeLoadCell, FakePower>;

    fn handler(log: &Arc<CallLog>) -> FakeHandler {
        SlashCommandHandler::new(fake_services(log), Console::buffered(), Some(&fast_config()))
    }

    #[test]
    fn test_is_slash_command() {
        assert!(is_slash_command("/robot status"));
        assert!(is_slash_command("   /help"));
        assert!(!is_slash_command("robot status"));
        assert!(!is_slash_command(""));
        assert!(!is_slash_command("exit"));
    }

    #[tokio::test]
    async fn test_parse_failure_is_reported() {
        let log = CallLog::new();
        let handler = handler(&log);
        assert!(!handler.execute_command("/scope on").await);
        assert!(handler
            .console()
            .contents()
            .contains("Invalid command format. Type '/help' for available commands."));

        let err = handler.execute("").await.unwrap_err();
        assert_eq!(err.to_error_code(), "PARSE_ERROR");
        assert!(log.calls().is_empty());
    }

    #[tokio::test]
    async fn test_routes_to_matching_handler() {
        let log = CallLog::new();
        let handler = handler(&log);
        assert!(handler.execute_command("/power off").await);
        assert!(handler.execute_command("/MCU FAN 50").await);
        assert_eq!(log.calls(), vec!["power.disable_output", "mcu.set_fan_speed"]);
    }

    #[tokio::test]
    async fn test_handler_failure_returns_false() {
        let log = CallLog::new();
        let handler = handler(&log);
        assert!(!handler.execute_command("/mcu fan 150").await);
        let err = handler.execute("/mcu fan 150").await.unwrap_err();
        assert_eq!(err.to_error_code(), "ARGUMENT_ERROR");
        assert_eq!(log.count("mcu.set_fan_speed"), 0);
    }

    #[tokio::test]
    async fn test_all_status_continues_past_failing_device() {
        let log = CallLog::new();
        log.fail_on("robot.is_connected");
        let handler = handler(&log);

        assert!(handler.execute_command("/all status").await);
        assert_eq!(
            log.calls(),
            vec![
                "robot.is_connected",
                "mcu.is_connected",
                "loadcell.is_connected",
                "power.is_connected"
            ]
        );

        let out = handler.console().contents();
        assert!(out.contains("All Hardware Status"));
        assert!(out.contains("Failed to get robot status"));
        let mcu = out.find("MCU Hardware Status").unwrap();
        let loadcell = out.find("LoadCell Hardware Status").unwrap();
        let power = out.find("Power Hardware Status").unwrap();
        assert!(mcu < loadcell && loadcell < power);
    }

    #[tokio::test]
    async fn test_all_status_counts_failures() {
        let log = CallLog::new();
        log.fail_on("mcu.is_connected");
        log.fail_on("power.is_connected");
        let handler = handler(&log);
        assert_eq!(handler.show_all_status().await, 2);
    }

    #[tokio::test]
    async fn test_general_help_lists_namespaces() {
        let handler = handler(&CallLog::new());
        assert!(handler.execute_command("/help").await);
        let out = handler.console().contents();
        for prefix in ["/robot", "/mcu", "/loadcell", "/power", "/all", "/help"] {
            assert!(out.contains(prefix), "missing {}", prefix);
        }
        assert!(out.contains("Control MCU hardware (LMA Temperature)"));
        assert!(out.contains("Usage Examples"));
    }

    #[tokio::test]
    async fn test_specific_help_shows_subcommands() {
        let handler = handler(&CallLog::new());
        assert!(handler.execute_command("/help MCU").await);
        let out = handler.console().contents();
        assert!(out.contains("MCU Command Help"));
        assert!(out.contains("Set fan speed with argument (0-100%)"));
        assert!(out.contains("/mcu fan 75"));
    }

    #[tokio::test]
    async fn test_unknown_help_topic_falls_back_to_general_help() {
        let handler = handler(&CallLog::new());
        assert!(handler.execute_command("/help all").await);
        assert!(handler.console().contents().contains("Available Commands"));
    }

    #[tokio::test]
    async fn test_mock_hardware_session() {
        let config = fast_config();
        let handler = MockSlashCommandHandler::with_mock_hardware(Console::buffered(), &config);
        assert!(!handler.execute_command("/power on").await);
        assert!(handler.execute_command("/power connect").await);
        assert!(handler.execute_command("/power on").await);
        assert!(handler.execute_command("/power voltage 12").await);
        assert!(handler.execute_command("/power status").await);
        assert!(handler
            .console()
            .contents()
            .contains("Power supply is not connected"));
    }
}
