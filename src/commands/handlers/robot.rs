use super::{
    base_status_details, connection_state, help_from_table, lookup, resolve_connection,
    CommandSpec, HardwareCommandHandler,
};
use crate::commands::CommandInfo;
use crate::config::ConfigReader;
use crate::console::{Console, MessageKind};
use crate::error::{CommandError, CommandResult};
use crate::hardware::{Device, HardwareError, RobotConnection, RobotService};
use crate::log_hardware_operation;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RobotOp {
    Connect,
    Disconnect,
    Status,
    Init,
    Stop,
}

const COMMANDS: &[CommandSpec<RobotOp>] = &[
    CommandSpec {
        name: "connect",
        op: RobotOp::Connect,
        description: "Connect to the robot hardware",
    },
    CommandSpec {
        name: "disconnect",
        op: RobotOp::Disconnect,
        description: "Disconnect from the robot hardware",
    },
    CommandSpec {
        name: "status",
        op: RobotOp::Status,
        description: "Show robot connection and motion status",
    },
    CommandSpec {
        name: "init",
        op: RobotOp::Init,
        description: "Initialize the robot system and axis configuration",
    },
    CommandSpec {
        name: "stop",
        op: RobotOp::Stop,
        description: "Execute emergency stop for immediate motion halt",
    },
];

fn hw(action: &'static str) -> impl FnOnce(HardwareError) -> CommandError {
    move |source| CommandError::hardware(Device::Robot, action, source)
}

/// `/robot` commands for the motion controller.
#[derive(Debug)]
pub struct RobotCommandHandler<R> {
    service: R,
    console: Console,
    connection: RobotConnection,
}

impl<R: RobotService> RobotCommandHandler<R> {
    pub fn new(service: R, console: Console, config: Option<&ConfigReader>) -> Self {
        let connection = resolve_connection(config, Device::Robot, RobotConnection::default);
        Self {
            service,
            console,
            connection,
        }
    }

    pub fn service(&self) -> &R {
        &self.service
    }

    pub fn connection(&self) -> &RobotConnection {
        &self.connection
    }

    async fn connect(&self) -> CommandResult<()> {
        self.console.info("Connecting to robot...");
        self.service
            .connect(&self.connection)
            .await
            .map_err(hw("Robot connection"))?;
        log_hardware_operation!(Device::Robot, "connect");
        self.console.success("Robot connected successfully");
        Ok(())
    }

    async fn disconnect(&self) -> CommandResult<()> {
        self.service
            .disconnect()
            .await
            .map_err(hw("Robot disconnection"))?;
        log_hardware_operation!(Device::Robot, "disconnect");
        self.console.success("Robot disconnected successfully");
        Ok(())
    }

    async fn show_status(&self) -> CommandResult<()> {
        let connected = self
            .service
            .is_connected()
            .await
            .map_err(hw("Robot status query"))?;

        let mut details = base_status_details(connected, "AJINEXTEK Motion Controller");
        details.push(("Axes".to_string(), "6 DOF".to_string()));
        if connected {
            match self.service.get_motion_status().await {
                Ok(status) => details.push(("Motion Status".to_string(), status.as_str().to_string())),
                Err(e) => details.push(("Status Error".to_string(), e.to_string())),
            }
        }

        self.console
            .print_status("Robot Hardware Status", connection_state(connected), &details);
        Ok(())
    }

    async fn initialize(&self) -> CommandResult<()> {
        self.console.info("Initializing robot...");
        let axis = self
            .service
            .get_primary_axis_id()
            .await
            .map_err(hw("Robot initialization"))?;
        self.service
            .home_axis(axis)
            .await
            .map_err(hw("Robot initialization"))?;
        log_hardware_operation!(Device::Robot, "init", axis);
        self.console.success("Robot initialized successfully");
        Ok(())
    }

    async fn emergency_stop(&self) -> CommandResult<()> {
        let axis = self
            .service
            .get_primary_axis_id()
            .await
            .map_err(hw("Emergency stop"))?;
        self.service
            .emergency_stop(axis)
            .await
            .map_err(hw("Emergency stop"))?;
        tracing::warn!(axis, "Emergency stop executed");
        self.console.print_message(
            MessageKind::Warning,
            &format!("Emergency stop executed for axis {}", axis),
            Some("Emergency Stop"),
        );
        Ok(())
    }
}

impl<R: RobotService> HardwareCommandHandler for RobotCommandHandler<R> {
    fn device(&self) -> Device {
        Device::Robot
    }

    fn console(&self) -> &Console {
        &self.console
    }

    fn get_help_info(&self) -> Vec<(&'static str, &'static str)> {
        help_from_table(COMMANDS)
    }

    async fn execute(&self, info: &CommandInfo) -> CommandResult<()> {
        match lookup(COMMANDS, info)? {
            RobotOp::Connect => self.connect().await,
            RobotOp::Disconnect => self.disconnect().await,
            RobotOp::Status => self.show_status().await,
            RobotOp::Init => self.initialize().await,
            RobotOp::Stop => self.emergency_stop().await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::{CommandParser, CommandType};
    use crate::test_utils::test_helpers::{CallLog, FakeRobot};
    use serde_json::json;

    fn handler(log: &std::sync::Arc<CallLog>) -> RobotCommandHandler<FakeRobot> {
        RobotCommandHandler::new(FakeRobot::new(log), Console::buffered(), None)
    }

    fn info(sub: &str) -> CommandInfo {
        CommandInfo::new(CommandType::Robot, Some(sub), vec![])
    }

    #[tokio::test]
    async fn test_connect_reports_success() {
        let log = CallLog::new();
        let handler = handler(&log);
        assert!(handler.handle_command(&info("connect")).await);
        assert_eq!(log.calls(), vec!["robot.connect"]);
        assert!(handler
            .console()
            .contents()
            .contains("✓ Robot connected successfully"));
    }

    #[tokio::test]
    async fn test_connection_params_come_from_config() {
        let config = ConfigReader::from_value(json!({
            "cli_config": { "commands": { "robot": { "connection": { "axis_id": 2 } } } }
        }));
        let handler = RobotCommandHandler::new(
            FakeRobot::new(&CallLog::new()),
            Console::buffered(),
            Some(&config),
        );
        assert_eq!(handler.connection().axis_id, 2);
        assert_eq!(handler.connection().irq_no, 7);
    }

    #[tokio::test]
    async fn test_status_when_disconnected_skips_motion_query() {
        let log = CallLog::new();
        let handler = handler(&log);
        assert!(handler.handle_command(&info("status")).await);
        assert_eq!(log.calls(), vec!["robot.is_connected"]);

        let out = handler.console().contents();
        assert!(out.contains("Robot Hardware Status [DISCONNECTED]"));
        assert!(out.contains("Type: AJINEXTEK Motion Controller"));
        assert!(out.contains("Axes: 6 DOF"));
        assert!(!out.contains("Motion Status"));
    }

    #[tokio::test]
    async fn test_status_motion_failure_becomes_detail_row() {
        let log = CallLog::new();
        log.fail_on("robot.get_motion_status");
        let handler = handler(&log);
        handler.handle_command(&info("connect")).await;

        assert!(handler.handle_command(&info("status")).await);
        let out = handler.console().contents();
        assert!(out.contains("[CONNECTED]"));
        assert!(out.contains("Status Error:"));
    }

    #[tokio::test]
    async fn test_init_homes_primary_axis() {
        let log = CallLog::new();
        let handler = handler(&log);
        assert!(handler.handle_command(&info("init")).await);
        assert_eq!(
            log.calls(),
            vec!["robot.get_primary_axis_id", "robot.home_axis"]
        );
        assert!(handler
            .console()
            .contents()
            .contains("Robot initialized successfully"));
    }

    #[tokio::test]
    async fn test_stop_is_warning_styled() {
        let log = CallLog::new();
        let handler = handler(&log);
        assert!(handler.handle_command(&info("stop")).await);
        assert_eq!(log.count("robot.emergency_stop"), 1);
        assert!(handler
            .console()
            .contents()
            .contains("⚠ Emergency Stop: Emergency stop executed for axis 0"));
    }

    #[tokio::test]
    async fn test_service_failure_is_handled() {
        let log = CallLog::new();
        log.fail_on("robot.connect");
        let handler = handler(&log);
        assert!(!handler.handle_command(&info("connect")).await);

        let err = handler.execute(&info("connect")).await.unwrap_err();
        assert_eq!(err.to_error_code(), "HARDWARE_ERROR");
        assert!(handler
            .console()
            .contents()
            .contains("✗ Robot connection failed"));
    }

    #[tokio::test]
    async fn test_unknown_subcommand_is_validation_error() {
        let handler = handler(&CallLog::new());
        let err = handler.execute(&info("dance")).await.unwrap_err();
        assert!(matches!(err, CommandError::Validation { .. }));
    }

    #[test]
    fn test_help_covers_every_subcommand() {
        let handler = handler(&CallLog::new());
        let names: Vec<&str> = handler.get_help_info().iter().map(|(n, _)| *n).collect();
        assert_eq!(names, CommandType::Robot.subcommands());
        assert!(CommandParser::new().parse_command("/robot init").is_some());
    }
}
