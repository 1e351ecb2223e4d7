//! Batch and interactive execution of slash commands.

use std::io::IsTerminal;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::io::{AsyncBufRead, BufReader};

use crate::commands::slash::{is_slash_command, MockSlashCommandHandler};
use crate::commands::SlashCommandHandler;
use crate::config::{ConfigReader, HardwareMode};
use crate::console::Console;
use crate::error::{EolError, ErrorResponse, Result};
use crate::hardware::mock::{MockLoadCell, MockMcu, MockPower, MockRobot};
use crate::hardware::{LoadCellService, McuService, PowerService, RobotService};
use crate::shell::{LineEditor, LineSource, ReaderLines, ShellInput, PROMPT};

pub const DEFAULT_DEMO_SCRIPT: &str = "slash_commands_demo.txt";

const DEMO_SCRIPT: &str = "\
# EOL Tester Slash Commands Demo Script
# Lines starting with '#' are comments and are skipped.

# Show available commands
/help

# Check every instrument
/all status

# Robot
/robot status
/robot connect
/robot init

# MCU
/mcu status
/mcu connect
/mcu temp
/mcu temp 85.0
/mcu fan 75

# LoadCell
/loadcell status
/loadcell connect
/loadcell read
/loadcell zero

# Power supply
/power status
/power connect
/power voltage 24.0
/power current 2.5
/power on

# Final check
/all status
";

/// Outcome of one command in a batch.
#[derive(Debug, Clone, Serialize)]
pub struct CommandOutcome {
    pub command: String,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorResponse>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BatchReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub total: usize,
    pub successful: usize,
    pub results: Vec<CommandOutcome>,
}

impl BatchReport {
    fn empty() -> Self {
        let now = Utc::now();
        Self {
            started_at: now,
            finished_at: now,
            total: 0,
            successful: 0,
            results: Vec::new(),
        }
    }

    pub fn failed(&self) -> usize {
        self.total - self.successful
    }

    pub fn failed_commands(&self) -> impl Iterator<Item = &str> {
        self.results
            .iter()
            .filter(|r| !r.success)
            .map(|r| r.command.as_str())
    }

    pub fn all_succeeded(&self) -> bool {
        self.failed() == 0
    }

    /// `Err(BatchFailed)` when any command failed.
    pub fn into_result(self) -> Result<Self> {
        if self.all_succeeded() {
            Ok(self)
        } else {
            Err(EolError::BatchFailed {
                failed: self.failed(),
                total: self.total,
            })
        }
    }
}

/// Runs slash commands one at a time through a [`SlashCommandHandler`].
#[derive(Debug)]
pub struct SlashCommandExecutor<R, M, L, P> {
    handler: SlashCommandHandler<R, M, L, P>,
}

pub type MockSlashCommandExecutor = SlashCommandExecutor<MockRobot, MockMcu, MockLoadCell, MockPower>;

/// Executor over the simulated instruments selected by `config`.
///
/// Fails with `UnsupportedHardwareMode` when the configuration asks for real
/// hardware.
pub fn create_executor(config: &ConfigReader, console: Console) -> Result<MockSlashCommandExecutor> {
    match config.hardware_mode()? {
        HardwareMode::Mock => {
            tracing::debug!("Using mock hardware services");
            Ok(SlashCommandExecutor::new(
                MockSlashCommandHandler::with_mock_hardware(console, config),
            ))
        },
        HardwareMode::Real => Err(EolError::UnsupportedHardwareMode(
            config.hardware_mode_name(),
        )),
    }
}

/// Write the demo command script to `path`, replacing any existing file.
pub fn create_demo_script(path: &Path) -> Result<()> {
    std::fs::write(path, DEMO_SCRIPT)?;
    tracing::info!(path = %path.display(), "Demo script created");
    Ok(())
}

impl<R, M, L, P> SlashCommandExecutor<R, M, L, P>
where
    R: RobotService,
    M: McuService,
    L: LoadCellService,
    P: PowerService,
{
    pub fn new(handler: SlashCommandHandler<R, M, L, P>) -> Self {
        Self { handler }
    }

    pub fn handler(&self) -> &SlashCommandHandler<R, M, L, P> {
        &self.handler
    }

    fn console(&self) -> &Console {
        self.handler.console()
    }

    pub async fn execute_single_command(&self, command: &str) -> bool {
        tracing::info!(command, "Executing command");
        let success = self.handler.execute_command(command).await;
        if !success {
            tracing::debug!(command, "Command did not succeed");
        }
        success
    }

    /// Run `commands` in order, continuing past failures.
    pub async fn execute_command_list(&self, commands: &[String]) -> BatchReport {
        let console = self.console();
        let total = commands.len();
        let started_at = Utc::now();
        console.info(&format!("Executing {} commands...", total));

        let mut results = Vec::with_capacity(total);
        for (index, command) in commands.iter().enumerate() {
            console.blank_line();
            console.print_line(&format!("Command {}/{}: {}", index + 1, total, command));

            let outcome = match self.handler.execute(command).await {
                Ok(()) => {
                    console.success("Command completed");
                    CommandOutcome {
                        command: command.clone(),
                        success: true,
                        error: None,
                    }
                },
                Err(e) => {
                    console.error("Command failed");
                    CommandOutcome {
                        command: command.clone(),
                        success: false,
                        error: Some(e.to_error_response()),
                    }
                },
            };
            results.push(outcome);
        }

        let report = BatchReport {
            started_at,
            finished_at: Utc::now(),
            total,
            successful: results.iter().filter(|r| r.success).count(),
            results,
        };
        tracing::info!(
            total = report.total,
            successful = report.successful,
            "Batch execution finished"
        );
        self.print_summary(&report);
        report
    }

    fn print_summary(&self, report: &BatchReport) {
        let console = self.console();
        console.print_header("Execution Summary", "");
        console.print_line(&format!("Successful: {}/{}", report.successful, report.total));
        if !report.all_succeeded() {
            console.print_line("Failed commands:");
            for command in report.failed_commands() {
                console.print_line(&format!("  - {}", command));
            }
        }
    }

    /// Slash commands from a script file.
    ///
    /// Blank lines and `#` comments are skipped; any other line that does
    /// not start with `/` is skipped with a warning.
    pub fn load_script(&self, path: &Path) -> Result<Vec<String>> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            EolError::InvalidInput(format!("Cannot read {}: {}", path.display(), e))
        })?;

        let mut commands = Vec::new();
        for (number, line) in content.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            if is_slash_command(line) {
                commands.push(line.to_string());
            } else {
                tracing::warn!(line = number + 1, content = line, "Skipping non-slash line");
                self.console()
                    .warning(&format!("Skipping invalid line {}: {}", number + 1, line));
            }
        }
        Ok(commands)
    }

    pub async fn execute_from_file(&self, path: &Path) -> Result<BatchReport> {
        let commands = self.load_script(path)?;
        if commands.is_empty() {
            self.console()
                .warning(&format!("No commands found in {}", path.display()));
            return Ok(BatchReport::empty());
        }
        self.console()
            .info(&format!("Loaded {} commands from {}", commands.len(), path.display()));
        Ok(self.execute_command_list(&commands).await)
    }

    /// Interactive session on stdin. Returns the number of commands run.
    ///
    /// A terminal gets the line editor with completion and history; piped
    /// input is read as plain lines.
    pub async fn run_interactive(&self) -> Result<usize> {
        if std::io::stdin().is_terminal() {
            self.run_with(LineEditor::spawn()).await
        } else {
            self.run_session(BufReader::new(tokio::io::stdin())).await
        }
    }

    /// Read commands from `input` until `exit`, `quit`, end of input or
    /// Ctrl+C.
    pub async fn run_session<I>(&self, input: I) -> Result<usize>
    where
        I: AsyncBufRead + Unpin,
    {
        self.run_with(ReaderLines::new(input, self.console().clone()))
            .await
    }

    async fn run_with<S: LineSource>(&self, mut source: S) -> Result<usize> {
        let console = self.console();
        console.print_header(
            "EOL Tester Slash Commands",
            "Type '/help' for available commands, 'exit' to quit",
        );

        let mut executed = 0;
        loop {
            let line = match source.read_line(PROMPT).await? {
                ShellInput::Line(line) => line,
                ShellInput::Interrupted | ShellInput::Eof => break,
            };

            let input = line.trim();
            if input.is_empty() {
                continue;
            }
            if input.eq_ignore_ascii_case("exit") || input.eq_ignore_ascii_case("quit") {
                break;
            }
            if !is_slash_command(input) {
                console.warning("Commands must start with '/'. Try '/help'");
                continue;
            }

            self.execute_single_command(input).await;
            executed += 1;
        }

        tracing::info!(executed, "Interactive session ended");
        console.info("Goodbye!");
        Ok(executed)
    }
}
