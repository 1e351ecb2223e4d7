// CLI command handlers module
//
// Commands: run, batch, shell, demo, config

pub mod command_runner;
pub mod config_commands;
pub mod demo;
pub mod utils;

pub use command_runner::{handle_batch_command, handle_run_command, handle_shell_command};
pub use config_commands::handle_config_command;
pub use demo::handle_demo_command;
pub use utils::{console_for_format, print_json};
