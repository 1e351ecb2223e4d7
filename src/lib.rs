pub mod cli;
pub mod cli_handlers;
pub mod commands;
pub mod config;
pub mod console;
pub mod error;
pub mod executor;
pub mod hardware;
pub mod logging;
pub mod shell;

#[cfg(test)]
pub mod test_utils;
