use std::path::PathBuf;

use clap::{Parser, Subcommand};

const LONG_ABOUT: &str = r#"
EOL Tester - slash-command console for end-of-line test station hardware

Instruments:
  /robot     AJINEXTEK motion controller
  /mcu       LMA temperature controller
  /loadcell  BS205 force indicator
  /power     ODA programmable power supply

Usage:
  eol shell                     ← Interactive session, type '/help' inside
  eol run /mcu temp 85.0        ← Run one command
  eol batch commands.txt        ← Run a script of commands
  eol demo                      ← Write a demo script to start from

Configuration:
  --config PATH, then $EOL_CONFIG, then ./configuration/cli_config.json,
  ./cli_config.json and ~/.eol-tester/cli_config.json
"#;

#[derive(Parser, Clone)]
#[command(name = "eol")]
#[command(about = "Slash-command console for EOL test station hardware")]
#[command(long_about = LONG_ABOUT)]
#[command(version)]
pub struct Cli {
    /// Enable verbose logging (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Only log errors
    #[arg(short, long)]
    pub quiet: bool,

    /// Output logs in JSON format
    #[arg(long)]
    pub json: bool,

    /// Configuration file to use instead of the search path
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Clone)]
pub enum Commands {
    /// Run a single slash command
    ///
    /// Words are joined with spaces, so quoting the whole command is optional.
    ///
    /// Examples:
    ///   eol run /robot status
    ///   eol run "/power voltage 24.0"
    Run {
        /// The slash command
        #[arg(required = true, num_args = 1.., allow_negative_numbers = true)]
        words: Vec<String>,

        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },

    /// Run slash commands from a script file
    ///
    /// Blank lines and lines starting with '#' are skipped. Exits with status
    /// 1 if any command fails.
    Batch {
        /// Script file, one slash command per line
        file: PathBuf,

        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },

    /// Write a demo command script
    Demo {
        /// Where to write the script
        #[arg(long, default_value = crate::executor::DEFAULT_DEMO_SCRIPT)]
        output: PathBuf,

        /// Overwrite an existing file without asking
        #[arg(long)]
        force: bool,
    },

    /// Start an interactive slash-command session
    Shell,

    /// Inspect the station configuration
    #[command(subcommand)]
    Config(ConfigCommands),
}

#[derive(Subcommand, Clone)]
pub enum ConfigCommands {
    /// Show the loaded configuration summary
    Show {
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },

    /// Check the configuration structure
    Validate,
}
