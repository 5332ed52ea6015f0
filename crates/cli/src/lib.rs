pub mod commands;

use clap::{Parser, Subcommand};
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(
    name = "maitred",
    about = "Maitred operator CLI",
    long_about = "Operate the maitred booking engine: chat against it locally, inspect \
                  effective configuration, and validate runtime readiness.",
    after_help = "Examples:\n  maitred chat\n  maitred config\n  maitred doctor --json"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Start an interactive booking conversation against the configured oracle")]
    Chat {
        #[arg(long, help = "Session id to resume; a random one is generated when omitted")]
        session: Option<String>,
    },
    #[command(about = "Inspect effective configuration values with secret redaction")]
    Config,
    #[command(about = "Validate configuration and report structured status output")]
    Doctor {
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Chat { session } => commands::chat::run(session),
        Command::Config => {
            commands::CommandResult { exit_code: 0, output: commands::config::run() }
        }
        Command::Doctor { json } => commands::doctor::run(json),
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}
