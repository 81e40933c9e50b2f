//! devport CLI - List, stop and restart local development services
//!
//! A command-line tool for the processes listening on development ports.

mod commands;
mod logging;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use devport_core::{Config, ConfigStore, ErrorKind};

#[derive(Parser)]
#[command(name = "devport")]
#[command(author, version, about = "List, stop and restart local development services")]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Output in JSON format
    #[arg(long, global = true)]
    json: bool,

    /// Path to the configuration file (default: ~/.devport/config.json)
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// List services listening on development ports
    #[command(alias = "ls")]
    List {
        /// Filter by port number
        #[arg(short, long)]
        port: Option<u16>,

        /// Filter by process name
        #[arg(short = 'n', long)]
        name: Option<String>,
    },

    /// Stop a process (SIGTERM, then SIGKILL after a timeout)
    Stop {
        /// Process ID to stop
        pid: u32,
    },

    /// Stop a process and relaunch its command line
    Restart {
        /// Process ID to restart
        pid: u32,
    },

    /// Show or initialise the configuration
    Config {
        #[command(subcommand)]
        action: Option<ConfigAction>,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the effective configuration
    Show,
    /// Write the default configuration file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::from(exit_code(&e))
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let store = match cli.config {
        Some(path) => ConfigStore::with_path(path),
        None => ConfigStore::new()?,
    };

    match cli.command {
        Some(Commands::Config { action }) => match action.unwrap_or(ConfigAction::Show) {
            ConfigAction::Show => commands::config::show(&store, cli.json).await?,
            ConfigAction::Init { force } => commands::config::init(&store, force).await?,
        },
        command => {
            let config: Config = store.load().await?;
            tracing::debug!(path = %store.path().display(), "Loaded configuration");
            match command {
                Some(Commands::Stop { pid }) => {
                    commands::stop::run(&config, pid, cli.json).await?;
                }
                Some(Commands::Restart { pid }) => {
                    commands::restart::run(&config, pid, cli.json).await?;
                }
                Some(Commands::List { port, name }) => {
                    commands::list::run(&config, port, name, cli.json).await?;
                }
                // Default: list everything
                _ => commands::list::run(&config, None, None, cli.json).await?,
            }
        }
    }

    Ok(())
}

/// Map a failure to the process exit code.
fn exit_code(error: &anyhow::Error) -> u8 {
    let Some(error) = error.downcast_ref::<devport_core::Error>() else {
        return 1;
    };

    match error.kind() {
        ErrorKind::DiscoveryFailure => 2,
        ErrorKind::NotFound => 3,
        ErrorKind::SelfOperationForbidden => 4,
        ErrorKind::InspectionFailure => 5,
        ErrorKind::SignalFailure => 6,
        ErrorKind::RelaunchFailure => 7,
        ErrorKind::Config | ErrorKind::Io => 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_restart() {
        let cli = Cli::try_parse_from(["devport", "restart", "5555", "--json"]).unwrap();
        assert!(cli.json);
        assert!(matches!(cli.command, Some(Commands::Restart { pid: 5555 })));
    }

    #[test]
    fn test_rejects_non_numeric_pid() {
        assert!(Cli::try_parse_from(["devport", "stop", "abc"]).is_err());
    }

    #[test]
    fn test_exit_codes() {
        let forbidden = anyhow::Error::new(devport_core::Error::SelfOperation { pid: 1 });
        assert_eq!(exit_code(&forbidden), 4);

        let relaunch = anyhow::Error::new(devport_core::Error::Relaunch {
            pid: 1,
            command: "python app.py".into(),
            reason: "spawn failed".into(),
        });
        assert_eq!(exit_code(&relaunch), 7);

        assert_eq!(exit_code(&anyhow::anyhow!("other")), 1);
    }
}
