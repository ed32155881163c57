//! Workout Timer CLI
//!
//! A terminal interval timer for workouts:
//! - AMRAP: count down from a configured number of minutes
//! - For Time: count up from zero
//! - EMOM: repeat a fixed-length round a configured number of times
//! - Tabata: eight cycles of 20 seconds work and 10 seconds rest

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use clap::{CommandFactory, Parser};

use wodtimer::cli::{Cli, Commands, Display, IpcClient};
use wodtimer::daemon::{self, ipc::default_socket_path, DaemonOptions};
use wodtimer::types::TimerPhase;

/// Polling period of `watch`
const WATCH_INTERVAL: Duration = Duration::from_secs(1);

/// Main entry point
#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();

    // Initialize logging
    init_tracing(cli.verbose);

    // Execute command
    if let Err(e) = execute(cli).await {
        Display::show_error(&format!("{:#}", e));
        std::process::exit(1);
    }
}

/// Initializes the tracing subscriber for logging.
fn init_tracing(verbose: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let default_level = if verbose { "info" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .init();
}

/// Resolves the socket path from `--socket` or the default location.
fn socket_path(cli_socket: Option<PathBuf>) -> Result<PathBuf> {
    match cli_socket {
        Some(path) => Ok(path),
        None => default_socket_path(),
    }
}

/// Executes the CLI command.
async fn execute(cli: Cli) -> Result<()> {
    if cli.verbose {
        tracing::info!("Verbose mode enabled");
    }

    let Some(command) = cli.command else {
        // No command provided, show help
        Cli::command().print_help()?;
        return Ok(());
    };

    match command {
        Commands::Daemon(args) => {
            let options = DaemonOptions {
                socket_path: socket_path(cli.socket)?,
                config: args.to_config(),
                mode: args.mode,
                bell: !args.no_bell,
            };
            daemon::run(options).await?;
        }
        Commands::Completions { shell } => {
            generate_completions(shell);
        }
        command => {
            let client = match cli.socket {
                Some(path) => IpcClient::with_socket_path(path),
                None => IpcClient::new()?,
            };
            run_client_command(&client, command).await?;
        }
    }

    Ok(())
}

/// Sends a timer command to the daemon and prints the result.
async fn run_client_command(client: &IpcClient, command: Commands) -> Result<()> {
    match command {
        Commands::Start => Display::show_command_result(&client.start().await?),
        Commands::Pause => Display::show_command_result(&client.pause().await?),
        Commands::Reset => Display::show_command_result(&client.reset().await?),
        Commands::Mode { mode } => {
            Display::show_command_result(&client.change_mode(mode).await?);
        }
        Commands::Config { field, value } => {
            Display::show_command_result(&client.edit_config(field, &value).await?);
        }
        Commands::Status => Display::show_status(&client.status().await?),
        Commands::Watch => watch(client).await?,
        Commands::Daemon(_) | Commands::Completions { .. } => {
            anyhow::bail!("Command does not talk to the daemon")
        }
    }
    Ok(())
}

/// Prints the timer once per second until it completes or Ctrl-C.
async fn watch(client: &IpcClient) -> Result<()> {
    let mut interval = tokio::time::interval(WATCH_INTERVAL);
    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = interval.tick() => {
                let response = client.status().await?;
                let Some(view) = response.data else {
                    anyhow::bail!("Daemon returned no status");
                };
                Display::show_watch_line(&view);
                if view.state == TimerPhase::Complete {
                    break;
                }
            }
            _ = &mut shutdown => break,
        }
    }

    println!();
    Ok(())
}

/// Generates shell completion scripts.
fn generate_completions(shell: clap_complete::Shell) {
    use clap_complete::generate;
    use std::io;

    let mut cmd = Cli::command();
    let bin_name = cmd.get_name().to_string();
    generate(shell, &mut cmd, bin_name, &mut io::stdout());
}

// ============================================================================
// Tests
// ============================================================================
