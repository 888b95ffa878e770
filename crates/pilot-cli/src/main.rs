//! Pilot CLI
//!
//! Terminal console for a remote browser-use agent: manage the sandbox
//! session, send commands, fetch produced files and take over the desktop.

mod commands;
mod config;
mod notifier;
mod render;

use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::Colorize;
use commands::App;
use pilot_core::PilotError;
use std::path::PathBuf;
use tracing::{error, info};
use tracing_appender::non_blocking::WorkerGuard;

#[derive(Parser)]
#[command(name = "pilot")]
#[command(author, version, about = "Pilot - console for a remote browser-use agent", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Backend URL, overrides settings and PILOT_API_URL
    #[arg(long, global = true)]
    api_url: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show session status
    Status,

    /// Create a browser session
    Create,

    /// Resume a paused session
    Resume,

    /// Pause the session, keeping its sandbox
    Pause,

    /// Terminate the session
    Terminate,

    /// Destroy the session and its sandbox
    Destroy {
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// Send a command to the agent
    Chat {
        /// Command text
        #[arg(required = true, trailing_var_arg = true)]
        text: Vec<String>,
    },

    /// Sandbox files
    Files {
        #[command(subcommand)]
        action: FilesAction,
    },

    /// Human takeover of the desktop
    Takeover {
        #[command(subcommand)]
        action: TakeoverAction,
    },

    /// Legacy desktop control
    Desktop {
        #[command(subcommand)]
        action: DesktopAction,
    },

    /// Interactive console
    Repl,

    /// Check configuration and backend reachability
    Doctor,

    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum FilesAction {
    /// List files in the sandbox
    List,
    /// Download a file by sandbox path or name
    Download {
        /// Sandbox path or file name
        file: String,
        /// Destination directory
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Register a sandbox file the agent did not list
    Add {
        /// Sandbox path
        path: String,
    },
}

#[derive(Subcommand)]
enum TakeoverAction {
    /// Show who controls the desktop
    Status,
    /// Switch control between you and the agent
    Toggle,
    /// Follow takeover changes until interrupted
    Watch,
}

#[derive(Subcommand)]
enum DesktopAction {
    /// Take control of the desktop
    Takeover,
    /// Give control back
    Release,
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Set the agent backend URL
    SetServer {
        /// Server URL (e.g., http://localhost:8100)
        url: String,
    },
    /// Show current configuration
    Show,
    /// Reset to default configuration
    Reset {
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

fn init_logging(verbose: bool, to_file: bool) -> Result<Option<WorkerGuard>> {
    let filter = if verbose {
        "pilot_cli=debug,pilot_core=debug"
    } else {
        "pilot_cli=info,pilot_core=warn"
    };

    // The interactive console owns the terminal, so its logs go to a file
    if to_file {
        let log_path = config::SettingsManager::log_path()?;
        let dir = log_path.parent().unwrap_or(std::path::Path::new("."));
        std::fs::create_dir_all(dir)?;

        let file_appender = tracing_appender::rolling::never(
            dir,
            log_path
                .file_name()
                .unwrap_or(std::ffi::OsStr::new("pilot.log")),
        );
        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(non_blocking)
            .with_ansi(false)
            .with_target(false)
            .init();

        return Ok(Some(guard));
    }

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    Ok(None)
}

async fn dispatch(command: Commands, api_url: Option<&str>) -> Result<()> {
    match command {
        Commands::Doctor => return commands::doctor::execute(api_url).await,
        Commands::Config { action } => {
            return match action {
                ConfigAction::SetServer { url } => commands::config::set_server(&url).await,
                ConfigAction::Show => commands::config::show(api_url).await,
                ConfigAction::Reset { yes } => commands::config::reset(yes).await,
            }
        }
        _ => {}
    }

    let app = App::open(api_url)?;
    match command {
        Commands::Status => commands::session::status(&app).await,
        Commands::Create => commands::session::create(&app).await,
        Commands::Resume => commands::session::resume(&app).await,
        Commands::Pause => commands::session::pause(&app).await,
        Commands::Terminate => commands::session::terminate(&app).await,
        Commands::Destroy { yes } => commands::session::destroy(&app, yes).await,
        Commands::Chat { text } => commands::chat::send(&app, &text).await,
        Commands::Files { action } => match action {
            FilesAction::List => commands::files::list(&app).await,
            FilesAction::Download { file, output } => {
                commands::files::download(&app, &file, output).await
            }
            FilesAction::Add { path } => commands::files::add(&app, &path).await,
        },
        Commands::Takeover { action } => match action {
            TakeoverAction::Status => commands::takeover::status(&app).await,
            TakeoverAction::Toggle => commands::takeover::toggle(&app).await,
            TakeoverAction::Watch => commands::takeover::watch(&app).await,
        },
        Commands::Desktop { action } => match action {
            DesktopAction::Takeover => commands::desktop::take_over(&app).await,
            DesktopAction::Release => commands::desktop::release(&app).await,
        },
        Commands::Repl => commands::repl::run(&app).await,
        Commands::Doctor | Commands::Config { .. } => Ok(()),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let is_repl = matches!(cli.command, Commands::Repl);
    let _log_guard = init_logging(cli.verbose, is_repl)?;
    info!("Starting Pilot CLI");

    let result = dispatch(cli.command, cli.api_url.as_deref()).await;

    if let Err(ref e) = result {
        error!("Command failed: {}", e);
        // Library errors were already shown as a notice
        if e.downcast_ref::<PilotError>().is_none() {
            eprintln!("{} {}", "Error:".red().bold(), e);
        }
        std::process::exit(1);
    }

    result
}
