//! Interactive console
//!
//! Plain lines are sent to the agent; lines starting with `/` control the
//! session. Errors are shown as notices and the prompt always comes back.

use super::App;
use crate::render;
use anyhow::Result;
use colored::Colorize;
use std::io::Write;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, info};

#[derive(Debug, PartialEq, Eq)]
enum Input {
    Empty,
    Send(String),
    Create,
    Resume,
    Pause,
    Terminate,
    Destroy,
    Status,
    History,
    Files,
    Download(String),
    Add(String),
    Takeover,
    DesktopTakeover,
    DesktopRelease,
    Prev,
    Next,
    Quick(Option<usize>),
    Help,
    Quit,
    Unknown(String),
}

fn parse(line: &str) -> Input {
    let line = line.trim();
    if line.is_empty() {
        return Input::Empty;
    }
    let Some(command) = line.strip_prefix('/') else {
        return Input::Send(line.to_string());
    };

    let (name, arg) = match command.split_once(char::is_whitespace) {
        Some((name, arg)) => (name, arg.trim()),
        None => (command, ""),
    };

    match name {
        "create" | "new" => Input::Create,
        "resume" => Input::Resume,
        "pause" | "close" => Input::Pause,
        "terminate" => Input::Terminate,
        "destroy" => Input::Destroy,
        "status" => Input::Status,
        "history" | "log" => Input::History,
        "files" => Input::Files,
        "download" if !arg.is_empty() => Input::Download(arg.to_string()),
        "add" if !arg.is_empty() => Input::Add(arg.to_string()),
        "takeover" => Input::Takeover,
        "desktop" if arg == "take" || arg == "takeover" => Input::DesktopTakeover,
        "desktop" if arg == "release" => Input::DesktopRelease,
        "prev" => Input::Prev,
        "next" => Input::Next,
        "quick" => Input::Quick(arg.parse().ok()),
        "help" | "?" => Input::Help,
        "quit" | "exit" | "q" => Input::Quit,
        _ => Input::Unknown(line.to_string()),
    }
}

pub async fn run(app: &App) -> Result<()> {
    info!("Interactive console started against {}", app.console.config().api_base);
    println!("{}", "Pilot - remote browser agent console".bold());
    println!("{}", "Type a command for the agent, or /help".dimmed());
    println!();

    if let Err(e) = app.sync().await {
        debug!("Initial sync failed: {}", e);
    }
    render::dashboard(&app.console.snapshot().await);
    println!();

    let _poll = app.console.spawn_takeover_polling();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        print!("{} ", "pilot>".cyan().bold());
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            println!();
            break;
        };

        match parse(&line) {
            Input::Empty => {}
            Input::Quit => break,
            Input::Send(text) => send(app, &text).await,
            Input::Create => {
                let _ = app.busy("Creating browser session...", app.console.create()).await;
                render::session(&app.console.session_state(), app.console.takeover_state());
            }
            Input::Resume => {
                let _ = app.busy("Resuming session...", app.console.resume()).await;
                render::session(&app.console.session_state(), app.console.takeover_state());
            }
            Input::Pause => {
                let _ = app.busy("Pausing session...", app.console.pause()).await;
            }
            Input::Terminate => {
                let _ = app.busy("Terminating session...", app.console.terminate()).await;
            }
            Input::Destroy => {
                let _ = app.busy("Destroying session...", app.console.destroy()).await;
            }
            Input::Status => {
                let _ = app.busy("Checking session...", app.console.check_status()).await;
                render::dashboard(&app.console.snapshot().await);
            }
            Input::History => render::messages(&app.console.messages().await),
            Input::Files => match app.busy("Listing files...", app.console.refresh_files()).await {
                Ok(files) => render::files(&files),
                Err(e) => println!("{} Failed to list files: {}", "✗".red(), e),
            },
            Input::Download(key) => {
                let dest = app.settings.download_dir();
                let label = format!("Downloading {}...", key);
                if let Ok(saved) = app.busy(&label, app.console.download(&key, &dest)).await {
                    println!("  Saved to: {}", saved.display().to_string().dimmed());
                }
            }
            Input::Add(path) => {
                let _ = app.busy("Adding file...", app.console.add_file(&path)).await;
            }
            Input::Takeover => {
                let _ = app
                    .busy("Switching control...", app.console.toggle_takeover())
                    .await;
            }
            Input::DesktopTakeover => {
                let _ = app.console.take_over_desktop().await;
            }
            Input::DesktopRelease => {
                let _ = app.console.release_desktop().await;
            }
            Input::Prev => {
                app.console.previous_step().await;
                render::preview(&app.console.display().await);
            }
            Input::Next => {
                app.console.next_step().await;
                render::preview(&app.console.display().await);
            }
            Input::Quick(None) => render::quick_messages(&app.console.config().quick_messages),
            Input::Quick(Some(n)) => {
                let picked = n
                    .checked_sub(1)
                    .and_then(|i| app.console.config().quick_messages.get(i))
                    .cloned();
                match picked {
                    Some(text) => {
                        println!("{} {}", ">".cyan().bold(), text);
                        send(app, &text).await;
                    }
                    None => println!("{} No quick command #{}", "✗".red(), n),
                }
            }
            Input::Help => help(),
            Input::Unknown(line) => {
                println!("{} Unknown command: {} (try /help)", "✗".red(), line);
            }
        }
    }

    info!("Interactive console closed");
    Ok(())
}

async fn send(app: &App, text: &str) {
    let before = app.console.display().await;
    let Ok(outcome) = app.busy("Agent is working...", app.console.send(text)).await else {
        return;
    };

    if let Some(message) = app
        .console
        .messages()
        .await
        .iter()
        .find(|m| m.id == outcome.id)
    {
        render::message(message);
    }

    let after = app.console.display().await;
    if after != before {
        render::preview(&after);
    }
}

fn help() {
    println!("{}", "Commands:".cyan().bold());
    let rows = [
        ("<text>", "Send a command to the agent"),
        ("/create", "Create a browser session"),
        ("/resume", "Resume a paused session"),
        ("/pause", "Pause the session, keeping the sandbox"),
        ("/terminate", "Terminate the session"),
        ("/destroy", "Destroy the session and its sandbox"),
        ("/status", "Refresh and show session state"),
        ("/history", "Show the transcript"),
        ("/files", "List sandbox files"),
        ("/download <path|name>", "Download a sandbox file"),
        ("/add <path>", "Register a sandbox file"),
        ("/takeover", "Toggle human control of the desktop"),
        ("/desktop take|release", "Legacy desktop control"),
        ("/prev, /next", "Step through completed commands"),
        ("/quick [n]", "List or send a quick command"),
        ("/quit", "Leave the console"),
    ];
    for (command, description) in rows {
        println!("  {:<24} {}", command, description.dimmed());
    }
}
