//! Session commands

use super::App;
use crate::render;
use anyhow::Result;
use colored::Colorize;
use dialoguer::Confirm;

pub async fn status(app: &App) -> Result<()> {
    app.sync().await?;

    let snapshot = app.console.snapshot().await;
    render::session(&snapshot.session, snapshot.takeover);
    if snapshot.session.can_chat() {
        println!("  Files:    {}", snapshot.files.len());
    } else {
        println!();
        println!("  Run: {}", "pilot create".dimmed());
    }
    Ok(())
}

pub async fn create(app: &App) -> Result<()> {
    let state = app
        .busy("Creating browser session...", app.console.create())
        .await?;
    if let Some(url) = state.live_stream_url() {
        println!("  Stream: {}", url.underline());
    }
    Ok(())
}

pub async fn resume(app: &App) -> Result<()> {
    let state = app.busy("Resuming session...", app.console.resume()).await?;
    if let Some(url) = state.live_stream_url() {
        println!("  Stream: {}", url.underline());
    }
    Ok(())
}

pub async fn pause(app: &App) -> Result<()> {
    app.busy("Pausing session...", app.console.pause()).await?;
    println!("  Resume later with: {}", "pilot resume".dimmed());
    Ok(())
}

pub async fn terminate(app: &App) -> Result<()> {
    app.busy("Terminating session...", app.console.terminate())
        .await?;
    Ok(())
}

pub async fn destroy(app: &App, yes: bool) -> Result<()> {
    if !yes {
        let confirm = Confirm::new()
            .with_prompt("Destroy the session and its sandbox? Files that were not downloaded are lost.")
            .default(false)
            .interact()?;
        if !confirm {
            println!("{}", "Destroy cancelled.".yellow());
            return Ok(());
        }
    }

    app.busy("Destroying session...", app.console.destroy())
        .await?;
    Ok(())
}
