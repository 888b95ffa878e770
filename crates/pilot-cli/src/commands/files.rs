//! Sandbox file commands

use super::App;
use crate::render;
use anyhow::{anyhow, Result};
use colored::Colorize;
use std::path::PathBuf;

pub async fn list(app: &App) -> Result<()> {
    app.sync().await?;

    if !app.console.session_state().active {
        println!("{}", "No active session, nothing to list.".yellow());
        return Ok(());
    }

    let files = app
        .busy("Listing files...", app.console.refresh_files())
        .await
        .map_err(|e| anyhow!("Failed to list files: {}", e))?;
    render::files(&files);
    Ok(())
}

pub async fn download(app: &App, key: &str, out: Option<PathBuf>) -> Result<()> {
    app.sync().await?;

    let dest = out.unwrap_or_else(|| app.settings.download_dir());
    let saved = app
        .busy(&format!("Downloading {}...", key), app.console.download(key, &dest))
        .await?;
    println!("  Saved to: {}", saved.display().to_string().dimmed());
    Ok(())
}

pub async fn add(app: &App, path: &str) -> Result<()> {
    app.sync().await?;

    app.busy("Adding file...", app.console.add_file(path)).await?;
    render::files(&app.console.files().await);
    Ok(())
}
