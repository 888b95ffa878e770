//! Doctor command - Diagnostics

use crate::config::SettingsManager;
use anyhow::Result;
use colored::Colorize;
use pilot_core::{Console, Notice, Notifier};
use std::sync::Arc;

/// Swallows notices; doctor reports results itself
struct Silent;

impl Notifier for Silent {
    fn notify(&self, _notice: Notice) {}
}

pub async fn execute(api_url: Option<&str>) -> Result<()> {
    println!("{}", "🔍 Pilot Diagnostics".blue().bold());
    println!();

    println!("{}", "System:".cyan());
    println!("   OS: {} {}", std::env::consts::OS, std::env::consts::ARCH);
    println!();

    println!("{}", "Configuration:".cyan());
    let settings = match SettingsManager::load() {
        Ok(settings) => {
            println!(
                "   {} Settings loaded from {}",
                "✓".green(),
                SettingsManager::settings_path()?.display().to_string().dimmed()
            );
            settings
        }
        Err(e) => {
            println!("   {} Failed to load settings: {}", "✗".red(), e);
            println!("      Run: {}", "pilot config reset".dimmed());
            return Ok(());
        }
    };
    let config = settings.client_config(api_url);
    println!("   API URL: {}", config.api_base.cyan());
    println!();

    println!("{}", "Backend:".cyan());
    let console = match Console::connect(config, Arc::new(Silent)) {
        Ok(console) => console,
        Err(e) => {
            println!("   {} {}", "✗".red(), e);
            return Ok(());
        }
    };

    match console.health().await {
        Ok(health) => {
            let version = health.version.unwrap_or_else(|| "unknown".to_string());
            println!(
                "   {} Reachable (status: {}, version: {})",
                "✓".green(),
                health.status,
                version.dimmed()
            );
        }
        Err(e) => {
            println!("   {} Backend not reachable: {}", "✗".red(), e);
            println!("      Check: {}", "pilot config set-server <url>".dimmed());
            println!();
            return Ok(());
        }
    }

    match console.check_status().await {
        Ok(state) if state.can_chat() => {
            println!("   {} Session active", "✓".green());
        }
        Ok(state) if state.active => {
            println!("   {} Session starting", "•".yellow());
        }
        Ok(_) => {
            println!("   {} No active session", "•".yellow());
            println!("      Run: {}", "pilot create".dimmed());
        }
        Err(e) => {
            println!("   {} Session status unavailable: {}", "✗".red(), e);
        }
    }
    println!();

    println!("{}", "Done!".green().bold());

    Ok(())
}
