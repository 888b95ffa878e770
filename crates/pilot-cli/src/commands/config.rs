//! Config command - Manage CLI configuration

use crate::config::{Settings, SettingsManager};
use anyhow::{Context, Result};
use colored::Colorize;

/// Set the agent backend URL
pub async fn set_server(url: &str) -> Result<()> {
    let mut settings = SettingsManager::load().context("Failed to load settings")?;

    // Validate URL format
    let url = url.trim().trim_end_matches('/');
    if !url.starts_with("http://") && !url.starts_with("https://") {
        anyhow::bail!(
            "Invalid URL: {}. URL must start with http:// or https://",
            url
        );
    }

    settings.api_url = url.to_string();
    SettingsManager::save(&settings).context("Failed to save settings")?;

    println!("{} Backend URL set to: {}", "✓".green(), url.cyan());
    println!("  Chat endpoint: {}", format!("{}/api/chat", url).dimmed());

    Ok(())
}

/// Show current configuration
pub async fn show(api_url: Option<&str>) -> Result<()> {
    let settings = SettingsManager::load().context("Failed to load settings")?;
    let effective = settings.client_config(api_url);

    println!("{}", "Pilot Configuration".bold().underline());
    println!();

    println!("{}", "Backend:".cyan().bold());
    println!("  API URL:         {}", effective.api_base);
    if effective.api_base != settings.api_url {
        println!("  {}", format!("(settings file: {})", settings.api_url).dimmed());
    }
    match settings.request_timeout_secs {
        Some(secs) => println!("  Request timeout: {}s", secs),
        None => println!("  Request timeout: {}", "none".dimmed()),
    }
    println!();

    println!("{}", "Console:".cyan().bold());
    println!("  Takeover poll:   every {}s", effective.poll_interval.as_secs());
    println!(
        "  File refresh:    {}ms after a reply mentions a file",
        settings.file_refresh_delay_ms
    );
    println!(
        "  Chat requires takeover: {}",
        if settings.require_takeover_for_chat {
            "yes".yellow()
        } else {
            "no".normal()
        }
    );
    println!("  Downloads:       {}", settings.download_dir().display());
    println!("  Quick commands:  {}", settings.quick_messages.len());
    println!();

    println!("{}", "Config Files:".cyan().bold());
    println!(
        "  Settings: {}",
        SettingsManager::settings_path()?.display().to_string().dimmed()
    );
    println!(
        "  Log file: {}",
        SettingsManager::log_path()?.display().to_string().dimmed()
    );

    Ok(())
}

/// Reset configuration to defaults
pub async fn reset(yes: bool) -> Result<()> {
    use dialoguer::Confirm;

    if !yes {
        let confirm = Confirm::new()
            .with_prompt("Are you sure you want to reset all configuration?")
            .default(false)
            .interact()?;

        if !confirm {
            println!("{}", "Reset cancelled.".yellow());
            return Ok(());
        }
    }

    SettingsManager::save(&Settings::default()).context("Failed to save default settings")?;

    println!("{} Configuration reset to defaults.", "✓".green());

    Ok(())
}
