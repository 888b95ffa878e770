//! Takeover commands

use super::App;
use anyhow::{anyhow, Result};
use colored::Colorize;
use std::time::Duration;
use tracing::debug;

pub async fn status(app: &App) -> Result<()> {
    app.sync().await?;

    if app.console.session_state().active {
        app.console
            .check_takeover()
            .await
            .map_err(|e| anyhow!("Failed to check takeover status: {}", e))?;
    }
    print_state(app);
    Ok(())
}

pub async fn toggle(app: &App) -> Result<()> {
    app.sync().await?;

    app.busy("Switching control...", app.console.toggle_takeover())
        .await?;
    print_state(app);
    Ok(())
}

/// Follow takeover changes until interrupted
pub async fn watch(app: &App) -> Result<()> {
    app.sync().await?;

    let poll = app.console.spawn_takeover_polling();
    let mut session = app.console.subscribe();
    let mut refresh = tokio::time::interval(Duration::from_millis(500));
    let mut last = None;

    println!("{}", "Watching takeover status, Ctrl+C to stop".dimmed());
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            changed = session.changed() => {
                if changed.is_err() {
                    break;
                }
            }
            _ = refresh.tick() => {}
        }

        let current = (
            app.console.session_state().active,
            app.console.takeover_state().is_active,
        );
        if last != Some(current) {
            debug!("Takeover view changed: {:?}", current);
            last = Some(current);
            print_state(app);
        }
    }

    poll.stop().await;
    Ok(())
}

fn print_state(app: &App) {
    let state = app.console.session_state();
    let takeover = app.console.takeover_state();
    if !state.active {
        println!("{} {}", "Takeover:".cyan().bold(), "no active session".dimmed());
    } else if takeover.is_active {
        println!("{} {}", "Takeover:".cyan().bold(), "on, you control the desktop".magenta());
    } else {
        println!("{} {}", "Takeover:".cyan().bold(), "off, the agent is in control");
    }
}
