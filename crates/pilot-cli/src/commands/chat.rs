//! One-shot chat command

use super::App;
use crate::render;
use anyhow::Result;
use pilot_core::{PilotError, SendOutcome};

pub async fn send(app: &App, words: &[String]) -> Result<()> {
    app.sync().await?;

    let text = words.join(" ");
    let outcome = app
        .busy("Agent is working...", app.console.send(&text))
        .await?;

    let messages = app.console.messages().await;
    if let Some(message) = messages.iter().find(|m| m.id == outcome.id) {
        render::message(message);
    }

    let display = app.console.display().await;
    if !display.current_browser_url.is_empty() || !display.current_file_path.is_empty() {
        println!();
        render::preview(&display);
    }

    settled(&outcome)
}

/// A failed reply fails the command. The reply was already printed, so the
/// error is a library error that main does not repeat.
fn settled(outcome: &SendOutcome) -> Result<()> {
    if outcome.success {
        Ok(())
    } else {
        Err(PilotError::Backend(outcome.response.clone()).into())
    }
}
