//! Legacy desktop control endpoints

use super::App;
use anyhow::Result;

pub async fn take_over(app: &App) -> Result<()> {
    app.busy("Taking over desktop...", app.console.take_over_desktop())
        .await?;
    Ok(())
}

pub async fn release(app: &App) -> Result<()> {
    app.busy("Releasing desktop...", app.console.release_desktop())
        .await?;
    Ok(())
}
