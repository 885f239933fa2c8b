//! Run command: check for a newer version and install it

use anyhow::{Context, Result};
use bootloader_core::SettingsLoader;
use bootloader_update::{Bootloader, UpdateOutcome};
use tokio_util::sync::CancellationToken;

use crate::output;

pub async fn run(loader: &SettingsLoader, cancel: &CancellationToken) -> Result<()> {
    let mut bootloader = Bootloader::from_loader(loader)
        .with_context(|| format!("Failed to load settings from {}", loader.settings_path()))?;

    let spinner = output::spinner("Checking for updates...");
    let outcome = bootloader.run(cancel).await;
    spinner.finish_and_clear();

    match outcome.context("Update failed")? {
        UpdateOutcome::UpToDate { .. } => {
            output::info("App is already up to date, ending update process");
        }
        UpdateOutcome::Updated { from, applied } => {
            output::success("Updated");
            output::kv("Previous version", &from.to_string());
            output::kv("Path", &applied.path.display().to_string());
            output::kv("Size", &format!("{} bytes", applied.bytes_written));
        }
    }

    Ok(())
}
