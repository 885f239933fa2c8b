//! Check command: query the update service without installing

use anyhow::{Context, Result};
use bootloader_core::SettingsLoader;
use bootloader_update::{Bootloader, UpdateCheck};
use tokio_util::sync::CancellationToken;

use crate::output;

pub async fn run(loader: &SettingsLoader, cancel: &CancellationToken) -> Result<()> {
    let mut bootloader = Bootloader::from_loader(loader)
        .with_context(|| format!("Failed to load settings from {}", loader.settings_path()))?;

    let spinner = output::spinner("Checking for updates...");
    let report = bootloader.check(cancel).await;
    spinner.finish_and_clear();

    let report = report.context("Update check failed")?;
    output::info(&format!("Installed version: {}", report.current));

    match report.check {
        UpdateCheck::UpToDate => output::success("Already on the latest version"),
        UpdateCheck::Available(payload) => {
            output::success(&format!(
                "Update available ({} bytes)",
                payload.data.len()
            ));
            output::info("Run 'bootloader run' to install the update");
        }
    }

    Ok(())
}
