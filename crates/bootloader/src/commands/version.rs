//! Version command

use anyhow::{Context, Result};
use bootloader_core::SettingsLoader;
use bootloader_update::{AppVersion, VersionResolver};
use serde::Serialize;

use crate::cli::VersionArgs;
use crate::output;
use crate::version::VersionInfo;

/// JSON shape of `bootloader version --json`
#[derive(Debug, Serialize)]
struct VersionReport {
    bootloader: VersionInfo,
    application_path: String,
    application: AppVersion,
}

pub fn run(args: VersionArgs, loader: &SettingsLoader) -> Result<()> {
    let info = VersionInfo::current();

    let settings = loader
        .load()
        .with_context(|| format!("Failed to load settings from {}", loader.settings_path()))?;
    let path = settings.application_path();
    let application = VersionResolver::resolve(path)
        .with_context(|| format!("Failed to read application version from {:?}", path))?;

    if args.json {
        let report = VersionReport {
            bootloader: info,
            application_path: path.display().to_string(),
            application,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{}", info.display());
        if let Some(commit) = &info.commit {
            println!("Commit:     {}", commit);
        }

        let installed = if application == AppVersion::default() {
            "not installed".to_string()
        } else {
            application.to_string()
        };
        output::kv("Application", &path.display().to_string());
        output::kv("Installed", &installed);
    }

    Ok(())
}
