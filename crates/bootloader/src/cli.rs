//! CLI argument parsing with clap

use bootloader_core::{SettingsOverrides, DEFAULT_SETTINGS_FILE};
use camino::Utf8PathBuf;
use clap::{Args, Parser, Subcommand};

/// Bootloader - keeps a managed application binary up to date
#[derive(Parser, Debug)]
#[command(name = "bootloader")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to the settings file (JSON or YAML)
    #[arg(short, long, global = true, default_value = DEFAULT_SETTINGS_FILE)]
    pub config: Utf8PathBuf,

    /// Update service URL, overriding the settings file
    #[arg(long, global = true)]
    pub service_url: Option<String>,

    /// Application binary path, overriding the settings file
    #[arg(long, global = true)]
    pub app_path: Option<String>,

    /// Request timeout in seconds
    #[arg(long, global = true)]
    pub timeout: Option<u64>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

impl Cli {
    /// Settings overrides taken from the command line
    pub fn overrides(&self) -> SettingsOverrides {
        SettingsOverrides {
            update_service_url: self.service_url.clone(),
            application_path: self.app_path.clone(),
            timeout_secs: self.timeout,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Check for a newer version and install it (default)
    Run,

    /// Check for a newer version without installing it
    Check,

    /// Show bootloader and installed application versions
    Version(VersionArgs),
}

// Version command
#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_defaults_to_no_subcommand() {
        let cli = Cli::parse_from(["bootloader"]);
        assert!(cli.command.is_none());
        assert_eq!(cli.config.as_str(), DEFAULT_SETTINGS_FILE);
        assert_eq!(cli.verbose, 0);
    }

    #[test]
    fn test_overrides_from_flags() {
        let cli = Cli::parse_from([
            "bootloader",
            "check",
            "--service-url",
            "https://svc/check",
            "--app-path",
            "app.exe",
            "--timeout",
            "10",
        ]);

        assert!(matches!(cli.command, Some(Commands::Check)));
        let overrides = cli.overrides();
        assert_eq!(overrides.update_service_url.as_deref(), Some("https://svc/check"));
        assert_eq!(overrides.application_path.as_deref(), Some("app.exe"));
        assert_eq!(overrides.timeout_secs, Some(10));
    }

    #[test]
    fn test_version_json_flag() {
        let cli = Cli::parse_from(["bootloader", "-vv", "version", "--json"]);
        assert_eq!(cli.verbose, 2);
        assert!(matches!(cli.command, Some(Commands::Version(VersionArgs { json: true }))));
    }
}
