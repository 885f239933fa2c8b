//! Update orchestration
//!
//! Sequences one update run:
//! 1. Settings loaded and validated
//! 2. Installed version resolved
//! 3. Update service queried
//! 4. New binary written atomically
//!
//! "Already up to date" is a successful outcome, not an error. Every other
//! failure ends the run in [`UpdateState::Failed`] and is returned to the
//! caller. Nothing is retried.

use bootloader_core::{SettingsLoader, ValidatedSettings};
use std::fmt;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use crate::applier::{AppliedUpdate, UpdateApplier};
use crate::client::{UpdateCheck, UpdateClient};
use crate::error::{Result, UpdateError};
use crate::version::{AppVersion, VersionResolver};

/// States of an update run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateState {
    Start,
    ConfigLoaded,
    VersionResolved,
    UpdateChecked,
    UpToDate,
    Applied,
    Failed,
}

impl UpdateState {
    /// Whether the run has ended
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::UpToDate | Self::Applied | Self::Failed)
    }
}

impl fmt::Display for UpdateState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Start => "start",
            Self::ConfigLoaded => "config-loaded",
            Self::VersionResolved => "version-resolved",
            Self::UpdateChecked => "update-checked",
            Self::UpToDate => "up-to-date",
            Self::Applied => "applied",
            Self::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Successful end of an update run
#[derive(Debug)]
pub enum UpdateOutcome {
    /// The service has nothing newer than `current`
    UpToDate { current: AppVersion },

    /// A new binary replaced the one at version `from`
    Updated {
        from: AppVersion,
        applied: AppliedUpdate,
    },
}

/// Result of a check that does not write anything
#[derive(Debug)]
pub struct CheckReport {
    /// Installed version
    pub current: AppVersion,

    /// Service answer
    pub check: UpdateCheck,
}

/// Update orchestrator for the managed application
pub struct Bootloader {
    /// Validated settings
    settings: ValidatedSettings,

    /// Update service client
    client: UpdateClient,

    /// Current state of the run
    state: UpdateState,
}

impl Bootloader {
    /// Create an orchestrator from already validated settings
    pub fn new(settings: ValidatedSettings) -> Result<Self> {
        let client = UpdateClient::new(settings.network())?;

        let mut bootloader = Self {
            settings,
            client,
            state: UpdateState::Start,
        };
        bootloader.transition(UpdateState::ConfigLoaded);
        Ok(bootloader)
    }

    /// Load settings through `loader` and create an orchestrator
    ///
    /// Fails before any network activity when settings are missing or invalid.
    pub fn from_loader(loader: &SettingsLoader) -> Result<Self> {
        let settings = loader.load().inspect_err(|e| {
            error!("Failed to load settings from {}: {}", loader.settings_path(), e);
        })?;
        Self::new(settings)
    }

    /// Current state of the run
    pub fn state(&self) -> UpdateState {
        self.state
    }

    /// Settings in use
    pub fn settings(&self) -> &ValidatedSettings {
        &self.settings
    }

    /// Run the full update flow
    pub async fn run(&mut self, cancel: &CancellationToken) -> Result<UpdateOutcome> {
        let result = self.run_steps(cancel).await;
        if let Err(e) = &result {
            self.fail(e);
        }
        result
    }

    /// Query the update service without writing anything
    pub async fn check(&mut self, cancel: &CancellationToken) -> Result<CheckReport> {
        let result = self.check_steps(cancel).await;
        if let Err(e) = &result {
            self.fail(e);
        }
        result
    }

    async fn run_steps(&mut self, cancel: &CancellationToken) -> Result<UpdateOutcome> {
        let CheckReport { current, check } = self.check_steps(cancel).await?;

        match check {
            UpdateCheck::UpToDate => {
                self.transition(UpdateState::UpToDate);
                info!("Application is already up to date at {}", current);
                Ok(UpdateOutcome::UpToDate { current })
            }
            UpdateCheck::Available(payload) => {
                let applied =
                    UpdateApplier::apply(self.settings.application_path(), &payload.data)?;
                self.transition(UpdateState::Applied);
                info!(
                    "Updated application from {} ({} bytes written)",
                    current, applied.bytes_written
                );
                Ok(UpdateOutcome::Updated {
                    from: current,
                    applied,
                })
            }
        }
    }

    async fn check_steps(&mut self, cancel: &CancellationToken) -> Result<CheckReport> {
        let current = VersionResolver::resolve(self.settings.application_path())?;
        self.transition(UpdateState::VersionResolved);

        let check = self
            .client
            .check(self.settings.update_service_url(), &current, cancel)
            .await?;
        self.transition(UpdateState::UpdateChecked);

        Ok(CheckReport { current, check })
    }

    fn transition(&mut self, next: UpdateState) {
        debug!("Update state: {} -> {}", self.state, next);
        self.state = next;
    }

    fn fail(&mut self, error: &UpdateError) {
        self.transition(UpdateState::Failed);
        error!("Update failed: {}", error);
    }
}
