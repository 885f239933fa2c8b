//! Self-update pipeline for the managed application
//!
//! Provides:
//! - Version resolution from the installed binary's embedded version resource
//! - Update checks against the configured update service
//! - Atomic replacement of the application binary
//! - The orchestrating state machine tying the steps together

pub mod applier;
pub mod client;
pub mod error;
pub mod updater;
pub mod version;

pub use applier::{AppliedUpdate, UpdateApplier};
pub use client::{UpdateCheck, UpdateClient, UpdatePayload};
pub use error::{Result, UpdateError};
pub use updater::{Bootloader, CheckReport, UpdateOutcome, UpdateState};
pub use version::{AppVersion, VersionResolver};

/// Current bootloader version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
