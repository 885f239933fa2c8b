//! Common test infrastructure for bootloader-update tests
//!
//! # Modules
//!
//! - `constants`: Payloads and query values shared across tests
//! - `mock_server`: Wiremock setup helpers for the update service
//! - `fixtures`: Settings and fake application binaries

#![allow(dead_code)]
#![allow(unused_imports)]

pub mod constants;
pub mod fixtures;
pub mod mock_server;

pub use constants::*;
pub use fixtures::*;
pub use mock_server::*;
