// SPDX-License-Identifier: MIT
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Process wrapper around `triad-engine`: environment configuration, the
//! `/health` HTTP endpoint, the per-project provisioning sidecar, and the
//! `Daemon` assembly that `triad-cli` drives.

pub mod config;
pub mod error;
pub mod health_server;
pub mod provisioning;
pub mod sidecar;
pub mod wiring;

pub use config::{Config, ConfigError, RedactedConfig};
pub use error::DaemonError;
pub use wiring::{ConfiguredOrchestrator, ConfiguredScheduler, Daemon};
