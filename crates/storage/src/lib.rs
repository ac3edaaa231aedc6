// SPDX-License-Identifier: MIT
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! The durable embedded State Store: a single SQLite file holding `projects`,
//! `issues`, and a `sync_metadata` key/value table, behind an exclusive process lock.

pub mod error;
mod lock;
mod schema;
mod store;

pub use error::{Result, StoreError};
pub use schema::CURRENT_VERSION;
pub use store::Store;
