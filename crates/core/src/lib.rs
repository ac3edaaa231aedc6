// SPDX-License-Identifier: MIT
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Domain types and pure translation logic shared by every other `triad-*` crate.
//!
//! Nothing here touches a filesystem, a socket, or a clock other than through the
//! [`Clock`] abstraction. `triad-storage` and `triad-adapters` build on these types;
//! `triad-engine` is the only crate that combines them with IO.

pub mod clock;
pub mod error;
pub mod issue;
pub mod mapper;
pub mod project;
pub mod status;
pub mod sync_metadata;

pub use clock::{Clock, FakeClock, SystemClock};
pub use error::AdapterError;
pub use issue::Issue;
pub use mapper::{
    map_board_to_primary, map_local_to_primary, map_primary_to_board, map_primary_to_local,
    map_priority_from_local, map_priority_to_local, map_type, MapAxis, MapError,
};
pub use project::Project;
pub use status::{BoardStatus, IssueType, LocalStatus, Priority, PrimaryStatus};
pub use sync_metadata::{SyncMetadata, SyncPhase, SyncWatermarks};

#[cfg(feature = "test-support")]
pub mod proptest_support;
