// SPDX-License-Identifier: MIT
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Concrete backend adapters: one HTTP client per remote backend (Primary, Board)
//! and one subprocess client for the Local git-backed store.
//!
//! Everything here is a thin IO layer. Decisions about *what* to write and *when*
//! belong to `triad-engine`; these adapters only translate a fixed operation
//! surface into wire calls and classify failures into [`triad_core::AdapterError`].

pub mod board;
pub mod local;
pub mod primary;

pub use board::{BoardAdapter, BoardProject, BoardTask, HttpBoardAdapter};
pub use local::{CliLocalAdapter, LocalAdapter, LocalIssue};
pub use primary::{HttpPrimaryAdapter, PrimaryAdapter, PrimaryIssue, PrimaryProject};

#[cfg(any(test, feature = "test-support"))]
pub use board::FakeBoardAdapter;
#[cfg(any(test, feature = "test-support"))]
pub use local::FakeLocalAdapter;
#[cfg(any(test, feature = "test-support"))]
pub use primary::FakePrimaryAdapter;
