// SPDX-License-Identifier: MIT

//! `proptest` `Strategy` impls for the domain enums, used by property tests in
//! `triad-core` and `triad-engine` to check the field mapper is total and that
//! conflict resolution never panics regardless of input combination.

use crate::status::{BoardStatus, LocalStatus, Priority, PrimaryStatus};
use proptest::prelude::*;

pub fn primary_status() -> impl Strategy<Value = PrimaryStatus> {
    prop_oneof![
        Just(PrimaryStatus::Backlog),
        Just(PrimaryStatus::Todo),
        Just(PrimaryStatus::InProgress),
        Just(PrimaryStatus::Done),
        Just(PrimaryStatus::Cancelled),
    ]
}

pub fn board_status() -> impl Strategy<Value = BoardStatus> {
    prop_oneof![
        Just(BoardStatus::Todo),
        Just(BoardStatus::InProgress),
        Just(BoardStatus::InReview),
        Just(BoardStatus::Done),
        Just(BoardStatus::Cancelled),
    ]
}

pub fn local_status() -> impl Strategy<Value = LocalStatus> {
    prop_oneof![Just(LocalStatus::Open), Just(LocalStatus::Closed)]
}

pub fn priority() -> impl Strategy<Value = Priority> {
    prop_oneof![
        Just(Priority::NoPriority),
        Just(Priority::Low),
        Just(Priority::Medium),
        Just(Priority::High),
        Just(Priority::Urgent),
    ]
}
