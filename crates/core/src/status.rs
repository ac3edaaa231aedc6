// SPDX-License-Identifier: MIT

//! Status, priority, and type vocabularies for the three backends.
//!
//! These are pure value types; translation between them lives in [`crate::mapper`].

use serde::{Deserialize, Serialize};

/// Canonical status in Primary — the richest vocabulary of the three backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PrimaryStatus {
    Backlog,
    Todo,
    InProgress,
    Done,
    Cancelled,
}

impl PrimaryStatus {
    pub fn is_closed(self) -> bool {
        matches!(self, PrimaryStatus::Done | PrimaryStatus::Cancelled)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PrimaryStatus::Backlog => "Backlog",
            PrimaryStatus::Todo => "Todo",
            PrimaryStatus::InProgress => "InProgress",
            PrimaryStatus::Done => "Done",
            PrimaryStatus::Cancelled => "Cancelled",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Some(match s {
            "Backlog" => PrimaryStatus::Backlog,
            "Todo" => PrimaryStatus::Todo,
            "InProgress" => PrimaryStatus::InProgress,
            "Done" => PrimaryStatus::Done,
            "Cancelled" => PrimaryStatus::Cancelled,
            _ => return None,
        })
    }
}

impl std::fmt::Display for PrimaryStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Status as observed on the Board backend (wire form is lowercase).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BoardStatus {
    Todo,
    InProgress,
    InReview,
    Done,
    Cancelled,
}

impl BoardStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            BoardStatus::Todo => "todo",
            BoardStatus::InProgress => "inprogress",
            BoardStatus::InReview => "inreview",
            BoardStatus::Done => "done",
            BoardStatus::Cancelled => "cancelled",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Some(match s {
            "todo" => BoardStatus::Todo,
            "inprogress" => BoardStatus::InProgress,
            "inreview" => BoardStatus::InReview,
            "done" => BoardStatus::Done,
            "cancelled" => BoardStatus::Cancelled,
            _ => return None,
        })
    }
}

impl std::fmt::Display for BoardStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Status as observed on the Local backend — coarser than Primary or Board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LocalStatus {
    Open,
    Closed,
}

impl LocalStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            LocalStatus::Open => "open",
            LocalStatus::Closed => "closed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Some(match s {
            "open" => LocalStatus::Open,
            "closed" => LocalStatus::Closed,
            _ => return None,
        })
    }
}

impl std::fmt::Display for LocalStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Five-level issue priority, shared vocabulary across all three backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Priority {
    NoPriority,
    Low,
    Medium,
    High,
    Urgent,
}

impl Priority {
    pub fn as_str(self) -> &'static str {
        match self {
            Priority::NoPriority => "NoPriority",
            Priority::Low => "Low",
            Priority::Medium => "Medium",
            Priority::High => "High",
            Priority::Urgent => "Urgent",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Some(match s {
            "NoPriority" => Priority::NoPriority,
            "Low" => Priority::Low,
            "Medium" => Priority::Medium,
            "High" => Priority::High,
            "Urgent" => Priority::Urgent,
            _ => return None,
        })
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Issue type, identity-mapped across all three backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IssueType {
    Task,
    Bug,
    Feature,
    Epic,
    Chore,
}

impl IssueType {
    pub fn as_str(self) -> &'static str {
        match self {
            IssueType::Task => "task",
            IssueType::Bug => "bug",
            IssueType::Feature => "feature",
            IssueType::Epic => "epic",
            IssueType::Chore => "chore",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Some(match s {
            "task" => IssueType::Task,
            "bug" => IssueType::Bug,
            "feature" => IssueType::Feature,
            "epic" => IssueType::Epic,
            "chore" => IssueType::Chore,
            _ => return None,
        })
    }
}

impl std::fmt::Display for IssueType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
#[path = "status_tests.rs"]
mod tests;
