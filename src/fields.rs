//! Enumerations and field types for todo items.
//!
//! This module defines the structured value types attached to an item:
//! the effort estimate and the priority level, including their stable
//! on-disk integer codes.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Rough estimate of how long an item will take.
///
/// Persisted as the integer codes 0/1/2 in both the data file and the
/// SQLite backend, so the variant order must not change.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ValueEnum, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum TaskLength {
    #[value(alias = "s")]
    Short,
    #[value(alias = "m")]
    Medium,
    #[value(alias = "l")]
    Long,
}

impl TaskLength {
    /// Stable storage code (0 = short, 1 = medium, 2 = long).
    pub fn code(self) -> u8 {
        match self {
            TaskLength::Short => 0,
            TaskLength::Medium => 1,
            TaskLength::Long => 2,
        }
    }

    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(TaskLength::Short),
            1 => Some(TaskLength::Medium),
            2 => Some(TaskLength::Long),
            _ => None,
        }
    }

    /// Single-letter marker used in list output.
    pub fn letter(self) -> char {
        match self {
            TaskLength::Short => 'S',
            TaskLength::Medium => 'M',
            TaskLength::Long => 'L',
        }
    }
}

/// Item priority. Rank 1 is highest; never-due items sort by ascending rank.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ValueEnum, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "kebab-case")]
pub enum Priority {
    #[value(alias = "1")]
    High,
    #[value(alias = "2")]
    Normal,
    #[value(alias = "3")]
    Low,
}

impl Priority {
    /// Numeric rank (1 = high, 2 = normal, 3 = low), as stored on disk.
    pub fn rank(self) -> u8 {
        match self {
            Priority::High => 1,
            Priority::Normal => 2,
            Priority::Low => 3,
        }
    }

    pub fn from_rank(rank: u8) -> Option<Self> {
        match rank {
            1 => Some(Priority::High),
            2 => Some(Priority::Normal),
            3 => Some(Priority::Low),
            _ => None,
        }
    }
}

/// Format a priority level for display.
pub fn format_priority(p: Priority) -> &'static str {
    match p {
        Priority::High => "high",
        Priority::Normal => "normal",
        Priority::Low => "low",
    }
}

/// Format a task length for display.
pub fn format_length(l: TaskLength) -> &'static str {
    match l {
        TaskLength::Short => "short",
        TaskLength::Medium => "medium",
        TaskLength::Long => "long",
    }
}
