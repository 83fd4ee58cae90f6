//! Item data structure.
//!
//! This module defines the core `Item` struct representing a single todo
//! entry with its scheduling metadata and tags.

use chrono::{DateTime, Local};

use crate::fields::{Priority, TaskLength};

/// A single todo entry.
///
/// `due` and `start` are `None` when unset; the stores translate the on-disk
/// zero-timestamp sentinel to and from `None` at their boundary, so nothing
/// above the store layer ever sees the sentinel value.
#[derive(Debug, Clone, PartialEq)]
pub struct Item {
    pub id: u64,
    pub name: String,
    pub due: Option<DateTime<Local>>,
    pub start: Option<DateTime<Local>>,
    pub length: TaskLength,
    pub priority: Priority,
    pub finished: bool,
    /// Free-text labels in insertion order. Not deduplicated.
    pub tags: Vec<String>,
}

impl Item {
    /// A fresh unsaved item with the add-path defaults (short, normal, unfinished).
    pub fn draft(name: String) -> Self {
        Item {
            id: 0,
            name,
            due: None,
            start: None,
            length: TaskLength::Short,
            priority: Priority::Normal,
            finished: false,
            tags: Vec::new(),
        }
    }
}

/// Split comma-separated tag inputs, trimming whitespace and dropping empties.
/// Order is preserved and duplicates are kept.
pub fn split_tags(inputs: &[String]) -> Vec<String> {
    let mut tags = Vec::new();
    for raw in inputs {
        for part in raw.split(',') {
            let tag = part.trim();
            if !tag.is_empty() {
                tags.push(tag.to_string());
            }
        }
    }
    tags
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_tags_preserves_order_and_duplicates() {
        let input = vec!["work, urgent".to_string(), " home ,work".to_string()];
        assert_eq!(split_tags(&input), vec!["work", "urgent", "home", "work"]);
    }

    #[test]
    fn split_tags_drops_empty_parts() {
        let input = vec![",a,,b,".to_string(), "  ".to_string()];
        assert_eq!(split_tags(&input), vec!["a", "b"]);
    }
}
