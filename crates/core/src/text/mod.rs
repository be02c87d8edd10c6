//! Positioned words and word-level diffs.

pub mod differ;

use serde::{Deserialize, Serialize};

use crate::utils::Rect;

pub use differ::WordDiffer;

/// A word extracted from a page, with its bounding box in unscaled page space.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Word {
    pub text: String,
    pub bbox: Rect,
}

impl Word {
    pub fn new(text: impl Into<String>, bbox: Rect) -> Self {
        Self {
            text: text.into(),
            bbox,
        }
    }
}

/// Direction of a word-level change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChangeType {
    Added,
    Removed,
}

/// A single changed word.
///
/// `bbox` is in the coordinate space of the page the word came from: the old
/// page for removals, the new page for additions.
#[derive(Debug, Clone, PartialEq)]
pub struct WordDiff {
    pub text: String,
    pub change: ChangeType,
    pub bbox: Rect,
}

impl WordDiff {
    pub fn added(text: impl Into<String>, bbox: Rect) -> Self {
        Self {
            text: text.into(),
            change: ChangeType::Added,
            bbox,
        }
    }

    pub fn removed(text: impl Into<String>, bbox: Rect) -> Self {
        Self {
            text: text.into(),
            change: ChangeType::Removed,
            bbox,
        }
    }
}

/// Produces the ordered word-level changes between two pages.
pub trait TextDiffer: Sync {
    fn diff(&self, old: &[Word], new: &[Word]) -> Vec<WordDiff>;
}
