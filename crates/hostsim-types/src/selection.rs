//! Selections — a range plus a direction.

use crate::position::Position;
use crate::range::Range;
use serde::{Deserialize, Serialize};

/// A text selection: an anchored span with a moving end.
///
/// The host models selections as a subclass of `Range`; here the selection
/// is composition — `anchor` and `active` are stored, `start`/`end` are
/// derived — and the `Range` read API is provided by delegation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Selection {
    /// Where the selection started.
    pub anchor: Position,
    /// Where the cursor is.
    pub active: Position,
}

impl Selection {
    /// Create a selection from anchor and active positions.
    pub fn new(anchor: Position, active: Position) -> Self {
        Self { anchor, active }
    }

    /// A collapsed selection (caret) at `position`.
    pub fn cursor(position: Position) -> Self {
        Self {
            anchor: position,
            active: position,
        }
    }

    /// A forward selection covering `range`.
    pub fn from_range(range: Range) -> Self {
        Self {
            anchor: range.start,
            active: range.end,
        }
    }

    /// The earlier of anchor and active.
    pub fn start(&self) -> Position {
        self.anchor.min(self.active)
    }

    /// The later of anchor and active.
    pub fn end(&self) -> Position {
        self.anchor.max(self.active)
    }

    /// The selection's span as a plain range.
    pub fn as_range(&self) -> Range {
        Range::new(self.anchor, self.active)
    }

    /// True iff the anchor is strictly after the active position.
    pub fn is_reversed(&self) -> bool {
        self.anchor.is_after(self.active)
    }

    /// True if the selection is a caret (no spanned text).
    pub fn is_empty(&self) -> bool {
        self.anchor == self.active
    }

    /// True if the selection starts and ends on the same line.
    pub fn is_single_line(&self) -> bool {
        self.as_range().is_single_line()
    }

    /// True if `position` lies within the selection, inclusive on both ends.
    pub fn contains_position(&self, position: Position) -> bool {
        self.as_range().contains_position(position)
    }

    /// True if `other` lies entirely within the selection.
    pub fn contains_range(&self, other: Range) -> bool {
        self.as_range().contains_range(other)
    }

    /// The overlap between the selection's span and `other`.
    pub fn intersection(&self, other: Range) -> Option<Range> {
        self.as_range().intersection(other)
    }

    /// The smallest range covering the selection and `other`.
    pub fn union(&self, other: Range) -> Range {
        self.as_range().union(other)
    }
}

impl From<Selection> for Range {
    fn from(selection: Selection) -> Range {
        selection.as_range()
    }
}
