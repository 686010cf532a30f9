//! 2-D text positions.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// A zero-based line/character position in a text document.
///
/// Positions are immutable values: every operation returns a new `Position`.
/// Ordering is line-major — `(line, character)` lexicographic — which the
/// derived `Ord` provides because of field order.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Position {
    /// Zero-based line number.
    pub line: u32,
    /// Zero-based character offset within the line.
    pub character: u32,
}

impl Position {
    /// Create a new position.
    pub fn new(line: u32, character: u32) -> Self {
        Self { line, character }
    }

    /// True if this position is strictly before `other`.
    pub fn is_before(&self, other: Position) -> bool {
        *self < other
    }

    /// True if this position is before or equal to `other`.
    pub fn is_before_or_equal(&self, other: Position) -> bool {
        *self <= other
    }

    /// True if this position is strictly after `other`.
    pub fn is_after(&self, other: Position) -> bool {
        *self > other
    }

    /// True if this position is after or equal to `other`.
    pub fn is_after_or_equal(&self, other: Position) -> bool {
        *self >= other
    }

    /// True if this position equals `other`.
    pub fn is_equal(&self, other: Position) -> bool {
        *self == other
    }

    /// Compare line-major: line first, character second.
    pub fn compare_to(&self, other: Position) -> Ordering {
        self.cmp(&other)
    }

    /// Return a new position shifted by the given deltas.
    ///
    /// The host rejects translations that would go negative; here the
    /// unsigned fields make that unrepresentable and deltas saturate at zero.
    pub fn translate(&self, line_delta: i32, character_delta: i32) -> Position {
        Position {
            line: self.line.saturating_add_signed(line_delta),
            character: self.character.saturating_add_signed(character_delta),
        }
    }

    /// Return a new position with the line replaced.
    pub fn with_line(&self, line: u32) -> Position {
        Position { line, ..*self }
    }

    /// Return a new position with the character replaced.
    pub fn with_character(&self, character: u32) -> Position {
        Position { character, ..*self }
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.line, self.character)
    }
}
