//! Player swaps

use serde::{Deserialize, Serialize};

use super::cookie::Position;

/// An attempted exchange of two cells.
///
/// Stored with the smaller position first, so `Swap::new(a, b)` and
/// `Swap::new(b, a)` compare, hash and order the same.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Swap {
    a: Position,
    b: Position,
}

impl Swap {
    pub fn new(a: Position, b: Position) -> Self {
        if a <= b { Self { a, b } } else { Self { a: b, b: a } }
    }

    /// Convenience constructor from raw coordinates
    pub fn between(from: (usize, usize), to: (usize, usize)) -> Self {
        Self::new(Position::new(from.0, from.1), Position::new(to.0, to.1))
    }

    #[inline]
    pub fn first(&self) -> Position {
        self.a
    }

    #[inline]
    pub fn second(&self) -> Position {
        self.b
    }

    /// True when the two cells share an edge
    pub fn is_adjacent(&self) -> bool {
        self.a.is_adjacent(&self.b)
    }

    /// Where the cookie currently at `pos` ends up after the swap
    #[inline]
    pub(crate) fn mirror(&self, pos: Position) -> Position {
        if pos == self.a {
            self.b
        } else if pos == self.b {
            self.a
        } else {
            pos
        }
    }
}

impl std::fmt::Display for Swap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "({}, {}) <-> ({}, {})",
            self.a.column, self.a.row, self.b.column, self.b.row
        )
    }
}
