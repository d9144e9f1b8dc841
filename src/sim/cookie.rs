//! Cookies: the matchable pieces on the board

use serde::{Deserialize, Serialize};

/// Cookie kinds (the palette)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CookieType {
    Croissant,
    Cupcake,
    Danish,
    Donut,
    Macaroon,
    SugarCookie,
}

impl CookieType {
    /// Full palette in draw order
    pub const ALL: [CookieType; 6] = [
        CookieType::Croissant,
        CookieType::Cupcake,
        CookieType::Danish,
        CookieType::Donut,
        CookieType::Macaroon,
        CookieType::SugarCookie,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CookieType::Croissant => "Croissant",
            CookieType::Cupcake => "Cupcake",
            CookieType::Danish => "Danish",
            CookieType::Donut => "Donut",
            CookieType::Macaroon => "Macaroon",
            CookieType::SugarCookie => "SugarCookie",
        }
    }

    /// Single-letter tag used in board dumps
    pub fn symbol(&self) -> char {
        match self {
            CookieType::Croissant => 'C',
            CookieType::Cupcake => 'U',
            CookieType::Danish => 'D',
            CookieType::Donut => 'O',
            CookieType::Macaroon => 'M',
            CookieType::SugarCookie => 'S',
        }
    }

    pub fn from_symbol(ch: char) -> Option<Self> {
        CookieType::ALL
            .into_iter()
            .find(|kind| kind.symbol() == ch.to_ascii_uppercase())
    }
}

/// A cookie on the board.
///
/// `id` is stable for the cookie's lifetime so a presentation layer can track
/// it across falls. `column`/`row` always mirror the cell holding it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Cookie {
    pub id: u32,
    pub kind: CookieType,
    pub column: usize,
    pub row: usize,
}

impl Cookie {
    pub fn new(id: u32, kind: CookieType, column: usize, row: usize) -> Self {
        Self {
            id,
            kind,
            column,
            row,
        }
    }

    /// Board position of this cookie
    #[inline]
    pub fn position(&self) -> Position {
        Position::new(self.column, self.row)
    }
}

/// A (column, row) board coordinate. Row 0 is the bottom row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    pub column: usize,
    pub row: usize,
}

impl Position {
    pub const fn new(column: usize, row: usize) -> Self {
        Self { column, row }
    }

    /// True when the positions share an edge
    pub fn is_adjacent(&self, other: &Position) -> bool {
        matches!(
            (self.column.abs_diff(other.column), self.row.abs_diff(other.row)),
            (0, 1) | (1, 0)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_adjacency_is_manhattan_one() {
        let p = Position::new(3, 3);
        assert!(p.is_adjacent(&Position::new(4, 3)));
        assert!(p.is_adjacent(&Position::new(3, 2)));
        assert!(!p.is_adjacent(&Position::new(4, 4)));
        assert!(!p.is_adjacent(&Position::new(3, 3)));
        assert!(!p.is_adjacent(&Position::new(5, 3)));
    }

    #[test]
    fn test_far_positions_are_not_adjacent() {
        let origin = Position::new(0, 0);
        let far = Position::new(usize::MAX, usize::MAX);
        assert!(!origin.is_adjacent(&far));
        assert!(!far.is_adjacent(&origin));
        assert!(!origin.is_adjacent(&Position::new(usize::MAX, 0)));
    }

    #[test]
    fn test_cookie_kind_serializes_camel_case() {
        let json = serde_json::to_string(&CookieType::SugarCookie).unwrap();
        assert_eq!(json, "\"sugarCookie\"");
    }
}
