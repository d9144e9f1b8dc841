//! Level documents
//!
//! A level is a JSON document describing the board shape, the move budget and
//! the score needed to win. Tile rows are listed top row first, the way they
//! read in a text editor; the engine stores row 0 at the bottom.

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};
use crate::sim::grid::Array2D;
use crate::sim::CookieType;

/// Per-cell limit on which kinds may spawn there
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileRestriction {
    pub column: usize,
    /// Row counted from the bottom
    pub row: usize,
    pub allowed: Vec<CookieType>,
}

/// Parsed level document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelDefinition {
    /// Board shape, top row first; 1 = playable, 0 = not part of the board
    pub tiles: Vec<Vec<u8>>,
    pub target_score: u32,
    #[serde(alias = "maximumMoves")]
    pub moves: u32,
    #[serde(default)]
    pub restrictions: Vec<TileRestriction>,
}

impl LevelDefinition {
    /// Parse a level document. Structural checks happen in `validate`.
    pub fn from_json(json: &str) -> EngineResult<Self> {
        let definition: LevelDefinition = serde_json::from_str(json)
            .map_err(|err| EngineError::MalformedLevel(err.to_string()))?;
        definition.validate()?;
        Ok(definition)
    }

    /// Document name for level `number` (`Level_1`, `Level_2`, ...)
    pub fn file_stem(number: u32) -> String {
        format!("Level_{number}")
    }

    pub fn columns(&self) -> usize {
        self.tiles.first().map_or(0, Vec::len)
    }

    pub fn rows(&self) -> usize {
        self.tiles.len()
    }

    /// Reject documents the engine cannot build a board from
    pub fn validate(&self) -> EngineResult<()> {
        let columns = self.columns();
        if self.rows() == 0 || columns == 0 {
            return Err(EngineError::MalformedLevel("tiles are empty".into()));
        }
        if let Some(i) = self.tiles.iter().position(|r| r.len() != columns) {
            return Err(EngineError::MalformedLevel(format!(
                "tile row {i} has {} cells, expected {columns}",
                self.tiles[i].len()
            )));
        }
        if let Some(v) = self.tiles.iter().flatten().find(|v| **v > 1) {
            return Err(EngineError::MalformedLevel(format!(
                "tile value {v} is not 0 or 1"
            )));
        }
        if !self.tiles.iter().flatten().any(|v| *v == 1) {
            return Err(EngineError::MalformedLevel("no playable cells".into()));
        }
        if self.moves == 0 {
            return Err(EngineError::MalformedLevel("move budget is zero".into()));
        }
        for r in &self.restrictions {
            if r.column >= columns || r.row >= self.rows() {
                return Err(EngineError::MalformedLevel(format!(
                    "restriction at ({}, {}) is off the board",
                    r.column, r.row
                )));
            }
            if !self.is_playable(r.column, r.row) {
                return Err(EngineError::MalformedLevel(format!(
                    "restriction at ({}, {}) is on a hole",
                    r.column, r.row
                )));
            }
            if r.allowed.is_empty() {
                return Err(EngineError::MalformedLevel(format!(
                    "restriction at ({}, {}) allows no kinds",
                    r.column, r.row
                )));
            }
        }
        Ok(())
    }

    /// Playable flag for a bottom-based (column, row)
    fn is_playable(&self, column: usize, row: usize) -> bool {
        let file_row = self.rows() - 1 - row;
        self.tiles[file_row][column] == 1
    }

    /// Playable mask in engine coordinates. Call after `validate`.
    pub(crate) fn tile_mask(&self) -> Array2D<bool> {
        let (columns, rows) = (self.columns(), self.rows());
        let mut mask = Array2D::new(columns, rows, false);
        for row in 0..rows {
            for column in 0..columns {
                if self.is_playable(column, row) {
                    mask.put(column, row, true);
                }
            }
        }
        mask
    }

    /// Restriction lists in engine coordinates. Call after `validate`.
    pub(crate) fn restriction_mask(&self) -> Array2D<Option<Vec<CookieType>>> {
        let mut mask = Array2D::new(self.columns(), self.rows(), None);
        for r in &self.restrictions {
            mask.put(r.column, r.row, Some(r.allowed.clone()));
        }
        mask
    }
}
