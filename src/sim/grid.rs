//! Fixed-size board storage
//!
//! `Array2D` is a flat column/row container. `Grid` pairs a playable mask with
//! the cookie occupancy so "not part of the board" and "temporarily empty"
//! never get confused.

use serde::{Deserialize, Serialize};

use super::cookie::{Cookie, Position};
use crate::error::{EngineError, EngineResult};

/// Flat 2D array addressed by (column, row)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Array2D<T> {
    columns: usize,
    rows: usize,
    cells: Vec<T>,
}

impl<T: Clone> Array2D<T> {
    /// Create an array with every cell set to `fill`
    pub fn new(columns: usize, rows: usize, fill: T) -> Self {
        Self {
            columns,
            rows,
            cells: vec![fill; columns * rows],
        }
    }
}

impl<T> Array2D<T> {
    #[inline]
    pub fn columns(&self) -> usize {
        self.columns
    }

    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[inline]
    pub fn contains(&self, column: usize, row: usize) -> bool {
        column < self.columns && row < self.rows
    }

    fn index(&self, column: usize, row: usize) -> EngineResult<usize> {
        if self.contains(column, row) {
            Ok(row * self.columns + column)
        } else {
            Err(EngineError::OutOfBounds {
                column,
                row,
                columns: self.columns,
                rows: self.rows,
            })
        }
    }

    pub fn get(&self, column: usize, row: usize) -> EngineResult<&T> {
        let i = self.index(column, row)?;
        Ok(&self.cells[i])
    }

    pub fn get_mut(&mut self, column: usize, row: usize) -> EngineResult<&mut T> {
        let i = self.index(column, row)?;
        Ok(&mut self.cells[i])
    }

    pub fn set(&mut self, column: usize, row: usize, value: T) -> EngineResult<()> {
        *self.get_mut(column, row)? = value;
        Ok(())
    }

    /// Store at a cell the caller already knows is in bounds
    #[inline]
    pub(crate) fn put(&mut self, column: usize, row: usize, value: T) {
        debug_assert!(self.contains(column, row));
        self.cells[row * self.columns + column] = value;
    }

    /// Iterate `(column, row, &value)` bottom row first, left to right
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, &T)> {
        let columns = self.columns;
        self.cells
            .iter()
            .enumerate()
            .map(move |(i, v)| (i % columns, i / columns, v))
    }
}

/// Contents of one board cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Cell {
    #[default]
    Empty,
    Occupied(Cookie),
}

impl Cell {
    #[inline]
    pub fn cookie(&self) -> Option<Cookie> {
        match self {
            Cell::Empty => None,
            Cell::Occupied(cookie) => Some(*cookie),
        }
    }
}

/// The board: playable mask plus occupancy
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Grid {
    tiles: Array2D<bool>,
    cells: Array2D<Cell>,
}

impl Grid {
    /// Build a grid from a playable mask. All cells start empty.
    pub fn new(tiles: Array2D<bool>) -> Self {
        let cells = Array2D::new(tiles.columns(), tiles.rows(), Cell::Empty);
        Self { tiles, cells }
    }

    #[inline]
    pub fn columns(&self) -> usize {
        self.tiles.columns()
    }

    #[inline]
    pub fn rows(&self) -> usize {
        self.tiles.rows()
    }

    pub fn is_playable(&self, column: usize, row: usize) -> EngineResult<bool> {
        self.tiles.get(column, row).copied()
    }

    pub fn get(&self, column: usize, row: usize) -> EngineResult<Option<Cookie>> {
        Ok(self.cells.get(column, row)?.cookie())
    }

    /// Store or clear a cookie. A stored cookie takes the cell's coordinates.
    pub fn set(&mut self, column: usize, row: usize, cookie: Option<Cookie>) -> EngineResult<()> {
        let playable = self.is_playable(column, row)?;
        match cookie {
            Some(mut cookie) => {
                if !playable {
                    return Err(EngineError::InvalidCell { column, row });
                }
                cookie.column = column;
                cookie.row = row;
                self.cells.set(column, row, Cell::Occupied(cookie))
            }
            None => self.cells.set(column, row, Cell::Empty),
        }
    }

    /// Store or clear a cookie at a cell the caller already knows is playable
    pub(crate) fn put(&mut self, column: usize, row: usize, cookie: Option<Cookie>) {
        debug_assert!(cookie.is_none() || self.playable_at(column, row));
        let cell = match cookie {
            Some(cookie) => Cell::Occupied(Cookie {
                column,
                row,
                ..cookie
            }),
            None => Cell::Empty,
        };
        self.cells.put(column, row, cell);
    }

    /// Bounds-tolerant playable check used by the scanners
    #[inline]
    pub(crate) fn playable_at(&self, column: usize, row: usize) -> bool {
        self.tiles.get(column, row).copied().unwrap_or(false)
    }

    /// Bounds-tolerant lookup used by the scanners
    #[inline]
    pub(crate) fn cookie_at(&self, column: usize, row: usize) -> Option<Cookie> {
        self.cells.get(column, row).ok().and_then(Cell::cookie)
    }

    #[inline]
    pub(crate) fn cookie_at_pos(&self, pos: Position) -> Option<Cookie> {
        self.cookie_at(pos.column, pos.row)
    }

    /// Clear every cell
    pub fn clear(&mut self) {
        self.cells = Array2D::new(self.columns(), self.rows(), Cell::Empty);
    }

    /// Every cookie on the board, bottom row first
    pub fn cookies(&self) -> Vec<Cookie> {
        self.cells.iter().filter_map(|(_, _, cell)| cell.cookie()).collect()
    }

    /// Number of playable cells
    pub fn playable_count(&self) -> usize {
        self.tiles.iter().filter(|(_, _, playable)| **playable).count()
    }

    /// Playable cells that hold no cookie
    pub fn empty_playable_cells(&self) -> Vec<Position> {
        self.cells
            .iter()
            .filter(|(c, r, cell)| matches!(cell, Cell::Empty) && self.playable_at(*c, *r))
            .map(|(c, r, _)| Position::new(c, r))
            .collect()
    }

    /// Text dump, top row first: kind symbol, `.` for empty, space for holes
    pub fn render(&self) -> String {
        let mut out = String::with_capacity((self.columns() + 1) * self.rows());
        for row in (0..self.rows()).rev() {
            for column in 0..self.columns() {
                let ch = match self.cookie_at(column, row) {
                    Some(cookie) => cookie.kind.symbol(),
                    None if self.playable_at(column, row) => '.',
                    None => ' ',
                };
                out.push(ch);
            }
            out.push('\n');
        }
        out
    }
}
