//! Chains: runs of three or more same-kind cookies

use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use super::cookie::Cookie;
use super::grid::Grid;
use crate::consts::{BASE_CHAIN_SCORE, MIN_CHAIN_LENGTH};

/// Orientation of a chain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChainType {
    Horizontal,
    Vertical,
}

impl ChainType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChainType::Horizontal => "Horizontal",
            ChainType::Vertical => "Vertical",
        }
    }
}

/// A detected run, cookies ordered left to right or bottom to top.
///
/// Two chains are equal when they hold the same cookies (by id) in the same
/// order; orientation and score do not take part.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chain {
    pub chain_type: ChainType,
    pub cookies: Vec<Cookie>,
    /// Points awarded, set when the chain is scored
    pub score: u32,
}

impl Chain {
    pub fn new(chain_type: ChainType) -> Self {
        Self {
            chain_type,
            cookies: Vec::new(),
            score: 0,
        }
    }

    pub fn add(&mut self, cookie: Cookie) {
        self.cookies.push(cookie);
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.cookies.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.cookies.is_empty()
    }

    pub fn first_cookie(&self) -> Option<&Cookie> {
        self.cookies.first()
    }

    pub fn last_cookie(&self) -> Option<&Cookie> {
        self.cookies.last()
    }

    /// Score this chain with the given combo multiplier
    pub fn apply_score(&mut self, combo_multiplier: u32) {
        self.score = chain_score(self.len(), combo_multiplier);
    }
}

impl PartialEq for Chain {
    fn eq(&self, other: &Self) -> bool {
        self.cookies.len() == other.cookies.len()
            && self
                .cookies
                .iter()
                .zip(&other.cookies)
                .all(|(a, b)| a.id == b.id)
    }
}

impl Eq for Chain {}

impl Hash for Chain {
    fn hash<H: Hasher>(&self, state: &mut H) {
        for cookie in &self.cookies {
            cookie.id.hash(state);
        }
    }
}

/// Points for a chain of `length` cookies: 60 per cookie beyond the second,
/// times the combo multiplier.
#[inline]
pub fn chain_score(length: usize, combo_multiplier: u32) -> u32 {
    let extra = length.saturating_sub(MIN_CHAIN_LENGTH - 1) as u32;
    BASE_CHAIN_SCORE * extra * combo_multiplier
}

/// Every maximal horizontal run of 3+ (rows bottom-up)
pub fn detect_horizontal_matches(grid: &Grid) -> Vec<Chain> {
    let mut chains = Vec::new();
    for row in 0..grid.rows() {
        let mut column = 0;
        while column < grid.columns() {
            let Some(start) = grid.cookie_at(column, row) else {
                column += 1;
                continue;
            };
            let mut end = column + 1;
            while grid
                .cookie_at(end, row)
                .is_some_and(|c| c.kind == start.kind)
            {
                end += 1;
            }
            if end - column >= MIN_CHAIN_LENGTH {
                let mut chain = Chain::new(ChainType::Horizontal);
                for c in column..end {
                    if let Some(cookie) = grid.cookie_at(c, row) {
                        chain.add(cookie);
                    }
                }
                chains.push(chain);
            }
            column = end;
        }
    }
    chains
}

/// Every maximal vertical run of 3+ (columns left to right)
pub fn detect_vertical_matches(grid: &Grid) -> Vec<Chain> {
    let mut chains = Vec::new();
    for column in 0..grid.columns() {
        let mut row = 0;
        while row < grid.rows() {
            let Some(start) = grid.cookie_at(column, row) else {
                row += 1;
                continue;
            };
            let mut end = row + 1;
            while grid
                .cookie_at(column, end)
                .is_some_and(|c| c.kind == start.kind)
            {
                end += 1;
            }
            if end - row >= MIN_CHAIN_LENGTH {
                let mut chain = Chain::new(ChainType::Vertical);
                for r in row..end {
                    if let Some(cookie) = grid.cookie_at(column, r) {
                        chain.add(cookie);
                    }
                }
                chains.push(chain);
            }
            row = end;
        }
    }
    chains
}

/// All chains on the board, horizontal first, unscored
pub fn detect_matches(grid: &Grid) -> Vec<Chain> {
    let mut chains = detect_horizontal_matches(grid);
    chains.extend(detect_vertical_matches(grid));
    chains
}
