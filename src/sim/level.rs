//! Level engine
//!
//! Owns the board and every mutation of it: population, swaps, match
//! removal, gravity and top-up. Each step returns plain data describing what
//! changed so the caller can animate it and decide what to call next.
//!
//! A turn looks like:
//! `is_possible_swap` → `perform_swap` → (`remove_matches` → `fill_holes` →
//! `top_up_cookies`)* until `remove_matches` comes back empty →
//! `reset_combo_multiplier`.

use std::collections::HashSet;

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::chain::{Chain, detect_matches};
use super::cookie::{Cookie, CookieType, Position};
use super::grid::{Array2D, Grid};
use super::swap::Swap;
use crate::consts::MIN_CHAIN_LENGTH;
use crate::definition::LevelDefinition;
use crate::error::{EngineError, EngineResult};
use crate::settings::Settings;

/// One cookie changing place within a column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CookieMove {
    /// The cookie at its destination
    pub cookie: Cookie,
    /// Row it fell from; `None` for a cookie spawned by top-up
    pub from_row: Option<usize>,
    pub to_row: usize,
}

/// All moves in one column, in the order they should be animated
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDelta {
    pub column: usize,
    pub moves: Vec<CookieMove>,
}

/// A loaded level and its board
#[derive(Debug, Clone)]
pub struct Level {
    grid: Grid,
    restrictions: Array2D<Option<Vec<CookieType>>>,
    settings: Settings,
    target_score: u32,
    maximum_moves: u32,
    combo_multiplier: u32,
    next_cookie_id: u32,
}

impl Level {
    /// Build an empty board from a level document with default settings
    pub fn load(definition: &LevelDefinition) -> EngineResult<Self> {
        Self::load_with_settings(definition, Settings::default())
    }

    /// Build an empty board. Nothing is created if validation fails.
    pub fn load_with_settings(
        definition: &LevelDefinition,
        settings: Settings,
    ) -> EngineResult<Self> {
        settings.validate()?;
        definition.validate()?;

        let grid = Grid::new(definition.tile_mask());
        log::info!(
            "Loaded {}x{} level: {} playable cells, target {}, {} moves",
            grid.columns(),
            grid.rows(),
            grid.playable_count(),
            definition.target_score,
            definition.moves
        );

        Ok(Self {
            grid,
            restrictions: definition.restriction_mask(),
            settings,
            target_score: definition.target_score,
            maximum_moves: definition.moves,
            combo_multiplier: 1,
            next_cookie_id: 1,
        })
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn target_score(&self) -> u32 {
        self.target_score
    }

    pub fn maximum_moves(&self) -> u32 {
        self.maximum_moves
    }

    pub fn combo_multiplier(&self) -> u32 {
        self.combo_multiplier
    }

    pub fn reset_combo_multiplier(&mut self) {
        self.combo_multiplier = 1;
    }

    pub fn cookie_at(&self, column: usize, row: usize) -> EngineResult<Option<Cookie>> {
        self.grid.get(column, row)
    }

    pub fn is_playable(&self, column: usize, row: usize) -> EngineResult<bool> {
        self.grid.is_playable(column, row)
    }

    // === Population ===

    /// Replace every cookie with a fresh board that has no chains and at
    /// least one possible swap. Returns the new cookies, bottom row first.
    ///
    /// Fails with `UnsolvableBoard` once the retry budget is spent; the board
    /// is left empty in that case.
    pub fn shuffle<R: Rng>(&mut self, rng: &mut R) -> EngineResult<Vec<Cookie>> {
        let attempts = self.settings.max_shuffle_attempts;
        for attempt in 1..=attempts {
            self.grid.clear();
            if !self.populate(rng)? {
                log::debug!("Shuffle attempt {attempt}: a cell could not avoid a match");
                continue;
            }
            let swaps = self.detect_possible_swaps();
            if swaps.is_empty() {
                log::debug!("Shuffle attempt {attempt}: no possible swaps");
                continue;
            }
            log::debug!(
                "Shuffle attempt {attempt}: {} possible swaps",
                swaps.len()
            );
            return Ok(self.grid.cookies());
        }

        self.grid.clear();
        log::warn!("Shuffle gave up after {attempts} attempts");
        Err(EngineError::UnsolvableBoard { attempts })
    }

    /// Fill every playable cell, bottom-up, without completing a run of three.
    /// Returns false when some cell ran out of re-draws.
    fn populate<R: Rng>(&mut self, rng: &mut R) -> EngineResult<bool> {
        for row in 0..self.grid.rows() {
            for column in 0..self.grid.columns() {
                if !self.grid.playable_at(column, row) {
                    continue;
                }
                let Some(kind) = self.draw_unmatched_kind(rng, column, row) else {
                    return Ok(false);
                };
                self.spawn_cookie(column, row, kind)?;
            }
        }
        Ok(true)
    }

    fn draw_unmatched_kind<R: Rng>(
        &self,
        rng: &mut R,
        column: usize,
        row: usize,
    ) -> Option<CookieType> {
        (0..self.settings.max_kind_attempts)
            .map(|_| self.draw_kind(rng, column, row))
            .find(|kind| !self.completes_run_below_or_left(column, row, *kind))
    }

    /// Random kind for a cell, honouring any restriction on it
    fn draw_kind<R: Rng>(&self, rng: &mut R, column: usize, row: usize) -> CookieType {
        let kinds = self.kinds_for(column, row);
        kinds[rng.random_range(0..kinds.len())]
    }

    fn kinds_for(&self, column: usize, row: usize) -> &[CookieType] {
        match self.restrictions.get(column, row) {
            Ok(Some(allowed)) if !allowed.is_empty() => allowed.as_slice(),
            _ => self.settings.palette(),
        }
    }

    /// Would `kind` at (column, row) finish a run with the two cells to its
    /// left or the two cells below it
    fn completes_run_below_or_left(&self, column: usize, row: usize, kind: CookieType) -> bool {
        let is_kind =
            |c: usize, r: usize| self.grid.cookie_at(c, r).is_some_and(|x| x.kind == kind);
        (column >= 2 && is_kind(column - 1, row) && is_kind(column - 2, row))
            || (row >= 2 && is_kind(column, row - 1) && is_kind(column, row - 2))
    }

    /// Create a cookie with a fresh id and store it
    pub(crate) fn spawn_cookie(
        &mut self,
        column: usize,
        row: usize,
        kind: CookieType,
    ) -> EngineResult<Cookie> {
        let cookie = Cookie::new(self.next_cookie_id, kind, column, row);
        self.grid.set(column, row, Some(cookie))?;
        self.next_cookie_id += 1;
        Ok(cookie)
    }

    // === Swaps ===

    /// True when both cells hold cookies, share an edge, and exchanging them
    /// creates a chain through either cell. The board is not touched.
    pub fn is_possible_swap(&self, swap: &Swap) -> bool {
        if !swap.is_adjacent() {
            return false;
        }
        let (a, b) = (swap.first(), swap.second());
        if self.grid.cookie_at_pos(a).is_none() || self.grid.cookie_at_pos(b).is_none() {
            return false;
        }
        self.has_chain_after(swap, a) || self.has_chain_after(swap, b)
    }

    /// Kind sitting at `pos` once `swap` is applied
    fn kind_after(&self, swap: &Swap, pos: Position) -> Option<CookieType> {
        self.grid.cookie_at_pos(swap.mirror(pos)).map(|c| c.kind)
    }

    fn has_chain_after(&self, swap: &Swap, pos: Position) -> bool {
        let Some(kind) = self.kind_after(swap, pos) else {
            return false;
        };
        let horizontal =
            1 + self.run_after(swap, pos, kind, -1, 0) + self.run_after(swap, pos, kind, 1, 0);
        let vertical =
            1 + self.run_after(swap, pos, kind, 0, -1) + self.run_after(swap, pos, kind, 0, 1);
        horizontal >= MIN_CHAIN_LENGTH || vertical >= MIN_CHAIN_LENGTH
    }

    /// Same-kind cookies stepping away from `pos` (exclusive) after `swap`
    fn run_after(
        &self,
        swap: &Swap,
        pos: Position,
        kind: CookieType,
        dc: isize,
        dr: isize,
    ) -> usize {
        let mut count = 0;
        let mut cur = pos;
        while let Some(next) = step(cur, dc, dr) {
            if self.kind_after(swap, next) != Some(kind) {
                break;
            }
            count += 1;
            cur = next;
        }
        count
    }

    /// Exchange the two cookies. The swap is assumed to be validated; a swap
    /// touching an empty or off-board cell is ignored.
    pub fn perform_swap(&mut self, swap: &Swap) {
        let (a, b) = (swap.first(), swap.second());
        let (Some(cookie_a), Some(cookie_b)) =
            (self.grid.cookie_at_pos(a), self.grid.cookie_at_pos(b))
        else {
            log::warn!("Ignoring swap {swap}: both cells must hold cookies");
            return;
        };
        let result = self
            .grid
            .set(a.column, a.row, Some(cookie_b))
            .and_then(|_| self.grid.set(b.column, b.row, Some(cookie_a)));
        if let Err(err) = result {
            log::warn!("Swap {swap} failed: {err}");
        }
    }

    /// Every adjacent pair whose exchange would create a chain
    pub fn detect_possible_swaps(&self) -> HashSet<Swap> {
        let mut swaps = HashSet::new();
        for cookie in self.grid.cookies() {
            let here = cookie.position();
            for neighbour in [step(here, 1, 0), step(here, 0, 1)].into_iter().flatten() {
                let swap = Swap::new(here, neighbour);
                if self.is_possible_swap(&swap) {
                    swaps.insert(swap);
                }
            }
        }
        swaps
    }

    // === Cascade ===

    /// Detect, score and clear every chain on the board.
    ///
    /// Chains are scored with the current combo multiplier, which then goes up
    /// by one. A cookie shared by two chains is cleared once. An empty result
    /// means the cascade is over.
    pub fn remove_matches(&mut self) -> Vec<Chain> {
        let mut chains = detect_matches(&self.grid);
        if chains.is_empty() {
            return chains;
        }

        for chain in &mut chains {
            chain.apply_score(self.combo_multiplier);
        }
        for cookie in chains.iter().flat_map(|c| c.cookies.iter()) {
            self.grid.put(cookie.column, cookie.row, None);
        }

        log::debug!(
            "Removed {} chains at combo x{}",
            chains.len(),
            self.combo_multiplier
        );
        self.combo_multiplier += 1;
        chains
    }

    /// Drop cookies into the empty cells below them.
    ///
    /// Each unbroken vertical stretch of playable cells settles on its own; a
    /// cookie never passes a cell that is not part of the board. Moves are
    /// listed bottom-up per column.
    pub fn fill_holes(&mut self) -> Vec<ColumnDelta> {
        let mut deltas = Vec::new();
        for column in 0..self.grid.columns() {
            let mut moves = Vec::new();
            let mut row = 0;
            while row < self.grid.rows() {
                if !self.grid.playable_at(column, row) {
                    row += 1;
                    continue;
                }
                let start = row;
                while row < self.grid.rows() && self.grid.playable_at(column, row) {
                    row += 1;
                }
                self.settle_run(column, start, row, &mut moves);
            }
            if !moves.is_empty() {
                deltas.push(ColumnDelta { column, moves });
            }
        }
        deltas
    }

    /// Compact rows `start..end` of one column toward `start`
    fn settle_run(&mut self, column: usize, start: usize, end: usize, moves: &mut Vec<CookieMove>) {
        let mut write = start;
        for read in start..end {
            let Some(cookie) = self.grid.cookie_at(column, read) else {
                continue;
            };
            if read != write {
                self.grid.put(column, read, None);
                self.grid.put(column, write, Some(cookie));
                moves.push(CookieMove {
                    cookie: Cookie { row: write, ..cookie },
                    from_row: Some(read),
                    to_row: write,
                });
            }
            write += 1;
        }
    }

    /// Fill every empty playable cell with a new random cookie, top-down per
    /// column. New chains are allowed; the next `remove_matches` finds them.
    pub fn top_up_cookies<R: Rng>(&mut self, rng: &mut R) -> Vec<ColumnDelta> {
        let mut deltas = Vec::new();
        for column in 0..self.grid.columns() {
            let mut moves = Vec::new();
            for row in (0..self.grid.rows()).rev() {
                if !self.grid.playable_at(column, row)
                    || self.grid.cookie_at(column, row).is_some()
                {
                    continue;
                }
                let kind = self.draw_kind(rng, column, row);
                match self.spawn_cookie(column, row, kind) {
                    Ok(cookie) => moves.push(CookieMove {
                        cookie,
                        from_row: None,
                        to_row: row,
                    }),
                    Err(err) => log::warn!("Top-up at ({column}, {row}) failed: {err}"),
                }
            }
            if !moves.is_empty() {
                deltas.push(ColumnDelta { column, moves });
            }
        }
        deltas
    }
}

/// Neighbour of `pos` in direction (dc, dr), if it has non-negative coordinates
#[inline]
fn step(pos: Position, dc: isize, dr: isize) -> Option<Position> {
    Some(Position::new(
        pos.column.checked_add_signed(dc)?,
        pos.row.checked_add_signed(dr)?,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::*;
    use crate::sim::chain::ChainType;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    /// Build a level from a picture, top row first. Letters are cookie
    /// symbols, `.` is an empty playable cell, `#` is not part of the board.
    fn level_from_layout(layout: &[&str]) -> Level {
        let tiles = layout
            .iter()
            .map(|line| line.chars().map(|ch| u8::from(ch != '#')).collect())
            .collect();
        let definition = LevelDefinition {
            tiles,
            target_score: 1000,
            moves: 10,
            restrictions: Vec::new(),
        };
        let mut level = Level::load(&definition).unwrap();
        let rows = layout.len();
        for (i, line) in layout.iter().enumerate() {
            let row = rows - 1 - i;
            for (column, ch) in line.chars().enumerate() {
                if let Some(kind) = CookieType::from_symbol(ch) {
                    level.spawn_cookie(column, row, kind).unwrap();
                }
            }
        }
        level
    }

    fn full_definition(columns: usize, rows: usize) -> LevelDefinition {
        LevelDefinition {
            tiles: vec![vec![1; columns]; rows],
            target_score: 1000,
            moves: 20,
            restrictions: Vec::new(),
        }
    }

    /// Every cookie's stored position matches its cell, and only playable
    /// cells are occupied
    fn assert_consistent(level: &Level) {
        let grid = level.grid();
        let mut ids = HashSet::new();
        for row in 0..grid.rows() {
            for column in 0..grid.columns() {
                if let Some(cookie) = grid.get(column, row).unwrap() {
                    assert_eq!((cookie.column, cookie.row), (column, row));
                    assert!(grid.is_playable(column, row).unwrap());
                    assert!(ids.insert(cookie.id), "duplicate id {}", cookie.id);
                }
            }
        }
    }

    /// The swap-then-cross layout: a five-long Donut row crossed by a
    /// three-long Donut column at its middle cookie.
    const CROSS: [&str; 6] = [
        "UDMSUD",
        "DMSUDM",
        "MSOUMS",
        "OOOOOU",
        "DMOSUD",
        "MSUDMS",
    ];

    #[test]
    fn test_shuffle_8x8_scenario() {
        let mut level = Level::load(&full_definition(8, 8)).unwrap();
        let mut rng = Pcg32::seed_from_u64(12345);
        let cookies = level.shuffle(&mut rng).unwrap();

        assert_eq!(cookies.len(), 64);
        assert!(detect_matches(level.grid()).is_empty());
        assert!(!level.detect_possible_swaps().is_empty());
        assert_consistent(&level);
    }

    #[test]
    fn test_shuffle_is_reproducible() {
        let mut a = Level::load(&full_definition(7, 7)).unwrap();
        let mut b = Level::load(&full_definition(7, 7)).unwrap();
        let ca = a.shuffle(&mut Pcg32::seed_from_u64(7)).unwrap();
        let cb = b.shuffle(&mut Pcg32::seed_from_u64(7)).unwrap();
        assert_eq!(ca, cb);
    }

    #[test]
    fn test_shuffle_replaces_existing_cookies() {
        let mut level = level_from_layout(&["OOU", "UDM", "MSD"]);
        let mut rng = Pcg32::seed_from_u64(3);
        let cookies = level.shuffle(&mut rng).unwrap();
        assert_eq!(cookies.len(), 9);
        assert!(detect_matches(level.grid()).is_empty());
        assert_consistent(&level);
    }

    #[test]
    fn test_shuffle_skips_holes() {
        let mut level = level_from_layout(&[
            "##....##",
            "#......#",
            "........",
            "........",
            "........",
            "#......#",
            "##....##",
        ]);
        let mut rng = Pcg32::seed_from_u64(99);
        let cookies = level.shuffle(&mut rng).unwrap();
        assert_eq!(cookies.len(), level.grid().playable_count());
        assert!(level.grid().empty_playable_cells().is_empty());
        assert_consistent(&level);
    }

    #[test]
    fn test_unsolvable_board_is_an_error() {
        let settings = Settings {
            max_shuffle_attempts: 5,
            ..Settings::default()
        };
        let definition = LevelDefinition {
            tiles: vec![vec![1, 1]],
            target_score: 10,
            moves: 1,
            restrictions: Vec::new(),
        };
        let mut level = Level::load_with_settings(&definition, settings).unwrap();
        let err = level.shuffle(&mut Pcg32::seed_from_u64(1)).unwrap_err();
        assert!(matches!(err, EngineError::UnsolvableBoard { attempts: 5 }));
        assert!(level.grid().cookies().is_empty());
    }

    #[test]
    fn test_restricted_cell_only_gets_allowed_kinds() {
        let mut definition = full_definition(6, 6);
        definition.restrictions.push(crate::definition::TileRestriction {
            column: 2,
            row: 3,
            allowed: vec![CookieType::Macaroon],
        });
        let mut level = Level::load(&definition).unwrap();
        let mut rng = Pcg32::seed_from_u64(5);
        level.shuffle(&mut rng).unwrap();
        assert_eq!(level.cookie_at(2, 3).unwrap().unwrap().kind, CookieType::Macaroon);

        level.grid.set(2, 3, None).unwrap();
        level.top_up_cookies(&mut rng);
        assert_eq!(level.cookie_at(2, 3).unwrap().unwrap().kind, CookieType::Macaroon);
    }

    #[test]
    fn test_small_palette_still_shuffles() {
        let mut level =
            Level::load_with_settings(&full_definition(9, 9), Settings::with_palette(3)).unwrap();
        let cookies = level.shuffle(&mut Pcg32::seed_from_u64(2024)).unwrap();
        assert!(cookies.iter().all(|c| CookieType::ALL[..3].contains(&c.kind)));
        assert!(detect_matches(level.grid()).is_empty());
    }

    #[test]
    fn test_invalid_settings_fail_load() {
        let err = Level::load_with_settings(&full_definition(3, 3), Settings::with_palette(9))
            .unwrap_err();
        assert!(matches!(err, EngineError::InvalidSettings(_)));
    }

    #[test]
    fn test_is_possible_swap() {
        let level = level_from_layout(&[
            "UDM",
            "OUO",
            "DMS",
        ]);
        // Row 1 would read O D O
        assert!(!level.is_possible_swap(&Swap::between((1, 1), (1, 2))));

        let level = level_from_layout(&[
            "UOM",
            "OUO",
            "DMS",
        ]);
        // Swap the middle U up with the O above: row 1 becomes O O O
        let swap = Swap::between((1, 1), (1, 2));
        assert!(level.is_possible_swap(&swap));
        assert!(level.is_possible_swap(&Swap::between((1, 2), (1, 1))));
        // Diagonal and distant swaps are never possible
        assert!(!level.is_possible_swap(&Swap::between((0, 1), (1, 2))));
        assert!(!level.is_possible_swap(&Swap::between((0, 1), (2, 1))));
        // Validation does not move anything
        assert_eq!(level.cookie_at(1, 1).unwrap().unwrap().kind, CookieType::Cupcake);
    }

    #[test]
    fn test_swap_with_empty_or_hole_is_rejected() {
        let level = level_from_layout(&[
            "O#M",
            ".OO",
            "DMS",
        ]);
        assert!(!level.is_possible_swap(&Swap::between((0, 1), (1, 1))));
        assert!(!level.is_possible_swap(&Swap::between((1, 1), (1, 2))));
        assert!(!level.is_possible_swap(&Swap::between((2, 2), (3, 2))));
    }

    #[test]
    fn test_perform_swap_updates_positions() {
        let mut level = level_from_layout(&[
            "UOM",
            "OUO",
            "DMS",
        ]);
        let up = level.cookie_at(1, 2).unwrap().unwrap();
        let mid = level.cookie_at(1, 1).unwrap().unwrap();
        level.perform_swap(&Swap::between((1, 1), (1, 2)));

        let now_mid = level.cookie_at(1, 1).unwrap().unwrap();
        let now_up = level.cookie_at(1, 2).unwrap().unwrap();
        assert_eq!(now_mid.id, up.id);
        assert_eq!(now_up.id, mid.id);
        assert_eq!((now_mid.column, now_mid.row), (1, 1));
        assert_eq!((now_up.column, now_up.row), (1, 2));
        assert_consistent(&level);

        let chains = level.remove_matches();
        assert_eq!(chains.len(), 1);
        assert_eq!(chains[0].chain_type, ChainType::Horizontal);
    }

    #[test]
    fn test_cross_removes_seven_cells() {
        let mut level = level_from_layout(&CROSS);
        let before = level.grid().cookies().len();
        let chains = level.remove_matches();

        assert_eq!(chains.len(), 2);
        let horizontal = chains.iter().find(|c| c.chain_type == ChainType::Horizontal).unwrap();
        let vertical = chains.iter().find(|c| c.chain_type == ChainType::Vertical).unwrap();
        assert_eq!(horizontal.len(), 5);
        assert_eq!(vertical.len(), 3);
        assert_eq!(horizontal.score, 180);
        assert_eq!(vertical.score, 60);

        assert_eq!(before - level.grid().cookies().len(), 7);
        assert_eq!(level.grid().empty_playable_cells().len(), 7);
        assert_consistent(&level);
    }

    #[test]
    fn test_remove_matches_twice_is_empty() {
        let mut level = level_from_layout(&CROSS);
        assert!(!level.remove_matches().is_empty());
        assert!(level.remove_matches().is_empty());
        // An empty pass does not bump the combo
        assert_eq!(level.combo_multiplier(), 2);
    }

    #[test]
    fn test_combo_multiplier_scales_scores() {
        let mut level = level_from_layout(&["OOO", "UDM"]);
        assert_eq!(level.combo_multiplier(), 1);
        let chains = level.remove_matches();
        assert_eq!(chains[0].score, BASE_CHAIN_SCORE);
        assert_eq!(level.combo_multiplier(), 2);

        level.spawn_cookie(0, 1, CookieType::Danish).unwrap();
        level.spawn_cookie(1, 1, CookieType::Danish).unwrap();
        level.spawn_cookie(2, 1, CookieType::Danish).unwrap();
        let chains = level.remove_matches();
        assert_eq!(chains[0].score, 120);
        assert_eq!(level.combo_multiplier(), 3);

        level.reset_combo_multiplier();
        assert_eq!(level.combo_multiplier(), 1);
    }

    #[test]
    fn test_fill_holes_column_scenario() {
        // Height 4, empty at row 1, cookies at rows 0, 2, 3
        let mut level = level_from_layout(&["M", "D", ".", "O"]);
        let bottom = level.cookie_at(0, 0).unwrap().unwrap();
        let d = level.cookie_at(0, 2).unwrap().unwrap();
        let m = level.cookie_at(0, 3).unwrap().unwrap();

        let deltas = level.fill_holes();
        assert_eq!(deltas.len(), 1);
        let moves = &deltas[0].moves;
        assert_eq!(moves.len(), 2);
        assert_eq!((moves[0].cookie.id, moves[0].from_row, moves[0].to_row), (d.id, Some(2), 1));
        assert_eq!((moves[1].cookie.id, moves[1].from_row, moves[1].to_row), (m.id, Some(3), 2));

        assert_eq!(level.cookie_at(0, 0).unwrap(), Some(bottom));
        assert_eq!(level.cookie_at(0, 3).unwrap(), None);
        assert_consistent(&level);
    }

    #[test]
    fn test_fill_holes_stops_at_non_playable_cells() {
        // Bottom-up: row 0 empty, row 1 hole, row 2 empty, row 3 Donut
        let mut level = level_from_layout(&["O", ".", "#", "."]);
        let deltas = level.fill_holes();
        assert_eq!(deltas[0].moves.len(), 1);
        assert_eq!(deltas[0].moves[0].to_row, 2);
        assert_eq!(level.cookie_at(0, 0).unwrap(), None);

        let mut rng = Pcg32::seed_from_u64(8);
        let deltas = level.top_up_cookies(&mut rng);
        let rows: Vec<_> = deltas[0].moves.iter().map(|m| m.to_row).collect();
        assert_eq!(rows, vec![3, 0]);
        assert!(deltas[0].moves.iter().all(|m| m.from_row.is_none()));
        assert!(level.grid().empty_playable_cells().is_empty());
        assert_consistent(&level);
    }

    #[test]
    fn test_fill_then_top_up_after_cross() {
        let mut level = level_from_layout(&CROSS);
        level.remove_matches();
        let falls = level.fill_holes();
        assert!(!falls.is_empty());
        assert!(falls.windows(2).all(|w| w[0].column < w[1].column));

        let mut rng = Pcg32::seed_from_u64(11);
        let tops = level.top_up_cookies(&mut rng);
        let spawned: usize = tops.iter().map(|d| d.moves.len()).sum();
        assert_eq!(spawned, 7);
        assert!(level.grid().empty_playable_cells().is_empty());
        assert_consistent(&level);
    }

    #[test]
    fn test_no_changes_reports_nothing() {
        let mut level = level_from_layout(&["UDM", "DMU"]);
        assert!(level.remove_matches().is_empty());
        assert!(level.fill_holes().is_empty());
        assert!(level.top_up_cookies(&mut Pcg32::seed_from_u64(1)).is_empty());
    }

    #[test]
    fn test_detect_possible_swaps() {
        let level = level_from_layout(&[
            "UOM",
            "OUO",
            "DMS",
        ]);
        let swaps = level.detect_possible_swaps();
        assert!(swaps.contains(&Swap::between((1, 2), (1, 1))));
        assert!(swaps.iter().all(|s| level.is_possible_swap(s)));

        let stuck = level_from_layout(&["UD", "DU"]);
        assert!(stuck.detect_possible_swaps().is_empty());
    }

    mod props {
        use super::*;
        use proptest::prelude::*;

        fn shuffled(seed: u64) -> (Level, Pcg32) {
            let mut level = Level::load(&full_definition(8, 8)).unwrap();
            let mut rng = Pcg32::seed_from_u64(seed);
            level.shuffle(&mut rng).unwrap();
            (level, rng)
        }

        fn all_adjacent_swaps(level: &Level) -> Vec<Swap> {
            let grid = level.grid();
            let mut swaps = Vec::new();
            for row in 0..grid.rows() {
                for column in 0..grid.columns() {
                    if column + 1 < grid.columns() {
                        swaps.push(Swap::between((column, row), (column + 1, row)));
                    }
                    if row + 1 < grid.rows() {
                        swaps.push(Swap::between((column, row), (column, row + 1)));
                    }
                }
            }
            swaps
        }

        proptest! {
            #![proptest_config(ProptestConfig::with_cases(24))]

            #[test]
            fn prop_shuffle_has_no_matches_and_a_move(seed in any::<u64>()) {
                let (level, _) = shuffled(seed);
                prop_assert!(detect_matches(level.grid()).is_empty());
                prop_assert!(!level.detect_possible_swaps().is_empty());
                prop_assert!(level.grid().empty_playable_cells().is_empty());
            }

            #[test]
            fn prop_swap_validation_agrees_with_outcome(seed in any::<u64>()) {
                let (level, _) = shuffled(seed);
                for swap in all_adjacent_swaps(&level) {
                    let mut trial = level.clone();
                    let accepted = trial.is_possible_swap(&swap);
                    trial.perform_swap(&swap);
                    let chains = trial.remove_matches();
                    prop_assert_eq!(accepted, !chains.is_empty(), "swap {}", swap);
                }
            }

            #[test]
            fn prop_cascade_settles(seed in any::<u64>()) {
                let (mut level, mut rng) = shuffled(seed);
                let swaps = level.detect_possible_swaps();
                let swap = *swaps.iter().min().unwrap();
                level.perform_swap(&swap);

                let mut passes = 0;
                loop {
                    let chains = level.remove_matches();
                    if chains.is_empty() {
                        break;
                    }
                    passes += 1;
                    prop_assert_eq!(level.combo_multiplier() as usize, passes + 1);
                    level.fill_holes();
                    level.top_up_cookies(&mut rng);
                    prop_assert!(level.grid().empty_playable_cells().is_empty());
                }
                prop_assert!(passes >= 1);
                prop_assert!(detect_matches(level.grid()).is_empty());
                assert_consistent(&level);
            }

            #[test]
            fn prop_refill_covers_irregular_boards(
                tiles in proptest::collection::vec(proptest::collection::vec(0u8..=1, 6), 6),
                cleared in proptest::collection::vec(any::<bool>(), 36),
                seed in any::<u64>(),
            ) {
                let mut tiles = tiles;
                tiles[0][0] = 1;
                let definition = LevelDefinition {
                    tiles,
                    target_score: 1000,
                    moves: 10,
                    restrictions: Vec::new(),
                };
                let mut level = Level::load(&definition).unwrap();
                let mut rng = Pcg32::seed_from_u64(seed);
                level.top_up_cookies(&mut rng);
                prop_assert!(level.grid().empty_playable_cells().is_empty());

                for cookie in level.grid().cookies() {
                    if cleared[cookie.row * 6 + cookie.column] {
                        level.grid.put(cookie.column, cookie.row, None);
                    }
                }
                for delta in level.fill_holes() {
                    for m in &delta.moves {
                        let from = m.from_row.unwrap();
                        for row in m.to_row..=from {
                            prop_assert!(level.grid().playable_at(delta.column, row));
                        }
                    }
                }
                level.top_up_cookies(&mut rng);
                prop_assert!(level.grid().empty_playable_cells().is_empty());
                assert_consistent(&level);

                while !level.remove_matches().is_empty() {
                    level.fill_holes();
                    level.top_up_cookies(&mut rng);
                    prop_assert!(level.grid().empty_playable_cells().is_empty());
                }
                prop_assert!(detect_matches(level.grid()).is_empty());
                assert_consistent(&level);
            }
        }
    }
}
