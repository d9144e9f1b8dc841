//! Turn driver
//!
//! Runs a level the way a player experiences it: a move budget, a running
//! score, full cascades after each accepted swap, and a win/lose outcome.
//! Every cascade step is returned as data for a presentation layer.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};
use crate::sim::{Chain, ColumnDelta, Cookie, Level, Swap};

/// Where the session stands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionPhase {
    /// Waiting for the next swap
    Playing,
    /// Target score reached
    LevelComplete,
    /// Moves ran out below the target
    GameOver,
}

/// One remove → fill → top-up pass of a cascade
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CascadeStep {
    /// Multiplier the chains in this step were scored with
    pub combo_multiplier: u32,
    pub chains: Vec<Chain>,
    pub falls: Vec<ColumnDelta>,
    pub top_ups: Vec<ColumnDelta>,
}

impl CascadeStep {
    pub fn points(&self) -> u32 {
        self.chains.iter().map(|c| c.score).sum()
    }
}

/// Everything that happened during one accepted swap
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TurnReport {
    pub swap: Swap,
    pub steps: Vec<CascadeStep>,
    pub points: u32,
    pub score: u64,
    pub moves_left: u32,
    pub phase: SessionPhase,
    /// Swaps available on the settled board
    pub possible_swaps: usize,
}

/// Result of offering a swap to the session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum SwapOutcome {
    /// The session already ended
    Finished(SessionPhase),
    /// Not a legal move; nothing changed and no move was spent
    Rejected,
    Resolved(TurnReport),
}

/// A level being played
#[derive(Debug, Clone)]
pub struct Session<R: Rng> {
    level: Level,
    rng: R,
    score: u64,
    moves_left: u32,
    phase: SessionPhase,
    possible_swaps: usize,
}

impl<R: Rng> Session<R> {
    /// Start a level: full move budget, zero score, freshly shuffled board
    pub fn begin(mut level: Level, mut rng: R) -> EngineResult<Self> {
        level.reset_combo_multiplier();
        level.shuffle(&mut rng)?;
        let possible_swaps = level.detect_possible_swaps().len();
        log::info!(
            "Session started: target {}, {} moves, {} possible swaps",
            level.target_score(),
            level.maximum_moves(),
            possible_swaps
        );
        Ok(Self {
            moves_left: level.maximum_moves(),
            level,
            rng,
            score: 0,
            phase: SessionPhase::Playing,
            possible_swaps,
        })
    }

    pub fn level(&self) -> &Level {
        &self.level
    }

    pub fn score(&self) -> u64 {
        self.score
    }

    pub fn moves_left(&self) -> u32 {
        self.moves_left
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    /// True when the settled board offers no legal swap
    pub fn needs_reshuffle(&self) -> bool {
        self.phase == SessionPhase::Playing && self.possible_swaps == 0
    }

    /// Play one swap through to a settled board
    pub fn play(&mut self, swap: Swap) -> SwapOutcome {
        if self.phase != SessionPhase::Playing {
            return SwapOutcome::Finished(self.phase);
        }
        if !self.level.is_possible_swap(&swap) {
            log::debug!("Rejected swap {swap}");
            return SwapOutcome::Rejected;
        }

        self.level.perform_swap(&swap);
        let steps = self.resolve_cascade();
        let points: u32 = steps.iter().map(CascadeStep::points).sum();
        self.score += u64::from(points);
        self.end_turn();

        SwapOutcome::Resolved(TurnReport {
            swap,
            steps,
            points,
            score: self.score,
            moves_left: self.moves_left,
            phase: self.phase,
            possible_swaps: self.possible_swaps,
        })
    }

    /// Repeat remove → fill → top-up until nothing matches
    fn resolve_cascade(&mut self) -> Vec<CascadeStep> {
        let mut steps = Vec::new();
        loop {
            let combo_multiplier = self.level.combo_multiplier();
            let chains = self.level.remove_matches();
            if chains.is_empty() {
                break;
            }
            let falls = self.level.fill_holes();
            let top_ups = self.level.top_up_cookies(&mut self.rng);
            let step = CascadeStep {
                combo_multiplier,
                chains,
                falls,
                top_ups,
            };
            log::debug!(
                "Cascade step {}: {} chains for {} points at x{}",
                steps.len() + 1,
                step.chains.len(),
                step.points(),
                combo_multiplier
            );
            steps.push(step);
        }
        steps
    }

    /// Throw the board away and deal a new one. Costs a move.
    pub fn reshuffle(&mut self) -> EngineResult<Vec<Cookie>> {
        if self.phase != SessionPhase::Playing {
            return Err(EngineError::SessionFinished(self.phase));
        }
        let cookies = self.level.shuffle(&mut self.rng)?;
        self.end_turn();
        Ok(cookies)
    }

    fn end_turn(&mut self) {
        self.level.reset_combo_multiplier();
        self.possible_swaps = self.level.detect_possible_swaps().len();
        self.moves_left = self.moves_left.saturating_sub(1);

        if self.score >= u64::from(self.level.target_score()) {
            self.phase = SessionPhase::LevelComplete;
            log::info!("Level complete with {} points", self.score);
        } else if self.moves_left == 0 {
            self.phase = SessionPhase::GameOver;
            log::info!("Game over at {} of {} points", self.score, self.level.target_score());
        } else if self.possible_swaps == 0 {
            log::warn!("No possible swaps left; board needs a reshuffle");
        }
    }
}

/// Level to load after `current` is won: the next one, wrapping to 1
pub fn next_level_number(current: u32, total: u32) -> u32 {
    if current < total { current + 1 } else { 1 }
}
