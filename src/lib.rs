//! Cookie Crunch - rule engine for a match-3 cookie puzzle
//!
//! Core modules:
//! - `sim`: Deterministic board engine (grid, swaps, chains, cascades)
//! - `definition`: Level documents and their validation
//! - `session`: Turn driver (score, moves, win/lose)
//! - `settings`: Engine tuning
//! - `error`: Error taxonomy

pub mod definition;
pub mod error;
pub mod session;
pub mod settings;
pub mod sim;

pub use definition::LevelDefinition;
pub use error::{EngineError, EngineResult};
pub use session::{Session, SessionPhase, SwapOutcome};
pub use settings::Settings;

/// Game configuration constants
pub mod consts {
    /// Shortest run of same-kind cookies that counts as a chain
    pub const MIN_CHAIN_LENGTH: usize = 3;
    /// Points for a 3-chain before the combo multiplier
    pub const BASE_CHAIN_SCORE: u32 = 60;

    /// Number of cookie kinds in play unless configured otherwise
    pub const DEFAULT_PALETTE_SIZE: usize = 6;
    /// Smallest palette that can still avoid pre-existing matches
    pub const MIN_PALETTE_SIZE: usize = 3;

    /// Re-draws allowed per cell while avoiding a match during shuffle
    pub const MAX_KIND_ATTEMPTS: u32 = 32;
    /// Whole-board populations attempted before giving up
    pub const MAX_SHUFFLE_ATTEMPTS: u32 = 100;

    /// Number of bundled `Level_<n>` documents
    pub const NUM_LEVELS: u32 = 4;
}
