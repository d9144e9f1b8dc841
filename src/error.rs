//! Engine error types

use thiserror::Error;

use crate::session::SessionPhase;

/// Everything that can go wrong while loading or populating a level.
///
/// Gameplay steps (`perform_swap`, `remove_matches`, `fill_holes`,
/// `top_up_cookies`) never fail; an empty result is not an error.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("cell ({column}, {row}) is outside the {columns}x{rows} grid")]
    OutOfBounds {
        column: usize,
        row: usize,
        columns: usize,
        rows: usize,
    },

    #[error("cell ({column}, {row}) is not playable")]
    InvalidCell { column: usize, row: usize },

    #[error("Malformed level: {0}")]
    MalformedLevel(String),

    #[error("Invalid settings: {0}")]
    InvalidSettings(String),

    #[error("no solvable board after {attempts} shuffle attempts")]
    UnsolvableBoard { attempts: u32 },

    #[error("session already ended: {0:?}")]
    SessionFinished(SessionPhase),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type EngineResult<T> = Result<T, EngineError>;
