//! Deterministic board engine
//!
//! All rules live here. This module must stay pure and deterministic:
//! - Randomness only through the `Rng` the caller passes in
//! - Stable iteration order (bottom row first, left to right)
//! - No rendering, timing or platform dependencies

pub mod chain;
pub mod cookie;
pub mod grid;
pub mod level;
pub mod swap;

pub use chain::{Chain, ChainType, chain_score, detect_matches};
pub use cookie::{Cookie, CookieType, Position};
pub use grid::{Array2D, Cell, Grid};
pub use level::{ColumnDelta, CookieMove, Level};
pub use swap::Swap;
