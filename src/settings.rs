//! Engine settings
//!
//! Tuning knobs for board population. Loaded from JSON or left at defaults.

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::{EngineError, EngineResult};
use crate::sim::CookieType;

/// Engine tuning
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Settings {
    /// Number of cookie kinds in play (first N of `CookieType::ALL`)
    pub palette_size: usize,
    /// Re-draws per cell while avoiding a pre-existing match
    pub max_kind_attempts: u32,
    /// Whole-board populations before shuffle gives up
    pub max_shuffle_attempts: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            palette_size: DEFAULT_PALETTE_SIZE,
            max_kind_attempts: MAX_KIND_ATTEMPTS,
            max_shuffle_attempts: MAX_SHUFFLE_ATTEMPTS,
        }
    }
}

impl Settings {
    /// Settings with a smaller or larger palette, everything else default
    pub fn with_palette(palette_size: usize) -> Self {
        Self {
            palette_size,
            ..Self::default()
        }
    }

    /// Parse and validate a settings document
    pub fn from_json(json: &str) -> EngineResult<Self> {
        let settings: Settings = serde_json::from_str(json)?;
        settings.validate()?;
        log::info!("Loaded settings: palette of {}", settings.palette_size);
        Ok(settings)
    }

    /// Reject settings the engine cannot work with
    pub fn validate(&self) -> EngineResult<()> {
        if !(MIN_PALETTE_SIZE..=CookieType::ALL.len()).contains(&self.palette_size) {
            return Err(EngineError::InvalidSettings(format!(
                "palette size {} outside {}..={}",
                self.palette_size,
                MIN_PALETTE_SIZE,
                CookieType::ALL.len()
            )));
        }
        if self.max_kind_attempts == 0 {
            return Err(EngineError::InvalidSettings(
                "max_kind_attempts must be at least 1".into(),
            ));
        }
        if self.max_shuffle_attempts == 0 {
            return Err(EngineError::InvalidSettings(
                "max_shuffle_attempts must be at least 1".into(),
            ));
        }
        Ok(())
    }

    /// Cookie kinds in play
    pub fn palette(&self) -> &'static [CookieType] {
        &CookieType::ALL[..self.palette_size.min(CookieType::ALL.len())]
    }
}
