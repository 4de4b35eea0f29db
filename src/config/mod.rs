//! Session Configuration
//!
//! A session is described by a JSON file naming the tempo, the viewport and
//! the palette of loops:
//!
//! ```json
//! {
//!   "bpm": 120,
//!   "viewport": { "width": 1024, "height": 768 },
//!   "loops": [
//!     { "id": "kick", "category": "rhythm", "path": "loops/kick.wav", "color": "0xE63C3C" }
//!   ]
//! }
//! ```

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::{KitchenError, Result};
use crate::mix::{Color, LoopAsset, LoopCategory, Viewport};

/// Radius of dropped loops in world units
pub const DEFAULT_LOOP_RADIUS: f32 = 40.0;

/// Loop length in beats when none is given
pub const DEFAULT_BEATS: u32 = 4;

/// Parsed session configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Tempo shared by every slot.
    pub bpm: f64,

    /// Surface size in world units.
    #[serde(default)]
    pub viewport: Viewport,

    /// Radius of dropped loops.
    #[serde(default = "default_loop_radius")]
    pub loop_radius: f32,

    /// Palette entries.
    #[serde(default)]
    pub loops: Vec<LoopConfig>,
}

fn default_loop_radius() -> f32 {
    DEFAULT_LOOP_RADIUS
}

/// One palette entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoopConfig {
    pub id: String,

    pub category: LoopCategory,

    /// Audio file, relative paths resolved against the config file.
    pub path: PathBuf,

    /// Hex colour, `0x`/`#` prefix optional.
    #[serde(default = "default_color")]
    pub color: String,

    /// Lifetime in milliseconds; negative means the loop never expires.
    #[serde(default = "default_lifetime")]
    pub lifetime_ms: i64,

    #[serde(default = "default_beats")]
    pub beats: u32,
}

fn default_color() -> String {
    "0xFFFFFF".to_string()
}

fn default_lifetime() -> i64 {
    -1
}

fn default_beats() -> u32 {
    DEFAULT_BEATS
}

impl LoopConfig {
    pub fn lifetime(&self) -> Option<u64> {
        u64::try_from(self.lifetime_ms).ok()
    }

    pub fn to_asset(&self) -> Result<LoopAsset> {
        Ok(LoopAsset::new(
            self.id.clone(),
            self.category,
            self.path.clone(),
            Color::from_hex(&self.color)?,
            self.beats,
            self.lifetime(),
        ))
    }
}

impl SessionConfig {
    /// Load and validate a configuration file.
    ///
    /// Relative loop paths are resolved against the file's directory.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let mut config = Self::from_json_str(&content)?;

        if let Some(base) = path.parent() {
            for entry in config.loops.iter_mut() {
                if entry.path.is_relative() {
                    entry.path = base.join(&entry.path);
                }
            }
        }

        debug!(
            "Loaded {} loops from {}",
            config.loops.len(),
            path.display()
        );
        Ok(config)
    }

    /// Parse and validate a configuration from JSON text.
    pub fn from_json_str(content: &str) -> Result<Self> {
        let config: SessionConfig = serde_json::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.bpm.is_finite() || self.bpm <= 0.0 {
            return Err(KitchenError::InvalidTempo { bpm: self.bpm });
        }
        self.viewport.validate()?;
        if !self.loop_radius.is_finite() || self.loop_radius <= 0.0 {
            return Err(KitchenError::InvalidGeometry {
                reason: format!("loop radius must be positive, got {}", self.loop_radius),
            });
        }

        let mut seen = HashSet::new();
        for entry in &self.loops {
            if !seen.insert(entry.id.as_str()) {
                return Err(KitchenError::InvalidConfig {
                    reason: format!("duplicate loop id '{}'", entry.id),
                });
            }
            if entry.path.as_os_str().is_empty() {
                return Err(KitchenError::InvalidConfig {
                    reason: format!("loop '{}' has an empty path", entry.id),
                });
            }
            Color::from_hex(&entry.color)?;
        }

        Ok(())
    }

    /// Palette assets in file order.
    pub fn assets(&self) -> Result<Vec<Arc<LoopAsset>>> {
        self.loops
            .iter()
            .map(|entry| entry.to_asset().map(Arc::new))
            .collect()
    }
}

// ============================================================================
// Tests
// ============================================================================
