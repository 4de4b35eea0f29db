//! Immutable loop descriptors

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{KitchenError, Result};

/// Channel category of a loop; also the index of its channel in a slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoopCategory {
    #[serde(alias = "drum", alias = "drums")]
    Rhythm,
    Bass,
    Lead,
}

impl LoopCategory {
    /// All categories in channel order
    pub const ALL: [LoopCategory; 3] = [
        LoopCategory::Rhythm,
        LoopCategory::Bass,
        LoopCategory::Lead,
    ];

    pub const COUNT: usize = Self::ALL.len();

    /// Position of this category's channel within a slot
    pub fn index(self) -> usize {
        match self {
            LoopCategory::Rhythm => 0,
            LoopCategory::Bass => 1,
            LoopCategory::Lead => 2,
        }
    }
}

impl fmt::Display for LoopCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(match self {
            LoopCategory::Rhythm => "Rhythm",
            LoopCategory::Bass => "Bass",
            LoopCategory::Lead => "Lead",
        })
    }
}

/// 24-bit RGB colour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color(pub u32);

impl Color {
    pub const WHITE: Color = Color(0xFF_FF_FF);

    /// Parse `0xRRGGBB`, `#RRGGBB` or `RRGGBB`
    pub fn from_hex(text: &str) -> Result<Self> {
        let trimmed = text.trim();
        let digits = trimmed
            .strip_prefix("0x")
            .or_else(|| trimmed.strip_prefix("0X"))
            .or_else(|| trimmed.strip_prefix('#'))
            .unwrap_or(trimmed);

        let value = u32::from_str_radix(digits, 16).map_err(|_| KitchenError::InvalidConfig {
            reason: format!("invalid colour '{}'", text),
        })?;
        if value > 0xFF_FF_FF {
            return Err(KitchenError::InvalidConfig {
                reason: format!("colour '{}' exceeds 24 bits", text),
            });
        }
        Ok(Color(value))
    }

    pub fn rgb(self) -> (u8, u8, u8) {
        (
            ((self.0 >> 16) & 0xFF) as u8,
            ((self.0 >> 8) & 0xFF) as u8,
            (self.0 & 0xFF) as u8,
        )
    }
}

impl Default for Color {
    fn default() -> Self {
        Color::WHITE
    }
}

/// A loop as configured in the palette. Never mutated after creation.
#[derive(Debug, Clone, PartialEq)]
pub struct LoopAsset {
    id: String,
    category: LoopCategory,
    path: PathBuf,
    color: Color,
    default_beat_length: u32,
    lifetime_ms: Option<u64>,
}

impl LoopAsset {
    /// `lifetime_ms` of `None` means the loop never expires
    pub fn new(
        id: impl Into<String>,
        category: LoopCategory,
        path: impl Into<PathBuf>,
        color: Color,
        default_beat_length: u32,
        lifetime_ms: Option<u64>,
    ) -> Self {
        Self {
            id: id.into(),
            category,
            path: path.into(),
            color,
            default_beat_length,
            lifetime_ms,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn category(&self) -> LoopCategory {
        self.category
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn color(&self) -> Color {
        self.color
    }

    /// Length of the loop in beats
    pub fn default_beat_length(&self) -> u32 {
        self.default_beat_length
    }

    pub fn lifetime_ms(&self) -> Option<u64> {
        self.lifetime_ms
    }
}
