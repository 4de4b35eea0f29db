//! Error handling for Loopkitchen
//!
//! Failures are local to the loop or slot that produced them. Only
//! configuration errors found at startup are fatal to a session.

use thiserror::Error;

/// Result type alias for Loopkitchen operations
pub type Result<T> = std::result::Result<T, KitchenError>;

/// Main error type for Loopkitchen operations
#[derive(Error, Debug)]
pub enum KitchenError {
    // Asset Errors
    #[error("Failed to load audio asset '{path}': {reason}")]
    AssetLoadFailure { path: String, reason: String },

    #[error("Unknown loop asset: {id}")]
    UnknownAsset { id: String },

    // Configuration Errors
    #[error("Invalid geometry: {reason}")]
    InvalidGeometry { reason: String },

    #[error("Invalid tempo: {bpm} bpm (must be a positive number)")]
    InvalidTempo { bpm: f64 },

    #[error("Invalid configuration: {reason}")]
    InvalidConfig { reason: String },

    // I/O Errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // Serialization Errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl KitchenError {
    /// Get the error code for this error type
    pub fn error_code(&self) -> &'static str {
        match self {
            KitchenError::AssetLoadFailure { .. } => "ASSET_LOAD_FAILURE",
            KitchenError::UnknownAsset { .. } => "UNKNOWN_ASSET",
            KitchenError::InvalidGeometry { .. } => "INVALID_GEOMETRY",
            KitchenError::InvalidTempo { .. } => "INVALID_TEMPO",
            KitchenError::InvalidConfig { .. } => "INVALID_CONFIG",
            KitchenError::Io(_) => "IO_ERROR",
            KitchenError::Serialization(_) => "SERIALIZATION_ERROR",
        }
    }

    /// Check if the session can keep running after this error
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            KitchenError::AssetLoadFailure { .. } | KitchenError::UnknownAsset { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        let err = KitchenError::AssetLoadFailure {
            path: "drums.wav".to_string(),
            reason: "missing".to_string(),
        };
        assert_eq!(err.error_code(), "ASSET_LOAD_FAILURE");
        assert_eq!(
            KitchenError::InvalidTempo { bpm: 0.0 }.error_code(),
            "INVALID_TEMPO"
        );
    }

    #[test]
    fn test_recoverability() {
        let load = KitchenError::AssetLoadFailure {
            path: "bass.wav".to_string(),
            reason: "not a WAV file".to_string(),
        };
        assert!(load.is_recoverable());

        let geometry = KitchenError::InvalidGeometry {
            reason: "radius must be positive".to_string(),
        };
        assert!(!geometry.is_recoverable());
    }

    #[test]
    fn test_messages_are_descriptive() {
        let err = KitchenError::InvalidTempo { bpm: -4.0 };
        assert!(err.to_string().contains("-4"));
    }
}
