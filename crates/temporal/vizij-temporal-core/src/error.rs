//! Error types for the temporal property store

use serde::{Deserialize, Serialize};

/// Error type for ingestion and interpolation.
///
/// Queries never fail for lack of data; they return `None`. These variants
/// describe input that could not be applied.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum TemporalError {
    /// Packet interval or value field could not be decoded; nothing was applied
    #[error("Malformed packet: {reason}")]
    MalformedPacket { reason: String },

    /// Interpolation algorithm name is not one of the built-ins
    #[error("Unknown interpolation algorithm: {name}")]
    UnknownAlgorithm { name: String },

    /// A single sample was rejected; the rest of the batch was still merged
    #[error("Invalid sample at entry {index}: {reason}")]
    InvalidSample { index: usize, reason: String },

    /// Time designator could not be turned into an absolute time
    #[error("Invalid time: {reason}")]
    InvalidTime { reason: String },

    /// Interpolation tables could not be evaluated
    #[error("Interpolation error: {reason}")]
    Interpolation { reason: String },

    /// Serialization error
    #[error("Serialization error: {reason}")]
    Serialization { reason: String },
}

impl TemporalError {
    pub fn malformed(reason: impl Into<String>) -> Self {
        Self::MalformedPacket {
            reason: reason.into(),
        }
    }

    pub fn invalid_time(reason: impl Into<String>) -> Self {
        Self::InvalidTime {
            reason: reason.into(),
        }
    }

    /// Check if ingestion can continue past this error
    #[inline]
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::InvalidSample { .. } | Self::Interpolation { .. })
    }

    /// Get error category for logging
    #[inline]
    pub fn category(&self) -> &'static str {
        match self {
            Self::MalformedPacket { .. } | Self::Serialization { .. } => "packet",
            Self::UnknownAlgorithm { .. } | Self::Interpolation { .. } => "interpolation",
            Self::InvalidSample { .. } | Self::InvalidTime { .. } => "validation",
        }
    }
}

impl From<serde_json::Error> for TemporalError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            reason: err.to_string(),
        }
    }
}

impl From<chrono::ParseError> for TemporalError {
    fn from(err: chrono::ParseError) -> Self {
        Self::InvalidTime {
            reason: err.to_string(),
        }
    }
}
