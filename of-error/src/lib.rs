//! Unified error handling for Octofan
//!
//! This crate provides a single error type used across all Octofan components.
//! It uses thiserror for ergonomic error definitions with proper Display and Error trait impls.

use std::io;
use std::path::PathBuf;

/// Result type alias using OctoError
pub type Result<T> = std::result::Result<T, OctoError>;

/// Unified error type for all Octofan operations
#[derive(thiserror::Error, Debug)]
pub enum OctoError {
    // ============================================================================
    // I/O and File System Errors
    // ============================================================================
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        source: io::Error,
    },

    #[error("Failed to write file {path}: {source}")]
    FileWrite {
        path: PathBuf,
        source: io::Error,
    },

    #[error("Device not found: {0}")]
    DeviceNotFound(PathBuf),

    // ============================================================================
    // Frame Decoding Errors
    // ============================================================================
    #[error("Malformed frame: {len} bytes (need at least {required})")]
    MalformedFrame {
        len: usize,
        required: usize,
    },

    #[error("Invalid field layout: {0}")]
    InvalidLayout(String),

    // ============================================================================
    // Sensor Query Errors
    // ============================================================================
    #[error("No data: sensor values are stale")]
    Stale,

    #[error("Channel {index} out of range for {sensor} (has {count} channels)")]
    ChannelOutOfRange {
        sensor: String,
        index: usize,
        count: usize,
    },

    #[error("Unsupported sensor type: {0}")]
    UnsupportedSensor(String),

    #[error("Unknown attribute: {0}")]
    UnknownAttribute(String),

    // ============================================================================
    // Configuration Errors
    // ============================================================================
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("Invalid configuration value for {field}: {reason}")]
    InvalidConfig {
        field: String,
        reason: String,
    },

    // ============================================================================
    // Generic Errors
    // ============================================================================
    #[error("{0}")]
    Generic(String),
}

impl OctoError {
    /// Create a generic error from a string
    pub fn generic(msg: impl Into<String>) -> Self {
        Self::Generic(msg.into())
    }

    /// Create a config error from a string
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an invalid config value error
    pub fn invalid_config(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Create a channel range error
    pub fn out_of_range(sensor: impl Into<String>, index: usize, count: usize) -> Self {
        Self::ChannelOutOfRange {
            sensor: sensor.into(),
            index,
            count,
        }
    }

    /// True for errors a caller is expected to retry later
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Stale)
    }
}

// Allow converting from String to OctoError
impl From<String> for OctoError {
    fn from(s: String) -> Self {
        Self::Generic(s)
    }
}

// Allow converting from &str to OctoError
impl From<&str> for OctoError {
    fn from(s: &str) -> Self {
        Self::Generic(s.to_string())
    }
}
