//! # Error Types
//!
//! Custom error types for PowerSteer Bridge using `thiserror`.

use std::net::SocketAddr;

use thiserror::Error;

/// Main error type for PowerSteer Bridge
#[derive(Debug, Error)]
pub enum BridgeError {
    /// Configuration values out of range
    #[error("Configuration error: {0}")]
    Config(String),

    /// Configuration file could not be parsed
    #[error("Configuration parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Listening socket could not be bound
    #[error("Failed to bind UDP socket on {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    /// Virtual joystick device errors
    #[error("Virtual device error: {0}")]
    Device(String),
}

/// Result type alias for PowerSteer Bridge
pub type Result<T> = std::result::Result<T, BridgeError>;
