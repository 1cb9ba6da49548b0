//! Error types for ipservice
//!
//! This module defines the error taxonomy shared by the decoder, the lookup
//! service and the outer configuration/download layers.

use thiserror::Error;

/// Main error type for ipservice
#[derive(Error, Debug)]
pub enum IpdbError {
    /// Database file is structurally unusable (short buffer, bad header,
    /// out-of-bounds pointer)
    #[error("Database format error: {0}")]
    Format(&'static str),

    /// Input text is not an IP address
    #[error("Invalid IP address: {0}")]
    InvalidAddress(String),

    /// Input is a valid address but not IPv4
    #[error("Address family not supported: {0}")]
    AddressFamilyUnsupported(String),

    /// No range in the database contains the address
    #[error("IP address not found in database")]
    NotFound,

    /// Country field could not be decoded as GBK
    #[error("Failed to decode country field")]
    DecodeCountry,

    /// Area field could not be decoded as GBK
    #[error("Failed to decode area field")]
    DecodeArea,

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Network error
    #[error("Network error: {0}")]
    Network(String),

    /// Download error
    #[error("Download failed: {0}")]
    Download(String),

    /// File I/O error
    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error
    #[error("YAML parse error: {0}")]
    Yaml(String),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for ipservice
pub type Result<T> = std::result::Result<T, IpdbError>;

impl IpdbError {
    /// Create a config error
    pub fn config<S: Into<String>>(msg: S) -> Self {
        IpdbError::Config(msg.into())
    }

    /// Create a network error
    pub fn network<S: Into<String>>(msg: S) -> Self {
        IpdbError::Network(msg.into())
    }

    /// Create a download error
    pub fn download<S: Into<String>>(msg: S) -> Self {
        IpdbError::Download(msg.into())
    }

    /// Fixed message safe to show to callers.
    ///
    /// Never includes offsets, buffer contents or file paths.
    pub fn user_message(&self) -> &'static str {
        match self {
            IpdbError::Format(_) => "database is corrupt or unreadable",
            IpdbError::InvalidAddress(_) => "invalid ip address",
            IpdbError::AddressFamilyUnsupported(_) => "only IPv4 addresses are supported",
            IpdbError::NotFound => "no data for this address",
            IpdbError::DecodeCountry => "failed to decode country",
            IpdbError::DecodeArea => "failed to decode area",
            IpdbError::Config(_) => "configuration error",
            IpdbError::Network(_) | IpdbError::Download(_) => "failed to fetch database",
            IpdbError::Io(_) => "failed to read database",
            IpdbError::Yaml(_) | IpdbError::Json(_) => "serialization error",
        }
    }

    /// Whether the failure was caused by the caller's input rather than
    /// the database or the environment.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            IpdbError::InvalidAddress(_)
                | IpdbError::AddressFamilyUnsupported(_)
                | IpdbError::DecodeCountry
                | IpdbError::DecodeArea
        )
    }
}
