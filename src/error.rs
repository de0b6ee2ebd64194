//! Error types for TrigIO

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// TrigIO error types
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Configuration file could not be parsed
    #[error("configuration error: {0}")]
    Config(#[from] toml::de::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serial port error
    #[error("serial port error: {0}")]
    Serial(#[from] serialport::Error),

    /// Listening socket could not be bound
    #[error("failed to bind to port {port}: {source}")]
    Bind {
        /// Requested UDP port
        port: u16,
        /// Underlying bind failure
        source: std::io::Error,
    },

    /// Requested output driver is not registered
    #[error("unknown output driver: {0}")]
    UnknownDriver(String),

    /// Driver options lack a required key
    #[error("missing driver option: {0}")]
    MissingOption(&'static str),

    /// Driver option present but unusable
    #[error("invalid driver option {key}: {value}")]
    InvalidOption {
        /// Option key
        key: &'static str,
        /// Rejected value
        value: String,
    },
}
