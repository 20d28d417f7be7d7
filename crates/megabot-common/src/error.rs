//! Application-wide error type shared by the MegaBot crates.

/// Common result type for the application.
pub type Result<T> = std::result::Result<T, MegabotError>;

/// Application-wide error type.
#[derive(thiserror::Error, Debug)]
pub enum MegabotError {
    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Logging setup error.
    #[error("Logging error: {0}")]
    Logging(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl MegabotError {
    /// Creates a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }
}
