//! Error types for the TaskSimplifier bot.

use std::path::PathBuf;

/// Top-level error type for the bot.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Channel error: {0}")]
    Channel(#[from] ChannelError),

    #[error("Staging error: {0}")]
    Staging(#[from] StagingError),

    #[error("Mail error: {0}")]
    Mail(#[from] MailError),
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// Outbound chat delivery errors.
#[derive(Debug, thiserror::Error)]
pub enum ChannelError {
    #[error("Failed to send message: {reason}")]
    SendFailed { reason: String },

    #[error("HTTP error: {0}")]
    Http(String),
}

/// File staging errors — metadata lookup, content fetch, or local write.
///
/// A staging error never advances the session; the user may retry the upload.
#[derive(Debug, thiserror::Error)]
pub enum StagingError {
    #[error("File metadata lookup failed: {0}")]
    Metadata(String),

    #[error("File content fetch failed: {0}")]
    Fetch(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Mail dispatch errors.
#[derive(Debug, thiserror::Error)]
pub enum MailError {
    #[error("Invalid address {address}: {reason}")]
    InvalidAddress { address: String, reason: String },

    #[error("Failed to build email: {0}")]
    Build(String),

    #[error("SMTP send failed: {0}")]
    Transport(String),

    #[error("Attachment not found: {0}")]
    AttachmentMissing(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for the bot.
pub type Result<T> = std::result::Result<T, Error>;
