//! Configuration types, built from environment variables.

use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;

use crate::error::ConfigError;

/// Bot process configuration.
#[derive(Debug, Clone)]
pub struct BotConfig {
    /// Telegram Bot API token.
    pub bot_token: SecretString,
    /// Port the webhook server listens on.
    pub port: u16,
    /// Directory where uploaded files are staged before sending.
    pub staging_dir: PathBuf,
    /// Timeout applied to every outbound HTTP call.
    pub request_timeout: Duration,
}

impl BotConfig {
    /// Build config from environment variables.
    ///
    /// `BOT_TOKEN` is required; everything else has a default.
    pub fn from_env() -> Result<Self, ConfigError> {
        let bot_token = std::env::var("BOT_TOKEN")
            .map_err(|_| ConfigError::MissingEnvVar("BOT_TOKEN".into()))?;

        let port: u16 = match std::env::var("PORT") {
            Ok(raw) => raw.parse().map_err(|_| ConfigError::InvalidValue {
                key: "PORT".into(),
                message: format!("not a valid port number: {raw}"),
            })?,
            Err(_) => 5002,
        };

        let staging_dir = std::env::var("STAGING_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("temp_files"));

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(30);

        Ok(Self {
            bot_token: SecretString::from(bot_token),
            port,
            staging_dir,
            request_timeout: Duration::from_secs(request_timeout_secs),
        })
    }
}

/// Outbound SMTP configuration.
#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: SecretString,
    pub from_address: String,
}

impl SmtpConfig {
    /// Build config from environment variables.
    ///
    /// `SMTP_USER` and `SMTP_PASS` are required.
    pub fn from_env() -> Result<Self, ConfigError> {
        let username = std::env::var("SMTP_USER")
            .map_err(|_| ConfigError::MissingEnvVar("SMTP_USER".into()))?;
        let password = std::env::var("SMTP_PASS")
            .map_err(|_| ConfigError::MissingEnvVar("SMTP_PASS".into()))?;

        let host = std::env::var("SMTP_HOST").unwrap_or_else(|_| "smtp.gmail.com".into());

        let port: u16 = std::env::var("SMTP_PORT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(587);

        let from_address = std::env::var("SMTP_FROM").unwrap_or_else(|_| username.clone());

        Ok(Self {
            host,
            port,
            username,
            password: SecretString::from(password),
            from_address,
        })
    }
}
