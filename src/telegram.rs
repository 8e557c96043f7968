//! Telegram Bot API client: outbound messages and file retrieval.
//!
//! The engine talks to this through the `MessageSender` and `FileFetcher`
//! traits so tests can swap in recording fakes.

use std::time::Duration;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};

use crate::error::{ChannelError, StagingError};

/// Delivers a text reply to a chat identity.
#[async_trait]
pub trait MessageSender: Send + Sync {
    async fn send(&self, chat_id: i64, text: &str) -> Result<(), ChannelError>;
}

/// Resolves an uploaded file id to its binary content.
///
/// Two-step on the wire: metadata lookup yielding a remote path, then a
/// content fetch from that path. Either failure surfaces as a `StagingError`.
#[async_trait]
pub trait FileFetcher: Send + Sync {
    async fn fetch(&self, file_id: &str) -> Result<Vec<u8>, StagingError>;
}

/// Concrete Bot API client backing both traits.
pub struct TelegramApi {
    bot_token: SecretString,
    client: reqwest::Client,
}

impl TelegramApi {
    pub fn new(bot_token: SecretString, timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_default();
        Self { bot_token, client }
    }

    fn api_url(&self, method: &str) -> String {
        format!(
            "https://api.telegram.org/bot{}/{method}",
            self.bot_token.expose_secret()
        )
    }

    fn file_url(&self, remote_path: &str) -> String {
        format!(
            "https://api.telegram.org/file/bot{}/{remote_path}",
            self.bot_token.expose_secret()
        )
    }
}

#[async_trait]
impl MessageSender for TelegramApi {
    async fn send(&self, chat_id: i64, text: &str) -> Result<(), ChannelError> {
        let body = serde_json::json!({
            "chat_id": chat_id,
            "text": text,
        });

        let resp = self
            .client
            .post(self.api_url("sendMessage"))
            .json(&body)
            .send()
            .await
            .map_err(|e| ChannelError::SendFailed {
                reason: e.to_string(),
            })?;

        if !resp.status().is_success() {
            let status = resp.status();
            let err = resp.text().await.unwrap_or_default();
            return Err(ChannelError::SendFailed {
                reason: format!("sendMessage returned {status}: {err}"),
            });
        }

        tracing::debug!(chat_id, "Telegram message sent");
        Ok(())
    }
}

#[async_trait]
impl FileFetcher for TelegramApi {
    async fn fetch(&self, file_id: &str) -> Result<Vec<u8>, StagingError> {
        // Step 1: metadata lookup.
        let resp = self
            .client
            .get(self.api_url("getFile"))
            .query(&[("file_id", file_id)])
            .send()
            .await
            .map_err(|e| StagingError::Metadata(e.to_string()))?;

        let info: serde_json::Value = resp
            .json()
            .await
            .map_err(|e| StagingError::Metadata(e.to_string()))?;

        if !info.get("ok").and_then(serde_json::Value::as_bool).unwrap_or(false) {
            return Err(StagingError::Metadata(format!(
                "getFile returned not-ok for file_id {file_id}"
            )));
        }

        let remote_path = info
            .get("result")
            .and_then(|r| r.get("file_path"))
            .and_then(serde_json::Value::as_str)
            .ok_or_else(|| StagingError::Metadata("getFile response missing file_path".into()))?;

        // Step 2: content fetch.
        let resp = self
            .client
            .get(self.file_url(remote_path))
            .send()
            .await
            .map_err(|e| StagingError::Fetch(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(StagingError::Fetch(format!(
                "file download returned {}",
                resp.status()
            )));
        }

        let bytes = resp
            .bytes()
            .await
            .map_err(|e| StagingError::Fetch(e.to_string()))?;

        Ok(bytes.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn api(token: &str) -> TelegramApi {
        TelegramApi::new(SecretString::from(token.to_string()), Duration::from_secs(5))
    }

    #[test]
    fn api_url_embeds_token_and_method() {
        let tg = api("123:ABC");
        assert_eq!(
            tg.api_url("sendMessage"),
            "https://api.telegram.org/bot123:ABC/sendMessage"
        );
        assert_eq!(
            tg.api_url("getFile"),
            "https://api.telegram.org/bot123:ABC/getFile"
        );
    }

    #[test]
    fn file_url_uses_file_prefix() {
        let tg = api("123:ABC");
        assert_eq!(
            tg.file_url("documents/file_7.pdf"),
            "https://api.telegram.org/file/bot123:ABC/documents/file_7.pdf"
        );
    }
}
