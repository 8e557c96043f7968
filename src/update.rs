//! Inbound webhook payload types, shaped like Telegram's `Update` object.

use serde::Deserialize;

/// An inbound webhook event. Events without a `message` are ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct Update {
    pub message: Option<MessageIn>,
}

/// An inbound chat message carrying text, a photo, or a document.
#[derive(Debug, Clone, Deserialize)]
pub struct MessageIn {
    pub chat: Chat,
    #[serde(default)]
    pub text: Option<String>,
    /// Photo variants, smallest first. The last element is the
    /// highest-resolution rendition.
    #[serde(default)]
    pub photo: Option<Vec<PhotoSize>>,
    #[serde(default)]
    pub document: Option<Document>,
}

impl MessageIn {
    /// Whether this message carries any attachment payload.
    pub fn has_attachment(&self) -> bool {
        self.document.is_some() || self.photo.as_ref().is_some_and(|p| !p.is_empty())
    }

    /// The highest-resolution photo variant, if any.
    pub fn best_photo(&self) -> Option<&PhotoSize> {
        self.photo.as_ref().and_then(|p| p.last())
    }
}

/// The chat identity an event belongs to.
#[derive(Debug, Clone, Deserialize)]
pub struct Chat {
    pub id: i64,
}

/// One photo rendition.
#[derive(Debug, Clone, Deserialize)]
pub struct PhotoSize {
    pub file_id: String,
    #[serde(default)]
    pub width: u32,
    #[serde(default)]
    pub height: u32,
}

/// A document attachment with its original filename.
#[derive(Debug, Clone, Deserialize)]
pub struct Document {
    pub file_id: String,
    #[serde(default)]
    pub file_name: Option<String>,
}
