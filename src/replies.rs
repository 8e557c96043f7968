//! Every fixed outbound reply the bot can produce.
//!
//! The engine never silently drops an event: each branch ends in exactly one
//! of these strings (or a formatted variant below).

use crate::session::FileKind;

pub const START: &str = "Welcome to TaskSimplifierBot!\n\
    I can help you send emails with text, photos, and files.\n\
    Type /help for a list of commands.";

pub const HELP: &str = "Available commands:\n\n\
    /start - Start the bot\n\
    /help - Show this help message\n\
    /send_mail - Send an email\n\
    /remind - Set a reminder (/remind <minutes> <task>)\n\
    /cancel - Cancel current operation\n\n\
    When sending mail, you can:\n\
    1. Send text messages\n\
    2. Send photos\n\
    3. Send files (PDF, DOC, etc.)";

pub const NOT_RECOGNIZED: &str =
    "Sorry, I don't recognize that command. Type /help for a list of commands.";

pub const GENERIC_PROMPT: &str =
    "Please send a text message or use /help for available commands.";

pub const CANCELLED: &str = "Operation cancelled. You can start again with /send_mail";

pub const ASK_EMAIL: &str = "Please enter the recipient's email address:";
pub const INVALID_EMAIL: &str = "Please enter a valid email address.";

pub const ASK_CONTENT_TYPE: &str = "What type of content would you like to send?\n\
    1. Text message\n\
    2. Photo\n\
    3. File\n\
    Please enter the number (1-3):";
pub const INVALID_CONTENT_CHOICE: &str =
    "Invalid choice. Please enter a number between 1 and 3.";
pub const MISSING_CONTENT_CHOICE: &str = "Please enter a number between 1 and 3.";

pub const ASK_TEXT: &str = "Please enter the text message you want to send:";
pub const MISSING_TEXT: &str = "Please enter your message text.";

pub const ASK_RENAME_PHOTO: &str =
    "Would you like to rename your photo?\n1. Yes\n2. No (use original name)";
pub const ASK_RENAME_FILE: &str =
    "Would you like to rename your file?\n1. Yes\n2. No (use original name)";
pub const RENAME_NEEDS_TEXT: &str = "Please enter 1 for Yes or 2 for No.";
pub const INVALID_RENAME_CHOICE: &str = "Invalid choice. Please enter 1 for Yes or 2 for No.";

pub const ASK_NEW_NAME_PHOTO: &str = "Please enter the new name for your photo:";
pub const ASK_NEW_NAME_FILE: &str = "Please enter the new name for your file:";
pub const INVALID_NEW_NAME: &str = "Please enter a valid name.";

pub const ASK_UPLOAD_PHOTO: &str = "Please upload the photo:";
pub const ASK_UPLOAD_FILE: &str = "Please upload the file:";
pub const INVALID_FILE: &str = "Please send a valid file or photo.";
pub const STAGING_FAILED: &str = "Failed to process the file. Please try again.";

pub const MISSING_DESCRIPTION: &str = "Please enter a description or type 'skip'.";

pub const ASK_SUBJECT: &str =
    "Please enter the subject for your email (or type 'skip' for default subject):";
pub const MISSING_SUBJECT: &str = "Please enter a subject for your email.";
pub const DEFAULT_SUBJECT: &str = "Message from TaskSimplifier Bot";

pub const FILE_MISSING: &str = "Error: File not found. Please start again with /send_mail";

pub const INTERNAL_ERROR: &str = "An error occurred. Please try again with /send_mail";

pub const REMINDER_SET: &str = "Reminder set!";
pub const INVALID_REMIND: &str = "Usage: /remind <minutes> <task>";

/// Prompt sent once a file or photo has been staged.
pub fn received_prompt(kind: FileKind) -> String {
    let label = match kind {
        FileKind::Photo => "Photo",
        FileKind::Document => "Document",
    };
    format!(
        "{label} received! Would you like to add a description? \
         (or type 'skip' to proceed without description):"
    )
}

/// Terminal reply reporting the send outcome plus the mail client's message.
pub fn send_outcome(ok: bool, email: &str, detail: &str) -> String {
    let status = if ok {
        "sent successfully to"
    } else {
        "failed to send to"
    };
    format!("Content {status} {email}\n{detail}")
}

/// Reminder fired back to the chat.
pub fn reminder_fired(task: &str) -> String {
    format!("Reminder: {task}")
}
