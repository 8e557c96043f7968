//! Conversation Engine — routes each inbound event through command handling
//! and the per-chat state machine, producing exactly one outbound reply.
//!
//! Collaborators (message delivery, mail dispatch, file retrieval) are
//! injected as trait objects. Nothing below `handle_update` escapes as an
//! error: every failure becomes a reply string.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::Mutex;

use crate::mailer::MailClient;
use crate::reminder::{self, Reminder};
use crate::replies;
use crate::session::{ContentKind, FileKind, Session, SessionStore, Step};
use crate::staging::{self, Staging};
use crate::telegram::{FileFetcher, MessageSender};
use crate::update::{MessageIn, Update};
use crate::validate;

/// The conversation engine. One instance serves all chats.
pub struct Engine {
    sessions: SessionStore,
    sender: Arc<dyn MessageSender>,
    mailer: Arc<dyn MailClient>,
    fetcher: Arc<dyn FileFetcher>,
    staging: Staging,
    reminders: Mutex<Vec<Reminder>>,
}

impl Engine {
    pub fn new(
        sender: Arc<dyn MessageSender>,
        mailer: Arc<dyn MailClient>,
        fetcher: Arc<dyn FileFetcher>,
        staging: Staging,
    ) -> Self {
        Self {
            sessions: SessionStore::new(),
            sender,
            mailer,
            fetcher,
            staging,
            reminders: Mutex::new(Vec::new()),
        }
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    /// Handle one inbound webhook event end to end: compute the reply under
    /// the chat's event lock, deliver it, and report a fixed status string
    /// back to the transport. Delivery failures are logged, never escalated.
    pub async fn handle_update(&self, update: Update) -> &'static str {
        let Some(message) = update.message else {
            tracing::debug!("Update without message; ignoring");
            return "Ignored.";
        };
        let chat_id = message.chat.id;

        // Serialize events per chat: a rapid second message (or /cancel)
        // waits for any staging or send in flight for this chat.
        let _guard = self.sessions.lock_chat(chat_id).await;

        let reply = self.process(chat_id, &message).await;

        match self.sender.send(chat_id, &reply).await {
            Ok(()) => "Message sent successfully.",
            Err(e) => {
                tracing::error!(chat_id, "Failed to deliver reply: {e}");
                "Failed to send message."
            }
        }
    }

    /// Route one message to the right handler. Always returns a reply.
    async fn process(&self, chat_id: i64, msg: &MessageIn) -> String {
        let text = msg.text.as_deref();

        // Cancel wins over everything while a session exists.
        if text == Some("/cancel")
            && let Some(session) = self.sessions.remove(chat_id).await
        {
            if let Some(path) = session.staged_file {
                self.staging.remove(&path).await;
            }
            tracing::info!(chat_id, "Session cancelled");
            return replies::CANCELLED.into();
        }

        if let Some(session) = self.sessions.get(chat_id).await {
            return self.step(chat_id, session, msg).await;
        }

        match text {
            Some(t) if t.starts_with("/start") => replies::START.into(),
            Some(t) if t.starts_with("/help") => replies::HELP.into(),
            Some(t) if t.starts_with("/send_mail") => {
                self.sessions.set(chat_id, Session::new()).await;
                tracing::info!(chat_id, "Mail flow started");
                replies::ASK_EMAIL.into()
            }
            Some(t) if t.starts_with("/remind") => self.schedule_reminder(chat_id, t).await,
            Some(_) => replies::NOT_RECOGNIZED.into(),
            None => replies::GENERIC_PROMPT.into(),
        }
    }

    /// Dispatch on the current step of an in-progress session.
    async fn step(&self, chat_id: i64, session: Session, msg: &MessageIn) -> String {
        let text = msg.text.as_deref();
        match session.step {
            Step::WaitingForEmail => self.on_email(chat_id, session, text).await,
            Step::WaitingForContentType => self.on_content_type(chat_id, session, text).await,
            Step::WaitingForTextMessage => self.on_text_message(chat_id, session, text).await,
            Step::WaitingForRename => self.on_rename_choice(chat_id, session, text).await,
            Step::WaitingForNewName => self.on_new_name(chat_id, session, text).await,
            Step::WaitingForFile => self.on_file(chat_id, session, msg).await,
            Step::WaitingForDescription => self.on_description(chat_id, session, text).await,
            Step::WaitingForSubject => self.on_subject(chat_id, session, text).await,
        }
    }

    async fn on_email(&self, chat_id: i64, mut session: Session, text: Option<&str>) -> String {
        let Some(text) = text else {
            return replies::INVALID_EMAIL.into();
        };
        if !validate::looks_like_email(text) {
            return replies::INVALID_EMAIL.into();
        }
        session.email = Some(text.to_string());
        session.step = Step::WaitingForContentType;
        self.sessions.set(chat_id, session).await;
        replies::ASK_CONTENT_TYPE.into()
    }

    async fn on_content_type(
        &self,
        chat_id: i64,
        mut session: Session,
        text: Option<&str>,
    ) -> String {
        let Some(text) = text else {
            return replies::MISSING_CONTENT_CHOICE.into();
        };
        let Some(choice) = validate::menu_choice(text, 3) else {
            return replies::INVALID_CONTENT_CHOICE.into();
        };
        let (kind, step, reply) = match choice {
            1 => (ContentKind::Text, Step::WaitingForTextMessage, replies::ASK_TEXT),
            2 => (ContentKind::Photo, Step::WaitingForRename, replies::ASK_RENAME_PHOTO),
            _ => (ContentKind::File, Step::WaitingForRename, replies::ASK_RENAME_FILE),
        };
        session.content_type = Some(kind);
        session.step = step;
        self.sessions.set(chat_id, session).await;
        reply.into()
    }

    async fn on_text_message(
        &self,
        chat_id: i64,
        mut session: Session,
        text: Option<&str>,
    ) -> String {
        let Some(text) = text else {
            return replies::MISSING_TEXT.into();
        };
        session.text_message = Some(text.to_string());
        session.step = Step::WaitingForSubject;
        self.sessions.set(chat_id, session).await;
        replies::ASK_SUBJECT.into()
    }

    async fn on_rename_choice(
        &self,
        chat_id: i64,
        mut session: Session,
        text: Option<&str>,
    ) -> String {
        let Some(text) = text else {
            return replies::RENAME_NEEDS_TEXT.into();
        };
        let Some(choice) = validate::menu_choice(text, 2) else {
            return replies::INVALID_RENAME_CHOICE.into();
        };
        let wants_photo = session.content_type == Some(ContentKind::Photo);
        let (step, reply) = if choice == 1 {
            let ask = if wants_photo {
                replies::ASK_NEW_NAME_PHOTO
            } else {
                replies::ASK_NEW_NAME_FILE
            };
            (Step::WaitingForNewName, ask)
        } else {
            let ask = if wants_photo {
                replies::ASK_UPLOAD_PHOTO
            } else {
                replies::ASK_UPLOAD_FILE
            };
            (Step::WaitingForFile, ask)
        };
        session.step = step;
        self.sessions.set(chat_id, session).await;
        reply.into()
    }

    async fn on_new_name(&self, chat_id: i64, mut session: Session, text: Option<&str>) -> String {
        let name = text.map(str::trim).unwrap_or_default();
        if name.is_empty() {
            return replies::INVALID_NEW_NAME.into();
        }
        session.new_filename = Some(name.to_string());
        session.step = Step::WaitingForFile;
        let reply = if session.content_type == Some(ContentKind::Photo) {
            replies::ASK_UPLOAD_PHOTO
        } else {
            replies::ASK_UPLOAD_FILE
        };
        self.sessions.set(chat_id, session).await;
        reply.into()
    }

    /// File staging step. Failures leave the step unchanged so the user can
    /// retry the upload.
    async fn on_file(&self, chat_id: i64, mut session: Session, msg: &MessageIn) -> String {
        let (file_id, kind, extension, original) = if let Some(photo) = msg.best_photo() {
            let name = staging::photo_filename(Utc::now().timestamp());
            (photo.file_id.clone(), FileKind::Photo, ".jpg".to_string(), name)
        } else if let Some(doc) = &msg.document {
            let name = doc.file_name.clone().unwrap_or_else(|| "file".to_string());
            let ext = staging::extension_of(&name).to_string();
            (doc.file_id.clone(), FileKind::Document, ext, name)
        } else {
            return replies::INVALID_FILE.into();
        };

        let bytes = match self.fetcher.fetch(&file_id).await {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::warn!(chat_id, "File retrieval failed: {e}");
                return replies::STAGING_FAILED.into();
            }
        };

        let filename = staging::final_filename(&original, &extension, session.new_filename.as_deref());
        let path = match self.staging.stage(&filename, &bytes).await {
            Ok(path) => path,
            Err(e) => {
                tracing::warn!(chat_id, "Staging write failed: {e}");
                return replies::STAGING_FAILED.into();
            }
        };

        session.staged_file = Some(path);
        session.file_kind = Some(kind);
        session.step = Step::WaitingForDescription;
        self.sessions.set(chat_id, session).await;
        replies::received_prompt(kind)
    }

    async fn on_description(
        &self,
        chat_id: i64,
        mut session: Session,
        text: Option<&str>,
    ) -> String {
        let Some(text) = text else {
            return replies::MISSING_DESCRIPTION.into();
        };
        session.description = if validate::is_skip(text) {
            None
        } else {
            Some(text.to_string())
        };
        session.step = Step::WaitingForSubject;
        self.sessions.set(chat_id, session).await;
        replies::ASK_SUBJECT.into()
    }

    /// Terminal step: pick the subject, send the email, destroy the session.
    async fn on_subject(&self, chat_id: i64, session: Session, text: Option<&str>) -> String {
        let Some(text) = text else {
            return replies::MISSING_SUBJECT.into();
        };
        let subject = if validate::is_skip(text) {
            replies::DEFAULT_SUBJECT.to_string()
        } else {
            text.to_string()
        };

        let Some(email) = session.email.clone() else {
            return self.abort_session(chat_id, "session missing email at send").await;
        };

        let (ok, detail) = match session.content_type {
            Some(ContentKind::Text) => {
                let Some(body) = session.text_message.clone() else {
                    return self.abort_session(chat_id, "session missing text at send").await;
                };
                self.mailer.send_text(&email, &subject, &body).await
            }
            Some(ContentKind::Photo) | Some(ContentKind::File) => {
                let Some(path) = session.staged_file.clone() else {
                    return self.abort_session(chat_id, "session missing staged file").await;
                };
                if !tokio::fs::try_exists(&path).await.unwrap_or(false) {
                    // The staged file vanished. Destroy the session rather
                    // than leave it dangling with a stale path.
                    tracing::warn!(chat_id, path = %path.display(), "Staged file missing at send");
                    self.sessions.remove(chat_id).await;
                    return replies::FILE_MISSING.into();
                }

                let kind = session.file_kind.unwrap_or(FileKind::Document);
                let mut body = format!("Please see the attached {kind}");
                if let Some(description) = &session.description {
                    body.push_str(&format!("\n\nDescription: {description}"));
                }

                let outcome = self
                    .mailer
                    .send_attachment(&email, &subject, &body, &path)
                    .await;
                // The staged file is consumed by the send attempt either way.
                self.staging.remove(&path).await;
                outcome
            }
            None => {
                return self
                    .abort_session(chat_id, "session missing content type at send")
                    .await;
            }
        };

        self.sessions.remove(chat_id).await;
        tracing::info!(chat_id, ok, "Mail flow finished");
        replies::send_outcome(ok, &email, &detail)
    }

    /// Broken-invariant escape hatch: log, drop the session, tell the user
    /// to restart.
    async fn abort_session(&self, chat_id: i64, reason: &str) -> String {
        tracing::error!(chat_id, "Aborting session: {reason}");
        if let Some(session) = self.sessions.remove(chat_id).await
            && let Some(path) = session.staged_file
        {
            self.staging.remove(&path).await;
        }
        replies::INTERNAL_ERROR.into()
    }

    async fn schedule_reminder(&self, chat_id: i64, text: &str) -> String {
        let Some((minutes, task)) = reminder::parse_remind_args(text) else {
            return replies::INVALID_REMIND.into();
        };
        let reminder = Reminder::schedule(
            Arc::clone(&self.sender),
            chat_id,
            Duration::from_secs(minutes * 60),
            task,
        );
        let mut reminders = self.reminders.lock().await;
        reminders.retain(|r| !r.is_finished());
        reminders.push(reminder);
        replies::REMINDER_SET.into()
    }
}
