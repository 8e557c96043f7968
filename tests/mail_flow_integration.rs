//! Integration tests for the webhook mail flow.
//!
//! Each test spins up the Axum webhook server on a random port with stub
//! collaborators and drives a whole conversation through POST /message,
//! the way the real transport would.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;
use tokio::net::TcpListener;
use tokio::time::timeout;

use task_simplifier::engine::Engine;
use task_simplifier::error::{ChannelError, StagingError};
use task_simplifier::mailer::MailClient;
use task_simplifier::staging::Staging;
use task_simplifier::telegram::{FileFetcher, MessageSender};
use task_simplifier::webhook::webhook_routes;

/// Maximum time any test is allowed to run before we consider it hung.
const TEST_TIMEOUT: Duration = Duration::from_secs(5);

// ── Stub collaborators ──────────────────────────────────────────────

struct StubSender {
    sent: Mutex<Vec<(i64, String)>>,
}

#[async_trait]
impl MessageSender for StubSender {
    async fn send(&self, chat_id: i64, text: &str) -> Result<(), ChannelError> {
        self.sent.lock().unwrap().push((chat_id, text.to_string()));
        Ok(())
    }
}

#[derive(Debug, Clone)]
struct SentMail {
    to: String,
    subject: String,
    body: String,
    attachment: Option<PathBuf>,
}

struct StubMailer {
    sent: Mutex<Vec<SentMail>>,
}

#[async_trait]
impl MailClient for StubMailer {
    async fn send_text(&self, to: &str, subject: &str, body: &str) -> (bool, String) {
        self.sent.lock().unwrap().push(SentMail {
            to: to.into(),
            subject: subject.into(),
            body: body.into(),
            attachment: None,
        });
        (true, "Email sent successfully!".into())
    }

    async fn send_attachment(
        &self,
        to: &str,
        subject: &str,
        body: &str,
        path: &Path,
    ) -> (bool, String) {
        self.sent.lock().unwrap().push(SentMail {
            to: to.into(),
            subject: subject.into(),
            body: body.into(),
            attachment: Some(path.to_path_buf()),
        });
        (true, "Email with attachment sent successfully!".into())
    }
}

struct StubFetcher;

#[async_trait]
impl FileFetcher for StubFetcher {
    async fn fetch(&self, _file_id: &str) -> Result<Vec<u8>, StagingError> {
        Ok(b"fake file bytes".to_vec())
    }
}

struct TestServer {
    addr: SocketAddr,
    client: reqwest::Client,
    sender: Arc<StubSender>,
    mailer: Arc<StubMailer>,
    _staging_dir: tempfile::TempDir,
}

impl TestServer {
    async fn start() -> Self {
        let staging_dir = tempfile::tempdir().unwrap();
        let sender = Arc::new(StubSender {
            sent: Mutex::new(Vec::new()),
        });
        let mailer = Arc::new(StubMailer {
            sent: Mutex::new(Vec::new()),
        });
        let engine = Arc::new(Engine::new(
            Arc::clone(&sender) as Arc<dyn MessageSender>,
            Arc::clone(&mailer) as Arc<dyn MailClient>,
            Arc::new(StubFetcher) as Arc<dyn FileFetcher>,
            Staging::new(staging_dir.path()),
        ));

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let app = webhook_routes(engine);
        tokio::spawn(async move {
            axum::serve(listener, app).await.ok();
        });

        Self {
            addr,
            client: reqwest::Client::new(),
            sender,
            mailer,
            _staging_dir: staging_dir,
        }
    }

    async fn post_text(&self, chat_id: i64, text: &str) -> String {
        self.post(json!({"message": {"chat": {"id": chat_id}, "text": text}}))
            .await
    }

    async fn post(&self, body: serde_json::Value) -> String {
        let resp = self
            .client
            .post(format!("http://{}/message", self.addr))
            .json(&body)
            .send()
            .await
            .unwrap();
        assert!(resp.status().is_success());
        resp.text().await.unwrap()
    }

    fn replies(&self) -> Vec<(i64, String)> {
        self.sender.sent.lock().unwrap().clone()
    }

    fn mails(&self) -> Vec<SentMail> {
        self.mailer.sent.lock().unwrap().clone()
    }
}

// ── Scenarios ───────────────────────────────────────────────────────

#[tokio::test]
async fn text_email_flow_end_to_end() {
    timeout(TEST_TIMEOUT, async {
        let server = TestServer::start().await;

        for input in ["/send_mail", "a@b.com", "1", "hello world"] {
            let status = server.post_text(42, input).await;
            assert_eq!(status, "Message sent successfully.");
        }
        let replies_before = server.replies().len();

        server.post_text(42, "skip").await;

        // Exactly one reply for the terminal event, reporting the outcome.
        let replies = server.replies();
        assert_eq!(replies.len(), replies_before + 1);
        let (chat_id, last) = replies.last().unwrap().clone();
        assert_eq!(chat_id, 42);
        assert_eq!(
            last,
            "Content sent successfully to a@b.com\nEmail sent successfully!"
        );

        let mails = server.mails();
        assert_eq!(mails.len(), 1);
        assert_eq!(mails[0].to, "a@b.com");
        assert_eq!(mails[0].subject, "Message from TaskSimplifier Bot");
        assert_eq!(mails[0].body, "hello world");
        assert!(mails[0].attachment.is_none());

        // Flow is over: the next free-text message is outside a session.
        server.post_text(42, "anything").await;
        assert!(
            server
                .replies()
                .last()
                .unwrap()
                .1
                .starts_with("Sorry, I don't recognize")
        );
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn attachment_flow_with_rename_and_description() {
    timeout(TEST_TIMEOUT, async {
        let server = TestServer::start().await;

        for input in ["/send_mail", "dest@example.com", "3", "1", "myfile"] {
            server.post_text(7, input).await;
        }
        server
            .post(json!({"message": {"chat": {"id": 7},
                "document": {"file_id": "doc-9", "file_name": "report.PDF"}}}))
            .await;
        assert!(
            server
                .replies()
                .last()
                .unwrap()
                .1
                .starts_with("Document received!")
        );

        server.post_text(7, "the quarterly report").await;
        server.post_text(7, "Q3 numbers").await;

        let mails = server.mails();
        assert_eq!(mails.len(), 1);
        assert_eq!(mails[0].to, "dest@example.com");
        assert_eq!(mails[0].subject, "Q3 numbers");
        assert_eq!(
            mails[0].body,
            "Please see the attached document\n\nDescription: the quarterly report"
        );
        let attachment = mails[0].attachment.clone().unwrap();
        assert_eq!(attachment.file_name().unwrap(), "myfile.PDF");
        // Consumed by the send.
        assert!(!attachment.exists());
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn cancel_mid_flow_resets_everything() {
    timeout(TEST_TIMEOUT, async {
        let server = TestServer::start().await;

        server.post_text(9, "/send_mail").await;
        server.post_text(9, "a@b.com").await;
        server.post_text(9, "/cancel").await;
        assert_eq!(
            server.replies().last().unwrap().1,
            "Operation cancelled. You can start again with /send_mail"
        );

        // A fresh flow starts from the beginning.
        server.post_text(9, "/send_mail").await;
        assert_eq!(
            server.replies().last().unwrap().1,
            "Please enter the recipient's email address:"
        );
        assert!(server.mails().is_empty());
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn invalid_inputs_reprompt_without_losing_progress() {
    timeout(TEST_TIMEOUT, async {
        let server = TestServer::start().await;

        server.post_text(3, "/send_mail").await;
        server.post_text(3, "notanemail").await;
        assert_eq!(
            server.replies().last().unwrap().1,
            "Please enter a valid email address."
        );

        server.post_text(3, "a@b.com").await;
        server.post_text(3, "4").await;
        assert_eq!(
            server.replies().last().unwrap().1,
            "Invalid choice. Please enter a number between 1 and 3."
        );

        // Progress survives: a valid choice continues from where we were.
        server.post_text(3, "1").await;
        assert_eq!(
            server.replies().last().unwrap().1,
            "Please enter the text message you want to send:"
        );
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn concurrent_chats_do_not_interfere() {
    timeout(TEST_TIMEOUT, async {
        let server = TestServer::start().await;

        server.post_text(1, "/send_mail").await;
        server.post_text(2, "/send_mail").await;
        server.post_text(1, "one@x.com").await;
        server.post_text(2, "two@y.org").await;
        server.post_text(1, "1").await;
        server.post_text(1, "from chat one").await;
        server.post_text(1, "skip").await;

        let mails = server.mails();
        assert_eq!(mails.len(), 1);
        assert_eq!(mails[0].to, "one@x.com");

        // Chat 2 is still mid-flow.
        server.post_text(2, "1").await;
        assert_eq!(
            server.replies().last().unwrap().1,
            "Please enter the text message you want to send:"
        );
    })
    .await
    .expect("test timed out");
}
