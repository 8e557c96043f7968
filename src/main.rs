use std::sync::Arc;

use task_simplifier::config::{BotConfig, SmtpConfig};
use task_simplifier::engine::Engine;
use task_simplifier::mailer::{MailClient, SmtpMailer};
use task_simplifier::staging::Staging;
use task_simplifier::telegram::{FileFetcher, MessageSender, TelegramApi};
use task_simplifier::webhook::webhook_routes;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Install rustls crypto provider before any TLS usage
    rustls::crypto::ring::default_provider()
        .install_default()
        .expect("Failed to install rustls crypto provider");

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let bot_config = BotConfig::from_env().unwrap_or_else(|e| {
        eprintln!("Error: {e}");
        eprintln!("  export BOT_TOKEN=123456:ABC-...");
        std::process::exit(1);
    });
    let smtp_config = SmtpConfig::from_env().unwrap_or_else(|e| {
        eprintln!("Error: {e}");
        eprintln!("  export SMTP_USER=you@example.com SMTP_PASS=app-password");
        std::process::exit(1);
    });

    eprintln!("📮 TaskSimplifier Bot v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   Webhook: http://0.0.0.0:{}/message", bot_config.port);
    eprintln!("   SMTP: {}:{}", smtp_config.host, smtp_config.port);
    eprintln!("   Staging: {}", bot_config.staging_dir.display());

    let telegram = Arc::new(TelegramApi::new(
        bot_config.bot_token.clone(),
        bot_config.request_timeout,
    ));
    let mailer = Arc::new(SmtpMailer::new(smtp_config));
    let staging = Staging::new(bot_config.staging_dir.clone());

    let engine = Arc::new(Engine::new(
        Arc::clone(&telegram) as Arc<dyn MessageSender>,
        mailer as Arc<dyn MailClient>,
        telegram as Arc<dyn FileFetcher>,
        staging,
    ));

    let app = webhook_routes(engine);
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", bot_config.port)).await?;
    tracing::info!(port = bot_config.port, "Webhook server started");
    axum::serve(listener, app).await?;

    Ok(())
}
