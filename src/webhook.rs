//! Webhook HTTP surface: a single endpoint accepting inbound updates.

use std::sync::Arc;

use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};

use crate::engine::Engine;
use crate::update::Update;

/// Shared state for the webhook routes.
#[derive(Clone)]
pub struct WebhookState {
    pub engine: Arc<Engine>,
}

/// POST /message
///
/// Accepts one update, runs it through the engine, and returns the engine's
/// status string as the body. The engine never fails past this boundary.
async fn message(State(state): State<WebhookState>, Json(update): Json<Update>) -> &'static str {
    state.engine.handle_update(update).await
}

/// Build the webhook routes.
pub fn webhook_routes(engine: Arc<Engine>) -> Router {
    Router::new()
        .route("/message", post(message))
        .with_state(WebhookState { engine })
}
