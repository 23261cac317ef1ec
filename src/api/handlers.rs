//! HTTP request handlers

use super::types::WebhookForm;
use super::AppState;
use crate::engine::EngineError;
use crate::messaging::DeliveryError;
use axum::{
    extract::{rejection::FormRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Form, Router,
};
use thiserror::Error;

/// Create the API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Inbound platform events
        .route("/webhook", post(webhook))
        .route("/version", get(get_version))
        .with_state(state)
}

// ============================================================
// Webhook
// ============================================================

async fn webhook(
    State(state): State<AppState>,
    form: Result<Form<WebhookForm>, FormRejection>,
) -> Result<StatusCode, AppError> {
    let form = match form {
        Ok(Form(form)) => form,
        Err(rejection) => {
            tracing::warn!(error = %rejection, "Ignoring unreadable webhook payload");
            return Ok(StatusCode::OK);
        }
    };

    let Some(from) = form.sender() else {
        tracing::debug!("Ignoring webhook without a sender");
        return Ok(StatusCode::OK);
    };
    let text = form.text();

    if state.relay.is_admin_trigger(from, &text) {
        broadcast_template(&state).await?;
        return Ok(StatusCode::OK);
    }

    if !state.relay.is_target(from) {
        tracing::debug!(from, "Ignoring message from number outside the allow-list");
        return Ok(StatusCode::OK);
    }

    let outcome = state.engine.handle_message(from, &text).await?;
    let kind = outcome.kind();
    let delivery = outcome.delivery();
    tracing::info!(user = from, outcome = kind, delivery_id = %delivery.id, "Turn handled");

    Ok(StatusCode::OK)
}

/// Send the template to every allow-listed number, one after another
async fn broadcast_template(state: &AppState) -> Result<(), DeliveryError> {
    tracing::info!(
        recipients = state.relay.target_numbers.len(),
        "Admin trigger received, broadcasting template"
    );
    for number in &state.relay.target_numbers {
        let ack = state.notifier.deliver_template(number).await?;
        tracing::info!(to = %number, sid = %ack.sid, "Template delivered");
    }
    Ok(())
}

// ============================================================
// Version
// ============================================================

async fn get_version() -> &'static str {
    concat!("whatsapp-relay ", env!("CARGO_PKG_VERSION"))
}

// ============================================================
// Error Handling
// ============================================================

#[derive(Debug, Error)]
enum AppError {
    #[error(transparent)]
    Engine(#[from] EngineError),
    #[error(transparent)]
    Delivery(#[from] DeliveryError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Details stay in the log; the platform only sees the status
        tracing::error!(error = %self, "Webhook failed");
        StatusCode::INTERNAL_SERVER_ERROR.into_response()
    }
}
