//! WhatsApp relay
//!
//! Receives WhatsApp messages through a Twilio webhook, walks each
//! allow-listed user through a scripted conversation with generated replies,
//! and sends the offer link once the user consents.

mod api;
mod config;
mod engine;
mod llm;
mod messaging;
mod state_machine;
mod store;
mod system_prompt;

use api::{create_router, AppState};
use config::Config;
use engine::{ChatCompletionClient, ConversationEngine};
use llm::{LoggingService, OpenAIService};
use messaging::{Notifier, TwilioMessenger, SEND_DELAY};
use std::net::SocketAddr;
use std::sync::Arc;
use store::ConversationStore;
use system_prompt::SystemPrompt;
use tokio_util::sync::CancellationToken;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "whatsapp_relay=info,tower_http=debug".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(false)
                .with_span_list(false),
        )
        .init();

    // Configuration
    let config = Config::from_env()
        .inspect_err(|e| tracing::error!(error = %e, "Refusing to start"))?;
    tracing::info!(
        port = config.port,
        prompts_dir = %config.prompts_dir.display(),
        model = %config.relay.model,
        targets = config.relay.target_numbers.len(),
        "Configuration loaded"
    );

    let prompt = SystemPrompt::load(&config.prompts_dir)
        .inspect_err(|e| tracing::error!(error = %e, "Failed to load prompt documents"))?;

    // Completion
    let openai = OpenAIService::new(
        config.openai_api_key.clone(),
        config.relay.model.clone(),
        config.llm_gateway.as_deref(),
    )?;
    let llm = Arc::new(LoggingService::new(Arc::new(openai)));
    let completion = Arc::new(ChatCompletionClient::new(llm, prompt));

    // Messaging
    let shutdown = CancellationToken::new();
    let messenger = Arc::new(TwilioMessenger::new(&config.twilio, &config.relay)?);
    let notifier = Notifier::new(messenger, SEND_DELAY, shutdown.clone());

    // Engine and application state
    let store = Arc::new(ConversationStore::new());
    let engine = Arc::new(ConversationEngine::new(
        store,
        completion,
        notifier.clone(),
        config.relay.offer_body(),
    ));
    let state = AppState::new(engine, notifier.clone(), config.relay.clone());

    let app = create_router(state).layer(TraceLayer::new_for_http());

    tokio::spawn(shutdown_signal(shutdown.clone()));

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("WhatsApp relay listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown.cancelled_owned())
        .await?;

    // Delayed sends that had not fired were dropped by the cancelled token
    notifier.drain().await;
    tracing::info!("Shutdown complete");

    Ok(())
}

/// Cancel `token` on Ctrl-C or SIGTERM
async fn shutdown_signal(token: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {}
        () = terminate => {}
    }

    tracing::info!("Shutdown signal received");
    token.cancel();
}
