//! HTTP API for the relay
//!
//! One webhook for inbound platform events plus a version probe.

mod handlers;
mod types;

pub use handlers::create_router;

use crate::config::RelaySettings;
use crate::engine::ConversationEngine;
use crate::messaging::Notifier;
use std::sync::Arc;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<ConversationEngine>,
    pub notifier: Notifier,
    pub relay: Arc<RelaySettings>,
}

impl AppState {
    pub fn new(engine: Arc<ConversationEngine>, notifier: Notifier, relay: RelaySettings) -> Self {
        Self {
            engine,
            notifier,
            relay: Arc::new(relay),
        }
    }
}
