//! Outbound messaging
//!
//! `Messenger` is the platform seam (Twilio in production). `Notifier` wraps it
//! with the fixed pre-send delay and runs delayed sends as deferred tasks tied
//! to process shutdown.

mod error;
mod twilio;

pub use error::DeliveryError;
pub use twilio::TwilioMessenger;

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use uuid::Uuid;

/// Pause before every free-text message. Pacing, not a retry.
pub const SEND_DELAY: Duration = Duration::from_secs(30);

/// Address prefix the platform puts on WhatsApp numbers
pub const CHANNEL_PREFIX: &str = "whatsapp:";

pub fn channel_address(number: &str) -> String {
    format!("{CHANNEL_PREFIX}{number}")
}

pub fn strip_channel_prefix(address: &str) -> &str {
    address.strip_prefix(CHANNEL_PREFIX).unwrap_or(address)
}

/// Platform acknowledgment of an accepted message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ack {
    /// Platform message id
    pub sid: String,
}

/// Sends messages through the messaging platform, immediately
#[async_trait]
pub trait Messenger: Send + Sync {
    /// Send a free-text message
    async fn send_text(&self, to: &str, body: &str) -> Result<Ack, DeliveryError>;

    /// Send the pre-approved template
    async fn send_template(&self, to: &str) -> Result<Ack, DeliveryError>;
}

/// Handle to a scheduled delivery
#[derive(Debug)]
pub struct DeliveryHandle {
    pub id: Uuid,
    handle: JoinHandle<Result<Ack, DeliveryError>>,
}

impl DeliveryHandle {
    /// Wait for the delivery to finish. Dropping the handle detaches it.
    #[allow(dead_code)] // Useful for tests
    pub async fn wait(self) -> Result<Ack, DeliveryError> {
        self.handle
            .await
            .map_err(|e| DeliveryError::TaskFailed(e.to_string()))?
    }
}

/// Delivers messages to users with the fixed pre-send delay
#[derive(Clone)]
pub struct Notifier {
    messenger: Arc<dyn Messenger>,
    delay: Duration,
    shutdown: CancellationToken,
    tasks: TaskTracker,
}

impl Notifier {
    pub fn new(messenger: Arc<dyn Messenger>, delay: Duration, shutdown: CancellationToken) -> Self {
        Self {
            messenger,
            delay,
            shutdown,
            tasks: TaskTracker::new(),
        }
    }

    /// Wait out the delay, then send. Fails with `Cancelled` if shutdown
    /// begins during the wait; a send already in flight is not interrupted.
    pub async fn deliver(&self, to: &str, body: &str) -> Result<Ack, DeliveryError> {
        tokio::select! {
            biased;
            () = self.shutdown.cancelled() => return Err(DeliveryError::Cancelled),
            () = tokio::time::sleep(self.delay) => {}
        }
        self.messenger.send_text(to, body).await
    }

    /// Send the template right away
    pub async fn deliver_template(&self, to: &str) -> Result<Ack, DeliveryError> {
        self.messenger.send_template(to).await
    }

    /// Run `deliver` as a deferred task and return without waiting for it
    pub fn schedule(&self, to: &str, body: String) -> DeliveryHandle {
        let id = Uuid::new_v4();
        let notifier = self.clone();
        let to = to.to_string();

        tracing::debug!(delivery_id = %id, to = %to, delay_ms = %self.delay.as_millis(), "Scheduling delivery");

        let handle = self.tasks.spawn(async move {
            let result = notifier.deliver(&to, &body).await;
            match &result {
                Ok(ack) => {
                    tracing::info!(delivery_id = %id, to = %to, sid = %ack.sid, "Message delivered");
                }
                Err(DeliveryError::Cancelled) => {
                    tracing::warn!(delivery_id = %id, to = %to, "Pending delivery dropped at shutdown");
                }
                Err(e) => {
                    tracing::error!(delivery_id = %id, to = %to, error = %e, "Message delivery failed");
                }
            }
            result
        });

        DeliveryHandle { id, handle }
    }

    /// Stop accepting deliveries and wait for the running ones to finish
    pub async fn drain(&self) {
        self.tasks.close();
        tracing::info!(pending = self.tasks.len(), "Draining deliveries");
        self.tasks.wait().await;
    }
}
