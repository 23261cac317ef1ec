//! Webhook payload types

use crate::messaging::strip_channel_prefix;
use serde::Deserialize;

/// Inbound message event, form-encoded by the platform
///
/// Only the two fields we read are modeled; the platform sends many more.
#[derive(Debug, Default, Deserialize)]
pub struct WebhookForm {
    #[serde(rename = "From")]
    pub from: Option<String>,
    #[serde(rename = "Body")]
    pub body: Option<String>,
}

impl WebhookForm {
    /// Sender number without the channel prefix
    pub fn sender(&self) -> Option<&str> {
        self.from.as_deref().map(strip_channel_prefix)
    }

    /// Trimmed message text, empty when absent
    pub fn text(&self) -> String {
        self.body.as_deref().unwrap_or_default().trim().to_string()
    }
}
