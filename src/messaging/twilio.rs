//! Twilio WhatsApp messenger

use super::{channel_address, Ack, DeliveryError, Messenger};
use crate::config::{RelaySettings, TwilioCredentials};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

const API_BASE: &str = "https://api.twilio.com/2010-04-01";

/// Sends through the Twilio Messages resource from our WhatsApp sender
pub struct TwilioMessenger {
    client: Client,
    credentials: TwilioCredentials,
    messages_url: String,
    from: String,
    template_sid: String,
    /// Pre-serialized; the API takes the variables as a JSON string
    template_variables: String,
}

impl TwilioMessenger {
    pub fn new(
        credentials: &TwilioCredentials,
        relay: &RelaySettings,
    ) -> Result<Self, DeliveryError> {
        let client = Client::builder()
            .build()
            .map_err(|e| DeliveryError::Transport(format!("Failed to create HTTP client: {e}")))?;

        let template_variables = serde_json::to_string(&relay.template_variables)
            .map_err(|e| DeliveryError::Malformed(format!("Invalid template variables: {e}")))?;

        Ok(Self {
            client,
            messages_url: messages_url(&credentials.account_sid),
            credentials: credentials.clone(),
            from: channel_address(&relay.sender_number),
            template_sid: relay.template_sid.clone(),
            template_variables,
        })
    }

    fn text_form(&self, to: &str, body: &str) -> Vec<(&'static str, String)> {
        vec![
            ("From", self.from.clone()),
            ("To", channel_address(to)),
            ("Body", body.to_string()),
        ]
    }

    fn template_form(&self, to: &str) -> Vec<(&'static str, String)> {
        vec![
            ("From", self.from.clone()),
            ("To", channel_address(to)),
            ("ContentSid", self.template_sid.clone()),
            ("ContentVariables", self.template_variables.clone()),
        ]
    }

    async fn post(&self, form: &[(&'static str, String)]) -> Result<Ack, DeliveryError> {
        let response = self
            .client
            .post(&self.messages_url)
            .basic_auth(&self.credentials.account_sid, Some(&self.credentials.auth_token))
            .form(form)
            .send()
            .await
            .map_err(|e| DeliveryError::Transport(format!("Request failed: {e}")))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| DeliveryError::Transport(format!("Failed to read response: {e}")))?;

        parse_response(status.as_u16(), &body)
    }
}

#[async_trait]
impl Messenger for TwilioMessenger {
    async fn send_text(&self, to: &str, body: &str) -> Result<Ack, DeliveryError> {
        self.post(&self.text_form(to, body)).await
    }

    async fn send_template(&self, to: &str) -> Result<Ack, DeliveryError> {
        self.post(&self.template_form(to)).await
    }
}

fn messages_url(account_sid: &str) -> String {
    format!("{API_BASE}/Accounts/{account_sid}/Messages.json")
}

fn parse_response(status: u16, body: &str) -> Result<Ack, DeliveryError> {
    if !(200..300).contains(&status) {
        let (code, message) = match serde_json::from_str::<TwilioErrorResponse>(body) {
            Ok(err) => (err.code, err.message),
            Err(_) => (None, body.to_string()),
        };
        return Err(DeliveryError::Rejected {
            status,
            code,
            message,
        });
    }

    let message: TwilioMessage = serde_json::from_str(body)
        .map_err(|e| DeliveryError::Malformed(format!("{e} - body: {body}")))?;
    Ok(Ack { sid: message.sid })
}

// Twilio API types

#[derive(Debug, Deserialize)]
struct TwilioMessage {
    sid: String,
}

#[derive(Debug, Deserialize)]
struct TwilioErrorResponse {
    #[serde(default)]
    code: Option<i64>,
    message: String,
}
