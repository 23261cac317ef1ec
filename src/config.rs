//! Process configuration
//!
//! Credentials come from the environment and are required. The relay's fixed
//! settings (admin, allow-list, offer, template) are data with built-in
//! defaults, optionally replaced by a JSON file named in `RELAY_CONFIG`.

use serde::Deserialize;
use serde_json::{json, Value};
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_PROMPTS_DIR: &str = "Prompts";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),
    #[error("invalid value for {name}: {value:?}")]
    Invalid { name: &'static str, value: String },
    #[error("failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Messaging platform account credentials
#[derive(Clone)]
pub struct TwilioCredentials {
    pub account_sid: String,
    pub auth_token: String,
}

impl fmt::Debug for TwilioCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TwilioCredentials")
            .field("account_sid", &self.account_sid)
            .field("auth_token", &"<redacted>")
            .finish()
    }
}

/// Fixed relay behavior, kept as data rather than code
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct RelaySettings {
    /// Number allowed to trigger the template broadcast
    pub admin_number: String,
    /// Broadcast command, compared case-insensitively
    pub admin_trigger: String,
    /// Allow-list; also the broadcast audience
    pub target_numbers: Vec<String>,
    /// Our WhatsApp sender number
    pub sender_number: String,
    pub offer_name: String,
    pub offer_link: String,
    pub sponsor_code: String,
    /// Pre-approved template used by the broadcast
    pub template_sid: String,
    pub template_variables: Value,
    pub model: String,
}

impl Default for RelaySettings {
    fn default() -> Self {
        Self {
            admin_number: "+15550100001".to_string(),
            admin_trigger: "trigger max".to_string(),
            target_numbers: vec![
                "+15550100002".to_string(),
                "+15550100001".to_string(),
                "+15550100003".to_string(),
                "+15550100004".to_string(),
            ],
            sender_number: "+15550100000".to_string(),
            offer_name: "Tutorii".to_string(),
            offer_link: "https://tutorii.com".to_string(),
            sponsor_code: "TTRI-business-admin".to_string(),
            template_sid: "HXf5f95d60ca9dc0f4ce743de60376fbb2".to_string(),
            template_variables: json!({ "1": "there" }),
            model: "gpt-4o-mini".to_string(),
        }
    }
}

impl RelaySettings {
    /// Scripted message sent once a user consents
    pub fn offer_body(&self) -> String {
        format!(
            "Here’s the {} link:\n{}\nUse sponsor: {}",
            self.offer_name, self.offer_link, self.sponsor_code
        )
    }

    pub fn is_target(&self, number: &str) -> bool {
        self.target_numbers.iter().any(|n| n == number)
    }

    pub fn is_admin_trigger(&self, from: &str, body: &str) -> bool {
        from == self.admin_number && body.to_lowercase() == self.admin_trigger.to_lowercase()
    }
}

/// Complete process configuration
#[derive(Clone)]
pub struct Config {
    pub twilio: TwilioCredentials,
    pub openai_api_key: String,
    /// Base URL replacing the public completion endpoint
    pub llm_gateway: Option<String>,
    pub port: u16,
    pub prompts_dir: PathBuf,
    pub relay: RelaySettings,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("twilio", &self.twilio)
            .field("openai_api_key", &"<redacted>")
            .field("llm_gateway", &self.llm_gateway)
            .field("port", &self.port)
            .field("prompts_dir", &self.prompts_dir)
            .field("relay", &self.relay)
            .finish()
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from an arbitrary variable source
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let required = |name: &'static str| {
            lookup(name)
                .filter(|v| !v.trim().is_empty())
                .ok_or(ConfigError::Missing(name))
        };

        let twilio = TwilioCredentials {
            account_sid: required("TWILIO_ACCOUNT_SID")?,
            auth_token: required("TWILIO_AUTH_TOKEN")?,
        };
        let openai_api_key = required("OPENAI_API_KEY")?;

        let port = match lookup("PORT") {
            Some(value) => value
                .trim()
                .parse()
                .map_err(|_| ConfigError::Invalid { name: "PORT", value })?,
            None => DEFAULT_PORT,
        };

        let prompts_dir = lookup("PROMPTS_DIR")
            .map_or_else(|| PathBuf::from(DEFAULT_PROMPTS_DIR), PathBuf::from);

        let relay = match lookup("RELAY_CONFIG") {
            Some(path) => load_relay_settings(PathBuf::from(path))?,
            None => RelaySettings::default(),
        };

        Ok(Self {
            twilio,
            openai_api_key,
            llm_gateway: lookup("LLM_GATEWAY").filter(|v| !v.trim().is_empty()),
            port,
            prompts_dir,
            relay,
        })
    }
}

fn load_relay_settings(path: PathBuf) -> Result<RelaySettings, ConfigError> {
    let content = match std::fs::read_to_string(&path) {
        Ok(content) => content,
        Err(source) => return Err(ConfigError::Read { path, source }),
    };
    serde_json::from_str(&content).map_err(|source| ConfigError::Parse { path, source })
}
