//! System prompt construction from the static prompt documents
//!
//! The persona instruction is the concatenation of three documents shipped
//! next to the binary. Their content is opaque here. The length rule is sent
//! first as its own system message.

use crate::config::ConfigError;
use crate::llm::SystemContent;
use std::path::Path;

/// Prompt documents, in concatenation order
pub const PROMPT_FILES: &[&str] = &["CoreRules.txt", "StagePlaybook.txt", "EarningsLogic.txt"];

/// Reply-length constraint sent ahead of the persona
pub const LENGTH_RULE: &str =
    "Reply in 2–3 short sentences. Maximum 60 words. Ask only one question. No formatting.";

/// The two system instructions prepended to every completion request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SystemPrompt {
    pub length_rule: String,
    pub persona: String,
}

impl SystemPrompt {
    pub fn new(persona: impl Into<String>) -> Self {
        Self {
            length_rule: LENGTH_RULE.to_string(),
            persona: persona.into(),
        }
    }

    /// Load and join the prompt documents from `dir`
    pub fn load(dir: &Path) -> Result<Self, ConfigError> {
        let mut parts = Vec::with_capacity(PROMPT_FILES.len());
        for name in PROMPT_FILES {
            let path = dir.join(name);
            let content =
                std::fs::read_to_string(&path).map_err(|source| ConfigError::Read { path, source })?;
            parts.push(content);
        }

        let prompt = Self::new(parts.join("\n\n"));
        tracing::info!(
            dir = %dir.display(),
            persona_bytes = prompt.persona.len(),
            "Loaded system prompt"
        );
        Ok(prompt)
    }

    /// Length rule first, persona second
    pub fn system_content(&self) -> Vec<SystemContent> {
        vec![
            SystemContent::new(self.length_rule.clone()),
            SystemContent::new(self.persona.clone()),
        ]
    }
}
