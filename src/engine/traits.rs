//! Completion seam for the engine
//!
//! The engine only needs "history plus new message in, reply text out". The
//! production implementation builds the chat request around the system prompt.

use crate::llm::{LlmError, LlmMessage, LlmRequest, LlmService};
use crate::state_machine::{Role, Turn};
use crate::system_prompt::SystemPrompt;
use async_trait::async_trait;
use std::sync::Arc;

const TEMPERATURE: f32 = 0.6;
const MAX_TOKENS: u32 = 300;

/// Generates the assistant's next reply
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// `history` is everything recorded so far, including the user turn for
    /// `message`
    async fn complete(&self, history: &[Turn], message: &str) -> Result<String, LlmError>;
}

/// Completion client backed by a chat-completion service
pub struct ChatCompletionClient {
    llm: Arc<dyn LlmService>,
    prompt: SystemPrompt,
}

impl ChatCompletionClient {
    pub fn new(llm: Arc<dyn LlmService>, prompt: SystemPrompt) -> Self {
        Self { llm, prompt }
    }

    fn build_request(&self, history: &[Turn], message: &str) -> LlmRequest {
        let mut messages: Vec<LlmMessage> = history
            .iter()
            .map(|turn| match turn.role {
                Role::User => LlmMessage::user(turn.content.clone()),
                Role::Assistant => LlmMessage::assistant(turn.content.clone()),
            })
            .collect();
        // The new message goes last even though history already ends with it
        messages.push(LlmMessage::user(message));

        LlmRequest {
            system: self.prompt.system_content(),
            messages,
            max_tokens: Some(MAX_TOKENS),
            temperature: Some(TEMPERATURE),
        }
    }
}

#[async_trait]
impl CompletionClient for ChatCompletionClient {
    async fn complete(&self, history: &[Turn], message: &str) -> Result<String, LlmError> {
        let request = self.build_request(history, message);
        let response = self.llm.complete(&request).await?;
        Ok(response.text)
    }
}
