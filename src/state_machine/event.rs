//! Events that drive a conversation turn

/// Inputs to the transition function
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// Inbound text from the user (already trimmed by the webhook)
    UserMessage { text: String },

    /// The completion service produced a reply for the current turn
    CompletionReady { reply: String },
}
