//! Effects produced by state transitions

/// Effects to be executed after a state transition, in order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Record the inbound message as a `user` turn
    AppendUserTurn { text: String },

    /// Ask the completion service for a reply to `message`
    RequestCompletion { message: String },

    /// Record a generated reply as an `assistant` turn
    AppendAssistantTurn { text: String },

    /// Hand a generated reply to the notifier
    DeliverReply { body: String },

    /// Hand the scripted offer text to the notifier
    DeliverOffer,

    /// Latch `offer_sent`
    MarkOfferSent,
}

impl Effect {
    /// Whether this effect sends something to the user
    #[allow(dead_code)] // Useful for tests
    pub fn is_delivery(&self) -> bool {
        matches!(self, Effect::DeliverReply { .. } | Effect::DeliverOffer)
    }
}
