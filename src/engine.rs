//! Conversation engine
//!
//! Runs one inbound message through the transition function and executes the
//! resulting effects against the store, the completion client and the
//! notifier. The user's record stays locked for the whole turn.

#[cfg(test)]
pub mod testing;
mod traits;

pub use traits::{ChatCompletionClient, CompletionClient};

use crate::llm::LlmError;
use crate::messaging::{DeliveryHandle, Notifier};
use crate::state_machine::{transition, ConversationRecord, Effect, Event, Turn};
use crate::store::ConversationStore;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("completion failed: {0}")]
    Upstream(#[from] LlmError),

    /// The turn ran out of events without handing anything to the notifier
    #[error("turn for {user} finished without a delivery")]
    Incomplete { user: String },
}

/// What a turn handed to the notifier
#[derive(Debug)]
pub enum TurnOutcome {
    /// A generated reply is scheduled
    Replied { delivery: DeliveryHandle },
    /// The scripted offer is scheduled
    OfferSent { delivery: DeliveryHandle },
}

impl TurnOutcome {
    pub fn delivery(self) -> DeliveryHandle {
        match self {
            TurnOutcome::Replied { delivery } | TurnOutcome::OfferSent { delivery } => delivery,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            TurnOutcome::Replied { .. } => "replied",
            TurnOutcome::OfferSent { .. } => "offer_sent",
        }
    }
}

/// Result of executing a single effect
enum Applied {
    Nothing,
    Event(Event),
    Delivered(TurnOutcome),
}

pub struct ConversationEngine {
    store: Arc<ConversationStore>,
    completion: Arc<dyn CompletionClient>,
    notifier: Notifier,
    offer_body: String,
}

impl ConversationEngine {
    pub fn new(
        store: Arc<ConversationStore>,
        completion: Arc<dyn CompletionClient>,
        notifier: Notifier,
        offer_body: String,
    ) -> Self {
        Self {
            store,
            completion,
            notifier,
            offer_body,
        }
    }

    /// Process one inbound message from `user`
    ///
    /// Returns once the reply or offer is scheduled; the delivery itself runs
    /// in the background.
    pub async fn handle_message(&self, user: &str, text: &str) -> Result<TurnOutcome, EngineError> {
        let mut record = self.store.lock(user).await;
        tracing::debug!(user, stage = %record.stage(), "Handling message");

        // Effects may generate follow-up events; process them in a loop
        let mut pending = vec![Event::UserMessage {
            text: text.to_string(),
        }];
        let mut outcome = None;

        while let Some(event) = pending.pop() {
            let result = transition(&record, event);

            if result.new_stage != record.stage() {
                tracing::info!(
                    user,
                    from = %record.stage(),
                    to = %result.new_stage,
                    "Stage advanced"
                );
                record.set_stage(result.new_stage);
            }

            for effect in result.effects {
                match self.execute_effect(&mut record, user, effect).await? {
                    Applied::Nothing => {}
                    Applied::Event(event) => pending.push(event),
                    Applied::Delivered(delivered) => outcome = Some(delivered),
                }
            }
        }

        outcome.ok_or_else(|| EngineError::Incomplete {
            user: user.to_string(),
        })
    }

    async fn execute_effect(
        &self,
        record: &mut ConversationRecord,
        user: &str,
        effect: Effect,
    ) -> Result<Applied, EngineError> {
        match effect {
            Effect::AppendUserTurn { text } => {
                record.push_turn(Turn::user(text));
                Ok(Applied::Nothing)
            }

            Effect::RequestCompletion { message } => {
                let reply = self
                    .completion
                    .complete(record.history(), &message)
                    .await
                    .inspect_err(|e| {
                        tracing::warn!(user, stage = %record.stage(), error = %e, "Completion failed, turn aborted");
                    })?;
                Ok(Applied::Event(Event::CompletionReady { reply }))
            }

            Effect::AppendAssistantTurn { text } => {
                record.push_turn(Turn::assistant(text));
                Ok(Applied::Nothing)
            }

            Effect::DeliverReply { body } => {
                let delivery = self.notifier.schedule(user, body);
                Ok(Applied::Delivered(TurnOutcome::Replied { delivery }))
            }

            Effect::DeliverOffer => {
                tracing::info!(user, "Consent received, sending offer");
                let delivery = self.notifier.schedule(user, self.offer_body.clone());
                Ok(Applied::Delivered(TurnOutcome::OfferSent { delivery }))
            }

            Effect::MarkOfferSent => {
                record.mark_offer_sent();
                Ok(Applied::Nothing)
            }
        }
    }
}
