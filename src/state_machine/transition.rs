//! Pure state transition function
//!
//! | Stage       | Inbound message              | Next stage  |
//! |-------------|------------------------------|-------------|
//! | STAGE_1     | any, generated reply         | STAGE_2     |
//! | STAGE_2     | any, generated reply         | STAGE_3     |
//! | STAGE_3     | any, generated reply         | STAGE_FINAL |
//! | STAGE_FINAL | consent and no offer yet     | STAGE_FINAL |
//! | STAGE_FINAL | otherwise, generated reply   | STAGE_FINAL |
//!
//! Message content only matters for the offer row. The stage moves when the
//! reply arrives, so a failed completion leaves it where it was.

use super::{is_affirmative, ConversationRecord, Effect, Event, Stage};

/// Result of a state transition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionResult {
    pub new_stage: Stage,
    pub effects: Vec<Effect>,
}

impl TransitionResult {
    pub fn new(stage: Stage) -> Self {
        Self {
            new_stage: stage,
            effects: vec![],
        }
    }

    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }
}

/// Pure transition function
///
/// Given the same record and event it always produces the same result and
/// performs no I/O.
pub fn transition(record: &ConversationRecord, event: Event) -> TransitionResult {
    let stage = record.stage();

    match event {
        Event::UserMessage { text } => {
            // The user turn is recorded on every branch, before the decision.
            let result =
                TransitionResult::new(stage).with_effect(Effect::AppendUserTurn { text: text.clone() });

            if offer_due(record, &text) {
                result
                    .with_effect(Effect::DeliverOffer)
                    .with_effect(Effect::MarkOfferSent)
            } else {
                result.with_effect(Effect::RequestCompletion { message: text })
            }
        }

        Event::CompletionReady { reply } => TransitionResult::new(stage.next())
            .with_effect(Effect::AppendAssistantTurn {
                text: reply.clone(),
            })
            .with_effect(Effect::DeliverReply { body: reply }),
    }
}

fn offer_due(record: &ConversationRecord, text: &str) -> bool {
    record.stage() == Stage::Final && !record.offer_sent() && is_affirmative(text)
}
