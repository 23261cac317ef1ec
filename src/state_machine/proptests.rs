//! Property-based tests for the state machine
//!
//! These tests verify the transition table holds across arbitrary inputs.

use super::state::*;
use super::transition::*;
use super::*;
use proptest::prelude::*;

// ============================================================================
// Arbitrary Generators
// ============================================================================

fn arb_stage() -> impl Strategy<Value = Stage> {
    prop_oneof![
        Just(Stage::Stage1),
        Just(Stage::Stage2),
        Just(Stage::Stage3),
        Just(Stage::Final),
    ]
}

fn arb_record() -> impl Strategy<Value = ConversationRecord> {
    (arb_stage(), any::<bool>()).prop_map(|(stage, offer_sent)| {
        let mut record = ConversationRecord::default();
        record.set_stage(stage);
        if offer_sent {
            record.mark_offer_sent();
        }
        record
    })
}

fn arb_text() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("yes".to_string()),
        Just("Send it".to_string()),
        Just("ok.".to_string()),
        "[a-zA-Z .!?]{0,30}",
    ]
}

/// Replay the effects a user message would cause, feeding the completion
/// reply back in like the engine does.
fn run_turn(record: &mut ConversationRecord, text: String) -> Vec<Effect> {
    let mut applied = Vec::new();
    let mut pending = vec![Event::UserMessage { text }];

    while let Some(event) = pending.pop() {
        let result = transition(record, event);
        record.set_stage(result.new_stage);
        for effect in result.effects {
            match &effect {
                Effect::AppendUserTurn { text } => record.push_turn(Turn::user(text.clone())),
                Effect::AppendAssistantTurn { text } => {
                    record.push_turn(Turn::assistant(text.clone()));
                }
                Effect::MarkOfferSent => record.mark_offer_sent(),
                Effect::RequestCompletion { .. } => pending.push(Event::CompletionReady {
                    reply: "generated".to_string(),
                }),
                Effect::DeliverReply { .. } | Effect::DeliverOffer => {}
            }
            applied.push(effect);
        }
    }

    applied
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #[test]
    fn prop_stage_never_decreases(record in arb_record(), text in arb_text()) {
        let mut record = record;
        let before = record.stage();
        run_turn(&mut record, text);
        prop_assert!(record.stage() >= before);
    }

    #[test]
    fn prop_exactly_one_delivery_per_message(record in arb_record(), text in arb_text()) {
        let mut record = record;
        let effects = run_turn(&mut record, text);
        prop_assert_eq!(effects.iter().filter(|e| e.is_delivery()).count(), 1);
    }

    #[test]
    fn prop_user_turn_always_first(record in arb_record(), text in arb_text()) {
        let result = transition(&record, Event::UserMessage { text: text.clone() });
        prop_assert_eq!(result.effects.first(), Some(&Effect::AppendUserTurn { text }));
    }

    #[test]
    fn prop_content_does_not_affect_stage_before_final(
        stage in prop_oneof![Just(Stage::Stage1), Just(Stage::Stage2), Just(Stage::Stage3)],
        a in arb_text(),
        b in arb_text(),
    ) {
        let mut first = ConversationRecord::default();
        first.set_stage(stage);
        let mut second = first.clone();

        run_turn(&mut first, a);
        run_turn(&mut second, b);

        prop_assert_eq!(first.stage(), stage.next());
        prop_assert_eq!(second.stage(), stage.next());
    }

    #[test]
    fn prop_history_growth(record in arb_record(), text in arb_text()) {
        let mut record = record;
        let before = record.history().len();
        let effects = run_turn(&mut record, text);
        let offer = effects.contains(&Effect::DeliverOffer);
        let expected = if offer { before + 1 } else { before + 2 };
        prop_assert_eq!(record.history().len(), expected);
    }

    #[test]
    fn prop_offer_sent_at_most_once(texts in proptest::collection::vec(arb_text(), 1..12)) {
        let mut record = ConversationRecord::default();
        let mut offers = 0;
        for text in texts {
            let effects = run_turn(&mut record, text);
            offers += effects.iter().filter(|e| **e == Effect::DeliverOffer).count();
        }
        prop_assert!(offers <= 1);
        prop_assert_eq!(offers == 1, record.offer_sent());
    }
}
