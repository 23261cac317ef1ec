//! Per-user conversation state machine
//!
//! Pure transitions over the scripted stage table. The engine owns all I/O
//! and executes the effects produced here.

pub mod consent;
mod effect;
mod event;
pub mod state;
pub(crate) mod transition;

#[cfg(test)]
mod proptests;

pub use consent::is_affirmative;
pub use effect::Effect;
pub use event::Event;
pub use state::{ConversationRecord, Role, Stage, Turn};
pub use transition::{transition, TransitionResult};
