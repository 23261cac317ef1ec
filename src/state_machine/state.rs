//! Conversation record types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Position in the scripted conversation
///
/// Stages only move forward. `Final` is absorbing.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum Stage {
    #[default]
    #[serde(rename = "STAGE_1")]
    Stage1,
    #[serde(rename = "STAGE_2")]
    Stage2,
    #[serde(rename = "STAGE_3")]
    Stage3,
    #[serde(rename = "STAGE_FINAL")]
    Final,
}

impl Stage {
    /// Stage entered after a generated reply
    pub fn next(self) -> Self {
        match self {
            Stage::Stage1 => Stage::Stage2,
            Stage::Stage2 => Stage::Stage3,
            Stage::Stage3 | Stage::Final => Stage::Final,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Stage::Stage1 => "STAGE_1",
            Stage::Stage2 => "STAGE_2",
            Stage::Stage3 => "STAGE_3",
            Stage::Final => "STAGE_FINAL",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Author of a history turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Assistant,
}

/// A single recorded message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub content: String,
    /// When the turn was recorded. Not sent upstream.
    pub at: DateTime<Utc>,
}

impl Turn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
            at: Utc::now(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
            at: Utc::now(),
        }
    }
}

/// Conversation state kept for one user
///
/// Mutators are crate-private: only the store and the engine change a record,
/// and only along the transition table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ConversationRecord {
    stage: Stage,
    offer_sent: bool,
    history: Vec<Turn>,
}

impl ConversationRecord {
    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn offer_sent(&self) -> bool {
        self.offer_sent
    }

    pub fn history(&self) -> &[Turn] {
        &self.history
    }

    pub(crate) fn set_stage(&mut self, stage: Stage) {
        self.stage = stage;
    }

    /// Latch the offer flag. There is no way to clear it.
    pub(crate) fn mark_offer_sent(&mut self) {
        self.offer_sent = true;
    }

    pub(crate) fn push_turn(&mut self, turn: Turn) {
        self.history.push(turn);
    }
}
