//! In-memory conversation store
//!
//! One record per user address, created lazily and kept for the life of the
//! process. Each record sits behind its own async mutex; the engine holds it
//! for a whole turn so concurrent webhooks for the same user run one after
//! the other.

use crate::state_machine::{ConversationRecord, Stage};
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{Mutex, OwnedMutexGuard, RwLock};

/// Exclusive access to one user's record for the duration of a turn
pub type RecordGuard = OwnedMutexGuard<ConversationRecord>;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("no conversation record for {0}")]
    NotFound(String),
}

/// Owned key-value store of conversation records
#[derive(Debug, Default)]
pub struct ConversationStore {
    records: RwLock<HashMap<String, Arc<Mutex<ConversationRecord>>>>,
}

impl ConversationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the user's record, creating a fresh one if unseen
    #[allow(dead_code)] // API completeness
    pub async fn get(&self, user: &str) -> ConversationRecord {
        self.entry(user).await.lock().await.clone()
    }

    /// Lock the user's record, creating a fresh one if unseen
    pub async fn lock(&self, user: &str) -> RecordGuard {
        self.entry(user).await.lock_owned().await
    }

    /// Overwrite the stage of an existing record
    #[allow(dead_code)] // API completeness
    pub async fn set_stage(&self, user: &str, stage: Stage) -> Result<(), StoreError> {
        let entry = self
            .records
            .read()
            .await
            .get(user)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(user.to_string()))?;
        entry.lock().await.set_stage(stage);
        Ok(())
    }

    #[allow(dead_code)] // API completeness
    pub async fn contains(&self, user: &str) -> bool {
        self.records.read().await.contains_key(user)
    }

    #[allow(dead_code)] // Useful for tests
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    #[allow(dead_code)] // Useful for tests
    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }

    async fn entry(&self, user: &str) -> Arc<Mutex<ConversationRecord>> {
        // Fast path: already known
        {
            let records = self.records.read().await;
            if let Some(record) = records.get(user) {
                return Arc::clone(record);
            }
        }

        // Racing creators both land on the same entry
        let mut records = self.records.write().await;
        let record = records.entry(user.to_string()).or_insert_with(|| {
            tracing::debug!(user, "Creating conversation record");
            Arc::new(Mutex::new(ConversationRecord::default()))
        });
        Arc::clone(record)
    }
}
