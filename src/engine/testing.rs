//! Mock implementations for testing
//!
//! These mocks let the engine, notifier and router run without network I/O.

use super::traits::CompletionClient;
use super::ConversationEngine;
use crate::config::RelaySettings;
use crate::llm::LlmError;
use crate::messaging::{Ack, DeliveryError, Messenger, Notifier};
use crate::state_machine::Turn;
use crate::store::ConversationStore;
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

// ============================================================================
// Mock Completion Client
// ============================================================================

/// Completion client that returns queued results, or `reply N` when the
/// queue is empty
pub struct MockCompletionClient {
    responses: Mutex<VecDeque<Result<String, LlmError>>>,
    /// History and message of every call
    calls: Mutex<Vec<(Vec<Turn>, String)>>,
}

impl MockCompletionClient {
    pub fn new() -> Self {
        Self {
            responses: Mutex::new(VecDeque::new()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn queue_reply(&self, reply: impl Into<String>) {
        self.responses.lock().unwrap().push_back(Ok(reply.into()));
    }

    pub fn queue_error(&self, error: LlmError) {
        self.responses.lock().unwrap().push_back(Err(error));
    }

    pub fn recorded_calls(&self) -> Vec<(Vec<Turn>, String)> {
        self.calls.lock().unwrap().clone()
    }
}

impl Default for MockCompletionClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CompletionClient for MockCompletionClient {
    async fn complete(&self, history: &[Turn], message: &str) -> Result<String, LlmError> {
        let call = {
            let mut calls = self.calls.lock().unwrap();
            calls.push((history.to_vec(), message.to_string()));
            calls.len()
        };
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(format!("reply {call}")))
    }
}

// ============================================================================
// Mock Messenger
// ============================================================================

/// Messenger that records what it was asked to send
pub struct MockMessenger {
    texts: Mutex<Vec<(String, String)>>,
    templates: Mutex<Vec<String>>,
    sent: AtomicUsize,
    fail: bool,
}

impl MockMessenger {
    pub fn new() -> Self {
        Self {
            texts: Mutex::new(Vec::new()),
            templates: Mutex::new(Vec::new()),
            sent: AtomicUsize::new(0),
            fail: false,
        }
    }

    /// Every send is rejected by the "platform"
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new()
        }
    }

    /// `(to, body)` of each accepted free-text message
    pub fn texts(&self) -> Vec<(String, String)> {
        self.texts.lock().unwrap().clone()
    }

    /// Recipients of each accepted template message
    pub fn templates(&self) -> Vec<String> {
        self.templates.lock().unwrap().clone()
    }

    fn accept(&self) -> Result<Ack, DeliveryError> {
        if self.fail {
            return Err(DeliveryError::Rejected {
                status: 400,
                code: Some(21211),
                message: "Invalid 'To' Phone Number".to_string(),
            });
        }
        let n = self.sent.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(Ack {
            sid: format!("SM{n}"),
        })
    }
}

impl Default for MockMessenger {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Messenger for MockMessenger {
    async fn send_text(&self, to: &str, body: &str) -> Result<Ack, DeliveryError> {
        let ack = self.accept()?;
        self.texts
            .lock()
            .unwrap()
            .push((to.to_string(), body.to_string()));
        Ok(ack)
    }

    async fn send_template(&self, to: &str) -> Result<Ack, DeliveryError> {
        let ack = self.accept()?;
        self.templates.lock().unwrap().push(to.to_string());
        Ok(ack)
    }
}

// ============================================================================
// Test Harness
// ============================================================================

/// Engine wired to mocks, with no pre-send delay
pub struct TestHarness {
    pub engine: Arc<ConversationEngine>,
    pub notifier: Notifier,
    pub store: Arc<ConversationStore>,
    pub completion: Arc<MockCompletionClient>,
    pub messenger: Arc<MockMessenger>,
    pub relay: RelaySettings,
    pub shutdown: CancellationToken,
}

impl TestHarness {
    pub fn new() -> Self {
        Self::with_messenger(MockMessenger::new())
    }

    pub fn with_messenger(messenger: MockMessenger) -> Self {
        let relay = RelaySettings::default();
        let store = Arc::new(ConversationStore::new());
        let completion = Arc::new(MockCompletionClient::new());
        let messenger = Arc::new(messenger);
        let shutdown = CancellationToken::new();
        let notifier = Notifier::new(messenger.clone(), Duration::ZERO, shutdown.clone());

        let engine = Arc::new(ConversationEngine::new(
            store.clone(),
            completion.clone(),
            notifier.clone(),
            relay.offer_body(),
        ));

        Self {
            engine,
            notifier,
            store,
            completion,
            messenger,
            relay,
            shutdown,
        }
    }
}
