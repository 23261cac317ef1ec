//! Delivery error types

use thiserror::Error;

/// Why a message did not reach the platform
#[derive(Debug, Error)]
pub enum DeliveryError {
    /// The platform answered with an error status
    #[error("platform rejected message (HTTP {status}): {message}")]
    Rejected {
        status: u16,
        code: Option<i64>,
        message: String,
    },

    #[error("transport failure: {0}")]
    Transport(String),

    /// Success status with a body we could not read
    #[error("malformed platform response: {0}")]
    Malformed(String),

    /// Shutdown began while the send was still waiting out its delay
    #[error("delivery cancelled by shutdown")]
    Cancelled,

    #[error("delivery task failed: {0}")]
    TaskFailed(String),
}
