//! Error types for webhook processing

use thiserror::Error;

/// Error returned by a registered webhook handler
pub type HandlerError = Box<dyn std::error::Error + Send + Sync>;

/// Errors that can occur while receiving a webhook
#[derive(Error, Debug)]
pub enum WebhookError {
    /// Invalid or missing configuration (e.g. a blank signing secret)
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Signature missing from request
    #[error("Signature missing from request")]
    SignatureMissing,

    /// Signature did not match the payload
    #[error("Invalid webhook signature")]
    SignatureInvalid,

    /// Payload is not a well-formed webhook envelope
    #[error("Failed to parse webhook payload: {0}")]
    MalformedPayload(#[source] serde_json::Error),

    /// A registered handler returned an error
    #[error("Handler for '{event_type}' failed: {source}")]
    HandlerFailed {
        event_type: String,
        #[source]
        source: HandlerError,
    },
}

impl WebhookError {
    /// Signature missing or mismatched
    pub fn is_authentication(&self) -> bool {
        matches!(self, Self::SignatureMissing | Self::SignatureInvalid)
    }

    /// Payload could not be parsed
    pub fn is_malformed_payload(&self) -> bool {
        matches!(self, Self::MalformedPayload(_))
    }

    /// A handler failed during dispatch
    pub fn is_handler_failure(&self) -> bool {
        matches!(self, Self::HandlerFailed { .. })
    }
}

impl From<serde_json::Error> for WebhookError {
    fn from(err: serde_json::Error) -> Self {
        WebhookError::MalformedPayload(err)
    }
}
