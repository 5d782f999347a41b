//! Verify-then-parse for incoming webhook payloads

use crate::{Result, WebhookEnvelope, WebhookError, WebhookSignature};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tracing::{debug, warn};

/// Turns signed raw payloads into [`WebhookEnvelope`]s.
///
/// The signature is always checked against the raw bytes before any JSON
/// decoding happens.
#[derive(Debug, Clone)]
pub struct WebhookParser {
    signature: Arc<WebhookSignature>,
}

impl WebhookParser {
    /// Create a parser with the given secret
    pub fn new(secret: impl Into<String>) -> Result<Self> {
        Ok(Self::with_signature(WebhookSignature::new(secret)?))
    }

    /// Create a parser around an existing verifier
    pub fn with_signature(signature: WebhookSignature) -> Self {
        Self {
            signature: Arc::new(signature),
        }
    }

    /// The underlying verifier
    pub fn signature(&self) -> &WebhookSignature {
        &self.signature
    }

    /// Verify the signature without parsing
    pub fn verify(&self, payload: &[u8], signature: &str) -> bool {
        self.signature.validate(payload, signature)
    }

    /// Verify and parse an incoming webhook
    pub fn parse_event(&self, payload: &[u8], signature: &str) -> Result<WebhookEnvelope> {
        if !self.verify(payload, signature) {
            warn!(payload_len = payload.len(), "Webhook signature verification failed");
            return Err(WebhookError::SignatureInvalid);
        }

        let envelope: WebhookEnvelope = serde_json::from_slice(payload).map_err(|e| {
            warn!(error = %e, "Failed to parse webhook payload");
            WebhookError::MalformedPayload(e)
        })?;

        debug!(
            event_id = %envelope.id(),
            event_type = %envelope.event_type(),
            "Parsed webhook envelope"
        );
        Ok(envelope)
    }

    /// Verify, parse and decode the event data into `T`.
    ///
    /// Signature and parse failures are errors; a `data` field that does not
    /// fit `T` yields `Ok(None)`.
    pub fn parse_event_data<T: DeserializeOwned>(
        &self,
        payload: &[u8],
        signature: &str,
    ) -> Result<Option<T>> {
        let envelope = self.parse_event(payload, signature)?;
        let data = envelope.data_as::<T>();
        if data.is_none() {
            debug!(
                event_id = %envelope.id(),
                shape = std::any::type_name::<T>(),
                "Webhook data does not match requested shape"
            );
        }
        Ok(data)
    }
}
