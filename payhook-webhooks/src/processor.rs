//! Single entry point for HTTP endpoints receiving webhooks

use crate::{
    Result, WebhookConfig, WebhookDispatcher, WebhookError, WebhookParser, WebhookProcessResult,
    WebhookSignature,
};
use futures::FutureExt;
use secrecy::ExposeSecret;
use std::collections::HashMap;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, warn};

/// Message reported when processing panics
const UNEXPECTED_ERROR: &str = "unexpected error";

/// Verify → parse → dispatch for one inbound delivery.
///
/// [`process`](Self::process) never fails and never panics outward: every
/// problem, including handler errors, comes back as a failed
/// [`WebhookProcessResult`] the endpoint can map to an HTTP status. Callers
/// that need handler failures as errors (for example to trigger provider
/// redelivery) should call [`parser`](Self::parser) and
/// [`dispatcher`](Self::dispatcher) directly.
#[derive(Debug, Clone)]
pub struct WebhookProcessor {
    parser: WebhookParser,
    dispatcher: Arc<WebhookDispatcher>,
    signature_header: String,
}

impl WebhookProcessor {
    /// Create a processor verifying with HMAC-SHA256 under `secret`
    pub fn new(
        secret: impl Into<String>,
        dispatcher: impl Into<Arc<WebhookDispatcher>>,
    ) -> Result<Self> {
        Self::from_config(&WebhookConfig::new(secret), dispatcher)
    }

    /// Create a processor from configuration
    pub fn from_config(
        config: &WebhookConfig,
        dispatcher: impl Into<Arc<WebhookDispatcher>>,
    ) -> Result<Self> {
        config.validate()?;
        let signature = WebhookSignature::with_algorithm(
            config.secret.expose_secret(),
            config.signing_algorithm,
        )?;

        Ok(Self {
            parser: WebhookParser::with_signature(signature),
            dispatcher: dispatcher.into(),
            signature_header: config.signature_header.clone(),
        })
    }

    /// The verify-and-parse stage
    pub fn parser(&self) -> &WebhookParser {
        &self.parser
    }

    /// The handler table
    pub fn dispatcher(&self) -> &WebhookDispatcher {
        &self.dispatcher
    }

    /// Name of the header carrying the signature
    pub fn signature_header(&self) -> &str {
        &self.signature_header
    }

    /// Check the signature only, without parsing or dispatching
    pub fn validate_webhook(&self, payload: &[u8], signature: &str) -> bool {
        panic::catch_unwind(AssertUnwindSafe(|| self.parser.verify(payload, signature)))
            .unwrap_or(false)
    }

    /// Check the signature found in request headers
    pub fn validate_from_headers(&self, payload: &[u8], headers: &HashMap<String, String>) -> bool {
        match self.signature_from_headers(headers) {
            Some(signature) => self.validate_webhook(payload, signature),
            None => false,
        }
    }

    /// Process one delivery
    pub async fn process(
        &self,
        payload: &[u8],
        signature: &str,
        cancel: CancellationToken,
    ) -> WebhookProcessResult {
        let outcome = AssertUnwindSafe(self.try_process(payload, signature, cancel))
            .catch_unwind()
            .await;

        match outcome {
            Ok(Ok((event_id, event_type))) => WebhookProcessResult::succeeded(event_id, event_type),
            Ok(Err(err)) => {
                debug!(error = %err, "Webhook processing failed");
                WebhookProcessResult::failed(err.to_string())
            }
            Err(cause) => {
                error!(
                    panic = panic_message(cause.as_ref()),
                    "Webhook processing panicked"
                );
                WebhookProcessResult::failed(UNEXPECTED_ERROR)
            }
        }
    }

    /// Process one delivery, taking the signature from request headers.
    ///
    /// Header names are matched case-insensitively.
    pub async fn process_from_headers(
        &self,
        payload: &[u8],
        headers: &HashMap<String, String>,
        cancel: CancellationToken,
    ) -> WebhookProcessResult {
        match self.signature_from_headers(headers) {
            Some(signature) => self.process(payload, signature, cancel).await,
            None => {
                warn!(header = %self.signature_header, "Webhook signature header missing");
                WebhookProcessResult::failed(WebhookError::SignatureMissing.to_string())
            }
        }
    }

    async fn try_process(
        &self,
        payload: &[u8],
        signature: &str,
        cancel: CancellationToken,
    ) -> Result<(String, String)> {
        let envelope = self.parser.parse_event(payload, signature)?;
        let event_id = envelope.id().to_string();
        let event_type = envelope.event_type().to_string();

        self.dispatcher.dispatch(envelope, cancel).await?;
        Ok((event_id, event_type))
    }

    fn signature_from_headers<'a>(&self, headers: &'a HashMap<String, String>) -> Option<&'a str> {
        headers
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(&self.signature_header))
            .map(|(_, value)| value.as_str())
    }
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> &str {
    if let Some(msg) = panic.downcast_ref::<&str>() {
        msg
    } else if let Some(msg) = panic.downcast_ref::<String>() {
        msg
    } else {
        "non-string panic payload"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{HandlerError, SigningAlgorithm};
    use std::sync::atomic::{AtomicUsize, Ordering};

    const SECRET: &str = "s3cret";
    const PAYLOAD: &str = r#"{"id":"evt_1","event":"customer.created","data":{"customerId":"c1"}}"#;

    fn sign(payload: &str) -> String {
        WebhookSignature::compute_signature(SECRET, payload.as_bytes())
    }

    fn processor(dispatcher: WebhookDispatcher) -> WebhookProcessor {
        WebhookProcessor::new(SECRET, dispatcher).unwrap()
    }

    #[tokio::test]
    async fn test_process_success() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let processor = processor(
            WebhookDispatcher::builder()
                .on("customer.created", move |_envelope, _cancel| {
                    counter.fetch_add(1, Ordering::SeqCst);
                    async { Ok::<(), HandlerError>(()) }
                })
                .build(),
        );

        let result = processor
            .process(PAYLOAD.as_bytes(), &sign(PAYLOAD), CancellationToken::new())
            .await;

        assert_eq!(
            result,
            WebhookProcessResult::succeeded("evt_1", "customer.created")
        );
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_process_invalid_signature() {
        let processor = processor(WebhookDispatcher::default());

        let result = processor
            .process(PAYLOAD.as_bytes(), "deadbeef", CancellationToken::new())
            .await;

        assert!(!result.is_success());
        assert!(result.error().unwrap().contains("Invalid webhook signature"));
        assert!(result.event_id().is_none());
    }

    #[tokio::test]
    async fn test_process_malformed_payload() {
        let processor = processor(WebhookDispatcher::default());
        let payload = "{not json";

        let result = processor
            .process(payload.as_bytes(), &sign(payload), CancellationToken::new())
            .await;

        assert!(!result.is_success());
        assert!(result.error().unwrap().contains("parse"));
    }

    #[tokio::test]
    async fn test_process_converts_handler_error() {
        let processor = processor(
            WebhookDispatcher::builder()
                .on("customer.created", |_envelope, _cancel| async {
                    Err::<(), HandlerError>("crm offline".into())
                })
                .build(),
        );

        let result = processor
            .process(PAYLOAD.as_bytes(), &sign(PAYLOAD), CancellationToken::new())
            .await;

        assert!(!result.is_success());
        assert!(result.error().unwrap().contains("crm offline"));
    }

    #[tokio::test]
    async fn test_direct_dispatch_propagates_handler_error() {
        let processor = processor(
            WebhookDispatcher::builder()
                .on("customer.created", |_envelope, _cancel| async {
                    Err::<(), HandlerError>("crm offline".into())
                })
                .build(),
        );

        let envelope = processor
            .parser()
            .parse_event(PAYLOAD.as_bytes(), &sign(PAYLOAD))
            .unwrap();
        let err = processor
            .dispatcher()
            .dispatch(envelope, CancellationToken::new())
            .await
            .unwrap_err();

        assert!(err.is_handler_failure());
    }

    #[tokio::test]
    async fn test_process_converts_handler_panic() {
        let processor = processor(
            WebhookDispatcher::builder()
                .on("customer.created", |_envelope, _cancel| {
                    futures::future::lazy(|_| -> std::result::Result<(), HandlerError> {
                        panic!("handler bug")
                    })
                })
                .build(),
        );

        let result = processor
            .process(PAYLOAD.as_bytes(), &sign(PAYLOAD), CancellationToken::new())
            .await;

        assert_eq!(result, WebhookProcessResult::failed("unexpected error"));
    }

    #[tokio::test]
    async fn test_process_blank_inputs() {
        let processor = processor(WebhookDispatcher::default());

        for (payload, signature) in [("", ""), (" ", "abc"), (PAYLOAD, ""), (PAYLOAD, "  ")] {
            let result = processor
                .process(payload.as_bytes(), signature, CancellationToken::new())
                .await;
            assert!(!result.is_success());
            assert!(result.error().is_some());
        }
    }

    #[tokio::test]
    async fn test_process_unknown_event_succeeds() {
        let processor = processor(WebhookDispatcher::default());
        let payload = r#"{"id":"evt_7","event":"card.issued","data":{}}"#;

        let result = processor
            .process(payload.as_bytes(), &sign(payload), CancellationToken::new())
            .await;

        assert_eq!(result, WebhookProcessResult::succeeded("evt_7", "card.issued"));
    }

    #[tokio::test]
    async fn test_process_from_headers() {
        let processor = processor(WebhookDispatcher::default());

        let mut headers = HashMap::new();
        headers.insert("x-webhook-signature".to_string(), sign(PAYLOAD));
        let result = processor
            .process_from_headers(PAYLOAD.as_bytes(), &headers, CancellationToken::new())
            .await;
        assert!(result.is_success());

        let result = processor
            .process_from_headers(PAYLOAD.as_bytes(), &HashMap::new(), CancellationToken::new())
            .await;
        assert_eq!(
            result,
            WebhookProcessResult::failed("Signature missing from request")
        );
    }

    #[test]
    fn test_validate_webhook() {
        let processor = processor(WebhookDispatcher::default());

        assert!(processor.validate_webhook(PAYLOAD.as_bytes(), &sign(PAYLOAD)));
        assert!(processor.validate_webhook(PAYLOAD.as_bytes(), &sign(PAYLOAD).to_uppercase()));
        assert!(!processor.validate_webhook(PAYLOAD.as_bytes(), "deadbeef"));
        assert!(!processor.validate_webhook(b"", &sign(PAYLOAD)));
        assert!(!processor.validate_webhook(PAYLOAD.as_bytes(), ""));
    }

    #[test]
    fn test_validate_from_headers() {
        let processor = processor(WebhookDispatcher::default());

        let mut headers = HashMap::new();
        headers.insert("X-Webhook-Signature".to_string(), sign(PAYLOAD));
        assert!(processor.validate_from_headers(PAYLOAD.as_bytes(), &headers));
        assert!(!processor.validate_from_headers(PAYLOAD.as_bytes(), &HashMap::new()));
    }

    #[test]
    fn test_blank_secret_is_config_error() {
        let err = WebhookProcessor::new("  ", WebhookDispatcher::default()).unwrap_err();
        assert!(matches!(err, WebhookError::ConfigError(_)));
    }

    #[tokio::test]
    async fn test_from_config_uses_algorithm_and_header() {
        let config = WebhookConfig::builder()
            .secret(SECRET)
            .signing_algorithm(SigningAlgorithm::HmacSha512)
            .signature_header("X-Provider-Signature")
            .build()
            .unwrap();
        let processor = WebhookProcessor::from_config(&config, WebhookDispatcher::default()).unwrap();

        let sha512 = WebhookSignature::with_algorithm(SECRET, SigningAlgorithm::HmacSha512)
            .unwrap()
            .sign(PAYLOAD.as_bytes());

        let mut headers = HashMap::new();
        headers.insert("X-Provider-Signature".to_string(), sha512);
        let result = processor
            .process_from_headers(PAYLOAD.as_bytes(), &headers, CancellationToken::new())
            .await;
        assert!(result.is_success());

        assert!(!processor.validate_webhook(PAYLOAD.as_bytes(), &sign(PAYLOAD)));
    }
}
