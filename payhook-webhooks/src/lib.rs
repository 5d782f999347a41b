//! Inbound webhook processing for payhook
//!
//! This crate receives webhooks from a financial-services provider: it
//! verifies the HMAC signature over the raw request body, parses the verified
//! body into an event envelope, and dispatches the envelope to the handler
//! registered for its event type.
//!
//! # Features
//!
//! - **Signature Verification**: HMAC-SHA256 (or SHA512) over the exact bytes received
//! - **Envelope Parsing**: Verified payloads only, with soft-fail typed data decoding
//! - **Handler Dispatch**: Immutable event-type → handler table, built once
//! - **Processor**: One call per request that always returns a result
//!
//! # Example
//!
//! ```rust,no_run
//! use payhook_webhooks::{HandlerError, WebhookDispatcher, WebhookProcessor};
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn run(body: &[u8], signature: &str) -> Result<(), Box<dyn std::error::Error>> {
//! let dispatcher = WebhookDispatcher::builder()
//!     .on("customer.created", |envelope, _cancel| async move {
//!         println!("customer {} created", envelope.data()["customerId"]);
//!         Ok::<_, HandlerError>(())
//!     })
//!     .build();
//!
//! let processor = WebhookProcessor::new("whsec_shared_secret", dispatcher)?;
//!
//! let result = processor.process(body, signature, CancellationToken::new()).await;
//! if !result.is_success() {
//!     eprintln!("rejected: {}", result.error().unwrap_or_default());
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Error semantics
//!
//! [`WebhookDispatcher::dispatch`] returns handler failures as
//! [`WebhookError::HandlerFailed`] so callers can ask the provider to
//! redeliver. [`WebhookProcessor::process`] converts every failure into a
//! [`WebhookProcessResult`] instead. Neither performs replay protection or
//! timestamp skew checks; those belong to the application.

mod config;
mod dispatcher;
mod envelope;
mod error;
mod handler;
mod parser;
mod processor;
mod result;
mod signature;

pub use config::{
    ENV_ALGORITHM, ENV_SECRET, ENV_SIGNATURE_HEADER, SigningAlgorithm, WebhookConfig,
    WebhookConfigBuilder,
};
pub use dispatcher::{DispatchOutcome, WebhookDispatcher, WebhookDispatcherBuilder};
pub use envelope::WebhookEnvelope;
pub use error::{HandlerError, WebhookError};
pub use handler::WebhookHandler;
pub use parser::WebhookParser;
pub use processor::WebhookProcessor;
pub use result::WebhookProcessResult;
pub use signature::{WebhookSignature, headers};

/// Result type for webhook operations
pub type Result<T> = std::result::Result<T, WebhookError>;
