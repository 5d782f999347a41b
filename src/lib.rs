// Payhook - inbound webhook processing for a financial-services API client
//
// The facade re-exports the webhook subsystem and, with the `log` feature,
// the logging bootstrap used by host applications.

// Re-export the webhook subsystem
pub use payhook_webhooks::*;

// Re-export optional crates
#[cfg(feature = "log")]
pub use payhook_log;

// Re-export commonly used dependencies
pub use async_trait::async_trait;
pub use tokio_util::sync::CancellationToken;

/// Prelude for common imports.
///
/// ```
/// use payhook::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{
        CancellationToken, DispatchOutcome, HandlerError, WebhookConfig, WebhookDispatcher,
        WebhookEnvelope, WebhookError, WebhookHandler, WebhookParser, WebhookProcessResult,
        WebhookProcessor, WebhookSignature,
    };
    pub use async_trait::async_trait;
}
