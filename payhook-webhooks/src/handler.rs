//! Webhook handler trait

use crate::{HandlerError, WebhookEnvelope};
use async_trait::async_trait;
use std::future::Future;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Handles one kind of webhook event.
///
/// Any `Fn(Arc<WebhookEnvelope>, CancellationToken) -> impl Future` closure
/// returning `Result<(), HandlerError>` implements this trait, so most
/// handlers are registered as plain async closures:
///
/// ```rust
/// use payhook_webhooks::{WebhookDispatcher, HandlerError};
///
/// let dispatcher = WebhookDispatcher::builder()
///     .on("customer.created", |envelope, _cancel| async move {
///         println!("new customer: {}", envelope.data()["customerId"]);
///         Ok::<_, HandlerError>(())
///     })
///     .build();
/// ```
///
/// Long-running handlers should watch the cancellation token and stop
/// promptly once it fires; the dispatcher imposes no timeout of its own.
#[async_trait]
pub trait WebhookHandler: Send + Sync {
    /// Handle a webhook event
    async fn handle(
        &self,
        envelope: Arc<WebhookEnvelope>,
        cancel: CancellationToken,
    ) -> Result<(), HandlerError>;
}

#[async_trait]
impl<F, Fut> WebhookHandler for F
where
    F: Fn(Arc<WebhookEnvelope>, CancellationToken) -> Fut + Send + Sync,
    Fut: Future<Output = Result<(), HandlerError>> + Send + 'static,
{
    async fn handle(
        &self,
        envelope: Arc<WebhookEnvelope>,
        cancel: CancellationToken,
    ) -> Result<(), HandlerError> {
        (self)(envelope, cancel).await
    }
}
