//! Event-type dispatch to registered handlers

use crate::{HandlerError, Result, WebhookEnvelope, WebhookError, WebhookHandler};
use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

/// What happened to a dispatched envelope
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// A handler registered for the event type ran to completion
    Handled,

    /// No handler was registered; the fallback handler (if any) ran
    Unhandled,
}

/// Immutable table of event-type handlers.
///
/// Built once through [`WebhookDispatcherBuilder`]; lookups are exact,
/// case-sensitive string matches with no wildcard support. Because the
/// table never changes after `build()`, a dispatcher can be shared across
/// tasks without locking.
pub struct WebhookDispatcher {
    handlers: HashMap<String, Arc<dyn WebhookHandler>>,
    fallback: Option<Arc<dyn WebhookHandler>>,
}

impl WebhookDispatcher {
    /// Create a builder
    pub fn builder() -> WebhookDispatcherBuilder {
        WebhookDispatcherBuilder::new()
    }

    /// Check whether a handler is registered for an event type
    pub fn handles(&self, event_type: &str) -> bool {
        self.handlers.contains_key(event_type)
    }

    /// Registered event types, sorted
    pub fn event_types(&self) -> Vec<&str> {
        let mut types: Vec<&str> = self.handlers.keys().map(String::as_str).collect();
        types.sort_unstable();
        types
    }

    /// Route an envelope to its handler.
    ///
    /// Handler errors are returned as [`WebhookError::HandlerFailed`] so the
    /// caller can signal failure back to the provider and get a redelivery.
    /// An event type with no registration is not an error.
    pub async fn dispatch(
        &self,
        envelope: WebhookEnvelope,
        cancel: CancellationToken,
    ) -> Result<DispatchOutcome> {
        let envelope = Arc::new(envelope);

        let (handler, outcome) = match self.handlers.get(envelope.event_type()) {
            Some(handler) => (handler, DispatchOutcome::Handled),
            None => match self.fallback {
                Some(ref handler) => (handler, DispatchOutcome::Unhandled),
                None => {
                    debug!(
                        event_id = %envelope.id(),
                        event_type = %envelope.event_type(),
                        "No handler registered for webhook event, ignoring"
                    );
                    return Ok(DispatchOutcome::Unhandled);
                }
            },
        };

        debug!(
            event_id = %envelope.id(),
            event_type = %envelope.event_type(),
            fallback = outcome == DispatchOutcome::Unhandled,
            "Dispatching webhook event"
        );

        match handler.handle(Arc::clone(&envelope), cancel).await {
            Ok(()) => {
                info!(
                    event_id = %envelope.id(),
                    event_type = %envelope.event_type(),
                    "Webhook event handled"
                );
                Ok(outcome)
            }
            Err(source) => {
                error!(
                    event_id = %envelope.id(),
                    event_type = %envelope.event_type(),
                    error = %source,
                    "Webhook handler failed"
                );
                Err(WebhookError::HandlerFailed {
                    event_type: envelope.event_type().to_string(),
                    source,
                })
            }
        }
    }
}

impl fmt::Debug for WebhookDispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WebhookDispatcher")
            .field("event_types", &self.event_types())
            .field("fallback", &self.fallback.is_some())
            .finish()
    }
}

impl Default for WebhookDispatcher {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// Builder for [`WebhookDispatcher`]
#[derive(Default)]
pub struct WebhookDispatcherBuilder {
    handlers: HashMap<String, Arc<dyn WebhookHandler>>,
    fallback: Option<Arc<dyn WebhookHandler>>,
}

impl WebhookDispatcherBuilder {
    /// Create an empty builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an async closure for an event type.
    ///
    /// Registering the same event type twice replaces the earlier handler.
    pub fn on<F, Fut>(self, event_type: impl Into<String>, handler: F) -> Self
    where
        F: Fn(Arc<WebhookEnvelope>, CancellationToken) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = std::result::Result<(), HandlerError>> + Send + 'static,
    {
        self.on_handler(event_type, handler)
    }

    /// Register a [`WebhookHandler`] implementation for an event type
    pub fn on_handler<H: WebhookHandler + 'static>(
        mut self,
        event_type: impl Into<String>,
        handler: H,
    ) -> Self {
        let event_type = event_type.into();
        if self
            .handlers
            .insert(event_type.clone(), Arc::new(handler))
            .is_some()
        {
            debug!(event_type = %event_type, "Replacing previously registered webhook handler");
        }
        self
    }

    /// Register a handler for event types with no registration of their own
    pub fn on_unknown<F, Fut>(self, handler: F) -> Self
    where
        F: Fn(Arc<WebhookEnvelope>, CancellationToken) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = std::result::Result<(), HandlerError>> + Send + 'static,
    {
        self.on_unknown_handler(handler)
    }

    /// Register a [`WebhookHandler`] for unmatched event types
    pub fn on_unknown_handler<H: WebhookHandler + 'static>(mut self, handler: H) -> Self {
        self.fallback = Some(Arc::new(handler));
        self
    }

    /// Freeze the table
    pub fn build(self) -> WebhookDispatcher {
        WebhookDispatcher {
            handlers: self.handlers,
            fallback: self.fallback,
        }
    }
}
