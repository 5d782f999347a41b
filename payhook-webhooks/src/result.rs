//! Outcome of processing one webhook delivery

use serde::Serialize;

/// Result returned by [`WebhookProcessor::process`](crate::WebhookProcessor::process).
///
/// Either a success carrying the event ID and type, or a failure carrying an
/// error message; never both.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookProcessResult {
    success: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    event_id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    event_type: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl WebhookProcessResult {
    /// A successful delivery
    pub fn succeeded(event_id: impl Into<String>, event_type: impl Into<String>) -> Self {
        Self {
            success: true,
            event_id: Some(event_id.into()),
            event_type: Some(event_type.into()),
            error: None,
        }
    }

    /// A failed delivery
    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            event_id: None,
            event_type: None,
            error: Some(error.into()),
        }
    }

    /// Check if the delivery was processed successfully
    pub fn is_success(&self) -> bool {
        self.success
    }

    /// Event ID, on success
    pub fn event_id(&self) -> Option<&str> {
        self.event_id.as_deref()
    }

    /// Event type, on success
    pub fn event_type(&self) -> Option<&str> {
        self.event_type.as_deref()
    }

    /// Error message, on failure
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_succeeded() {
        let result = WebhookProcessResult::succeeded("evt_1", "customer.created");

        assert!(result.is_success());
        assert_eq!(result.event_id(), Some("evt_1"));
        assert_eq!(result.event_type(), Some("customer.created"));
        assert_eq!(result.error(), None);
    }

    #[test]
    fn test_failed() {
        let result = WebhookProcessResult::failed("Invalid webhook signature");

        assert!(!result.is_success());
        assert_eq!(result.event_id(), None);
        assert_eq!(result.event_type(), None);
        assert_eq!(result.error(), Some("Invalid webhook signature"));
    }

    #[test]
    fn test_serialization() {
        let ok = serde_json::to_value(WebhookProcessResult::succeeded("evt_1", "a.b")).unwrap();
        assert_eq!(
            ok,
            serde_json::json!({"success": true, "eventId": "evt_1", "eventType": "a.b"})
        );

        let failed = serde_json::to_value(WebhookProcessResult::failed("boom")).unwrap();
        assert_eq!(failed, serde_json::json!({"success": false, "error": "boom"}));
    }
}
