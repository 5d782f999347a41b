//! Parsed webhook envelope

use chrono::{DateTime, Utc};
use serde::de::{self, DeserializeOwned};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// A verified, parsed webhook delivery.
///
/// Fields are read-only once constructed. The `data` tree is kept opaque and
/// decoded on demand with [`WebhookEnvelope::data_as`]. Unknown top-level keys
/// are ignored; `timestamp` accepts RFC 3339 text or Unix seconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebhookEnvelope {
    id: String,

    #[serde(rename = "event")]
    event_type: String,

    #[serde(
        default,
        deserialize_with = "deserialize_timestamp",
        skip_serializing_if = "Option::is_none"
    )]
    timestamp: Option<DateTime<Utc>>,

    #[serde(default)]
    data: serde_json::Value,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    metadata: Option<HashMap<String, serde_json::Value>>,
}

impl WebhookEnvelope {
    /// Create an envelope for the given event type with a fresh ID
    pub fn new(event_type: impl Into<String>) -> Self {
        Self {
            id: format!("evt_{}", Uuid::new_v4().simple()),
            event_type: event_type.into(),
            timestamp: Some(Utc::now()),
            data: serde_json::Value::Null,
            metadata: None,
        }
    }

    /// Set a custom ID
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    /// Set the event data
    pub fn with_data(mut self, data: serde_json::Value) -> Self {
        self.data = data;
        self
    }

    /// Add a metadata entry
    pub fn with_metadata(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.metadata
            .get_or_insert_with(HashMap::new)
            .insert(key.into(), value);
        self
    }

    /// Set a custom timestamp
    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    /// Provider-assigned event ID
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Event type used as the dispatch key (e.g. `customer.created`)
    pub fn event_type(&self) -> &str {
        &self.event_type
    }

    /// Provider-reported event time, if present
    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        self.timestamp
    }

    /// The raw event data
    pub fn data(&self) -> &serde_json::Value {
        &self.data
    }

    /// Optional metadata
    pub fn metadata(&self) -> Option<&HashMap<String, serde_json::Value>> {
        self.metadata.as_ref()
    }

    /// Decode the event data into `T`.
    ///
    /// Returns `None` when the data does not fit `T`, so several candidate
    /// shapes can be tried against the same envelope.
    pub fn data_as<T: DeserializeOwned>(&self) -> Option<T> {
        T::deserialize(&self.data).ok()
    }

    /// Convert to JSON bytes
    pub fn to_bytes(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }

    /// Convert to JSON string
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawTimestamp {
    Seconds(i64),
    Text(DateTime<Utc>),
}

fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<RawTimestamp>::deserialize(deserializer)? {
        None => Ok(None),
        Some(RawTimestamp::Text(timestamp)) => Ok(Some(timestamp)),
        Some(RawTimestamp::Seconds(secs)) => DateTime::from_timestamp(secs, 0)
            .map(Some)
            .ok_or_else(|| de::Error::custom(format!("timestamp out of range: {}", secs))),
    }
}
