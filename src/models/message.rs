use std::fmt::{Display, Formatter, Result as FmtResult};

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::error::RelayError;

pub const ENVELOPE_FIELD: &str = "oslo.message";
pub const UNKNOWN: &str = "unknown";

/// Top-level notification exactly as it arrived on the queue.
///
/// The decoded value is what gets forwarded to the webhook, so it is never
/// rewritten after decoding.
#[derive(Debug, Clone, PartialEq)]
pub struct Notification(Value);

impl Notification {
    pub fn decode(payload: &[u8]) -> Result<Self, RelayError> {
        let value = serde_json::from_slice::<Value>(payload)?;

        if !value.is_object() {
            return Err(RelayError::unexpected("notification is not a JSON object"));
        }

        Ok(Self(value))
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    /// Unwraps `oslo.message`, which may be an object or a JSON-encoded string.
    ///
    /// A missing field or a string that does not decode yields an empty envelope.
    pub fn envelope(&self) -> Result<EventEnvelope, RelayError> {
        let unwrapped = match self.0.get(ENVELOPE_FIELD) {
            None | Some(Value::Null) => Value::Object(Map::new()),
            Some(Value::String(encoded)) => serde_json::from_str::<Value>(encoded)
                .unwrap_or_else(|_| Value::Object(Map::new())),
            Some(other) => other.clone(),
        };

        if !unwrapped.is_object() {
            return Err(RelayError::unexpected(format!(
                "'{}' is not a JSON object",
                ENVELOPE_FIELD
            )));
        }

        serde_json::from_value(unwrapped)
            .map_err(|e| RelayError::unexpected(format!("malformed event envelope: {}", e)))
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct EventEnvelope {
    #[serde(default)]
    pub event_type: Option<Value>,

    #[serde(default, rename = "_context_project_name")]
    pub project_name: Option<Value>,

    #[serde(default, rename = "_context_user_name")]
    pub user_name: Option<Value>,

    #[serde(default)]
    pub payload: Option<Value>,
}

impl EventEnvelope {
    pub fn event_type(&self) -> String {
        render(self.event_type.as_ref())
    }

    pub fn summary(&self) -> Result<EventSummary, RelayError> {
        let mut summary = EventSummary {
            event_type: self.event_type(),
            project: render(self.project_name.as_ref()),
            user: render(self.user_name.as_ref()),
            instance: UNKNOWN.to_string(),
            state: UNKNOWN.to_string(),
            description: UNKNOWN.to_string(),
        };

        if let Some(payload) = self.payload.as_ref().filter(|value| is_truthy(value)) {
            let payload = payload
                .as_object()
                .ok_or_else(|| RelayError::unexpected("event payload is not a JSON object"))?;

            summary.instance = render(payload.get("display_name"));
            summary.state = render(payload.get("state"));
            summary.description = render(payload.get("state_description"));
        }

        Ok(summary)
    }
}

/// One-line description of a forwarded event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventSummary {
    pub event_type: String,
    pub project: String,
    pub user: String,
    pub instance: String,
    pub state: String,
    pub description: String,
}

impl Display for EventSummary {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(
            f,
            "Event type: {} | Project: {} | User: {} | Instance: {} | State: {} | Description: {}",
            self.event_type, self.project, self.user, self.instance, self.state, self.description
        )
    }
}

fn render(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => UNKNOWN.to_string(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(fields) => !fields.is_empty(),
    }
}
