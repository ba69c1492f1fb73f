//! Message framing
//!
//! The hub speaks in `HiveMessage` envelopes; the envelope payload for
//! `bus` traffic is a plain bus [`Message`].

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A bus message: event type plus free-form data and routing context
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Event name, e.g. `speak` or `recognizer_loop:utterance`
    #[serde(rename = "type")]
    pub msg_type: String,
    /// Event payload
    #[serde(default = "empty_object")]
    pub data: Value,
    /// Routing context
    #[serde(default = "empty_object")]
    pub context: Value,
}

fn empty_object() -> Value {
    Value::Object(Map::new())
}

impl Message {
    /// Create a message with an empty context
    pub fn new(msg_type: impl Into<String>, data: Value) -> Self {
        Self {
            msg_type: msg_type.into(),
            data,
            context: empty_object(),
        }
    }

    /// String field from `data`, if present
    pub fn data_str(&self, key: &str) -> Option<&str> {
        self.data.get(key).and_then(Value::as_str)
    }
}

/// Envelope kinds understood by the hub
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HiveMessageType {
    /// Regular bus message
    Bus,
    /// Message shared with the hub but not executed
    SharedBus,
    /// Broadcast to all nodes
    Broadcast,
    /// Propagated across the hive
    Propagate,
    /// Escalated upstream
    Escalate,
    /// Greeting sent after authorization
    Hello,
    /// Handshake for key exchange
    Handshake,
    /// Keepalive
    Ping,
    /// Query upstream
    Query,
    /// Cascade downstream
    Cascade,
    /// Third-party payload
    ThirdParty,
    /// Anything this client does not know about
    #[serde(other)]
    Unknown,
}

/// Envelope wrapping every frame exchanged with the hub
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HiveMessage {
    /// Envelope kind
    pub msg_type: HiveMessageType,
    /// Envelope payload; a bus message for [`HiveMessageType::Bus`]
    #[serde(default)]
    pub payload: Value,
}

impl HiveMessage {
    /// Wrap a bus message
    pub fn bus(message: &Message) -> Result<Self, serde_json::Error> {
        Ok(Self {
            msg_type: HiveMessageType::Bus,
            payload: serde_json::to_value(message)?,
        })
    }

    /// Bus message carried by this envelope, if any
    ///
    /// Some hubs send the payload as a JSON-encoded string; both forms are accepted.
    pub fn bus_message(&self) -> Option<Message> {
        if self.msg_type != HiveMessageType::Bus {
            return None;
        }
        match &self.payload {
            Value::String(raw) => serde_json::from_str(raw).ok(),
            other => serde_json::from_value(other.clone()).ok(),
        }
    }
}
