use crate::client_event::ClientEvent;

/// Wire-boundary error: malformed or unparseable inbound JSON. Never
/// surfaces validation/authorisation/state errors from the engine — those
/// are dropped silently, and lookup errors get their own structured ack
/// instead of a protocol error.
#[derive(Debug, Clone)]
pub enum ProtocolError {
    InvalidEvent(String),
}

impl std::fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidEvent(s) => write!(f, "invalid event: {s}"),
        }
    }
}

impl std::error::Error for ProtocolError {}

/// Centralises the JSON <-> `ClientEvent`/`ServerMessage` boundary so the
/// dispatcher never touches `serde_json` directly.
pub struct Protocol;

impl Protocol {
    pub fn decode(raw: &str) -> Result<ClientEvent, ProtocolError> {
        serde_json::from_str(raw).map_err(|e| ProtocolError::InvalidEvent(e.to_string()))
    }
}
