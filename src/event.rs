//! Wire envelopes and decoded lifecycle events.
//!
//! Every message from the native side, success or failure alike, arrives as
//! the same tagged envelope shape:
//!
//! ```json
//! {
//!     "status": { "isRunning": true, "geodomain": "harbor" },
//!     "message": { "type": "fencesRefreshed", "content": { ... } }
//! }
//! ```
//!
//! The four recognized tags are `onStart`, `onQuit`, `fencesRefreshed`, and
//! `onException`; anything else fails decoding before any delegate is
//! notified.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ValidationError;
use crate::model::{FencingAgentState, FencingAgentStateUpdate};

/// Native-agent status stamped on every envelope.
///
/// The native side emits an empty object when the agent is not yet far
/// enough along to report anything, so both fields are optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentStatus {
    #[serde(default)]
    pub is_running: Option<bool>,
    #[serde(default)]
    pub geodomain: Option<String>,
}

/// The tagged wire message carrying one lifecycle event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    pub status: AgentStatus,
    pub message: EnvelopeMessage,
}

/// The `{type, content}` payload inside an envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnvelopeMessage {
    /// The message tag (`type` on the wire).
    #[serde(rename = "type")]
    pub kind: String,
    /// Variant-specific payload, validated during event decoding.
    pub content: Value,
}

impl Envelope {
    /// Parse envelope framing from raw JSON.
    pub fn from_json(value: Value) -> Result<Self, ValidationError> {
        serde_json::from_value(value).map_err(ValidationError::MalformedEnvelope)
    }
}

/// One decoded lifecycle event, ready for delegate fan-out.
///
/// Content is validated here, exactly once per envelope, before any delegate
/// sees it.
#[derive(Debug, Clone, PartialEq)]
pub enum AgentEvent {
    /// The native agent finished starting.
    Started(FencingAgentState),
    /// The native agent shut down.
    Quit(FencingAgentState),
    /// A refresh produced a before/after state pair.
    FencesRefreshed(FencingAgentStateUpdate),
    /// The native side reported an exception; the content passes through
    /// undecoded.
    Exception(Value),
}

impl AgentEvent {
    /// Decode an envelope's message into the matching lifecycle event.
    pub fn from_envelope(envelope: &Envelope) -> Result<Self, ValidationError> {
        match envelope.message.kind.as_str() {
            "onStart" => Ok(AgentEvent::Started(FencingAgentState::from_json(
                &envelope.message.content,
            )?)),
            "onQuit" => Ok(AgentEvent::Quit(FencingAgentState::from_json(
                &envelope.message.content,
            )?)),
            "fencesRefreshed" => Ok(AgentEvent::FencesRefreshed(
                FencingAgentStateUpdate::from_json(&envelope.message.content)?,
            )),
            "onException" => Ok(AgentEvent::Exception(envelope.message.content.clone())),
            other => Err(ValidationError::UnknownMessageType(other.to_string())),
        }
    }
}
