//! Error types for the fencing-agent crate.
//!
//! Two failure families exist and never mix silently:
//!
//! - [`ValidationError`]: wire-format JSON failed to normalize into the typed
//!   domain model. Always synchronous, always fatal to the call that raised
//!   it; an entity either validates completely or is rejected.
//! - [`ChannelError`]: the native geofencing channel itself failed to carry
//!   a request.
//!
//! [`AgentError`] unifies the two at the session boundary.

use thiserror::Error;

/// A validation failure raised while normalizing wire-format JSON.
///
/// Each variant names the offending field, the constraint that was expected,
/// and the value that was received, so a caller can tell from the message
/// alone what the native side sent and why it was refused.
#[derive(Error, Debug)]
pub enum ValidationError {
    /// A required field was absent.
    #[error("`{field}` is required but was missing")]
    MissingField {
        /// Dotted path of the missing field.
        field: String,
    },

    /// A field held a value of the wrong type or shape.
    #[error("`{field}` expected {expected}, received `{received}`")]
    TypeMismatch {
        /// Dotted path of the offending field.
        field: String,
        /// The constraint that was expected.
        expected: &'static str,
        /// The received value, rendered as JSON.
        received: String,
    },

    /// A numeric field fell outside its permitted range.
    #[error("`{field}` expected {expected}, received `{received}`")]
    OutOfRange {
        /// Dotted path of the offending field.
        field: String,
        /// The range that was expected.
        expected: &'static str,
        /// The received value.
        received: String,
    },

    /// A timestamp field did not parse as an RFC 3339 date.
    #[error("`{field}` expected an RFC 3339 timestamp, received `{received}`")]
    InvalidTimestamp {
        /// Dotted path of the offending field.
        field: String,
        /// The received value.
        received: String,
    },

    /// A status field named a value outside the closed status set.
    #[error("`{field}` received unrecognized status `{received}`")]
    UnknownStatus {
        /// Dotted path of the offending field.
        field: String,
        /// The received value.
        received: String,
    },

    /// `baseType` named a requirement kind outside the closed set.
    #[error("unrecognized requirement type `{0}`")]
    UnknownRequirementType(String),

    /// An envelope carried a message tag outside the four lifecycle tags.
    #[error("unrecognized message type `{0}`")]
    UnknownMessageType(String),

    /// A profile config object carried a key outside the recognized option
    /// names while strict mode was in effect.
    #[error("`{0}` is not a recognized profile option (pass lenient to allow extra keys)")]
    UnknownProfileKey(String),

    /// Envelope framing did not deserialize at all.
    #[error("malformed event envelope: {0}")]
    MalformedEnvelope(#[from] serde_json::Error),
}

/// A failure reported by the native geofencing channel, as opposed to a
/// validation failure in a payload it delivered.
#[derive(Error, Debug)]
pub enum ChannelError {
    /// Creating the native agent failed. Fatal to the session, never retried.
    #[error("native agent creation failed: {0}")]
    CreateAgent(String),

    /// A one-shot native call was not acknowledged.
    #[error("native call `{action}` failed: {reason}")]
    Call {
        /// The native action that was attempted.
        action: &'static str,
        /// Human-readable failure reason from the native side.
        reason: String,
    },
}

/// Session-level error unifying validation and channel failures.
#[derive(Error, Debug)]
pub enum AgentError {
    /// A payload failed validation.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The native channel failed.
    #[error(transparent)]
    Channel(#[from] ChannelError),
}
