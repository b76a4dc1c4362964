//! Error types for the protocol layer.
//!
//! Each crate in Oddword defines its own error enum. When you see a
//! `ProtocolError`, you know the problem is in serialization or
//! deserialization, not in networking or game rules.

/// Errors that can occur in the protocol layer.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serialization failed (turning a Rust type into bytes).
    #[cfg(feature = "json")]
    #[error("encode failed: {0}")]
    Encode(serde_json::Error),

    /// Deserialization failed (turning bytes into a Rust type).
    ///
    /// Common causes: malformed JSON, missing required fields, an
    /// unknown event `type`, or truncated frames.
    #[cfg(feature = "json")]
    #[error("decode failed: {0}")]
    Decode(serde_json::Error),

    /// The event is invalid at the protocol level, e.g. a blank
    /// display name.
    #[error("invalid message: {0}")]
    InvalidMessage(String),
}
