//! JSON codec for the cursor relay wire protocol.
//!
//! Decoding accepts raw bytes straight off the transport so the caller never
//! has to worry about UTF-8 validation; serde_json handles it.

use thiserror::Error;

use crate::protocol::messages::{CursorUpdate, Envelope, SessionId};

/// Errors that can occur during message encoding or decoding.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// The inbound payload is not a well-formed coordinate record.
    ///
    /// Missing `x`/`y`, non-integer coordinates, or invalid JSON all land
    /// here. The offending message is dropped; the connection stays alive.
    #[error("malformed cursor payload: {0}")]
    Decode(#[source] serde_json::Error),

    /// An outbound envelope failed to serialize.
    ///
    /// Unreachable for the envelope types in this crate; the variant exists
    /// because serde_json's API is fallible.
    #[error("envelope encoding failed: {0}")]
    Encode(#[source] serde_json::Error),
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Decodes an inbound payload into a [`CursorUpdate`].
///
/// # Errors
///
/// Returns [`ProtocolError::Decode`] when the payload is not a JSON object
/// with integer `x` and `y` fields. Extra fields are ignored.
///
/// # Examples
///
/// ```rust
/// use cursor_core::decode_update;
///
/// let update = decode_update(br#"{"x":10,"y":20}"#).unwrap();
/// assert_eq!((update.x, update.y), (10, 20));
/// ```
pub fn decode_update(payload: &[u8]) -> Result<CursorUpdate, ProtocolError> {
    serde_json::from_slice(payload).map_err(ProtocolError::Decode)
}

/// Encodes a `move` envelope for `session_id` at `cursor`.
///
/// Total under valid inputs: every [`SessionId`] and [`CursorUpdate`]
/// serializes cleanly.
///
/// # Errors
///
/// Returns [`ProtocolError::Encode`] only if serde_json fails, which cannot
/// happen for these types.
pub fn encode_move(session_id: SessionId, cursor: CursorUpdate) -> Result<String, ProtocolError> {
    encode_envelope(&Envelope::Move {
        session_id,
        x: cursor.x,
        y: cursor.y,
    })
}

/// Encodes a `leave` envelope for `session_id`.
///
/// # Errors
///
/// Returns [`ProtocolError::Encode`] only if serde_json fails, which cannot
/// happen for these types.
pub fn encode_leave(session_id: SessionId) -> Result<String, ProtocolError> {
    encode_envelope(&Envelope::Leave { session_id })
}

fn encode_envelope(envelope: &Envelope) -> Result<String, ProtocolError> {
    serde_json::to_string(envelope).map_err(ProtocolError::Encode)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
