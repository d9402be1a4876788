//! Wire message types for the cursor relay protocol.
//!
//! # Message flow
//!
//! ```text
//! Client → Server:  JSON text frame  →  CursorUpdate
//! Server → Client:  Envelope         →  JSON text frame
//! ```
//!
//! # JSON discriminant
//!
//! Every outbound message is a JSON object with a `"method"` field that
//! identifies the variant; all other fields are flattened into the same
//! object:
//!
//! ```json
//! {"method":"move","sessionId":"3f2a…","x":100,"y":200}
//! ```
//!
//! Serde's `#[serde(tag = "method")]` attribute handles this automatically.
//!
//! Inbound and outbound messages are distinct types: clients only ever send
//! coordinates, the server only ever sends envelopes. Keeping them separate
//! makes it a compile-time error to echo a raw update back without stamping
//! the originating session onto it.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for one client session.
///
/// Assigned when the transport connection is accepted and stable for the
/// connection's lifetime. A client that reconnects gets a fresh id.
pub type SessionId = Uuid;

// ── Client → Server ───────────────────────────────────────────────────────────

/// A cursor position reported by a client.
///
/// The relay imposes no bounds on the coordinates; they are opaque integers
/// carried from one client to the others. Unknown extra fields in the JSON
/// object are ignored so newer clients can ship richer payloads without
/// breaking this server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CursorUpdate {
    pub x: i64,
    pub y: i64,
}

// ── Server → Client ───────────────────────────────────────────────────────────

/// A tagged outbound message describing a state change to broadcast.
///
/// # Serde representation
///
/// ```json
/// {"method":"move","sessionId":"<uuid>","x":10,"y":20}
/// {"method":"leave","sessionId":"<uuid>"}
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "lowercase")]
pub enum Envelope {
    /// A client's cursor moved to a new position.
    Move {
        /// Session that produced the update.
        #[serde(rename = "sessionId")]
        session_id: SessionId,
        x: i64,
        y: i64,
    },

    /// A client left; receivers should drop its cursor.
    Leave {
        #[serde(rename = "sessionId")]
        session_id: SessionId,
    },
}

impl Envelope {
    /// The session this envelope is about.
    pub fn session_id(&self) -> SessionId {
        match self {
            Envelope::Move { session_id, .. } | Envelope::Leave { session_id } => *session_id,
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
