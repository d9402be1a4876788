//! # cursor-core
//!
//! Shared library for the cursor relay containing the wire protocol types and
//! the JSON codec.
//!
//! The relay speaks a small self-describing JSON protocol:
//!
//! - **Inbound** (client → server): a bare coordinate object, `{"x":10,"y":20}`.
//! - **Outbound** (server → client): a tagged envelope describing a state
//!   change to broadcast, either
//!   `{"method":"move","sessionId":"<uuid>","x":10,"y":20}` or
//!   `{"method":"leave","sessionId":"<uuid>"}`.
//!
//! JSON (rather than a fixed binary layout) keeps the envelope self-describing
//! so future fields can be added without breaking older readers.
//!
//! This crate has zero dependencies on sockets, async runtimes, or frameworks;
//! everything here is pure data and pure functions.

pub mod protocol;

// Re-export the most-used items at the crate root so callers can write
// `cursor_core::Envelope` instead of the longer module path.
pub use protocol::codec::{decode_update, encode_leave, encode_move, ProtocolError};
pub use protocol::messages::{CursorUpdate, Envelope, SessionId};
