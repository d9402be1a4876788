//! Protocol module containing the message types and the JSON codec.

pub mod codec;
pub mod messages;

pub use codec::{decode_update, encode_leave, encode_move, ProtocolError};
pub use messages::{CursorUpdate, Envelope, SessionId};
