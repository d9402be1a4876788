//! Infrastructure layer: the HTTP/WebSocket surface.
//!
//! Everything transport-shaped lives here — the axum router and listener, the
//! entry page, and the per-connection session glue. The hub itself never
//! touches a socket; this layer only talks to it through [`HubHandle`]
//! commands.
//!
//! [`HubHandle`]: crate::application::HubHandle

pub mod server;
pub mod session;

pub use server::{router, run_server, AppState};
