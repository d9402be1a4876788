//! cursor-relay library crate.
//!
//! This crate provides a WebSocket hub that relays live cursor positions
//! between connected clients: each client pushes its own `(x, y)` coordinate,
//! and the hub fans the position out to every live client, announcing
//! departures as `leave` events.
//!
//! # Architecture
//!
//! ```text
//! Browser (JSON over WebSocket)
//!         ↕
//! [cursor-relay]
//!   ├── domain/           AppConfig (YAML configuration surface)
//!   ├── application/      Hub: the single-consumer control loop owning
//!   │                     membership and cursor state
//!   └── infrastructure/
//!         ├── server/     axum router, listener, entry page, shutdown
//!         └── session/    per-connection glue: reader/writer tasks
//! ```
//!
//! # Layer rules
//!
//! - `domain` holds configuration types and nothing transport-aware.
//! - `application` owns all hub state; it knows about channels and the
//!   `cursor-core` codec but never touches a socket.
//! - `infrastructure` depends on the other layers plus `axum` and `tokio`.
//!
//! All membership and broadcast mutations are serialized through the hub's
//! command channel, so a slow or dead client can never stall delivery to
//! healthy ones — it is evicted the moment its send queue overflows.

pub mod application;
pub mod domain;
pub mod infrastructure;
