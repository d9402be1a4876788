//! Application layer: the hub control loop and its client handles.

pub mod hub;

pub use hub::{ClientHandle, Hub, HubClosed, HubCommand, HubHandle, SEND_QUEUE_DEPTH};
