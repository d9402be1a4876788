//! Per-connection session glue.
//!
//! Each accepted WebSocket connection gets a fresh session id, a bounded
//! outbound queue registered with the hub, and two tasks bridging the socket
//! to the hub's message-passing interface:
//!
//! - **reader**: blocks on the socket; every text frame is forwarded to the
//!   hub as an ingest request; a close frame or read error ends the loop.
//! - **writer**: drains the outbound queue onto the socket in order; the hub
//!   closing the queue (unregister or backpressure eviction) ends the drain
//!   naturally, after which a Close frame tells the client the session is
//!   over.
//!
//! Whichever task finishes first cancels the other, and the glue then issues
//! one unregister. The hub tolerates duplicates, so a race between the two
//! halves failing is harmless. Any transport-level error is non-fatal to the
//! hub and to other clients: it only tears down this one session. No retry is
//! attempted; a reconnecting client is assigned a new identity.

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::Response;
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use cursor_core::SessionId;

use crate::application::{ClientHandle, HubHandle, SEND_QUEUE_DEPTH};
use crate::infrastructure::server::AppState;

/// `GET /ws` — upgrades the request to a WebSocket session.
///
/// Requests that are not valid upgrades are rejected with an error response
/// by the extractor before this handler runs.
pub async fn ws_handler(State(state): State<AppState>, ws: WebSocketUpgrade) -> Response {
    ws.on_upgrade(move |socket| handle_session(socket, state.hub.clone()))
}

/// Runs the complete lifecycle of one client session.
async fn handle_session(socket: WebSocket, hub: HubHandle) {
    let session_id = Uuid::new_v4();
    let (outbound_tx, outbound_rx) = mpsc::channel(SEND_QUEUE_DEPTH);

    if hub
        .register(ClientHandle::new(session_id, outbound_tx))
        .await
        .is_err()
    {
        // The hub is already gone (process shutdown); drop the socket.
        return;
    }
    info!(%session_id, "session connected");

    let (sink, stream) = socket.split();
    let mut write_task = tokio::spawn(write_outbound(sink, outbound_rx, session_id));
    let mut read_task = tokio::spawn(read_inbound(stream, hub.clone(), session_id));

    // Whichever half finishes first ends the session; the survivor is
    // cancelled rather than left lingering on a dead connection.
    tokio::select! {
        _ = &mut write_task => read_task.abort(),
        _ = &mut read_task => write_task.abort(),
    }

    if hub.unregister(session_id).await.is_err() {
        debug!(%session_id, "hub already stopped during session teardown");
    }
    info!(%session_id, "session closed");
}

/// Reader half: forwards inbound payloads to the hub until the socket ends.
async fn read_inbound(mut stream: SplitStream<WebSocket>, hub: HubHandle, session_id: SessionId) {
    while let Some(frame) = stream.next().await {
        let message = match frame {
            Ok(message) => message,
            Err(e) => {
                debug!(%session_id, error = %e, "websocket read failed");
                break;
            }
        };

        match message {
            Message::Text(text) => {
                // Decoding happens inside the hub loop; a malformed payload
                // is its problem to drop, not a reason to end the session.
                if hub.ingest(session_id, text.as_str().to_owned()).await.is_err() {
                    break;
                }
            }
            Message::Binary(_) => {
                // The protocol is JSON text frames only.
                warn!(%session_id, "ignoring unexpected binary frame");
            }
            Message::Ping(_) | Message::Pong(_) => {
                // Protocol-level keepalive; the library answers pings itself.
            }
            Message::Close(_) => {
                debug!(%session_id, "close frame received");
                break;
            }
        }
    }
}

/// Writer half: drains the outbound queue onto the socket in order.
async fn write_outbound(
    mut sink: SplitSink<WebSocket, Message>,
    mut outbound: mpsc::Receiver<String>,
    session_id: SessionId,
) {
    while let Some(frame) = outbound.recv().await {
        if let Err(e) = sink.send(Message::Text(frame.into())).await {
            debug!(%session_id, error = %e, "websocket write failed");
            return;
        }
    }

    // The hub dropped our queue — normal unregister or backpressure
    // eviction. Close the socket so an evicted client sees its connection
    // end instead of a silent stall.
    if let Err(e) = sink.send(Message::Close(None)).await {
        debug!(%session_id, error = %e, "close frame not delivered");
    }
}
