//! Integration tests for the hub, driven through its public handle.
//!
//! These tests exercise the spawned control loop exactly the way the session
//! glue does: register a client handle backed by a bounded channel, push raw
//! payloads through `ingest`, and observe what lands on each client's queue.
//!
//! Because the hub processes commands in order and each client's queue
//! preserves enqueue order, "nothing was broadcast" is asserted without
//! sleeping: send a follow-up command that *does* broadcast and check that
//! its frame is the first thing received.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::timeout;
use uuid::Uuid;

use cursor_core::{Envelope, SessionId};
use cursor_relay::application::{ClientHandle, Hub, HubHandle};

const RECV_TIMEOUT: Duration = Duration::from_secs(1);

/// Registers a fresh client with the given queue capacity and returns its id
/// and the receiving side of its queue.
async fn connect(hub: &HubHandle, capacity: usize) -> (SessionId, mpsc::Receiver<String>) {
    let session_id = Uuid::new_v4();
    let (tx, rx) = mpsc::channel(capacity);
    hub.register(ClientHandle::new(session_id, tx))
        .await
        .expect("hub must be running");
    (session_id, rx)
}

async fn recv_envelope(rx: &mut mpsc::Receiver<String>) -> Envelope {
    let frame = timeout(RECV_TIMEOUT, rx.recv())
        .await
        .expect("timed out waiting for a frame")
        .expect("queue closed unexpectedly");
    serde_json::from_str(&frame).expect("frame must be a valid envelope")
}

#[tokio::test]
async fn test_end_to_end_move_then_leave() {
    let hub = Hub::new().spawn();

    // Client A connects, client B connects.
    let (a, mut rx_a) = connect(&hub, 16).await;
    let (_b, mut rx_b) = connect(&hub, 16).await;

    // A reports a position: B receives one move envelope with A's id and the
    // decoded coordinates; A receives its own echo.
    hub.ingest(a, r#"{"x":10,"y":20}"#.to_string()).await.unwrap();

    let expected = Envelope::Move {
        session_id: a,
        x: 10,
        y: 20,
    };
    assert_eq!(recv_envelope(&mut rx_b).await, expected);
    assert_eq!(recv_envelope(&mut rx_a).await, expected);

    // A disconnects: B then receives exactly one leave envelope with A's id,
    // and A's queue closes.
    hub.unregister(a).await.unwrap();

    assert_eq!(
        recv_envelope(&mut rx_b).await,
        Envelope::Leave { session_id: a }
    );
    let closed = timeout(RECV_TIMEOUT, rx_a.recv())
        .await
        .expect("timed out waiting for queue closure");
    assert!(closed.is_none(), "departed client's queue must be closed");
}

#[tokio::test]
async fn test_saturated_client_is_evicted_and_others_keep_receiving() {
    let hub = Hub::new().spawn();

    // The stalled client never drains its single-slot queue.
    let (stalled, mut rx_stalled) = connect(&hub, 1).await;
    let (healthy, mut rx_healthy) = connect(&hub, 16).await;

    hub.ingest(healthy, r#"{"x":1,"y":1}"#.to_string()).await.unwrap();
    hub.ingest(healthy, r#"{"x":2,"y":2}"#.to_string()).await.unwrap();

    // The healthy client saw both moves and then the eviction leave.
    assert_eq!(
        recv_envelope(&mut rx_healthy).await,
        Envelope::Move {
            session_id: healthy,
            x: 1,
            y: 1
        }
    );
    assert_eq!(
        recv_envelope(&mut rx_healthy).await,
        Envelope::Move {
            session_id: healthy,
            x: 2,
            y: 2
        }
    );
    assert_eq!(
        recv_envelope(&mut rx_healthy).await,
        Envelope::Leave {
            session_id: stalled
        }
    );

    // The evicted client got only the frame that fit, then its queue closed.
    assert_eq!(
        recv_envelope(&mut rx_stalled).await,
        Envelope::Move {
            session_id: healthy,
            x: 1,
            y: 1
        }
    );
    let closed = timeout(RECV_TIMEOUT, rx_stalled.recv())
        .await
        .expect("timed out waiting for queue closure");
    assert!(closed.is_none(), "evicted client's queue must be closed");

    // The evicted session's glue will still signal unregister; that must not
    // produce a second leave. A subsequent move arrives first on the healthy
    // client's queue, proving nothing was broadcast in between.
    hub.unregister(stalled).await.unwrap();
    hub.ingest(healthy, r#"{"x":3,"y":3}"#.to_string()).await.unwrap();
    assert_eq!(
        recv_envelope(&mut rx_healthy).await,
        Envelope::Move {
            session_id: healthy,
            x: 3,
            y: 3
        }
    );
}

#[tokio::test]
async fn test_unregister_of_unknown_session_broadcasts_nothing() {
    let hub = Hub::new().spawn();
    let (a, mut rx_a) = connect(&hub, 16).await;

    hub.unregister(Uuid::new_v4()).await.unwrap();

    // The next broadcast is the first frame A receives, so the bogus
    // unregister emitted nothing.
    hub.ingest(a, r#"{"x":7,"y":8}"#.to_string()).await.unwrap();
    assert_eq!(
        recv_envelope(&mut rx_a).await,
        Envelope::Move {
            session_id: a,
            x: 7,
            y: 8
        }
    );
}

#[tokio::test]
async fn test_malformed_payload_keeps_client_connected() {
    let hub = Hub::new().spawn();
    let (a, mut rx_a) = connect(&hub, 16).await;
    let (_b, mut rx_b) = connect(&hub, 16).await;

    // Missing `y`: dropped and logged, no broadcast, no crash.
    hub.ingest(a, r#"{"x":10}"#.to_string()).await.unwrap();

    // A is still live: its next well-formed update is the first frame on
    // both queues.
    hub.ingest(a, r#"{"x":10,"y":20}"#.to_string()).await.unwrap();

    let expected = Envelope::Move {
        session_id: a,
        x: 10,
        y: 20,
    };
    assert_eq!(recv_envelope(&mut rx_a).await, expected);
    assert_eq!(recv_envelope(&mut rx_b).await, expected);
}
