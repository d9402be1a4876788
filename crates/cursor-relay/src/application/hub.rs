//! The hub: a single-consumer control loop owning client membership and
//! cursor state, and performing broadcast fan-out.
//!
//! # Concurrency model
//!
//! Every mutation — register, unregister, cursor ingest — arrives as a
//! [`HubCommand`] on one mpsc channel and is applied by one task
//! ([`Hub::run`]). Serializing all three request kinds through a single
//! consumer is what keeps the membership/cursor invariant safe without any
//! locking: every key in the cursor map is also a key in the live set, and
//! removal always clears both maps inside the same command-handling step.
//!
//! # Backpressure policy
//!
//! Fan-out uses `try_send` onto each client's bounded send queue. A queue
//! that cannot absorb the frame marks its client dead: the client is dropped
//! from both maps immediately and its queue closed, without waiting for the
//! connection's own tasks to notice. The survivors are told with a `leave`
//! envelope. A stalled client therefore never blocks delivery to healthy
//! ones, and persistent stalling evicts it instead of growing memory.
//!
//! From the hub's point of view each client moves
//! `unregistered → registered → unregistered` and never back; a second
//! unregister for the same session is a no-op, which absorbs the duplicate
//! signals that arrive when both halves of a connection fail.

use std::collections::{HashMap, VecDeque};

use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use cursor_core::{decode_update, encode_leave, encode_move, CursorUpdate, SessionId};

/// Capacity of each client's outbound send queue, in frames.
pub const SEND_QUEUE_DEPTH: usize = 256;

/// Capacity of the hub's command channel.
const COMMAND_QUEUE_DEPTH: usize = 64;

/// The hub's command channel closed because the control loop is gone.
///
/// Only happens during shutdown; callers treat it as "stop this session".
#[derive(Debug, Error)]
#[error("hub control loop is no longer running")]
pub struct HubClosed;

// ── Client handle ─────────────────────────────────────────────────────────────

/// The hub's view of one connected client: its identity and the sending side
/// of its bounded outbound queue.
///
/// The receiving side is owned exclusively by the connection's writer task.
/// Dropping this handle closes the queue, which ends that writer's drain
/// loop — that is the only cancellation signal a writer ever gets.
#[derive(Debug)]
pub struct ClientHandle {
    session_id: SessionId,
    sender: mpsc::Sender<String>,
}

impl ClientHandle {
    pub fn new(session_id: SessionId, sender: mpsc::Sender<String>) -> Self {
        Self { session_id, sender }
    }

    pub fn session_id(&self) -> SessionId {
        self.session_id
    }

    /// Non-blocking enqueue; a full or closed queue is reported identically
    /// because the hub's response to both is eviction.
    fn try_enqueue(&self, frame: String) -> Result<(), ()> {
        self.sender.try_send(frame).map_err(|_| ())
    }
}

// ── Commands ──────────────────────────────────────────────────────────────────

/// A mutation request accepted by the hub's control loop.
#[derive(Debug)]
pub enum HubCommand {
    /// Add a client to the live set. Callers must not double-register.
    Register(ClientHandle),

    /// Remove a client, close its queue, and announce its departure.
    /// No-op if the client was already removed.
    Unregister(SessionId),

    /// A raw payload read from a client's socket; decoded and, if valid,
    /// broadcast as a `move` envelope.
    Ingest {
        session_id: SessionId,
        payload: String,
    },
}

// ── Handle ────────────────────────────────────────────────────────────────────

/// Cloneable front for sending commands into the hub's control loop.
///
/// This is the only way the rest of the process talks to the hub; nothing
/// outside the loop ever touches the membership or cursor maps directly.
#[derive(Debug, Clone)]
pub struct HubHandle {
    commands: mpsc::Sender<HubCommand>,
}

impl HubHandle {
    /// Registers a client with the hub.
    ///
    /// # Errors
    ///
    /// Returns [`HubClosed`] if the control loop has shut down.
    pub async fn register(&self, client: ClientHandle) -> Result<(), HubClosed> {
        self.commands
            .send(HubCommand::Register(client))
            .await
            .map_err(|_| HubClosed)
    }

    /// Requests removal of a client. Safe to call more than once per session.
    ///
    /// # Errors
    ///
    /// Returns [`HubClosed`] if the control loop has shut down.
    pub async fn unregister(&self, session_id: SessionId) -> Result<(), HubClosed> {
        self.commands
            .send(HubCommand::Unregister(session_id))
            .await
            .map_err(|_| HubClosed)
    }

    /// Forwards a raw inbound payload for decoding and broadcast.
    ///
    /// # Errors
    ///
    /// Returns [`HubClosed`] if the control loop has shut down.
    pub async fn ingest(&self, session_id: SessionId, payload: String) -> Result<(), HubClosed> {
        self.commands
            .send(HubCommand::Ingest {
                session_id,
                payload,
            })
            .await
            .map_err(|_| HubClosed)
    }
}

// ── Hub ───────────────────────────────────────────────────────────────────────

/// Authoritative state for all connected clients.
///
/// Invariant: `cursors.keys() ⊆ clients.keys()`. Absent until a client's
/// first valid update, a cursor entry is removed in the same step as its
/// membership entry.
#[derive(Debug, Default)]
pub struct Hub {
    clients: HashMap<SessionId, ClientHandle>,
    cursors: HashMap<SessionId, CursorUpdate>,
}

impl Hub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Spawns the control loop onto the runtime and returns its handle.
    pub fn spawn(self) -> HubHandle {
        let (tx, rx) = mpsc::channel(COMMAND_QUEUE_DEPTH);
        tokio::spawn(self.run(rx));
        HubHandle { commands: tx }
    }

    /// Consumes commands until every [`HubHandle`] has been dropped.
    pub async fn run(mut self, mut commands: mpsc::Receiver<HubCommand>) {
        info!("hub control loop started");
        while let Some(command) = commands.recv().await {
            match command {
                HubCommand::Register(client) => self.register(client),
                HubCommand::Unregister(session_id) => self.unregister(session_id),
                HubCommand::Ingest {
                    session_id,
                    payload,
                } => self.ingest(session_id, &payload),
            }
        }
        info!("hub control loop stopped");
    }

    // ── State mutations (only ever called from the control loop) ──────────────

    fn register(&mut self, client: ClientHandle) {
        let session_id = client.session_id();
        debug!(%session_id, "client registered");
        self.clients.insert(session_id, client);
    }

    fn unregister(&mut self, session_id: SessionId) {
        // Both the reader and the writer of a dying connection may signal
        // unregister; only the first one does any work.
        if self.clients.remove(&session_id).is_none() {
            debug!(%session_id, "unregister for unknown session ignored");
            return;
        }
        self.cursors.remove(&session_id);
        debug!(%session_id, "client unregistered");

        match encode_leave(session_id) {
            Ok(frame) => self.broadcast(frame),
            Err(e) => error!(%session_id, error = %e, "failed to encode leave envelope"),
        }
    }

    fn ingest(&mut self, session_id: SessionId, payload: &str) {
        if !self.clients.contains_key(&session_id) {
            // The session was evicted while this update was in flight.
            debug!(%session_id, "dropping update from unregistered session");
            return;
        }

        let cursor = match decode_update(payload.as_bytes()) {
            Ok(cursor) => cursor,
            Err(e) => {
                // Malformed input costs the client this one message, nothing
                // more; the connection stays up.
                warn!(%session_id, error = %e, "dropping malformed cursor payload");
                return;
            }
        };

        // Last write wins; ordering within one session is the arrival order
        // on that session's own reader path.
        self.cursors.insert(session_id, cursor);

        match encode_move(session_id, cursor) {
            Ok(frame) => self.broadcast(frame),
            Err(e) => error!(%session_id, error = %e, "failed to encode move envelope"),
        }
    }

    /// Fans a frame out to every live client, including the one it came from.
    ///
    /// Clients whose queue cannot absorb the frame are evicted on the spot
    /// and their departure is itself broadcast, which may evict further
    /// stragglers — hence the worklist instead of recursion.
    fn broadcast(&mut self, frame: String) {
        let mut pending = VecDeque::from([frame]);

        while let Some(frame) = pending.pop_front() {
            let mut stalled: Vec<SessionId> = Vec::new();
            for (session_id, client) in &self.clients {
                if client.try_enqueue(frame.clone()).is_err() {
                    stalled.push(*session_id);
                }
            }

            for session_id in stalled {
                self.clients.remove(&session_id);
                self.cursors.remove(&session_id);
                warn!(%session_id, "send queue full; evicting stalled client");

                match encode_leave(session_id) {
                    Ok(leave) => pending.push_back(leave),
                    Err(e) => {
                        error!(%session_id, error = %e, "failed to encode leave envelope")
                    }
                }
            }
        }
    }

    // ── Read accessors ─────────────────────────────────────────────────────────
    //
    // The loop owns the maps exclusively, so snapshot-style reads from other
    // tasks would arrive as one more command variant replying over a oneshot.
    // Today the only readers are tests.

    pub fn contains(&self, session_id: SessionId) -> bool {
        self.clients.contains_key(&session_id)
    }

    pub fn cursor(&self, session_id: SessionId) -> Option<CursorUpdate> {
        self.cursors.get(&session_id).copied()
    }

    pub fn client_count(&self) -> usize {
        self.clients.len()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
