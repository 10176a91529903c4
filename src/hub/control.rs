//! The hub control loop.
//!
//! [`Hub`] owns the [`RoomDirectory`] and is the only code that mutates
//! it. Requests arrive on four bounded intake channels (register,
//! unregister, broadcast, query) and are handled one at a time, so
//! directory mutations never interleave.

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

use super::client_handle::{ClientHandle, DropReason};
use super::directory::{DirectoryStats, Registration, RoomDirectory};
use super::handle::HubHandle;
use crate::domain::{ClientId, RoomEvent, RoomId};

/// Request to add a client to a room.
#[derive(Debug)]
pub(crate) struct Subscription {
    pub(crate) room: RoomId,
    pub(crate) client: ClientHandle,
    pub(crate) done: oneshot::Sender<()>,
}

/// Request to remove a client from a room.
#[derive(Debug)]
pub(crate) struct Departure {
    pub(crate) room: RoomId,
    pub(crate) client: ClientId,
    pub(crate) done: oneshot::Sender<()>,
}

/// Read-only requests answered from inside the loop.
#[derive(Debug)]
pub(crate) enum Query {
    Stats(oneshot::Sender<DirectoryStats>),
    RoomSubscribers(RoomId, oneshot::Sender<usize>),
}

/// Serialized owner of the room directory.
///
/// Created together with its [`HubHandle`] by [`Hub::new`]; run it with
/// [`Hub::run`] (or use [`Hub::spawn`]). The loop ends only after every
/// handle has been dropped.
#[derive(Debug)]
pub struct Hub {
    directory: RoomDirectory,
    register_rx: mpsc::Receiver<Subscription>,
    unregister_rx: mpsc::Receiver<Departure>,
    broadcast_rx: mpsc::Receiver<RoomEvent>,
    query_rx: mpsc::Receiver<Query>,
}

impl Hub {
    /// Creates a hub whose intake channels each hold up to
    /// `intake_capacity` pending requests.
    #[must_use]
    pub fn new(intake_capacity: usize) -> (Self, HubHandle) {
        let capacity = intake_capacity.max(1);
        let (register_tx, register_rx) = mpsc::channel(capacity);
        let (unregister_tx, unregister_rx) = mpsc::channel(capacity);
        let (broadcast_tx, broadcast_rx) = mpsc::channel(capacity);
        let (query_tx, query_rx) = mpsc::channel(capacity);

        let hub = Self {
            directory: RoomDirectory::new(),
            register_rx,
            unregister_rx,
            broadcast_rx,
            query_rx,
        };
        let handle = HubHandle::new(register_tx, unregister_tx, broadcast_tx, query_tx);
        (hub, handle)
    }

    /// Creates a hub and runs it on the current tokio runtime.
    #[must_use]
    pub fn spawn(intake_capacity: usize) -> (HubHandle, JoinHandle<()>) {
        let (hub, handle) = Self::new(intake_capacity);
        let task = tokio::spawn(hub.run());
        (handle, task)
    }

    /// Runs the control loop until every [`HubHandle`] is dropped.
    ///
    /// `select!` polls its branches in random order, so no intake channel
    /// can starve the others.
    pub async fn run(mut self) {
        tracing::info!("hub running");
        loop {
            tokio::select! {
                Some(subscription) = self.register_rx.recv() => self.register(subscription),
                Some(departure) = self.unregister_rx.recv() => self.unregister(departure),
                Some(event) = self.broadcast_rx.recv() => self.broadcast(event),
                Some(query) = self.query_rx.recv() => self.answer(query),
                else => break,
            }
        }
        tracing::info!(rooms = self.directory.room_count(), "hub stopped");
    }

    fn register(&mut self, Subscription { room, client, done }: Subscription) {
        let client_id = client.id();
        match self.directory.insert(room.clone(), client) {
            Registration::Added => {}
            Registration::AlreadyPresent => {
                tracing::debug!(%room, %client_id, "client already subscribed");
            }
            Registration::Moved { from } => {
                tracing::debug!(%room, %from, %client_id, "client moved between rooms");
            }
        }
        tracing::debug!(
            %room,
            %client_id,
            subscribers = self.directory.subscriber_count(&room),
            "client registered"
        );
        let _ = done.send(());
    }

    fn unregister(&mut self, Departure { room, client, done }: Departure) {
        if let Some(handle) = self.directory.remove(&room, client) {
            // Dropping the handle closes the client's queue.
            drop(handle);
            tracing::debug!(
                %room,
                client_id = %client,
                subscribers = self.directory.subscriber_count(&room),
                room_closed = !self.directory.contains_room(&room),
                "client unregistered"
            );
        }
        let _ = done.send(());
    }

    fn broadcast(&mut self, event: RoomEvent) {
        let (room, payload) = event.into_parts();
        let outcome = self.directory.fan_out(&room, &payload);
        for (client_id, reason) in &outcome.dropped {
            match reason {
                DropReason::SlowConsumer => {
                    tracing::warn!(%room, %client_id, "dropping slow subscriber");
                }
                DropReason::Disconnected => {
                    tracing::debug!(%room, %client_id, "dropping departed subscriber");
                }
            }
        }
        tracing::trace!(
            %room,
            bytes = payload.len(),
            delivered = outcome.delivered,
            dropped = outcome.dropped.len(),
            "broadcast processed"
        );
    }

    fn answer(&self, query: Query) {
        match query {
            Query::Stats(reply) => {
                let _ = reply.send(self.directory.stats());
            }
            Query::RoomSubscribers(room, reply) => {
                let _ = reply.send(self.directory.subscriber_count(&room));
            }
        }
    }
}
