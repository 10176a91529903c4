//! Cloneable entry point into the hub.
//!
//! [`HubHandle`] is built once at startup and passed to every component
//! that subscribes or publishes. It only sends requests into the hub's
//! intake; it never touches the directory itself.

use bytes::Bytes;
use serde::Serialize;
use tokio::sync::{mpsc, oneshot};

use super::client_handle::ClientHandle;
use super::control::{Departure, Query, Subscription};
use super::directory::DirectoryStats;
use crate::domain::{ClientId, RoomEvent, RoomId};
use crate::error::BrokerError;

/// Sending side of the hub's intake channels.
#[derive(Debug, Clone)]
pub struct HubHandle {
    register_tx: mpsc::Sender<Subscription>,
    unregister_tx: mpsc::Sender<Departure>,
    broadcast_tx: mpsc::Sender<RoomEvent>,
    query_tx: mpsc::Sender<Query>,
}

impl HubHandle {
    pub(crate) fn new(
        register_tx: mpsc::Sender<Subscription>,
        unregister_tx: mpsc::Sender<Departure>,
        broadcast_tx: mpsc::Sender<RoomEvent>,
        query_tx: mpsc::Sender<Query>,
    ) -> Self {
        Self {
            register_tx,
            unregister_tx,
            broadcast_tx,
            query_tx,
        }
    }

    /// Adds `client` to `room` and waits until the hub has processed it.
    ///
    /// Every broadcast submitted after this returns reaches the client.
    ///
    /// # Errors
    ///
    /// Returns [`BrokerError::HubUnavailable`] if the control loop is gone.
    pub async fn register(&self, room: RoomId, client: ClientHandle) -> Result<(), BrokerError> {
        let (done, processed) = oneshot::channel();
        self.register_tx
            .send(Subscription { room, client, done })
            .await
            .map_err(|_| BrokerError::HubUnavailable)?;
        processed.await.map_err(|_| BrokerError::HubUnavailable)
    }

    /// Removes `client` from `room`, closing its queue, and waits until the
    /// hub has processed it.
    ///
    /// Idempotent: unregistering an absent client is a no-op.
    pub async fn unregister(&self, room: RoomId, client: ClientId) {
        let (done, processed) = oneshot::channel();
        if self
            .unregister_tx
            .send(Departure { room, client, done })
            .await
            .is_err()
            || processed.await.is_err()
        {
            tracing::warn!(client_id = %client, "unregister after hub shutdown");
        }
    }

    /// Submits `event` for fan-out. Fire-and-forget.
    pub async fn broadcast(&self, event: RoomEvent) {
        if let Err(err) = self.broadcast_tx.send(event).await {
            tracing::warn!(room = %err.0.room(), "broadcast after hub shutdown");
        }
    }

    /// Publishes `payload` verbatim to `room`.
    ///
    /// Always succeeds from the caller's point of view, including when the
    /// room has no subscribers.
    pub async fn publish(&self, room: RoomId, payload: impl Into<Bytes>) {
        self.broadcast(RoomEvent::new(room, payload)).await;
    }

    /// Serializes `record` as JSON and publishes it to `room`.
    ///
    /// A serialization failure is logged and the event is skipped.
    pub async fn publish_json<T: Serialize + ?Sized>(&self, room: RoomId, record: &T) {
        match RoomEvent::json(room, record) {
            Ok(event) => self.broadcast(event).await,
            Err(err) => tracing::error!(error = %err, "failed to serialize record for broadcast"),
        }
    }

    /// Returns a snapshot of the room directory.
    ///
    /// # Errors
    ///
    /// Returns [`BrokerError::HubUnavailable`] if the control loop is gone.
    pub async fn stats(&self) -> Result<DirectoryStats, BrokerError> {
        let (reply, answer) = oneshot::channel();
        self.query_tx
            .send(Query::Stats(reply))
            .await
            .map_err(|_| BrokerError::HubUnavailable)?;
        answer.await.map_err(|_| BrokerError::HubUnavailable)
    }

    /// Returns the number of subscribers in `room` (zero if it does not
    /// exist).
    ///
    /// # Errors
    ///
    /// Returns [`BrokerError::HubUnavailable`] if the control loop is gone.
    pub async fn room_subscribers(&self, room: &RoomId) -> Result<usize, BrokerError> {
        let (reply, answer) = oneshot::channel();
        self.query_tx
            .send(Query::RoomSubscribers(room.clone(), reply))
            .await
            .map_err(|_| BrokerError::HubUnavailable)?;
        answer.await.map_err(|_| BrokerError::HubUnavailable)
    }
}
