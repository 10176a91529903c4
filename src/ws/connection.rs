//! Per-connection subscriber: the outbound drain pump and the inbound
//! liveness watcher.
//!
//! A [`Client`] is bound to one room for its whole life. It registers with
//! the hub, then runs two pumps side by side:
//!
//! - the outbound pump moves payloads from the client's queue to the socket
//!   and sends keepalive pings; it ends with a Close frame once the hub
//!   closes the queue, or unregisters on a failed write;
//! - the inbound watcher reads the socket until the peer goes away or
//!   stays silent past the pong wait, then unregisters.
//!
//! Neither pump touches the room directory; both go through [`HubHandle`].

use std::fmt;
use std::time::Duration;

use axum::extract::ws::{Message, WebSocket};
use bytes::Bytes;
use futures_util::{Sink, SinkExt, Stream, StreamExt};
use tokio::sync::mpsc;
use tokio::time::{Instant, MissedTickBehavior};

use super::messages::{close_frame, payload_frame, ping_frame};
use crate::config::ClientSettings;
use crate::domain::{ClientId, RoomId};
use crate::hub::{ClientHandle, HubHandle};

/// A failed attempt to put a frame on the wire.
#[derive(Debug, thiserror::Error)]
enum WriteError {
    #[error("write timed out after {0:?}")]
    Timeout(Duration),
    #[error("write failed: {0}")]
    Sink(String),
}

/// Subscribes an upgraded socket to `room` and serves it until it closes.
///
/// This is the entry point for the connection adapter: it builds a
/// [`Client`], registers it, and runs both pumps.
pub async fn subscribe(socket: WebSocket, room: RoomId, hub: HubHandle, settings: ClientSettings) {
    let (sink, stream) = socket.split();
    Client::new(room, hub, settings).run(sink, stream).await;
}

/// One live subscription of one connection to one room.
#[derive(Debug)]
pub struct Client {
    id: ClientId,
    room: RoomId,
    hub: HubHandle,
    settings: ClientSettings,
}

impl Client {
    /// Creates a client with a fresh identity.
    #[must_use]
    pub fn new(room: RoomId, hub: HubHandle, settings: ClientSettings) -> Self {
        Self {
            id: ClientId::new(),
            room,
            hub,
            settings,
        }
    }

    /// Identity used for room membership.
    #[must_use]
    pub fn id(&self) -> ClientId {
        self.id
    }

    /// Registers with the hub and pumps until the subscription ends.
    ///
    /// Returns without touching the socket if the hub refuses the
    /// registration.
    pub async fn run<W, R, E>(self, sink: W, stream: R)
    where
        W: Sink<Message> + Unpin,
        W::Error: fmt::Display,
        R: Stream<Item = Result<Message, E>> + Unpin,
        E: fmt::Display,
    {
        let (handle, queue) = ClientHandle::channel(self.id, self.settings.queue_capacity);
        if let Err(err) = self.hub.register(self.room.clone(), handle).await {
            tracing::error!(room = %self.room, client_id = %self.id, error = %err, "subscribe failed");
            return;
        }
        tracing::info!(room = %self.room, client_id = %self.id, "subscriber connected");

        let outbound = self.drain_outbound(sink, queue);
        let inbound = self.watch_inbound(stream);
        tokio::pin!(outbound, inbound);

        let peer_left_first = tokio::select! {
            () = &mut outbound => false,
            () = &mut inbound => true,
        };
        if peer_left_first {
            // The hub has already closed the queue; let the pump flush and
            // send its Close frame.
            if tokio::time::timeout(self.settings.write_wait, outbound)
                .await
                .is_err()
            {
                tracing::debug!(room = %self.room, client_id = %self.id, "close flush timed out");
            }
        }

        tracing::info!(room = %self.room, client_id = %self.id, "subscriber disconnected");
    }

    /// Outbound pump. Runs until the queue is closed or a write fails.
    async fn drain_outbound<W>(&self, mut sink: W, mut queue: mpsc::Receiver<Bytes>)
    where
        W: Sink<Message> + Unpin,
        W::Error: fmt::Display,
    {
        let period = self.settings.ping_interval;
        let mut ping = tokio::time::interval_at(Instant::now() + period, period);
        ping.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            let frame = tokio::select! {
                payload = queue.recv() => match payload {
                    Some(payload) => payload_frame(payload),
                    None => {
                        if let Err(err) = self.write(&mut sink, close_frame()).await {
                            tracing::debug!(room = %self.room, client_id = %self.id, error = %err, "close frame not sent");
                        }
                        return;
                    }
                },
                _ = ping.tick() => ping_frame(),
            };

            if let Err(err) = self.write(&mut sink, frame).await {
                tracing::warn!(room = %self.room, client_id = %self.id, error = %err, "dropping subscriber after write failure");
                self.hub.unregister(self.room.clone(), self.id).await;
                return;
            }
        }
    }

    /// Inbound watcher. Any frame counts as a sign of life; data frames
    /// are discarded.
    async fn watch_inbound<R, E>(&self, mut stream: R)
    where
        R: Stream<Item = Result<Message, E>> + Unpin,
        E: fmt::Display,
    {
        loop {
            match tokio::time::timeout(self.settings.pong_wait, stream.next()).await {
                Ok(Some(Ok(Message::Close(_)))) | Ok(None) => {
                    tracing::debug!(room = %self.room, client_id = %self.id, "peer closed connection");
                    break;
                }
                Ok(Some(Ok(_))) => {}
                Ok(Some(Err(err))) => {
                    tracing::debug!(room = %self.room, client_id = %self.id, error = %err, "read failed");
                    break;
                }
                Err(_) => {
                    tracing::warn!(
                        room = %self.room,
                        client_id = %self.id,
                        pong_wait = ?self.settings.pong_wait,
                        "keepalive missed"
                    );
                    break;
                }
            }
        }
        self.hub.unregister(self.room.clone(), self.id).await;
    }

    async fn write<W>(&self, sink: &mut W, frame: Message) -> Result<(), WriteError>
    where
        W: Sink<Message> + Unpin,
        W::Error: fmt::Display,
    {
        match tokio::time::timeout(self.settings.write_wait, sink.send(frame)).await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(err)) => Err(WriteError::Sink(err.to_string())),
            Err(_) => Err(WriteError::Timeout(self.settings.write_wait)),
        }
    }
}
