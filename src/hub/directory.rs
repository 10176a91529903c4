//! Room directory: room key to the set of subscribed clients.
//!
//! Owned exclusively by the hub control loop, so nothing here needs a lock.
//! A room entry exists only while it has at least one subscriber, and a
//! client belongs to at most one room at a time.

use std::collections::HashMap;

use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use super::client_handle::{ClientHandle, DropReason};
use crate::domain::{ClientId, RoomId};

/// Outcome of inserting a client into a room.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Registration {
    /// The client was not subscribed anywhere before.
    Added,
    /// The client was already in this room; the existing entry is kept.
    AlreadyPresent,
    /// The client was moved out of another room first.
    Moved {
        /// Room the client was removed from.
        from: RoomId,
    },
}

/// Result of one fan-out pass over a room.
#[derive(Debug, Default)]
pub(crate) struct FanOut {
    /// Clients that accepted the payload.
    pub(crate) delivered: usize,
    /// Clients removed from the room because delivery failed.
    pub(crate) dropped: Vec<(ClientId, DropReason)>,
}

/// Subscriber count of one room.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct RoomStats {
    /// Room key.
    pub room: String,
    /// Number of subscribed clients.
    pub subscribers: usize,
}

/// Snapshot of the whole directory.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DirectoryStats {
    /// Every live room, sorted by key.
    pub rooms: Vec<RoomStats>,
    /// Number of live rooms.
    pub total_rooms: usize,
    /// Number of subscribed clients across all rooms.
    pub total_subscribers: usize,
    /// When the snapshot was taken.
    pub captured_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
pub(crate) struct RoomDirectory {
    rooms: HashMap<RoomId, HashMap<ClientId, ClientHandle>>,
    memberships: HashMap<ClientId, RoomId>,
}

impl RoomDirectory {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Adds `client` to `room`, creating the room if absent.
    pub(crate) fn insert(&mut self, room: RoomId, client: ClientHandle) -> Registration {
        let id = client.id();
        let moved_from = match self.memberships.get(&id).cloned() {
            Some(current) if current == room => return Registration::AlreadyPresent,
            Some(current) => {
                drop(self.remove(&current, id));
                Some(current)
            }
            None => None,
        };

        self.rooms.entry(room.clone()).or_default().insert(id, client);
        self.memberships.insert(id, room);

        match moved_from {
            Some(from) => Registration::Moved { from },
            None => Registration::Added,
        }
    }

    /// Removes `id` from `room`, deleting the room once it is empty.
    ///
    /// Returns the removed handle; dropping it closes the client's queue.
    pub(crate) fn remove(&mut self, room: &RoomId, id: ClientId) -> Option<ClientHandle> {
        let members = self.rooms.get_mut(room)?;
        let handle = members.remove(&id)?;
        if members.is_empty() {
            self.rooms.remove(room);
        }
        self.memberships.remove(&id);
        Some(handle)
    }

    /// Offers `payload` to every member of `room` without blocking.
    ///
    /// Members whose queue rejects the payload are removed and their
    /// handles dropped before this returns.
    pub(crate) fn fan_out(&mut self, room: &RoomId, payload: &Bytes) -> FanOut {
        let mut outcome = FanOut::default();
        let Some(members) = self.rooms.get_mut(room) else {
            return outcome;
        };

        members.retain(|id, client| match client.offer(payload.clone()) {
            Ok(()) => {
                outcome.delivered += 1;
                true
            }
            Err(reason) => {
                outcome.dropped.push((*id, reason));
                false
            }
        });

        if members.is_empty() {
            self.rooms.remove(room);
        }
        for (id, _) in &outcome.dropped {
            self.memberships.remove(id);
        }
        outcome
    }

    pub(crate) fn subscriber_count(&self, room: &RoomId) -> usize {
        self.rooms.get(room).map_or(0, HashMap::len)
    }

    pub(crate) fn room_count(&self) -> usize {
        self.rooms.len()
    }

    pub(crate) fn contains_room(&self, room: &RoomId) -> bool {
        self.rooms.contains_key(room)
    }

    pub(crate) fn stats(&self) -> DirectoryStats {
        let mut rooms: Vec<RoomStats> = self
            .rooms
            .iter()
            .map(|(room, members)| RoomStats {
                room: room.to_string(),
                subscribers: members.len(),
            })
            .collect();
        rooms.sort_by(|a, b| a.room.cmp(&b.room));

        DirectoryStats {
            total_rooms: rooms.len(),
            total_subscribers: self.memberships.len(),
            rooms,
            captured_at: Utc::now(),
        }
    }
}
