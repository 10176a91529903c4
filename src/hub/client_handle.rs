//! Hub-side end of a subscriber's outbound queue.

use bytes::Bytes;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;

use crate::domain::ClientId;

/// Why a subscriber was dropped during fan-out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropReason {
    /// The outbound queue was full.
    SlowConsumer,
    /// The delivery pump has already gone away.
    Disconnected,
}

/// Producer half of one subscriber's bounded outbound queue.
///
/// Deliberately not `Clone`: the handle is the only sender of its queue, so
/// the queue closes exactly when the room directory drops the handle.
#[derive(Debug)]
pub struct ClientHandle {
    id: ClientId,
    queue: mpsc::Sender<Bytes>,
}

impl ClientHandle {
    /// Creates a handle and the receiving end of its queue.
    ///
    /// A `capacity` of zero is raised to one.
    #[must_use]
    pub fn channel(id: ClientId, capacity: usize) -> (Self, mpsc::Receiver<Bytes>) {
        let (queue, rx) = mpsc::channel(capacity.max(1));
        (Self { id, queue }, rx)
    }

    /// Identity of the subscriber.
    #[must_use]
    pub fn id(&self) -> ClientId {
        self.id
    }

    /// Enqueues `payload` without waiting.
    pub(crate) fn offer(&self, payload: Bytes) -> Result<(), DropReason> {
        self.queue.try_send(payload).map_err(|err| match err {
            TrySendError::Full(_) => DropReason::SlowConsumer,
            TrySendError::Closed(_) => DropReason::Disconnected,
        })
    }
}
