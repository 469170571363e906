//! In-process event bus: one Tokio broadcast lane per [`Topic`].
//!
//! Every subscriber of a lane sees every event published on it.  A slow
//! subscriber does not hold up the others; once it falls more than the lane
//! capacity behind, its next `recv` reports how many events it missed.

use tftune_types::{Event, TfError};
use tokio::sync::broadcast::{self, error::RecvError, error::TryRecvError};

/// Per-lane buffer used by [`EventBus::default`].
pub const DEFAULT_CAPACITY: usize = 256;

/// Routing key for events on the [`EventBus`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Topic {
    /// Stamped pose samples, one per tick.
    Transforms,
    /// Partial parameter edits waiting to be resolved.
    ParameterEdits,
    /// Resolved configuration echoed back to clients.
    ParameterUpdates,
    /// Operator-facing fault reports.
    SystemAlerts,
}

const LANES: usize = 4;

impl Topic {
    fn lane(self) -> usize {
        match self {
            Topic::Transforms => 0,
            Topic::ParameterEdits => 1,
            Topic::ParameterUpdates => 2,
            Topic::SystemAlerts => 3,
        }
    }
}

/// Cloneable handle; clones publish to and subscribe from the same lanes.
#[derive(Clone, Debug)]
pub struct EventBus {
    lanes: [broadcast::Sender<Event>; LANES],
}

impl EventBus {
    /// Each lane buffers up to `capacity` events.
    pub fn new(capacity: usize) -> Self {
        Self {
            lanes: std::array::from_fn(|_| broadcast::channel(capacity).0),
        }
    }

    /// Hand `event` to every current subscriber of `topic`.
    ///
    /// Returns how many subscribers received it.  Publishing to a lane
    /// nobody listens on is not an error and yields `Ok(0)`.
    pub fn publish_to(&self, topic: Topic, event: Event) -> Result<usize, TfError> {
        let lane = &self.lanes[topic.lane()];
        if lane.receiver_count() == 0 {
            return Ok(0);
        }
        lane.send(event)
            .map_err(|e| TfError::Channel(format!("{topic:?} lane closed: {e}")))
    }

    /// Start receiving events published on `topic` from now on.
    pub fn subscribe_to(&self, topic: Topic) -> TopicReceiver {
        TopicReceiver {
            inner: self.lanes[topic.lane()].subscribe(),
        }
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

/// Receiving end of one lane, from [`EventBus::subscribe_to`].
pub struct TopicReceiver {
    inner: broadcast::Receiver<Event>,
}

impl TopicReceiver {
    /// Next event on the lane.
    ///
    /// [`RecvError::Lagged`] means events were dropped for this receiver; it
    /// can keep receiving.  [`RecvError::Closed`] means every bus handle is
    /// gone.
    pub async fn recv(&mut self) -> Result<Event, RecvError> {
        self.inner.recv().await
    }

    pub fn try_recv(&mut self) -> Result<Event, TryRecvError> {
        self.inner.try_recv()
    }
}
