//! The transform publishing seam.
//!
//! The runtime never talks to a transport directly: each tick hands its
//! [`StampedTransform`] to a [`TransformPublisher`].  [`BusPublisher`] routes
//! samples onto the [`Topic::Transforms`] lane of the [`EventBus`], where the
//! [`TfBridge`][crate::bridge::TfBridge] (or any other subscriber) picks them
//! up.

use std::sync::Arc;

use async_trait::async_trait;
use tftune_types::{Event, EventPayload, StampedTransform, TfError};
use tracing::trace;

use crate::bus::{EventBus, Topic};

/// Accepts one pose sample per tick and transmits it on a shared transform
/// channel.
///
/// # Contract
///
/// * `publish` must not block on the network for longer than a tick period.
/// * Returns the number of consumers that were handed the sample; `Ok(0)` is
///   a normal condition when nobody is listening.
#[async_trait]
pub trait TransformPublisher: Send + Sync {
    async fn publish(&self, sample: StampedTransform) -> Result<usize, TfError>;
}

/// [`TransformPublisher`] backed by the in-process [`EventBus`].
#[derive(Clone, Debug)]
pub struct BusPublisher {
    bus: Arc<EventBus>,
    source: String,
}

impl BusPublisher {
    /// Publish onto `bus`, tagging every event with `source`.
    pub fn new(bus: Arc<EventBus>, source: impl Into<String>) -> Self {
        Self {
            bus,
            source: source.into(),
        }
    }
}

#[async_trait]
impl TransformPublisher for BusPublisher {
    async fn publish(&self, sample: StampedTransform) -> Result<usize, TfError> {
        let event = Event::new(self.source.clone(), EventPayload::Transform(sample));
        let delivered = self.bus.publish_to(Topic::Transforms, event)?;
        trace!(delivered, "transform published");
        Ok(delivered)
    }
}
