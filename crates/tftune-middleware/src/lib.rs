//! `tftune-middleware` – transport for the tuned transform.
//!
//! Moves pose samples and parameter edits between the runtime and the outside
//! world without caring what they mean.
//!
//! # Modules
//!
//! - [`bus`] – typed, topic-based publish/subscribe event bus built on Tokio
//!   broadcast channels.
//! - [`publisher`] – [`TransformPublisher`][publisher::TransformPublisher]:
//!   the seam through which each tick hands off its pose sample.
//! - [`bridge`] – WebSocket endpoint that streams poses and parameter updates
//!   to interactive clients and feeds their edits back onto the bus.

pub mod bridge;
pub mod bus;
pub mod publisher;

pub use bridge::TfBridge;
pub use bus::{EventBus, Topic, TopicReceiver};
pub use publisher::{BusPublisher, TransformPublisher};
