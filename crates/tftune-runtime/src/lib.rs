//! `tftune-runtime` – the transform-update state machine.
//!
//! # Modules
//!
//! - [`binder`] – [`ParameterBinder`][binder::ParameterBinder]: declared,
//!   bounded tunables; validates and clamps partial edits and merges them
//!   into a full raw configuration.
//! - [`resolver`] – [`resolve`][resolver::resolve]: applies the `zero`,
//!   `reset` and `store` triggers and yields the normalized configuration.
//! - [`integrator`] – [`integrate`][integrator::integrate] and
//!   [`clip`][integrator::clip]: velocity integration and single-step bound
//!   wrapping, one pose per tick.
//! - [`node`] – [`TfNode`][node::TfNode]: owns the live configuration and
//!   integrator state behind one lock and wires edits and ticks to the bus.
//! - [`scheduler`] – [`TickScheduler`][scheduler::TickScheduler]: fixed-period
//!   tick loop that drops late ticks instead of queueing them.
//! - [`telemetry`] – [`init_tracing`][telemetry::init_tracing]: console or
//!   JSON logs plus optional OTLP span export.

pub mod binder;
pub mod integrator;
pub mod node;
pub mod resolver;
pub mod scheduler;
pub mod telemetry;

pub use binder::{ParameterBinder, ParameterDescriptor, ParameterKind};
pub use integrator::{clip, integrate};
pub use node::TfNode;
pub use resolver::{resolve, IntegratorState};
pub use scheduler::{TickInstant, TickScheduler, DEFAULT_PERIOD};
pub use telemetry::{init_tracing, LogFormat, TracerProviderGuard};
