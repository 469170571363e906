//! [`TfNode`] – owner of the live configuration and integrator state.
//!
//! Two paths touch the same state:
//!
//! * the **edit path** ([`TfNode::apply_edit`]): binder → resolver → new
//!   canonical configuration, echoed on [`Topic::ParameterUpdates`];
//! * the **tick path** ([`TfNode::tick`]): integrator → stamped pose →
//!   [`TransformPublisher`].
//!
//! Both take the same mutex for their whole critical section, so a tick
//! always sees either the configuration before an edit or the fully resolved
//! one after it.  The lock is never held across an `.await`.
//!
//! The constructor resolves the declared defaults before returning, so a
//! tick can never run against a missing configuration.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde_json::{Map, Value};
use tftune_geometry::Vec3;
use tftune_middleware::{EventBus, Topic, TopicReceiver, TransformPublisher};
use tftune_types::{Configuration, Event, EventPayload, StampedTransform, TfError};
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, info, instrument, warn};

use crate::binder::ParameterBinder;
use crate::integrator::integrate;
use crate::resolver::{resolve, IntegratorState};
use crate::scheduler::TickInstant;

const SOURCE: &str = "tftune-runtime::node";

struct NodeState {
    config: Configuration,
    integrator: IntegratorState,
}

/// The single live transform.
pub struct TfNode {
    state: Mutex<NodeState>,
    binder: ParameterBinder,
    publisher: Arc<dyn TransformPublisher>,
    bus: Arc<EventBus>,
}

impl TfNode {
    /// Build the node and resolve the binder's declared defaults.
    pub fn new(binder: ParameterBinder, publisher: Arc<dyn TransformPublisher>, bus: Arc<EventBus>) -> Self {
        let mut integrator = IntegratorState::default();
        let config = resolve(binder.defaults(), &mut integrator);
        info!(
            frame_id = %config.frame_id,
            child_frame_id = %config.child_frame_id,
            enable_velocity = config.enable_velocity,
            "transform node initialised"
        );

        Self {
            state: Mutex::new(NodeState { config, integrator }),
            binder,
            publisher,
            bus,
        }
    }

    fn lock(&self) -> MutexGuard<'_, NodeState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Snapshot of the current canonical configuration.
    pub fn config(&self) -> Configuration {
        self.lock().config.clone()
    }

    /// The running position as of the last tick or edit.
    pub fn position(&self) -> Option<Vec3> {
        self.lock().integrator.position()
    }

    /// The snapshot a `reset` would restore.
    pub fn stored(&self) -> Option<Configuration> {
        self.lock().integrator.stored().cloned()
    }

    /// Validate, resolve and apply one partial edit.
    ///
    /// Returns the new canonical configuration, which is also published on
    /// [`Topic::ParameterUpdates`] so clients overwrite any trigger flag they
    /// still hold as `true`.
    ///
    /// # Errors
    ///
    /// Returns the binder's validation error; the live configuration is left
    /// untouched in that case.
    #[instrument(skip_all, fields(edited = values.len()))]
    pub fn apply_edit(&self, values: &Map<String, Value>) -> Result<Configuration, TfError> {
        let resolved = {
            let mut state = self.lock();
            let raw = self.binder.apply(&state.config, values)?;
            let resolved = resolve(raw, &mut state.integrator);
            state.config = resolved.clone();
            resolved
        };
        debug!(?resolved, "edit applied");

        let event = Event::new(SOURCE, EventPayload::ParameterUpdate(resolved.clone()));
        if let Err(e) = self.bus.publish_to(Topic::ParameterUpdates, event) {
            warn!(error = %e, "failed to echo resolved configuration");
        }
        Ok(resolved)
    }

    /// Run one tick: integrate under the lock, then publish.
    ///
    /// # Errors
    ///
    /// Propagates the publisher's error.  The integrator state has already
    /// advanced; only the transmission for this tick is lost.
    pub async fn tick(&self, instant: TickInstant) -> Result<StampedTransform, TfError> {
        let sample = {
            let mut guard = self.lock();
            let NodeState { config, integrator } = &mut *guard;
            integrate(config, integrator, instant.dt_secs(), instant.stamp)
        };
        self.publisher.publish(sample.clone()).await?;
        Ok(sample)
    }

    /// Consume [`Topic::ParameterEdits`] until the bus closes.
    ///
    /// Rejected edits are reported on [`Topic::SystemAlerts`].
    pub async fn run_edit_listener(self: Arc<Self>, mut edits: TopicReceiver) {
        loop {
            match edits.recv().await {
                Ok(Event {
                    payload: EventPayload::ParameterEdit(values),
                    source,
                    ..
                }) => {
                    if let Err(e) = self.apply_edit(&values) {
                        warn!(source = %source, error = %e, "parameter edit rejected");
                        let fault = Event::new(
                            SOURCE,
                            EventPayload::Fault {
                                component: "parameters".to_string(),
                                message: e.to_string(),
                            },
                        );
                        if let Err(e) = self.bus.publish_to(Topic::SystemAlerts, fault) {
                            warn!(error = %e, "failed to report rejected edit");
                        }
                    }
                }
                Ok(_) => continue,
                Err(RecvError::Lagged(n)) => {
                    warn!(lagged_by = n, "edit listener lagged; edits dropped");
                }
                Err(RecvError::Closed) => break,
            }
        }
        debug!("edit listener stopped");
    }
}
