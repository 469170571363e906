//! `tftune` – publishes one interactively tunable transform.
//!
//! 1. Loads startup settings (`~/.tftune/config.toml` + `TFTUNE_*` overrides).
//! 2. Builds the event bus, the transform node and its parameter binder.
//! 3. Starts the edit listener, the WebSocket bridge and the tick loop.
//! 4. Runs until Ctrl-C; nothing is persisted on exit.

mod config;

use std::net::SocketAddr;
use std::process::ExitCode;
use std::sync::Arc;

use tftune_middleware::{BusPublisher, EventBus, TfBridge, Topic};
use tftune_runtime::{ParameterBinder, ParameterKind, TfNode, TickScheduler};
use tftune_types::TfError;
use tracing::{debug, error, info};

fn main() -> ExitCode {
    let _guard = tftune_runtime::init_tracing("tftune");

    let settings = match config::load() {
        Ok(s) => s,
        Err(e) => {
            error!(path = %config::config_path().display(), error = %e, "invalid settings");
            return ExitCode::FAILURE;
        }
    };
    info!(?settings, "settings loaded");

    let runtime = match tokio::runtime::Builder::new_multi_thread().enable_all().build() {
        Ok(rt) => rt,
        Err(e) => {
            error!(error = %e, "failed to start tokio runtime");
            return ExitCode::FAILURE;
        }
    };

    match runtime.block_on(run(settings)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "tftune stopped");
            ExitCode::FAILURE
        }
    }
}

async fn run(settings: config::Settings) -> Result<(), TfError> {
    let bus = Arc::new(EventBus::new(settings.bus_capacity));

    let binder = ParameterBinder::new(settings.limits())
        .with_frames(settings.frame_id.clone(), settings.child_frame_id.clone());
    for d in binder.descriptors() {
        match d.kind {
            ParameterKind::Double { min, max } => debug!(parameter = d.name, min, max, "declared"),
            _ => debug!(parameter = d.name, "declared"),
        }
    }

    let publisher = Arc::new(BusPublisher::new(Arc::clone(&bus), "tftune-runtime::node"));
    let node = Arc::new(TfNode::new(binder, publisher, Arc::clone(&bus)));

    // Subscribe before anything can publish edits.
    let edits = bus.subscribe_to(Topic::ParameterEdits);
    let listener = tokio::spawn(Arc::clone(&node).run_edit_listener(edits));

    let addr = SocketAddr::from(([0, 0, 0, 0], settings.ws_port));
    let mut bridge = tokio::spawn(TfBridge::new(Arc::clone(&bus)).run_ws_server(addr));

    let scheduler = TickScheduler::new(settings.period());
    info!(period_ms = scheduler.period().as_millis() as u64, "tick loop armed");
    let ticker = tokio::spawn(scheduler.run(Arc::clone(&node)));

    let outcome = tokio::select! {
        signal = tokio::signal::ctrl_c() => match signal {
            Ok(()) => {
                info!("Ctrl-C received, shutting down");
                Ok(())
            }
            Err(e) => Err(TfError::Transport(format!("signal handler: {e}"))),
        },
        joined = &mut bridge => match joined {
            Ok(result) => result,
            Err(e) => Err(TfError::Transport(format!("bridge task failed: {e}"))),
        },
    };

    ticker.abort();
    listener.abort();
    bridge.abort();
    outcome
}
