//! WebSocket bridge for interactive tuning clients.
//!
//! [`TfBridge`]:
//!
//! 1. **Streams** every [`Topic::Transforms`], [`Topic::ParameterUpdates`]
//!    and [`Topic::SystemAlerts`] event to connected clients as one JSON text
//!    frame per event.
//!
//! 2. **Accepts** edits from clients in the form
//!    `{"op":"set_parameters","values":{"x":1.0,"store":true}}` and publishes
//!    the `values` object as an [`EventPayload::ParameterEdit`] on
//!    [`Topic::ParameterEdits`].  Validation happens downstream in the
//!    runtime's parameter binder, not here.
//!
//! The bridge is agnostic about what the parameters mean; it only handles
//! serialisation and transport.

use std::net::SocketAddr;
use std::sync::Arc;

use futures_util::{SinkExt, StreamExt};
use serde::Serialize;
use serde_json::Value;
use tftune_types::{Event, EventPayload, TfError};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::broadcast::error::RecvError;
use tokio_tungstenite::{accept_async, tungstenite::Message};
use tracing::{debug, error, info, warn};

use crate::bus::{EventBus, Topic};

const SOURCE: &str = "tftune-middleware::bridge";

/// Bridge between the internal [`EventBus`] and WebSocket clients.
#[derive(Clone)]
pub struct TfBridge {
    bus: Arc<EventBus>,
}

impl TfBridge {
    /// Create a new bridge backed by `bus`.
    pub fn new(bus: Arc<EventBus>) -> Self {
        Self { bus }
    }

    /// Bind `addr` and serve clients until a fatal error.
    ///
    /// # Errors
    ///
    /// Returns [`TfError::Transport`] if the TCP listener cannot be bound.
    pub async fn run_ws_server(self, addr: SocketAddr) -> Result<(), TfError> {
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| TfError::Transport(format!("ws bind error on {addr}: {e}")))?;
        info!(%addr, "tf bridge listening");
        self.serve(listener).await
    }

    /// Serve clients on an already-bound listener.
    pub async fn serve(self, listener: TcpListener) -> Result<(), TfError> {
        loop {
            match listener.accept().await {
                Ok((stream, peer)) => {
                    let bridge = self.clone();
                    tokio::spawn(async move {
                        if let Err(e) = bridge.handle_ws_client(stream, peer).await {
                            error!(peer = %peer, error = %e, "ws client error");
                        }
                    });
                }
                Err(e) => {
                    error!(error = %e, "ws accept error");
                }
            }
        }
    }

    async fn handle_ws_client(&self, stream: TcpStream, peer: SocketAddr) -> Result<(), TfError> {
        let ws_stream = accept_async(stream)
            .await
            .map_err(|e| TfError::Transport(format!("ws handshake from {peer}: {e}")))?;
        debug!(peer = %peer, "ws client connected");

        let (mut ws_tx, mut ws_rx) = ws_stream.split();
        let mut transforms = self.bus.subscribe_to(Topic::Transforms);
        let mut updates = self.bus.subscribe_to(Topic::ParameterUpdates);
        let mut alerts = self.bus.subscribe_to(Topic::SystemAlerts);

        loop {
            let outbound = tokio::select! {
                result = transforms.recv() => result,
                result = updates.recv() => result,
                result = alerts.recv() => result,
                msg = ws_rx.next() => {
                    match msg {
                        Some(Ok(Message::Close(_))) | None => break,
                        Some(Err(_)) => break,
                        Some(Ok(Message::Text(text))) => {
                            self.handle_incoming_ws_message(text.as_str());
                        }
                        _ => {}
                    }
                    continue;
                }
            };

            match outbound {
                Ok(event) => {
                    let frame = match text_frame(&event) {
                        Ok(frame) => frame,
                        Err(e) => {
                            warn!(peer = %peer, event_id = %event.id, error = %e, "event skipped");
                            continue;
                        }
                    };
                    if ws_tx.send(frame).await.is_err() {
                        break;
                    }
                }
                Err(RecvError::Lagged(n)) => {
                    warn!(peer = %peer, lagged_by = n, "ws client lagged");
                }
                Err(RecvError::Closed) => break,
            }
        }

        debug!(peer = %peer, "ws client disconnected");
        Ok(())
    }

    /// Parse an incoming WebSocket text message.
    ///
    /// Only `set_parameters` with an object-valued `values` field is
    /// recognised; anything else is ignored.  Returns `true` when an edit was
    /// forwarded onto the bus.
    pub(crate) fn handle_incoming_ws_message(&self, text: &str) -> bool {
        let Ok(json) = serde_json::from_str::<Value>(text) else {
            debug!("ignoring non-JSON ws message");
            return false;
        };

        let op = json.get("op").and_then(|o| o.as_str()).unwrap_or("");
        if op != "set_parameters" {
            return false;
        }

        let Some(values) = json.get("values").and_then(|v| v.as_object()) else {
            warn!("set_parameters without an object `values` field");
            return false;
        };

        let event = Event::new(SOURCE, EventPayload::ParameterEdit(values.clone()));
        match self.bus.publish_to(Topic::ParameterEdits, event) {
            Ok(0) => {
                warn!("parameter edit dropped: no listener on ParameterEdits");
                false
            }
            Ok(_) => true,
            Err(e) => {
                warn!(error = %e, "failed to forward parameter edit");
                false
            }
        }
    }
}

/// One JSON text frame per value.  A value that cannot be encoded is the
/// caller's to skip; it must not end the client session.
fn text_frame<T: Serialize>(value: &T) -> Result<Message, TfError> {
    serde_json::to_string(value)
        .map(|json| Message::Text(json.into()))
        .map_err(|e| TfError::Serialization(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use tftune_geometry::Transform3D;
    use tftune_types::StampedTransform;
    use tokio_tungstenite::connect_async;

    fn make_bridge() -> (Arc<EventBus>, TfBridge) {
        let bus = Arc::new(EventBus::default());
        let bridge = TfBridge::new(Arc::clone(&bus));
        (bus, bridge)
    }

    #[tokio::test]
    async fn set_parameters_publishes_edit() {
        let (bus, bridge) = make_bridge();
        let mut rx = bus.subscribe_to(Topic::ParameterEdits);

        let forwarded = bridge.handle_incoming_ws_message(
            r#"{"op":"set_parameters","values":{"x":1.5,"store":true}}"#,
        );
        assert!(forwarded);

        let event = rx.recv().await.unwrap();
        assert_eq!(event.source, SOURCE);
        match event.payload {
            EventPayload::ParameterEdit(values) => {
                assert_eq!(values["x"], 1.5);
                assert_eq!(values["store"], true);
            }
            other => panic!("expected ParameterEdit, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn unknown_op_is_ignored() {
        let (bus, bridge) = make_bridge();
        let mut rx = bus.subscribe_to(Topic::ParameterEdits);

        assert!(!bridge.handle_incoming_ws_message(r#"{"op":"subscribe","topic":"/tf"}"#));
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn invalid_json_is_ignored() {
        let (bus, bridge) = make_bridge();
        let mut rx = bus.subscribe_to(Topic::ParameterEdits);

        assert!(!bridge.handle_incoming_ws_message("not json at all"));
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn non_object_values_are_ignored() {
        let (bus, bridge) = make_bridge();
        let mut rx = bus.subscribe_to(Topic::ParameterEdits);

        assert!(!bridge.handle_incoming_ws_message(r#"{"op":"set_parameters","values":[1,2]}"#));
        assert!(rx.try_recv().is_err());
    }

    struct Unencodable;

    impl Serialize for Unencodable {
        fn serialize<S: serde::Serializer>(&self, _: S) -> Result<S::Ok, S::Error> {
            Err(serde::ser::Error::custom("refuses to encode"))
        }
    }

    #[test]
    fn unencodable_value_is_an_error_not_a_panic() {
        assert!(matches!(text_frame(&Unencodable), Err(TfError::Serialization(_))));

        let ok = text_frame(&Event::new("test", EventPayload::ParameterEdit(serde_json::Map::new())))
            .expect("events always encode");
        assert!(matches!(ok, Message::Text(ref t) if t.as_str().contains("parameter_edit")));
    }

    #[tokio::test]
    async fn ws_client_round_trip() -> Result<(), Box<dyn std::error::Error>> {
        let (bus, bridge) = make_bridge();
        let mut edits = bus.subscribe_to(Topic::ParameterEdits);

        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        tokio::spawn(bridge.serve(listener));

        let (mut ws, _) = connect_async(format!("ws://{addr}")).await?;

        // Upstream: edit reaches the bus.
        ws.send(Message::Text(
            r#"{"op":"set_parameters","values":{"yaw":0.5}}"#.into(),
        ))
        .await?;
        let edit = tokio::time::timeout(std::time::Duration::from_secs(2), edits.recv()).await??;
        assert!(matches!(edit.payload, EventPayload::ParameterEdit(ref v) if v["yaw"] == 0.5));

        // Downstream: a transform published after the client subscribed is
        // forwarded as JSON.  The edit above guarantees the handler is live.
        let sample = StampedTransform {
            frame_id: "map".to_string(),
            child_frame_id: "frame".to_string(),
            stamp: Utc::now(),
            transform: Transform3D::identity(),
        };
        bus.publish_to(
            Topic::Transforms,
            Event::new("test", EventPayload::Transform(sample)),
        )?;

        let frame = tokio::time::timeout(std::time::Duration::from_secs(2), ws.next())
            .await?
            .ok_or("ws closed")??;
        let text = frame.into_text()?;
        let json: Value = serde_json::from_str(text.as_str())?;
        assert_eq!(json["payload"]["kind"], "transform");
        assert_eq!(json["payload"]["data"]["frame_id"], "map");
        Ok(())
    }
}
