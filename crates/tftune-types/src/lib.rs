use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tftune_geometry::Transform3D;
use thiserror::Error;
use uuid::Uuid;

/// Startup limits for the tunable parameters.
///
/// Positions are bounded by `scale`, velocities by `vel_scale` and angles by
/// `angle_scale`.  The wrap bounds default to `scale`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ParameterLimits {
    pub scale: f64,
    pub vel_scale: f64,
    pub angle_scale: f64,
}

impl Default for ParameterLimits {
    fn default() -> Self {
        Self {
            scale: 10.0,
            vel_scale: 1.0,
            angle_scale: 3.2,
        }
    }
}

/// The full set of tunable fields driving the published transform.
///
/// `zero`, `store` and `reset` are one-shot triggers: they are only ever
/// `true` in a raw edit, never in a resolved configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Configuration {
    pub frame_id: String,
    pub child_frame_id: String,
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub vx: f64,
    pub vy: f64,
    pub vz: f64,
    pub enable_velocity: bool,
    pub roll: f64,
    pub pitch: f64,
    pub yaw: f64,
    pub zero: bool,
    pub store: bool,
    pub reset: bool,
    pub bound_x: f64,
    pub bound_y: f64,
    pub bound_z: f64,
}

impl Configuration {
    /// Declared defaults for the given limits.
    pub fn with_limits(limits: &ParameterLimits) -> Self {
        Self {
            frame_id: "map".to_string(),
            child_frame_id: "frame".to_string(),
            x: 0.0,
            y: 0.0,
            z: 0.0,
            vx: 0.0,
            vy: 0.0,
            vz: 0.0,
            enable_velocity: true,
            roll: 0.0,
            pitch: 0.0,
            yaw: 0.0,
            zero: false,
            store: false,
            reset: false,
            bound_x: limits.scale,
            bound_y: limits.scale,
            bound_z: limits.scale,
        }
    }

    /// `true` when any trigger flag is set.
    pub fn has_triggers(&self) -> bool {
        self.zero || self.store || self.reset
    }

    /// Copy of `self` with every trigger flag cleared.
    pub fn without_triggers(&self) -> Self {
        Self {
            zero: false,
            store: false,
            reset: false,
            ..self.clone()
        }
    }
}

impl Default for Configuration {
    fn default() -> Self {
        Self::with_limits(&ParameterLimits::default())
    }
}

/// One pose sample: the transform from `frame_id` to `child_frame_id` at
/// `stamp`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StampedTransform {
    pub frame_id: String,
    pub child_frame_id: String,
    pub stamp: DateTime<Utc>,
    pub transform: Transform3D,
}

/// Unified event wrapper for the event bus.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    /// e.g., "tftune-runtime::node"
    pub source: String,
    pub payload: EventPayload,
}

impl Event {
    /// Wrap `payload` in a fresh event stamped now.
    pub fn new(source: impl Into<String>, payload: EventPayload) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            source: source.into(),
            payload,
        }
    }
}

/// Variants of data that can be routed over the event bus.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", content = "data", rename_all = "snake_case")]
pub enum EventPayload {
    /// A pose sample produced by one tick.
    Transform(StampedTransform),
    /// A raw, partial parameter edit from an interactive client.
    ParameterEdit(Map<String, Value>),
    /// The canonical configuration after an edit has been resolved.
    ParameterUpdate(Configuration),
    Fault { component: String, message: String },
}

/// Errors raised around the transform core: parameter validation, transport
/// and startup configuration.
#[derive(Error, Debug)]
pub enum TfError {
    #[error("Unknown parameter: {0}")]
    UnknownParameter(String),

    #[error("Invalid value for parameter {name}: {reason}")]
    InvalidParameter { name: String, reason: String },

    #[error("Channel Error: {0}")]
    Channel(String),

    #[error("Serialization Error: {0}")]
    Serialization(String),

    #[error("Transport Error: {0}")]
    Transport(String),

    #[error("Configuration Error: {0}")]
    Config(String),
}
