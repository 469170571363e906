//! Per-tick pose integration.
//!
//! With `enable_velocity` set, the running position advances by
//! `velocity * dt` and each axis is wrapped by [`clip`].  Otherwise the
//! position simply mirrors the configured `x`, `y`, `z`.  The mode is
//! re-evaluated on every tick.
//!
//! # Example
//!
//! ```rust
//! use chrono::Utc;
//! use tftune_runtime::integrator::integrate;
//! use tftune_runtime::resolver::{resolve, IntegratorState};
//! use tftune_types::Configuration;
//!
//! let mut state = IntegratorState::default();
//! let cfg = resolve(Configuration { vx: 1.0, ..Configuration::default() }, &mut state);
//!
//! let pose = integrate(&cfg, &mut state, Some(0.5), Utc::now());
//! assert_eq!(pose.transform.translation.x, 0.5);
//! ```

use chrono::{DateTime, Utc};
use tftune_geometry::{Quaternion, Transform3D, Vec3};
use tftune_types::{Configuration, StampedTransform};

use crate::resolver::IntegratorState;

/// Wrap `pos` back into `[-bound, bound]` by one step of `2 * bound`.
///
/// A `bound` of zero (or less) disables wrapping.  This is a single
/// conditional shift, not a modulo: a position more than `3 * bound` out of
/// range stays out of range after one call.
pub fn clip(pos: f64, bound: f64) -> f64 {
    if bound <= 0.0 {
        pos
    } else if pos > bound {
        pos - 2.0 * bound
    } else if pos < -bound {
        pos + 2.0 * bound
    } else {
        pos
    }
}

/// Advance `state` by one tick and return the pose to publish.
///
/// `dt` is the signed number of seconds since the previous tick, or `None`
/// on the first tick, in which case the velocity advance is skipped.
pub fn integrate(
    config: &Configuration,
    state: &mut IntegratorState,
    dt: Option<f64>,
    stamp: DateTime<Utc>,
) -> StampedTransform {
    let configured = Vec3::new(config.x, config.y, config.z);

    let position = if config.enable_velocity {
        let mut p = state.position.unwrap_or(configured);
        if let Some(dt) = dt {
            p = p.add(Vec3::new(config.vx, config.vy, config.vz).scale(dt));
        }
        Vec3::new(
            clip(p.x, config.bound_x),
            clip(p.y, config.bound_y),
            clip(p.z, config.bound_z),
        )
    } else {
        configured
    };
    state.position = Some(position);

    StampedTransform {
        frame_id: config.frame_id.clone(),
        child_frame_id: config.child_frame_id.clone(),
        stamp,
        transform: Transform3D::new(
            position,
            Quaternion::from_euler(config.roll, config.pitch, config.yaw),
        ),
    }
}
