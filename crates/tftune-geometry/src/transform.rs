//! Rigid-body transform primitives.
//!
//! A [`Transform3D`] is the pose of a child frame relative to its parent:
//! to express a point given in the child frame in the parent frame, rotate it
//! by `rotation` then add `translation`.
//!
//! Orientation is edited as roll/pitch/yaw and converted with
//! [`Quaternion::from_euler`], which uses the fixed-axis X → Y → Z convention
//! (`R = Rz(yaw) · Ry(pitch) · Rx(roll)`), the same convention ROS `tf` uses.
//!
//! # Example
//!
//! ```rust
//! use std::f64::consts::{FRAC_1_SQRT_2, FRAC_PI_2};
//! use tftune_geometry::transform::{Quaternion, Transform3D, Vec3};
//!
//! // Child frame 1 m along parent X, yawed by 90°.
//! let tf = Transform3D::new(
//!     Vec3::new(1.0, 0.0, 0.0),
//!     Quaternion::from_euler(0.0, 0.0, FRAC_PI_2),
//! );
//!
//! assert!((tf.rotation.w - FRAC_1_SQRT_2).abs() < 1e-9);
//! assert!((tf.rotation.z - FRAC_1_SQRT_2).abs() < 1e-9);
//! ```

use serde::{Deserialize, Serialize};

/// Position or displacement in metres.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vec3 {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn zero() -> Self {
        Self::new(0.0, 0.0, 0.0)
    }

    pub fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }

    /// Multiply every component by `factor`.
    pub fn scale(self, factor: f64) -> Self {
        Self::new(self.x * factor, self.y * factor, self.z * factor)
    }
}

/// Rotation as a unit quaternion, scalar part `w` first.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Quaternion {
    pub w: f64,
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Quaternion {
    /// Components are taken as given; nothing is normalised.
    pub fn new(w: f64, x: f64, y: f64, z: f64) -> Self {
        Self { w, x, y, z }
    }

    /// No rotation.
    pub fn identity() -> Self {
        Self::new(1.0, 0.0, 0.0, 0.0)
    }

    /// Build a rotation from roll, pitch and yaw in radians.
    ///
    /// Rotations are about the fixed parent axes: roll about X first, then
    /// pitch about Y, then yaw about Z.
    pub fn from_euler(roll: f64, pitch: f64, yaw: f64) -> Self {
        let (sr, cr) = (roll * 0.5).sin_cos();
        let (sp, cp) = (pitch * 0.5).sin_cos();
        let (sy, cy) = (yaw * 0.5).sin_cos();

        Self::new(
            cr * cp * cy + sr * sp * sy,
            sr * cp * cy - cr * sp * sy,
            cr * sp * cy + sr * cp * sy,
            cr * cp * sy - sr * sp * cy,
        )
    }
}

impl Default for Quaternion {
    fn default() -> Self {
        Self::identity()
    }
}

/// Pose of a child frame in its parent frame.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Transform3D {
    pub translation: Vec3,
    pub rotation: Quaternion,
}

impl Transform3D {
    pub fn new(translation: Vec3, rotation: Quaternion) -> Self {
        Self {
            translation,
            rotation,
        }
    }

    /// Child frame coincides with the parent.
    pub fn identity() -> Self {
        Self::new(Vec3::zero(), Quaternion::identity())
    }
}
