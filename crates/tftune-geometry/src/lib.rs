//! `tftune-geometry` – rigid-body math for the tuned transform.
//!
//! # Modules
//!
//! - [`transform`] – [`Vec3`][transform::Vec3],
//!   [`Quaternion`][transform::Quaternion] and
//!   [`Transform3D`][transform::Transform3D]: the translation + rotation pair
//!   that relates the child frame to its parent frame, including the
//!   roll/pitch/yaw → quaternion conversion used for every published pose.

pub mod transform;

pub use transform::{Quaternion, Transform3D, Vec3};
