//! [`ParameterBinder`] – named, bounded tunables.
//!
//! Declares every [`Configuration`] field as a parameter with a type and, for
//! numeric fields, a closed range derived from [`ParameterLimits`].  Raw
//! client edits arrive as partial JSON objects; [`ParameterBinder::apply`]
//! validates them, clamps numbers into range and merges them onto the
//! canonical configuration, producing the fully-populated raw configuration
//! the resolver consumes.
//!
//! An edit is all-or-nothing: if any value is unknown or ill-typed, nothing
//! is applied.

use serde_json::{Map, Value};
use tftune_types::{Configuration, ParameterLimits, TfError};
use tracing::debug;

/// Value type and range of one parameter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ParameterKind {
    Str,
    Bool,
    Double { min: f64, max: f64 },
}

/// Declaration of one tunable parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterDescriptor {
    pub name: &'static str,
    pub description: &'static str,
    pub kind: ParameterKind,
}

/// Validates and merges parameter edits against the declared bounds.
#[derive(Debug, Clone)]
pub struct ParameterBinder {
    defaults: Configuration,
    descriptors: Vec<ParameterDescriptor>,
}

impl ParameterBinder {
    /// Declare the parameter set for `limits`.
    pub fn new(limits: ParameterLimits) -> Self {
        let scale = ParameterKind::Double {
            min: -limits.scale,
            max: limits.scale,
        };
        let vel = ParameterKind::Double {
            min: -limits.vel_scale,
            max: limits.vel_scale,
        };
        let angle = ParameterKind::Double {
            min: -limits.angle_scale,
            max: limits.angle_scale,
        };
        let bound = ParameterKind::Double {
            min: 0.0,
            max: limits.scale,
        };

        let d = |name, description, kind| ParameterDescriptor {
            name,
            description,
            kind,
        };
        let descriptors = vec![
            d("frame_id", "parent frame id", ParameterKind::Str),
            d("child_frame_id", "child frame id", ParameterKind::Str),
            d("x", "x", scale),
            d("y", "y", scale),
            d("z", "z", scale),
            d("vx", "x velocity", vel),
            d("vy", "y velocity", vel),
            d("vz", "z velocity", vel),
            d("enable_velocity", "enable velocity", ParameterKind::Bool),
            d("roll", "roll", angle),
            d("pitch", "pitch", angle),
            d("yaw", "yaw", angle),
            d("zero", "zero", ParameterKind::Bool),
            d("store", "store", ParameterKind::Bool),
            d("reset", "reset", ParameterKind::Bool),
            d("bound_x", "x +/- bound", bound),
            d("bound_y", "y +/- bound", bound),
            d("bound_z", "z +/- bound", bound),
        ];

        Self {
            defaults: Configuration::with_limits(&limits),
            descriptors,
        }
    }

    /// Override the default parent and child frame names (builder-style).
    pub fn with_frames(mut self, frame_id: impl Into<String>, child_frame_id: impl Into<String>) -> Self {
        self.defaults.frame_id = frame_id.into();
        self.defaults.child_frame_id = child_frame_id.into();
        self
    }

    /// All declared parameters, in declaration order.
    pub fn descriptors(&self) -> &[ParameterDescriptor] {
        &self.descriptors
    }

    /// Look up one parameter by name.
    pub fn descriptor(&self, name: &str) -> Option<&ParameterDescriptor> {
        self.descriptors.iter().find(|d| d.name == name)
    }

    /// The declared default configuration.
    pub fn defaults(&self) -> Configuration {
        self.defaults.clone()
    }

    /// Merge `values` onto `current`, returning the raw configuration.
    ///
    /// # Errors
    ///
    /// * [`TfError::UnknownParameter`] for a name that is not declared.
    /// * [`TfError::InvalidParameter`] for a value of the wrong type or a
    ///   non-finite number.
    pub fn apply(&self, current: &Configuration, values: &Map<String, Value>) -> Result<Configuration, TfError> {
        let mut next = current.clone();

        for (name, value) in values {
            let descriptor = self
                .descriptor(name)
                .ok_or_else(|| TfError::UnknownParameter(name.clone()))?;

            match descriptor.kind {
                ParameterKind::Str => {
                    let s = value.as_str().ok_or_else(|| invalid(name, "expected a string"))?;
                    if let Some(field) = string_field_mut(&mut next, name) {
                        *field = s.to_string();
                    }
                }
                ParameterKind::Bool => {
                    let b = value.as_bool().ok_or_else(|| invalid(name, "expected a boolean"))?;
                    if let Some(field) = bool_field_mut(&mut next, name) {
                        *field = b;
                    }
                }
                ParameterKind::Double { min, max } => {
                    let v = value.as_f64().ok_or_else(|| invalid(name, "expected a number"))?;
                    if !v.is_finite() {
                        return Err(invalid(name, "expected a finite number"));
                    }
                    let clamped = v.clamp(min, max);
                    if clamped != v {
                        debug!(parameter = %name, requested = v, applied = clamped, "clamped to declared bounds");
                    }
                    if let Some(field) = double_field_mut(&mut next, name) {
                        *field = clamped;
                    }
                }
            }
        }

        Ok(next)
    }
}

fn invalid(name: &str, reason: &str) -> TfError {
    TfError::InvalidParameter {
        name: name.to_string(),
        reason: reason.to_string(),
    }
}

fn string_field_mut<'a>(cfg: &'a mut Configuration, name: &str) -> Option<&'a mut String> {
    match name {
        "frame_id" => Some(&mut cfg.frame_id),
        "child_frame_id" => Some(&mut cfg.child_frame_id),
        _ => None,
    }
}

fn bool_field_mut<'a>(cfg: &'a mut Configuration, name: &str) -> Option<&'a mut bool> {
    match name {
        "enable_velocity" => Some(&mut cfg.enable_velocity),
        "zero" => Some(&mut cfg.zero),
        "store" => Some(&mut cfg.store),
        "reset" => Some(&mut cfg.reset),
        _ => None,
    }
}

fn double_field_mut<'a>(cfg: &'a mut Configuration, name: &str) -> Option<&'a mut f64> {
    match name {
        "x" => Some(&mut cfg.x),
        "y" => Some(&mut cfg.y),
        "z" => Some(&mut cfg.z),
        "vx" => Some(&mut cfg.vx),
        "vy" => Some(&mut cfg.vy),
        "vz" => Some(&mut cfg.vz),
        "roll" => Some(&mut cfg.roll),
        "pitch" => Some(&mut cfg.pitch),
        "yaw" => Some(&mut cfg.yaw),
        "bound_x" => Some(&mut cfg.bound_x),
        "bound_y" => Some(&mut cfg.bound_y),
        "bound_z" => Some(&mut cfg.bound_z),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn edit(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap_or_default()
    }

    #[test]
    fn declares_every_configuration_field() {
        let binder = ParameterBinder::new(ParameterLimits::default());
        let cfg = serde_json::to_value(binder.defaults()).unwrap();
        let fields = cfg.as_object().unwrap();
        assert_eq!(fields.len(), binder.descriptors().len());
        for name in fields.keys() {
            assert!(binder.descriptor(name).is_some(), "{name} not declared");
        }
    }

    #[test]
    fn declared_ranges_follow_limits() {
        let binder = ParameterBinder::new(ParameterLimits {
            scale: 5.0,
            vel_scale: 2.0,
            angle_scale: 1.0,
        });
        assert_eq!(binder.descriptor("x").unwrap().kind, ParameterKind::Double { min: -5.0, max: 5.0 });
        assert_eq!(binder.descriptor("vz").unwrap().kind, ParameterKind::Double { min: -2.0, max: 2.0 });
        assert_eq!(binder.descriptor("yaw").unwrap().kind, ParameterKind::Double { min: -1.0, max: 1.0 });
        assert_eq!(binder.descriptor("bound_y").unwrap().kind, ParameterKind::Double { min: 0.0, max: 5.0 });
        assert_eq!(binder.defaults().bound_z, 5.0);
    }

    #[test]
    fn merges_partial_edit() {
        let binder = ParameterBinder::new(ParameterLimits::default());
        let current = binder.defaults();
        let next = binder
            .apply(&current, &edit(json!({"x": 1.25, "enable_velocity": false, "frame_id": "odom"})))
            .unwrap();
        assert_eq!(next.x, 1.25);
        assert!(!next.enable_velocity);
        assert_eq!(next.frame_id, "odom");
        assert_eq!(next.y, current.y);
        assert_eq!(next.child_frame_id, current.child_frame_id);
    }

    #[test]
    fn clamps_numbers_into_bounds() {
        let binder = ParameterBinder::new(ParameterLimits::default());
        let next = binder
            .apply(
                &binder.defaults(),
                &edit(json!({"x": 25.0, "vy": -3.0, "roll": 4.0, "bound_x": -1.0})),
            )
            .unwrap();
        assert_eq!(next.x, 10.0);
        assert_eq!(next.vy, -1.0);
        assert_eq!(next.roll, 3.2);
        assert_eq!(next.bound_x, 0.0);
    }

    #[test]
    fn integer_json_is_accepted_as_double() {
        let binder = ParameterBinder::new(ParameterLimits::default());
        let next = binder.apply(&binder.defaults(), &edit(json!({"z": 3}))).unwrap();
        assert_eq!(next.z, 3.0);
    }

    #[test]
    fn unknown_parameter_is_rejected() {
        let binder = ParameterBinder::new(ParameterLimits::default());
        let err = binder.apply(&binder.defaults(), &edit(json!({"w": 1.0}))).unwrap_err();
        assert!(matches!(err, TfError::UnknownParameter(name) if name == "w"));
    }

    #[test]
    fn wrong_type_rejects_whole_edit() {
        let binder = ParameterBinder::new(ParameterLimits::default());
        let current = binder.defaults();
        let err = binder
            .apply(&current, &edit(json!({"x": 2.0, "store": "yes"})))
            .unwrap_err();
        assert!(matches!(err, TfError::InvalidParameter { ref name, .. } if name == "store"));
    }

    #[test]
    fn with_frames_changes_defaults() {
        let binder = ParameterBinder::new(ParameterLimits::default()).with_frames("world", "tool");
        let defaults = binder.defaults();
        assert_eq!(defaults.frame_id, "world");
        assert_eq!(defaults.child_frame_id, "tool");
    }
}
