//! Startup settings – reads `~/.tftune/config.toml`.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use tftune_types::{ParameterLimits, TfError};

/// Process startup options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Position range `[-scale, scale]`; also the maximum wrap bound.
    #[serde(default = "default_scale")]
    pub scale: f64,

    /// Velocity range `[-vel_scale, vel_scale]`.
    #[serde(default = "default_vel_scale")]
    pub vel_scale: f64,

    /// Angle range `[-angle_scale, angle_scale]` in radians.
    #[serde(default = "default_angle_scale")]
    pub angle_scale: f64,

    /// Tick period in seconds.
    #[serde(default = "default_period_secs")]
    pub period_secs: f64,

    /// WebSocket port for tuning clients.
    #[serde(default = "default_ws_port")]
    pub ws_port: u16,

    /// Per-topic event bus capacity.
    #[serde(default = "default_bus_capacity")]
    pub bus_capacity: usize,

    /// Initial parent frame.
    #[serde(default = "default_frame_id")]
    pub frame_id: String,

    /// Initial child frame.
    #[serde(default = "default_child_frame_id")]
    pub child_frame_id: String,
}

fn default_scale() -> f64 {
    10.0
}
fn default_vel_scale() -> f64 {
    1.0
}
fn default_angle_scale() -> f64 {
    3.2
}
fn default_period_secs() -> f64 {
    0.033
}
fn default_ws_port() -> u16 {
    9091
}
fn default_bus_capacity() -> usize {
    256
}
fn default_frame_id() -> String {
    "map".to_string()
}
fn default_child_frame_id() -> String {
    "frame".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            scale: default_scale(),
            vel_scale: default_vel_scale(),
            angle_scale: default_angle_scale(),
            period_secs: default_period_secs(),
            ws_port: default_ws_port(),
            bus_capacity: default_bus_capacity(),
            frame_id: default_frame_id(),
            child_frame_id: default_child_frame_id(),
        }
    }
}

impl Settings {
    /// Parameter limits declared to the binder.
    pub fn limits(&self) -> ParameterLimits {
        ParameterLimits {
            scale: self.scale,
            vel_scale: self.vel_scale,
            angle_scale: self.angle_scale,
        }
    }

    /// Tick period.  Only meaningful after [`Settings::validate`].
    pub fn period(&self) -> Duration {
        Duration::from_secs_f64(self.period_secs)
    }

    /// Reject settings the runtime cannot run with.
    pub fn validate(&self) -> Result<(), TfError> {
        if !(self.scale.is_finite() && self.scale > 0.0) {
            return Err(TfError::Config(format!("scale must be > 0, got {}", self.scale)));
        }
        if !(self.vel_scale.is_finite() && self.vel_scale >= 0.0) {
            return Err(TfError::Config(format!("vel_scale must be >= 0, got {}", self.vel_scale)));
        }
        if !(self.angle_scale.is_finite() && self.angle_scale >= 0.0) {
            return Err(TfError::Config(format!("angle_scale must be >= 0, got {}", self.angle_scale)));
        }
        if !(self.period_secs.is_finite() && self.period_secs > 0.0) {
            return Err(TfError::Config(format!("period_secs must be > 0, got {}", self.period_secs)));
        }
        if self.bus_capacity == 0 {
            return Err(TfError::Config("bus_capacity must be > 0".to_string()));
        }
        Ok(())
    }
}

/// Return the settings path: `$TFTUNE_CONFIG`, else `~/.tftune/config.toml`.
pub fn config_path() -> PathBuf {
    if let Ok(p) = std::env::var("TFTUNE_CONFIG") {
        return PathBuf::from(p);
    }
    config_path_for_home(
        &std::env::var("HOME")
            .or_else(|_| std::env::var("USERPROFILE"))
            .unwrap_or_else(|_| ".".to_string()),
    )
}

pub(crate) fn config_path_for_home(home: &str) -> PathBuf {
    PathBuf::from(home).join(".tftune").join("config.toml")
}

/// Load, override from the environment and validate.
///
/// A missing file yields the defaults.
pub fn load() -> Result<Settings, TfError> {
    let mut settings = load_from(&config_path())?.unwrap_or_default();
    apply_env_overrides(&mut settings);
    settings.validate()?;
    Ok(settings)
}

/// Load settings from a specific path.  Returns `None` if the file does not
/// exist.
pub(crate) fn load_from(path: &Path) -> Result<Option<Settings>, TfError> {
    if !path.exists() {
        return Ok(None);
    }
    let raw = fs::read_to_string(path)
        .map_err(|e| TfError::Config(format!("failed to read {}: {e}", path.display())))?;
    let settings = toml::from_str(&raw)
        .map_err(|e| TfError::Config(format!("failed to parse {}: {e}", path.display())))?;
    Ok(Some(settings))
}

/// Apply `TFTUNE_*` environment variable overrides to `settings`.
///
/// | Variable | Field |
/// |---|---|
/// | `TFTUNE_SCALE` | `scale` |
/// | `TFTUNE_VEL_SCALE` | `vel_scale` |
/// | `TFTUNE_ANGLE_SCALE` | `angle_scale` |
/// | `TFTUNE_PERIOD_SECS` | `period_secs` |
/// | `TFTUNE_WS_PORT` | `ws_port` |
/// | `TFTUNE_FRAME_ID` | `frame_id` |
/// | `TFTUNE_CHILD_FRAME_ID` | `child_frame_id` |
///
/// Values that fail to parse are ignored.
pub fn apply_env_overrides(settings: &mut Settings) {
    override_parsed("TFTUNE_SCALE", &mut settings.scale);
    override_parsed("TFTUNE_VEL_SCALE", &mut settings.vel_scale);
    override_parsed("TFTUNE_ANGLE_SCALE", &mut settings.angle_scale);
    override_parsed("TFTUNE_PERIOD_SECS", &mut settings.period_secs);
    override_parsed("TFTUNE_WS_PORT", &mut settings.ws_port);
    if let Ok(v) = std::env::var("TFTUNE_FRAME_ID") {
        settings.frame_id = v;
    }
    if let Ok(v) = std::env::var("TFTUNE_CHILD_FRAME_ID") {
        settings.child_frame_id = v;
    }
}

fn override_parsed<T: std::str::FromStr>(var: &str, field: &mut T) {
    if let Ok(v) = std::env::var(var)
        && let Ok(parsed) = v.parse::<T>()
    {
        *field = parsed;
    }
}
