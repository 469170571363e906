//! Trigger-flag resolution for incoming configuration edits.
//!
//! [`resolve`] turns a raw, fully-populated [`Configuration`] (which may have
//! any of `zero`, `store` and `reset` set) into the normalized configuration
//! the integrator reads, updating the [`IntegratorState`] on the way.
//!
//! # Order of evaluation
//!
//! 1. First call only: seed the running position and the stored snapshot.
//! 2. `zero` – zero position and orientation.
//! 3. otherwise `reset` – restore the stored snapshot.
//! 4. `store` – snapshot the configuration produced by steps 2–3.
//!
//! `zero` therefore wins when both `zero` and `reset` arrive in one edit.
//!
//! # Example
//!
//! ```rust
//! use tftune_runtime::resolver::{resolve, IntegratorState};
//! use tftune_types::Configuration;
//!
//! let mut state = IntegratorState::default();
//! let raw = Configuration { x: 2.0, store: true, ..Configuration::default() };
//!
//! let resolved = resolve(raw, &mut state);
//! assert!(!resolved.store);
//! assert_eq!(state.stored().map(|c| c.x), Some(2.0));
//! ```

use tftune_geometry::Vec3;
use tftune_types::Configuration;
use tracing::{debug, info};

/// Process-owned state shared by the resolver and the integrator.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IntegratorState {
    pub(crate) position: Option<Vec3>,
    pub(crate) stored: Option<Configuration>,
}

impl IntegratorState {
    /// The running position, once seeded by the first resolution.
    pub fn position(&self) -> Option<Vec3> {
        self.position
    }

    /// The snapshot `reset` restores.  Never carries trigger flags.
    pub fn stored(&self) -> Option<&Configuration> {
        self.stored.as_ref()
    }
}

fn position_of(cfg: &Configuration) -> Vec3 {
    Vec3::new(cfg.x, cfg.y, cfg.z)
}

/// Resolve the trigger flags of `raw` against `state`.
///
/// The returned configuration never has a trigger flag set.
pub fn resolve(raw: Configuration, state: &mut IntegratorState) -> Configuration {
    if state.position.is_none() {
        state.position = Some(position_of(&raw));
    }
    if state.stored.is_none() {
        state.stored = Some(raw.without_triggers());
    }

    let store = raw.store;
    let mut working = if raw.zero {
        info!("zero: clearing position and orientation");
        let zeroed = Configuration {
            x: 0.0,
            y: 0.0,
            z: 0.0,
            roll: 0.0,
            pitch: 0.0,
            yaw: 0.0,
            ..raw
        };
        state.position = Some(Vec3::zero());
        zeroed
    } else if raw.reset {
        // `stored` was seeded above, so the fallback is only reachable if a
        // caller hands in a hand-built state.
        let restored = state.stored.clone().unwrap_or_else(|| raw.clone());
        info!(x = restored.x, y = restored.y, z = restored.z, "reset: restoring stored configuration");
        state.position = Some(position_of(&restored));
        restored
    } else {
        raw
    };

    working = working.without_triggers();

    if store {
        debug!(x = working.x, y = working.y, z = working.z, "store: snapshot taken");
        state.stored = Some(working.clone());
    }

    working
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_a() -> Configuration {
        Configuration {
            frame_id: "map".to_string(),
            child_frame_id: "a".to_string(),
            x: 1.0,
            y: -2.0,
            z: 3.0,
            vx: 0.5,
            roll: 0.1,
            pitch: 0.2,
            yaw: 0.3,
            enable_velocity: false,
            bound_x: 4.0,
            ..Configuration::default()
        }
    }

    fn config_b() -> Configuration {
        Configuration {
            child_frame_id: "b".to_string(),
            x: -7.0,
            y: 6.0,
            z: -5.0,
            vy: -0.9,
            yaw: -1.5,
            enable_velocity: true,
            bound_x: 9.0,
            ..Configuration::default()
        }
    }

    #[test]
    fn first_call_seeds_position_and_snapshot() {
        let mut state = IntegratorState::default();
        let out = resolve(config_a(), &mut state);

        assert_eq!(out, config_a());
        assert_eq!(state.position(), Some(Vec3::new(1.0, -2.0, 3.0)));
        assert_eq!(state.stored(), Some(&config_a()));
    }

    #[test]
    fn position_is_seeded_only_once() {
        let mut state = IntegratorState::default();
        resolve(config_a(), &mut state);
        resolve(config_b(), &mut state);
        assert_eq!(state.position(), Some(Vec3::new(1.0, -2.0, 3.0)));
    }

    #[test]
    fn snapshot_seed_drops_flags() {
        let mut state = IntegratorState::default();
        let raw = Configuration {
            reset: true,
            ..config_a()
        };
        resolve(raw, &mut state);
        assert!(!state.stored().unwrap().has_triggers());
    }

    #[test]
    fn zero_clears_pose_and_flag() {
        let mut state = IntegratorState::default();
        resolve(config_b(), &mut state);

        let out = resolve(
            Configuration {
                zero: true,
                ..config_a()
            },
            &mut state,
        );

        assert!(!out.zero);
        assert_eq!((out.x, out.y, out.z), (0.0, 0.0, 0.0));
        assert_eq!((out.roll, out.pitch, out.yaw), (0.0, 0.0, 0.0));
        // Everything else passes through.
        assert_eq!(out.vx, 0.5);
        assert_eq!(out.child_frame_id, "a");
        assert_eq!(state.position(), Some(Vec3::zero()));
    }

    #[test]
    fn store_then_reset_round_trip() {
        let mut state = IntegratorState::default();
        resolve(Configuration::default(), &mut state);

        let stored = resolve(
            Configuration {
                store: true,
                ..config_a()
            },
            &mut state,
        );
        assert_eq!(stored, config_a());
        assert_eq!(state.stored(), Some(&config_a()));

        let live = resolve(config_b(), &mut state);
        assert_eq!(live, config_b());

        let restored = resolve(
            Configuration {
                reset: true,
                ..config_b()
            },
            &mut state,
        );
        assert_eq!(restored, config_a());
        assert_eq!(state.position(), Some(Vec3::new(1.0, -2.0, 3.0)));
    }

    #[test]
    fn zero_wins_over_reset() {
        let mut state = IntegratorState::default();
        resolve(
            Configuration {
                store: true,
                ..config_a()
            },
            &mut state,
        );

        let out = resolve(
            Configuration {
                zero: true,
                reset: true,
                ..config_b()
            },
            &mut state,
        );

        assert!(!out.zero && !out.reset);
        assert_eq!((out.x, out.y, out.z), (0.0, 0.0, 0.0));
        assert_eq!(out.yaw, 0.0);
        // Not restored from the snapshot.
        assert_eq!(out.child_frame_id, "b");
        assert_eq!(state.position(), Some(Vec3::zero()));
    }

    #[test]
    fn store_with_zero_snapshots_zeroed_config() {
        let mut state = IntegratorState::default();
        resolve(config_b(), &mut state);

        resolve(
            Configuration {
                zero: true,
                store: true,
                ..config_a()
            },
            &mut state,
        );

        let stored = state.stored().unwrap();
        assert_eq!((stored.x, stored.y, stored.z), (0.0, 0.0, 0.0));
        assert_eq!(stored.child_frame_id, "a");
        assert!(!stored.has_triggers());
    }

    #[test]
    fn store_with_reset_keeps_restored_snapshot() {
        let mut state = IntegratorState::default();
        resolve(
            Configuration {
                store: true,
                ..config_a()
            },
            &mut state,
        );

        let out = resolve(
            Configuration {
                reset: true,
                store: true,
                ..config_b()
            },
            &mut state,
        );
        assert_eq!(out, config_a());
        assert_eq!(state.stored(), Some(&config_a()));
    }

    #[test]
    fn resolved_config_never_carries_triggers() {
        let mut state = IntegratorState::default();
        for (zero, store, reset) in [
            (false, false, false),
            (true, false, false),
            (false, true, false),
            (false, false, true),
            (true, true, true),
        ] {
            let out = resolve(
                Configuration {
                    zero,
                    store,
                    reset,
                    ..config_b()
                },
                &mut state,
            );
            assert!(!out.has_triggers(), "flags leaked for {zero}/{store}/{reset}");
        }
    }
}
