//! Tank Terrain - collision and terrain-following core for a tank battle
//!
//! Core modules:
//! - `sim`: Deterministic engine (terrain sampling, pose, collision, spawning)
//! - `settings`: Data-driven tuning loaded from JSON
//! - `error`: Config loading errors

pub mod error;
pub mod settings;
pub mod sim;

pub use error::{ConfigError, ConfigResult};
pub use settings::{EngineConfig, VehicleClass, VehicleGeometry};

use glam::{Vec2, Vec3};

/// Default gameplay constants. Every value here can be overridden through
/// [`EngineConfig`]; none of them is load-bearing beyond its default.
pub mod consts {
    /// Height of the hull base above the averaged track contact height
    pub const TRACK_HEIGHT_OFFSET: f32 = 0.4;
    /// Extra gap so treads never z-fight with the terrain mesh
    pub const TERRAIN_CLEARANCE: f32 = 0.1;

    /// Pitch/roll clamp (degrees)
    pub const MAX_TILT_DEG: f32 = 30.0;
    /// Multiplier applied to clamped pitch/roll to damp jitter
    pub const ANGLE_SMOOTHING: f32 = 0.7;
    /// Fewest contact points per track that still give a usable pitch
    pub const MIN_TRACK_SAMPLES: usize = 4;
    /// Decay of the rank weights `exp(-rank * k)` when averaging a track
    pub const RANK_DECAY: f32 = 0.5;

    /// Offset of the four edge samples in the robust height query
    pub const ROBUST_SAMPLE_RADIUS: f32 = 0.5;
    pub const ROBUST_CENTER_WEIGHT: f32 = 0.6;
    pub const ROBUST_EDGE_WEIGHT: f32 = 0.1;

    /// Playfield spans [-HALF_EXTENT, HALF_EXTENT] on x and z
    pub const PLAYFIELD_HALF_EXTENT: f32 = 100.0;
    /// Ground below this reports `is_underwater`
    pub const WATER_LEVEL: f32 = -0.5;

    /// Stability ceilings for movement
    pub const MAX_SLOPE: f32 = 0.7;
    pub const MOVE_UNDERWATER_FLOOR: f32 = -1.0;
    pub const MAX_CONTACT_SPREAD: f32 = 2.0;

    /// Obstacle defaults when the scene leaves radius/height unset
    pub const BUILDING_RADIUS: f32 = 5.0;
    pub const BUILDING_HEIGHT: f32 = 8.0;
    pub const TREE_RADIUS: f32 = 1.0;
    pub const TREE_HEIGHT: f32 = 6.0;
    /// Minimum seconds between static index rebuilds
    pub const STATIC_REFRESH_INTERVAL: f32 = 0.5;

    /// Projectile speed that yields the nominal 1.0 speed factor
    pub const REFERENCE_SPEED: f32 = 40.0;
    /// Speed factor ceiling
    pub const MAX_SPEED_FACTOR: f32 = 1.5;
    pub const CRATER_RADIUS: f32 = 3.0;
    pub const CRATER_DEPTH: f32 = 1.0;

    /// Spawn placement
    pub const SPAWN_EDGE_MARGIN: f32 = 5.0;
    pub const SPAWN_UNDERWATER_FLOOR: f32 = -1.5;
    pub const SPAWN_MAX_SLOPE: f32 = 0.35;
    pub const SPAWN_SLOPE_PROBE: f32 = 2.0;
    pub const CRATER_PROBE_RADIUS: f32 = 3.0;
    pub const CRATER_DEPTH_THRESHOLD: f32 = 0.5;
    pub const CRATER_SPREAD_THRESHOLD: f32 = 1.0;
    pub const MIN_CLEARANCE: f32 = 3.0;
    pub const BUILDING_CLEARANCE_SCALE: f32 = 1.5;
    pub const TREE_CLEARANCE_SCALE: f32 = 1.2;
    pub const TALL_OBSTACLE_HEIGHT: f32 = 4.0;
    pub const CLEARANCE_RING_RADIUS: f32 = 4.0;
    pub const CLEARANCE_RING_MARGIN: f32 = 0.5;
}

/// Rotate a vehicle-local (lateral, forward) offset by `yaw` around +Y.
///
/// Yaw 0 faces +Z; local +X is the vehicle's right-hand side.
#[inline]
pub fn rotate_xz(local: Vec2, yaw: f32) -> Vec2 {
    let (sin, cos) = yaw.sin_cos();
    Vec2::new(local.x * cos + local.y * sin, -local.x * sin + local.y * cos)
}

/// Distance between two points ignoring height
#[inline]
pub fn horizontal_distance(a: Vec3, b: Vec3) -> f32 {
    Vec2::new(a.x - b.x, a.z - b.z).length()
}

/// Project a world point onto the ground plane
#[inline]
pub fn flatten(p: Vec3) -> Vec2 {
    Vec2::new(p.x, p.z)
}

/// Degrees to radians
#[inline]
pub fn deg(degrees: f32) -> f32 {
    degrees.to_radians()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn test_rotate_forward_quarter_turn() {
        let p = rotate_xz(Vec2::new(0.0, 1.0), FRAC_PI_2);
        assert!((p.x - 1.0).abs() < 1e-5);
        assert!(p.y.abs() < 1e-5);
    }

    #[test]
    fn test_rotate_preserves_length() {
        let p = rotate_xz(Vec2::new(3.0, 4.0), 1.234);
        assert!((p.length() - 5.0).abs() < 1e-4);
    }

    #[test]
    fn test_horizontal_distance_ignores_y() {
        let a = Vec3::new(0.0, 100.0, 0.0);
        let b = Vec3::new(3.0, -7.0, 4.0);
        assert!((horizontal_distance(a, b) - 5.0).abs() < 1e-5);
    }
}
