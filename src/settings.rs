//! Engine tuning and vehicle geometry
//!
//! Loaded from JSON; every section falls back to the defaults in
//! [`crate::consts`] for fields the document leaves out.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::{ConfigError, ConfigResult};

/// Vehicle size classes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum VehicleClass {
    Light,
    #[default]
    Medium,
    Heavy,
}

impl VehicleClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            VehicleClass::Light => "Light",
            VehicleClass::Medium => "Medium",
            VehicleClass::Heavy => "Heavy",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "light" => Some(VehicleClass::Light),
            "medium" | "med" => Some(VehicleClass::Medium),
            "heavy" => Some(VehicleClass::Heavy),
            _ => None,
        }
    }

    /// Track and hull geometry for this class
    pub fn geometry(&self) -> VehicleGeometry {
        match self {
            VehicleClass::Light => VehicleGeometry::light(),
            VehicleClass::Medium => VehicleGeometry::medium(),
            VehicleClass::Heavy => VehicleGeometry::heavy(),
        }
    }
}

/// Fixed per-type geometry of a tracked vehicle
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VehicleGeometry {
    /// Length of each track along the forward axis
    pub track_length: f32,
    /// Lateral distance between the two track centerlines
    pub track_separation: f32,
    /// Circle used for tank-vs-world overlap tests
    pub collision_radius: f32,
    /// Contact samples per track (at least 4)
    pub sample_count: usize,
    /// Height of the hull's center above its ground position
    pub body_center_height: f32,
}

impl Default for VehicleGeometry {
    fn default() -> Self {
        Self::medium()
    }
}

impl VehicleGeometry {
    pub fn light() -> Self {
        Self {
            track_length: 3.0,
            track_separation: 1.8,
            collision_radius: 1.8,
            sample_count: 4,
            body_center_height: 0.8,
        }
    }

    pub fn medium() -> Self {
        Self {
            track_length: 3.6,
            track_separation: 2.15,
            collision_radius: 2.2,
            sample_count: 6,
            body_center_height: 1.0,
        }
    }

    pub fn heavy() -> Self {
        Self {
            track_length: 4.4,
            track_separation: 2.6,
            collision_radius: 2.8,
            sample_count: 8,
            body_center_height: 1.2,
        }
    }

    /// Reject geometry the track model cannot sample
    pub fn validate(&self) -> ConfigResult<()> {
        if self.sample_count < MIN_TRACK_SAMPLES {
            return Err(ConfigError::Invalid(format!(
                "sample_count must be at least {}, got {}",
                MIN_TRACK_SAMPLES,
                self.sample_count
            )));
        }
        let dims = [
            ("track_length", self.track_length),
            ("track_separation", self.track_separation),
            ("collision_radius", self.collision_radius),
        ];
        for (name, value) in dims {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigError::Invalid(format!("{name} must be positive, got {value}")));
            }
        }
        if !self.body_center_height.is_finite() {
            return Err(ConfigError::Invalid("body_center_height must be finite".to_string()));
        }
        Ok(())
    }
}

/// Robust height query weights
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SamplerConfig {
    /// Offset of the four edge samples from the center
    pub radius: f32,
    pub center_weight: f32,
    /// Weight of each of the four edge samples
    pub edge_weight: f32,
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            radius: ROBUST_SAMPLE_RADIUS,
            center_weight: ROBUST_CENTER_WEIGHT,
            edge_weight: ROBUST_EDGE_WEIGHT,
        }
    }
}

/// Pose solving
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PoseConfig {
    pub track_height_offset: f32,
    pub terrain_clearance: f32,
    /// Pitch/roll clamp in degrees
    pub max_tilt_deg: f32,
    /// Applied after clamping
    pub angle_smoothing: f32,
    pub rank_decay: f32,
    pub water_level: f32,
}

impl Default for PoseConfig {
    fn default() -> Self {
        Self {
            track_height_offset: TRACK_HEIGHT_OFFSET,
            terrain_clearance: TERRAIN_CLEARANCE,
            max_tilt_deg: MAX_TILT_DEG,
            angle_smoothing: ANGLE_SMOOTHING,
            rank_decay: RANK_DECAY,
            water_level: WATER_LEVEL,
        }
    }
}

/// Movement stability ceilings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StabilityConfig {
    pub max_slope: f32,
    pub underwater_floor: f32,
    /// Max-minus-min height across all track contacts
    pub max_contact_spread: f32,
}

impl Default for StabilityConfig {
    fn default() -> Self {
        Self {
            max_slope: MAX_SLOPE,
            underwater_floor: MOVE_UNDERWATER_FLOOR,
            max_contact_spread: MAX_CONTACT_SPREAD,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MovementConfig {
    pub half_extent: f32,
}

impl Default for MovementConfig {
    fn default() -> Self {
        Self {
            half_extent: PLAYFIELD_HALF_EXTENT,
        }
    }
}

/// Static obstacle defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ObstacleConfig {
    pub building_radius: f32,
    pub building_height: f32,
    pub tree_radius: f32,
    pub tree_height: f32,
    /// Seconds between throttled rebuilds
    pub refresh_interval: f32,
}

impl Default for ObstacleConfig {
    fn default() -> Self {
        Self {
            building_radius: BUILDING_RADIUS,
            building_height: BUILDING_HEIGHT,
            tree_radius: TREE_RADIUS,
            tree_height: TREE_HEIGHT,
            refresh_interval: STATIC_REFRESH_INTERVAL,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectileConfig {
    pub reference_speed: f32,
    pub max_speed_factor: f32,
    pub crater_radius: f32,
    pub crater_depth: f32,
}

impl Default for ProjectileConfig {
    fn default() -> Self {
        Self {
            reference_speed: REFERENCE_SPEED,
            max_speed_factor: MAX_SPEED_FACTOR,
            crater_radius: CRATER_RADIUS,
            crater_depth: CRATER_DEPTH,
        }
    }
}

/// Spawn suitability thresholds
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SpawnConfig {
    /// Candidates must stay this far inside the playfield edge
    pub edge_margin: f32,
    pub underwater_floor: f32,
    pub max_slope: f32,
    /// Half-distance of the 4-direction slope probe
    pub slope_probe: f32,
    pub crater_probe_radius: f32,
    /// Ring average above center that marks a crater
    pub crater_depth_threshold: f32,
    /// Ring max-minus-min that marks a crater rim
    pub crater_spread_threshold: f32,
    pub min_clearance: f32,
    pub building_clearance_scale: f32,
    pub tree_clearance_scale: f32,
    /// Obstacles at least this tall block spawning under their footprint
    pub tall_obstacle_height: f32,
    pub clearance_ring_radius: f32,
    pub clearance_ring_margin: f32,
}

impl Default for SpawnConfig {
    fn default() -> Self {
        Self {
            edge_margin: SPAWN_EDGE_MARGIN,
            underwater_floor: SPAWN_UNDERWATER_FLOOR,
            max_slope: SPAWN_MAX_SLOPE,
            slope_probe: SPAWN_SLOPE_PROBE,
            crater_probe_radius: CRATER_PROBE_RADIUS,
            crater_depth_threshold: CRATER_DEPTH_THRESHOLD,
            crater_spread_threshold: CRATER_SPREAD_THRESHOLD,
            min_clearance: MIN_CLEARANCE,
            building_clearance_scale: BUILDING_CLEARANCE_SCALE,
            tree_clearance_scale: TREE_CLEARANCE_SCALE,
            tall_obstacle_height: TALL_OBSTACLE_HEIGHT,
            clearance_ring_radius: CLEARANCE_RING_RADIUS,
            clearance_ring_margin: CLEARANCE_RING_MARGIN,
        }
    }
}

/// Complete engine configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub sampler: SamplerConfig,
    pub pose: PoseConfig,
    pub stability: StabilityConfig,
    pub movement: MovementConfig,
    pub obstacles: ObstacleConfig,
    pub projectile: ProjectileConfig,
    pub spawn: SpawnConfig,
}

impl EngineConfig {
    /// Parse and validate a JSON document
    pub fn from_json_str(json: &str) -> ConfigResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON file
    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let json = std::fs::read_to_string(path.as_ref())?;
        let config = Self::from_json_str(&json)?;
        log::debug!("Loaded engine config from {}", path.as_ref().display());
        Ok(config)
    }

    /// Load a config file, falling back to defaults when it is missing or bad
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        match Self::load(path.as_ref()) {
            Ok(config) => config,
            Err(e) => {
                log::warn!("Using default engine config ({})", e);
                Self::default()
            }
        }
    }

    pub fn to_json_pretty(&self) -> ConfigResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Reject values the engine cannot work with
    pub fn validate(&self) -> ConfigResult<()> {
        let finite = [
            ("sampler.radius", self.sampler.radius),
            ("sampler.center_weight", self.sampler.center_weight),
            ("sampler.edge_weight", self.sampler.edge_weight),
            ("pose.track_height_offset", self.pose.track_height_offset),
            ("pose.terrain_clearance", self.pose.terrain_clearance),
            ("pose.rank_decay", self.pose.rank_decay),
            ("pose.water_level", self.pose.water_level),
            ("stability.max_slope", self.stability.max_slope),
            ("stability.underwater_floor", self.stability.underwater_floor),
            ("stability.max_contact_spread", self.stability.max_contact_spread),
            ("projectile.max_speed_factor", self.projectile.max_speed_factor),
            ("projectile.crater_depth", self.projectile.crater_depth),
            ("spawn.underwater_floor", self.spawn.underwater_floor),
            ("spawn.max_slope", self.spawn.max_slope),
            ("spawn.crater_depth_threshold", self.spawn.crater_depth_threshold),
            ("spawn.crater_spread_threshold", self.spawn.crater_spread_threshold),
            ("spawn.min_clearance", self.spawn.min_clearance),
            ("spawn.tall_obstacle_height", self.spawn.tall_obstacle_height),
            ("spawn.clearance_ring_margin", self.spawn.clearance_ring_margin),
        ];
        for (name, value) in finite {
            if !value.is_finite() {
                return Err(ConfigError::Invalid(format!("{name} must be finite")));
            }
        }

        let positive = [
            ("movement.half_extent", self.movement.half_extent),
            ("obstacles.building_radius", self.obstacles.building_radius),
            ("obstacles.building_height", self.obstacles.building_height),
            ("obstacles.tree_radius", self.obstacles.tree_radius),
            ("obstacles.tree_height", self.obstacles.tree_height),
            ("projectile.reference_speed", self.projectile.reference_speed),
            ("projectile.crater_radius", self.projectile.crater_radius),
            ("spawn.slope_probe", self.spawn.slope_probe),
            ("spawn.crater_probe_radius", self.spawn.crater_probe_radius),
            ("spawn.clearance_ring_radius", self.spawn.clearance_ring_radius),
        ];
        for (name, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigError::Invalid(format!("{name} must be positive, got {value}")));
            }
        }

        if !(self.obstacles.refresh_interval.is_finite() && self.obstacles.refresh_interval >= 0.0)
        {
            return Err(ConfigError::Invalid(
                "obstacles.refresh_interval must be >= 0".to_string(),
            ));
        }

        let tilt = self.pose.max_tilt_deg;
        if !(tilt > 0.0 && tilt < 90.0) {
            return Err(ConfigError::Invalid(format!(
                "pose.max_tilt_deg must be in (0, 90), got {tilt}"
            )));
        }

        let smoothing = self.pose.angle_smoothing;
        if !(smoothing > 0.0 && smoothing <= 1.0) {
            return Err(ConfigError::Invalid(format!(
                "pose.angle_smoothing must be in (0, 1], got {smoothing}"
            )));
        }

        let weight_sum = self.sampler.center_weight + 4.0 * self.sampler.edge_weight;
        if (weight_sum - 1.0).abs() > 1e-3 {
            return Err(ConfigError::Invalid(format!(
                "robust sampler weights must sum to 1, got {weight_sum}"
            )));
        }

        Ok(())
    }
}
