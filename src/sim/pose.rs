//! Terrain-following pose
//!
//! Turns sampled track heights into a resting height, pitch and roll.
//!
//! Each track is reduced to one height with a rank-weighted average: samples
//! are sorted highest first and weighted by `exp(-rank * k)`. A tread rests
//! on its high points, but low points still pull the result down a little so
//! the hull does not float over small dips.

use glam::Vec3;

use super::terrain::TerrainSampler;
use super::track::TrackFootprint;
use crate::deg;
use crate::settings::{PoseConfig, VehicleGeometry};

const EPSILON: f32 = 1e-6;

/// How a vehicle rests on the terrain at one position
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TerrainPose {
    /// Mean of the two track heights
    pub ground_height: f32,
    /// `ground_height + track_height_offset + terrain_clearance`
    pub ground_y: f32,
    pub is_underwater: bool,
    /// Largest height difference across the footprint per unit length
    pub slope: f32,
    pub left_track_height: f32,
    pub right_track_height: f32,
    /// Radians, positive when the rear contacts sit higher than the front
    pub pitch: f32,
    /// Radians, positive when the right track sits higher
    pub roll: f32,
    /// Max minus min over every contact sample
    pub contact_spread: f32,
}

impl TerrainPose {
    /// World position of the hull for a ground-plane position
    pub fn hull_position(&self, x: f32, z: f32) -> Vec3 {
        Vec3::new(x, self.ground_y, z)
    }
}

/// Weighted average favoring the highest samples
pub fn rank_weighted_average(samples: &[f32], decay: f32) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }
    let mut sorted = samples.to_vec();
    sorted.sort_by(|a, b| b.total_cmp(a));

    let mut weighted = 0.0;
    let mut total = 0.0;
    for (rank, h) in sorted.iter().enumerate() {
        let w = (-(rank as f32) * decay).exp();
        weighted += h * w;
        total += w;
    }
    if total > EPSILON { weighted / total } else { 0.0 }
}

/// Unclamped (pitch, roll) from front/rear and left/right height deltas.
///
/// `pitch_delta` is rear minus front, `roll_delta` right minus left.
/// Zero-length geometry yields a level angle instead of NaN.
pub fn contact_angles(pitch_delta: f32, roll_delta: f32, geometry: &VehicleGeometry) -> (f32, f32) {
    let pitch = if geometry.track_length > EPSILON && pitch_delta.is_finite() {
        pitch_delta.atan2(geometry.track_length)
    } else {
        0.0
    };
    let roll = if geometry.track_separation > EPSILON && roll_delta.is_finite() {
        roll_delta.atan2(geometry.track_separation)
    } else {
        0.0
    };
    (pitch, roll)
}

/// Solves [`TerrainPose`] for a vehicle footprint
#[derive(Debug, Clone, Copy)]
pub struct PoseSolver<'a> {
    config: &'a PoseConfig,
}

impl<'a> PoseSolver<'a> {
    pub fn new(config: &'a PoseConfig) -> Self {
        Self { config }
    }

    /// Sample the terrain under both tracks and solve the pose
    pub fn solve(
        &self,
        position: Vec3,
        yaw: f32,
        geometry: &VehicleGeometry,
        sampler: &TerrainSampler<'_>,
    ) -> TerrainPose {
        let footprint = TrackFootprint::compute(position, yaw, geometry);
        if footprint.is_empty() {
            return self.level(sampler.robust(position.x, position.z));
        }
        let left: Vec<f32> = footprint
            .left
            .iter()
            .map(|p| sampler.robust(p.x, p.y))
            .collect();
        let right: Vec<f32> = footprint
            .right
            .iter()
            .map(|p| sampler.robust(p.x, p.y))
            .collect();
        self.solve_heights(&left, &right, geometry)
    }

    /// Solve from per-track heights ordered rear to front
    pub fn solve_heights(&self, left: &[f32], right: &[f32], geometry: &VehicleGeometry) -> TerrainPose {
        let (Some(&left_rear), Some(&left_front), Some(&right_rear), Some(&right_front)) =
            (left.first(), left.last(), right.first(), right.last())
        else {
            return self.level(0.0);
        };

        let left_avg = rank_weighted_average(left, self.config.rank_decay);
        let right_avg = rank_weighted_average(right, self.config.rank_decay);
        let ground_height = (left_avg + right_avg) * 0.5;

        let roll_delta = right_avg - left_avg;
        let pitch_delta = (left_rear + right_rear) * 0.5 - (left_front + right_front) * 0.5;
        let (raw_pitch, raw_roll) = contact_angles(pitch_delta, roll_delta, geometry);

        let max_tilt = deg(self.config.max_tilt_deg);
        let pitch = raw_pitch.clamp(-max_tilt, max_tilt) * self.config.angle_smoothing;
        let roll = raw_roll.clamp(-max_tilt, max_tilt) * self.config.angle_smoothing;

        let span = geometry.track_separation.max(geometry.track_length);
        let slope = if span > EPSILON {
            roll_delta.abs().max(pitch_delta.abs()) / span
        } else {
            0.0
        };

        let (lo, hi) = left
            .iter()
            .chain(right.iter())
            .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), &h| (lo.min(h), hi.max(h)));

        TerrainPose {
            ground_height,
            ground_y: ground_height + self.config.track_height_offset + self.config.terrain_clearance,
            is_underwater: ground_height < self.config.water_level,
            slope,
            left_track_height: left_avg,
            right_track_height: right_avg,
            pitch,
            roll,
            contact_spread: hi - lo,
        }
    }

    /// Neutral pose resting at `ground_height`
    pub fn level(&self, ground_height: f32) -> TerrainPose {
        TerrainPose {
            ground_height,
            ground_y: ground_height + self.config.track_height_offset + self.config.terrain_clearance,
            is_underwater: ground_height < self.config.water_level,
            left_track_height: ground_height,
            right_track_height: ground_height,
            ..TerrainPose::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::SamplerConfig;
    use crate::sim::terrain::{FlatTerrain, FnTerrain};
    use proptest::prelude::*;

    fn solver_config() -> PoseConfig {
        PoseConfig::default()
    }

    #[test]
    fn test_flat_terrain_is_level_for_any_yaw() {
        let config = solver_config();
        let sampler_config = SamplerConfig::default();
        let terrain = FlatTerrain::new(3.0);
        let sampler = TerrainSampler::new(Some(&terrain), &sampler_config);
        let solver = PoseSolver::new(&config);
        let geometry = VehicleGeometry::medium();

        for yaw in [0.0, 0.7, 2.1, -1.3, 3.1] {
            let pose = solver.solve(Vec3::new(5.0, 0.0, -2.0), yaw, &geometry, &sampler);
            assert!(pose.pitch.abs() < 1e-6);
            assert!(pose.roll.abs() < 1e-6);
            let expected = 3.0 + config.track_height_offset + config.terrain_clearance;
            assert!((pose.ground_y - expected).abs() < 1e-5);
            assert!(!pose.is_underwater);
        }
    }

    #[test]
    fn test_roll_positive_when_right_higher() {
        let config = solver_config();
        let solver = PoseSolver::new(&config);
        let geometry = VehicleGeometry::medium();
        let h = 2.15 * deg(10.0).tan();
        let pose = solver.solve_heights(&[0.0; 6], &[h; 6], &geometry);
        assert!(pose.roll > 0.0);
        assert!(pose.pitch.abs() < 1e-6);
    }

    #[test]
    fn test_raw_roll_matches_literal_inputs() {
        let geometry = VehicleGeometry::medium();
        let (_, roll) = contact_angles(0.0, 0.379, &geometry);
        assert!((roll.to_degrees() - 10.0).abs() < 0.05);
    }

    #[test]
    fn test_smoothing_applied_after_clamp() {
        let config = solver_config();
        let solver = PoseSolver::new(&config);
        let geometry = VehicleGeometry::medium();
        let h = 2.15 * deg(10.0).tan();
        let pose = solver.solve_heights(&[0.0; 6], &[h; 6], &geometry);
        assert!((pose.roll.to_degrees() - 10.0 * config.angle_smoothing).abs() < 0.01);

        // Far past the clamp: 30 degrees, then smoothed
        let pose = solver.solve_heights(&[0.0; 6], &[50.0; 6], &geometry);
        assert!((pose.roll.to_degrees() - 30.0 * config.angle_smoothing).abs() < 0.01);
    }

    #[test]
    fn test_pitch_positive_when_rear_higher() {
        let config = solver_config();
        let solver = PoseSolver::new(&config);
        let geometry = VehicleGeometry::medium();
        let ramp = [1.0, 0.8, 0.6, 0.4, 0.2, 0.0];
        let pose = solver.solve_heights(&ramp, &ramp, &geometry);
        assert!(pose.pitch > 0.0);
        assert!(pose.roll.abs() < 1e-6);

        let climb = [0.0, 0.2, 0.4, 0.6, 0.8, 1.0];
        let pose = solver.solve_heights(&climb, &climb, &geometry);
        assert!(pose.pitch < 0.0);
    }

    #[test]
    fn test_pitch_sign_follows_world_slope() {
        let config = solver_config();
        let sampler_config = SamplerConfig::default();
        // Ground falls toward +Z, so a tank facing +Z has its rear higher
        let terrain = FnTerrain(|_: f32, z: f32| -0.2 * z);
        let sampler = TerrainSampler::new(Some(&terrain), &sampler_config);
        let solver = PoseSolver::new(&config);
        let pose = solver.solve(Vec3::ZERO, 0.0, &VehicleGeometry::medium(), &sampler);
        assert!(pose.pitch > 0.0);
    }

    #[test]
    fn test_rank_average_favors_high_points() {
        let avg = rank_weighted_average(&[0.0, 0.0, 0.0, 1.0], 0.5);
        assert!(avg > 0.25);
        assert!(avg < 1.0);
        assert_eq!(rank_weighted_average(&[], 0.5), 0.0);
        assert!((rank_weighted_average(&[2.0, 2.0, 2.0], 0.5) - 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_slope_and_spread() {
        let config = solver_config();
        let solver = PoseSolver::new(&config);
        let geometry = VehicleGeometry::medium();
        let pose = solver.solve_heights(&[0.0; 6], &[1.0; 6], &geometry);
        assert!((pose.slope - 1.0 / geometry.track_length).abs() < 1e-5);
        assert!((pose.contact_spread - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_degenerate_geometry_is_neutral() {
        let config = solver_config();
        let solver = PoseSolver::new(&config);
        let geometry = VehicleGeometry {
            track_length: 0.0,
            track_separation: 0.0,
            ..VehicleGeometry::medium()
        };
        let pose = solver.solve_heights(&[0.0, 5.0, 0.0, 1.0], &[3.0, 3.0, 3.0, 3.0], &geometry);
        assert_eq!(pose.pitch, 0.0);
        assert_eq!(pose.roll, 0.0);
        assert_eq!(pose.slope, 0.0);

        let pose = solver.solve_heights(&[], &[], &VehicleGeometry::medium());
        assert_eq!(pose.pitch, 0.0);
        assert_eq!(pose.roll, 0.0);
        assert!(pose.ground_y.is_finite());
    }

    #[test]
    fn test_sparse_track_geometry_is_neutral() {
        let config = solver_config();
        let sampler_config = SamplerConfig::default();
        let ramp = FnTerrain(|x: f32, z: f32| x * 0.3 + z * 0.2);
        let sampler = TerrainSampler::new(Some(&ramp), &sampler_config);
        let solver = PoseSolver::new(&config);

        for sample_count in [0, 2] {
            let geometry = VehicleGeometry {
                sample_count,
                ..VehicleGeometry::medium()
            };
            let pose = solver.solve(Vec3::new(4.0, 0.0, 4.0), 0.5, &geometry, &sampler);
            assert_eq!(pose.pitch, 0.0);
            assert_eq!(pose.roll, 0.0);
            assert_eq!(pose.slope, 0.0);
            assert!((pose.ground_height - sampler.robust(4.0, 4.0)).abs() < 1e-6);
        }
    }

    #[test]
    fn test_underwater_flag() {
        let config = solver_config();
        let solver = PoseSolver::new(&config);
        let low = config.water_level - 1.0;
        let pose = solver.solve_heights(&[low; 4], &[low; 4], &VehicleGeometry::light());
        assert!(pose.is_underwater);
    }

    proptest! {
        #[test]
        fn prop_angles_stay_clamped(
            left in proptest::collection::vec(-1.0e4f32..1.0e4, 4..12),
            right in proptest::collection::vec(-1.0e4f32..1.0e4, 4..12),
        ) {
            let config = PoseConfig::default();
            let solver = PoseSolver::new(&config);
            let pose = solver.solve_heights(&left, &right, &VehicleGeometry::medium());
            let limit = deg(config.max_tilt_deg) + 1e-5;
            prop_assert!(pose.pitch.abs() <= limit);
            prop_assert!(pose.roll.abs() <= limit);
            prop_assert!(pose.ground_y.is_finite());
        }
    }
}
