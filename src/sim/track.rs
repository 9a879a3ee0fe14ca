//! Track contact geometry
//!
//! A tracked vehicle touches the ground along two treads. Each tread is
//! approximated by evenly spaced contact points from rear to front.

use glam::{Vec2, Vec3};

use crate::consts::MIN_TRACK_SAMPLES;
use crate::rotate_xz;
use crate::settings::VehicleGeometry;

/// World-space contact points of both tracks.
///
/// Index 0 is the rearmost point, the last index the frontmost. Pitch sign
/// depends on this ordering.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackFootprint {
    pub left: Vec<Vec2>,
    pub right: Vec<Vec2>,
}

impl TrackFootprint {
    /// Sample points for a vehicle at `position` (y ignored) facing `yaw`.
    ///
    /// Geometry with fewer than `MIN_TRACK_SAMPLES` samples yields an empty
    /// footprint, which the pose solver treats as level ground.
    pub fn compute(position: Vec3, yaw: f32, geometry: &VehicleGeometry) -> Self {
        let n = geometry.sample_count;
        if n < MIN_TRACK_SAMPLES {
            return Self {
                left: Vec::new(),
                right: Vec::new(),
            };
        }
        let center = Vec2::new(position.x, position.z);
        let half_sep = geometry.track_separation * 0.5;
        let half_len = geometry.track_length * 0.5;

        let along = |i: usize| -half_len + geometry.track_length * i as f32 / (n - 1) as f32;

        let left = (0..n)
            .map(|i| center + rotate_xz(Vec2::new(-half_sep, along(i)), yaw))
            .collect();
        let right = (0..n)
            .map(|i| center + rotate_xz(Vec2::new(half_sep, along(i)), yaw))
            .collect();

        Self { left, right }
    }

    pub fn len(&self) -> usize {
        self.left.len()
    }

    pub fn is_empty(&self) -> bool {
        self.left.is_empty() || self.right.is_empty()
    }

    /// All 2N points, left track first
    pub fn points(&self) -> impl Iterator<Item = Vec2> + '_ {
        self.left.iter().chain(self.right.iter()).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn test_footprint_counts_and_spacing() {
        let geometry = VehicleGeometry::medium();
        let fp = TrackFootprint::compute(Vec3::ZERO, 0.0, &geometry);
        assert_eq!(fp.left.len(), geometry.sample_count);
        assert_eq!(fp.right.len(), geometry.sample_count);

        let first = fp.left[0];
        let last = fp.left[geometry.sample_count - 1];
        assert!(((last - first).length() - geometry.track_length).abs() < 1e-4);
    }

    #[test]
    fn test_rear_to_front_ordering_at_zero_yaw() {
        let geometry = VehicleGeometry::medium();
        let fp = TrackFootprint::compute(Vec3::ZERO, 0.0, &geometry);
        // Forward is +Z at yaw 0
        for w in fp.left.windows(2) {
            assert!(w[1].y > w[0].y);
        }
        assert!((fp.left[0].y + geometry.track_length / 2.0).abs() < 1e-5);
    }

    #[test]
    fn test_tracks_are_offset_laterally() {
        let geometry = VehicleGeometry::medium();
        let fp = TrackFootprint::compute(Vec3::ZERO, 0.0, &geometry);
        assert!((fp.left[0].x + geometry.track_separation / 2.0).abs() < 1e-5);
        assert!((fp.right[0].x - geometry.track_separation / 2.0).abs() < 1e-5);
    }

    #[test]
    fn test_yaw_rotates_and_translates() {
        let geometry = VehicleGeometry::medium();
        let pos = Vec3::new(10.0, 3.0, -5.0);
        let fp = TrackFootprint::compute(pos, FRAC_PI_2, &geometry);
        // Facing +X: front of the track has larger x than the rear
        let n = geometry.sample_count;
        assert!(fp.left[n - 1].x > fp.left[0].x);
        // Centroid stays at the vehicle position
        let centroid: Vec2 = fp.points().sum::<Vec2>() / (2 * n) as f32;
        assert!((centroid - Vec2::new(10.0, -5.0)).length() < 1e-4);
    }

    #[test]
    fn test_too_few_samples_gives_empty_footprint() {
        for sample_count in [0, 1, 3] {
            let geometry = VehicleGeometry {
                sample_count,
                ..VehicleGeometry::medium()
            };
            let fp = TrackFootprint::compute(Vec3::ZERO, 0.3, &geometry);
            assert!(fp.is_empty());
            assert_eq!(fp.points().count(), 0);
        }
    }
}
