//! Spawn placement
//!
//! A one-off suitability check run when a tank is created, separate from
//! per-frame movement validation. All checks are pure predicates over the
//! current scene, so callers can retry candidates in a loop.

use std::f32::consts::TAU;

use glam::{Vec2, Vec3};
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::obstacles::{StaticCollisionIndex, StaticObstacle};
use super::pose::{PoseSolver, TerrainPose};
use super::scene::{EntityHandle, ObstacleKind};
use super::terrain::TerrainSampler;
use crate::settings::{EngineConfig, VehicleGeometry};
use crate::{flatten, horizontal_distance};

/// Samples on the crater and clearance rings
const RING_SAMPLES: usize = 8;

/// Why a spawn candidate was refused
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SpawnRejection {
    OutOfBounds,
    Underwater,
    TooSteep,
    InCrater,
    /// Inside the footprint of a tall obstacle
    UnderObstacle(EntityHandle),
    TooCloseToObstacle(EntityHandle),
    /// A point on the clearance ring is too close to this obstacle
    Cluttered(EntityHandle),
}

impl SpawnRejection {
    pub fn code(&self) -> &'static str {
        match self {
            SpawnRejection::OutOfBounds => "out_of_bounds",
            SpawnRejection::Underwater => "underwater",
            SpawnRejection::TooSteep => "too_steep",
            SpawnRejection::InCrater => "in_crater",
            SpawnRejection::UnderObstacle(_) => "under_obstacle",
            SpawnRejection::TooCloseToObstacle(_) => "too_close_to_obstacle",
            SpawnRejection::Cluttered(_) => "cluttered",
        }
    }
}

/// An accepted spawn location
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpawnPoint {
    /// Hull position with y at the solved ground_y
    pub position: Vec3,
    pub pose: TerrainPose,
}

fn ring_point(center: Vec2, radius: f32, i: usize) -> Vec2 {
    let angle = TAU * i as f32 / RING_SAMPLES as f32;
    center + Vec2::new(angle.cos(), angle.sin()) * radius
}

#[derive(Debug, Clone, Copy)]
pub struct SpawnPlacementValidator<'a> {
    config: &'a EngineConfig,
}

impl<'a> SpawnPlacementValidator<'a> {
    pub fn new(config: &'a EngineConfig) -> Self {
        Self { config }
    }

    /// Horizontal distance an obstacle must keep from a spawn point
    pub fn required_clearance(&self, obstacle: &StaticObstacle) -> f32 {
        let spawn = &self.config.spawn;
        let scale = match obstacle.kind {
            ObstacleKind::Building => spawn.building_clearance_scale,
            ObstacleKind::Tree => spawn.tree_clearance_scale,
        };
        spawn.min_clearance + obstacle.radius * scale
    }

    pub fn is_suitable(
        &self,
        candidate: Vec3,
        terrain: &TerrainSampler<'_>,
        statics: &StaticCollisionIndex,
    ) -> bool {
        self.evaluate(candidate, terrain, statics).is_ok()
    }

    /// Run every spawn check; the first failure is returned
    pub fn evaluate(
        &self,
        candidate: Vec3,
        terrain: &TerrainSampler<'_>,
        statics: &StaticCollisionIndex,
    ) -> Result<(), SpawnRejection> {
        let spawn = &self.config.spawn;
        let c = flatten(candidate);

        let limit = self.config.movement.half_extent - spawn.edge_margin;
        if c.x.abs() > limit || c.y.abs() > limit {
            return Err(SpawnRejection::OutOfBounds);
        }

        let center = terrain.simple(c.x, c.y);
        if center < spawn.underwater_floor {
            return Err(SpawnRejection::Underwater);
        }

        let d = spawn.slope_probe;
        let dx = terrain.simple(c.x + d, c.y) - terrain.simple(c.x - d, c.y);
        let dz = terrain.simple(c.x, c.y + d) - terrain.simple(c.x, c.y - d);
        if dx.abs().max(dz.abs()) / (2.0 * d) > spawn.max_slope {
            return Err(SpawnRejection::TooSteep);
        }

        if self.in_crater(c, center, terrain) {
            return Err(SpawnRejection::InCrater);
        }

        // Footprint first so the more specific reason wins
        for obstacle in statics.obstacles() {
            if obstacle.height >= spawn.tall_obstacle_height
                && horizontal_distance(candidate, obstacle.position) < obstacle.radius
            {
                return Err(SpawnRejection::UnderObstacle(obstacle.handle));
            }
        }

        for obstacle in statics.obstacles() {
            if horizontal_distance(candidate, obstacle.position) < self.required_clearance(obstacle) {
                return Err(SpawnRejection::TooCloseToObstacle(obstacle.handle));
            }
        }

        for i in 0..RING_SAMPLES {
            let p = ring_point(c, spawn.clearance_ring_radius, i);
            let probe = Vec3::new(p.x, 0.0, p.y);
            if let Some(obstacle) = statics.obstacles().iter().find(|o| {
                horizontal_distance(probe, o.position) < o.radius + spawn.clearance_ring_margin
            }) {
                return Err(SpawnRejection::Cluttered(obstacle.handle));
            }
        }

        Ok(())
    }

    /// Ring average well above the center, or a ragged rim
    fn in_crater(&self, c: Vec2, center: f32, terrain: &TerrainSampler<'_>) -> bool {
        let spawn = &self.config.spawn;
        let ring: Vec<f32> = (0..RING_SAMPLES)
            .map(|i| {
                let p = ring_point(c, spawn.crater_probe_radius, i);
                terrain.simple(p.x, p.y)
            })
            .collect();
        let avg = ring.iter().sum::<f32>() / RING_SAMPLES as f32;
        let (lo, hi) = ring
            .iter()
            .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), &h| (lo.min(h), hi.max(h)));
        avg - center > spawn.crater_depth_threshold || hi - lo > spawn.crater_spread_threshold
    }

    /// Draw random candidates until one passes.
    ///
    /// Deterministic for a given RNG state.
    pub fn find_spawn_point<R: Rng>(
        &self,
        rng: &mut R,
        attempts: u32,
        geometry: &VehicleGeometry,
        terrain: &TerrainSampler<'_>,
        statics: &StaticCollisionIndex,
    ) -> Option<SpawnPoint> {
        let limit = self.config.movement.half_extent - self.config.spawn.edge_margin;
        if limit <= 0.0 {
            return None;
        }
        for attempt in 0..attempts {
            let candidate = Vec3::new(
                rng.random_range(-limit..=limit),
                0.0,
                rng.random_range(-limit..=limit),
            );
            match self.evaluate(candidate, terrain, statics) {
                Ok(()) => {
                    let pose = PoseSolver::new(&self.config.pose).solve(candidate, 0.0, geometry, terrain);
                    log::debug!(
                        "Spawn found at ({:.1}, {:.1}) after {} attempts",
                        candidate.x,
                        candidate.z,
                        attempt + 1
                    );
                    return Some(SpawnPoint {
                        position: pose.hull_position(candidate.x, candidate.z),
                        pose,
                    });
                }
                Err(reason) => log::trace!("Spawn candidate rejected: {}", reason.code()),
            }
        }
        log::debug!("No spawn point found in {} attempts", attempts);
        None
    }
}
