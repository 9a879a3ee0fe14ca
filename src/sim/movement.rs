//! Move validation
//!
//! Checks run in a fixed order and the first failure wins:
//! boundary, terrain pose, static obstacles, other tanks, stability.
//! The pose solve never rejects; it supplies the adjusted height and tilt
//! the later checks and the caller use.

use glam::Vec3;

use super::collision::{CollisionOutcome, WorldView};
use super::pose::{PoseSolver, TerrainPose};
use super::scene::{EntityHandle, TankSnapshot};
use super::stability::evaluate_stability;
use crate::settings::{EngineConfig, VehicleGeometry};

/// A tank asking to occupy a new position
#[derive(Debug, Clone, Copy)]
pub struct MoveRequest<'a> {
    pub mover: EntityHandle,
    /// Candidate ground-plane position (y ignored)
    pub position: Vec3,
    pub yaw: f32,
    pub geometry: &'a VehicleGeometry,
}

impl<'a> MoveRequest<'a> {
    pub fn for_tank(tank: &'a TankSnapshot, position: Vec3, yaw: f32) -> Self {
        Self {
            mover: tank.handle,
            position,
            yaw,
            geometry: &tank.geometry,
        }
    }
}

/// Decision for one move request
#[derive(Debug, Clone, PartialEq)]
pub struct MoveCheck {
    pub outcome: CollisionOutcome,
    /// Solved pose, absent only for out-of-bounds candidates
    pub pose: Option<TerrainPose>,
}

impl MoveCheck {
    pub fn is_allowed(&self) -> bool {
        !self.outcome.is_blocked()
    }

    /// Hull position to use when the move is allowed
    pub fn adjusted_position(&self, candidate: Vec3) -> Option<Vec3> {
        match (&self.outcome, &self.pose) {
            (CollisionOutcome::None, Some(pose)) => Some(pose.hull_position(candidate.x, candidate.z)),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct MovementValidator<'a> {
    config: &'a EngineConfig,
}

impl<'a> MovementValidator<'a> {
    pub fn new(config: &'a EngineConfig) -> Self {
        Self { config }
    }

    pub fn in_bounds(&self, position: Vec3) -> bool {
        let half = self.config.movement.half_extent;
        position.x.abs() <= half && position.z.abs() <= half
    }

    pub fn validate(&self, request: &MoveRequest<'_>, world: &WorldView<'_>) -> MoveCheck {
        let p = request.position;

        if !self.in_bounds(p) {
            log::trace!("Move of {:?} rejected: out of bounds at {:?}", request.mover, p);
            return MoveCheck {
                outcome: CollisionOutcome::Boundary,
                pose: None,
            };
        }

        let pose = PoseSolver::new(&self.config.pose).solve(p, request.yaw, request.geometry, &world.terrain);
        let radius = request.geometry.collision_radius;

        let outcome = if let Some((obstacle, contact)) = world.statics.check_circle(p, radius) {
            CollisionOutcome::Static {
                obstacle,
                penetration: contact.penetration,
                direction: contact.direction,
            }
        } else if let Some((entity, contact)) = world.dynamics.check_tanks(p, radius, request.mover) {
            CollisionOutcome::Dynamic {
                entity,
                penetration: contact.penetration,
                direction: contact.direction,
            }
        } else if let Some(reason) =
            evaluate_stability(&pose, world.terrain.simple(p.x, p.z), &self.config.stability)
        {
            CollisionOutcome::Unstable { reason }
        } else {
            CollisionOutcome::None
        };

        if outcome.is_blocked() {
            log::trace!("Move of {:?} rejected: {}", request.mover, outcome.label());
        }

        MoveCheck {
            outcome,
            pose: Some(pose),
        }
    }
}
