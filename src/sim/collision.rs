//! Collision classification
//!
//! Every overlap test in the engine is circle-vs-circle on the ground plane.
//! The result of a move check is a single [`CollisionOutcome`] variant.

use glam::Vec3;

use super::dynamic::{DynamicCollisionIndex, DynamicEntity};
use super::obstacles::{StaticCollisionIndex, StaticObstacle};
use super::stability::UnstableReason;
use super::terrain::TerrainSampler;
use crate::horizontal_distance;

/// Overlap between two circles
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CircleContact {
    /// `combined_radius - center_distance`, always positive
    pub penetration: f32,
    /// Unit vector on the ground plane from the other center toward the candidate
    pub direction: Vec3,
}

/// Check two ground-plane circles for overlap.
///
/// Touching circles (distance exactly equal to the combined radius) do not
/// collide.
pub fn circle_overlap(
    candidate: Vec3,
    candidate_radius: f32,
    other: Vec3,
    other_radius: f32,
) -> Option<CircleContact> {
    let dist = horizontal_distance(candidate, other);
    let combined = candidate_radius + other_radius;
    if dist < combined {
        Some(CircleContact {
            penetration: combined - dist,
            direction: separation_direction(other, candidate),
        })
    } else {
        None
    }
}

/// Normalized ground-plane direction from `from` to `to`.
///
/// Coincident centers fall back to +X so callers always get a unit vector.
pub fn separation_direction(from: Vec3, to: Vec3) -> Vec3 {
    let d = Vec3::new(to.x - from.x, 0.0, to.z - from.z);
    let n = d.normalize_or_zero();
    if n == Vec3::ZERO { Vec3::X } else { n }
}

/// Result of validating a move
#[derive(Debug, Clone, PartialEq)]
pub enum CollisionOutcome {
    /// Move allowed
    None,
    /// Outside the playfield
    Boundary,
    Static {
        obstacle: StaticObstacle,
        penetration: f32,
        direction: Vec3,
    },
    Dynamic {
        entity: DynamicEntity,
        penetration: f32,
        direction: Vec3,
    },
    Unstable {
        reason: UnstableReason,
    },
}

impl CollisionOutcome {
    pub fn is_blocked(&self) -> bool {
        !matches!(self, CollisionOutcome::None)
    }

    /// Displacement that would separate the mover from what it hit
    pub fn push_back(&self) -> Option<Vec3> {
        match self {
            CollisionOutcome::Static {
                penetration,
                direction,
                ..
            }
            | CollisionOutcome::Dynamic {
                penetration,
                direction,
                ..
            } => Some(*direction * *penetration),
            _ => None,
        }
    }

    /// Short label for logs
    pub fn label(&self) -> &'static str {
        match self {
            CollisionOutcome::None => "none",
            CollisionOutcome::Boundary => "boundary",
            CollisionOutcome::Static { .. } => "static",
            CollisionOutcome::Dynamic { .. } => "dynamic",
            CollisionOutcome::Unstable { reason } => reason.code(),
        }
    }
}

/// Everything a query reads for one frame
#[derive(Clone, Copy)]
pub struct WorldView<'a> {
    pub terrain: TerrainSampler<'a>,
    pub statics: &'a StaticCollisionIndex,
    pub dynamics: &'a DynamicCollisionIndex,
}
