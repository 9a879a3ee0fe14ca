//! Projectile collision resolution
//!
//! Targets are checked in a fixed priority order and the first hit wins:
//! tanks, then static obstacles, then the terrain surface.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::collision::WorldView;
use super::dynamic::DynamicEntity;
use super::obstacles::StaticObstacle;
use super::scene::{EntityHandle, ObstacleKind, Projectile};
use crate::horizontal_distance;
use crate::settings::{EngineConfig, ProjectileConfig};

/// What a projectile struck
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ImpactTarget {
    Tank(EntityHandle),
    Static { kind: ObstacleKind, handle: EntityHandle },
    Terrain,
}

/// Terrain deformation request for a ground hit
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CraterSpec {
    pub center: Vec3,
    pub radius: f32,
    pub depth: f32,
}

/// One resolved hit, consumed by effect dispatch and then dropped
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImpactRecord {
    pub target: ImpactTarget,
    pub impact_point: Vec3,
    /// Radians between the flight direction and the line to the target (tanks only)
    pub impact_angle: Option<f32>,
    pub damage: Option<i32>,
    pub crater: Option<CraterSpec>,
}

/// Angle between a velocity and the direction from `from` to `to`
pub fn impact_angle(velocity: Vec3, from: Vec3, to: Vec3) -> f32 {
    let flight = velocity.normalize_or_zero();
    let toward = (to - from).normalize_or_zero();
    flight.dot(toward).clamp(-1.0, 1.0).acos()
}

/// Scale base damage by hit directness and speed.
///
/// `base * (0.7 + 0.3 * cos(angle)) * clamp(speed / reference, 0, max_factor)`,
/// rounded to the nearest integer.
pub fn impact_damage(base: f32, angle: f32, speed: f32, config: &ProjectileConfig) -> i32 {
    let directness = 0.7 + 0.3 * angle.cos();
    let speed_factor = if config.reference_speed > 0.0 {
        (speed / config.reference_speed).clamp(0.0, config.max_speed_factor)
    } else {
        0.0
    };
    (base * directness * speed_factor).round() as i32
}

#[derive(Debug, Clone, Copy)]
pub struct ProjectileResolver<'a> {
    config: &'a EngineConfig,
}

impl<'a> ProjectileResolver<'a> {
    pub fn new(config: &'a EngineConfig) -> Self {
        Self { config }
    }

    /// Classify this frame's collision, if any
    pub fn resolve(&self, projectile: &Projectile, world: &WorldView<'_>) -> Option<ImpactRecord> {
        if projectile.should_be_removed {
            return None;
        }
        let record = self
            .tank_hit(projectile, world)
            .or_else(|| self.static_hit(projectile, world))
            .or_else(|| self.terrain_hit(projectile, world));
        if let Some(record) = &record {
            log::trace!(
                "Projectile {:?} hit {:?} at {:?}",
                projectile.handle,
                record.target,
                record.impact_point
            );
        }
        record
    }

    fn tank_hit(&self, projectile: &Projectile, world: &WorldView<'_>) -> Option<ImpactRecord> {
        let p = projectile.position;
        let target = world
            .dynamics
            .tanks()
            .filter(|t| projectile.fired_by.targets(t.allegiance))
            .map(|t| (t, p.distance(t.position)))
            .filter(|(t, dist)| *dist < t.radius + projectile.radius)
            .fold(None::<(&DynamicEntity, f32)>, |best, (t, dist)| match best {
                Some((_, best_dist)) if best_dist <= dist => best,
                _ => Some((t, dist)),
            })
            .map(|(t, _)| *t)?;

        let center = target.position;
        let outward = (p - center).normalize_or_zero();
        let mut impact_point = center + outward * target.radius;
        impact_point.y = center.y;

        let angle = impact_angle(projectile.velocity, p, center);
        let damage = impact_damage(
            projectile.damage,
            angle,
            projectile.velocity.length(),
            &self.config.projectile,
        );

        Some(ImpactRecord {
            target: ImpactTarget::Tank(target.handle),
            impact_point,
            impact_angle: Some(angle),
            damage: Some(damage),
            crater: None,
        })
    }

    fn static_hit(&self, projectile: &Projectile, world: &WorldView<'_>) -> Option<ImpactRecord> {
        let p = projectile.position;
        let r = projectile.radius;
        let hit = |o: &&StaticObstacle| {
            horizontal_distance(p, o.position) < o.radius + r
                && p.y >= o.position.y - r
                && p.y <= o.top() + r
        };
        let obstacle = world.statics.obstacles().iter().find(hit)?;

        Some(ImpactRecord {
            target: ImpactTarget::Static {
                kind: obstacle.kind,
                handle: obstacle.handle,
            },
            impact_point: p,
            impact_angle: None,
            damage: Some(projectile.damage.round() as i32),
            crater: None,
        })
    }

    fn terrain_hit(&self, projectile: &Projectile, world: &WorldView<'_>) -> Option<ImpactRecord> {
        let p = projectile.position;
        let ground = world.terrain.simple(p.x, p.z);
        if p.y > ground + projectile.radius {
            return None;
        }
        let impact_point = Vec3::new(p.x, ground, p.z);
        Some(ImpactRecord {
            target: ImpactTarget::Terrain,
            impact_point,
            impact_angle: None,
            damage: None,
            crater: Some(CraterSpec {
                center: impact_point,
                radius: self.config.projectile.crater_radius,
                depth: self.config.projectile.crater_depth,
            }),
        })
    }
}
