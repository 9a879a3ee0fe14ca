//! Effect dispatch
//!
//! After a collision is decided, its consequences (damage, particles,
//! sound, craters) are handed to collaborators outside the engine. Every
//! sink method defaults to a no-op, so a game without audio or particles
//! simply doesn't override them.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::projectile::{ImpactRecord, ImpactTarget};
use super::scene::{EntityHandle, ObstacleKind, Projectile};
use super::terrain::Terrain;

/// Particle effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParticleEffect {
    /// Shell hits a tank hull
    HullSparks,
    /// Shell hits a building or tree
    Debris,
    /// Shell hits the ground
    DirtBurst,
}

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SoundCue {
    TankHit,
    BuildingHit,
    TreeHit,
    GroundExplosion,
}

/// Receiver for collision side effects
pub trait EffectSink {
    fn spawn_particles(&mut self, _effect: ParticleEffect, _at: Vec3) {}
    fn play_sound(&mut self, _cue: SoundCue, _at: Vec3) {}
    fn damage_tank(&mut self, _tank: EntityHandle, _amount: i32) {}
    fn damage_obstacle(&mut self, _kind: ObstacleKind, _obstacle: EntityHandle, _amount: i32) {}
}

/// Sink that drops everything
#[derive(Debug, Clone, Copy, Default)]
pub struct NoEffects;

impl EffectSink for NoEffects {}

/// One recorded side effect
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EffectEvent {
    Particles(ParticleEffect, Vec3),
    Sound(SoundCue, Vec3),
    TankDamage(EntityHandle, i32),
    ObstacleDamage(ObstacleKind, EntityHandle, i32),
}

/// Sink that records effects in order, for replays and tests
#[derive(Debug, Clone, Default)]
pub struct EffectLog {
    pub events: Vec<EffectEvent>,
}

impl EffectLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total damage dealt to one tank
    pub fn tank_damage(&self, tank: EntityHandle) -> i32 {
        self.events
            .iter()
            .filter_map(|e| match e {
                EffectEvent::TankDamage(h, amount) if *h == tank => Some(*amount),
                _ => None,
            })
            .sum()
    }
}

impl EffectSink for EffectLog {
    fn spawn_particles(&mut self, effect: ParticleEffect, at: Vec3) {
        self.events.push(EffectEvent::Particles(effect, at));
    }

    fn play_sound(&mut self, cue: SoundCue, at: Vec3) {
        self.events.push(EffectEvent::Sound(cue, at));
    }

    fn damage_tank(&mut self, tank: EntityHandle, amount: i32) {
        self.events.push(EffectEvent::TankDamage(tank, amount));
    }

    fn damage_obstacle(&mut self, kind: ObstacleKind, obstacle: EntityHandle, amount: i32) {
        self.events.push(EffectEvent::ObstacleDamage(kind, obstacle, amount));
    }
}

/// Apply a resolved impact and retire the projectile.
///
/// Damage goes out first, then cosmetic effects. Craters are requested
/// from the terrain when one is present.
pub fn dispatch_impact(
    record: &ImpactRecord,
    projectile: &mut Projectile,
    terrain: Option<&mut (dyn Terrain + '_)>,
    sink: &mut dyn EffectSink,
) {
    let at = record.impact_point;
    match record.target {
        ImpactTarget::Tank(handle) => {
            if let Some(amount) = record.damage {
                sink.damage_tank(handle, amount);
            }
            sink.spawn_particles(ParticleEffect::HullSparks, at);
            sink.play_sound(SoundCue::TankHit, at);
        }
        ImpactTarget::Static { kind, handle } => {
            if let Some(amount) = record.damage {
                sink.damage_obstacle(kind, handle, amount);
            }
            sink.spawn_particles(ParticleEffect::Debris, at);
            let cue = match kind {
                ObstacleKind::Building => SoundCue::BuildingHit,
                ObstacleKind::Tree => SoundCue::TreeHit,
            };
            sink.play_sound(cue, at);
        }
        ImpactTarget::Terrain => {
            if let (Some(crater), Some(terrain)) = (record.crater, terrain) {
                terrain.deform(crater.center, crater.radius, crater.depth);
            }
            sink.spawn_particles(ParticleEffect::DirtBurst, at);
            sink.play_sound(SoundCue::GroundExplosion, at);
        }
    }
    projectile.should_be_removed = true;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::projectile::CraterSpec;
    use crate::sim::scene::Allegiance;
    use crate::sim::terrain::HeightGrid;

    fn shell() -> Projectile {
        Projectile::new(1, Vec3::ZERO, Vec3::X, Allegiance::Player)
    }

    #[test]
    fn test_tank_impact_damages_then_effects() {
        let record = ImpactRecord {
            target: ImpactTarget::Tank(EntityHandle(4)),
            impact_point: Vec3::ONE,
            impact_angle: Some(0.0),
            damage: Some(18),
            crater: None,
        };
        let mut projectile = shell();
        let mut log = EffectLog::new();
        dispatch_impact(&record, &mut projectile, None, &mut log);

        assert!(projectile.should_be_removed);
        assert_eq!(log.events[0], EffectEvent::TankDamage(EntityHandle(4), 18));
        assert_eq!(log.events.len(), 3);
        assert_eq!(log.tank_damage(EntityHandle(4)), 18);
    }

    #[test]
    fn test_terrain_impact_digs_crater() {
        let mut grid = HeightGrid::centered(20.0, 0.5, 0.0);
        let record = ImpactRecord {
            target: ImpactTarget::Terrain,
            impact_point: Vec3::ZERO,
            impact_angle: None,
            damage: None,
            crater: Some(CraterSpec {
                center: Vec3::ZERO,
                radius: 3.0,
                depth: 1.0,
            }),
        };
        let mut projectile = shell();
        dispatch_impact(&record, &mut projectile, Some(&mut grid), &mut NoEffects);
        assert!(projectile.should_be_removed);
        assert!((grid.height_at(0.0, 0.0) + 1.0).abs() < 1e-4);
    }

    #[test]
    fn test_missing_terrain_and_sinks_are_tolerated() {
        let record = ImpactRecord {
            target: ImpactTarget::Terrain,
            impact_point: Vec3::ZERO,
            impact_angle: None,
            damage: None,
            crater: Some(CraterSpec {
                center: Vec3::ZERO,
                radius: 3.0,
                depth: 1.0,
            }),
        };
        let mut projectile = shell();
        dispatch_impact(&record, &mut projectile, None, &mut NoEffects);
        assert!(projectile.should_be_removed);
    }

    #[test]
    fn test_static_impact_sound_by_kind() {
        let record = ImpactRecord {
            target: ImpactTarget::Static {
                kind: ObstacleKind::Tree,
                handle: EntityHandle(2),
            },
            impact_point: Vec3::ZERO,
            impact_angle: None,
            damage: Some(25),
            crater: None,
        };
        let mut log = EffectLog::new();
        dispatch_impact(&record, &mut shell(), None, &mut log);
        assert!(log.events.contains(&EffectEvent::Sound(SoundCue::TreeHit, Vec3::ZERO)));
        assert!(log
            .events
            .contains(&EffectEvent::ObstacleDamage(ObstacleKind::Tree, EntityHandle(2), 25)));
    }
}
