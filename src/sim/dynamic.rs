//! Per-frame snapshot of moving entities

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::collision::{CircleContact, circle_overlap};
use super::scene::{Allegiance, EntityHandle, Projectile, TankSnapshot};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DynamicKind {
    Tank,
    Projectile,
}

/// A live tank or projectile for the current frame
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DynamicEntity {
    pub kind: DynamicKind,
    pub handle: EntityHandle,
    /// Tanks: hull body center. Projectiles: shell center.
    pub position: Vec3,
    pub radius: f32,
    pub allegiance: Allegiance,
}

/// Rebuilt every frame; nothing survives between rebuilds
#[derive(Debug, Clone, Default)]
pub struct DynamicCollisionIndex {
    entities: Vec<DynamicEntity>,
}

impl DynamicCollisionIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_scene(tanks: &[TankSnapshot], projectiles: &[Projectile]) -> Self {
        let mut index = Self::new();
        index.rebuild(tanks, projectiles);
        index
    }

    /// Replace the snapshot. Destroyed tanks and resolved projectiles are left out.
    pub fn rebuild(&mut self, tanks: &[TankSnapshot], projectiles: &[Projectile]) {
        self.entities.clear();
        self.entities.extend(tanks.iter().filter(|t| !t.destroyed).map(|t| DynamicEntity {
            kind: DynamicKind::Tank,
            handle: t.handle,
            position: t.body_center(),
            radius: t.geometry.collision_radius,
            allegiance: t.allegiance,
        }));
        self.entities.extend(
            projectiles
                .iter()
                .filter(|p| !p.should_be_removed)
                .map(|p| DynamicEntity {
                    kind: DynamicKind::Projectile,
                    handle: p.handle,
                    position: p.position,
                    radius: p.radius,
                    allegiance: p.fired_by,
                }),
        );
    }

    pub fn entities(&self) -> &[DynamicEntity] {
        &self.entities
    }

    pub fn tanks(&self) -> impl Iterator<Item = &DynamicEntity> {
        self.entities.iter().filter(|e| e.kind == DynamicKind::Tank)
    }

    pub fn projectiles(&self) -> impl Iterator<Item = &DynamicEntity> {
        self.entities.iter().filter(|e| e.kind == DynamicKind::Projectile)
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Deepest ground-plane overlap with any other live tank.
    ///
    /// `mover` is excluded so a tank never collides with itself.
    pub fn check_tanks(
        &self,
        position: Vec3,
        radius: f32,
        mover: EntityHandle,
    ) -> Option<(DynamicEntity, CircleContact)> {
        let mut best: Option<(DynamicEntity, CircleContact)> = None;
        for tank in self.tanks().filter(|t| t.handle != mover) {
            if let Some(contact) = circle_overlap(position, radius, tank.position, tank.radius) {
                let deeper = best
                    .as_ref()
                    .map(|(_, b)| contact.penetration > b.penetration)
                    .unwrap_or(true);
                if deeper {
                    best = Some((*tank, contact));
                }
            }
        }
        best
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::VehicleClass;

    fn tanks() -> Vec<TankSnapshot> {
        vec![
            TankSnapshot::new(1, Vec3::ZERO, VehicleClass::Medium, Allegiance::Player),
            TankSnapshot::new(2, Vec3::new(4.0, 0.0, 0.0), VehicleClass::Medium, Allegiance::Enemy),
            TankSnapshot {
                destroyed: true,
                ..TankSnapshot::new(3, Vec3::new(-3.0, 0.0, 0.0), VehicleClass::Medium, Allegiance::Enemy)
            },
        ]
    }

    #[test]
    fn test_rebuild_excludes_destroyed_and_removed() {
        let mut shell = Projectile::new(10, Vec3::ZERO, Vec3::X, Allegiance::Player);
        let live = shell.clone();
        shell.should_be_removed = true;
        let index = DynamicCollisionIndex::from_scene(&tanks(), &[live, shell]);
        assert_eq!(index.tanks().count(), 2);
        assert_eq!(index.projectiles().count(), 1);
        assert_eq!(index.len(), 3);
    }

    #[test]
    fn test_check_tanks_excludes_mover() {
        let index = DynamicCollisionIndex::from_scene(&tanks(), &[]);
        // Tank 1 staying put overlaps only itself: no hit
        let radius = VehicleClass::Medium.geometry().collision_radius;
        assert!(index.check_tanks(Vec3::new(-1.0, 0.0, 0.0), radius, EntityHandle(1)).is_none());

        // Moving next to tank 2
        let (other, contact) = index
            .check_tanks(Vec3::new(1.0, 0.0, 0.0), radius, EntityHandle(1))
            .unwrap();
        assert_eq!(other.handle, EntityHandle(2));
        assert!(contact.direction.x < 0.0);
    }

    #[test]
    fn test_destroyed_tank_is_not_an_obstacle() {
        let index = DynamicCollisionIndex::from_scene(&tanks(), &[]);
        let radius = VehicleClass::Medium.geometry().collision_radius;
        // Tank 1 driving right on top of destroyed tank 3
        assert!(index.check_tanks(Vec3::new(-3.0, 0.0, 0.0), radius, EntityHandle(1)).is_none());
    }
}
