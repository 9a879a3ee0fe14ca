//! Read-only scene snapshots handed to the engine each frame
//!
//! The game owns its tanks, projectiles and scenery. Before querying the
//! engine it copies the fields the engine needs into these plain structs,
//! so the engine never reaches into live game state.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::settings::{VehicleClass, VehicleGeometry};

/// Opaque id of a game object, chosen by the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityHandle(pub u32);

/// Which side an entity fights for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Allegiance {
    Player,
    Enemy,
}

impl Allegiance {
    /// True if a shot fired by `self` may hit a tank on `other`
    #[inline]
    pub fn targets(&self, other: Allegiance) -> bool {
        *self != other
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ObstacleKind {
    Building,
    Tree,
}

/// A building or tree as the scene reports it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObstacleRecord {
    pub handle: EntityHandle,
    pub kind: ObstacleKind,
    /// Base center; y is the ground height the obstacle stands on
    pub position: Vec3,
    /// Falls back to the per-kind default when unset
    #[serde(default)]
    pub radius: Option<f32>,
    #[serde(default)]
    pub height: Option<f32>,
    #[serde(default)]
    pub destroyed: bool,
}

impl ObstacleRecord {
    pub fn building(handle: u32, position: Vec3) -> Self {
        Self {
            handle: EntityHandle(handle),
            kind: ObstacleKind::Building,
            position,
            radius: None,
            height: None,
            destroyed: false,
        }
    }

    pub fn tree(handle: u32, position: Vec3) -> Self {
        Self {
            kind: ObstacleKind::Tree,
            ..Self::building(handle, position)
        }
    }

    pub fn with_radius(mut self, radius: f32) -> Self {
        self.radius = Some(radius);
        self
    }

    pub fn with_height(mut self, height: f32) -> Self {
        self.height = Some(height);
        self
    }
}

/// A tank as the engine sees it for one frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TankSnapshot {
    pub handle: EntityHandle,
    /// Ground-plane position; y is the hull's current ground_y
    pub position: Vec3,
    pub yaw: f32,
    pub geometry: VehicleGeometry,
    pub allegiance: Allegiance,
    pub destroyed: bool,
}

impl TankSnapshot {
    pub fn new(handle: u32, position: Vec3, class: VehicleClass, allegiance: Allegiance) -> Self {
        Self {
            handle: EntityHandle(handle),
            position,
            yaw: 0.0,
            geometry: class.geometry(),
            allegiance,
            destroyed: false,
        }
    }

    pub fn with_yaw(mut self, yaw: f32) -> Self {
        self.yaw = yaw;
        self
    }

    /// Center of the hull body used for hit tests
    pub fn body_center(&self) -> Vec3 {
        self.position + Vec3::Y * self.geometry.body_center_height
    }
}

/// A shell in flight
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Projectile {
    pub handle: EntityHandle,
    pub position: Vec3,
    pub velocity: Vec3,
    pub radius: f32,
    /// Base damage before angle and speed scaling
    pub damage: f32,
    pub fired_by: Allegiance,
    /// Set once the projectile has been resolved against something
    #[serde(default)]
    pub should_be_removed: bool,
}

impl Projectile {
    pub fn new(handle: u32, position: Vec3, velocity: Vec3, fired_by: Allegiance) -> Self {
        Self {
            handle: EntityHandle(handle),
            position,
            velocity,
            radius: 0.3,
            damage: 25.0,
            fired_by,
            should_be_removed: false,
        }
    }

    pub fn with_damage(mut self, damage: f32) -> Self {
        self.damage = damage;
        self
    }

    pub fn with_radius(mut self, radius: f32) -> Self {
        self.radius = radius;
        self
    }
}
