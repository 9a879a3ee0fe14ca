//! Static obstacle index
//!
//! A flat list of buildings and trees rebuilt wholesale from the scene.
//! Object counts are small, so every query is a linear scan.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::collision::{CircleContact, circle_overlap};
use super::scene::{EntityHandle, ObstacleKind, ObstacleRecord};
use crate::settings::ObstacleConfig;

/// An immovable obstacle with resolved radius and height
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StaticObstacle {
    pub kind: ObstacleKind,
    pub handle: EntityHandle,
    pub position: Vec3,
    pub radius: f32,
    pub height: f32,
}

impl StaticObstacle {
    /// Resolve defaults for a scene record
    pub fn from_record(record: &ObstacleRecord, config: &ObstacleConfig) -> Self {
        let (default_radius, default_height) = match record.kind {
            ObstacleKind::Building => (config.building_radius, config.building_height),
            ObstacleKind::Tree => (config.tree_radius, config.tree_height),
        };
        Self {
            kind: record.kind,
            handle: record.handle,
            position: record.position,
            radius: record.radius.filter(|r| *r > 0.0).unwrap_or(default_radius),
            height: record.height.filter(|h| *h > 0.0).unwrap_or(default_height),
        }
    }

    /// World y of the obstacle's top
    pub fn top(&self) -> f32 {
        self.position.y + self.height
    }
}

#[derive(Debug, Clone, Default)]
pub struct StaticCollisionIndex {
    obstacles: Vec<StaticObstacle>,
    /// Time of the last rebuild (seconds, caller's clock)
    last_refresh: Option<f32>,
}

impl StaticCollisionIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build an index from scratch
    pub fn from_records(records: &[ObstacleRecord], config: &ObstacleConfig) -> Self {
        let mut index = Self::new();
        index.rebuild(records, config);
        index
    }

    /// Replace the whole index, skipping destroyed obstacles
    pub fn rebuild(&mut self, records: &[ObstacleRecord], config: &ObstacleConfig) {
        self.obstacles.clear();
        self.obstacles.extend(
            records
                .iter()
                .filter(|r| !r.destroyed)
                .map(|r| StaticObstacle::from_record(r, config)),
        );
        log::debug!(
            "Static index rebuilt: {} obstacles ({} destroyed skipped)",
            self.obstacles.len(),
            records.len() - self.obstacles.len()
        );
    }

    /// Rebuild if `refresh_interval` has passed since the last rebuild.
    ///
    /// Returns true when a rebuild happened.
    pub fn refresh(&mut self, now: f32, records: &[ObstacleRecord], config: &ObstacleConfig) -> bool {
        let due = match self.last_refresh {
            None => true,
            Some(last) => now - last >= config.refresh_interval || now < last,
        };
        if due {
            self.rebuild(records, config);
            self.last_refresh = Some(now);
        }
        due
    }

    /// Force the next `refresh` to rebuild
    pub fn invalidate(&mut self) {
        self.last_refresh = None;
    }

    pub fn obstacles(&self) -> &[StaticObstacle] {
        &self.obstacles
    }

    pub fn len(&self) -> usize {
        self.obstacles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.obstacles.is_empty()
    }

    /// Deepest overlap between a circle and any obstacle.
    ///
    /// Equal penetrations resolve to the obstacle listed first.
    pub fn check_circle(&self, position: Vec3, radius: f32) -> Option<(StaticObstacle, CircleContact)> {
        let mut best: Option<(StaticObstacle, CircleContact)> = None;
        for obstacle in &self.obstacles {
            if let Some(contact) = circle_overlap(position, radius, obstacle.position, obstacle.radius) {
                let deeper = best
                    .as_ref()
                    .map(|(_, b)| contact.penetration > b.penetration)
                    .unwrap_or(true);
                if deeper {
                    best = Some((*obstacle, contact));
                }
            }
        }
        best
    }
}
