//! Collision and terrain-following simulation
//!
//! Everything here is deterministic and renderer-free:
//! - Queries read a per-frame snapshot and never mutate the scene
//! - Effects leave through [`EffectSink`] and [`Terrain::deform`] only
//! - Stable iteration order (insertion order of the source lists)
//! - Seeded RNG only (spawn search)

pub mod collision;
pub mod dynamic;
pub mod effects;
pub mod engine;
pub mod movement;
pub mod obstacles;
pub mod pose;
pub mod projectile;
pub mod scene;
pub mod spawn;
pub mod stability;
pub mod terrain;
pub mod track;

pub use collision::{CircleContact, CollisionOutcome, WorldView, circle_overlap};
pub use dynamic::{DynamicCollisionIndex, DynamicEntity, DynamicKind};
pub use effects::{EffectEvent, EffectLog, EffectSink, NoEffects, ParticleEffect, SoundCue, dispatch_impact};
pub use engine::CollisionEngine;
pub use movement::{MoveCheck, MoveRequest, MovementValidator};
pub use obstacles::{StaticCollisionIndex, StaticObstacle};
pub use pose::{PoseSolver, TerrainPose};
pub use projectile::{CraterSpec, ImpactRecord, ImpactTarget, ProjectileResolver};
pub use scene::{Allegiance, EntityHandle, ObstacleKind, ObstacleRecord, Projectile, TankSnapshot};
pub use spawn::{SpawnPlacementValidator, SpawnPoint, SpawnRejection};
pub use stability::{UnstableReason, evaluate_stability};
pub use terrain::{FlatTerrain, FnTerrain, HeightGrid, Terrain, TerrainSampler};
pub use track::TrackFootprint;
