//! Frame-level facade over the collision subsystems
//!
//! The engine owns the config and both indices. Callers feed it the scene
//! once per frame through [`CollisionEngine::begin_frame`], then issue
//! queries against that snapshot. Terrain is borrowed per call since the
//! game owns and deforms it.

use glam::Vec3;
use rand::Rng;

use super::collision::WorldView;
use super::dynamic::DynamicCollisionIndex;
use super::effects::{EffectSink, dispatch_impact};
use super::movement::{MoveCheck, MoveRequest, MovementValidator};
use super::obstacles::StaticCollisionIndex;
use super::pose::{PoseSolver, TerrainPose};
use super::projectile::{ImpactRecord, ProjectileResolver};
use super::scene::{ObstacleRecord, Projectile, TankSnapshot};
use super::spawn::{SpawnPlacementValidator, SpawnPoint, SpawnRejection};
use super::terrain::{Terrain, TerrainSampler};
use crate::error::ConfigResult;
use crate::settings::{EngineConfig, VehicleGeometry};

#[derive(Debug, Clone, Default)]
pub struct CollisionEngine {
    config: EngineConfig,
    statics: StaticCollisionIndex,
    dynamics: DynamicCollisionIndex,
}

impl CollisionEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            statics: StaticCollisionIndex::new(),
            dynamics: DynamicCollisionIndex::new(),
        }
    }

    /// Validate the config before taking ownership of it
    pub fn with_config(config: EngineConfig) -> ConfigResult<Self> {
        config.validate()?;
        Ok(Self::new(config))
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn statics(&self) -> &StaticCollisionIndex {
        &self.statics
    }

    pub fn dynamics(&self) -> &DynamicCollisionIndex {
        &self.dynamics
    }

    /// Snapshot the scene for this frame.
    ///
    /// Obstacles refresh on their own interval; tanks and projectiles are
    /// rebuilt every call.
    pub fn begin_frame(
        &mut self,
        now: f32,
        obstacles: &[ObstacleRecord],
        tanks: &[TankSnapshot],
        projectiles: &[Projectile],
    ) {
        self.statics.refresh(now, obstacles, &self.config.obstacles);
        self.dynamics.rebuild(tanks, projectiles);
    }

    /// Force a static rebuild on the next frame (e.g. after a building falls)
    pub fn invalidate_statics(&mut self) {
        self.statics.invalidate();
    }

    pub fn world<'a>(&'a self, terrain: Option<&'a dyn Terrain>) -> WorldView<'a> {
        WorldView {
            terrain: TerrainSampler::new(terrain, &self.config.sampler),
            statics: &self.statics,
            dynamics: &self.dynamics,
        }
    }

    pub fn validate_move(&self, request: &MoveRequest<'_>, terrain: Option<&dyn Terrain>) -> MoveCheck {
        MovementValidator::new(&self.config).validate(request, &self.world(terrain))
    }

    pub fn solve_pose(
        &self,
        position: Vec3,
        yaw: f32,
        geometry: &VehicleGeometry,
        terrain: Option<&dyn Terrain>,
    ) -> TerrainPose {
        let sampler = TerrainSampler::new(terrain, &self.config.sampler);
        PoseSolver::new(&self.config.pose).solve(position, yaw, geometry, &sampler)
    }

    pub fn resolve_projectile(
        &self,
        projectile: &Projectile,
        terrain: Option<&dyn Terrain>,
    ) -> Option<ImpactRecord> {
        ProjectileResolver::new(&self.config).resolve(projectile, &self.world(terrain))
    }

    /// Resolve and dispatch every live projectile in slice order.
    ///
    /// Each impact is fully applied (including any crater) before the next
    /// projectile is resolved. Returns the number of impacts.
    pub fn step_projectiles(
        &self,
        projectiles: &mut [Projectile],
        mut terrain: Option<&mut dyn Terrain>,
        sink: &mut dyn EffectSink,
    ) -> usize {
        let resolver = ProjectileResolver::new(&self.config);
        let mut impacts = 0;
        for projectile in projectiles.iter_mut() {
            let record = resolver.resolve(projectile, &self.world(terrain.as_deref()));
            if let Some(record) = record {
                dispatch_impact(&record, projectile, terrain.as_deref_mut(), sink);
                impacts += 1;
            }
        }
        if impacts > 0 {
            log::debug!("{} projectile impacts this frame", impacts);
        }
        impacts
    }

    pub fn check_spawn(&self, candidate: Vec3, terrain: Option<&dyn Terrain>) -> Result<(), SpawnRejection> {
        let sampler = TerrainSampler::new(terrain, &self.config.sampler);
        SpawnPlacementValidator::new(&self.config).evaluate(candidate, &sampler, &self.statics)
    }

    pub fn find_spawn<R: Rng>(
        &self,
        rng: &mut R,
        attempts: u32,
        geometry: &VehicleGeometry,
        terrain: Option<&dyn Terrain>,
    ) -> Option<SpawnPoint> {
        let sampler = TerrainSampler::new(terrain, &self.config.sampler);
        SpawnPlacementValidator::new(&self.config).find_spawn_point(rng, attempts, geometry, &sampler, &self.statics)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::VehicleClass;
    use crate::sim::collision::CollisionOutcome;
    use crate::sim::effects::{EffectEvent, EffectLog, NoEffects};
    use crate::sim::projectile::ImpactTarget;
    use crate::sim::scene::{Allegiance, EntityHandle};
    use crate::sim::terrain::HeightGrid;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn tanks() -> Vec<TankSnapshot> {
        vec![
            TankSnapshot::new(1, Vec3::new(-10.0, 0.0, 0.0), VehicleClass::Medium, Allegiance::Player),
            TankSnapshot::new(2, Vec3::new(10.0, 0.0, 0.0), VehicleClass::Heavy, Allegiance::Enemy),
        ]
    }

    #[test]
    fn test_begin_frame_throttles_statics() {
        let mut engine = CollisionEngine::default();
        let mut obstacles = vec![ObstacleRecord::building(5, Vec3::new(0.0, 0.0, 20.0))];
        engine.begin_frame(0.0, &obstacles, &tanks(), &[]);
        assert_eq!(engine.statics().len(), 1);
        assert_eq!(engine.dynamics().len(), 2);

        obstacles[0].destroyed = true;
        engine.begin_frame(0.1, &obstacles, &tanks(), &[]);
        assert_eq!(engine.statics().len(), 1);

        engine.begin_frame(0.6, &obstacles, &tanks(), &[]);
        assert!(engine.statics().is_empty());
    }

    #[test]
    fn test_invalidate_forces_rebuild() {
        let mut engine = CollisionEngine::default();
        let mut obstacles = vec![ObstacleRecord::tree(5, Vec3::ZERO)];
        engine.begin_frame(0.0, &obstacles, &[], &[]);
        obstacles[0].destroyed = true;
        engine.invalidate_statics();
        engine.begin_frame(0.01, &obstacles, &[], &[]);
        assert!(engine.statics().is_empty());
    }

    #[test]
    fn test_move_into_enemy_is_blocked() {
        let mut engine = CollisionEngine::default();
        let tanks = tanks();
        engine.begin_frame(0.0, &[], &tanks, &[]);
        let grid = HeightGrid::centered(60.0, 1.0, 0.0);

        let request = MoveRequest::for_tank(&tanks[0], Vec3::new(7.0, 0.0, 0.0), 0.0);
        let check = engine.validate_move(&request, Some(&grid));
        assert!(matches!(check.outcome, CollisionOutcome::Dynamic { .. }));
        assert!(check.outcome.push_back().unwrap().x < 0.0);

        let request = MoveRequest::for_tank(&tanks[0], Vec3::new(-12.0, 0.0, 3.0), 0.0);
        assert!(engine.validate_move(&request, Some(&grid)).is_allowed());
    }

    #[test]
    fn test_tank_hit_takes_priority_over_building() {
        let mut engine = CollisionEngine::default();
        let tanks = tanks();
        let obstacles = [ObstacleRecord::building(7, Vec3::new(13.0, 0.0, 0.0))];
        engine.begin_frame(0.0, &obstacles, &tanks, &[]);

        let shell = Projectile::new(9, Vec3::new(9.0, 1.2, 0.0), Vec3::X * 40.0, Allegiance::Player);
        let record = engine.resolve_projectile(&shell, None).unwrap();
        assert_eq!(record.target, ImpactTarget::Tank(EntityHandle(2)));
    }

    #[test]
    fn test_step_projectiles_digs_crater_and_retires_shell() {
        let mut engine = CollisionEngine::default();
        let mut grid = HeightGrid::centered(40.0, 0.5, 0.0);
        let mut shells = vec![
            Projectile::new(1, Vec3::new(0.0, 0.1, 0.0), Vec3::new(0.0, -30.0, 0.0), Allegiance::Enemy),
            Projectile::new(2, Vec3::new(5.0, 10.0, 5.0), Vec3::new(0.0, -30.0, 0.0), Allegiance::Enemy),
        ];
        engine.begin_frame(0.0, &[], &[], &shells);

        let mut log = EffectLog::new();
        let impacts = engine.step_projectiles(&mut shells, Some(&mut grid), &mut log);
        assert_eq!(impacts, 1);
        assert!(shells[0].should_be_removed);
        assert!(!shells[1].should_be_removed);
        assert!(grid.height_at(0.0, 0.0) < -0.9);
        assert!(matches!(log.events[0], EffectEvent::Particles(..)));

        // Retired shells are not resolved again
        assert_eq!(engine.step_projectiles(&mut shells[..1], Some(&mut grid), &mut NoEffects), 0);
    }

    #[test]
    fn test_spawn_through_engine() {
        let mut engine = CollisionEngine::default();
        engine.begin_frame(0.0, &[ObstacleRecord::building(1, Vec3::ZERO)], &[], &[]);
        assert_eq!(
            engine.check_spawn(Vec3::new(2.0, 0.0, 0.0), None),
            Err(SpawnRejection::UnderObstacle(EntityHandle(1)))
        );

        let geometry = VehicleGeometry::medium();
        let point = engine
            .find_spawn(&mut Pcg32::seed_from_u64(42), 100, &geometry, None)
            .unwrap();
        assert_eq!(engine.check_spawn(point.position, None), Ok(()));
        assert_eq!(point.pose, engine.solve_pose(point.position, 0.0, &geometry, None));
    }

    #[test]
    fn test_sparse_geometry_move_is_level() {
        let engine = CollisionEngine::default();
        let geometry = VehicleGeometry {
            sample_count: 0,
            ..VehicleGeometry::light()
        };
        let request = MoveRequest {
            mover: EntityHandle(1),
            position: Vec3::new(3.0, 0.0, 3.0),
            yaw: 0.0,
            geometry: &geometry,
        };
        let check = engine.validate_move(&request, None);
        assert!(check.is_allowed());
        assert_eq!(check.pose.unwrap().pitch, 0.0);
    }

    #[test]
    fn test_with_config_rejects_invalid() {
        let mut config = EngineConfig::default();
        config.stability.max_slope = f32::NAN;
        assert!(CollisionEngine::with_config(config).is_err());
        assert!(CollisionEngine::with_config(EngineConfig::default()).is_ok());
    }
}
