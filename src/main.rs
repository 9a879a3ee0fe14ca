//! Tank Terrain demo
//!
//! Builds a small battlefield, spawns two tanks, drives one across a hill
//! and lobs a shell at the other. Pass a JSON config path to override the
//! defaults. Run with `RUST_LOG=debug` for engine logs.

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Tank Terrain (native) starting...");

    let config = match std::env::args().nth(1) {
        Some(path) => tank_terrain::EngineConfig::load_or_default(path),
        None => tank_terrain::EngineConfig::default(),
    };
    demo::run(config);
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // Library-only on the web; the game drives the engine directly
}

#[cfg(not(target_arch = "wasm32"))]
mod demo {
    use glam::Vec3;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    use tank_terrain::sim::{
        Allegiance, CollisionEngine, EffectEvent, EffectLog, HeightGrid, MoveRequest, ObstacleRecord,
        Projectile, TankSnapshot,
    };
    use tank_terrain::{EngineConfig, VehicleClass};

    const SEED: u64 = 0x7A4C;
    const DT: f32 = 1.0 / 60.0;
    const GRAVITY: f32 = -9.81;

    /// Rolling hills with a lake in one corner
    fn battlefield() -> HeightGrid {
        HeightGrid::from_fn(200.0, 1.0, |x, z| {
            let hills = (x * 0.05).sin() * (z * 0.04).cos() * 3.0;
            let lake = -4.0 * (-((x + 60.0).powi(2) + (z + 60.0).powi(2)) / 400.0).exp();
            hills + lake
        })
    }

    fn obstacles() -> Vec<ObstacleRecord> {
        vec![
            ObstacleRecord::building(100, Vec3::new(25.0, 0.0, -30.0)),
            ObstacleRecord::building(101, Vec3::new(-35.0, 0.0, 40.0)).with_height(12.0),
            ObstacleRecord::tree(200, Vec3::new(5.0, 0.0, 12.0)),
            ObstacleRecord::tree(201, Vec3::new(-8.0, 0.0, -20.0)),
            ObstacleRecord::tree(202, Vec3::new(40.0, 0.0, 45.0)).with_radius(1.5),
        ]
    }

    pub fn run(config: EngineConfig) {
        let mut terrain = battlefield();
        let obstacles = obstacles();
        let mut engine = CollisionEngine::new(config);
        let mut rng = Pcg32::seed_from_u64(SEED);

        // Spawn
        engine.begin_frame(0.0, &obstacles, &[], &[]);
        let mut tanks = Vec::new();
        for (handle, class, side) in [
            (1, VehicleClass::Medium, Allegiance::Player),
            (2, VehicleClass::Heavy, Allegiance::Enemy),
        ] {
            let geometry = class.geometry();
            match engine.find_spawn(&mut rng, 200, &geometry, Some(&terrain)) {
                Some(point) => {
                    log::info!(
                        "Tank {} ({}) spawned at ({:.1}, {:.1}, {:.1})",
                        handle,
                        class.as_str(),
                        point.position.x,
                        point.position.y,
                        point.position.z
                    );
                    tanks.push(TankSnapshot::new(handle, point.position, class, side));
                }
                None => log::warn!("No spawn point for tank {}", handle),
            }
        }
        if tanks.len() < 2 {
            log::error!("Not enough tanks spawned, giving up");
            return;
        }

        // Drive the player toward the enemy until something blocks it
        let mut now = 0.0;
        let target = tanks[1].position;
        for step in 0..600 {
            now += DT;
            engine.begin_frame(now, &obstacles, &tanks, &[]);

            let tank = &tanks[0];
            let to_target = Vec3::new(target.x - tank.position.x, 0.0, target.z - tank.position.z);
            let yaw = to_target.x.atan2(to_target.z);
            let candidate = tank.position + to_target.normalize_or_zero() * 8.0 * DT;

            let check = engine.validate_move(&MoveRequest::for_tank(tank, candidate, yaw), Some(&terrain));
            match check.adjusted_position(candidate) {
                Some(adjusted) => {
                    tanks[0].position = adjusted;
                    tanks[0].yaw = yaw;
                }
                None => {
                    log::info!("Drive stopped after {} steps: {}", step, check.outcome.label());
                    if let Some(push) = check.outcome.push_back() {
                        log::info!("Suggested push back: ({:.2}, {:.2})", push.x, push.z);
                    }
                    break;
                }
            }
            if step % 120 == 0 {
                if let Some(pose) = check.pose {
                    log::info!(
                        "t={:.1}s pos=({:.1}, {:.1}) pitch={:.1}° roll={:.1}° slope={:.2}",
                        now,
                        tanks[0].position.x,
                        tanks[0].position.z,
                        pose.pitch.to_degrees(),
                        pose.roll.to_degrees(),
                        pose.slope
                    );
                }
            }
        }

        // Fire a ballistic shell from the player's turret at the enemy
        let muzzle = tanks[0].body_center() + Vec3::Y;
        let aim = tanks[1].body_center() - muzzle;
        let flight_time = (aim.length() / 40.0).max(0.5);
        let velocity = Vec3::new(
            aim.x / flight_time,
            (aim.y - 0.5 * GRAVITY * flight_time * flight_time) / flight_time,
            aim.z / flight_time,
        );
        let mut shells = vec![Projectile::new(1000, muzzle, velocity, Allegiance::Player)];
        let mut effects = EffectLog::new();

        for _ in 0..1200 {
            now += DT;
            for shell in shells.iter_mut().filter(|s| !s.should_be_removed) {
                shell.velocity.y += GRAVITY * DT;
                shell.position += shell.velocity * DT;
            }
            engine.begin_frame(now, &obstacles, &tanks, &shells);
            engine.step_projectiles(&mut shells, Some(&mut terrain), &mut effects);
            shells.retain(|s| !s.should_be_removed);
            if shells.is_empty() {
                break;
            }
        }

        for event in &effects.events {
            match event {
                EffectEvent::TankDamage(handle, amount) => {
                    log::info!("Tank {:?} took {} damage", handle, amount)
                }
                EffectEvent::ObstacleDamage(kind, handle, amount) => {
                    log::info!("{:?} {:?} took {} damage", kind, handle, amount)
                }
                EffectEvent::Sound(cue, at) => log::info!("Sound {:?} at {:.1?}", cue, at),
                EffectEvent::Particles(effect, at) => log::debug!("Particles {:?} at {:.1?}", effect, at),
            }
        }
        let dealt = effects.tank_damage(tanks[1].handle);
        if dealt > 0 {
            log::info!("Enemy tank took {} damage in total", dealt);
        }
        if effects.events.is_empty() {
            log::info!("Shell left the battlefield without hitting anything");
        }
    }
}
