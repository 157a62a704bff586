//! Headless симуляция PROWL
//!
//! Owned loop без рендера: цель бродит (seeded RNG), hostile агенты
//! обнаруживают её, преследуют и атакуют.
//!
//! Usage: `prowl_simulation [config.ron]`

use bevy::prelude::*;
use rand::Rng;

use prowl_simulation::{
    init_logger, log_error, log_info, BlockingMask, DeterministicRng, NavAgent, ObstacleField, PlayerTarget,
    SimEvent, Simulation, SimulationConfig, TargetConfig,
};

const TICKS: u32 = 1000;

fn load_config() -> SimulationConfig {
    let Some(path) = std::env::args().nth(1) else {
        return SimulationConfig::default();
    };

    let parsed = std::fs::read_to_string(&path)
        .map_err(|e| e.to_string())
        .and_then(|text| SimulationConfig::from_ron(&text).map_err(|e| e.to_string()));

    match parsed {
        Ok(config) => config,
        Err(e) => {
            log_error(&format!("❌ Failed to load config '{}': {}, using defaults", path, e));
            SimulationConfig::default()
        }
    }
}

/// Пара укрытий между стартовыми позициями.
fn arena() -> ObstacleField {
    let mut field = ObstacleField::new();
    field
        .add_box(Vec3::new(3.0, 0.0, -1.5), Vec3::new(4.0, 2.5, 1.5), BlockingMask::layer(0))
        .add_box(Vec3::new(-6.0, 0.0, 2.0), Vec3::new(-5.0, 2.5, 5.0), BlockingMask::layer(0));
    field
}

fn main() {
    init_logger();

    let mut config = load_config();
    if let Err(e) = config.target.validate() {
        log_error(&format!("❌ Invalid target config: {}, using defaults", e));
        config.target = TargetConfig::default();
    }
    let delta = config.tick_delta();
    log_info(&format!(
        "Starting PROWL headless simulation (seed: {}, {} agents)",
        config.seed,
        config.agents.len()
    ));

    let mut rng = DeterministicRng::new(config.seed);
    let target_entity = Entity::from_raw(0);
    let target_start = Vec3::from_array(config.target.position);

    let mut simulation = Simulation::new(
        PlayerTarget::new(target_entity, target_start, config.target.max_health),
        Box::new(arena()),
    );

    for preset in &config.agents {
        let position = Vec3::from_array(preset.position);
        let facing = (target_start - position).try_normalize().unwrap_or(Vec3::NEG_Z);
        simulation.spawn_named(
            preset.name.clone(),
            preset.config.clone(),
            position,
            facing,
            Some(Box::new(NavAgent::new(position))),
        );
    }

    // Цель бродит: новая точка каждые 2 секунды
    let mut wander_goal = target_start;
    let mut target_position = target_start;
    let wander_speed = 1.5;

    for tick in 0..TICKS {
        if tick % 120 == 0 {
            wander_goal = Vec3::new(
                rng.rng.gen_range(-10.0..10.0),
                0.0,
                rng.rng.gen_range(-10.0..10.0),
            );
        }
        let to_goal = wander_goal - target_position;
        let step = wander_speed * delta;
        target_position += to_goal.clamp_length_max(step);
        simulation.set_target_position(target_position);

        simulation.update(delta);

        for event in simulation.drain_events() {
            if let SimEvent::TargetDied { killer, at } = event {
                log_info(&format!("🏁 Target killed by {:?} at {:.2}s", killer, at));
            }
        }

        if tick % 100 == 0 {
            log_info(&format!(
                "Tick {}: {} agents, target health {:?}",
                tick,
                simulation.agent_count(),
                simulation.target_health()
            ));
        }
    }

    log_info("Simulation complete!");
}
