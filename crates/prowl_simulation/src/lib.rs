//! PROWL Simulation Core
//!
//! Hostile агенты: perception FSM (Idle ⇄ Detected с гистерезисом),
//! LOS raycast, преследование через внешнюю навигацию, melee gate
//! (дистанция + конус + cooldown), здоровье со смертью ровно один раз.
//!
//! Два driver'а одного и того же `HostileAgent`:
//! - `Simulation` — owned loop с явным `update(delta)` (headless, тесты)
//! - `HostilePlugin` — ECS системы в FixedUpdate (Bevy 0.16)

use std::time::Duration;

use bevy::prelude::*;
use bevy::time::TimeUpdateStrategy;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

// Публичные модули
pub mod agent;
pub mod ai;
pub mod combat;
pub mod components;
pub mod config;
pub mod debug;
pub mod geometry;
pub mod logger;
pub mod simulation;

#[cfg(test)]
mod agent_tests;

// Re-export базовых типов для удобства
pub use agent::{AgentStatus, AgentTickContext, HostileAgent, TickReport};
pub use ai::{
    tick_hostiles, BlockingMask, DetectionState, NavAgent, ObserverView, ObstacleField, PerceptionChanged,
    PursuitDelegate, RapierLineOfSight, SurfaceShape, VisibilityProbe,
};
pub use combat::{
    apply_hostile_damage, despawn_after_timeout, reset_hostiles, DamageDealt, DamageOutcome, Dead, DespawnAfter,
    EntityDied, HealthModel, HostileDamaged, HostileReset, PlayerTarget, TargetVitals,
};
pub use components::*;
pub use config::{AgentConfig, ConfigError, SimulationConfig, TargetConfig};
pub use logger::{
    init_logger, log, log_error, log_info, log_warning, log_with_level, set_log_level, set_logger,
    set_logger_if_needed, LogLevel, LogPrinter,
};
pub use simulation::{AgentId, SimEvent, Simulation};

/// Hostile AI plugin
///
/// Регистрирует события и системы в FixedUpdate для детерминизма.
/// Порядок выполнения:
/// 1. apply_hostile_damage — входящий урон, смерть агентов
/// 2. reset_hostiles — возврат агентов в строй
/// 3. tick_hostiles — perception → combat для живых агентов
/// 4. despawn_after_timeout — уборка трупов
pub struct HostilePlugin;

impl Plugin for HostilePlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<DamageDealt>()
            .add_event::<EntityDied>()
            .add_event::<HostileDamaged>()
            .add_event::<HostileReset>()
            .add_event::<PerceptionChanged>();

        app.add_systems(
            FixedUpdate,
            (
                apply_hostile_damage,
                reset_hostiles,
                tick_hostiles,
                despawn_after_timeout,
            )
                .chain(), // Последовательное выполнение
        );
    }
}

/// Главный plugin симуляции (объединяет все подсистемы)
pub struct SimulationPlugin;

impl Plugin for SimulationPlugin {
    fn build(&self, app: &mut App) {
        // Fixed timestep 60Hz для simulation tick
        app.insert_resource(Time::<Fixed>::from_hz(TICK_HZ));

        // Детерминистичный RNG (seed по умолчанию, если не задан снаружи)
        if !app.world().contains_resource::<DeterministicRng>() {
            app.insert_resource(DeterministicRng::new(42));
        }

        app.add_plugins(HostilePlugin);
    }
}

/// Детерминистичный RNG resource (seeded)
#[derive(Resource)]
pub struct DeterministicRng {
    pub rng: ChaCha8Rng,
    pub seed: u64,
}

impl DeterministicRng {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }
}

/// Частота simulation tick (FixedUpdate).
pub const TICK_HZ: f64 = 60.0;

/// Создаёт minimal Bevy App для headless симуляции
///
/// Время шагает вручную (не от wall clock): после первого `app.update()`
/// каждый следующий `update()` — ровно один FixedUpdate тик.
pub fn create_headless_app(seed: u64) -> App {
    let mut app = App::new();
    init_logger();
    app.add_plugins(MinimalPlugins)
        .insert_resource(DeterministicRng::new(seed))
        .insert_resource(Time::<Fixed>::from_hz(TICK_HZ)) // 60Hz FixedUpdate
        .insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_secs_f64(1.0 / TICK_HZ)));

    app
}

/// Spawn bundle для hostile агента в ECS.
pub fn spawn_hostile_entity(
    commands: &mut Commands,
    name: impl Into<String>,
    config: AgentConfig,
    position: Vec3,
    facing: Vec3,
) -> Entity {
    commands
        .spawn((
            Hostile::new(name, config),
            Transform::from_translation(position),
            Facing(facing),
            NavigationState::default(),
            MovementCommand::default(),
        ))
        .id()
}

/// Snapshot мира для сравнения детерминизма
pub fn world_snapshot<T: Component>(world: &mut World) -> Vec<u8>
where
    T: std::fmt::Debug,
{
    let mut snapshot = Vec::new();

    let mut query = world.query::<(Entity, &T)>();
    let mut entities: Vec<_> = query.iter(world).collect();

    // Сортируем по Entity ID для детерминизма
    entities.sort_by_key(|(entity, _)| entity.index());

    // Сериализуем в байты через Debug (простейший способ)
    for (entity, component) in entities {
        snapshot.extend_from_slice(&entity.index().to_le_bytes());
        snapshot.extend_from_slice(format!("{:?}", component).as_bytes());
    }

    snapshot
}
