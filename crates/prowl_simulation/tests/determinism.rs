//! Тесты детерминизма
//!
//! Одинаковый seed → идентичные результаты (owned loop и ECS)

use bevy::prelude::*;
use prowl_simulation::*;
use rand::Rng;

/// Цель бродит по seeded RNG: новая точка каждые 90 тиков
fn wander(rng: &mut DeterministicRng, tick: u32, goal: &mut Vec3, position: Vec3, step: f32) -> Vec3 {
    if tick % 90 == 0 {
        *goal = Vec3::new(rng.rng.gen_range(-8.0..8.0), 0.0, rng.rng.gen_range(-8.0..8.0));
    }
    position + (*goal - position).clamp_length_max(step)
}

fn arena() -> ObstacleField {
    let mut field = ObstacleField::new();
    field.add_box(Vec3::new(2.0, 0.0, -1.0), Vec3::new(3.0, 2.0, 1.0), BlockingMask::ALL);
    field
}

/// Owned loop: возвращает лог событий в Debug форме
fn run_owned(seed: u64, ticks: u32) -> String {
    let delta = 1.0 / 60.0;
    let mut rng = DeterministicRng::new(seed);
    let mut sim = Simulation::new(
        PlayerTarget::new(Entity::from_raw(0), Vec3::ZERO, 100.0),
        Box::new(arena()),
    );

    for position in [Vec3::new(6.0, 0.0, 0.0), Vec3::new(-5.0, 0.0, 4.0), Vec3::new(0.0, 0.0, -9.0)] {
        sim.spawn_hostile(
            AgentConfig::default(),
            position,
            Vec3::NEG_Z,
            Some(Box::new(NavAgent::new(position))),
        );
    }

    let mut goal = Vec3::ZERO;
    let mut target_position = Vec3::ZERO;
    let mut log = String::new();

    for tick in 0..ticks {
        target_position = wander(&mut rng, tick, &mut goal, target_position, 2.0 * delta);
        sim.set_target_position(target_position);
        sim.update(delta);
        for event in sim.drain_events() {
            log.push_str(&format!("{tick}: {event:?}\n"));
        }
    }

    for id in sim.agent_ids() {
        log.push_str(&format!("{:?} @ {:?}\n", id, sim.agent_position(id)));
    }
    log
}

#[derive(Resource, Default)]
struct WanderState {
    tick: u32,
    goal: Vec3,
}

fn wander_target(
    mut rng: ResMut<DeterministicRng>,
    mut state: ResMut<WanderState>,
    mut targets: Query<&mut Transform, With<PursuitTarget>>,
) {
    let WanderState { tick, goal } = &mut *state;
    for mut transform in targets.iter_mut() {
        transform.translation = wander(&mut rng, *tick, goal, transform.translation, 2.0 / 60.0);
    }
    *tick += 1;
}

/// ECS прогон: snapshot hostile агентов и здоровья цели
fn run_ecs(seed: u64, ticks: u32) -> (Vec<u8>, Vec<u8>) {
    let mut app = create_headless_app(seed);
    app.add_plugins(SimulationPlugin)
        .insert_resource(arena())
        .init_resource::<WanderState>()
        .add_systems(FixedUpdate, wander_target.before(tick_hostiles));
    app.update();

    app.world_mut().spawn((
        PursuitTarget,
        TargetVitals::new(100.0),
        Transform::default(),
    ));
    {
        let mut commands = app.world_mut().commands();
        for position in [Vec3::new(6.0, 0.0, 0.0), Vec3::new(-5.0, 0.0, 4.0), Vec3::new(1.5, 0.0, 0.0)] {
            spawn_hostile_entity(&mut commands, "grunt", AgentConfig::default(), position, Vec3::NEG_X);
        }
    }
    app.world_mut().flush();

    for _ in 0..ticks {
        app.update();
    }

    (
        world_snapshot::<Hostile>(app.world_mut()),
        world_snapshot::<TargetVitals>(app.world_mut()),
    )
}

#[test]
fn test_owned_loop_same_seed() {
    const SEED: u64 = 12345;

    let first = run_owned(SEED, 900);
    let second = run_owned(SEED, 900);

    assert!(!first.is_empty());
    assert_eq!(first, second, "Симуляция с одинаковым seed ({}) дала разные результаты!", SEED);
}

#[test]
fn test_owned_loop_multiple_runs() {
    let runs: Vec<_> = (0..4).map(|_| run_owned(42, 600)).collect();

    for (i, run) in runs.iter().enumerate().skip(1) {
        assert_eq!(runs[0], *run, "Прогон {} дал результат отличный от прогона 0", i);
    }
}

#[test]
fn test_ecs_same_seed() {
    const SEED: u64 = 7;

    let (hostiles1, vitals1) = run_ecs(SEED, 600);
    let (hostiles2, vitals2) = run_ecs(SEED, 600);

    assert!(!hostiles1.is_empty());
    assert_eq!(hostiles1, hostiles2);
    assert_eq!(vitals1, vitals2);
}
