//! tick_hostiles — perception → combat для всех живых агентов.
//!
//! LOS backend выбирается по доступности:
//! 1. `ObstacleField` resource (headless / тесты)
//! 2. Rapier context (`ReadRapierContext`)
//! 3. ни того, ни другого → `Blindfold` (никого не видно)
//!
//! Тело самого агента его видимость не блокирует.
//!
//! Урон по цели применяется через один exclusive borrow `TargetVitals`,
//! агенты обрабатываются последовательно.

use bevy::prelude::*;
use bevy_rapier3d::prelude::ReadRapierContext;

use crate::agent::AgentTickContext;
use crate::ai::events::PerceptionChanged;
use crate::ai::visibility::{Blindfold, ObstacleField, RapierLineOfSight, VisibilityProbe};
use crate::combat::damage::{DamageDealt, Dead, EntityDied};
use crate::combat::health::DamageOutcome;
use crate::combat::target::{DamageSink, TargetHandle, TargetVitals};
use crate::components::{Facing, Hostile, MovementCommand, NavigationState, PursuitTarget};

/// ECS view цели на время одного тика.
struct TargetView<'a> {
    entity: Entity,
    position: Vec3,
    vitals: Option<&'a mut TargetVitals>,
}

impl TargetHandle for TargetView<'_> {
    fn entity(&self) -> Option<Entity> {
        Some(self.entity)
    }

    fn position(&self) -> Vec3 {
        self.position
    }

    fn damage_sink(&mut self) -> Option<&mut dyn DamageSink> {
        self.vitals.as_deref_mut().map(|v| v as &mut dyn DamageSink)
    }
}

/// Система: тик всех живых hostile агентов
///
/// Порядок для каждого агента:
/// 1. perception FSM (команды в NavigationState)
/// 2. combat gate (урон по TargetVitals)
/// 3. NavigationState → MovementCommand
pub fn tick_hostiles(
    time: Res<Time>,
    obstacles: Option<Res<ObstacleField>>,
    rapier_context: ReadRapierContext,
    hierarchy: Query<&ChildOf>,
    mut targets: Query<
        (Entity, &Transform, Option<&mut TargetVitals>),
        (With<PursuitTarget>, Without<Hostile>),
    >,
    mut hostiles: Query<
        (
            Entity,
            &Transform,
            Option<&Facing>,
            &mut Hostile,
            &mut NavigationState,
            &mut MovementCommand,
        ),
        Without<Dead>,
    >,
    mut perception_events: EventWriter<PerceptionChanged>,
    mut damage_dealt_events: EventWriter<DamageDealt>,
    mut entity_died_events: EventWriter<EntityDied>,
) {
    let Ok((target_entity, target_transform, mut vitals)) = targets.single_mut() else {
        return;
    };
    let target_position = target_transform.translation;
    let rapier = rapier_context.single();
    let parent_of = |child: Entity| hierarchy.get(child).ok().map(ChildOf::parent);
    let now = time.elapsed_secs();

    for (entity, transform, facing, mut hostile, mut navigation, mut command) in hostiles.iter_mut() {
        let field_probe;
        let rapier_probe;
        let probe: &dyn VisibilityProbe = if let Some(field) = obstacles.as_deref() {
            field_probe = field.seen_by(entity);
            &field_probe
        } else if let Ok(context) = &rapier {
            rapier_probe = RapierLineOfSight::new(context, &parent_of).with_observer(entity);
            &rapier_probe
        } else {
            &Blindfold
        };

        let mut target = TargetView {
            entity: target_entity,
            position: target_position,
            vitals: vitals.as_deref_mut(),
        };

        let report = hostile.agent.tick(AgentTickContext {
            now,
            position: transform.translation,
            facing: facing.map(|f| f.0).unwrap_or_else(|| transform.forward().as_vec3()),
            target: &mut target,
            probe,
            pursuit: &mut *navigation,
        });

        if let Some(transition) = report.transition {
            perception_events.write(PerceptionChanged {
                hostile: entity,
                target: target_entity,
                from: transition.from,
                to: transition.to,
                distance: transition.distance,
            });
        }

        if let Some(landed) = report.attack {
            match landed.target_outcome {
                Some(DamageOutcome::Wounded { .. }) => {
                    damage_dealt_events.write(DamageDealt {
                        attacker: Some(entity),
                        target: target_entity,
                        damage: landed.damage,
                        target_died: false,
                    });
                }
                Some(DamageOutcome::Died) => {
                    damage_dealt_events.write(DamageDealt {
                        attacker: Some(entity),
                        target: target_entity,
                        damage: landed.damage,
                        target_died: true,
                    });
                    entity_died_events.write(EntityDied {
                        entity: target_entity,
                        killer: Some(entity),
                    });
                }
                Some(DamageOutcome::Ignored) | None => {}
            }
        }

        // Change detection: пишем команду только при изменении
        let next = navigation.command();
        if *command != next {
            *command = next;
        }
    }
}
