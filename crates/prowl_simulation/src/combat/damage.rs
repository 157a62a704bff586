//! Damage / death события и системы hostile агентов.
//!
//! Входящий урон по агентам приходит событием `HostileDamaged` (от оружия
//! игрока, ловушек и т.п.). Смерть: маркер `Dead`, collider выключается,
//! `DespawnAfter` удаляет труп через removal_delay. `HostileReset` отменяет
//! всё это и возвращает агента в строй.

use bevy::prelude::*;
use bevy_rapier3d::prelude::ColliderDisabled;

use crate::ai::PursuitDelegate;
use crate::combat::health::DamageOutcome;
use crate::components::{Hostile, MovementCommand, NavigationState};

/// Событие: урон нанесен
///
/// Генерируется после применения damage к здоровью (агента или цели).
/// Используется для UI, звуков, эффектов.
#[derive(Event, Debug, Clone, PartialEq)]
pub struct DamageDealt {
    /// `None` — источник неизвестен (окружение)
    pub attacker: Option<Entity>,
    pub target: Entity,
    pub damage: f32,
    pub target_died: bool,
}

/// Событие: entity умер (health <= 0), ровно один раз за жизнь
#[derive(Event, Debug, Clone, PartialEq)]
pub struct EntityDied {
    pub entity: Entity,
    pub killer: Option<Entity>,
}

/// Запрос: нанести урон hostile агенту.
#[derive(Event, Debug, Clone, PartialEq)]
pub struct HostileDamaged {
    pub hostile: Entity,
    pub amount: f32,
    pub source: Option<Entity>,
}

/// Запрос: вернуть hostile агента к жизни (object pool reuse).
#[derive(Event, Debug, Clone, PartialEq)]
pub struct HostileReset {
    pub hostile: Entity,
}

/// Компонент-маркер: entity мертв
///
/// Мёртвые агенты не тикают; entity живёт до `DespawnAfter`.
#[derive(Component, Debug)]
pub struct Dead;

/// Компонент-маркер: деспавн entity после указанного времени
///
/// Система `despawn_after_timeout` проверяет время и удаляет entity.
#[derive(Component, Debug)]
pub struct DespawnAfter {
    /// Время деспавна (в секундах от старта симуляции)
    pub despawn_time: f32,
}

/// Система: применение `HostileDamaged` к агентам
///
/// 1. Урон → `HostileAgent::take_damage` (clamp, смерть ровно один раз)
/// 2. DamageDealt для каждого применённого урона
/// 3. При смерти: Dead + ColliderDisabled + DespawnAfter, EntityDied
pub fn apply_hostile_damage(
    mut commands: Commands,
    mut requests: EventReader<HostileDamaged>,
    mut hostiles: Query<(
        &mut Hostile,
        Option<&mut NavigationState>,
        Option<&mut MovementCommand>,
    )>,
    mut damage_dealt_events: EventWriter<DamageDealt>,
    mut entity_died_events: EventWriter<EntityDied>,
    time: Res<Time>,
) {
    let now = time.elapsed_secs();

    for request in requests.read() {
        let Ok((mut hostile, mut navigation, command)) = hostiles.get_mut(request.hostile) else {
            crate::log_warning(&format!(
                "⚠️ HostileDamaged: {:?} is not a hostile agent",
                request.hostile
            ));
            continue;
        };

        let pursuit = navigation
            .as_deref_mut()
            .map(|nav| nav as &mut dyn PursuitDelegate);
        let outcome = hostile.agent.take_damage(request.amount, now, pursuit);

        if outcome == DamageOutcome::Ignored {
            continue;
        }

        damage_dealt_events.write(DamageDealt {
            attacker: request.source,
            target: request.hostile,
            damage: request.amount,
            target_died: outcome.is_death(),
        });

        if outcome.is_death() {
            if let Some(mut command) = command {
                *command = MovementCommand::Idle;
            }

            let despawn_time = hostile.agent.removal_time().unwrap_or(now);
            commands
                .entity(request.hostile)
                .insert((Dead, ColliderDisabled, DespawnAfter { despawn_time }));

            entity_died_events.write(EntityDied {
                entity: request.hostile,
                killer: request.source,
            });
        }
    }
}

/// Система: reset hostile агентов
///
/// Полное здоровье, Idle, cooldown сброшен; маркеры смерти снимаются,
/// collider снова включён, деспавн отменён.
pub fn reset_hostiles(
    mut commands: Commands,
    mut requests: EventReader<HostileReset>,
    mut hostiles: Query<(
        &mut Hostile,
        Option<&mut NavigationState>,
        Option<&mut MovementCommand>,
    )>,
) {
    for request in requests.read() {
        let Ok((mut hostile, mut navigation, command)) = hostiles.get_mut(request.hostile) else {
            crate::log_warning(&format!(
                "⚠️ HostileReset: {:?} is not a hostile agent",
                request.hostile
            ));
            continue;
        };

        let pursuit = navigation
            .as_deref_mut()
            .map(|nav| nav as &mut dyn PursuitDelegate);
        hostile.agent.reset(pursuit);

        if let Some(mut command) = command {
            *command = MovementCommand::default();
        }

        commands
            .entity(request.hostile)
            .remove::<(Dead, ColliderDisabled, DespawnAfter)>();
    }
}

/// Система: деспавн entities с истёкшим DespawnAfter timeout
pub fn despawn_after_timeout(
    mut commands: Commands,
    query: Query<(Entity, &DespawnAfter)>,
    time: Res<Time>,
) {
    let current_time = time.elapsed_secs();

    for (entity, despawn_after) in query.iter() {
        if current_time >= despawn_after.despawn_time {
            crate::log(&format!("⚰️ Despawning entity {:?} (timeout)", entity));
            commands.entity(entity).despawn();
        }
    }
}
