//! Hostile agent и отслеживаемая цель.

use bevy::prelude::*;

use crate::agent::HostileAgent;
use crate::config::AgentConfig;

/// Hostile агент в ECS мире.
///
/// Вся логика (perception FSM, combat gate, health) живёт в `HostileAgent`;
/// компонент только привязывает его к entity.
#[derive(Component, Debug, Clone)]
pub struct Hostile {
    pub agent: HostileAgent,
}

impl Hostile {
    pub fn new(name: impl Into<String>, config: AgentConfig) -> Self {
        Self {
            agent: HostileAgent::new(name, config),
        }
    }
}

/// Направление "вперёд" агента (world space).
///
/// Нет компонента → используется `Transform::forward()`.
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct Facing(pub Vec3);

impl Default for Facing {
    fn default() -> Self {
        Self(Vec3::NEG_Z)
    }
}

/// Маркер: цель, которую преследуют hostile агенты (игрок).
///
/// Здоровье цели — опциональный `TargetVitals` на той же entity.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct PursuitTarget;
