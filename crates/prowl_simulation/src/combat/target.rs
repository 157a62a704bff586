//! Tracked target (игрок) — внешний коллаборатор core.
//!
//! Core видит цель только через `TargetHandle`: позиция, identity для LOS
//! и опциональный damage sink. Владелец цели — gameplay слой.

use bevy::prelude::*;

use crate::combat::health::{DamageOutcome, HealthModel};

/// Принимает урон (здоровье цели или агента).
pub trait DamageSink {
    fn apply_damage(&mut self, amount: f32) -> DamageOutcome;
}

/// Read/command surface of the tracked target.
pub trait TargetHandle {
    /// Identity of the target body; surfaces owned by it never block LOS.
    fn entity(&self) -> Option<Entity>;

    fn position(&self) -> Vec3;

    /// `None` if the target cannot take damage (attack becomes a no-op).
    fn damage_sink(&mut self) -> Option<&mut dyn DamageSink>;
}

/// Здоровье цели (компонент для ECS, поле для owned loop).
///
/// Смерть цели логируется один раз; реакция на неё (game over и т.п.)
/// — забота gameplay слоя.
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct TargetVitals {
    pub health: HealthModel,
}

impl TargetVitals {
    pub fn new(max_health: f32) -> Self {
        Self {
            health: HealthModel::new(max_health),
        }
    }
}

impl Default for TargetVitals {
    fn default() -> Self {
        Self::new(100.0)
    }
}

impl DamageSink for TargetVitals {
    fn apply_damage(&mut self, amount: f32) -> DamageOutcome {
        let outcome = self.health.apply_damage(amount);

        match outcome {
            DamageOutcome::Wounded { remaining } => {
                crate::log(&format!(
                    "Target took {:.1} damage, health: {:.1}",
                    amount, remaining
                ));
            }
            DamageOutcome::Died => {
                crate::log_info("💀 Target died");
            }
            DamageOutcome::Ignored => {}
        }

        outcome
    }
}

/// Target owned by the in-process `Simulation`.
#[derive(Debug, Clone)]
pub struct PlayerTarget {
    pub entity: Entity,
    pub position: Vec3,
    /// `None` — цель без здоровья (атаки логируются и игнорируются)
    pub vitals: Option<TargetVitals>,
}

impl PlayerTarget {
    pub fn new(entity: Entity, position: Vec3, max_health: f32) -> Self {
        Self {
            entity,
            position,
            vitals: Some(TargetVitals::new(max_health)),
        }
    }

    /// Цель без damage sink.
    pub fn without_vitals(entity: Entity, position: Vec3) -> Self {
        Self {
            entity,
            position,
            vitals: None,
        }
    }
}

impl TargetHandle for PlayerTarget {
    fn entity(&self) -> Option<Entity> {
        Some(self.entity)
    }

    fn position(&self) -> Vec3 {
        self.position
    }

    fn damage_sink(&mut self) -> Option<&mut dyn DamageSink> {
        self.vitals.as_mut().map(|v| v as &mut dyn DamageSink)
    }
}
