//! Combat gate — melee атака по конъюнкции условий.
//!
//! Атака проходит только если одновременно:
//! 1. cooldown истёк (`now >= last_attack_time + cooldown`)
//! 2. planar (XZ) дистанция до цели ≤ attack_range
//! 3. planar угол между facing и направлением на цель ≤ half angle
//!
//! Вызывается агентом только в состоянии Detected.

use bevy::prelude::*;

use crate::combat::health::DamageOutcome;
use crate::combat::target::TargetHandle;
use crate::config::AgentConfig;
use crate::geometry::{planar, planar_angle_deg, planar_distance};

/// Combat parameters (subset of `AgentConfig`).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GateConfig {
    pub attack_damage: f32,
    pub attack_range: f32,
    /// Допуск от facing (градусы), половина полного угла сектора
    pub cone_half_angle: f32,
    pub cooldown: f32,
}

impl From<&AgentConfig> for GateConfig {
    fn from(config: &AgentConfig) -> Self {
        Self {
            attack_damage: config.attack_damage,
            attack_range: config.attack_range,
            cone_half_angle: config.attack_cone_half_angle(),
            cooldown: config.attack_cooldown,
        }
    }
}

impl Default for GateConfig {
    fn default() -> Self {
        Self::from(&AgentConfig::default())
    }
}

/// Successful swing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AttackLanded {
    pub damage: f32,
    pub distance: f32,
    pub angle: f32,
    /// `None` — у цели нет damage sink (удар ушёл в пустоту)
    pub target_outcome: Option<DamageOutcome>,
}

/// Result of one gate evaluation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AttackVerdict {
    CoolingDown { ready_at: f32 },
    OutOfRange { distance: f32 },
    /// Facing вектор вырожден (нулевой в плоскости XZ)
    NoFacing,
    OutsideCone { angle: f32 },
    Landed(AttackLanded),
}

impl AttackVerdict {
    pub fn landed(&self) -> Option<&AttackLanded> {
        match self {
            AttackVerdict::Landed(landed) => Some(landed),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CombatGate {
    config: GateConfig,
    last_attack_time: f32,
}

impl CombatGate {
    /// Первая атака доступна сразу (`last_attack_time = -cooldown`).
    pub fn new(config: GateConfig) -> Self {
        Self {
            config,
            last_attack_time: -config.cooldown,
        }
    }

    pub fn config(&self) -> &GateConfig {
        &self.config
    }

    pub fn last_attack_time(&self) -> f32 {
        self.last_attack_time
    }

    pub fn is_ready(&self, now: f32) -> bool {
        now >= self.last_attack_time + self.config.cooldown
    }

    /// Re-arm after a reset: next swing is immediately available.
    pub fn rearm(&mut self) {
        self.last_attack_time = -self.config.cooldown;
    }

    pub fn try_attack(
        &mut self,
        now: f32,
        position: Vec3,
        facing: Vec3,
        target: &mut dyn TargetHandle,
    ) -> AttackVerdict {
        if !self.is_ready(now) {
            return AttackVerdict::CoolingDown {
                ready_at: self.last_attack_time + self.config.cooldown,
            };
        }

        let target_position = target.position();
        let distance = planar_distance(position, target_position);
        if distance > self.config.attack_range {
            return AttackVerdict::OutOfRange { distance };
        }

        if planar(facing).length_squared() < 1e-12 {
            return AttackVerdict::NoFacing;
        }

        // Цель прямо над/под агентом → угол 0
        let angle = planar_angle_deg(facing, target_position - position).unwrap_or(0.0);
        if angle > self.config.cone_half_angle {
            return AttackVerdict::OutsideCone { angle };
        }

        // Swing состоялся — cooldown стартует даже без damage sink
        self.last_attack_time = now;

        let damage = self.config.attack_damage;
        let target_entity = target.entity();
        let target_outcome = match target.damage_sink() {
            Some(sink) => Some(sink.apply_damage(damage)),
            None => {
                crate::log_warning(&format!(
                    "⚠️ Attack landed on target {:?} without damage sink, ignored",
                    target_entity
                ));
                None
            }
        };

        AttackVerdict::Landed(AttackLanded {
            damage,
            distance,
            angle,
            target_outcome,
        })
    }
}
