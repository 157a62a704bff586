//! Combat module
//!
//! - health: HealthModel (clamp, смерть ровно один раз, reset)
//! - gate: CombatGate (range + facing cone + cooldown)
//! - target: TargetHandle / DamageSink — цель глазами агента
//! - damage: ECS события и системы смерти/деспавна

pub mod damage;
pub mod gate;
pub mod health;
pub mod target;

#[cfg(test)]
mod gate_tests;

// Re-export основных типов
pub use damage::{
    apply_hostile_damage, despawn_after_timeout, reset_hostiles, DamageDealt, Dead, DespawnAfter, EntityDied,
    HostileDamaged, HostileReset,
};
pub use gate::{AttackLanded, AttackVerdict, CombatGate, GateConfig};
pub use health::{DamageOutcome, HealthModel};
pub use target::{DamageSink, PlayerTarget, TargetHandle, TargetVitals};
