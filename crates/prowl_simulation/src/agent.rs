//! HostileAgent — perception + combat + health одного агента.
//!
//! Коллабораторы (цель, LOS probe, навигация) не хранятся в агенте, а
//! передаются на каждый тик через `AgentTickContext`. Это позволяет одному и
//! тому же агенту работать и в owned `Simulation`, и внутри ECS системы.
//!
//! Порядок внутри тика: perception → combat. Мёртвый или disabled агент
//! не тикает вовсе.

use bevy::prelude::*;

use crate::ai::perception::{DetectionState, PerceptionConfig, PerceptionInput, PerceptionStateMachine, Transition};
use crate::ai::pursuit::PursuitDelegate;
use crate::ai::visibility::VisibilityProbe;
use crate::combat::gate::{AttackLanded, CombatGate, GateConfig};
use crate::combat::health::{DamageOutcome, HealthModel};
use crate::combat::target::TargetHandle;
use crate::config::{AgentConfig, ConfigError};

/// Lifecycle status after construction.
#[derive(Debug, Clone, PartialEq)]
pub enum AgentStatus {
    Active,
    /// Ошибка конфигурации: агент существует, но никогда не тикает
    Disabled(ConfigError),
}

/// Collaborators and pose for one tick.
pub struct AgentTickContext<'a> {
    /// Elapsed simulation time (секунды)
    pub now: f32,
    pub position: Vec3,
    pub facing: Vec3,
    pub target: &'a mut dyn TargetHandle,
    pub probe: &'a dyn VisibilityProbe,
    pub pursuit: &'a mut dyn PursuitDelegate,
}

/// What happened during one tick.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TickReport {
    pub transition: Option<Transition>,
    pub attack: Option<AttackLanded>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HostileAgent {
    name: String,
    config: AgentConfig,
    status: AgentStatus,
    perception: PerceptionStateMachine,
    gate: CombatGate,
    health: HealthModel,
    collision_enabled: bool,
    show_debug_shapes: bool,
    removal_time: Option<f32>,
}

impl HostileAgent {
    /// Invalid config → `AgentStatus::Disabled` (ошибка логируется).
    pub fn new(name: impl Into<String>, config: AgentConfig) -> Self {
        let status = match config.validate() {
            Ok(()) => AgentStatus::Active,
            Err(reason) => AgentStatus::Disabled(reason),
        };
        Self::with_status(name.into(), config, status)
    }

    /// Agent that failed construction for an external reason (e.g. no pursuit delegate).
    pub fn disabled(name: impl Into<String>, config: AgentConfig, reason: ConfigError) -> Self {
        Self::with_status(name.into(), config, AgentStatus::Disabled(reason))
    }

    fn with_status(name: String, config: AgentConfig, status: AgentStatus) -> Self {
        if let AgentStatus::Disabled(reason) = &status {
            crate::log_error(&format!("❌ Hostile '{}' disabled: {}", name, reason));
        }

        Self {
            perception: PerceptionStateMachine::new(PerceptionConfig::from(&config)),
            gate: CombatGate::new(GateConfig::from(&config)),
            health: HealthModel::new(config.max_health),
            collision_enabled: true,
            show_debug_shapes: true,
            removal_time: None,
            name,
            config,
            status,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn config(&self) -> &AgentConfig {
        &self.config
    }

    pub fn status(&self) -> &AgentStatus {
        &self.status
    }

    pub fn is_active(&self) -> bool {
        matches!(self.status, AgentStatus::Active)
    }

    pub fn state(&self) -> DetectionState {
        self.perception.state()
    }

    pub fn detection_range(&self) -> f32 {
        self.config.detection_range
    }

    pub fn lose_range(&self) -> f32 {
        self.config.lose_range
    }

    pub fn attack_range(&self) -> f32 {
        self.config.attack_range
    }

    pub fn attack_cone_half_angle(&self) -> f32 {
        self.config.attack_cone_half_angle()
    }

    pub fn health(&self) -> &HealthModel {
        &self.health
    }

    pub fn is_dead(&self) -> bool {
        self.health.is_dead()
    }

    pub fn collision_enabled(&self) -> bool {
        self.collision_enabled
    }

    pub fn show_debug_shapes(&self) -> bool {
        self.show_debug_shapes
    }

    pub fn set_show_debug_shapes(&mut self, show: bool) {
        // Мёртвый агент не показывает debug shapes до reset
        self.show_debug_shapes = show && !self.is_dead();
    }

    pub fn removal_time(&self) -> Option<f32> {
        self.removal_time
    }

    pub fn is_due_for_removal(&self, now: f32) -> bool {
        self.removal_time.is_some_and(|at| now >= at)
    }

    pub fn last_attack_time(&self) -> f32 {
        self.gate.last_attack_time()
    }

    /// Perception → combat. No-op for dead or disabled agents.
    pub fn tick(&mut self, ctx: AgentTickContext<'_>) -> TickReport {
        let mut report = TickReport::default();
        if !self.is_active() || self.is_dead() {
            return report;
        }

        let input = PerceptionInput {
            agent_position: ctx.position,
            target_position: ctx.target.position(),
            target: ctx.target.entity(),
        };

        report.transition = self.perception.evaluate(&input, ctx.probe, ctx.pursuit);
        if let Some(transition) = report.transition {
            match transition.to {
                DetectionState::Detected => crate::log_info(&format!(
                    "👁️ Hostile '{}' detected target at {:.1}m",
                    self.name, transition.distance
                )),
                DetectionState::Idle => crate::log_info(&format!(
                    "❓ Hostile '{}' lost target at {:.1}m",
                    self.name, transition.distance
                )),
            }
        }

        if self.perception.state() == DetectionState::Detected {
            let verdict = self.gate.try_attack(ctx.now, ctx.position, ctx.facing, ctx.target);
            if let Some(landed) = verdict.landed() {
                crate::log(&format!(
                    "⚔️ Hostile '{}' hit target: {:.1} damage ({:.2}m, {:.1}°)",
                    self.name, landed.damage, landed.distance, landed.angle
                ));
                report.attack = Some(*landed);
            }
        }

        report
    }

    /// Apply incoming damage; on death halt pursuit and schedule removal.
    ///
    /// `pursuit` is `None` when the agent has no delegate (disabled agent).
    pub fn take_damage(
        &mut self,
        amount: f32,
        now: f32,
        pursuit: Option<&mut dyn PursuitDelegate>,
    ) -> DamageOutcome {
        let outcome = self.health.apply_damage(amount);

        match outcome {
            DamageOutcome::Wounded { remaining } => {
                crate::log(&format!(
                    "🩸 Hostile '{}' took {:.1} damage, health: {:.1}",
                    self.name, amount, remaining
                ));
            }
            DamageOutcome::Died => {
                if let Some(pursuit) = pursuit {
                    pursuit.release();
                }
                self.collision_enabled = false;
                self.show_debug_shapes = false;
                self.removal_time = Some(now + self.config.removal_delay);

                crate::log_info(&format!(
                    "💀 Hostile '{}' died, removal at {:.2}s",
                    self.name, now + self.config.removal_delay
                ));
            }
            DamageOutcome::Ignored => {}
        }

        outcome
    }

    /// Revival for pool reuse: full health, Idle, attack re-armed.
    pub fn reset(&mut self, pursuit: Option<&mut dyn PursuitDelegate>) {
        self.health.reset();
        self.perception.reset();
        self.gate.rearm();
        self.collision_enabled = true;
        self.show_debug_shapes = true;
        self.removal_time = None;

        if let Some(pursuit) = pursuit {
            pursuit.reattach();
            pursuit.stop();
        }

        crate::log(&format!("♻️ Hostile '{}' reset", self.name));
    }
}
