//! Perception FSM: Idle ⇄ Detected.
//!
//! Idle → Detected: дистанция ≤ detection_range И есть LOS.
//! Detected → Idle: дистанция > lose_range (LOS не перепроверяется).
//!
//! Асимметрия намеренная: для захвата цели нужна видимость, для потери —
//! только дистанция. Зазор detection_range..lose_range — hysteresis band,
//! агент не "мигает" состоянием у границы.

use bevy::prelude::*;

use crate::ai::pursuit::PursuitDelegate;
use crate::ai::visibility::{BlockingMask, VisibilityProbe};
use crate::config::AgentConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Reflect)]
pub enum DetectionState {
    /// Цель не обнаружена, преследования нет
    #[default]
    Idle,
    /// Цель обнаружена, агент преследует
    Detected,
}

/// Perception parameters (subset of `AgentConfig`).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PerceptionConfig {
    pub detection_range: f32,
    pub lose_range: f32,
    pub eye_height: f32,
    pub target_eye_height: f32,
    pub blocking_mask: BlockingMask,
}

impl From<&AgentConfig> for PerceptionConfig {
    fn from(config: &AgentConfig) -> Self {
        Self {
            detection_range: config.detection_range,
            lose_range: config.lose_range,
            eye_height: config.eye_height,
            target_eye_height: config.target_eye_height,
            blocking_mask: config.blocking_mask,
        }
    }
}

impl Default for PerceptionConfig {
    fn default() -> Self {
        Self::from(&AgentConfig::default())
    }
}

/// State change produced by one evaluation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transition {
    pub from: DetectionState,
    pub to: DetectionState,
    /// Distance to the target at the moment of the transition
    pub distance: f32,
}

/// Per-tick inputs of the perception evaluation.
#[derive(Debug, Clone, Copy)]
pub struct PerceptionInput {
    pub agent_position: Vec3,
    pub target_position: Vec3,
    /// Identity цели для LOS (её collider'ы не блокируют видимость)
    pub target: Option<Entity>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PerceptionStateMachine {
    config: PerceptionConfig,
    state: DetectionState,
}

impl PerceptionStateMachine {
    pub fn new(config: PerceptionConfig) -> Self {
        Self {
            config,
            state: DetectionState::Idle,
        }
    }

    pub fn state(&self) -> DetectionState {
        self.state
    }

    pub fn config(&self) -> &PerceptionConfig {
        &self.config
    }

    pub fn reset(&mut self) {
        self.state = DetectionState::Idle;
    }

    /// Eye-to-aim-point LOS query.
    pub fn can_see(&self, input: &PerceptionInput, probe: &dyn VisibilityProbe) -> bool {
        let eye = input.agent_position + Vec3::Y * self.config.eye_height;
        let aim = input.target_position + Vec3::Y * self.config.target_eye_height;
        probe.has_line_of_sight(eye, aim, self.config.blocking_mask, input.target)
    }

    /// One tick of the FSM. Pursuit commands are only issued while the
    /// delegate is on a navigable surface; otherwise they are skipped.
    pub fn evaluate(
        &mut self,
        input: &PerceptionInput,
        probe: &dyn VisibilityProbe,
        pursuit: &mut dyn PursuitDelegate,
    ) -> Option<Transition> {
        let distance = input.agent_position.distance(input.target_position);
        let on_navmesh = pursuit.is_on_navigable_surface();

        match self.state {
            DetectionState::Idle => {
                // LOS дорогой — проверяем только внутри detection_range
                if distance <= self.config.detection_range && self.can_see(input, probe) {
                    self.state = DetectionState::Detected;
                    if on_navmesh {
                        pursuit.resume();
                        pursuit.set_destination(input.target_position);
                    }
                    return Some(Transition {
                        from: DetectionState::Idle,
                        to: DetectionState::Detected,
                        distance,
                    });
                }

                if on_navmesh && !pursuit.is_stopped() {
                    pursuit.stop();
                }
                None
            }
            DetectionState::Detected => {
                if distance > self.config.lose_range {
                    self.state = DetectionState::Idle;
                    if on_navmesh {
                        pursuit.stop();
                    }
                    return Some(Transition {
                        from: DetectionState::Detected,
                        to: DetectionState::Idle,
                        distance,
                    });
                }

                // Продолжаем погоню: destination обновляется каждый тик
                if on_navmesh {
                    pursuit.set_destination(input.target_position);
                    if pursuit.is_stopped() {
                        pursuit.resume();
                    }
                }
                None
            }
        }
    }
}
