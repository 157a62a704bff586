//! AI Events — переходы perception FSM

use bevy::prelude::*;

use crate::ai::perception::DetectionState;

/// Событие: агент сменил состояние восприятия
///
/// Генерируется `tick_hostiles` на каждом переходе Idle ⇄ Detected.
/// Используется для UI (индикатор тревоги), звуков, аналитики.
#[derive(Event, Debug, Clone, PartialEq)]
pub struct PerceptionChanged {
    /// Entity агента
    pub hostile: Entity,
    /// Entity цели
    pub target: Entity,
    pub from: DetectionState,
    pub to: DetectionState,
    /// Дистанция до цели в момент перехода
    pub distance: f32,
}
