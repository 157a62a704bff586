//! Навигационные команды агента.

use bevy::prelude::*;

use crate::ai::PursuitDelegate;

/// Команда движения для внешнего navigation слоя
///
/// Архитектура:
/// - perception пишет в NavigationState (через PursuitDelegate)
/// - tick_hostiles конвертирует состояние в MovementCommand
/// - navigation слой (navmesh agent, character controller) читает команду
#[derive(Component, Debug, Clone, PartialEq, Default)]
pub enum MovementCommand {
    /// Стоять на месте (нет destination)
    #[default]
    Idle,
    /// Двигаться к позиции (world coordinates)
    MoveToPosition { target: Vec3 },
    /// Остановиться, destination сохраняется
    Stop,
}

/// Состояние преследования агента (ECS реализация PursuitDelegate).
///
/// `on_navmesh` выставляет navigation слой; остальное — perception.
#[derive(Component, Debug, Clone, PartialEq)]
pub struct NavigationState {
    /// Агент стоит на navmesh (иначе команды преследования пропускаются)
    pub on_navmesh: bool,
    pub destination: Option<Vec3>,
    pub stopped: bool,
    /// Отсоединён от навигации (смерть)
    pub detached: bool,
}

impl Default for NavigationState {
    fn default() -> Self {
        Self {
            on_navmesh: true,
            destination: None,
            stopped: true,
            detached: false,
        }
    }
}

impl NavigationState {
    pub fn command(&self) -> MovementCommand {
        match self.destination {
            Some(target) if !self.stopped && !self.detached => MovementCommand::MoveToPosition { target },
            Some(_) => MovementCommand::Stop,
            None => MovementCommand::Idle,
        }
    }
}

impl PursuitDelegate for NavigationState {
    fn set_destination(&mut self, point: Vec3) {
        self.destination = Some(point);
    }

    fn stop(&mut self) {
        self.stopped = true;
    }

    fn resume(&mut self) {
        self.stopped = false;
    }

    fn is_stopped(&self) -> bool {
        self.stopped
    }

    fn is_on_navigable_surface(&self) -> bool {
        self.on_navmesh && !self.detached
    }

    fn release(&mut self) {
        self.stopped = true;
        self.destination = None;
        self.detached = true;
    }

    fn reattach(&mut self) {
        self.detached = false;
    }
}
