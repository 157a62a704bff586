//! Pursuit delegate — абстракция над внешней навигацией.
//!
//! Core только отдаёт команды (destination / stop / resume) и читает один флаг
//! `is_on_navigable_surface`. Путь по navmesh и движение — забота навигации.

use bevy::prelude::*;

/// Navigation collaborator driven by perception.
pub trait PursuitDelegate {
    fn set_destination(&mut self, point: Vec3);

    fn stop(&mut self);

    fn resume(&mut self);

    fn is_stopped(&self) -> bool;

    fn is_on_navigable_surface(&self) -> bool;

    /// Death: drop the current path and detach from navigation entirely.
    fn release(&mut self) {
        self.stop();
    }

    /// Revival: attach back to navigation after `release`.
    fn reattach(&mut self) {}

    /// Owned loop hook: move the agent for `delta` seconds, return the new
    /// position. Внешняя навигация двигает агента сама — по умолчанию no-op.
    fn drive(&mut self, position: Vec3, _delta: f32) -> Vec3 {
        position
    }
}

/// Navigable area (XZ rectangle) for `NavAgent`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NavBounds {
    pub min: Vec2,
    pub max: Vec2,
}

impl NavBounds {
    pub fn new(a: Vec2, b: Vec2) -> Self {
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }

    pub fn contains(&self, position: Vec3) -> bool {
        let p = Vec2::new(position.x, position.z);
        p.cmpge(self.min).all() && p.cmple(self.max).all()
    }
}

/// Reference in-process delegate: straight-line motion toward the destination.
///
/// Используется headless прогоном и тестами вместо настоящего navmesh агента.
#[derive(Debug, Clone, PartialEq)]
pub struct NavAgent {
    destination: Option<Vec3>,
    stopped: bool,
    enabled: bool,
    /// `None` — вся плоскость навигабельна
    bounds: Option<NavBounds>,
    position: Vec3,
    /// Скорость движения (м/с)
    pub speed: f32,
    /// Дистанция, на которой destination считается достигнутым
    pub stopping_distance: f32,
}

impl Default for NavAgent {
    fn default() -> Self {
        Self {
            destination: None,
            stopped: true,
            enabled: true,
            bounds: None,
            position: Vec3::ZERO,
            speed: 3.5,
            stopping_distance: 1.0,
        }
    }
}

impl NavAgent {
    pub fn new(position: Vec3) -> Self {
        Self {
            position,
            ..Self::default()
        }
    }

    pub fn with_bounds(mut self, bounds: NavBounds) -> Self {
        self.bounds = Some(bounds);
        self
    }

    pub fn with_speed(mut self, speed: f32) -> Self {
        self.speed = speed;
        self
    }

    pub fn destination(&self) -> Option<Vec3> {
        self.destination
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    /// Sync position after an external teleport.
    pub fn place(&mut self, position: Vec3) {
        self.position = position;
    }

    /// Advance along the straight line to the destination; returns the new position.
    pub fn step(&mut self, delta: f32) -> Vec3 {
        if !self.enabled || self.stopped {
            return self.position;
        }
        let Some(destination) = self.destination else {
            return self.position;
        };

        let to_destination = Vec3::new(
            destination.x - self.position.x,
            0.0,
            destination.z - self.position.z,
        );
        let distance = to_destination.length();
        if distance <= self.stopping_distance {
            return self.position;
        }

        let travel = (self.speed * delta).min(distance - self.stopping_distance);
        let next = self.position + to_destination / distance * travel;

        // Не выходим за пределы навигабельной области
        if self.bounds.map_or(true, |bounds| bounds.contains(next)) {
            self.position = next;
        }
        self.position
    }
}

impl PursuitDelegate for NavAgent {
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
        self.enabled && self.bounds.map_or(true, |bounds| bounds.contains(self.position))
    }

    fn release(&mut self) {
        self.stopped = true;
        self.destination = None;
        self.enabled = false;
    }

    fn reattach(&mut self) {
        self.enabled = true;
    }

    fn drive(&mut self, position: Vec3, delta: f32) -> Vec3 {
        self.place(position);
        self.step(delta)
    }
}
