//! ECS Components для hostile агентов и цели
//!
//! Организация по доменам:
//! - hostile: агент (Hostile, Facing) и цель (PursuitTarget)
//! - movement: команды навигации (MovementCommand, NavigationState)

pub mod hostile;
pub mod movement;

// Re-exports для удобного импорта
pub use hostile::*;
pub use movement::*;
