//! AI decision-making module
//!
//! Perception FSM (Idle ⇄ Detected) поверх двух коллабораторов:
//! - VisibilityProbe — LOS raycast (ObstacleField или Rapier)
//! - PursuitDelegate — команды внешней навигации
//!
//! ECS driver — `systems::tick_hostiles` (FixedUpdate).

pub mod events;
pub mod perception;
pub mod pursuit;
pub mod systems;
pub mod visibility;


// Re-export основных типов
pub use events::PerceptionChanged;
pub use perception::{DetectionState, PerceptionConfig, PerceptionInput, PerceptionStateMachine, Transition};
pub use pursuit::{NavAgent, NavBounds, PursuitDelegate};
pub use systems::tick_hostiles;
pub use visibility::{
    Blindfold, BlockingMask, ObserverView, ObstacleField, ParentLookup, RapierLineOfSight, Surface, SurfaceHit,
    SurfaceShape, VisibilityProbe,
};
