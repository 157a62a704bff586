//! AI systems (ECS driver для HostileAgent)

pub mod hostile;

// Re-export all systems
pub use hostile::*;
