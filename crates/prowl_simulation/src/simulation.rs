//! Owned simulation loop — hostile агенты без ECS.
//!
//! Явный `update(delta)`: часы → для каждого агента perception → combat →
//! движение → удаление трупов с истёкшим removal_delay. Агенты обходятся в
//! порядке `AgentId`, поэтому урон по общей цели применяется
//! последовательно и детерминированно.

use std::collections::BTreeMap;

use bevy::prelude::*;

use crate::agent::{AgentTickContext, HostileAgent};
use crate::ai::perception::DetectionState;
use crate::ai::pursuit::PursuitDelegate;
use crate::ai::visibility::VisibilityProbe;
use crate::combat::health::DamageOutcome;
use crate::combat::target::{PlayerTarget, TargetHandle};
use crate::config::{AgentConfig, ConfigError};
use crate::debug::PerceptionReadout;
use crate::geometry::planar;

/// Elapsed simulation time, advanced by `update(delta)`.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SimClock {
    elapsed: f32,
}

impl SimClock {
    pub fn now(&self) -> f32 {
        self.elapsed
    }

    pub fn advance(&mut self, delta: f32) {
        self.elapsed += delta;
    }
}

/// Stable handle of a spawned agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AgentId(pub u32);

/// Что произошло за `update` (для UI, тестов, реплея).
#[derive(Debug, Clone, PartialEq)]
pub enum SimEvent {
    PerceptionChanged {
        agent: AgentId,
        from: DetectionState,
        to: DetectionState,
        distance: f32,
        at: f32,
    },
    AttackLanded {
        agent: AgentId,
        damage: f32,
        /// `None` — цель без damage sink
        target_outcome: Option<DamageOutcome>,
        at: f32,
    },
    TargetDied {
        killer: AgentId,
        at: f32,
    },
    AgentDamaged {
        agent: AgentId,
        amount: f32,
        outcome: DamageOutcome,
        at: f32,
    },
    AgentDied {
        agent: AgentId,
        at: f32,
    },
    AgentRemoved {
        agent: AgentId,
        at: f32,
    },
    AgentReset {
        agent: AgentId,
        at: f32,
    },
}

struct AgentSlot {
    agent: HostileAgent,
    /// `None` → агент disabled (MissingPursuit)
    pursuit: Option<Box<dyn PursuitDelegate>>,
    position: Vec3,
    facing: Vec3,
}

pub struct Simulation {
    clock: SimClock,
    target: PlayerTarget,
    probe: Box<dyn VisibilityProbe>,
    slots: BTreeMap<AgentId, AgentSlot>,
    next_id: u32,
    events: Vec<SimEvent>,
}

impl Simulation {
    pub fn new(target: PlayerTarget, probe: Box<dyn VisibilityProbe>) -> Self {
        Self {
            clock: SimClock::default(),
            target,
            probe,
            slots: BTreeMap::new(),
            next_id: 0,
            events: Vec::new(),
        }
    }

    pub fn now(&self) -> f32 {
        self.clock.now()
    }

    pub fn target(&self) -> &PlayerTarget {
        &self.target
    }

    pub fn set_target_position(&mut self, position: Vec3) {
        self.target.position = position;
    }

    /// Replace the environment (e.g. after a door opened).
    pub fn set_probe(&mut self, probe: Box<dyn VisibilityProbe>) {
        self.probe = probe;
    }

    pub fn spawn_hostile(
        &mut self,
        config: AgentConfig,
        position: Vec3,
        facing: Vec3,
        pursuit: Option<Box<dyn PursuitDelegate>>,
    ) -> AgentId {
        let name = format!("hostile-{}", self.next_id);
        self.spawn_named(name, config, position, facing, pursuit)
    }

    /// Missing pursuit delegate or invalid config → disabled agent (never ticks).
    pub fn spawn_named(
        &mut self,
        name: impl Into<String>,
        config: AgentConfig,
        position: Vec3,
        facing: Vec3,
        pursuit: Option<Box<dyn PursuitDelegate>>,
    ) -> AgentId {
        let id = AgentId(self.next_id);
        self.next_id += 1;

        let agent = if pursuit.is_some() {
            HostileAgent::new(name, config)
        } else {
            HostileAgent::disabled(name, config, ConfigError::MissingPursuit)
        };

        crate::log(&format!(
            "🧟 Spawned hostile '{}' ({:?}) at {:?}",
            agent.name(),
            id,
            position
        ));

        self.slots.insert(
            id,
            AgentSlot {
                agent,
                pursuit,
                position,
                facing,
            },
        );
        id
    }

    pub fn agent(&self, id: AgentId) -> Option<&HostileAgent> {
        self.slots.get(&id).map(|slot| &slot.agent)
    }

    pub fn agent_position(&self, id: AgentId) -> Option<Vec3> {
        self.slots.get(&id).map(|slot| slot.position)
    }

    pub fn agent_ids(&self) -> Vec<AgentId> {
        self.slots.keys().copied().collect()
    }

    pub fn agent_count(&self) -> usize {
        self.slots.len()
    }

    pub fn readout(&self, id: AgentId) -> Option<PerceptionReadout> {
        self.agent(id).map(PerceptionReadout::from_agent)
    }

    /// Teleport / external movement. Returns `false` for unknown ids.
    pub fn set_agent_pose(&mut self, id: AgentId, position: Vec3, facing: Vec3) -> bool {
        match self.slots.get_mut(&id) {
            Some(slot) => {
                slot.position = position;
                slot.facing = facing;
                true
            }
            None => false,
        }
    }

    /// Advance the clock by `delta` and tick every live agent.
    pub fn update(&mut self, delta: f32) {
        if !(delta >= 0.0) {
            crate::log_warning(&format!("⚠️ Simulation::update: invalid delta {}", delta));
            return;
        }

        self.clock.advance(delta);
        let now = self.clock.now();

        for (&id, slot) in self.slots.iter_mut() {
            let Some(pursuit) = slot.pursuit.as_deref_mut() else {
                continue;
            };

            let report = slot.agent.tick(AgentTickContext {
                now,
                position: slot.position,
                facing: slot.facing,
                target: &mut self.target,
                probe: &*self.probe,
                pursuit: &mut *pursuit,
            });

            if let Some(transition) = report.transition {
                self.events.push(SimEvent::PerceptionChanged {
                    agent: id,
                    from: transition.from,
                    to: transition.to,
                    distance: transition.distance,
                    at: now,
                });
            }

            // Удары по уже мёртвой цели (outcome Ignored) не попадают в лог
            if let Some(landed) = report
                .attack
                .filter(|landed| landed.target_outcome != Some(DamageOutcome::Ignored))
            {
                self.events.push(SimEvent::AttackLanded {
                    agent: id,
                    damage: landed.damage,
                    target_outcome: landed.target_outcome,
                    at: now,
                });
                if landed.target_outcome.is_some_and(|outcome| outcome.is_death()) {
                    self.events.push(SimEvent::TargetDied { killer: id, at: now });
                }
            }

            // Движение: navigation delegate ведёт агента к destination
            if slot.agent.is_active() && !slot.agent.is_dead() {
                let next = pursuit.drive(slot.position, delta);
                if let Some(heading) = planar(next - slot.position).try_normalize() {
                    slot.facing = heading;
                }
                slot.position = next;
            }
        }

        let due: Vec<AgentId> = self
            .slots
            .iter()
            .filter(|(_, slot)| slot.agent.is_due_for_removal(now))
            .map(|(&id, _)| id)
            .collect();

        for id in due {
            if let Some(slot) = self.slots.remove(&id) {
                crate::log(&format!("⚰️ Removed hostile '{}' ({:?})", slot.agent.name(), id));
                self.events.push(SimEvent::AgentRemoved { agent: id, at: now });
            }
        }
    }

    /// Damage from the outside world (player weapon, hazards).
    ///
    /// `None` for unknown (or already removed) ids.
    pub fn damage_hostile(&mut self, id: AgentId, amount: f32) -> Option<DamageOutcome> {
        let now = self.clock.now();
        let slot = self.slots.get_mut(&id)?;

        let pursuit = slot.pursuit.as_deref_mut().map(|p| p as &mut dyn PursuitDelegate);
        let outcome = slot.agent.take_damage(amount, now, pursuit);
        if outcome != DamageOutcome::Ignored {
            self.events.push(SimEvent::AgentDamaged {
                agent: id,
                amount,
                outcome,
                at: now,
            });
        }
        if outcome.is_death() {
            self.events.push(SimEvent::AgentDied { agent: id, at: now });
        }

        Some(outcome)
    }

    /// Pool reuse: revive the agent in place. `false` for unknown ids.
    pub fn reset_hostile(&mut self, id: AgentId) -> bool {
        let now = self.clock.now();
        let Some(slot) = self.slots.get_mut(&id) else {
            return false;
        };

        let pursuit = slot.pursuit.as_deref_mut().map(|p| p as &mut dyn PursuitDelegate);
        slot.agent.reset(pursuit);
        self.events.push(SimEvent::AgentReset { agent: id, at: now });
        true
    }

    pub fn drain_events(&mut self) -> Vec<SimEvent> {
        std::mem::take(&mut self.events)
    }

    /// Текущее здоровье цели (`None` — цель без vitals).
    pub fn target_health(&self) -> Option<f32> {
        self.target.vitals.as_ref().map(|vitals| vitals.health.current())
    }

    /// Identity of the tracked target.
    pub fn target_entity(&self) -> Option<Entity> {
        self.target.entity()
    }
}
