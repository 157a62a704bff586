//! Tests for HostileAgent lifecycle (perception → combat → death → reset).

#[cfg(test)]
mod tests {
    use bevy::prelude::*;

    use crate::agent::{AgentStatus, AgentTickContext, HostileAgent, TickReport};
    use crate::ai::perception::DetectionState;
    use crate::ai::pursuit::{NavAgent, PursuitDelegate};
    use crate::ai::visibility::{BlockingMask, ObstacleField, VisibilityProbe};
    use crate::combat::health::DamageOutcome;
    use crate::combat::target::PlayerTarget;
    use crate::config::{AgentConfig, ConfigError};

    struct Rig {
        agent: HostileAgent,
        nav: NavAgent,
        target: PlayerTarget,
        field: ObstacleField,
        position: Vec3,
        facing: Vec3,
    }

    impl Rig {
        fn new(target_position: Vec3) -> Self {
            Self {
                agent: HostileAgent::new("grunt", AgentConfig::default()),
                nav: NavAgent::new(Vec3::ZERO),
                target: PlayerTarget::new(Entity::from_raw(1), target_position, 100.0),
                field: ObstacleField::new(),
                position: Vec3::ZERO,
                facing: Vec3::X,
            }
        }

        fn tick(&mut self, now: f32) -> TickReport {
            let probe: &dyn VisibilityProbe = &self.field;
            self.agent.tick(AgentTickContext {
                now,
                position: self.position,
                facing: self.facing,
                target: &mut self.target,
                probe,
                pursuit: &mut self.nav,
            })
        }

        fn target_health(&self) -> f32 {
            self.target.vitals.as_ref().map(|v| v.health.current()).unwrap_or(0.0)
        }
    }

    #[test]
    fn test_new_agent_defaults() {
        let agent = HostileAgent::new("grunt", AgentConfig::default());
        assert!(agent.is_active());
        assert_eq!(agent.state(), DetectionState::Idle);
        assert_eq!(agent.detection_range(), 10.0);
        assert_eq!(agent.lose_range(), 15.0);
        assert_eq!(agent.attack_range(), 2.5);
        assert_eq!(agent.attack_cone_half_angle(), 45.0);
        assert!(agent.collision_enabled());
        assert!(agent.show_debug_shapes());
        assert!(agent.removal_time().is_none());
    }

    #[test]
    fn test_invalid_config_disables_agent() {
        let config = AgentConfig {
            detection_range: 20.0,
            lose_range: 10.0,
            ..AgentConfig::default()
        };
        let mut rig = Rig::new(Vec3::new(1.0, 0.0, 0.0));
        rig.agent = HostileAgent::new("broken", config);

        assert!(matches!(
            rig.agent.status(),
            AgentStatus::Disabled(ConfigError::InvertedHysteresis { .. })
        ));

        // Disabled агент не тикает: цель в упор, но ни обнаружения, ни атаки
        let report = rig.tick(0.0);
        assert_eq!(report, TickReport::default());
        assert_eq!(rig.agent.state(), DetectionState::Idle);
        assert_eq!(rig.target_health(), 100.0);
    }

    #[test]
    fn test_missing_pursuit_is_disabled() {
        let agent = HostileAgent::disabled("orphan", AgentConfig::default(), ConfigError::MissingPursuit);
        assert_eq!(agent.status(), &AgentStatus::Disabled(ConfigError::MissingPursuit));
        assert!(!agent.is_active());
    }

    #[test]
    fn test_detect_then_attack_same_tick() {
        let mut rig = Rig::new(Vec3::new(2.0, 0.0, 0.0));

        let report = rig.tick(0.0);
        assert_eq!(
            report.transition.map(|t| t.to),
            Some(DetectionState::Detected)
        );
        assert!(report.attack.is_some());
        assert_eq!(rig.target_health(), 85.0);
        assert_eq!(rig.nav.destination(), Some(Vec3::new(2.0, 0.0, 0.0)));
    }

    #[test]
    fn test_no_attack_while_idle() {
        let mut rig = Rig::new(Vec3::new(2.0, 0.0, 0.0));
        rig.field
            .add_box(Vec3::new(0.8, 0.0, -1.0), Vec3::new(1.2, 3.0, 1.0), BlockingMask::ALL);

        // В радиусе атаки, но за стеной → Idle → без атаки
        let report = rig.tick(0.0);
        assert!(report.transition.is_none());
        assert!(report.attack.is_none());
        assert_eq!(rig.target_health(), 100.0);
    }

    #[test]
    fn test_cooldown_across_ticks() {
        let mut rig = Rig::new(Vec3::new(2.0, 0.0, 0.0));

        let mut attacks = 0;
        // 0.0 .. 1.9 с шагом 0.1 → только одна атака при cooldown 2 с
        for step in 0..20 {
            if rig.tick(step as f32 * 0.1).attack.is_some() {
                attacks += 1;
            }
        }
        assert_eq!(attacks, 1);

        assert!(rig.tick(2.05).attack.is_some());
        assert_eq!(rig.target_health(), 70.0);
    }

    #[test]
    fn test_death_effects() {
        let mut rig = Rig::new(Vec3::new(5.0, 0.0, 0.0));
        rig.tick(0.0);
        assert!(!rig.nav.is_stopped());

        let outcome = rig.agent.take_damage(150.0, 3.0, Some(&mut rig.nav));
        assert_eq!(outcome, DamageOutcome::Died);
        assert!(rig.agent.is_dead());
        assert!(!rig.agent.collision_enabled());
        assert!(!rig.agent.show_debug_shapes());
        assert_eq!(rig.agent.removal_time(), Some(8.0));
        assert!(rig.nav.is_stopped());
        assert!(!rig.nav.is_on_navigable_surface());

        assert!(!rig.agent.is_due_for_removal(7.9));
        assert!(rig.agent.is_due_for_removal(8.0));
    }

    #[test]
    fn test_death_reported_once_and_dead_agent_inert() {
        let mut rig = Rig::new(Vec3::new(2.0, 0.0, 0.0));

        assert_eq!(rig.agent.take_damage(60.0, 0.0, Some(&mut rig.nav)), DamageOutcome::Wounded { remaining: 40.0 });
        assert_eq!(rig.agent.take_damage(60.0, 0.0, Some(&mut rig.nav)), DamageOutcome::Died);
        assert_eq!(rig.agent.take_damage(60.0, 1.0, Some(&mut rig.nav)), DamageOutcome::Ignored);
        // Removal не переназначается поздним уроном
        assert_eq!(rig.agent.removal_time(), Some(5.0));

        let report = rig.tick(1.0);
        assert_eq!(report, TickReport::default());
        assert_eq!(rig.target_health(), 100.0);
    }

    #[test]
    fn test_debug_shapes_stay_hidden_while_dead() {
        let mut agent = HostileAgent::new("grunt", AgentConfig::default());
        agent.take_damage(1000.0, 0.0, None);

        agent.set_show_debug_shapes(true);
        assert!(!agent.show_debug_shapes());
    }

    #[test]
    fn test_reset_revives() {
        let mut rig = Rig::new(Vec3::new(2.0, 0.0, 0.0));
        rig.tick(0.0);
        assert_eq!(rig.agent.state(), DetectionState::Detected);

        rig.agent.take_damage(1000.0, 0.5, Some(&mut rig.nav));
        rig.agent.reset(Some(&mut rig.nav));

        assert!(!rig.agent.is_dead());
        assert_eq!(rig.agent.health().current(), 100.0);
        assert_eq!(rig.agent.state(), DetectionState::Idle);
        assert!(rig.agent.collision_enabled());
        assert!(rig.agent.show_debug_shapes());
        assert!(rig.agent.removal_time().is_none());
        assert!(rig.nav.is_enabled());

        // Cooldown re-armed: атака доступна сразу в том же моменте времени
        let report = rig.tick(0.6);
        assert!(report.attack.is_some());
        assert_eq!(rig.target_health(), 70.0);
    }
}
