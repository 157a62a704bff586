//! Tests for the melee combat gate.

#[cfg(test)]
mod tests {
    use bevy::prelude::*;

    use super::super::gate::{AttackVerdict, CombatGate, GateConfig};
    use super::super::health::DamageOutcome;
    use super::super::target::{PlayerTarget, TargetHandle};

    fn target_at(distance: f32, angle_deg: f32) -> PlayerTarget {
        let rad = angle_deg.to_radians();
        PlayerTarget::new(
            Entity::from_raw(1),
            Vec3::new(distance * rad.sin(), 0.0, distance * rad.cos()),
            100.0,
        )
    }

    fn health(target: &PlayerTarget) -> f32 {
        target.vitals.as_ref().map(|v| v.health.current()).unwrap_or(0.0)
    }

    #[test]
    fn test_attack_at_2m_20deg_lands() {
        let mut gate = CombatGate::new(GateConfig::default());
        let mut target = target_at(2.0, 20.0);

        let verdict = gate.try_attack(0.0, Vec3::ZERO, Vec3::Z, &mut target);
        let landed = verdict.landed().expect("attack should land");

        assert_eq!(landed.damage, 15.0);
        assert!((landed.distance - 2.0).abs() < 1e-4);
        assert!((landed.angle - 20.0).abs() < 1e-2);
        assert_eq!(
            landed.target_outcome,
            Some(DamageOutcome::Wounded { remaining: 85.0 })
        );
        assert_eq!(health(&target), 85.0);
        assert_eq!(gate.last_attack_time(), 0.0);
    }

    #[test]
    fn test_out_of_range_alone_blocks() {
        let mut gate = CombatGate::new(GateConfig::default());
        let mut target = target_at(2.6, 0.0);

        let verdict = gate.try_attack(0.0, Vec3::ZERO, Vec3::Z, &mut target);
        assert!(matches!(verdict, AttackVerdict::OutOfRange { .. }));
        assert_eq!(health(&target), 100.0);
        // Cooldown не стартовал
        assert!(gate.is_ready(0.0));
    }

    #[test]
    fn test_outside_cone_alone_blocks() {
        let mut gate = CombatGate::new(GateConfig::default());
        let mut target = target_at(2.0, 50.0);

        let verdict = gate.try_attack(0.0, Vec3::ZERO, Vec3::Z, &mut target);
        match verdict {
            AttackVerdict::OutsideCone { angle } => assert!((angle - 50.0).abs() < 1e-2),
            other => panic!("expected OutsideCone, got {:?}", other),
        }
        assert_eq!(health(&target), 100.0);
    }

    #[test]
    fn test_cooldown_alone_blocks() {
        let mut gate = CombatGate::new(GateConfig::default());
        let mut target = target_at(2.0, 0.0);

        assert!(gate.try_attack(1.0, Vec3::ZERO, Vec3::Z, &mut target).landed().is_some());

        let verdict = gate.try_attack(1.5, Vec3::ZERO, Vec3::Z, &mut target);
        match verdict {
            AttackVerdict::CoolingDown { ready_at } => assert_eq!(ready_at, 3.0),
            other => panic!("expected CoolingDown, got {:?}", other),
        }
        assert_eq!(health(&target), 85.0);
    }

    #[test]
    fn test_two_attempts_within_cooldown_one_honored() {
        let mut gate = CombatGate::new(GateConfig::default());
        let mut target = target_at(1.5, 10.0);

        let first = gate.try_attack(5.0, Vec3::ZERO, Vec3::Z, &mut target);
        let second = gate.try_attack(5.1, Vec3::ZERO, Vec3::Z, &mut target);

        assert!(first.landed().is_some());
        assert!(second.landed().is_none());
        assert_eq!(health(&target), 85.0);
    }

    #[test]
    fn test_attack_available_again_after_cooldown() {
        let mut gate = CombatGate::new(GateConfig::default());
        let mut target = target_at(1.5, 0.0);

        gate.try_attack(0.0, Vec3::ZERO, Vec3::Z, &mut target);
        assert!(gate.try_attack(2.0, Vec3::ZERO, Vec3::Z, &mut target).landed().is_some());
        assert_eq!(health(&target), 70.0);
    }

    #[test]
    fn test_range_boundary_inclusive() {
        let mut gate = CombatGate::new(GateConfig::default());
        // Ровно attack_range
        let mut target = PlayerTarget::new(Entity::from_raw(1), Vec3::new(0.0, 0.0, 2.5), 100.0);

        assert!(gate.try_attack(0.0, Vec3::ZERO, Vec3::Z, &mut target).landed().is_some());
    }

    #[test]
    fn test_height_difference_ignored() {
        let mut gate = CombatGate::new(GateConfig::default());
        let mut target = PlayerTarget::new(Entity::from_raw(1), Vec3::new(0.0, 4.0, 2.0), 100.0);

        let verdict = gate.try_attack(0.0, Vec3::ZERO, Vec3::Z, &mut target);
        assert!(verdict.landed().is_some());
    }

    #[test]
    fn test_target_directly_above_counts_as_facing() {
        let mut gate = CombatGate::new(GateConfig::default());
        let mut target = PlayerTarget::new(Entity::from_raw(1), Vec3::new(0.0, 2.0, 0.0), 100.0);

        let landed = *gate
            .try_attack(0.0, Vec3::ZERO, Vec3::X, &mut target)
            .landed()
            .expect("attack should land");
        assert_eq!(landed.angle, 0.0);
    }

    #[test]
    fn test_zero_facing_never_attacks() {
        let mut gate = CombatGate::new(GateConfig::default());
        let mut target = target_at(1.0, 0.0);

        assert_eq!(
            gate.try_attack(0.0, Vec3::ZERO, Vec3::Y, &mut target),
            AttackVerdict::NoFacing
        );
        assert_eq!(health(&target), 100.0);
    }

    #[test]
    fn test_missing_sink_still_restarts_cooldown() {
        let mut gate = CombatGate::new(GateConfig::default());
        let mut target = PlayerTarget::without_vitals(Entity::from_raw(1), Vec3::new(0.0, 0.0, 1.0));
        assert!(target.damage_sink().is_none());

        let landed = *gate
            .try_attack(0.0, Vec3::ZERO, Vec3::Z, &mut target)
            .landed()
            .expect("swing should happen");
        assert!(landed.target_outcome.is_none());
        assert!(!gate.is_ready(1.0));
    }

    #[test]
    fn test_rearm_makes_attack_available() {
        let mut gate = CombatGate::new(GateConfig::default());
        let mut target = target_at(1.0, 0.0);

        gate.try_attack(10.0, Vec3::ZERO, Vec3::Z, &mut target);
        assert!(!gate.is_ready(10.5));

        gate.rearm();
        assert!(gate.is_ready(0.0));
    }
}
