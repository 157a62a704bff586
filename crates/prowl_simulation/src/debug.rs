//! Debug readout радиусов агента (без рендера).
//!
//! Хост (редактор, gizmos, Godot) рисует контуры сам: здесь только данные
//! и геометрия в local space агента. Forward — `-Z`, контуры лежат на
//! `y = OUTLINE_HEIGHT`, чтобы не z-fight'ить с полом.

use bevy::prelude::*;

use crate::agent::HostileAgent;
use crate::ai::perception::DetectionState;

/// Высота контуров над землёй.
pub const OUTLINE_HEIGHT: f32 = 0.01;

/// Сегментов на полный круг по умолчанию.
pub const DEFAULT_CIRCLE_SEGMENTS: usize = 36;

/// Linear RGBA.
pub type Rgba = [f32; 4];

pub const BLUE: Rgba = [0.0, 0.0, 1.0, 1.0];
pub const GREEN: Rgba = [0.0, 1.0, 0.0, 1.0];
pub const RED: Rgba = [1.0, 0.0, 0.0, 1.0];
pub const YELLOW: Rgba = [1.0, 0.92, 0.016, 1.0];

/// Snapshot of what a debug overlay should draw for one agent.
#[derive(Debug, Clone, PartialEq)]
pub struct PerceptionReadout {
    pub state: DetectionState,
    pub detection_range: f32,
    pub lose_range: f32,
    pub attack_range: f32,
    /// Полный угол сектора атаки (градусы)
    pub attack_angle: f32,
    /// false когда агент мёртв или debug output выключен
    pub visible: bool,
    /// Цвет по состоянию: Idle синий, Detected зелёный
    pub state_color: Rgba,
}

impl PerceptionReadout {
    pub fn from_agent(agent: &HostileAgent) -> Self {
        let state = agent.state();
        Self {
            state,
            detection_range: agent.detection_range(),
            lose_range: agent.lose_range(),
            attack_range: agent.attack_range(),
            attack_angle: agent.attack_cone_half_angle() * 2.0,
            visible: agent.show_debug_shapes() && !agent.is_dead(),
            state_color: state_color(state),
        }
    }

    /// Attack arc рисуется только при ненулевых угле и радиусе.
    pub fn shows_attack_arc(&self) -> bool {
        self.visible && self.attack_angle > 0.0 && self.attack_range > 0.0
    }
}

pub fn state_color(state: DetectionState) -> Rgba {
    match state {
        DetectionState::Idle => BLUE,
        DetectionState::Detected => GREEN,
    }
}

/// Closed ring of `segments` points (the host draws it as a loop).
pub fn circle_outline(radius: f32, segments: usize) -> Vec<Vec3> {
    let segments = segments.max(3);
    let step = std::f32::consts::TAU / segments as f32;

    (0..segments)
        .map(|i| {
            let angle = i as f32 * step;
            Vec3::new(angle.cos() * radius, OUTLINE_HEIGHT, angle.sin() * radius)
        })
        .collect()
}

/// Segment count of an arc, proportional to a full circle (минимум 2).
pub fn arc_segments(full_angle_deg: f32, segments_for_full_circle: usize) -> usize {
    let proportional = (segments_for_full_circle as f32 * full_angle_deg / 360.0).ceil();
    (proportional.max(0.0) as usize).max(2)
}

/// Attack sector: centre point, then `arc_segments + 1` points from
/// `-half` to `+half` around forward. Пустой вектор при угле ≤ 0.
pub fn attack_arc_outline(radius: f32, full_angle_deg: f32, segments_for_full_circle: usize) -> Vec<Vec3> {
    if !(full_angle_deg > 0.0) {
        return Vec::new();
    }

    let segments = arc_segments(full_angle_deg, segments_for_full_circle);
    let half = (full_angle_deg * 0.5).to_radians();
    let step = full_angle_deg.to_radians() / segments as f32;

    let mut points = Vec::with_capacity(segments + 2);
    points.push(Vec3::new(0.0, OUTLINE_HEIGHT, 0.0));
    points.extend((0..=segments).map(|i| {
        let angle = -half + i as f32 * step;
        Vec3::new(angle.sin() * radius, OUTLINE_HEIGHT, -angle.cos() * radius)
    }));
    points
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AgentConfig;

    #[test]
    fn test_readout_follows_agent() {
        let mut agent = HostileAgent::new("grunt", AgentConfig::default());
        let readout = PerceptionReadout::from_agent(&agent);

        assert_eq!(readout.state, DetectionState::Idle);
        assert_eq!(readout.state_color, BLUE);
        assert_eq!(readout.attack_angle, 90.0);
        assert!(readout.visible);
        assert!(readout.shows_attack_arc());

        agent.take_damage(500.0, 0.0, None);
        let readout = PerceptionReadout::from_agent(&agent);
        assert!(!readout.visible);
        assert!(!readout.shows_attack_arc());
    }

    #[test]
    fn test_readout_hidden_when_disabled_by_host() {
        let mut agent = HostileAgent::new("grunt", AgentConfig::default());
        agent.set_show_debug_shapes(false);
        assert!(!PerceptionReadout::from_agent(&agent).visible);
    }

    #[test]
    fn test_state_colors() {
        assert_eq!(state_color(DetectionState::Idle), BLUE);
        assert_eq!(state_color(DetectionState::Detected), GREEN);
    }

    #[test]
    fn test_circle_outline() {
        let points = circle_outline(10.0, DEFAULT_CIRCLE_SEGMENTS);
        assert_eq!(points.len(), 36);
        for point in &points {
            assert!((Vec2::new(point.x, point.z).length() - 10.0).abs() < 1e-3);
            assert_eq!(point.y, OUTLINE_HEIGHT);
        }
    }

    #[test]
    fn test_arc_segments_proportional() {
        // 36 * 90 / 360 = 9
        assert_eq!(arc_segments(90.0, 36), 9);
        // Узкий сектор — минимум 2
        assert_eq!(arc_segments(5.0, 36), 2);
        assert_eq!(arc_segments(100.0, 36), 10);
    }

    #[test]
    fn test_attack_arc_outline() {
        let points = attack_arc_outline(2.5, 90.0, 36);
        assert_eq!(points.len(), 9 + 2);
        assert_eq!(points[0], Vec3::new(0.0, OUTLINE_HEIGHT, 0.0));

        // Крайние точки на ±45° от forward (-Z)
        let first = points[1];
        let last = points[points.len() - 1];
        assert!((first.x + 2.5 * 45f32.to_radians().sin()).abs() < 1e-4);
        assert!((last.x - 2.5 * 45f32.to_radians().sin()).abs() < 1e-4);
        assert!(first.z < 0.0 && last.z < 0.0);

        assert!(attack_arc_outline(2.5, 0.0, 36).is_empty());
    }
}
