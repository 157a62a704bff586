//! Agent / simulation configuration (data-driven presets).
//!
//! Все параметры имеют дефолты, поэтому RON-файл может задавать только
//! отличающиеся поля. Проверка инвариантов — `AgentConfig::validate`.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::ai::BlockingMask;

/// Ошибки конфигурации.
///
/// Не фатальны для симуляции: агент с невалидной конфигурацией создаётся
/// в состоянии `AgentStatus::Disabled` и никогда не тикает.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("no pursuit delegate attached")]
    MissingPursuit,

    #[error("max health must be positive, got {0}")]
    NonPositiveHealth(f32),

    #[error("lose range ({lose}) must be greater than detection range ({detection})")]
    InvertedHysteresis { detection: f32, lose: f32 },

    #[error("{field} must be non-negative, got {value}")]
    NegativeValue { field: &'static str, value: f32 },

    #[error("attack cone angle must be within (0, 360] degrees, got {0}")]
    ConeOutOfRange(f32),

    #[error("failed to parse config: {0}")]
    Parse(String),
}

/// Параметры одного hostile агента.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    /// Радиус обнаружения (метры), требует LOS
    pub detection_range: f32,
    /// Радиус потери цели (метры), > detection_range
    pub lose_range: f32,
    /// Высота глаз агента над position
    pub eye_height: f32,
    /// Высота точки прицеливания на цели
    pub target_eye_height: f32,
    /// Слои, блокирующие видимость
    pub blocking_mask: BlockingMask,

    pub max_health: f32,

    pub attack_damage: f32,
    /// Planar радиус melee атаки
    pub attack_range: f32,
    /// Полный угол сектора атаки (градусы); половина — допуск от facing
    pub attack_angle: f32,
    /// Минимальный интервал между атаками (секунды)
    pub attack_cooldown: f32,

    /// Задержка удаления трупа (секунды)
    pub removal_delay: f32,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            detection_range: 10.0,
            lose_range: 15.0,
            eye_height: 1.0,
            target_eye_height: 1.0,
            blocking_mask: BlockingMask::ALL,
            max_health: 100.0,
            attack_damage: 15.0,
            attack_range: 2.5,
            attack_angle: 90.0,
            attack_cooldown: 2.0,
            removal_delay: 5.0,
        }
    }
}

impl AgentConfig {
    /// Half angle of the attack cone, degrees.
    pub fn attack_cone_half_angle(&self) -> f32 {
        self.attack_angle * 0.5
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.max_health > 0.0) {
            return Err(ConfigError::NonPositiveHealth(self.max_health));
        }

        let non_negative = [
            ("detection_range", self.detection_range),
            ("eye_height", self.eye_height),
            ("target_eye_height", self.target_eye_height),
            ("attack_damage", self.attack_damage),
            ("attack_range", self.attack_range),
            ("attack_cooldown", self.attack_cooldown),
            ("removal_delay", self.removal_delay),
        ];
        for (field, value) in non_negative {
            if !(value >= 0.0) {
                return Err(ConfigError::NegativeValue { field, value });
            }
        }

        if !(self.lose_range > self.detection_range) {
            return Err(ConfigError::InvertedHysteresis {
                detection: self.detection_range,
                lose: self.lose_range,
            });
        }

        if !(self.attack_angle > 0.0 && self.attack_angle <= 360.0) {
            return Err(ConfigError::ConeOutOfRange(self.attack_angle));
        }

        Ok(())
    }
}

/// Параметры отслеживаемой цели (игрока).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TargetConfig {
    pub max_health: f32,
    pub position: [f32; 3],
}

impl Default for TargetConfig {
    fn default() -> Self {
        Self {
            max_health: 100.0,
            position: [0.0, 0.0, 0.0],
        }
    }
}

impl TargetConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.max_health > 0.0) {
            return Err(ConfigError::NonPositiveHealth(self.max_health));
        }
        Ok(())
    }
}

/// Спавн-пресет агента.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentPreset {
    pub name: String,
    pub position: [f32; 3],
    #[serde(default)]
    pub config: AgentConfig,
}

/// Конфигурация headless прогона.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub tick_hz: f64,
    pub seed: u64,
    pub target: TargetConfig,
    pub agents: Vec<AgentPreset>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            tick_hz: 60.0,
            seed: 42,
            target: TargetConfig::default(),
            agents: vec![
                AgentPreset {
                    name: "stalker".to_string(),
                    position: [8.0, 0.0, 0.0],
                    config: AgentConfig::default(),
                },
                AgentPreset {
                    name: "brute".to_string(),
                    position: [-12.0, 0.0, 6.0],
                    config: AgentConfig {
                        attack_damage: 25.0,
                        attack_cooldown: 3.0,
                        ..AgentConfig::default()
                    },
                },
            ],
        }
    }
}

impl SimulationConfig {
    pub fn from_ron(text: &str) -> Result<Self, ConfigError> {
        ron::from_str(text).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Fixed timestep, seconds.
    pub fn tick_delta(&self) -> f32 {
        if self.tick_hz > 0.0 {
            (1.0 / self.tick_hz) as f32
        } else {
            1.0 / 60.0
        }
    }
}
