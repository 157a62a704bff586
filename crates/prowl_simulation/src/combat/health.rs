//! Health / lifecycle model.
//!
//! Инварианты:
//! - 0 ≤ current ≤ max, max > 0
//! - is_dead монотонен (false → true), сбрасывается только через `reset()`
//! - переход в смерть сообщается ровно один раз (`DamageOutcome::Died`)

/// Результат `HealthModel::apply_damage`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DamageOutcome {
    /// Урон не применён (amount ≤ 0, NaN или уже мёртв)
    Ignored,
    /// Урон применён, entity жив
    Wounded { remaining: f32 },
    /// Этот вызов убил entity (единственный раз за жизнь)
    Died,
}

impl DamageOutcome {
    pub fn is_death(&self) -> bool {
        matches!(self, DamageOutcome::Died)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HealthModel {
    current: f32,
    max: f32,
    is_dead: bool,
}

impl Default for HealthModel {
    fn default() -> Self {
        Self::new(100.0)
    }
}

impl HealthModel {
    /// `max` is expected to be positive; non-positive values are clamped
    /// to a minimal positive pool so the invariant `max > 0` holds.
    pub fn new(max: f32) -> Self {
        let max = if max > 0.0 { max } else { f32::EPSILON };
        Self {
            current: max,
            max,
            is_dead: false,
        }
    }

    pub fn current(&self) -> f32 {
        self.current
    }

    pub fn max(&self) -> f32 {
        self.max
    }

    pub fn is_dead(&self) -> bool {
        self.is_dead
    }

    pub fn is_alive(&self) -> bool {
        !self.is_dead
    }

    pub fn fraction(&self) -> f32 {
        self.current / self.max
    }

    pub fn apply_damage(&mut self, amount: f32) -> DamageOutcome {
        // Поздние события урона после смерти — тихий no-op
        if self.is_dead {
            return DamageOutcome::Ignored;
        }

        // NaN тоже отсекается этим сравнением
        if !(amount > 0.0) {
            return DamageOutcome::Ignored;
        }

        self.current = (self.current - amount).clamp(0.0, self.max);

        if self.current <= 0.0 {
            self.current = 0.0;
            self.is_dead = true;
            DamageOutcome::Died
        } else {
            DamageOutcome::Wounded {
                remaining: self.current,
            }
        }
    }

    /// Explicit revival (object-pool reuse).
    pub fn reset(&mut self) {
        self.current = self.max;
        self.is_dead = false;
    }
}
