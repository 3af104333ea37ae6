// Hit points of a combat actor

use crate::error::ConfigError;

/// Result of applying damage
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DamageOutcome {
    /// Already dead or a non-positive amount
    Ignored,
    Damaged { current: f32 },
    /// This hit took the actor to zero; `dealt` is the health it removed
    Killed { dealt: f32 },
}

/// Current and maximum health, `0 <= current <= max`. Death is final.
#[derive(Debug, Clone, PartialEq)]
pub struct Health {
    current: f32,
    max: f32,
    dead: bool,
}

impl Health {
    pub fn new(max: f32) -> Result<Self, ConfigError> {
        ConfigError::require_positive("max_health", max)?;
        Ok(Self {
            current: max,
            max,
            dead: false,
        })
    }

    pub fn current(&self) -> f32 {
        self.current
    }

    pub fn max(&self) -> f32 {
        self.max
    }

    pub fn fraction(&self) -> f32 {
        self.current / self.max
    }

    pub fn is_dead(&self) -> bool {
        self.dead
    }

    pub fn take_damage(&mut self, amount: f32) -> DamageOutcome {
        if self.dead || amount <= 0.0 {
            return DamageOutcome::Ignored;
        }

        let before = self.current;
        self.current = (self.current - amount).max(0.0);
        if self.current <= 0.0 {
            self.dead = true;
            DamageOutcome::Killed { dealt: before }
        } else {
            DamageOutcome::Damaged {
                current: self.current,
            }
        }
    }

    /// Heal up to max; returns how much was actually restored. The dead stay dead.
    pub fn restore(&mut self, amount: f32) -> f32 {
        if self.dead || amount <= 0.0 {
            return 0.0;
        }
        let old = self.current;
        self.current = (self.current + amount).min(self.max);
        self.current - old
    }
}
