// Owns the equipped weapon of one wielder and turns attack input into attacks

use super::events::{CombatEvent, EventQueue};
use super::timer::Scheduler;
use super::weapon::{Attack, Discharge, Weapon, WeaponId, WeaponStats};
use crate::engine::input::CharacterInput;
use crate::error::ConfigError;
use crate::game::characters::EntityId;

#[derive(Debug, Clone, Copy, PartialEq)]
enum SwingPhase {
    /// Resolve the hit trace
    Hit(Attack),
    /// Lift the swing lockout
    Release,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct ScheduledSwing {
    weapon: WeaponId,
    phase: SwingPhase,
}

/// Weapon slot plus the pending melee callbacks of its owner
#[derive(Debug)]
pub struct WeaponHandler {
    owner: EntityId,
    weapon: Option<Weapon>,
    scheduler: Scheduler<ScheduledSwing>,
    ready: Vec<Attack>,
    last_swing_animation: Option<u32>,
    next_weapon_id: u64,
}

impl WeaponHandler {
    pub fn new(owner: EntityId) -> Self {
        Self {
            owner,
            weapon: None,
            scheduler: Scheduler::new(),
            ready: Vec::new(),
            last_swing_animation: None,
            next_weapon_id: 1,
        }
    }

    pub fn owner(&self) -> EntityId {
        self.owner
    }

    pub fn set_owner(&mut self, owner: EntityId) {
        self.owner = owner;
    }

    pub fn weapon(&self) -> Option<&Weapon> {
        self.weapon.as_ref()
    }

    /// Animation index of the most recent melee swing
    pub fn last_swing_animation(&self) -> Option<u32> {
        self.last_swing_animation
    }

    /// Replace the current weapon with a fresh instance built from `stats`.
    ///
    /// Invalid stats leave the current weapon in place.
    pub fn equip(&mut self, stats: WeaponStats, events: &mut EventQueue) -> Result<WeaponId, ConfigError> {
        let id = WeaponId(self.next_weapon_id);
        let weapon = Weapon::new(id, stats)?;
        self.next_weapon_id += 1;

        self.unequip(events);
        log::debug!("Entity {} equipped {}", self.owner, weapon.name());
        events.push(CombatEvent::WeaponEquipped {
            entity: self.owner,
            weapon: weapon.name().to_string(),
        });
        self.weapon = Some(weapon);
        Ok(id)
    }

    /// Destroy the current weapon and drop its pending swing callbacks
    pub fn unequip(&mut self, events: &mut EventQueue) -> Option<WeaponStats> {
        let old = self.weapon.take()?;
        let old_id = old.id();
        self.scheduler.retain(|swing| swing.weapon != old_id);
        events.push(CombatEvent::WeaponUnequipped {
            entity: self.owner,
            weapon: old.name().to_string(),
        });
        Some(old.stats().clone())
    }

    pub fn can_fire(&self, now: f32) -> bool {
        self.weapon.as_ref().is_some_and(|weapon| weapon.can_fire(now))
    }

    /// Pull the trigger. Ranged attacks become ready at once; a melee swing
    /// schedules its hit and lockout release.
    pub fn fire(&mut self, now: f32) -> bool {
        let Some(weapon) = self.weapon.as_mut() else {
            return false;
        };
        let weapon_id = weapon.id();

        match weapon.trigger(now) {
            Some(Discharge::Immediate(attack)) => {
                self.ready.push(attack);
                true
            }
            Some(Discharge::Swing {
                animation_index,
                hit_delay,
                duration,
                hit,
            }) => {
                self.last_swing_animation = Some(animation_index);
                self.scheduler.schedule(
                    now,
                    hit_delay,
                    ScheduledSwing {
                        weapon: weapon_id,
                        phase: SwingPhase::Hit(hit),
                    },
                );
                self.scheduler.schedule(
                    now,
                    duration,
                    ScheduledSwing {
                        weapon: weapon_id,
                        phase: SwingPhase::Release,
                    },
                );
                true
            }
            None => false,
        }
    }

    pub fn reload(&mut self) -> u32 {
        let moved = self.weapon.as_mut().map_or(0, Weapon::reload);
        if moved > 0 {
            log::debug!("Entity {} reloaded {} rounds", self.owner, moved);
        }
        moved
    }

    /// Apply one tick of attack input
    pub fn update_input(&mut self, input: &CharacterInput, now: f32) {
        let automatic = self.weapon.as_ref().is_some_and(Weapon::is_automatic);
        if input.attack || (automatic && input.attack_sustain) {
            self.fire(now);
        }
        if input.reload {
            self.reload();
        }
    }

    /// Run scheduled swing phases that are due
    pub fn update(&mut self, now: f32) {
        for swing in self.scheduler.drain_due(now) {
            let Some(weapon) = self.weapon.as_mut().filter(|w| w.id() == swing.weapon) else {
                continue;
            };
            match swing.phase {
                SwingPhase::Hit(attack) => self.ready.push(attack),
                SwingPhase::Release => weapon.release_lockout(),
            }
        }
    }

    /// Attacks waiting to be resolved against the world
    pub fn take_attacks(&mut self) -> Vec<Attack> {
        std::mem::take(&mut self.ready)
    }

    pub fn pending_swings(&self) -> usize {
        self.scheduler.len()
    }
}
