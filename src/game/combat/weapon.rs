// Weapon definitions and per-instance firing state
//
// One struct carries the shared cooldown/damage fields; what a trigger pull
// does is decided by the `WeaponKind` payload.

use crate::error::ConfigError;

/// Identifies a weapon instance; a re-equip always gets a fresh id
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WeaponId(pub u64);

/// Clip and reserve configuration of an ammo-based weapon
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AmmoSpec {
    pub clip_size: u32,
    /// Rounds held outside the clip when the weapon is created
    pub reserve: u32,
    /// Fire without ever consuming rounds
    pub infinite: bool,
}

impl Default for AmmoSpec {
    fn default() -> Self {
        Self {
            clip_size: 30,
            reserve: 90,
            infinite: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeleeSpec {
    /// Length of the hit trace from the wielder's eye
    pub reach: f32,
    /// Swept sphere radius of the hit trace (0 = ray)
    pub radius: f32,
    /// Delay between the trigger and the hit trace
    pub hit_delay: f32,
    /// Time until another swing can start
    pub duration: f32,
    /// Number of swing animations cycled through
    pub animation_count: u32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HitscanSpec {
    pub range: f32,
    /// Swept sphere radius (0 = ray)
    pub radius: f32,
    pub ammo: AmmoSpec,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProjectileSpec {
    pub speed: f32,
    /// Seconds before an unresolved projectile expires
    pub lifetime: f32,
    pub radius: f32,
    /// Multiplier on projectile gravity (0 = straight flight)
    pub gravity_scale: f32,
    pub ammo: AmmoSpec,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WeaponKind {
    Melee(MeleeSpec),
    Hitscan(HitscanSpec),
    Projectile(ProjectileSpec),
}

#[derive(Debug, Clone, PartialEq)]
pub struct WeaponStats {
    pub name: String,
    pub damage: f32,
    /// Minimum seconds between two trigger pulls
    pub fire_rate: f32,
    /// Keep firing while the attack input is held
    pub automatic: bool,
    pub kind: WeaponKind,
}

impl WeaponStats {
    pub fn validate(&self) -> Result<(), ConfigError> {
        ConfigError::require_positive("damage", self.damage)?;
        ConfigError::require_range("fire_rate", self.fire_rate, 0.0, f32::MAX)?;
        match &self.kind {
            WeaponKind::Melee(spec) => {
                ConfigError::require_positive("reach", spec.reach)?;
                ConfigError::require_range("radius", spec.radius, 0.0, f32::MAX)?;
                ConfigError::require_range("hit_delay", spec.hit_delay, 0.0, f32::MAX)?;
                ConfigError::require_ordered("hit_delay", spec.hit_delay, "duration", spec.duration)?;
                ConfigError::require_positive("animation_count", spec.animation_count as f32)?;
            }
            WeaponKind::Hitscan(spec) => {
                ConfigError::require_positive("range", spec.range)?;
                ConfigError::require_range("radius", spec.radius, 0.0, f32::MAX)?;
                spec.ammo.validate()?;
            }
            WeaponKind::Projectile(spec) => {
                ConfigError::require_positive("speed", spec.speed)?;
                ConfigError::require_positive("lifetime", spec.lifetime)?;
                ConfigError::require_range("radius", spec.radius, 0.0, f32::MAX)?;
                spec.ammo.validate()?;
            }
        }
        Ok(())
    }
}

impl AmmoSpec {
    fn validate(&self) -> Result<(), ConfigError> {
        ConfigError::require_positive("clip_size", self.clip_size as f32)
    }
}

/// Rounds in the clip and in reserve
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ammo {
    clip: u32,
    clip_size: u32,
    reserve: u32,
    infinite: bool,
}

impl Ammo {
    /// Starts with a full clip
    pub fn new(spec: &AmmoSpec) -> Self {
        Self {
            clip: spec.clip_size,
            clip_size: spec.clip_size,
            reserve: spec.reserve,
            infinite: spec.infinite,
        }
    }

    pub fn clip(&self) -> u32 {
        self.clip
    }

    pub fn clip_size(&self) -> u32 {
        self.clip_size
    }

    pub fn reserve(&self) -> u32 {
        self.reserve
    }

    pub fn is_infinite(&self) -> bool {
        self.infinite
    }

    pub fn total(&self) -> u32 {
        self.clip + self.reserve
    }

    /// Spend one round; false when the clip is empty
    pub fn consume(&mut self) -> bool {
        if self.infinite {
            return true;
        }
        if self.clip == 0 {
            return false;
        }
        self.clip -= 1;
        true
    }

    /// Move rounds from reserve into the clip. Returns how many moved.
    pub fn reload(&mut self) -> u32 {
        if self.infinite || self.reserve == 0 || self.clip >= self.clip_size {
            return 0;
        }
        let moved = (self.clip_size - self.clip).min(self.reserve);
        self.clip += moved;
        self.reserve -= moved;
        moved
    }
}

/// Something to resolve against the world
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Attack {
    /// Ray or sphere trace from the wielder's muzzle; first hit takes the damage
    Trace { range: f32, radius: f32, damage: f32 },
    /// Launch a projectile carrying the damage
    Projectile {
        speed: f32,
        lifetime: f32,
        radius: f32,
        gravity_scale: f32,
        damage: f32,
    },
}

/// What a successful trigger pull produced
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Discharge {
    Immediate(Attack),
    /// Melee swing; the hit lands after `hit_delay`, the lockout lifts after `duration`
    Swing {
        animation_index: u32,
        hit_delay: f32,
        duration: f32,
        hit: Attack,
    },
}

/// A weapon instance held by exactly one wielder
#[derive(Debug, Clone)]
pub struct Weapon {
    id: WeaponId,
    stats: WeaponStats,
    ammo: Option<Ammo>,
    last_fired: Option<f32>,
    swing_locked: bool,
    next_animation: u32,
}

impl Weapon {
    pub fn new(id: WeaponId, stats: WeaponStats) -> Result<Self, ConfigError> {
        stats.validate()?;
        let ammo = match &stats.kind {
            WeaponKind::Melee(_) => None,
            WeaponKind::Hitscan(spec) => Some(Ammo::new(&spec.ammo)),
            WeaponKind::Projectile(spec) => Some(Ammo::new(&spec.ammo)),
        };
        Ok(Self {
            id,
            stats,
            ammo,
            last_fired: None,
            swing_locked: false,
            next_animation: 0,
        })
    }

    pub fn id(&self) -> WeaponId {
        self.id
    }

    pub fn stats(&self) -> &WeaponStats {
        &self.stats
    }

    pub fn name(&self) -> &str {
        &self.stats.name
    }

    pub fn ammo(&self) -> Option<&Ammo> {
        self.ammo.as_ref()
    }

    pub fn is_automatic(&self) -> bool {
        self.stats.automatic
    }

    pub fn is_swing_locked(&self) -> bool {
        self.swing_locked
    }

    /// Cooldown elapsed and no swing in progress
    pub fn can_fire(&self, now: f32) -> bool {
        let cooled = match self.last_fired {
            Some(last) => now - last >= self.stats.fire_rate,
            None => true,
        };
        cooled && !self.swing_locked
    }

    /// Pull the trigger. `None` when gated by cooldown, lockout or an empty clip.
    pub fn trigger(&mut self, now: f32) -> Option<Discharge> {
        if !self.can_fire(now) {
            return None;
        }

        let damage = self.stats.damage;
        let discharge = match self.stats.kind {
            WeaponKind::Melee(spec) => {
                self.swing_locked = true;
                let animation_index = self.next_animation;
                self.next_animation = (self.next_animation + 1) % spec.animation_count.max(1);
                Discharge::Swing {
                    animation_index,
                    hit_delay: spec.hit_delay,
                    duration: spec.duration,
                    hit: Attack::Trace {
                        range: spec.reach,
                        radius: spec.radius,
                        damage,
                    },
                }
            }
            WeaponKind::Hitscan(spec) => {
                if !self.consume_round() {
                    return None;
                }
                Discharge::Immediate(Attack::Trace {
                    range: spec.range,
                    radius: spec.radius,
                    damage,
                })
            }
            WeaponKind::Projectile(spec) => {
                if !self.consume_round() {
                    return None;
                }
                Discharge::Immediate(Attack::Projectile {
                    speed: spec.speed,
                    lifetime: spec.lifetime,
                    radius: spec.radius,
                    gravity_scale: spec.gravity_scale,
                    damage,
                })
            }
        };

        self.last_fired = Some(now);
        Some(discharge)
    }

    /// Allow the next melee swing
    pub fn release_lockout(&mut self) {
        self.swing_locked = false;
    }

    /// Refill the clip from reserve. Returns rounds moved (0 for melee or no-op).
    pub fn reload(&mut self) -> u32 {
        self.ammo.as_mut().map_or(0, Ammo::reload)
    }

    fn consume_round(&mut self) -> bool {
        self.ammo.as_mut().map_or(false, Ammo::consume)
    }
}

/// Stock weapons
pub mod presets {
    use super::*;

    /// Automatic hitscan rifle, 30 round clip
    pub fn rifle() -> WeaponStats {
        WeaponStats {
            name: "Rifle".to_string(),
            damage: 25.0,
            fire_rate: 0.1,
            automatic: true,
            kind: WeaponKind::Hitscan(HitscanSpec {
                range: 100.0,
                radius: 0.0,
                ammo: AmmoSpec::default(),
            }),
        }
    }

    pub fn launcher() -> WeaponStats {
        WeaponStats {
            name: "Launcher".to_string(),
            damage: 60.0,
            fire_rate: 0.8,
            automatic: false,
            kind: WeaponKind::Projectile(ProjectileSpec {
                speed: 50.0,
                lifetime: 5.0,
                radius: 0.2,
                gravity_scale: 0.0,
                ammo: AmmoSpec {
                    clip_size: 4,
                    reserve: 12,
                    infinite: false,
                },
            }),
        }
    }

    pub fn machete() -> WeaponStats {
        WeaponStats {
            name: "Machete".to_string(),
            damage: 50.0,
            fire_rate: 0.0,
            automatic: false,
            kind: WeaponKind::Melee(MeleeSpec {
                reach: 3.0,
                radius: 0.0,
                hit_delay: 0.4,
                duration: 1.0,
                animation_count: 2,
            }),
        }
    }

    /// Enemy attack: short sphere trace gated by a 1.5 s cooldown
    pub fn claws() -> WeaponStats {
        WeaponStats {
            name: "Claws".to_string(),
            damage: 10.0,
            fire_rate: 1.5,
            automatic: true,
            kind: WeaponKind::Hitscan(HitscanSpec {
                range: 2.0,
                radius: 0.5,
                ammo: AmmoSpec {
                    clip_size: 1,
                    reserve: 0,
                    infinite: true,
                },
            }),
        }
    }
}
