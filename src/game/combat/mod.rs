// Combat: health, weapons, attack resolution and combat events

pub mod events;
pub mod handler;
pub mod health;
pub mod projectile;
pub mod resolver;
pub mod timer;
pub mod weapon;

pub use events::{CombatEvent, EventQueue};
pub use handler::WeaponHandler;
pub use health::{DamageOutcome, Health};
pub use projectile::{Projectile, ProjectileSystem};
pub use resolver::{apply_damage, apply_restore, resolve_attack, AttackOrigin, Hit};
pub use timer::Scheduler;
pub use weapon::{presets, Ammo, Attack, Weapon, WeaponId, WeaponKind, WeaponStats};
