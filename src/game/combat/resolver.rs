// Resolves attacks against the world and applies their damage

use glam::Vec3;

use super::events::{CombatEvent, EventQueue};
use super::health::{DamageOutcome, Health};
use super::projectile::ProjectileSystem;
use super::weapon::Attack;
use crate::engine::physics::{CollisionQueryProvider, LayerMask};
use crate::game::characters::EntityId;

/// Where an attack starts and what it can hit
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AttackOrigin {
    pub attacker: EntityId,
    /// Muzzle or eye position
    pub origin: Vec3,
    pub direction: Vec3,
    pub mask: LayerMask,
}

/// A resolved hit carrying damage
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hit {
    pub source: EntityId,
    /// `None` when level geometry absorbed the hit
    pub target: Option<EntityId>,
    pub point: Vec3,
    pub damage: f32,
}

/// Resolve one attack. Traces return their first hit; projectiles are
/// handed to `projectiles` and resolve on a later tick.
pub fn resolve_attack(
    attack: &Attack,
    from: &AttackOrigin,
    queries: &dyn CollisionQueryProvider,
    projectiles: &mut ProjectileSystem,
) -> Option<Hit> {
    let direction = from.direction.try_normalize()?;

    match *attack {
        Attack::Trace {
            range,
            radius,
            damage,
        } => {
            let ray_hit = if radius > 0.0 {
                queries.sphere_cast(from.origin, radius, direction, range, from.mask, Some(from.attacker))
            } else {
                queries.raycast(from.origin, direction, range, from.mask, Some(from.attacker))
            }?;
            Some(Hit {
                source: from.attacker,
                target: ray_hit.entity,
                point: ray_hit.point,
                damage,
            })
        }
        Attack::Projectile {
            speed,
            lifetime,
            radius,
            gravity_scale,
            damage,
        } => {
            projectiles.spawn(
                from.attacker,
                from.origin,
                direction * speed,
                radius,
                gravity_scale,
                lifetime,
                damage,
                from.mask,
            );
            None
        }
    }
}

/// Damage `health` and queue the matching events
pub fn apply_damage(
    health: &mut Health,
    target: EntityId,
    amount: f32,
    source: Option<EntityId>,
    events: &mut EventQueue,
) -> DamageOutcome {
    let outcome = health.take_damage(amount);
    match outcome {
        DamageOutcome::Ignored => {}
        DamageOutcome::Damaged { current } => {
            events.push(CombatEvent::DamageTaken {
                entity: target,
                source,
                amount,
                current,
            });
        }
        DamageOutcome::Killed { dealt } => {
            events.push(CombatEvent::DamageTaken {
                entity: target,
                source,
                amount: dealt,
                current: 0.0,
            });
            log::debug!("Entity {} killed by {:?}", target, source);
            events.push(CombatEvent::Died {
                entity: target,
                killer: source,
            });
        }
    }
    outcome
}

/// Heal `health` and queue an event when anything was restored
pub fn apply_restore(health: &mut Health, target: EntityId, amount: f32, events: &mut EventQueue) -> f32 {
    let restored = health.restore(amount);
    if restored > 0.0 {
        events.push(CombatEvent::HealthRestored {
            entity: target,
            amount: restored,
            current: health.current(),
        });
    }
    restored
}
