// In-flight projectiles, advanced and resolved once per tick

use glam::Vec3;

use super::resolver::Hit;
use crate::engine::physics::{CollisionQueryProvider, LayerMask};
use crate::game::characters::EntityId;

/// Acceleration applied to projectiles with a gravity scale of 1
pub const PROJECTILE_GRAVITY: Vec3 = Vec3::new(0.0, -9.81, 0.0);

#[derive(Debug, Clone, PartialEq)]
pub struct Projectile {
    pub id: u64,
    pub owner: EntityId,
    pub position: Vec3,
    pub velocity: Vec3,
    pub radius: f32,
    pub gravity_scale: f32,
    /// Seconds left before it expires
    pub remaining: f32,
    pub damage: f32,
    pub mask: LayerMask,
}

#[derive(Debug, Default)]
pub struct ProjectileSystem {
    projectiles: Vec<Projectile>,
    next_id: u64,
}

impl ProjectileSystem {
    pub fn new() -> Self {
        Self::default()
    }

    #[allow(clippy::too_many_arguments)]
    pub fn spawn(
        &mut self,
        owner: EntityId,
        position: Vec3,
        velocity: Vec3,
        radius: f32,
        gravity_scale: f32,
        lifetime: f32,
        damage: f32,
        mask: LayerMask,
    ) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        self.projectiles.push(Projectile {
            id,
            owner,
            position,
            velocity,
            radius,
            gravity_scale,
            remaining: lifetime,
            damage,
            mask,
        });
        id
    }

    /// Move every projectile along its path for `dt`. Returns the hits of
    /// projectiles that touched something; those and expired ones are removed.
    pub fn update(&mut self, queries: &dyn CollisionQueryProvider, dt: f32) -> Vec<Hit> {
        if dt <= 0.0 {
            return Vec::new();
        }

        let mut hits = Vec::new();
        self.projectiles.retain_mut(|projectile| {
            projectile.remaining -= dt;
            if projectile.remaining < 0.0 {
                log::debug!("Projectile {} expired", projectile.id);
                return false;
            }

            let travel = projectile.velocity * dt;
            let distance = travel.length();
            if distance > f32::EPSILON {
                let cast = if projectile.radius > 0.0 {
                    queries.sphere_cast(
                        projectile.position,
                        projectile.radius,
                        travel,
                        distance,
                        projectile.mask,
                        Some(projectile.owner),
                    )
                } else {
                    queries.raycast(
                        projectile.position,
                        travel,
                        distance,
                        projectile.mask,
                        Some(projectile.owner),
                    )
                };

                if let Some(ray_hit) = cast {
                    hits.push(Hit {
                        source: projectile.owner,
                        target: ray_hit.entity,
                        point: ray_hit.point,
                        damage: projectile.damage,
                    });
                    return false;
                }
            }

            projectile.position += travel;
            projectile.velocity += PROJECTILE_GRAVITY * projectile.gravity_scale * dt;
            true
        });
        hits
    }

    /// Drop every projectile fired by `owner`
    pub fn remove_owned_by(&mut self, owner: EntityId) {
        self.projectiles.retain(|projectile| projectile.owner != owner);
    }

    pub fn iter(&self) -> impl Iterator<Item = &Projectile> {
        self.projectiles.iter()
    }

    pub fn len(&self) -> usize {
        self.projectiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.projectiles.is_empty()
    }
}
