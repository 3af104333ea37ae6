// Reference collision world built on parry3d
//
// Static level brushes plus one upright capsule body per live character.
// Sweeps use parry's time-of-impact shape cast against every collider and keep
// the earliest hit; contact queries are only used to push shapes back out.

use std::collections::HashMap;

use glam::{Quat, Vec3};
use parry3d::math::{Isometry, Point, Real, Vector};
use parry3d::query::{self, Ray, RayCast};
use parry3d::shape::SharedShape;

use super::collision::{CollisionLayer, LayerMask};
use super::query::{
    CapsuleDimensions, CollisionQueryProvider, GroundingStatus, OverlapHit, Pose, RayHit,
    SweepParams, SweepResult,
};
use crate::game::characters::EntityId;

/// Gap kept between a moving shape and whatever it rests against
pub const SKIN_WIDTH: f32 = 0.01;

/// Contacts shallower than this are touching, not overlapping
const PENETRATION_EPSILON: f32 = 1e-4;

/// Maximum number of planes a sweep slides along per tick
const MAX_SLIDE_ITERATIONS: usize = 4;

/// Maximum push-out passes when a shape starts inside geometry
const MAX_DEPENETRATION_PASSES: usize = 4;

/// Tuning for ground detection
#[derive(Debug, Clone)]
pub struct WorldSettings {
    /// Steepest walkable slope in degrees
    pub max_stable_slope_degrees: f32,
    /// How far below the feet the ground probe looks
    pub ground_probe_distance: f32,
}

impl Default for WorldSettings {
    fn default() -> Self {
        Self {
            max_stable_slope_degrees: 60.0,
            ground_probe_distance: 0.15,
        }
    }
}

/// Static piece of level geometry
#[derive(Clone)]
struct Brush {
    shape: SharedShape,
    transform: Isometry<Real>,
    layer: CollisionLayer,
}

/// Capsule collider owned by a character
#[derive(Clone)]
struct Body {
    shape: SharedShape,
    center: Vec3,
    layer: CollisionLayer,
}

/// Borrowed view of any collider in the world
struct ColliderRef<'a> {
    entity: Option<EntityId>,
    shape: &'a SharedShape,
    transform: Isometry<Real>,
}

/// Deepest contact found at a shape position
#[derive(Debug, Clone, Copy)]
struct Penetration {
    entity: Option<EntityId>,
    /// Surface normal of the obstacle, pointing out of it
    normal: Vec3,
    depth: f32,
}

/// A blocked trace
#[derive(Debug, Clone, Copy)]
struct TraceHit {
    /// Fraction of the path travelled before the hit (after skin back-off)
    fraction: f32,
    /// Shape center at the hit
    center: Vec3,
    normal: Vec3,
    entity: Option<EntityId>,
}

/// Collision world with static brushes and character bodies
#[derive(Default)]
pub struct CollisionWorld {
    settings: WorldSettings,
    brushes: Vec<Brush>,
    bodies: HashMap<EntityId, Body>,
}

impl std::fmt::Debug for CollisionWorld {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CollisionWorld")
            .field("settings", &self.settings)
            .field("brushes", &self.brushes.len())
            .field("bodies", &self.bodies.len())
            .finish()
    }
}

impl CollisionWorld {
    /// Create an empty collision world
    pub fn new() -> Self {
        Self::with_settings(WorldSettings::default())
    }

    /// Create an empty collision world with custom ground settings
    pub fn with_settings(settings: WorldSettings) -> Self {
        Self {
            settings,
            brushes: Vec::new(),
            bodies: HashMap::new(),
        }
    }

    pub fn settings(&self) -> &WorldSettings {
        &self.settings
    }

    /// Add an axis-aligned box of level geometry
    pub fn add_box(&mut self, center: Vec3, half_extents: Vec3) -> usize {
        self.add_oriented_box(center, half_extents, Quat::IDENTITY)
    }

    /// Add a rotated box of level geometry (ramps, tilted walls)
    pub fn add_oriented_box(&mut self, center: Vec3, half_extents: Vec3, rotation: Quat) -> usize {
        let axis_angle = rotation.to_scaled_axis();
        let transform = Isometry::new(
            to_vector(center),
            Vector::new(axis_angle.x, axis_angle.y, axis_angle.z),
        );
        self.brushes.push(Brush {
            shape: SharedShape::cuboid(half_extents.x, half_extents.y, half_extents.z),
            transform,
            layer: CollisionLayer::World,
        });
        self.brushes.len() - 1
    }

    /// Get the number of level brushes
    pub fn brush_count(&self) -> usize {
        self.brushes.len()
    }

    /// Register or replace the capsule body of a character
    pub fn insert_body(
        &mut self,
        entity: EntityId,
        layer: CollisionLayer,
        position: Vec3,
        capsule: &CapsuleDimensions,
    ) {
        self.bodies.insert(
            entity,
            Body {
                shape: capsule_shape(capsule),
                center: capsule.center(position, Vec3::Y),
                layer,
            },
        );
    }

    /// Move a body and refresh its shape. Unknown entities are ignored.
    pub fn update_body(&mut self, entity: EntityId, position: Vec3, capsule: &CapsuleDimensions) {
        if let Some(body) = self.bodies.get_mut(&entity) {
            body.shape = capsule_shape(capsule);
            body.center = capsule.center(position, Vec3::Y);
        }
    }

    /// Remove a body, returning whether it existed
    pub fn remove_body(&mut self, entity: EntityId) -> bool {
        self.bodies.remove(&entity).is_some()
    }

    /// Collider center of a body
    pub fn body_center(&self, entity: EntityId) -> Option<Vec3> {
        self.bodies.get(&entity).map(|body| body.center)
    }

    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    fn colliders(
        &self,
        mask: LayerMask,
        ignore: Option<EntityId>,
    ) -> impl Iterator<Item = ColliderRef<'_>> {
        let brushes = self
            .brushes
            .iter()
            .filter(move |brush| mask.contains(brush.layer))
            .map(|brush| ColliderRef {
                entity: None,
                shape: &brush.shape,
                transform: brush.transform,
            });

        let bodies = self
            .bodies
            .iter()
            .filter(move |(entity, body)| mask.contains(body.layer) && Some(**entity) != ignore)
            .map(|(entity, body)| ColliderRef {
                entity: Some(*entity),
                shape: &body.shape,
                transform: isometry_at(body.center),
            });

        brushes.chain(bodies)
    }

    /// Deepest overlap of `shape` centered at `center`, if any
    fn deepest_penetration(
        &self,
        shape: &SharedShape,
        center: Vec3,
        mask: LayerMask,
        ignore: Option<EntityId>,
    ) -> Option<Penetration> {
        let iso = isometry_at(center);
        let mut deepest: Option<Penetration> = None;

        for collider in self.colliders(mask, ignore) {
            let Ok(Some(contact)) =
                query::contact(&iso, &**shape, &collider.transform, &**collider.shape, 0.0)
            else {
                continue;
            };
            if contact.dist >= -PENETRATION_EPSILON {
                continue;
            }

            let depth = -contact.dist;
            if deepest.map_or(true, |d| depth > d.depth) {
                deepest = Some(Penetration {
                    entity: collider.entity,
                    normal: Vec3::new(contact.normal2.x, contact.normal2.y, contact.normal2.z),
                    depth,
                });
            }
        }

        deepest
    }

    /// Sweep `shape` from `start` to `end`, stopping at the first obstacle.
    /// A shape that starts inside something it moves into reports fraction 0.
    fn trace(
        &self,
        shape: &SharedShape,
        start: Vec3,
        end: Vec3,
        mask: LayerMask,
        ignore: Option<EntityId>,
    ) -> Option<TraceHit> {
        let delta = end - start;
        let distance = delta.length();
        if distance < 1e-6 {
            return None;
        }
        let direction = delta / distance;

        // Velocity covers the whole path, so the time of impact is the path fraction
        let iso = isometry_at(start);
        let velocity = to_vector(delta);
        let resting = Vector::<Real>::zeros();

        let mut first: Option<(f32, Vec3, Option<EntityId>)> = None;
        for collider in self.colliders(mask, ignore) {
            let Ok(Some(toi)) = query::time_of_impact(
                &iso,
                &velocity,
                &**shape,
                &collider.transform,
                &resting,
                &**collider.shape,
                1.0,
                false,
            ) else {
                continue;
            };
            if first.map_or(false, |(best, _, _)| best <= toi.toi) {
                continue;
            }

            // normal1 points out of the unrotated moving shape, toward the obstacle
            let normal = -Vec3::new(toi.normal1.x, toi.normal1.y, toi.normal1.z);
            let normal = normal.try_normalize().unwrap_or(-direction);
            first = Some((toi.toi, normal, collider.entity));
        }

        let (toi, normal, entity) = first?;
        let travelled = (toi * distance - SKIN_WIDTH).max(0.0);
        Some(TraceHit {
            fraction: travelled / distance,
            center: start + direction * travelled,
            normal,
            entity,
        })
    }

    /// Push a shape out of anything it overlaps
    fn depenetrate(
        &self,
        shape: &SharedShape,
        center: Vec3,
        mask: LayerMask,
        ignore: Option<EntityId>,
    ) -> Vec3 {
        let mut center = center;
        for _ in 0..MAX_DEPENETRATION_PASSES {
            match self.deepest_penetration(shape, center, mask, ignore) {
                Some(penetration) => {
                    center += penetration.normal * (penetration.depth + SKIN_WIDTH * 0.5);
                }
                None => break,
            }
        }
        center
    }

    fn is_stable_normal(&self, normal: Vec3, up: Vec3) -> bool {
        let min_dot = self.settings.max_stable_slope_degrees.to_radians().cos();
        normal.dot(up) >= min_dot - 1e-4
    }
}

impl CollisionQueryProvider for CollisionWorld {
    fn sweep_capsule(
        &self,
        pose: &Pose,
        velocity: Vec3,
        dt: f32,
        params: &SweepParams,
    ) -> SweepResult {
        let shape = capsule_shape(&params.capsule);
        let offset = params.up * params.capsule.y_offset;

        let start = pose.position + offset;
        let mut center = self.depenetrate(&shape, start, params.mask, params.ignore);
        let depenetrated = center != start;
        let mut velocity = velocity;
        let mut remaining = dt;
        let mut hit_count = 0;
        let mut last_hit_normal = None;

        for _ in 0..MAX_SLIDE_ITERATIONS {
            if remaining <= 0.0 || velocity.length_squared() < 1e-10 {
                break;
            }

            let end = center + velocity * remaining;
            match self.trace(&shape, center, end, params.mask, params.ignore) {
                None => {
                    center = end;
                    remaining = 0.0;
                }
                Some(hit) => {
                    center = hit.center;
                    remaining *= 1.0 - hit.fraction;
                    hit_count += 1;
                    last_hit_normal = Some(hit.normal);

                    // Slide along the surface
                    let into = velocity.dot(hit.normal);
                    if into < 0.0 {
                        velocity -= hit.normal * into;
                    }
                }
            }
        }

        let mut position = center - offset;
        let probe_pose = Pose::new(position, pose.rotation);
        let mut grounding =
            self.probe_ground(&probe_pose, &params.capsule, params.up, params.mask, params.ignore);

        if params.snap_to_ground && grounding.is_stable_on_ground && grounding.ground_distance > 0.0 {
            position -= params.up * grounding.ground_distance;
            grounding.ground_distance = 0.0;
        }

        // Landing on walkable ground removes any velocity into the surface
        if grounding.is_stable_on_ground {
            let into = velocity.dot(grounding.ground_normal);
            if into < 0.0 {
                velocity -= grounding.ground_normal * into;
            }
        }

        SweepResult {
            position,
            velocity,
            grounding,
            hit_count,
            last_hit_normal,
            depenetrated,
        }
    }

    fn overlap_capsule(
        &self,
        pose: &Pose,
        capsule: &CapsuleDimensions,
        up: Vec3,
        mask: LayerMask,
        ignore: Option<EntityId>,
    ) -> usize {
        let shape = capsule_shape(capsule);
        let iso = isometry_at(capsule.center(pose.position, up));
        self.colliders(mask, ignore)
            .filter(|collider| {
                matches!(
                    query::contact(&iso, &*shape, &collider.transform, &**collider.shape, 0.0),
                    Ok(Some(contact)) if contact.dist < -PENETRATION_EPSILON
                )
            })
            .count()
    }

    fn probe_ground(
        &self,
        pose: &Pose,
        capsule: &CapsuleDimensions,
        up: Vec3,
        mask: LayerMask,
        ignore: Option<EntityId>,
    ) -> GroundingStatus {
        let shape = capsule_shape(capsule);
        let start = capsule.center(pose.position, up);
        let probe = self.settings.ground_probe_distance + SKIN_WIDTH;
        let end = start - up * probe;

        match self.trace(&shape, start, end, mask, ignore) {
            Some(hit) => GroundingStatus {
                is_stable_on_ground: self.is_stable_normal(hit.normal, up),
                found_any_ground: true,
                ground_normal: hit.normal,
                ground_distance: hit.fraction * probe,
            },
            None => GroundingStatus::airborne(up),
        }
    }

    fn raycast(
        &self,
        origin: Vec3,
        direction: Vec3,
        max_distance: f32,
        mask: LayerMask,
        ignore: Option<EntityId>,
    ) -> Option<RayHit> {
        let dir = direction.try_normalize()?;
        let ray = Ray::new(to_point(origin), to_vector(dir));

        let mut closest: Option<RayHit> = None;
        for collider in self.colliders(mask, ignore) {
            let Some(toi) = collider
                .shape
                .cast_ray(&collider.transform, &ray, max_distance, true)
            else {
                continue;
            };
            if closest.map_or(false, |hit| hit.distance <= toi) {
                continue;
            }

            let normal = collider
                .shape
                .cast_ray_and_get_normal(&collider.transform, &ray, max_distance, true)
                .map(|intersection| {
                    Vec3::new(intersection.normal.x, intersection.normal.y, intersection.normal.z)
                })
                .unwrap_or(-dir);

            closest = Some(RayHit {
                entity: collider.entity,
                point: origin + dir * toi,
                normal,
                distance: toi,
            });
        }

        closest
    }

    fn sphere_cast(
        &self,
        origin: Vec3,
        radius: f32,
        direction: Vec3,
        max_distance: f32,
        mask: LayerMask,
        ignore: Option<EntityId>,
    ) -> Option<RayHit> {
        let dir = direction.try_normalize()?;
        let shape = SharedShape::ball(radius);
        let end = origin + dir * max_distance;

        self.trace(&shape, origin, end, mask, ignore)
            .map(|hit| RayHit {
                entity: hit.entity,
                point: hit.center - hit.normal * radius,
                normal: hit.normal,
                distance: hit.fraction * max_distance,
            })
    }

    fn overlap_sphere(&self, center: Vec3, radius: f32, mask: LayerMask) -> Vec<OverlapHit> {
        let ball = SharedShape::ball(radius);
        let iso = isometry_at(center);

        let mut hits: Vec<OverlapHit> = self
            .bodies
            .iter()
            .filter(|(_, body)| mask.contains(body.layer))
            .filter(|(_, body)| {
                matches!(
                    query::intersection_test(&iso, &*ball, &isometry_at(body.center), &*body.shape),
                    Ok(true)
                )
            })
            .map(|(entity, body)| OverlapHit {
                entity: *entity,
                center: body.center,
            })
            .collect();

        // HashMap order is arbitrary; keep results deterministic
        hits.sort_by_key(|hit| hit.entity);
        hits
    }
}

fn capsule_shape(capsule: &CapsuleDimensions) -> SharedShape {
    SharedShape::capsule_y(capsule.half_segment(), capsule.radius)
}

fn isometry_at(center: Vec3) -> Isometry<Real> {
    Isometry::translation(center.x, center.y, center.z)
}

fn to_vector(v: Vec3) -> Vector<Real> {
    Vector::new(v.x, v.y, v.z)
}

fn to_point(v: Vec3) -> Point<Real> {
    Point::new(v.x, v.y, v.z)
}
