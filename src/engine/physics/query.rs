// Collision query contract consumed by the character motors, combat and AI

use glam::{Quat, Vec3};

use super::collision::LayerMask;
use crate::game::characters::EntityId;

/// Capsule shape of a character, expressed relative to its feet
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CapsuleDimensions {
    pub radius: f32,
    /// Total height including both hemispheres
    pub height: f32,
    /// Offset from the feet to the capsule center along the up axis
    pub y_offset: f32,
}

impl CapsuleDimensions {
    /// Capsule standing on its feet (center at half height)
    pub fn standing_on_feet(radius: f32, height: f32) -> Self {
        Self {
            radius,
            height,
            y_offset: height * 0.5,
        }
    }

    /// Half-length of the cylindrical section
    pub fn half_segment(&self) -> f32 {
        ((self.height - 2.0 * self.radius) * 0.5).max(0.0)
    }

    /// World-space capsule center for a character at `position`
    pub fn center(&self, position: Vec3, up: Vec3) -> Vec3 {
        position + up * self.y_offset
    }
}

/// Position and orientation of a collision body (position is at the feet)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pose {
    pub position: Vec3,
    pub rotation: Quat,
}

impl Pose {
    pub fn new(position: Vec3, rotation: Quat) -> Self {
        Self { position, rotation }
    }

    /// Local +Z axis in world space
    pub fn forward(&self) -> Vec3 {
        self.rotation * Vec3::Z
    }
}

impl Default for Pose {
    fn default() -> Self {
        Self::new(Vec3::ZERO, Quat::IDENTITY)
    }
}

/// Result of probing for ground under a capsule
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GroundingStatus {
    /// Standing on a walkable surface this tick
    pub is_stable_on_ground: bool,
    /// Any surface was found under the capsule, walkable or not
    pub found_any_ground: bool,
    /// Normal of the surface found (up when nothing was found)
    pub ground_normal: Vec3,
    /// Gap between the feet and the surface found
    pub ground_distance: f32,
}

impl GroundingStatus {
    /// Nothing under the capsule
    pub fn airborne(up: Vec3) -> Self {
        Self {
            is_stable_on_ground: false,
            found_any_ground: false,
            ground_normal: up,
            ground_distance: f32::INFINITY,
        }
    }
}

impl Default for GroundingStatus {
    fn default() -> Self {
        Self::airborne(Vec3::Y)
    }
}

/// Outcome of sweeping a capsule through the world for one tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SweepResult {
    pub position: Vec3,
    /// Velocity after sliding along every surface hit
    pub velocity: Vec3,
    pub grounding: GroundingStatus,
    /// Number of surfaces hit during the sweep
    pub hit_count: usize,
    /// Normal of the last surface the capsule slid along
    pub last_hit_normal: Option<Vec3>,
    /// The capsule started inside geometry and had to be pushed out
    pub depenetrated: bool,
}

/// Parameters of a capsule sweep
#[derive(Debug, Clone, Copy)]
pub struct SweepParams {
    pub capsule: CapsuleDimensions,
    pub up: Vec3,
    pub mask: LayerMask,
    /// Body to ignore (the character's own collider)
    pub ignore: Option<EntityId>,
    /// Pull the capsule down onto ground found within probe distance
    pub snap_to_ground: bool,
}

/// A ray or shape cast hit
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    /// Entity owning the collider that was hit, `None` for level geometry
    pub entity: Option<EntityId>,
    pub point: Vec3,
    pub normal: Vec3,
    pub distance: f32,
}

/// A body found by an overlap query
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverlapHit {
    pub entity: EntityId,
    /// Center of the body's collider
    pub center: Vec3,
}

/// Collision engine queries used by the simulation core
///
/// Implemented by `CollisionWorld`; any other backend can be plugged in.
pub trait CollisionQueryProvider {
    /// Move a capsule by `velocity * dt`, sliding along obstacles, then probe for ground
    fn sweep_capsule(&self, pose: &Pose, velocity: Vec3, dt: f32, params: &SweepParams) -> SweepResult;

    /// Count colliders overlapping a capsule placed at `pose`
    fn overlap_capsule(
        &self,
        pose: &Pose,
        capsule: &CapsuleDimensions,
        up: Vec3,
        mask: LayerMask,
        ignore: Option<EntityId>,
    ) -> usize;

    /// Probe for walkable ground directly below a capsule
    fn probe_ground(
        &self,
        pose: &Pose,
        capsule: &CapsuleDimensions,
        up: Vec3,
        mask: LayerMask,
        ignore: Option<EntityId>,
    ) -> GroundingStatus;

    /// First hit along a ray
    fn raycast(
        &self,
        origin: Vec3,
        direction: Vec3,
        max_distance: f32,
        mask: LayerMask,
        ignore: Option<EntityId>,
    ) -> Option<RayHit>;

    /// First hit of a sphere swept along a ray
    fn sphere_cast(
        &self,
        origin: Vec3,
        radius: f32,
        direction: Vec3,
        max_distance: f32,
        mask: LayerMask,
        ignore: Option<EntityId>,
    ) -> Option<RayHit>;

    /// Bodies whose colliders touch a sphere
    fn overlap_sphere(&self, center: Vec3, radius: f32, mask: LayerMask) -> Vec<OverlapHit>;
}
