// Kinematic character motor
//
// The motor owns the collision-facing half of a character (pose, velocity,
// capsule, grounding) and drives a `CharacterController` through a fixed
// sequence of phases every tick:
//
// 1. `before_update`          stance changes that resize the capsule
// 2. grounding probe          finalized before anything reads it
// 3. `post_grounding_update`
// 4. `update_rotation`
// 5. `update_velocity`
// 6. capsule sweep            slide along obstacles, snap to ground
// 7. `after_update`           deferred capsule commits (stand-up check)

use glam::{Quat, Vec3};

use super::collision::LayerMask;
use super::query::{
    CapsuleDimensions, CollisionQueryProvider, GroundingStatus, Pose, SweepParams,
};
use crate::common::math;
use crate::game::characters::EntityId;

/// Per-phase callbacks a motor invokes while simulating one tick.
///
/// The hit callbacks default to no-ops so a controller only implements the
/// ones it cares about.
pub trait CharacterController {
    fn before_update(&mut self, motor: &mut KinematicMotor, dt: f32);

    fn post_grounding_update(&mut self, motor: &mut KinematicMotor, dt: f32);

    fn update_rotation(&mut self, rotation: &mut Quat, motor: &KinematicMotor, dt: f32);

    fn update_velocity(&mut self, velocity: &mut Vec3, motor: &mut KinematicMotor, dt: f32);

    fn after_update(
        &mut self,
        motor: &mut KinematicMotor,
        queries: &dyn CollisionQueryProvider,
        dt: f32,
    );

    /// Ground found under the capsule after the sweep
    fn on_ground_hit(&mut self, _normal: Vec3) {}

    /// The sweep slid along a surface
    fn on_movement_hit(&mut self, _normal: Vec3) {}

    /// The capsule started the tick overlapping something
    fn on_discrete_collision(&mut self) {}
}

/// Kinematic capsule moved by explicit velocity
#[derive(Debug, Clone)]
pub struct KinematicMotor {
    entity: Option<EntityId>,
    pose: Pose,
    velocity: Vec3,
    capsule: CapsuleDimensions,
    up: Vec3,
    mask: LayerMask,
    grounding: GroundingStatus,
    /// Skip ground probing and snapping for the rest of this tick
    force_unground: bool,
}

impl KinematicMotor {
    pub fn new(position: Vec3, capsule: CapsuleDimensions, mask: LayerMask) -> Self {
        Self {
            entity: None,
            pose: Pose::new(position, Quat::IDENTITY),
            velocity: Vec3::ZERO,
            capsule,
            up: Vec3::Y,
            mask,
            grounding: GroundingStatus::airborne(Vec3::Y),
            force_unground: false,
        }
    }

    /// Attach the collision body this motor must never collide with
    pub fn with_entity(mut self, entity: EntityId) -> Self {
        self.entity = Some(entity);
        self
    }

    pub fn entity(&self) -> Option<EntityId> {
        self.entity
    }

    pub fn pose(&self) -> &Pose {
        &self.pose
    }

    pub fn position(&self) -> Vec3 {
        self.pose.position
    }

    pub fn rotation(&self) -> Quat {
        self.pose.rotation
    }

    pub fn set_rotation(&mut self, rotation: Quat) {
        self.pose.rotation = rotation;
    }

    /// Teleport the motor, optionally zeroing its velocity
    pub fn set_position(&mut self, position: Vec3, kill_velocity: bool) {
        self.pose.position = position;
        if kill_velocity {
            self.velocity = Vec3::ZERO;
        }
    }

    pub fn velocity(&self) -> Vec3 {
        self.velocity
    }

    pub fn set_velocity(&mut self, velocity: Vec3) {
        self.velocity = velocity;
    }

    pub fn capsule(&self) -> &CapsuleDimensions {
        &self.capsule
    }

    pub fn set_capsule_dimensions(&mut self, radius: f32, height: f32, y_offset: f32) {
        self.capsule = CapsuleDimensions {
            radius,
            height,
            y_offset,
        };
    }

    pub fn up(&self) -> Vec3 {
        self.up
    }

    pub fn mask(&self) -> LayerMask {
        self.mask
    }

    pub fn grounding(&self) -> &GroundingStatus {
        &self.grounding
    }

    /// Leave the ground this tick: no probing, no snapping
    pub fn force_unground(&mut self) {
        self.force_unground = true;
        self.grounding = GroundingStatus {
            is_stable_on_ground: false,
            ..self.grounding
        };
    }

    pub fn is_forced_ungrounded(&self) -> bool {
        self.force_unground
    }

    /// Redirect `direction` along the surface with `normal`, unit length
    pub fn direction_tangent_to_surface(&self, direction: Vec3, normal: Vec3) -> Vec3 {
        math::direction_tangent_to_surface(direction, normal, self.up)
    }

    /// Count blocking colliders overlapping the capsule at its current pose
    pub fn character_overlap(&self, queries: &dyn CollisionQueryProvider) -> usize {
        queries.overlap_capsule(&self.pose, &self.capsule, self.up, self.mask, self.entity)
    }

    #[cfg(test)]
    pub(crate) fn set_grounding(&mut self, grounding: GroundingStatus) {
        self.grounding = grounding;
    }

    /// Run one tick of the phase sequence against `queries`
    pub fn simulate<C: CharacterController>(
        &mut self,
        controller: &mut C,
        queries: &dyn CollisionQueryProvider,
        dt: f32,
    ) {
        if dt <= 0.0 {
            return;
        }

        controller.before_update(self, dt);

        let was_grounded = self.grounding.is_stable_on_ground;
        self.grounding =
            queries.probe_ground(&self.pose, &self.capsule, self.up, self.mask, self.entity);
        controller.post_grounding_update(self, dt);

        let mut rotation = self.pose.rotation;
        controller.update_rotation(&mut rotation, self, dt);
        self.pose.rotation = rotation;

        let mut velocity = self.velocity;
        controller.update_velocity(&mut velocity, self, dt);
        self.velocity = velocity;

        let params = SweepParams {
            capsule: self.capsule,
            up: self.up,
            mask: self.mask,
            ignore: self.entity,
            snap_to_ground: was_grounded && !self.force_unground,
        };
        let result = queries.sweep_capsule(&self.pose, self.velocity, dt, &params);

        self.pose.position = result.position;
        self.velocity = result.velocity;
        self.grounding = result.grounding;
        if self.force_unground {
            self.grounding.is_stable_on_ground = false;
        }

        if result.depenetrated {
            controller.on_discrete_collision();
        }
        if let Some(normal) = result.last_hit_normal {
            controller.on_movement_hit(normal);
        }
        if self.grounding.found_any_ground {
            controller.on_ground_hit(self.grounding.ground_normal);
        }

        self.force_unground = false;
        controller.after_update(self, queries, dt);
    }
}
