// Character motion state machine
//
// Stand / Crouch / Slide crossed with grounded / airborne. The controller
// integrates velocity by hand every tick; the motor only sweeps the capsule.
//
// Two copies of the state are kept: `state` (current) and `last_state`, the
// snapshot taken at the start of the previous tick. Edges such as "was in the
// air, now grounded" are read from `last_state`.

use glam::{Quat, Vec3};
use log::debug;

use super::state::{CharacterState, Stance};
use super::stats::MotionStats;
use crate::common::math;
use crate::engine::input::{CrouchInput, MovementRequest};
use crate::engine::physics::{CharacterController, CollisionQueryProvider, KinematicMotor};

#[derive(Debug, Clone)]
pub struct MotionController {
    stats: MotionStats,

    state: CharacterState,
    last_state: CharacterState,
    /// Snapshot taken in `before_update`, promoted to `last_state` at the end of the tick
    temp_state: CharacterState,

    requested_rotation: Quat,
    /// World-space, horizontal, length <= 1
    requested_movement: Vec3,
    requested_jump: bool,
    requested_sustained_jump: bool,
    requested_crouch: bool,
    /// Crouch was requested while airborne (landing into a full-speed slide)
    requested_crouch_in_air: bool,

    time_since_ungrounded: f32,
    time_since_jump_request: f32,
    ungrounded_due_to_jump: bool,

    /// Smoothed camera target height above the feet
    camera_target_height: f32,
}

impl MotionController {
    pub fn new(stats: MotionStats) -> Self {
        let camera_target_height = stats.stand_height * stats.stand_camera_target_height;
        let state = CharacterState::default();
        Self {
            stats,
            state,
            last_state: state,
            temp_state: state,
            requested_rotation: Quat::IDENTITY,
            requested_movement: Vec3::ZERO,
            requested_jump: false,
            requested_sustained_jump: false,
            requested_crouch: false,
            requested_crouch_in_air: false,
            time_since_ungrounded: 0.0,
            time_since_jump_request: 0.0,
            ungrounded_due_to_jump: false,
            camera_target_height,
        }
    }

    pub fn stats(&self) -> &MotionStats {
        &self.stats
    }

    pub fn state(&self) -> &CharacterState {
        &self.state
    }

    pub fn last_state(&self) -> &CharacterState {
        &self.last_state
    }

    pub fn is_crouch_requested(&self) -> bool {
        self.requested_crouch
    }

    pub fn is_jump_requested(&self) -> bool {
        self.requested_jump
    }

    /// Camera target height above the feet, smoothed across stance changes
    pub fn camera_target_height(&self) -> f32 {
        self.camera_target_height
    }

    /// Latch the request for the next tick
    pub fn update_input(&mut self, request: &MovementRequest) {
        self.requested_rotation = request.rotation;
        self.requested_movement = math::clamp_magnitude(request.movement, 1.0);

        let was_requesting_jump = self.requested_jump;
        self.requested_jump = was_requesting_jump || request.jump;
        if self.requested_jump && !was_requesting_jump {
            self.time_since_jump_request = 0.0;
        }
        self.requested_sustained_jump = request.jump_sustain;

        let was_requesting_crouch = self.requested_crouch;
        if request.crouch == CrouchInput::Toggle {
            self.requested_crouch = !self.requested_crouch;
        }
        if self.requested_crouch && !was_requesting_crouch {
            self.requested_crouch_in_air = !self.state.grounded;
        }
    }

    fn apply_capsule(&self, motor: &mut KinematicMotor, height: f32) {
        motor.set_capsule_dimensions(self.stats.radius, height, height * 0.5);
    }

    fn update_camera_target(&mut self, capsule_height: f32, dt: f32) {
        let fraction = if self.state.stance == Stance::Stand {
            self.stats.stand_camera_target_height
        } else {
            self.stats.crouch_camera_target_height
        };
        self.camera_target_height = math::lerp(
            self.camera_target_height,
            capsule_height * fraction,
            math::exp_smoothing(self.stats.camera_target_response, dt),
        );
    }

    fn update_grounded_velocity(&mut self, velocity: &mut Vec3, motor: &KinematicMotor, dt: f32) {
        self.time_since_ungrounded = 0.0;
        self.ungrounded_due_to_jump = false;

        let normal = motor.grounding().ground_normal;
        let ground_movement = motor.direction_tangent_to_surface(self.requested_movement, normal)
            * self.requested_movement.length();

        // Start sliding
        let moving = ground_movement.length_squared() > 0.0;
        let crouching = self.state.stance == Stance::Crouch;
        let was_standing = self.last_state.stance == Stance::Stand;
        let was_in_air = !self.last_state.grounded;
        if moving && crouching && (was_standing || was_in_air) {
            self.state.stance = Stance::Slide;

            // Landing flattens velocity; bring back last tick's fall so it feeds the slide
            if was_in_air {
                *velocity = math::project_on_plane(self.last_state.velocity, normal);
            }

            let mut effective_start_speed = self.stats.slide_start_speed;
            if was_in_air && !self.requested_crouch_in_air {
                effective_start_speed = 0.0;
                self.requested_crouch_in_air = false;
            }
            let slide_speed = effective_start_speed.max(velocity.length());

            let mut direction = motor.direction_tangent_to_surface(*velocity, normal);
            if direction == Vec3::ZERO {
                direction = ground_movement.normalize_or_zero();
            }
            *velocity = direction * slide_speed;

            debug!("Slide started at {:.1} u/s", slide_speed);
        }

        match self.state.stance {
            Stance::Stand | Stance::Crouch => {
                let (speed, response) = if self.state.stance == Stance::Stand {
                    (self.stats.walk_speed, self.stats.walk_response)
                } else {
                    (self.stats.crouch_speed, self.stats.crouch_response)
                };

                let target_velocity = ground_movement * speed;
                let move_velocity =
                    velocity.lerp(target_velocity, math::exp_smoothing(response, dt));
                self.state.acceleration = (move_velocity - *velocity) / dt;
                *velocity = move_velocity;
            }
            Stance::Slide => {
                // Friction
                *velocity -= *velocity * (self.stats.slide_friction * dt);

                // Slope
                let slope_force =
                    math::project_on_plane(-motor.up(), normal) * self.stats.slide_gravity;
                *velocity -= slope_force * dt;

                // Steer toward the requested direction without gaining speed
                let current_speed = velocity.length();
                let target_velocity = ground_movement * current_speed;
                let steer_force =
                    (target_velocity - *velocity) * (self.stats.slide_steer_acceleration * dt);
                let steer_velocity = math::clamp_magnitude(*velocity + steer_force, current_speed);
                self.state.acceleration = (steer_velocity - *velocity) / dt;
                *velocity = steer_velocity;

                if velocity.length() < self.stats.slide_end_speed {
                    self.state.stance = Stance::Crouch;
                    debug!("Slide ended");
                }
            }
        }
    }

    fn update_air_velocity(&mut self, velocity: &mut Vec3, motor: &KinematicMotor, dt: f32) {
        self.time_since_ungrounded += dt;
        let up = motor.up();

        if self.requested_movement.length_squared() > 0.0 {
            let planar_movement = math::project_on_plane(self.requested_movement, up)
                .normalize_or_zero()
                * self.requested_movement.length();
            let current_planar_velocity = math::project_on_plane(*velocity, up);
            let mut movement_force = planar_movement * self.stats.air_acceleration * dt;

            // Steep ground: no climbing it through air control
            let grounding = motor.grounding();
            if grounding.found_any_ground
                && movement_force.dot(*velocity + movement_force) > 0.0
            {
                let obstruction_normal =
                    math::project_on_plane(grounding.ground_normal, up).normalize_or_zero();
                if movement_force.dot(obstruction_normal) < 0.0 {
                    movement_force = math::project_on_plane(movement_force, obstruction_normal);
                }
            }

            if current_planar_velocity.length() < self.stats.air_speed {
                // Plain steering, capped at air speed
                let target_planar_velocity = math::clamp_magnitude(
                    current_planar_velocity + movement_force,
                    self.stats.air_speed,
                );
                movement_force = target_planar_velocity - current_planar_velocity;
            } else if current_planar_velocity.dot(movement_force) > 0.0 {
                // At the cap only redirect, never push further along the current heading
                movement_force =
                    math::project_on_plane(movement_force, current_planar_velocity.normalize());
            }

            self.state.acceleration = movement_force / dt;
            *velocity += movement_force;
        }

        let vertical_speed = velocity.dot(up);
        let mut effective_gravity = self.stats.gravity;
        if self.requested_sustained_jump && vertical_speed > 0.0 {
            effective_gravity *= self.stats.jump_sustain_gravity;
        }
        *velocity += up * (effective_gravity * dt);
    }

    fn update_jump(&mut self, velocity: &mut Vec3, motor: &mut KinematicMotor, dt: f32) {
        if !self.requested_jump {
            return;
        }

        let grounded = motor.grounding().is_stable_on_ground;
        let can_coyote_jump =
            self.time_since_ungrounded < self.stats.coyote_time && !self.ungrounded_due_to_jump;

        if grounded || can_coyote_jump {
            self.requested_jump = false;
            self.requested_crouch = false;
            self.requested_crouch_in_air = false;

            motor.force_unground();
            self.ungrounded_due_to_jump = true;

            let up = motor.up();
            let current_vertical_speed = velocity.dot(up);
            let target_vertical_speed = current_vertical_speed.max(self.stats.jump_speed);
            *velocity += up * (target_vertical_speed - current_vertical_speed);
        } else {
            // Keep the request around for a late landing, but never past the budget
            self.time_since_jump_request += dt;
            self.requested_jump = self.time_since_jump_request < self.stats.coyote_time;
        }
    }
}

impl CharacterController for MotionController {
    fn before_update(&mut self, motor: &mut KinematicMotor, _dt: f32) {
        self.temp_state = self.state;

        if self.requested_crouch && self.state.stance == Stance::Stand {
            self.state.stance = Stance::Crouch;
            self.apply_capsule(motor, self.stats.crouch_height);
        }
    }

    fn post_grounding_update(&mut self, motor: &mut KinematicMotor, _dt: f32) {
        if !motor.grounding().is_stable_on_ground && self.state.stance == Stance::Slide {
            self.state.stance = Stance::Crouch;
        }
    }

    fn update_rotation(&mut self, rotation: &mut Quat, motor: &KinematicMotor, _dt: f32) {
        let up = motor.up();
        let forward = math::project_on_plane(self.requested_rotation * Vec3::Z, up);
        if forward.length_squared() < 1e-8 {
            return;
        }
        if let Some(look) = math::look_rotation(forward, up) {
            *rotation = look;
        }
    }

    fn update_velocity(&mut self, velocity: &mut Vec3, motor: &mut KinematicMotor, dt: f32) {
        self.state.acceleration = Vec3::ZERO;

        if motor.grounding().is_stable_on_ground {
            self.update_grounded_velocity(velocity, motor, dt);
        } else {
            self.update_air_velocity(velocity, motor, dt);
        }

        self.update_jump(velocity, motor, dt);
    }

    fn after_update(
        &mut self,
        motor: &mut KinematicMotor,
        queries: &dyn CollisionQueryProvider,
        dt: f32,
    ) {
        // Stand up, but only if the standing capsule fits
        if !self.requested_crouch && self.state.stance != Stance::Stand {
            let previous_stance = self.state.stance;
            self.apply_capsule(motor, self.stats.stand_height);

            if motor.character_overlap(queries) > 0 {
                self.requested_crouch = true;
                self.apply_capsule(motor, self.stats.crouch_height);
                // Sliding needs ground; a blocked stand-up in the air lands in Crouch
                self.state.stance = if motor.grounding().is_stable_on_ground {
                    previous_stance
                } else {
                    Stance::Crouch
                };
                debug!("Stand-up blocked, staying {}", self.state.stance.name());
            } else {
                self.state.stance = Stance::Stand;
            }
        }

        self.state.grounded = motor.grounding().is_stable_on_ground;
        self.state.velocity = motor.velocity();
        self.last_state = self.temp_state;

        self.update_camera_target(motor.capsule().height, dt);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::input::CharacterInput;
    use crate::engine::physics::test_support::FlatGround;
    use crate::engine::physics::{GroundingStatus, LayerMask};
    use crate::game::characters::stats::PLAYER_MOTION;
    use approx::assert_abs_diff_eq;
    use glam::{EulerRot, Vec2};

    const DT: f32 = 1.0 / 60.0;

    fn setup() -> (MotionController, KinematicMotor) {
        let controller = MotionController::new(PLAYER_MOTION);
        let motor = KinematicMotor::new(Vec3::ZERO, PLAYER_MOTION.stand_capsule(), LayerMask::SOLID);
        (controller, motor)
    }

    fn request(move_axis: Vec2) -> MovementRequest {
        MovementRequest::resolve(&CharacterInput {
            move_axis,
            ..Default::default()
        })
    }

    fn forward() -> MovementRequest {
        request(Vec2::new(0.0, 1.0))
    }

    fn idle() -> MovementRequest {
        request(Vec2::ZERO)
    }

    fn with_jump(mut request: MovementRequest) -> MovementRequest {
        request.jump = true;
        request.jump_sustain = true;
        request
    }

    fn with_crouch_toggle(mut request: MovementRequest) -> MovementRequest {
        request.crouch = CrouchInput::Toggle;
        request
    }

    fn ground(normal: Vec3) -> GroundingStatus {
        GroundingStatus {
            is_stable_on_ground: true,
            found_any_ground: true,
            ground_normal: normal,
            ground_distance: 0.0,
        }
    }

    fn air() -> GroundingStatus {
        GroundingStatus::airborne(Vec3::Y)
    }

    /// Run only the velocity phase with a forced grounding result
    fn velocity_tick(
        controller: &mut MotionController,
        motor: &mut KinematicMotor,
        grounding: GroundingStatus,
        velocity: Vec3,
        request: &MovementRequest,
    ) -> Vec3 {
        controller.update_input(request);
        motor.set_grounding(grounding);
        let mut velocity = velocity;
        controller.update_velocity(&mut velocity, motor, DT);
        velocity
    }

    /// Run a full motor tick on flat ground
    fn full_tick(
        controller: &mut MotionController,
        motor: &mut KinematicMotor,
        queries: &FlatGround,
        request: &MovementRequest,
    ) {
        controller.update_input(request);
        motor.simulate(controller, queries, DT);
    }

    #[test]
    fn test_initial_state() {
        let (controller, _) = setup();
        assert_eq!(controller.state().stance, Stance::Stand);
        assert!(!controller.state().grounded);
    }

    #[test]
    fn test_walk_converges_without_overshoot() {
        let (mut controller, mut motor) = setup();
        let queries = FlatGround::new();

        let mut previous_speed = 0.0;
        for _ in 0..120 {
            full_tick(&mut controller, &mut motor, &queries, &forward());
            let speed = motor.velocity().length();
            assert!(speed <= PLAYER_MOTION.walk_speed + 1e-4, "overshot: {}", speed);
            assert!(speed >= previous_speed - 1e-4);
            previous_speed = speed;
        }

        assert_abs_diff_eq!(previous_speed, PLAYER_MOTION.walk_speed, epsilon = 0.01);
        assert!(controller.state().grounded);
        assert!(motor.position().z > 0.0);
    }

    #[test]
    fn test_acceleration_is_velocity_delta_over_dt() {
        let (mut controller, mut motor) = setup();
        let velocity = velocity_tick(&mut controller, &mut motor, ground(Vec3::Y), Vec3::ZERO, &forward());

        let expected = velocity / DT;
        assert!(controller.state().acceleration.abs_diff_eq(expected, 1e-3));
    }

    #[test]
    fn test_ground_movement_follows_slope_and_keeps_magnitude() {
        let (mut controller, mut motor) = setup();
        let normal = Vec3::new(0.0, 1.0, -0.5).normalize();
        let request = request(Vec2::new(0.0, 0.5));

        let mut velocity = Vec3::ZERO;
        for _ in 0..200 {
            velocity = velocity_tick(&mut controller, &mut motor, ground(normal), velocity, &request);
        }

        assert_abs_diff_eq!(velocity.dot(normal), 0.0, epsilon = 1e-3);
        assert_abs_diff_eq!(velocity.length(), 0.5 * PLAYER_MOTION.walk_speed, epsilon = 0.01);
    }

    #[test]
    fn test_crouch_while_moving_starts_slide_within_one_tick() {
        let (mut controller, mut motor) = setup();
        let queries = FlatGround::new();

        for _ in 0..60 {
            full_tick(&mut controller, &mut motor, &queries, &forward());
        }
        assert_eq!(controller.state().stance, Stance::Stand);

        full_tick(&mut controller, &mut motor, &queries, &with_crouch_toggle(forward()));

        assert_eq!(controller.state().stance, Stance::Slide);
        assert!(motor.velocity().length() > PLAYER_MOTION.walk_speed);
        assert_eq!(motor.capsule().height, PLAYER_MOTION.crouch_height);
    }

    #[test]
    fn test_slide_decays_and_ends_in_crouch() {
        let (mut controller, mut motor) = setup();
        let queries = FlatGround::new();

        for _ in 0..60 {
            full_tick(&mut controller, &mut motor, &queries, &forward());
        }
        full_tick(&mut controller, &mut motor, &queries, &with_crouch_toggle(forward()));

        let mut previous_speed = motor.velocity().length();
        let mut ticks = 0;
        while controller.state().stance == Stance::Slide {
            full_tick(&mut controller, &mut motor, &queries, &forward());
            let speed = motor.velocity().length();
            assert!(speed <= previous_speed + 1e-4, "slide gained speed on flat ground");
            previous_speed = speed;
            ticks += 1;
            assert!(ticks < 600, "slide never ended");
        }

        assert_eq!(controller.state().stance, Stance::Crouch);
        assert!(controller.is_crouch_requested());
    }

    /// Crouch while moving on `normal`, then settle the snapshot as a full tick would
    fn enter_slide(
        controller: &mut MotionController,
        motor: &mut KinematicMotor,
        normal: Vec3,
    ) -> Vec3 {
        controller.update_input(&with_crouch_toggle(forward()));
        controller.before_update(motor, DT);
        let velocity = velocity_tick(controller, motor, ground(normal), Vec3::ZERO, &forward());
        assert_eq!(controller.state().stance, Stance::Slide);

        controller.state.grounded = true;
        controller.last_state = controller.state;
        velocity
    }

    #[test]
    fn test_slide_accelerates_downhill() {
        let (mut controller, mut motor) = setup();
        // Surface descends toward +Z
        let normal = Vec3::new(0.0, 1.0, 0.5).normalize();
        let mut velocity = enter_slide(&mut controller, &mut motor, normal);

        let start_speed = velocity.length();
        for _ in 0..30 {
            velocity = velocity_tick(&mut controller, &mut motor, ground(normal), velocity, &forward());
        }
        assert!(velocity.length() > start_speed);
        assert_eq!(controller.state().stance, Stance::Slide);
    }

    #[test]
    fn test_slide_steering_never_adds_speed() {
        let (mut controller, mut motor) = setup();
        let mut velocity = enter_slide(&mut controller, &mut motor, Vec3::Y);

        // Steer hard to the right
        let right = request(Vec2::new(1.0, 0.0));
        for _ in 0..10 {
            let before = velocity.length();
            velocity = velocity_tick(&mut controller, &mut motor, ground(Vec3::Y), velocity, &right);
            assert!(velocity.length() <= before + 1e-4);
        }
        assert!(velocity.x > 0.0, "steering should bend the slide");
    }

    #[test]
    fn test_landing_slide_keeps_fall_direction() {
        let (mut controller, mut motor) = setup();
        let queries = FlatGround::new();
        motor.set_position(Vec3::new(0.0, 1.0, 0.0), true);
        motor.set_velocity(Vec3::new(10.0, -30.0, 0.0));

        // Crouch mid-air while asking to move along +Z
        full_tick(&mut controller, &mut motor, &queries, &with_crouch_toggle(forward()));
        assert!(!controller.state().grounded);

        full_tick(&mut controller, &mut motor, &queries, &forward());
        assert!(controller.state().grounded);

        full_tick(&mut controller, &mut motor, &queries, &forward());

        assert_eq!(controller.state().stance, Stance::Slide);
        let velocity = motor.velocity();
        assert!(velocity.x > 2.0 * velocity.z.abs(), "slide lost the fall heading: {velocity}");
        assert!(velocity.length() > PLAYER_MOTION.slide_end_speed);
    }

    #[test]
    fn test_midair_slide_without_crouch_request_keeps_speed_only() {
        let (mut controller, mut motor) = setup();
        // Crouch requested on the ground, then airborne
        velocity_tick(&mut controller, &mut motor, ground(Vec3::Y), Vec3::ZERO, &idle());
        controller.state.grounded = true;
        controller.update_input(&with_crouch_toggle(idle()));
        assert!(!controller.requested_crouch_in_air);

        controller.before_update(&mut motor, DT);
        controller.last_state.grounded = false;
        controller.last_state.velocity = Vec3::new(0.0, -5.0, 3.0);

        let velocity =
            velocity_tick(&mut controller, &mut motor, ground(Vec3::Y), Vec3::ZERO, &forward());
        assert_eq!(controller.state().stance, Stance::Crouch, "3 u/s is below the slide end speed");
        assert!(velocity.length() < PLAYER_MOTION.slide_start_speed);
    }

    #[test]
    fn test_jump_when_grounded() {
        let (mut controller, mut motor) = setup();

        let velocity = velocity_tick(
            &mut controller,
            &mut motor,
            ground(Vec3::Y),
            Vec3::new(5.0, 0.0, 0.0),
            &with_jump(idle()),
        );

        assert!(velocity.y >= PLAYER_MOTION.jump_speed);
        assert!(motor.is_forced_ungrounded());
        assert!(!controller.is_jump_requested());
    }

    #[test]
    fn test_jump_never_reduces_upward_speed() {
        let (mut controller, mut motor) = setup();

        // Within coyote time, already rising faster than a jump
        let velocity = velocity_tick(
            &mut controller,
            &mut motor,
            air(),
            Vec3::new(0.0, 30.0, 0.0),
            &with_jump(idle()),
        );

        let after_gravity = 30.0 + PLAYER_MOTION.gravity * PLAYER_MOTION.jump_sustain_gravity * DT;
        assert_abs_diff_eq!(velocity.y, after_gravity, epsilon = 1e-4);
        assert!(motor.is_forced_ungrounded(), "the jump was still consumed");
    }

    #[test]
    fn test_coyote_jump_within_window() {
        let (mut controller, mut motor) = setup();
        let mut velocity = velocity_tick(&mut controller, &mut motor, ground(Vec3::Y), Vec3::ZERO, &idle());

        for _ in 0..6 {
            velocity = velocity_tick(&mut controller, &mut motor, air(), velocity, &idle());
        }
        velocity = velocity_tick(&mut controller, &mut motor, air(), velocity, &with_jump(idle()));

        assert!(velocity.y >= PLAYER_MOTION.jump_speed + PLAYER_MOTION.gravity * DT);
        assert!(velocity.y > 0.0);
    }

    #[test]
    fn test_late_jump_is_dropped_not_deferred() {
        let (mut controller, mut motor) = setup();
        let mut velocity = velocity_tick(&mut controller, &mut motor, ground(Vec3::Y), Vec3::ZERO, &idle());

        for _ in 0..12 {
            velocity = velocity_tick(&mut controller, &mut motor, air(), velocity, &idle());
        }
        velocity = velocity_tick(&mut controller, &mut motor, air(), velocity, &with_jump(idle()));
        assert!(velocity.y < 0.0, "jump after coyote time must not be honored");

        for _ in 0..15 {
            velocity = velocity_tick(&mut controller, &mut motor, air(), velocity, &idle());
            assert!(velocity.y < 0.0);
        }
        assert!(!controller.is_jump_requested());

        // Landing later does not fire the stale request
        velocity = velocity_tick(&mut controller, &mut motor, ground(Vec3::Y), Vec3::ZERO, &idle());
        assert!(velocity.y < PLAYER_MOTION.jump_speed);
    }

    #[test]
    fn test_no_double_coyote_jump() {
        let (mut controller, mut motor) = setup();
        let mut velocity = velocity_tick(&mut controller, &mut motor, ground(Vec3::Y), Vec3::ZERO, &idle());

        velocity = velocity_tick(&mut controller, &mut motor, ground(Vec3::Y), velocity, &with_jump(idle()));
        assert!(velocity.y >= PLAYER_MOTION.jump_speed);

        velocity = velocity_tick(&mut controller, &mut motor, air(), velocity, &idle());
        let before = velocity.y;
        velocity = velocity_tick(&mut controller, &mut motor, air(), velocity, &with_jump(idle()));

        // Only gravity acted on the second request
        assert!(velocity.y < before);
    }

    #[test]
    fn test_buffered_jump_fires_on_landing() {
        let (mut controller, mut motor) = setup();
        let mut velocity = Vec3::new(0.0, -10.0, 0.0);

        // Airborne long enough that coyote time has passed
        for _ in 0..20 {
            velocity = velocity_tick(&mut controller, &mut motor, air(), velocity, &idle());
        }
        velocity = velocity_tick(&mut controller, &mut motor, air(), velocity, &with_jump(idle()));
        assert!(velocity.y < 0.0);

        for _ in 0..4 {
            velocity = velocity_tick(&mut controller, &mut motor, air(), velocity, &idle());
        }
        velocity = velocity_tick(&mut controller, &mut motor, ground(Vec3::Y), velocity, &idle());
        assert!(velocity.y >= PLAYER_MOTION.jump_speed);
    }

    #[test]
    fn test_air_speed_cap_blocks_forward_push() {
        let (mut controller, mut motor) = setup();
        let start = Vec3::new(0.0, 0.0, 20.0);

        let velocity = velocity_tick(&mut controller, &mut motor, air(), start, &forward());
        assert!(velocity.z <= start.z + 1e-5);

        // Sideways steering is still allowed at the cap
        let diagonal = request(Vec2::new(1.0, 1.0));
        let velocity = velocity_tick(&mut controller, &mut motor, air(), start, &diagonal);
        assert!(velocity.z <= start.z + 1e-5);
        assert!(velocity.x > 0.0);

        // Braking is allowed
        let back = request(Vec2::new(0.0, -1.0));
        let velocity = velocity_tick(&mut controller, &mut motor, air(), start, &back);
        assert!(velocity.z < start.z);
    }

    #[test]
    fn test_air_steering_below_cap_is_clamped() {
        let (mut controller, mut motor) = setup();
        let mut velocity = Vec3::ZERO;

        for _ in 0..120 {
            velocity = velocity_tick(&mut controller, &mut motor, air(), velocity, &forward());
            let planar = math::planar_speed(velocity, Vec3::Y);
            assert!(planar <= PLAYER_MOTION.air_speed + 1e-4);
        }
        assert_abs_diff_eq!(
            math::planar_speed(velocity, Vec3::Y),
            PLAYER_MOTION.air_speed,
            epsilon = 1e-3
        );
    }

    #[test]
    fn test_air_control_cannot_climb_steep_slope() {
        let (mut controller, mut motor) = setup();
        // 70 degree wall-like slope facing -Z; pushing +Z climbs it
        let normal = Quat::from_rotation_x(-70f32.to_radians()) * Vec3::Y;
        let steep = GroundingStatus {
            is_stable_on_ground: false,
            found_any_ground: true,
            ground_normal: normal,
            ground_distance: 0.0,
        };

        let velocity = velocity_tick(&mut controller, &mut motor, steep, Vec3::ZERO, &forward());
        assert_abs_diff_eq!(velocity.z, 0.0, epsilon = 1e-5);

        // Moving away from the slope is untouched
        let back = request(Vec2::new(0.0, -1.0));
        let velocity = velocity_tick(&mut controller, &mut motor, steep, Vec3::ZERO, &back);
        assert!(velocity.z < 0.0);
    }

    #[test]
    fn test_sustained_jump_reduces_gravity_while_rising() {
        let (mut controller, mut motor) = setup();
        let mut sustain = idle();
        sustain.jump_sustain = true;

        let rising = velocity_tick(&mut controller, &mut motor, air(), Vec3::new(0.0, 10.0, 0.0), &sustain);
        assert_abs_diff_eq!(rising.y, 10.0 + PLAYER_MOTION.gravity * 0.4 * DT, epsilon = 1e-4);

        let released = velocity_tick(&mut controller, &mut motor, air(), Vec3::new(0.0, 10.0, 0.0), &idle());
        assert_abs_diff_eq!(released.y, 10.0 + PLAYER_MOTION.gravity * DT, epsilon = 1e-4);

        let falling = velocity_tick(&mut controller, &mut motor, air(), Vec3::new(0.0, -1.0, 0.0), &sustain);
        assert_abs_diff_eq!(falling.y, -1.0 + PLAYER_MOTION.gravity * DT, epsilon = 1e-4);
    }

    #[test]
    fn test_stand_up_blocked_by_overlap() {
        let (mut controller, mut motor) = setup();
        let mut queries = FlatGround::new();

        full_tick(&mut controller, &mut motor, &queries, &with_crouch_toggle(idle()));
        assert_eq!(controller.state().stance, Stance::Crouch);

        // Something low overhead
        queries.overlaps = 1;
        full_tick(&mut controller, &mut motor, &queries, &with_crouch_toggle(idle()));
        assert_eq!(controller.state().stance, Stance::Crouch);
        assert_eq!(motor.capsule().height, PLAYER_MOTION.crouch_height);
        assert!(controller.is_crouch_requested(), "crouch request is raised again");

        // Obstacle gone, toggle again to stand
        queries.overlaps = 0;
        full_tick(&mut controller, &mut motor, &queries, &with_crouch_toggle(idle()));
        assert_eq!(controller.state().stance, Stance::Stand);
        assert_eq!(motor.capsule().height, PLAYER_MOTION.stand_height);
    }

    #[test]
    fn test_blocked_stand_up_in_air_after_slide_jump_is_crouch() {
        let (mut controller, mut motor) = setup();
        let mut queries = FlatGround::new();

        for _ in 0..60 {
            full_tick(&mut controller, &mut motor, &queries, &forward());
        }
        full_tick(&mut controller, &mut motor, &queries, &with_crouch_toggle(forward()));
        assert_eq!(controller.state().stance, Stance::Slide);

        // Jump out of the slide with a low ceiling overhead
        queries.overlaps = 1;
        full_tick(&mut controller, &mut motor, &queries, &with_jump(forward()));

        assert!(!controller.state().grounded);
        assert_eq!(controller.state().stance, Stance::Crouch);
        assert_eq!(motor.capsule().height, PLAYER_MOTION.crouch_height);
        assert!(controller.is_crouch_requested());
    }

    #[test]
    fn test_jump_uncrouches() {
        let (mut controller, mut motor) = setup();
        let queries = FlatGround::new();

        full_tick(&mut controller, &mut motor, &queries, &with_crouch_toggle(idle()));
        assert_eq!(controller.state().stance, Stance::Crouch);

        full_tick(&mut controller, &mut motor, &queries, &with_jump(idle()));
        assert_eq!(controller.state().stance, Stance::Stand);
        assert!(motor.velocity().y > 0.0);
    }

    #[test]
    fn test_rotation_is_yaw_only() {
        let (mut controller, motor) = setup();
        let mut look = idle();
        look.rotation = Quat::from_euler(EulerRot::YXZ, std::f32::consts::FRAC_PI_2, 0.6, 0.0);
        controller.update_input(&look);

        let mut rotation = Quat::IDENTITY;
        controller.update_rotation(&mut rotation, &motor, DT);

        assert!((rotation * Vec3::Z).abs_diff_eq(Vec3::X, 1e-5));
        assert!((rotation * Vec3::Y).abs_diff_eq(Vec3::Y, 1e-5));
    }

    #[test]
    fn test_degenerate_rotation_is_ignored() {
        let (mut controller, motor) = setup();
        let mut look = idle();
        look.rotation = Quat::from_rotation_x(-std::f32::consts::FRAC_PI_2);
        controller.update_input(&look);

        let original = Quat::from_rotation_y(0.3);
        let mut rotation = original;
        controller.update_rotation(&mut rotation, &motor, DT);
        assert_eq!(rotation, original);
    }

    #[test]
    fn test_camera_target_lowers_when_crouched() {
        let (mut controller, mut motor) = setup();
        let queries = FlatGround::new();
        let standing = controller.camera_target_height();
        assert_abs_diff_eq!(standing, 1.8, epsilon = 1e-5);

        full_tick(&mut controller, &mut motor, &queries, &with_crouch_toggle(idle()));
        for _ in 0..120 {
            full_tick(&mut controller, &mut motor, &queries, &idle());
        }
        assert_abs_diff_eq!(controller.camera_target_height(), 0.7, epsilon = 1e-3);
    }
}
