// Motion tuning for characters
//
// Players and enemies run the same motion controller; they differ only in
// these numbers.

use crate::engine::physics::CapsuleDimensions;
use crate::error::ConfigError;

/// Movement, jump, slide and capsule tuning
#[derive(Debug, Clone, PartialEq)]
pub struct MotionStats {
    // Ground movement
    /// Standing ground speed (units/second)
    pub walk_speed: f32,
    /// Crouched ground speed
    pub crouch_speed: f32,
    /// Smoothing rate toward the standing target velocity
    pub walk_response: f32,
    /// Smoothing rate toward the crouched target velocity
    pub crouch_response: f32,

    // Jumping and air control
    /// Minimum vertical speed after a jump
    pub jump_speed: f32,
    /// Air steering stops adding speed above this planar speed
    pub air_speed: f32,
    pub air_acceleration: f32,
    /// Grace window after leaving the ground where a jump is still honored
    pub coyote_time: f32,
    /// Gravity multiplier while jump is held and still rising, in [0, 1]
    pub jump_sustain_gravity: f32,
    /// Vertical acceleration (negative pulls down)
    pub gravity: f32,

    // Sliding
    pub slide_start_speed: f32,
    pub slide_end_speed: f32,
    pub slide_friction: f32,
    pub slide_steer_acceleration: f32,
    pub slide_gravity: f32,

    // Capsule
    pub radius: f32,
    pub stand_height: f32,
    pub crouch_height: f32,
    /// Camera target as a fraction of capsule height
    pub stand_camera_target_height: f32,
    pub crouch_camera_target_height: f32,
    /// Smoothing rate of the camera target when the stance changes
    pub camera_target_response: f32,
}

/// Player tuning
pub const PLAYER_MOTION: MotionStats = MotionStats {
    walk_speed: 20.0,
    crouch_speed: 7.0,
    walk_response: 25.0,
    crouch_response: 20.0,

    jump_speed: 20.0,
    air_speed: 15.0,
    air_acceleration: 70.0,
    coyote_time: 0.2,
    jump_sustain_gravity: 0.4,
    gravity: -90.0,

    slide_start_speed: 25.0,
    slide_end_speed: 15.0,
    slide_friction: 0.8,
    slide_steer_acceleration: 5.0,
    slide_gravity: -90.0,

    radius: 0.5,
    stand_height: 2.0,
    crouch_height: 1.0,
    stand_camera_target_height: 0.9,
    crouch_camera_target_height: 0.7,
    camera_target_response: 15.0,
};

/// Enemy tuning: slower, weaker air control. The AI scales its move request
/// between the base and boosted chase speed, so `walk_speed` is the boosted one.
pub const ENEMY_MOTION: MotionStats = MotionStats {
    walk_speed: 7.0,
    crouch_speed: 3.0,
    walk_response: 25.0,
    crouch_response: 20.0,

    jump_speed: 12.0,
    air_speed: 6.0,
    air_acceleration: 30.0,
    coyote_time: 0.2,
    jump_sustain_gravity: 1.0,
    gravity: -90.0,

    slide_start_speed: 10.0,
    slide_end_speed: 5.0,
    slide_friction: 0.8,
    slide_steer_acceleration: 5.0,
    slide_gravity: -90.0,

    radius: 0.5,
    stand_height: 2.0,
    crouch_height: 1.0,
    stand_camera_target_height: 0.9,
    crouch_camera_target_height: 0.7,
    camera_target_response: 15.0,
};

impl Default for MotionStats {
    fn default() -> Self {
        PLAYER_MOTION
    }
}

impl MotionStats {
    /// Check every value the controller relies on
    pub fn validate(&self) -> Result<(), ConfigError> {
        ConfigError::require_positive("walk_speed", self.walk_speed)?;
        ConfigError::require_positive("crouch_speed", self.crouch_speed)?;
        ConfigError::require_positive("walk_response", self.walk_response)?;
        ConfigError::require_positive("crouch_response", self.crouch_response)?;
        ConfigError::require_positive("jump_speed", self.jump_speed)?;
        ConfigError::require_positive("air_speed", self.air_speed)?;
        ConfigError::require_positive("air_acceleration", self.air_acceleration)?;
        ConfigError::require_range("coyote_time", self.coyote_time, 0.0, f32::MAX)?;
        ConfigError::require_range("jump_sustain_gravity", self.jump_sustain_gravity, 0.0, 1.0)?;
        ConfigError::require_range("slide_friction", self.slide_friction, 0.0, f32::MAX)?;
        ConfigError::require_range(
            "slide_steer_acceleration",
            self.slide_steer_acceleration,
            0.0,
            f32::MAX,
        )?;
        ConfigError::require_ordered(
            "slide_end_speed",
            self.slide_end_speed,
            "slide_start_speed",
            self.slide_start_speed,
        )?;
        ConfigError::require_positive("radius", self.radius)?;
        ConfigError::require_positive("crouch_height", self.crouch_height)?;
        ConfigError::require_ordered(
            "crouch_height",
            self.crouch_height,
            "stand_height",
            self.stand_height,
        )?;
        ConfigError::require_ordered("radius * 2", self.radius * 2.0, "crouch_height", self.crouch_height)?;
        ConfigError::require_range(
            "stand_camera_target_height",
            self.stand_camera_target_height,
            0.0,
            1.0,
        )?;
        ConfigError::require_range(
            "crouch_camera_target_height",
            self.crouch_camera_target_height,
            0.0,
            1.0,
        )?;
        Ok(())
    }

    pub fn stand_capsule(&self) -> CapsuleDimensions {
        CapsuleDimensions::standing_on_feet(self.radius, self.stand_height)
    }

    pub fn crouch_capsule(&self) -> CapsuleDimensions {
        CapsuleDimensions::standing_on_feet(self.radius, self.crouch_height)
    }
}
