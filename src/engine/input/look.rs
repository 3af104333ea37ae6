// First-person look controller: accumulates look deltas into yaw and pitch

use glam::{EulerRot, Quat, Vec2};

/// Degrees turned per unit of look delta
pub const DEFAULT_SENSITIVITY: f32 = 0.1;

/// Pitch is kept just short of straight up/down so the view never flips
pub const MAX_PITCH_DEGREES: f32 = 89.0;

#[derive(Debug, Clone)]
pub struct LookController {
    /// Degrees, positive turns right
    yaw: f32,
    /// Degrees, positive looks down
    pitch: f32,
    sensitivity: f32,
}

impl Default for LookController {
    fn default() -> Self {
        Self::new(DEFAULT_SENSITIVITY)
    }
}

impl LookController {
    pub fn new(sensitivity: f32) -> Self {
        Self {
            yaw: 0.0,
            pitch: 0.0,
            sensitivity,
        }
    }

    /// Start looking the way `rotation` faces (e.g. the spawn orientation)
    pub fn from_rotation(rotation: Quat, sensitivity: f32) -> Self {
        let (yaw, pitch, _) = rotation.to_euler(EulerRot::YXZ);
        Self {
            yaw: yaw.to_degrees(),
            pitch: pitch.to_degrees().clamp(-MAX_PITCH_DEGREES, MAX_PITCH_DEGREES),
            sensitivity,
        }
    }

    /// Apply a look delta (x = right, y = up)
    pub fn update(&mut self, look: Vec2) {
        self.yaw = (self.yaw + look.x * self.sensitivity).rem_euclid(360.0);
        self.pitch = (self.pitch - look.y * self.sensitivity)
            .clamp(-MAX_PITCH_DEGREES, MAX_PITCH_DEGREES);
    }

    pub fn yaw_degrees(&self) -> f32 {
        self.yaw
    }

    pub fn pitch_degrees(&self) -> f32 {
        self.pitch
    }

    /// Full view rotation
    pub fn rotation(&self) -> Quat {
        Quat::from_euler(
            EulerRot::YXZ,
            self.yaw.to_radians(),
            self.pitch.to_radians(),
            0.0,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use glam::Vec3;

    #[test]
    fn test_look_right_turns_toward_positive_x() {
        let mut look = LookController::new(1.0);
        look.update(Vec2::new(90.0, 0.0));

        let forward = look.rotation() * Vec3::Z;
        assert!(forward.abs_diff_eq(Vec3::X, 1e-5));
    }

    #[test]
    fn test_look_up_raises_forward() {
        let mut look = LookController::new(1.0);
        look.update(Vec2::new(0.0, 30.0));

        let forward = look.rotation() * Vec3::Z;
        assert!(forward.y > 0.0);
        assert_abs_diff_eq!(look.pitch_degrees(), -30.0);
    }

    #[test]
    fn test_pitch_clamped() {
        let mut look = LookController::default();
        look.update(Vec2::new(0.0, 100_000.0));
        assert_abs_diff_eq!(look.pitch_degrees(), -MAX_PITCH_DEGREES);

        look.update(Vec2::new(0.0, -1_000_000.0));
        assert_abs_diff_eq!(look.pitch_degrees(), MAX_PITCH_DEGREES);
    }

    #[test]
    fn test_sensitivity_scales_delta() {
        let mut look = LookController::default();
        look.update(Vec2::new(100.0, 0.0));
        assert_abs_diff_eq!(look.yaw_degrees(), 10.0, epsilon = 1e-4);
    }

    #[test]
    fn test_from_rotation() {
        let look = LookController::from_rotation(Quat::from_rotation_y(0.5), 0.1);
        assert_abs_diff_eq!(look.yaw_degrees(), 0.5f32.to_degrees(), epsilon = 1e-3);
        assert_abs_diff_eq!(look.pitch_degrees(), 0.0, epsilon = 1e-3);
    }
}
