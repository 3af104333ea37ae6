// Character motion state shared with the cosmetic layer and AI

use glam::Vec3;

/// Posture of a character
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Stance {
    #[default]
    Stand,
    Crouch,
    Slide,
}

impl Stance {
    /// Stances that use the crouch capsule
    pub fn is_low(self) -> bool {
        matches!(self, Stance::Crouch | Stance::Slide)
    }

    pub fn name(self) -> &'static str {
        match self {
            Stance::Stand => "stand",
            Stance::Crouch => "crouch",
            Stance::Slide => "slide",
        }
    }
}

/// Snapshot of a character's motion, written only by the motion controller
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CharacterState {
    pub grounded: bool,
    pub stance: Stance,
    pub velocity: Vec3,
    /// Realized velocity change per second; cosmetic only
    pub acceleration: Vec3,
}

impl CharacterState {
    /// Speed in the plane perpendicular to `up`
    pub fn planar_speed(&self, up: Vec3) -> f32 {
        crate::common::math::planar_speed(self.velocity, up)
    }
}
