// Turns per-frame button/axis intent into the requests consumed by the
// motion controller and the weapon handler. Players and AI both produce
// `CharacterInput`.

use glam::{EulerRot, Quat, Vec2, Vec3};

use super::action::Action;
use super::look::LookController;
use super::player::PlayerInput;

/// Crouch request for one tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CrouchInput {
    /// Keep the current crouch request
    #[default]
    None,
    /// Flip the persisted crouch request
    Toggle,
}

/// Raw intent of one character for one tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CharacterInput {
    /// View rotation (camera for players, facing for AI)
    pub rotation: Quat,
    /// x = right, y = forward; any length, clamped on resolve
    pub move_axis: Vec2,
    /// Edge: jump pressed this tick
    pub jump: bool,
    /// Level: jump held
    pub jump_sustain: bool,
    pub crouch: CrouchInput,
    /// Edge: attack pressed this tick
    pub attack: bool,
    /// Level: attack held
    pub attack_sustain: bool,
    pub reload: bool,
}

impl Default for CharacterInput {
    fn default() -> Self {
        Self::idle(Quat::IDENTITY)
    }
}

impl CharacterInput {
    /// No movement and no buttons, looking along `rotation`
    pub fn idle(rotation: Quat) -> Self {
        Self {
            rotation,
            move_axis: Vec2::ZERO,
            jump: false,
            jump_sustain: false,
            crouch: CrouchInput::None,
            attack: false,
            attack_sustain: false,
            reload: false,
        }
    }
}

/// World-space movement request consumed by the motion controller
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MovementRequest {
    pub rotation: Quat,
    /// Horizontal, length <= 1
    pub movement: Vec3,
    pub jump: bool,
    pub jump_sustain: bool,
    pub crouch: CrouchInput,
}

impl Default for MovementRequest {
    fn default() -> Self {
        Self::resolve(&CharacterInput::default())
    }
}

impl MovementRequest {
    /// Clamp the move axis to unit length and turn it into the horizontal
    /// frame of the view rotation.
    pub fn resolve(input: &CharacterInput) -> Self {
        let local = Vec3::new(input.move_axis.x, 0.0, input.move_axis.y).clamp_length_max(1.0);
        let movement = yaw_frame(input.rotation) * local;

        Self {
            rotation: input.rotation,
            movement,
            jump: input.jump,
            jump_sustain: input.jump_sustain,
            crouch: input.crouch,
        }
    }
}

/// Heading-only part of a view rotation
fn yaw_frame(rotation: Quat) -> Quat {
    let (yaw, _, _) = rotation.to_euler(EulerRot::YXZ);
    Quat::from_rotation_y(yaw)
}

/// Builds `CharacterInput` for a local player from buttons plus look deltas
#[derive(Debug, Clone, Default)]
pub struct IntentResolver {
    look: LookController,
}

impl IntentResolver {
    pub fn new(look: LookController) -> Self {
        Self { look }
    }

    pub fn look(&self) -> &LookController {
        &self.look
    }

    /// Consume this frame's look delta and sample the buttons
    pub fn resolve(&mut self, input: &PlayerInput) -> CharacterInput {
        self.look.update(input.look_delta());

        CharacterInput {
            rotation: self.look.rotation(),
            move_axis: input.move_axis(),
            jump: input.just_pressed(Action::Jump),
            jump_sustain: input.is_pressed(Action::Jump),
            crouch: if input.just_pressed(Action::Crouch) {
                CrouchInput::Toggle
            } else {
                CrouchInput::None
            },
            attack: input.just_pressed(Action::Attack),
            attack_sustain: input.is_pressed(Action::Attack),
            reload: input.just_pressed(Action::Reload),
        }
    }
}
