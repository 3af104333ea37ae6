// Per-player input state management

use super::action::Action;
use glam::Vec2;
use std::collections::HashSet;

/// Represents the button state of a single player
#[derive(Debug, Default)]
pub struct PlayerInput {
    /// Actions that are currently pressed this frame
    pressed: HashSet<Action>,

    /// Actions that were just pressed this frame (press events)
    just_pressed: HashSet<Action>,

    /// Actions that were just released this frame (release events)
    just_released: HashSet<Action>,

    /// Look delta accumulated since the last update (mouse or stick)
    look_delta: Vec2,
}

impl PlayerInput {
    /// Create a new player input state
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if an action is currently pressed
    pub fn is_pressed(&self, action: Action) -> bool {
        self.pressed.contains(&action)
    }

    /// Check if an action was just pressed this frame
    pub fn just_pressed(&self, action: Action) -> bool {
        self.just_pressed.contains(&action)
    }

    /// Check if an action was just released this frame
    pub fn just_released(&self, action: Action) -> bool {
        self.just_released.contains(&action)
    }

    /// Register an action press
    pub fn press(&mut self, action: Action) {
        if self.pressed.insert(action) {
            self.just_pressed.insert(action);
        }
    }

    /// Register an action release
    pub fn release(&mut self, action: Action) {
        if self.pressed.remove(&action) {
            self.just_released.insert(action);
        }
    }

    /// Accumulate a look delta for this frame
    pub fn add_look(&mut self, delta: Vec2) {
        self.look_delta += delta;
    }

    /// Look delta accumulated this frame
    pub fn look_delta(&self) -> Vec2 {
        self.look_delta
    }

    /// Update input state for a new frame
    /// Call this once per frame after the input has been consumed
    pub fn update(&mut self) {
        self.just_pressed.clear();
        self.just_released.clear();
        self.look_delta = Vec2::ZERO;
    }

    /// Reset all input state
    pub fn reset(&mut self) {
        self.pressed.clear();
        self.update();
    }

    /// Directional input, x = right, y = forward, each in [-1, 1]
    ///
    /// Diagonals are not normalized here; the intent resolver clamps them.
    pub fn move_axis(&self) -> Vec2 {
        let mut axis = Vec2::ZERO;

        if self.is_pressed(Action::MoveLeft) {
            axis.x -= 1.0;
        }
        if self.is_pressed(Action::MoveRight) {
            axis.x += 1.0;
        }
        if self.is_pressed(Action::MoveBack) {
            axis.y -= 1.0;
        }
        if self.is_pressed(Action::MoveForward) {
            axis.y += 1.0;
        }

        axis
    }
}
