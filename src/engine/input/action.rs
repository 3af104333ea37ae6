// Game action definitions

/// Represents all possible in-game actions
///
/// Device bindings live with the host; the simulation only sees actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    // Movement
    MoveForward,
    MoveBack,
    MoveLeft,
    MoveRight,
    Jump,
    Crouch,

    // Combat
    Attack,
    Reload,
}

impl Action {
    /// Every action, in declaration order
    pub const ALL: [Action; 8] = [
        Action::MoveForward,
        Action::MoveBack,
        Action::MoveLeft,
        Action::MoveRight,
        Action::Jump,
        Action::Crouch,
        Action::Attack,
        Action::Reload,
    ];

    /// Check if this action contributes to the move axis
    pub fn is_movement(self) -> bool {
        matches!(
            self,
            Action::MoveForward | Action::MoveBack | Action::MoveLeft | Action::MoveRight
        )
    }
}
