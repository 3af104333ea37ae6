// Input handling
//
// - `action`: game actions
// - `player`: per-player button and look state
// - `look`: yaw/pitch accumulation
// - `intent`: per-tick character input and the movement request built from it

pub mod action;
pub mod intent;
pub mod look;
pub mod player;

// Re-export commonly used types
pub use action::Action;
pub use intent::{CharacterInput, CrouchInput, IntentResolver, MovementRequest};
pub use look::LookController;
pub use player::PlayerInput;
