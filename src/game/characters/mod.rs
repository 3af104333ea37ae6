// Character system
//
// This module contains everything related to moving characters:
// - Character data structure and management
// - Motion tuning presets
// - Stance / grounding state
// - The motion state machine driven by the kinematic motor

pub mod character;
pub mod motion;
pub mod state;
pub mod stats;

// Re-export commonly used types
pub use character::{Character, CharacterManager, EntityId, Faction};
pub use motion::MotionController;
pub use state::{CharacterState, Stance};
pub use stats::{MotionStats, ENEMY_MOTION, PLAYER_MOTION};
