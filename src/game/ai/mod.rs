// Enemy AI: perception, patrol routes and the behavior state machine

pub mod brain;
pub mod patrol;
pub mod perception;

pub use brain::{AiConfig, AiState, BrainContext, EnemyBrain, TargetInfo};
pub use patrol::{Patrol, PatrolRoute};
pub use perception::{Observer, Vision};
