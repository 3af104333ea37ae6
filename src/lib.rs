//! Kinematic character movement and combat simulation core.
//!
//! The crate is split the same way as the runtime:
//! - `engine`: fixed-step driver, input intent, collision queries and the kinematic motor
//! - `game`: characters and their motion state machine, combat, enemy AI and the simulation
//! - `common`: math helpers shared by both

pub mod common;
pub mod engine;
pub mod error;
pub mod game;

pub use engine::game_loop::GameLoop;
pub use engine::physics::{CollisionQueryProvider, CollisionWorld};
pub use error::{ConfigError, SimError};
pub use game::characters::EntityId;
pub use game::simulation::{CharacterView, Simulation, SimulationConfig};
