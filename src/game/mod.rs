// Game layer: characters, combat, enemy AI and the simulation that ties them together

pub mod ai;
pub mod characters;
pub mod combat;
pub mod simulation;
pub mod spawner;
