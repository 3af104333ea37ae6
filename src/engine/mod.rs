// Engine modules: fixed-step driver, input, collision and character motor

pub mod game_loop;
pub mod input;
pub mod physics;
