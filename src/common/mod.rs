// Shared helpers used by the engine and game layers

pub mod math;
