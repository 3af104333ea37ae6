// Collision queries and kinematic character movement on parry3d

mod collision;
mod motor;
mod query;
mod world;

pub use collision::{CollisionLayer, LayerMask};
pub use motor::{CharacterController, KinematicMotor};
pub use query::{
    CapsuleDimensions, CollisionQueryProvider, GroundingStatus, OverlapHit, Pose, RayHit,
    SweepParams, SweepResult,
};
pub use world::{CollisionWorld, WorldSettings, SKIN_WIDTH};

#[cfg(test)]
pub(crate) use motor::test_support;
