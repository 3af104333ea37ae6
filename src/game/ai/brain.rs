// Enemy decision making: Patrol -> Chase -> Attack
//
// The brain only produces `CharacterInput`, the same shape a player's input
// resolver produces, so enemies reuse the motion controller and weapon handler.

use glam::{Quat, Vec2, Vec3};
use log::debug;
use rand::Rng;

use super::patrol::{Patrol, PatrolRoute};
use super::perception::{Observer, Vision};
use crate::common::math;
use crate::engine::input::CharacterInput;
use crate::engine::physics::{CollisionQueryProvider, LayerMask};
use crate::error::ConfigError;
use crate::game::characters::EntityId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AiState {
    #[default]
    Patrol,
    Chase,
    Attack,
}

/// Enemy behavior tuning
#[derive(Debug, Clone, PartialEq)]
pub struct AiConfig {
    /// Radius of the candidate sphere and maximum sight distance
    pub detection_radius: f32,
    pub vision_angle_degrees: f32,
    /// Distance between feet positions at which the attack triggers
    pub attack_range: f32,
    /// Seconds without line of sight before the target is dropped
    pub lost_target_timeout: f32,
    /// Chase speed at the edge of the detection radius
    pub base_speed: f32,
    /// Chase speed once within `chase_boost_range`
    pub boosted_speed: f32,
    pub chase_boost_range: f32,
    /// Idle time at each patrol destination
    pub dwell_time: f32,
    pub arrive_distance: f32,
    /// Wander radius used when no waypoints are given
    pub patrol_radius: f32,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            detection_radius: 10.0,
            vision_angle_degrees: 80.0,
            attack_range: 2.0,
            lost_target_timeout: 5.0,
            base_speed: 4.0,
            boosted_speed: 7.0,
            chase_boost_range: 3.0,
            dwell_time: 2.0,
            arrive_distance: 0.5,
            patrol_radius: 8.0,
        }
    }
}

impl AiConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        ConfigError::require_positive("detection_radius", self.detection_radius)?;
        ConfigError::require_range("vision_angle_degrees", self.vision_angle_degrees, 0.0, 360.0)?;
        ConfigError::require_positive("attack_range", self.attack_range)?;
        ConfigError::require_positive("lost_target_timeout", self.lost_target_timeout)?;
        ConfigError::require_positive("base_speed", self.base_speed)?;
        ConfigError::require_ordered("base_speed", self.base_speed, "boosted_speed", self.boosted_speed)?;
        ConfigError::require_range("chase_boost_range", self.chase_boost_range, 0.0, self.detection_radius)?;
        ConfigError::require_range("dwell_time", self.dwell_time, 0.0, f32::MAX)?;
        ConfigError::require_positive("arrive_distance", self.arrive_distance)?;
        Ok(())
    }

    pub fn vision(&self) -> Vision {
        Vision {
            detection_radius: self.detection_radius,
            vision_angle_degrees: self.vision_angle_degrees,
        }
    }

    /// Chase speed at `distance` from the target
    pub fn chase_speed(&self, distance: f32) -> f32 {
        let t = math::inverse_lerp(self.detection_radius, self.chase_boost_range, distance);
        math::lerp(self.base_speed, self.boosted_speed, t)
    }
}

/// Read-only snapshot of a potential target
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TargetInfo {
    pub id: EntityId,
    /// Feet position
    pub position: Vec3,
    /// Collider center, aimed at by sight rays
    pub center: Vec3,
    pub alive: bool,
}

/// What the brain knows about its own body this tick
#[derive(Debug, Clone, Copy)]
pub struct BrainContext<'a> {
    pub entity: EntityId,
    pub position: Vec3,
    pub rotation: Quat,
    pub eye: Vec3,
    /// Layers holding acceptable targets
    pub hostile: LayerMask,
    /// Walk speed of the body; move requests are scaled against it
    pub max_speed: f32,
    pub targets: &'a [TargetInfo],
}

#[derive(Debug, Clone)]
pub struct EnemyBrain {
    config: AiConfig,
    state: AiState,
    target: Option<EntityId>,
    last_known_position: Option<Vec3>,
    time_unseen: f32,
    patrol: Patrol,
}

impl EnemyBrain {
    pub fn new(config: AiConfig, route: PatrolRoute) -> Result<Self, ConfigError> {
        config.validate()?;
        let patrol = Patrol::new(route, config.dwell_time, config.arrive_distance);
        Ok(Self {
            config,
            state: AiState::Patrol,
            target: None,
            last_known_position: None,
            time_unseen: 0.0,
            patrol,
        })
    }

    pub fn config(&self) -> &AiConfig {
        &self.config
    }

    pub fn state(&self) -> AiState {
        self.state
    }

    pub fn target(&self) -> Option<EntityId> {
        self.target
    }

    pub fn last_known_position(&self) -> Option<Vec3> {
        self.last_known_position
    }

    pub fn patrol(&self) -> &Patrol {
        &self.patrol
    }

    /// Hunt `target`; it counts as seen until line of sight says otherwise
    pub fn set_target(&mut self, target: Option<EntityId>) {
        self.target = target;
        self.last_known_position = None;
        self.time_unseen = 0.0;
    }

    /// Decide this tick's intent
    pub fn think<R: Rng + ?Sized>(
        &mut self,
        ctx: &BrainContext<'_>,
        queries: &dyn CollisionQueryProvider,
        rng: &mut R,
        dt: f32,
    ) -> CharacterInput {
        let vision = self.config.vision();
        let observer = Observer {
            entity: ctx.entity,
            eye: ctx.eye,
            forward: ctx.rotation * Vec3::Z,
            targets: ctx.hostile,
        };

        // Targets that died or despawned are dropped silently
        if let Some(id) = self.target {
            if !ctx.targets.iter().any(|t| t.id == id && t.alive) {
                self.set_target(None);
            }
        }

        if self.target.is_none() {
            if let Some(hit) = vision.acquire(queries, &observer) {
                debug!("Enemy {} acquired target {}", ctx.entity, hit.entity);
                self.set_target(Some(hit.entity));
            }
        }

        let mut visible_target = None;
        if let Some(info) = self.target_info(ctx) {
            if vision.can_see(queries, &observer, info.id, info.center) || self.last_known_position.is_none() {
                self.time_unseen = 0.0;
                self.last_known_position = Some(info.position);
                visible_target = Some(info);
            } else {
                self.time_unseen += dt;
                if self.time_unseen >= self.config.lost_target_timeout {
                    debug!("Enemy {} lost target {}", ctx.entity, info.id);
                    self.set_target(None);
                }
            }
        }

        let next = match (self.target, visible_target) {
            (Some(_), Some(info)) if ctx.position.distance(info.position) <= self.config.attack_range => {
                AiState::Attack
            }
            (Some(_), _) => AiState::Chase,
            (None, _) => AiState::Patrol,
        };
        if next != self.state {
            debug!("Enemy {} {:?} -> {:?}", ctx.entity, self.state, next);
            self.state = next;
        }

        match self.state {
            AiState::Patrol => {
                let destination = self.patrol.update(ctx.position, dt, rng);
                match destination {
                    Some(point) => self.move_toward(ctx, point, self.config.base_speed, None),
                    None => CharacterInput::idle(ctx.rotation),
                }
            }
            AiState::Chase => {
                let Some(goal) = visible_target.map(|t| t.position).or(self.last_known_position) else {
                    return CharacterInput::idle(ctx.rotation);
                };
                if math::planar_speed(goal - ctx.position, Vec3::Y) <= self.config.arrive_distance {
                    // At the last known position; wait for the timeout
                    return CharacterInput::idle(ctx.rotation);
                }
                let speed = self.config.chase_speed(ctx.position.distance(goal));
                self.move_toward(ctx, goal, speed, visible_target.map(|t| t.center))
            }
            AiState::Attack => {
                let Some(info) = visible_target else {
                    return CharacterInput::idle(ctx.rotation);
                };
                let speed = self.config.chase_speed(ctx.position.distance(info.position));
                CharacterInput {
                    attack: true,
                    attack_sustain: true,
                    ..self.move_toward(ctx, info.position, speed, Some(info.center))
                }
            }
        }
    }

    fn target_info(&self, ctx: &BrainContext<'_>) -> Option<TargetInfo> {
        let id = self.target?;
        ctx.targets.iter().find(|t| t.id == id).copied()
    }

    /// Face `goal` and walk toward it at `speed`. `aim_at` tilts the view toward a target.
    fn move_toward(&self, ctx: &BrainContext<'_>, goal: Vec3, speed: f32, aim_at: Option<Vec3>) -> CharacterInput {
        let planar = math::project_on_plane(goal - ctx.position, Vec3::Y);
        let Some(facing) = math::look_rotation(planar, Vec3::Y) else {
            return CharacterInput::idle(ctx.rotation);
        };
        let rotation = aim_at
            .and_then(|point| math::look_rotation(point - ctx.eye, Vec3::Y))
            .unwrap_or(facing);

        let magnitude = (speed / ctx.max_speed).clamp(0.0, 1.0);
        CharacterInput {
            move_axis: Vec2::new(0.0, magnitude),
            ..CharacterInput::idle(rotation)
        }
    }
}
