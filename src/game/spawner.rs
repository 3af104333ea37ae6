// Enemy templates and spawn point selection

use std::f32::consts::TAU;

use glam::Vec3;
use rand::Rng;

use crate::engine::physics::Pose;
use crate::error::ConfigError;
use crate::game::ai::AiConfig;
use crate::game::characters::{MotionStats, ENEMY_MOTION};
use crate::game::combat::{presets, WeaponStats};

/// Everything needed to build an enemy
#[derive(Debug, Clone, PartialEq)]
pub struct EnemyTemplate {
    pub name: String,
    pub motion: MotionStats,
    pub max_health: f32,
    pub weapon: Option<WeaponStats>,
    pub ai: AiConfig,
}

impl Default for EnemyTemplate {
    fn default() -> Self {
        Self {
            name: "Zombie".to_string(),
            motion: ENEMY_MOTION,
            max_health: 100.0,
            weapon: Some(presets::claws()),
            ai: AiConfig::default(),
        }
    }
}

impl EnemyTemplate {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.motion.validate()?;
        ConfigError::require_positive("max_health", self.max_health)?;
        if let Some(weapon) = &self.weapon {
            weapon.validate()?;
        }
        self.ai.validate()
    }
}

/// Random spawn locations scattered around fixed points
#[derive(Debug, Clone, Default)]
pub struct EnemySpawner {
    spawn_points: Vec<Pose>,
    spawn_radius: f32,
}

impl EnemySpawner {
    pub fn new(spawn_points: Vec<Pose>, spawn_radius: f32) -> Self {
        Self {
            spawn_points,
            spawn_radius: spawn_radius.max(0.0),
        }
    }

    pub fn spawn_points(&self) -> &[Pose] {
        &self.spawn_points
    }

    pub fn add_spawn_point(&mut self, pose: Pose) {
        self.spawn_points.push(pose);
    }

    pub fn is_configured(&self) -> bool {
        !self.spawn_points.is_empty()
    }

    /// A random spawn point offset inside the spawn radius. `None` without spawn points.
    pub fn pick<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<Pose> {
        if self.spawn_points.is_empty() {
            return None;
        }
        let base = self.spawn_points[rng.gen_range(0..self.spawn_points.len())];

        let angle = rng.gen_range(0.0..TAU);
        let distance = self.spawn_radius * rng.gen::<f32>().sqrt();
        let offset = Vec3::new(angle.cos(), 0.0, angle.sin()) * distance;
        Some(Pose::new(base.position + offset, base.rotation))
    }
}
