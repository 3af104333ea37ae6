// Authoritative simulation tick
//
// One `step` runs, in order: enemy brains, character motion, weapon input and
// scheduled swings, attack and projectile resolution, then deaths (kills and
// player reanimation). Everything is single-threaded and deterministic for a
// given seed.

use std::collections::BTreeMap;

use glam::{Quat, Vec3};
use log::{debug, info, warn};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::engine::input::CharacterInput;
use crate::engine::physics::{CollisionLayer, CollisionWorld, LayerMask, Pose};
use crate::error::{ConfigError, SimError};
use crate::game::ai::{BrainContext, EnemyBrain, PatrolRoute, TargetInfo};
use crate::game::characters::{
    Character, CharacterManager, CharacterState, EntityId, Faction, MotionStats, PLAYER_MOTION,
};
use crate::game::combat::{
    apply_damage, apply_restore, presets, resolve_attack, AttackOrigin, CombatEvent, DamageOutcome,
    EventQueue, Hit, ProjectileSystem, WeaponId, WeaponStats,
};
use crate::game::spawner::{EnemySpawner, EnemyTemplate};

#[derive(Debug, Clone, PartialEq)]
pub struct SimulationConfig {
    /// Seed for patrol points and spawn offsets
    pub seed: u64,
    pub player_motion: MotionStats,
    pub player_health: f32,
    /// Weapon handed to every new player
    pub player_weapon: Option<WeaponStats>,
    /// Template for spawned and reanimated enemies
    pub enemy: Option<EnemyTemplate>,
    pub spawn_points: Vec<Pose>,
    pub spawn_radius: f32,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            player_motion: PLAYER_MOTION,
            player_health: 100.0,
            player_weapon: Some(presets::rifle()),
            enemy: Some(EnemyTemplate::default()),
            spawn_points: Vec::new(),
            spawn_radius: 2.0,
        }
    }
}

impl SimulationConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.player_motion.validate()?;
        ConfigError::require_positive("player_health", self.player_health)?;
        if let Some(weapon) = &self.player_weapon {
            weapon.validate()?;
        }
        if let Some(enemy) = &self.enemy {
            enemy.validate()?;
        }
        ConfigError::require_range("spawn_radius", self.spawn_radius, 0.0, f32::MAX)
    }
}

/// Read-only per-tick snapshot for cameras, HUDs and animation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CharacterView {
    pub id: EntityId,
    pub faction: Faction,
    pub state: CharacterState,
    pub pose: Pose,
    pub camera_target: Pose,
    pub health: f32,
    pub max_health: f32,
}

#[derive(Debug)]
pub struct Simulation {
    config: SimulationConfig,
    world: CollisionWorld,
    characters: CharacterManager,
    brains: BTreeMap<EntityId, EnemyBrain>,
    projectiles: ProjectileSystem,
    events: EventQueue,
    spawner: EnemySpawner,
    rng: ChaCha8Rng,
    /// Deaths waiting for the end of the tick, with their killer
    pending_deaths: Vec<(EntityId, Option<EntityId>)>,
    time: f32,
    kills: u32,
}

impl Simulation {
    pub fn new(config: SimulationConfig, world: CollisionWorld) -> Result<Self, SimError> {
        config.validate()?;
        let spawner = EnemySpawner::new(config.spawn_points.clone(), config.spawn_radius);
        let rng = ChaCha8Rng::seed_from_u64(config.seed);

        Ok(Self {
            config,
            world,
            characters: CharacterManager::new(),
            brains: BTreeMap::new(),
            projectiles: ProjectileSystem::new(),
            events: EventQueue::new(),
            spawner,
            rng,
            pending_deaths: Vec::new(),
            time: 0.0,
            kills: 0,
        })
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn world(&self) -> &CollisionWorld {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut CollisionWorld {
        &mut self.world
    }

    pub fn characters(&self) -> &CharacterManager {
        &self.characters
    }

    pub fn character(&self, id: EntityId) -> Option<&Character> {
        self.characters.get(id)
    }

    pub fn brain(&self, id: EntityId) -> Option<&EnemyBrain> {
        self.brains.get(&id)
    }

    pub fn projectiles(&self) -> &ProjectileSystem {
        &self.projectiles
    }

    pub fn spawner_mut(&mut self) -> &mut EnemySpawner {
        &mut self.spawner
    }

    /// Simulated seconds since creation
    pub fn time(&self) -> f32 {
        self.time
    }

    /// Enemies killed so far
    pub fn kills(&self) -> u32 {
        self.kills
    }

    /// Take every event produced since the last drain
    pub fn drain_events(&mut self) -> Vec<CombatEvent> {
        self.events.drain()
    }

    pub fn spawn_player(&mut self, name: &str, position: Vec3, rotation: Quat) -> Result<EntityId, SimError> {
        let player_index = self.characters.by_faction(Faction::Player).count();
        let id = self.characters.spawn_character(
            name,
            Faction::Player,
            Some(player_index),
            self.config.player_motion.clone(),
            self.config.player_health,
            position,
            rotation,
        )?;
        self.register_body(id);

        if let Some(weapon) = self.config.player_weapon.clone() {
            self.equip_weapon(id, weapon)?;
        }
        info!("Spawned player {} ({}) at {:?}", name, id, position);
        Ok(id)
    }

    /// Spawn an enemy that wanders around its spawn position
    pub fn spawn_enemy(&mut self, position: Vec3, rotation: Quat) -> Result<EntityId, SimError> {
        let radius = self
            .config
            .enemy
            .as_ref()
            .ok_or(SimError::MissingEnemyTemplate)?
            .ai
            .patrol_radius;
        self.spawn_enemy_on_route(
            position,
            rotation,
            PatrolRoute::Wander {
                center: position,
                radius,
            },
        )
    }

    pub fn spawn_enemy_on_route(
        &mut self,
        position: Vec3,
        rotation: Quat,
        route: PatrolRoute,
    ) -> Result<EntityId, SimError> {
        let template = self.config.enemy.clone().ok_or(SimError::MissingEnemyTemplate)?;
        let brain = EnemyBrain::new(template.ai.clone(), route)?;

        let id = self.characters.spawn_character(
            &template.name,
            Faction::Enemy,
            None,
            template.motion.clone(),
            template.max_health,
            position,
            rotation,
        )?;
        self.register_body(id);
        self.brains.insert(id, brain);

        if let Some(weapon) = template.weapon {
            self.equip_weapon(id, weapon)?;
        }
        debug!("Spawned enemy {} at {:?}", id, position);
        Ok(id)
    }

    /// Spawn `amount` enemies around random spawn points. Without spawn
    /// points or an enemy template this warns and spawns nothing.
    pub fn spawn_enemies(&mut self, amount: usize) -> Vec<EntityId> {
        if !self.spawner.is_configured() || self.config.enemy.is_none() {
            warn!("Spawner not configured");
            return Vec::new();
        }

        let mut spawned = Vec::with_capacity(amount);
        for _ in 0..amount {
            let Some(pose) = self.spawner.pick(&mut self.rng) else {
                break;
            };
            match self.spawn_enemy(pose.position, pose.rotation) {
                Ok(id) => spawned.push(id),
                Err(err) => {
                    warn!("Failed to spawn enemy: {}", err);
                    break;
                }
            }
        }
        spawned
    }

    /// Replace the intent of a character for the next tick
    pub fn set_input(&mut self, id: EntityId, input: CharacterInput) -> Result<(), SimError> {
        let character = self.characters.get_mut(id).ok_or(SimError::UnknownEntity(id))?;
        character.set_input(input);
        Ok(())
    }

    /// Point an enemy at a target (or clear it)
    pub fn set_enemy_target(&mut self, enemy: EntityId, target: Option<EntityId>) -> Result<(), SimError> {
        let brain = self.brains.get_mut(&enemy).ok_or(SimError::UnknownEntity(enemy))?;
        brain.set_target(target);
        Ok(())
    }

    pub fn equip_weapon(&mut self, id: EntityId, stats: WeaponStats) -> Result<WeaponId, SimError> {
        let character = self.characters.get_mut(id).ok_or(SimError::UnknownEntity(id))?;
        Ok(character.weapons.equip(stats, &mut self.events)?)
    }

    /// Teleport a character, optionally stopping it
    pub fn teleport(&mut self, id: EntityId, position: Vec3, kill_velocity: bool) -> Result<(), SimError> {
        let character = self.characters.get_mut(id).ok_or(SimError::UnknownEntity(id))?;
        character.set_position(position, kill_velocity);
        self.world.update_body(id, position, character.motor.capsule());
        Ok(())
    }

    /// Damage from outside the combat system (hazards, scripts)
    pub fn damage(&mut self, id: EntityId, amount: f32, source: Option<EntityId>) -> Result<DamageOutcome, SimError> {
        let character = self.characters.get_mut(id).ok_or(SimError::UnknownEntity(id))?;
        let outcome = apply_damage(&mut character.health, id, amount, source, &mut self.events);
        if matches!(outcome, DamageOutcome::Killed { .. }) {
            self.pending_deaths.push((id, source));
        }
        Ok(outcome)
    }

    pub fn restore_health(&mut self, id: EntityId, amount: f32) -> Result<f32, SimError> {
        let character = self.characters.get_mut(id).ok_or(SimError::UnknownEntity(id))?;
        Ok(apply_restore(&mut character.health, id, amount, &mut self.events))
    }

    pub fn view(&self, id: EntityId) -> Option<CharacterView> {
        let character = self.characters.get(id)?;
        Some(CharacterView {
            id,
            faction: character.faction,
            state: *character.state(),
            pose: *character.motor.pose(),
            camera_target: character.camera_target(),
            health: character.health.current(),
            max_health: character.health.max(),
        })
    }

    /// Advance the simulation by one fixed tick
    pub fn step(&mut self, dt: f32) {
        if dt <= 0.0 {
            return;
        }
        self.time += dt;
        let now = self.time;

        self.update_brains(dt);

        for character in self.characters.all_mut() {
            if !character.is_alive() {
                continue;
            }
            character.simulate(&self.world, dt);
            self.world
                .update_body(character.id, character.position(), character.motor.capsule());
        }

        let mut hits = self.update_weapons(now);
        hits.extend(self.projectiles.update(&self.world, dt));
        self.apply_hits(&hits);

        self.process_deaths();
    }

    fn register_body(&mut self, id: EntityId) {
        if let Some(character) = self.characters.get(id) {
            self.world.insert_body(
                id,
                character.faction.layer(),
                character.position(),
                character.motor.capsule(),
            );
        }
    }

    fn update_brains(&mut self, dt: f32) {
        let targets: Vec<TargetInfo> = self
            .characters
            .by_faction(Faction::Player)
            .map(|c| TargetInfo {
                id: c.id,
                position: c.position(),
                center: c.center(),
                alive: c.is_alive(),
            })
            .collect();

        let mut inputs = Vec::with_capacity(self.brains.len());
        for (id, brain) in self.brains.iter_mut() {
            let Some(character) = self.characters.get(*id) else {
                continue;
            };
            if !character.is_alive() {
                continue;
            }
            let ctx = BrainContext {
                entity: *id,
                position: character.position(),
                rotation: character.rotation(),
                eye: character.camera_target().position,
                hostile: character.faction.hostile_layer().mask(),
                max_speed: character.motion.stats().walk_speed,
                targets: &targets,
            };
            inputs.push((*id, brain.think(&ctx, &self.world, &mut self.rng, dt)));
        }

        for (id, input) in inputs {
            if let Some(character) = self.characters.get_mut(id) {
                character.set_input(input);
            }
        }
    }

    /// Feed input to every weapon handler and resolve the attacks it produced
    fn update_weapons(&mut self, now: f32) -> Vec<Hit> {
        let mut hits = Vec::new();
        for character in self.characters.all_mut() {
            if !character.is_alive() {
                continue;
            }
            character.weapons.update_input(&character.input, now);
            character.weapons.update(now);
            character.clear_input_edges();

            let attacks = character.weapons.take_attacks();
            if attacks.is_empty() {
                continue;
            }
            let (origin, direction) = character.aim();
            let from = AttackOrigin {
                attacker: character.id,
                origin,
                direction,
                mask: LayerMask::NONE
                    .with(CollisionLayer::World)
                    .with(character.faction.hostile_layer()),
            };
            for attack in attacks {
                if let Some(hit) = resolve_attack(&attack, &from, &self.world, &mut self.projectiles) {
                    hits.push(hit);
                }
            }
        }
        hits
    }

    fn apply_hits(&mut self, hits: &[Hit]) {
        for hit in hits {
            let Some(target) = hit.target else {
                continue;
            };
            // The target may have died earlier this tick
            let Some(character) = self.characters.get_mut(target) else {
                continue;
            };
            let outcome = apply_damage(&mut character.health, target, hit.damage, Some(hit.source), &mut self.events);
            if matches!(outcome, DamageOutcome::Killed { .. }) {
                self.pending_deaths.push((target, Some(hit.source)));
            }
        }
    }

    fn process_deaths(&mut self) {
        for (id, killer) in std::mem::take(&mut self.pending_deaths) {
            let Some(character) = self.characters.remove(id) else {
                continue;
            };
            self.world.remove_body(id);
            self.brains.remove(&id);

            match character.faction {
                Faction::Enemy => {
                    self.kills += 1;
                    info!("Enemy {} killed ({} total)", id, self.kills);
                    self.events.push(CombatEvent::KillScored {
                        victim: id,
                        killer,
                        total_kills: self.kills,
                    });
                }
                Faction::Player => {
                    info!("Player {} ({}) died", character.name, id);
                    self.reanimate(&character);
                }
            }
        }
    }

    /// Bring a dead player back as an enemy hunting the nearest surviving player
    fn reanimate(&mut self, player: &Character) {
        if self.config.enemy.is_none() {
            warn!("No enemy template; player {} stays dead", player.id);
            return;
        }
        let position = player.position();
        let enemy = match self.spawn_enemy(position, player.rotation()) {
            Ok(enemy) => enemy,
            Err(err) => {
                warn!("Failed to reanimate player {}: {}", player.id, err);
                return;
            }
        };

        let target = self
            .characters
            .by_faction(Faction::Player)
            .filter(|c| c.is_alive())
            .min_by(|a, b| {
                let da = a.position().distance_squared(position);
                let db = b.position().distance_squared(position);
                da.total_cmp(&db)
            })
            .map(|c| c.id);
        if let Some(brain) = self.brains.get_mut(&enemy) {
            brain.set_target(target);
        }

        info!("Player {} became enemy {}", player.id, enemy);
        self.events.push(CombatEvent::Reanimated {
            player: player.id,
            enemy,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::input::CrouchInput;
    use crate::game::ai::AiState;
    use crate::game::characters::Stance;
    use glam::Vec2;

    const DT: f32 = 1.0 / 60.0;

    fn arena() -> CollisionWorld {
        let mut world = CollisionWorld::new();
        world.add_box(Vec3::new(0.0, -0.5, 0.0), Vec3::new(60.0, 0.5, 60.0));
        world
    }

    fn sim_with(config: SimulationConfig) -> Simulation {
        Simulation::new(config, arena()).unwrap()
    }

    fn run(sim: &mut Simulation, seconds: f32) {
        let ticks = (seconds / DT).round() as usize;
        for _ in 0..ticks {
            sim.step(DT);
        }
    }

    fn forward_input() -> CharacterInput {
        CharacterInput {
            move_axis: Vec2::new(0.0, 1.0),
            ..CharacterInput::idle(Quat::IDENTITY)
        }
    }

    /// Rotation looking along `direction` on the ground plane
    fn facing(direction: Vec3) -> Quat {
        crate::common::math::look_rotation(direction, Vec3::Y).unwrap()
    }

    #[test]
    fn test_player_walks_on_floor() {
        let mut sim = sim_with(SimulationConfig::default());
        let player = sim.spawn_player("P1", Vec3::ZERO, Quat::IDENTITY).unwrap();
        sim.set_input(player, forward_input()).unwrap();

        run(&mut sim, 1.0);

        let view = sim.view(player).unwrap();
        assert!(view.pose.position.z > 10.0, "walked {}", view.pose.position.z);
        assert!(view.pose.position.y.abs() < 0.05);
        assert!(view.state.grounded);
        assert_eq!(view.state.stance, Stance::Stand);
        // The world body follows the character
        let center = sim.world().body_center(player).unwrap();
        assert!((center.z - view.pose.position.z).abs() < 1e-4);
    }

    #[test]
    fn test_crouch_while_running_slides() {
        let mut sim = sim_with(SimulationConfig::default());
        let player = sim.spawn_player("P1", Vec3::ZERO, Quat::IDENTITY).unwrap();
        sim.set_input(player, forward_input()).unwrap();
        run(&mut sim, 0.5);

        sim.set_input(
            player,
            CharacterInput {
                crouch: CrouchInput::Toggle,
                ..forward_input()
            },
        )
        .unwrap();
        sim.step(DT);

        assert_eq!(sim.view(player).unwrap().state.stance, Stance::Slide);
    }

    #[test]
    fn test_stand_up_blocked_under_ceiling() {
        let mut world = arena();
        // Ceiling with its underside at 1.5 over z in [3, 9]
        world.add_box(Vec3::new(0.0, 2.0, 6.0), Vec3::new(5.0, 0.5, 3.0));
        let mut sim = Simulation::new(SimulationConfig::default(), world).unwrap();
        let player = sim.spawn_player("P1", Vec3::ZERO, Quat::IDENTITY).unwrap();

        run(&mut sim, 0.1);
        sim.set_input(
            player,
            CharacterInput {
                crouch: CrouchInput::Toggle,
                ..CharacterInput::idle(Quat::IDENTITY)
            },
        )
        .unwrap();
        run(&mut sim, 0.1);
        assert_eq!(sim.view(player).unwrap().state.stance, Stance::Crouch);

        sim.teleport(player, Vec3::new(0.0, 0.0, 6.0), true).unwrap();
        run(&mut sim, 0.1);

        // Request to stand while under the ceiling
        sim.set_input(
            player,
            CharacterInput {
                crouch: CrouchInput::Toggle,
                ..CharacterInput::idle(Quat::IDENTITY)
            },
        )
        .unwrap();
        run(&mut sim, 0.2);
        let view = sim.view(player).unwrap();
        assert_eq!(view.state.stance, Stance::Crouch);
        assert!(sim.character(player).unwrap().motor.capsule().height < 1.5);

        // The blocked stand-up re-raised the crouch request; out in the open a
        // fresh toggle stands up
        sim.teleport(player, Vec3::new(0.0, 0.0, -5.0), true).unwrap();
        run(&mut sim, 0.1);
        assert_eq!(sim.view(player).unwrap().state.stance, Stance::Crouch);
        sim.set_input(
            player,
            CharacterInput {
                crouch: CrouchInput::Toggle,
                ..CharacterInput::idle(Quat::IDENTITY)
            },
        )
        .unwrap();
        run(&mut sim, 0.1);
        assert_eq!(sim.view(player).unwrap().state.stance, Stance::Stand);
    }

    #[test]
    fn test_rifle_kills_enemy_and_scores() {
        let mut config = SimulationConfig::default();
        if let Some(enemy) = config.enemy.as_mut() {
            enemy.weapon = None;
        }
        let mut sim = sim_with(config);
        let player = sim.spawn_player("P1", Vec3::ZERO, Quat::IDENTITY).unwrap();
        let enemy = sim
            .spawn_enemy_on_route(Vec3::new(0.0, 0.0, 8.0), facing(Vec3::NEG_Z), PatrolRoute::Waypoints(Vec::new()))
            .unwrap();
        sim.drain_events();

        sim.set_input(
            player,
            CharacterInput {
                attack: true,
                attack_sustain: true,
                ..CharacterInput::idle(Quat::IDENTITY)
            },
        )
        .unwrap();
        run(&mut sim, 1.0);

        assert!(sim.character(enemy).is_none());
        assert!(sim.world().body_center(enemy).is_none());
        assert_eq!(sim.kills(), 1);

        let events = sim.drain_events();
        let deaths = events
            .iter()
            .filter(|e| matches!(e, CombatEvent::Died { entity, .. } if *entity == enemy))
            .count();
        assert_eq!(deaths, 1);
        assert!(events.iter().any(|e| matches!(
            e,
            CombatEvent::KillScored { victim, killer: Some(k), total_kills: 1 } if *victim == enemy && *k == player
        )));
        // At least the four killing rounds left the clip
        let ammo = *sim.character(player).unwrap().weapons.weapon().unwrap().ammo().unwrap();
        assert!(ammo.clip() <= 26);
    }

    #[test]
    fn test_enemy_chases_and_hurts_player() {
        let mut sim = sim_with(SimulationConfig::default());
        let player = sim.spawn_player("P1", Vec3::new(0.0, 0.0, 6.0), Quat::IDENTITY).unwrap();
        let enemy = sim
            .spawn_enemy_on_route(Vec3::ZERO, Quat::IDENTITY, PatrolRoute::Waypoints(Vec::new()))
            .unwrap();

        sim.step(DT);
        assert_eq!(sim.brain(enemy).unwrap().target(), Some(player));

        run(&mut sim, 3.0);
        let health = sim.view(player).unwrap().health;
        assert!(health < 100.0, "player health {health}");
        assert_eq!(sim.brain(enemy).unwrap().state(), AiState::Attack);
        assert!(sim.drain_events().iter().any(|e| matches!(
            e,
            CombatEvent::DamageTaken { entity, source: Some(s), .. } if *entity == player && *s == enemy
        )));
    }

    #[test]
    fn test_detection_radius_limits_acquisition() {
        let mut config = SimulationConfig::default();
        if let Some(enemy) = config.enemy.as_mut() {
            enemy.ai.detection_radius = 20.0;
        }
        let mut sim = sim_with(config);
        sim.spawn_player("P1", Vec3::new(0.0, 0.0, 25.0), Quat::IDENTITY).unwrap();
        let enemy = sim
            .spawn_enemy_on_route(Vec3::ZERO, Quat::IDENTITY, PatrolRoute::Waypoints(Vec::new()))
            .unwrap();

        sim.step(DT);
        assert_eq!(sim.brain(enemy).unwrap().target(), None);
        assert_eq!(sim.brain(enemy).unwrap().state(), AiState::Patrol);
    }

    #[test]
    fn test_dead_player_reanimates_and_hunts_survivor() {
        let mut sim = sim_with(SimulationConfig::default());
        let victim = sim.spawn_player("P1", Vec3::new(5.0, 0.0, 0.0), Quat::IDENTITY).unwrap();
        let survivor = sim.spawn_player("P2", Vec3::new(-5.0, 0.0, 0.0), Quat::IDENTITY).unwrap();
        sim.drain_events();

        assert_eq!(sim.damage(victim, 100.0, None).unwrap(), DamageOutcome::Killed { dealt: 100.0 });
        sim.step(DT);

        assert!(sim.character(victim).is_none());
        assert_eq!(sim.kills(), 0);
        let events = sim.drain_events();
        let enemy = events
            .iter()
            .find_map(|e| match e {
                CombatEvent::Reanimated { player, enemy } if *player == victim => Some(*enemy),
                _ => None,
            })
            .unwrap();

        let zombie = sim.character(enemy).unwrap();
        assert_eq!(zombie.faction, Faction::Enemy);
        assert!(zombie.position().distance(Vec3::new(5.0, 0.0, 0.0)) < 0.5);
        assert_eq!(sim.brain(enemy).unwrap().target(), Some(survivor));
    }

    #[test]
    fn test_death_event_fires_once() {
        let mut sim = sim_with(SimulationConfig::default());
        let enemy = sim.spawn_enemy(Vec3::new(10.0, 0.0, 10.0), Quat::IDENTITY).unwrap();
        sim.drain_events();

        sim.damage(enemy, 30.0, None).unwrap();
        sim.damage(enemy, 30.0, None).unwrap();
        assert_eq!(sim.view(enemy).unwrap().health, 40.0);
        sim.damage(enemy, 50.0, None).unwrap();
        assert_eq!(sim.damage(enemy, 50.0, None).unwrap(), DamageOutcome::Ignored);
        sim.step(DT);

        let events = sim.drain_events();
        assert_eq!(events.iter().filter(|e| matches!(e, CombatEvent::Died { .. })).count(), 1);
        assert_eq!(sim.kills(), 1);
        assert!(sim.damage(enemy, 1.0, None).is_err());
    }

    #[test]
    fn test_restore_health() {
        let mut sim = sim_with(SimulationConfig::default());
        let player = sim.spawn_player("P1", Vec3::ZERO, Quat::IDENTITY).unwrap();
        sim.damage(player, 30.0, None).unwrap();
        assert_eq!(sim.restore_health(player, 50.0).unwrap(), 30.0);
        assert_eq!(sim.view(player).unwrap().health, 100.0);
        assert_eq!(sim.restore_health(99, 1.0), Err(SimError::UnknownEntity(99)));
    }

    #[test]
    fn test_spawn_enemies_requires_spawn_points() {
        let mut sim = sim_with(SimulationConfig::default());
        assert!(sim.spawn_enemies(3).is_empty());

        sim.spawner_mut()
            .add_spawn_point(Pose::new(Vec3::new(20.0, 0.0, 20.0), Quat::IDENTITY));
        let spawned = sim.spawn_enemies(3);
        assert_eq!(spawned.len(), 3);
        for id in spawned {
            let position = sim.character(id).unwrap().position();
            assert!(position.distance(Vec3::new(20.0, 0.0, 20.0)) <= 2.0 + 1e-4);
            assert!(sim.world().body_center(id).is_some());
        }
    }

    #[test]
    fn test_missing_enemy_template() {
        let config = SimulationConfig {
            enemy: None,
            ..SimulationConfig::default()
        };
        let mut sim = sim_with(config);
        assert_eq!(
            sim.spawn_enemy(Vec3::ZERO, Quat::IDENTITY),
            Err(SimError::MissingEnemyTemplate)
        );
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = SimulationConfig {
            player_health: 0.0,
            ..SimulationConfig::default()
        };
        assert!(matches!(
            Simulation::new(config, arena()),
            Err(SimError::Config(_))
        ));
    }

    #[test]
    fn test_unknown_entity_errors() {
        let mut sim = sim_with(SimulationConfig::default());
        assert_eq!(
            sim.set_input(42, CharacterInput::default()),
            Err(SimError::UnknownEntity(42))
        );
        assert_eq!(sim.set_enemy_target(42, None), Err(SimError::UnknownEntity(42)));
        assert!(sim.teleport(42, Vec3::ZERO, true).is_err());
        assert!(sim.view(42).is_none());
    }

    #[test]
    fn test_player_shots_pass_through_allies() {
        let mut config = SimulationConfig::default();
        if let Some(enemy) = config.enemy.as_mut() {
            enemy.weapon = None;
        }
        let mut sim = sim_with(config);
        let shooter = sim.spawn_player("P1", Vec3::ZERO, Quat::IDENTITY).unwrap();
        let ally = sim.spawn_player("P2", Vec3::new(0.0, 0.0, 3.0), Quat::IDENTITY).unwrap();

        sim.set_input(
            shooter,
            CharacterInput {
                attack: true,
                ..CharacterInput::idle(Quat::IDENTITY)
            },
        )
        .unwrap();
        sim.step(DT);
        assert_eq!(sim.view(ally).unwrap().health, 100.0);
    }
}
