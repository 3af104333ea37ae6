// Character entity and management

use glam::{Quat, Vec3};

use super::motion::MotionController;
use super::state::CharacterState;
use super::stats::MotionStats;
use crate::engine::input::{CharacterInput, CrouchInput, MovementRequest};
use crate::engine::physics::{CollisionLayer, CollisionQueryProvider, KinematicMotor, Pose};
use crate::error::ConfigError;
use crate::game::combat::{Health, WeaponHandler};

/// Unique identifier for a character
pub type EntityId = u32;

/// Which side a character fights on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Faction {
    Player,
    Enemy,
}

impl Faction {
    /// Collision layer of the character's body
    pub fn layer(self) -> CollisionLayer {
        match self {
            Faction::Player => CollisionLayer::Player,
            Faction::Enemy => CollisionLayer::Enemy,
        }
    }

    /// Layer holding the other side
    pub fn hostile_layer(self) -> CollisionLayer {
        match self {
            Faction::Player => CollisionLayer::Enemy,
            Faction::Enemy => CollisionLayer::Player,
        }
    }
}

/// A player-controlled or AI-controlled character
#[derive(Debug)]
pub struct Character {
    /// Unique identifier
    pub id: EntityId,
    /// Character name (for logs)
    pub name: String,
    pub faction: Faction,
    /// Player slot controlling this character (None for AI)
    pub player_index: Option<usize>,

    /// Stance and velocity resolution
    pub motion: MotionController,
    /// Capsule pose, velocity and grounding
    pub motor: KinematicMotor,

    pub health: Health,
    pub weapons: WeaponHandler,

    /// Latest intent, applied on the next tick
    pub input: CharacterInput,
}

impl Character {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: EntityId,
        name: &str,
        faction: Faction,
        player_index: Option<usize>,
        stats: MotionStats,
        max_health: f32,
        position: Vec3,
        rotation: Quat,
    ) -> Result<Self, ConfigError> {
        stats.validate()?;
        let health = Health::new(max_health)?;

        let mut motor = KinematicMotor::new(
            position,
            stats.stand_capsule(),
            faction.layer().movement_filter(),
        )
        .with_entity(id);
        motor.set_rotation(rotation);

        Ok(Self {
            id,
            name: name.to_string(),
            faction,
            player_index,
            motion: MotionController::new(stats),
            motor,
            health,
            weapons: WeaponHandler::new(id),
            input: CharacterInput::idle(rotation),
        })
    }

    /// Feet position
    pub fn position(&self) -> Vec3 {
        self.motor.position()
    }

    /// Body rotation (yaw only)
    pub fn rotation(&self) -> Quat {
        self.motor.rotation()
    }

    pub fn velocity(&self) -> Vec3 {
        self.motor.velocity()
    }

    pub fn state(&self) -> &CharacterState {
        self.motion.state()
    }

    pub fn is_alive(&self) -> bool {
        !self.health.is_dead()
    }

    /// Center of the current capsule
    pub fn center(&self) -> Vec3 {
        self.motor.capsule().center(self.position(), self.motor.up())
    }

    /// Camera anchor: smoothed stance height above the feet, looking along the request rotation
    pub fn camera_target(&self) -> Pose {
        Pose::new(
            self.position() + self.motor.up() * self.motion.camera_target_height(),
            self.input.rotation,
        )
    }

    /// Origin and direction attacks are fired along
    pub fn aim(&self) -> (Vec3, Vec3) {
        let eye = self.camera_target();
        (eye.position, eye.forward())
    }

    pub fn set_input(&mut self, input: CharacterInput) {
        self.input = input;
    }

    /// Teleport, optionally stopping all motion
    pub fn set_position(&mut self, position: Vec3, kill_velocity: bool) {
        self.motor.set_position(position, kill_velocity);
    }

    /// Run the motion state machine and capsule sweep for one tick
    pub fn simulate(&mut self, queries: &dyn CollisionQueryProvider, dt: f32) {
        self.motion.update_input(&MovementRequest::resolve(&self.input));
        self.motor.simulate(&mut self.motion, queries, dt);
    }

    /// Clear edge-triggered intent once the tick consumed it
    pub fn clear_input_edges(&mut self) {
        self.input.jump = false;
        self.input.attack = false;
        self.input.reload = false;
        self.input.crouch = CrouchInput::None;
    }
}

/// Manages all characters in the game
#[derive(Debug)]
pub struct CharacterManager {
    characters: Vec<Character>,
    next_id: EntityId,
}

impl Default for CharacterManager {
    fn default() -> Self {
        Self::new()
    }
}

impl CharacterManager {
    pub fn new() -> Self {
        Self {
            characters: Vec::new(),
            next_id: 1,
        }
    }

    /// Spawn a new character
    #[allow(clippy::too_many_arguments)]
    pub fn spawn_character(
        &mut self,
        name: &str,
        faction: Faction,
        player_index: Option<usize>,
        stats: MotionStats,
        max_health: f32,
        position: Vec3,
        rotation: Quat,
    ) -> Result<EntityId, ConfigError> {
        let id = self.next_id;
        let character = Character::new(
            id,
            name,
            faction,
            player_index,
            stats,
            max_health,
            position,
            rotation,
        )?;
        self.next_id += 1;
        self.characters.push(character);

        Ok(id)
    }

    /// Get a character by ID
    pub fn get(&self, id: EntityId) -> Option<&Character> {
        self.characters.iter().find(|c| c.id == id)
    }

    /// Get a mutable character by ID
    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Character> {
        self.characters.iter_mut().find(|c| c.id == id)
    }

    /// Get a character by player index
    pub fn get_by_player(&self, player_index: usize) -> Option<&Character> {
        self.characters
            .iter()
            .find(|c| c.player_index == Some(player_index))
    }

    /// Get all characters
    pub fn all(&self) -> &[Character] {
        &self.characters
    }

    /// Get all characters mutably
    pub fn all_mut(&mut self) -> &mut [Character] {
        &mut self.characters
    }

    /// Characters of one faction
    pub fn by_faction(&self, faction: Faction) -> impl Iterator<Item = &Character> {
        self.characters.iter().filter(move |c| c.faction == faction)
    }

    /// Remove a character by ID
    pub fn remove(&mut self, id: EntityId) -> Option<Character> {
        let pos = self.characters.iter().position(|c| c.id == id)?;
        Some(self.characters.remove(pos))
    }

    /// Number of characters
    pub fn count(&self) -> usize {
        self.characters.len()
    }

    /// Number of living characters
    pub fn alive_count(&self) -> usize {
        self.characters.iter().filter(|c| c.is_alive()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::physics::test_support::FlatGround;
    use crate::game::characters::{Stance, ENEMY_MOTION, PLAYER_MOTION};
    use glam::Vec2;

    const DT: f32 = 1.0 / 60.0;

    fn player() -> Character {
        Character::new(1, "Alice", Faction::Player, Some(0), PLAYER_MOTION, 100.0, Vec3::ZERO, Quat::IDENTITY)
            .unwrap()
    }

    #[test]
    fn test_new_character() {
        let character = player();
        assert_eq!(character.position(), Vec3::ZERO);
        assert!(character.is_alive());
        assert_eq!(character.state().stance, Stance::Stand);
        assert_eq!(character.motor.entity(), Some(1));
        assert_eq!(character.weapons.owner(), 1);
        assert_eq!(character.center(), Vec3::new(0.0, 1.0, 0.0));
    }

    #[test]
    fn test_invalid_stats_rejected() {
        let stats = MotionStats {
            walk_speed: 0.0,
            ..PLAYER_MOTION
        };
        assert!(Character::new(1, "x", Faction::Enemy, None, stats, 100.0, Vec3::ZERO, Quat::IDENTITY).is_err());
        assert!(Character::new(1, "x", Faction::Enemy, None, ENEMY_MOTION, 0.0, Vec3::ZERO, Quat::IDENTITY).is_err());
    }

    #[test]
    fn test_simulate_walks_forward() {
        let ground = FlatGround::new();
        let mut character = player();
        character.set_input(CharacterInput {
            move_axis: Vec2::new(0.0, 1.0),
            ..CharacterInput::idle(Quat::IDENTITY)
        });

        for _ in 0..60 {
            character.simulate(&ground, DT);
        }

        assert!(character.position().z > 5.0);
        assert!(character.state().grounded);
    }

    #[test]
    fn test_camera_target_follows_stance_height() {
        let character = player();
        let target = character.camera_target();
        assert!((target.position.y - 1.8).abs() < 1e-5);

        let (origin, direction) = character.aim();
        assert_eq!(origin, target.position);
        assert!(direction.abs_diff_eq(Vec3::Z, 1e-6));
    }

    #[test]
    fn test_clear_input_edges_keeps_levels() {
        let mut character = player();
        character.set_input(CharacterInput {
            jump: true,
            jump_sustain: true,
            attack: true,
            attack_sustain: true,
            reload: true,
            crouch: CrouchInput::Toggle,
            move_axis: Vec2::Y,
            ..CharacterInput::idle(Quat::IDENTITY)
        });
        character.clear_input_edges();

        assert!(!character.input.jump && !character.input.attack && !character.input.reload);
        assert_eq!(character.input.crouch, CrouchInput::None);
        assert!(character.input.jump_sustain && character.input.attack_sustain);
        assert_eq!(character.input.move_axis, Vec2::Y);
    }

    #[test]
    fn test_teleport_kills_velocity() {
        let mut character = player();
        character.motor.set_velocity(Vec3::new(5.0, 0.0, 0.0));
        character.set_position(Vec3::new(3.0, 1.0, 3.0), true);
        assert_eq!(character.position(), Vec3::new(3.0, 1.0, 3.0));
        assert_eq!(character.velocity(), Vec3::ZERO);
    }

    #[test]
    fn test_manager_spawn_and_remove() {
        let mut manager = CharacterManager::new();
        let a = manager
            .spawn_character("P1", Faction::Player, Some(0), PLAYER_MOTION, 100.0, Vec3::ZERO, Quat::IDENTITY)
            .unwrap();
        let b = manager
            .spawn_character("Z1", Faction::Enemy, None, ENEMY_MOTION, 100.0, Vec3::X, Quat::IDENTITY)
            .unwrap();

        assert_ne!(a, b);
        assert_eq!(manager.count(), 2);
        assert_eq!(manager.get_by_player(0).unwrap().id, a);
        assert_eq!(manager.by_faction(Faction::Enemy).count(), 1);

        assert!(manager.remove(a).is_some());
        assert!(manager.get(a).is_none());
        assert!(manager.remove(a).is_none());
        assert_eq!(manager.alive_count(), 1);
    }

    #[test]
    fn test_failed_spawn_does_not_consume_id() {
        let mut manager = CharacterManager::new();
        assert!(manager
            .spawn_character("bad", Faction::Enemy, None, ENEMY_MOTION, -1.0, Vec3::ZERO, Quat::IDENTITY)
            .is_err());
        let id = manager
            .spawn_character("good", Faction::Enemy, None, ENEMY_MOTION, 50.0, Vec3::ZERO, Quat::IDENTITY)
            .unwrap();
        assert_eq!(id, 1);
    }

    #[test]
    fn test_faction_layers() {
        assert_eq!(Faction::Player.layer(), CollisionLayer::Player);
        assert_eq!(Faction::Player.hostile_layer(), CollisionLayer::Enemy);
        assert_eq!(Faction::Enemy.hostile_layer(), CollisionLayer::Player);
    }
}
