use std::time::Duration;

use anyhow::Result;
use glam::{Quat, Vec2, Vec3};
use log::info;

use rusted_horde::engine::game_loop::FIXED_TIMESTEP;
use rusted_horde::engine::input::{Action, IntentResolver, LookController, PlayerInput};
use rusted_horde::engine::physics::Pose;
use rusted_horde::game::combat::CombatEvent;
use rusted_horde::{CollisionWorld, GameLoop, Simulation, SimulationConfig};

/// Frames rendered by the headless demo (ten seconds at 60 Hz)
const DEMO_FRAMES: u32 = 600;

fn build_arena() -> CollisionWorld {
    let mut world = CollisionWorld::new();

    // Floor with its top at y=0
    world.add_box(Vec3::new(0.0, -0.5, 0.0), Vec3::new(40.0, 0.5, 40.0));

    // Perimeter walls
    for (center, half) in [
        (Vec3::new(0.0, 2.0, 40.0), Vec3::new(40.0, 2.0, 0.5)),
        (Vec3::new(0.0, 2.0, -40.0), Vec3::new(40.0, 2.0, 0.5)),
        (Vec3::new(40.0, 2.0, 0.0), Vec3::new(0.5, 2.0, 40.0)),
        (Vec3::new(-40.0, 2.0, 0.0), Vec3::new(0.5, 2.0, 40.0)),
    ] {
        world.add_box(center, half);
    }

    // A ramp and a low tunnel to exercise slopes and crouching
    world.add_oriented_box(
        Vec3::new(10.0, 0.5, 10.0),
        Vec3::new(3.0, 0.2, 6.0),
        Quat::from_rotation_x(-0.3),
    );
    world.add_box(Vec3::new(-10.0, 2.0, 10.0), Vec3::new(3.0, 0.5, 5.0));

    world
}

fn main() -> Result<()> {
    // Initialize logger
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    info!("Starting Rusted Horde (headless)...");

    let config = SimulationConfig {
        seed: 7,
        spawn_points: vec![
            Pose::new(Vec3::new(0.0, 0.0, 25.0), Quat::from_rotation_y(std::f32::consts::PI)),
            Pose::new(Vec3::new(20.0, 0.0, 20.0), Quat::IDENTITY),
        ],
        ..SimulationConfig::default()
    };
    let mut sim = Simulation::new(config, build_arena())?;

    let player = sim.spawn_player("Player", Vec3::ZERO, Quat::IDENTITY)?;
    let enemies = sim.spawn_enemies(4);
    info!("Spawned {} enemies", enemies.len());

    let mut game_loop = GameLoop::new();
    let mut buttons = PlayerInput::new();
    let mut intent = IntentResolver::new(LookController::from_rotation(Quat::IDENTITY, 0.1));

    // Scripted player: walk forward, fire the whole time, sweep the view slowly
    buttons.press(Action::MoveForward);
    buttons.press(Action::Attack);

    let frame_time = Duration::from_secs_f32(FIXED_TIMESTEP);
    for frame in 0..DEMO_FRAMES {
        buttons.add_look(Vec2::new(if frame % 240 < 120 { 4.0 } else { -4.0 }, 0.0));
        if frame == 300 {
            buttons.press(Action::Crouch);
        }

        let ticks = game_loop.advance(frame_time);
        for _ in 0..ticks {
            let input = intent.resolve(&buttons);
            if sim.set_input(player, input).is_err() {
                break;
            }
            sim.step(FIXED_TIMESTEP);
            buttons.update();
        }

        for event in sim.drain_events() {
            match event {
                CombatEvent::KillScored { total_kills, .. } => info!("Kill! total {}", total_kills),
                CombatEvent::Died { entity, .. } => info!("Entity {} died", entity),
                CombatEvent::Reanimated { player, enemy } => {
                    info!("Player {} rose again as enemy {}", player, enemy)
                }
                _ => {}
            }
        }
    }

    match sim.view(player) {
        Some(view) => info!(
            "Player at {:?}, stance {}, health {}/{}",
            view.pose.position,
            view.state.stance.name(),
            view.health,
            view.max_health
        ),
        None => info!("Player did not survive"),
    }
    info!(
        "Finished after {:.1}s simulated: {} kills, {} characters left",
        sim.time(),
        sim.kills(),
        sim.characters().count()
    );

    Ok(())
}
