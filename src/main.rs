use bevy::prelude::*;
use bevy::window::WindowResolution;
use bevy_rapier2d::prelude::*;

use event_horizon::config::{load_sim_config, SimConfig};
use event_horizon::enemy::{spawn_enemy, Enemy};
use event_horizon::hazard::{spawn_black_hole, BlackHole};
use event_horizon::pickup::{spawn_pickup, Pickup, PickupKind};
use event_horizon::player::{
    keyboard_to_intent_system, sample_player_input_system, spawn_player, Player, PlayerHealth,
    PlayerMotion, PlayerScore, PLAYER_HALF_EXTENTS,
};
use event_horizon::projectile::{spawn_projectile, Projectile, Side, WorldBoundary};
use event_horizon::registry::{Bounds, Category, EntityRegistry};
use event_horizon::signals::{PlayerDied, ScoreChanged};
use event_horizon::simulation::SimulationPlugin;

/// World units per screen pixel.
const CAMERA_SCALE: f32 = 1.0 / 32.0;

fn setup_camera(mut commands: Commands) {
    commands.spawn((
        Camera2d,
        Projection::Orthographic(OrthographicProjection {
            scale: CAMERA_SCALE,
            ..OrthographicProjection::default_2d()
        }),
    ));
}

/// The player integrates its own gravity; Rapier only resolves contacts.
fn setup_physics_config(mut config: Query<&mut RapierConfiguration>) {
    for mut cfg in config.iter_mut() {
        cfg.gravity = Vec2::ZERO;
    }
}

fn spawn_demo_scene(mut commands: Commands, config: Res<SimConfig>) {
    commands.spawn((
        WorldBoundary::default(),
        RigidBody::Fixed,
        Collider::cuboid(40.0, 0.5),
        Transform::from_xyz(0.0, -1.5, 0.0),
    ));

    if let Err(e) = spawn_player(&mut commands, &config.player, Vec2::ZERO) {
        error!("Cannot spawn player: {e}");
    }

    for (x, y) in [(12.0, 0.0), (15.0, 1.5), (-14.0, 0.5)] {
        spawn_enemy(
            &mut commands,
            Enemy::new(20.0, 10.0, Vec2::new(2.0, 2.0)),
            Vec2::new(x, y),
            0.6,
        );
    }
    spawn_enemy(
        &mut commands,
        Enemy::new(60.0, 20.0, Vec2::new(3.0, 3.0)).immune(),
        Vec2::new(20.0, 1.0),
        1.0,
    );

    let mut rng = rand::thread_rng();
    spawn_pickup(
        &mut commands,
        Pickup::timed(PickupKind::Microchips(25), &config.pickup, &mut rng),
        Vec2::new(5.0, 0.0),
        0.3,
    );
    spawn_pickup(
        &mut commands,
        Pickup::permanent(PickupKind::SpeedBoost {
            multiplier: 1.5,
            duration: 4.0,
        }),
        Vec2::new(-6.0, 0.0),
        0.3,
    );
}

/// `J` fires a bullet, `K` fires a black hole, both toward the facing side.
fn demo_fire_system(
    mut commands: Commands,
    keys: Res<ButtonInput<KeyCode>>,
    config: Res<SimConfig>,
    q_player: Query<(&Transform, &PlayerMotion, &PlayerHealth), With<Player>>,
) {
    let Ok((transform, motion, health)) = q_player.single() else {
        return;
    };
    if health.is_dead() {
        return;
    }
    let facing = if motion.facing_right { Vec2::X } else { Vec2::NEG_X };
    let muzzle = transform.translation.truncate() + facing * (PLAYER_HALF_EXTENTS.x + 0.3);

    if keys.just_pressed(KeyCode::KeyJ) {
        let shot = Projectile::from_tuning(&config.projectile, Side::Player).with_effect("spark");
        spawn_projectile(&mut commands, shot, muzzle, facing, 0.15);
    }
    if keys.just_pressed(KeyCode::KeyK) {
        if let Err(e) = spawn_black_hole(&mut commands, &config.hazard, muzzle, facing) {
            error!("Cannot fire black hole: {e}");
        }
    }
}

fn log_outcomes_system(mut scores: MessageReader<ScoreChanged>, mut deaths: MessageReader<PlayerDied>) {
    for change in scores.read() {
        info!("Score {} ({:+}) combo x{}", change.score, change.delta, change.combo);
    }
    for _ in deaths.read() {
        info!("Game over");
    }
}

fn draw_bounds(gizmos: &mut Gizmos, center: Vec2, bounds: Option<Bounds>, color: Color) {
    match bounds {
        Some(Bounds::Circle { radius }) => {
            gizmos.circle_2d(center, radius, color);
        }
        Some(Bounds::Box { half_extents }) => {
            gizmos.rect_2d(center, half_extents * 2.0, color);
        }
        None => {
            gizmos.circle_2d(center, 0.05, color);
        }
    }
}

/// Immediate-mode debug view of every gameplay entity.
fn debug_gizmo_system(
    mut gizmos: Gizmos,
    score: Res<PlayerScore>,
    registry: EntityRegistry,
    q_player: Query<(&Transform, &PlayerHealth), With<Player>>,
    q_holes: Query<(&Transform, &BlackHole)>,
) {
    for (transform, health) in q_player.iter() {
        let pos = transform.translation.truncate();
        let color = if health.is_dead() {
            Color::srgb(0.3, 0.3, 0.3)
        } else {
            Color::srgb(0.2, 0.8, 1.0)
        };
        gizmos.rect_2d(pos, PLAYER_HALF_EXTENTS * 2.0, color);

        let fraction = health.current() / health.max();
        let bar_start = pos + Vec2::new(-PLAYER_HALF_EXTENTS.x, PLAYER_HALF_EXTENTS.y + 0.3);
        let bar_end = bar_start + Vec2::X * PLAYER_HALF_EXTENTS.x * 2.0 * fraction;
        gizmos.line_2d(bar_start, bar_end, Color::srgb(0.2, 1.0, 0.2));
    }

    let palette = [
        (Category::Enemy, Color::srgb(1.0, 0.3, 0.3)),
        (Category::Projectile, Color::WHITE),
        (Category::Pickup, Color::srgb(1.0, 0.85, 0.0)),
        (Category::Particle, Color::srgb(0.8, 0.6, 1.0)),
    ];
    for (category, color) in palette {
        for snapshot in registry.of(category) {
            draw_bounds(&mut gizmos, snapshot.center, snapshot.bounds, color);
        }
    }

    for (transform, hole) in q_holes.iter() {
        let center = transform.translation.truncate();
        gizmos.circle_2d(center, hole.tuning.inner_radius, Color::srgb(0.6, 0.0, 1.0));
        if hole.is_tracking() {
            gizmos.circle_2d(center, hole.tuning.outer_radius, Color::srgba(0.6, 0.0, 1.0, 0.4));
        }
    }

    // Combo pips above the origin.
    for i in 0..score.combo.min(10) {
        let x = -4.5 + i as f32;
        gizmos.circle_2d(Vec2::new(x, 9.0), 0.2, Color::srgb(1.0, 0.5, 0.0));
    }
}

fn main() {
    App::new()
        .add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Some(Window {
                title: "Event Horizon".into(),
                resolution: WindowResolution::new(1200, 680),
                ..Default::default()
            }),
            ..Default::default()
        }))
        .insert_resource(ClearColor(Color::BLACK))
        // One physics unit per world unit; the camera does the zooming.
        .add_plugins(RapierPhysicsPlugin::<NoUserData>::pixels_per_meter(1.0))
        .add_plugins(SimulationPlugin)
        .add_systems(
            Startup,
            (
                // Load config first so every other startup system sees the final values.
                load_sim_config,
                setup_camera,
                setup_physics_config,
                spawn_demo_scene.after(load_sim_config),
            ),
        )
        .add_systems(
            Update,
            (
                keyboard_to_intent_system.before(sample_player_input_system),
                demo_fire_system,
                log_outcomes_system,
                debug_gizmo_system,
            ),
        )
        .run();
}
