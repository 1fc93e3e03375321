//! Headless black hole scenarios.
//!
//! These tests add only the [`SimulationPlugin`]: no window, no rendering and
//! no Rapier pipeline.  Each step advances a plain `Time` by hand and runs the
//! `FixedUpdate` schedule once, so every scenario is deterministic.
//!
//! Covered scenarios:
//! 1. Inner zone kills an enemy outright; outer zone pulls and chips another.
//! 2. Periodic damage follows the damage rate and never kills instantly.
//! 3. An idle hazard self-destructs when its lifetime runs out.
//! 4. A spawned hazard dissipates, then removes itself and its anchor.
//! 5. Projectiles and pickups are destroyed inside, bent outside.
//! 6. The player dies inside and is pulled and damaged outside.
//! 7. The player's centre, not its box, decides which zone it is in.
//! 8. Only an enemy within the activation buffer wakes an idle hazard.

use bevy::ecs::message::Messages;
use bevy::prelude::*;
use bevy_rapier2d::prelude::Velocity;
use event_horizon::config::{HazardTuning, PlayerTuning, ProjectileTuning};
use event_horizon::enemy::Enemy;
use event_horizon::hazard::{spawn_black_hole, BlackHole, HazardAnchor, HazardPhase};
use event_horizon::pickup::{Pickup, PickupKind};
use event_horizon::player::{player_state_bundle, Dead, PlayerHealth, PlayerMotion, PlayerScore};
use event_horizon::projectile::{Projectile, Side};
use event_horizon::registry::{Bounds, Category, PendingDestroy};
use event_horizon::signals::{EnemyDamaged, EnemyKilled, ExplosionRequested, PlayerDied};
use event_horizon::simulation::SimulationPlugin;
use std::time::Duration;

// ── Helpers ───────────────────────────────────────────────────────────────────

fn sim_app() -> App {
    let mut app = App::new();
    app.add_plugins(SimulationPlugin);
    app.init_resource::<Time>();
    app
}

fn step(app: &mut App, dt: f32) {
    app.world_mut()
        .resource_mut::<Time>()
        .advance_by(Duration::from_secs_f32(dt));
    app.world_mut().run_schedule(FixedUpdate);
}

/// Hazard that opens its field on the first tick it activates.
fn stationary_tuning() -> HazardTuning {
    HazardTuning {
        shot_speed: 0.0,
        ..HazardTuning::default()
    }
}

fn fire_hole(app: &mut App, tuning: HazardTuning) -> Entity {
    let world = app.world_mut();
    let mut commands = world.commands();
    let entity = spawn_black_hole(&mut commands, &tuning, Vec2::ZERO, Vec2::X).unwrap();
    world.flush();
    entity
}

fn spawn_enemy_at(app: &mut App, enemy: Enemy, x: f32) -> Entity {
    app.world_mut()
        .spawn((
            enemy,
            Category::Enemy,
            Bounds::Circle { radius: 0.3 },
            Velocity::zero(),
            Transform::from_xyz(x, 0.0, 0.0),
        ))
        .id()
}

fn phase(app: &App, hole: Entity) -> HazardPhase {
    app.world().get::<BlackHole>(hole).unwrap().phase()
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[test]
fn inner_zone_kills_and_outer_zone_chips() {
    let mut app = sim_app();
    let hole = fire_hole(&mut app, stationary_tuning());
    let near = spawn_enemy_at(&mut app, Enemy::new(100.0, 5.0, Vec2::ONE), 0.5);
    let far = spawn_enemy_at(&mut app, Enemy::new(100.0, 5.0, Vec2::ONE), 3.0);

    step(&mut app, 0.1);

    assert_eq!(phase(&app, hole), HazardPhase::Spawned);
    assert!(app.world().get::<PendingDestroy>(near).is_some());
    assert!(app.world().get::<PendingDestroy>(far).is_none());
    assert_eq!(app.world().get::<Enemy>(far).unwrap().health, 95.0);

    // Pulled toward the centre and swept clockwise around it.
    let velocity = app.world().get::<Velocity>(far).unwrap().linvel;
    assert!(velocity.x < 0.0);
    assert!(velocity.y < 0.0);

    assert_eq!(app.world().resource::<Messages<EnemyKilled>>().len(), 1);
    assert_eq!(app.world().resource::<Messages<EnemyDamaged>>().len(), 1);
    // round(100 · 5 + 100 / 100 · 100) at combo 1.
    assert_eq!(app.world().resource::<PlayerScore>().score, 600);

    step(&mut app, 0.1);
    assert!(app.world().get_entity(near).is_err());
}

#[test]
fn outer_zone_damage_is_periodic_and_never_instant() {
    let mut app = sim_app();
    fire_hole(&mut app, stationary_tuning());
    let far = spawn_enemy_at(&mut app, Enemy::new(100.0, 5.0, Vec2::ONE), 3.0);

    let mut healths = Vec::new();
    for _ in 0..6 {
        // Hold the enemy in place so only the zone rules matter.
        app.world_mut()
            .get_mut::<Transform>(far)
            .unwrap()
            .translation = Vec3::new(3.0, 0.0, 0.0);
        step(&mut app, 0.1);
        healths.push(app.world().get::<Enemy>(far).unwrap().health);
    }

    // Rate 5/s at 0.1 s per tick: the spawn tick, then every second tick.
    assert_eq!(healths, vec![95.0, 95.0, 90.0, 90.0, 85.0, 85.0]);
    assert!(app.world().get::<PendingDestroy>(far).is_none());
}

#[test]
fn immune_enemy_survives_the_inner_zone() {
    let mut app = sim_app();
    fire_hole(&mut app, stationary_tuning());
    let boss = spawn_enemy_at(&mut app, Enemy::new(100.0, 5.0, Vec2::ONE).immune(), 0.5);

    step(&mut app, 0.1);

    assert!(app.world().get::<PendingDestroy>(boss).is_none());
    assert_eq!(app.world().get::<Enemy>(boss).unwrap().health, 95.0);
}

#[test]
fn idle_hazard_expires_silently() {
    let mut app = sim_app();
    let hole = fire_hole(&mut app, stationary_tuning());

    for _ in 0..11 {
        step(&mut app, 0.5);
    }
    assert!(app.world().get::<PendingDestroy>(hole).is_none());

    step(&mut app, 0.5);
    assert!(app.world().get::<PendingDestroy>(hole).is_some());
    assert_eq!(app.world().resource::<Messages<ExplosionRequested>>().len(), 1);

    let mut anchors = app.world_mut().query::<&HazardAnchor>();
    assert_eq!(anchors.iter(app.world()).count(), 0);
}

#[test]
fn spawned_hazard_dissipates_then_cleans_up() {
    let mut app = sim_app();
    let hole = fire_hole(&mut app, stationary_tuning());
    spawn_enemy_at(&mut app, Enemy::new(10_000.0, 5.0, Vec2::ONE).immune(), 3.0);

    step(&mut app, 0.5);
    let anchor = app.world().get::<BlackHole>(hole).unwrap().anchor.unwrap();
    assert!(app.world().get::<HazardAnchor>(anchor).is_some());

    // Spawned at 0.5 s; lifetime 6 s.
    for _ in 0..12 {
        step(&mut app, 0.5);
    }
    assert_eq!(phase(&app, hole), HazardPhase::Dissipating);
    assert!(app.world().get::<BlackHole>(hole).unwrap().enemies.is_empty());

    // Cleanup delay 1 s.
    step(&mut app, 0.5);
    assert!(app.world().get::<PendingDestroy>(hole).is_none());
    step(&mut app, 0.5);
    assert!(app.world().get::<PendingDestroy>(hole).is_some());
    assert!(app.world().get::<PendingDestroy>(anchor).is_some());
}

#[test]
fn projectiles_are_swallowed_or_bent() {
    let mut app = sim_app();
    fire_hole(&mut app, stationary_tuning());
    spawn_enemy_at(&mut app, Enemy::new(10_000.0, 5.0, Vec2::ONE).immune(), 2.0);

    let tuning = ProjectileTuning {
        shot_speed: 0.0,
        ..ProjectileTuning::default()
    };
    let mut swallowed = Projectile::from_tuning(&tuning, Side::Enemy);
    swallowed.initialize(Vec2::Y);
    let mut bent = swallowed.clone();
    bent.direction = Vec2::Y;

    let swallowed = app
        .world_mut()
        .spawn((swallowed, Category::Projectile, Transform::from_xyz(0.5, 0.0, 0.0)))
        .id();
    let bent = app
        .world_mut()
        .spawn((bent, Category::Projectile, Transform::from_xyz(0.0, 3.0, 0.0)))
        .id();

    step(&mut app, 0.1);

    assert!(app.world().get::<PendingDestroy>(swallowed).is_some());
    assert!(app.world().get::<PendingDestroy>(bent).is_none());
    let direction = app.world().get::<Projectile>(bent).unwrap().direction;
    assert!(direction.y < 1.0);
    let position = app.world().get::<Transform>(bent).unwrap().translation;
    assert!(position.y < 3.0);
}

#[test]
fn pickups_inside_are_destroyed() {
    let mut app = sim_app();
    fire_hole(&mut app, stationary_tuning());
    spawn_enemy_at(&mut app, Enemy::new(10_000.0, 5.0, Vec2::ONE).immune(), 2.0);

    let inside = app
        .world_mut()
        .spawn((
            Pickup::permanent(PickupKind::Points(10)),
            Category::Pickup,
            Velocity::zero(),
            Transform::from_xyz(0.0, 0.5, 0.0),
        ))
        .id();
    let outside = app
        .world_mut()
        .spawn((
            Pickup::permanent(PickupKind::Points(10)),
            Category::Pickup,
            Velocity::zero(),
            Transform::from_xyz(0.0, -3.0, 0.0),
        ))
        .id();

    step(&mut app, 0.1);

    assert!(app.world().get::<PendingDestroy>(inside).is_some());
    assert!(app.world().get::<PendingDestroy>(outside).is_none());
    assert!(app.world().get::<Velocity>(outside).unwrap().linvel.y > 0.0);
}

#[test]
fn player_is_pulled_and_damaged_outside_and_killed_inside() {
    let mut app = sim_app();
    fire_hole(&mut app, stationary_tuning());
    spawn_enemy_at(&mut app, Enemy::new(10_000.0, 5.0, Vec2::ONE).immune(), 2.0);

    let tuning = PlayerTuning::default();
    let player = app
        .world_mut()
        .spawn((
            player_state_bundle(&tuning).unwrap(),
            Transform::from_xyz(3.0, 0.0, 0.0),
        ))
        .id();

    step(&mut app, 0.1);

    assert_eq!(app.world().get::<PlayerHealth>(player).unwrap().current(), 95.0);
    assert!(app.world().get::<PlayerMotion>(player).unwrap().velocity.x < 0.0);

    app.world_mut()
        .get_mut::<Transform>(player)
        .unwrap()
        .translation = Vec3::new(0.2, 0.0, 0.0);
    step(&mut app, 0.1);

    assert!(app.world().get::<PlayerHealth>(player).unwrap().is_dead());
    assert!(app.world().get::<Dead>(player).is_some());
    assert_eq!(app.world().resource::<Messages<PlayerDied>>().len(), 1);
}

#[test]
fn player_centred_just_outside_inner_radius_survives() {
    let mut app = sim_app();
    fire_hole(&mut app, stationary_tuning());
    spawn_enemy_at(&mut app, Enemy::new(10_000.0, 5.0, Vec2::ONE).immune(), 2.0);

    // The player's box reaches into the inner zone; its centre does not.
    let player = app
        .world_mut()
        .spawn((
            player_state_bundle(&PlayerTuning::default()).unwrap(),
            Transform::from_xyz(0.0, 1.1, 0.0),
        ))
        .id();

    step(&mut app, 0.1);

    let health = app.world().get::<PlayerHealth>(player).unwrap();
    assert!(!health.is_dead());
    assert_eq!(health.current(), 95.0);
    assert!(app.world().get::<Dead>(player).is_none());
}

#[test]
fn activation_needs_an_enemy_within_the_buffer() {
    let mut app = sim_app();
    let hole = fire_hole(&mut app, stationary_tuning());
    // Outer radius 5, buffer 0.8: activation reaches 4.
    let enemy = spawn_enemy_at(&mut app, Enemy::new(100.0, 5.0, Vec2::ONE), 4.5);

    for _ in 0..5 {
        step(&mut app, 0.1);
    }
    assert_eq!(phase(&app, hole), HazardPhase::Idle);
    let tracked = &app.world().get::<BlackHole>(hole).unwrap().enemies;
    assert!(!tracked.contains(enemy));
    assert_eq!(app.world().get::<Enemy>(enemy).unwrap().health, 100.0);

    app.world_mut()
        .get_mut::<Transform>(enemy)
        .unwrap()
        .translation = Vec3::new(3.5, 0.0, 0.0);
    step(&mut app, 0.1);

    assert_eq!(phase(&app, hole), HazardPhase::Spawned);
    assert!(app.world().get::<BlackHole>(hole).unwrap().enemies.contains(enemy));
}
