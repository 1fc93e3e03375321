//! Radial force-field hazard ("black hole").
//!
//! ## Sub-module layout
//!
//! | Module | Responsibility |
//! |--------|----------------|
//! | [`state`] | `BlackHole` component, `HazardPhase` machine, `TrackedSet`, `HazardAnchor` |
//! | [`systems`] | classification, phase update, per-category field effects |
//!
//! ## Lifecycle
//!
//! A black hole is fired like a shot.  It flies `Idle` until an enemy comes
//! within `outer_radius × activation_buffer`, then brakes (`Activated`) and
//! opens its field once slow enough (`Spawned`).  After `lifetime` seconds
//! spawned it collapses (`Dissipating`) and is removed `cleanup_delay`
//! seconds later.  A hazard that never activates is destroyed when its
//! lifetime runs out.

pub mod state;
pub mod systems;

pub use state::{BlackHole, HazardAnchor, HazardPhase, HazardStep, TrackedSet};
pub use systems::{
    hazard_anchor_cleanup_system, hazard_classify_system, hazard_enemies_system,
    hazard_particles_system, hazard_pickups_system, hazard_player_system,
    hazard_projectiles_system, hazard_update_system,
};

use crate::config::HazardTuning;
use crate::error::SimResult;
use crate::projectile::{Projectile, ProjectileCaps, ProjectileKind, Side};
use crate::registry::{Bounds, Category};
use bevy::prelude::*;

/// Visual radius of the hazard body before its field opens.
pub const HAZARD_BODY_RADIUS: f32 = 0.5;

/// The projectile half of a fired hazard: no damage, no failsafe and no
/// collision rules; it only carries the hazard along `direction`.
pub fn hazard_projectile(tuning: &HazardTuning, direction: Vec2) -> Projectile {
    Projectile {
        side: Side::Player,
        kind: ProjectileKind::Hazard,
        damage: 0.0,
        knockback: Vec2::ZERO,
        gravity: 0.0,
        shot_speed: tuning.shot_speed,
        lifetime: tuning.lifetime,
        age: 0.0,
        direction,
        velocity: Vec2::ZERO,
        caps: ProjectileCaps {
            auto_destroy: false,
            destroy_on_enemy: false,
            destroy_on_world: false,
            correct_rotation: false,
        },
        destroy_shake: None,
        destroy_effect: None,
    }
}

/// Fire a black hole from `position` along `direction`.
///
/// Fails when the tuning is inconsistent (for instance inner radius not
/// below outer radius); nothing is spawned in that case.
pub fn spawn_black_hole(
    commands: &mut Commands,
    tuning: &HazardTuning,
    position: Vec2,
    direction: Vec2,
) -> SimResult<Entity> {
    let hole = BlackHole::new(tuning.clone())?;
    let projectile = hazard_projectile(tuning, direction.normalize_or_zero());
    let entity = commands
        .spawn((
            hole,
            projectile,
            Category::Projectile,
            Bounds::Circle {
                radius: HAZARD_BODY_RADIUS,
            },
            Transform::from_translation(position.extend(0.0)),
            Visibility::default(),
        ))
        .id();
    debug!("Black hole {entity} fired from ({:.1}, {:.1})", position.x, position.y);
    Ok(entity)
}
