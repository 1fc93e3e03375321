//! Player module: character entity, input handling, movement and combat.
//!
//! ## Sub-module layout
//!
//! | Module | Responsibility |
//! |--------|----------------|
//! | [`state`] | ECS components (`Player`, `PlayerHealth`, `PlayerMotion`, `GoToPoint`, …) and Bevy resources (`PlayerIntent`, `PlayerScore`) |
//! | [`control`] | Keyboard intent, input sampling, go-to-point steering, jump, horizontal easing, gravity |
//! | [`combat`] | Contact damage, deferred knockback, invincibility flash, combo/score, pickups, death |
//!
//! All public items are re-exported at this level so that the rest of the crate
//! can use flat `crate::player::*` imports without knowing the sub-module layout.

pub mod combat;
pub mod control;
pub mod state;

// ── Flat re-exports ────────────────────────────────────────────────────────────

pub use combat::{
    award_kill_points_system, combo_decay_system, knockback_velocity, pickup_effect_system,
    player_collision_dispatch_system, player_contact_damage_system,
    player_deferred_actions_system, player_death_system, player_flash_system, resolve_hit,
    take_damage, DamageSource, NoJumpZone, ResolvedHit,
};
pub use control::{
    jump_speed, keyboard_to_intent_system, player_movement_system, sample_player_input_system,
    steer_to_point, target_speed,
};
pub use state::{
    combo_threshold, DamageFlash, Dead, GoToPoint, HealthChange, HeldInput, IdleAnimations,
    InputLock, Player, PlayerAction, PlayerAnimationState, PlayerContacts, PlayerHealth,
    PlayerIntent, PlayerMotion, PlayerScore, VisualSegments,
};

// ── Spawn ──────────────────────────────────────────────────────────────────────

use crate::config::PlayerTuning;
use crate::error::SimResult;
use crate::registry::{Bounds, Category};
use crate::schedule::DeferredQueue;
use bevy::prelude::*;
use bevy_rapier2d::prelude::*;

/// Half extents of the player's box collider.
pub const PLAYER_HALF_EXTENTS: Vec2 = Vec2::new(0.5, 1.0);

/// Gameplay state every player carries, without physics or transform.
///
/// Fails when `tuning` breaks an invariant (for example a zero
/// `combo_start_kills`).
///
/// Headless tests spawn this plus a `Transform` and drive `PlayerMotion`
/// directly instead of going through a character controller.
pub fn player_state_bundle(tuning: &PlayerTuning) -> SimResult<impl Bundle> {
    tuning.validate()?;
    let health = PlayerHealth::new(tuning.max_health)?;
    Ok((
        (
            Player,
            Category::Player,
            Bounds::Box {
                half_extents: PLAYER_HALF_EXTENTS,
            },
        ),
        (
            health,
            DamageFlash::new(tuning.flash_time),
            PlayerContacts::default(),
            DeferredQueue::<PlayerAction>::default(),
        ),
        (
            HeldInput::default(),
            InputLock::default(),
            PlayerMotion::default(),
            PlayerAnimationState::default(),
        ),
    ))
}

/// Spawn the player character at `position`.
///
/// The player is a kinematic body moved through Rapier's character
/// controller; the collider reports events against sensors (enemies,
/// pickups, hostile shots) as well as solid geometry.
pub fn spawn_player(commands: &mut Commands, tuning: &PlayerTuning, position: Vec2) -> SimResult<Entity> {
    let state = player_state_bundle(tuning)?;
    let idle = IdleAnimations::new(vec!["IdleLook", "IdleStretch"], tuning, &mut rand::thread_rng());
    let entity = commands
        .spawn((
            state,
            idle,
            (
                RigidBody::KinematicPositionBased,
                Collider::cuboid(PLAYER_HALF_EXTENTS.x, PLAYER_HALF_EXTENTS.y),
                KinematicCharacterController::default(),
                ActiveEvents::COLLISION_EVENTS,
                ActiveCollisionTypes::default()
                    | ActiveCollisionTypes::KINEMATIC_STATIC
                    | ActiveCollisionTypes::KINEMATIC_KINEMATIC,
            ),
            Transform::from_translation(position.extend(0.0)),
            Visibility::default(),
        ))
        .id();

    info!("Player spawned at ({:.1}, {:.1})", position.x, position.y);
    Ok(entity)
}
