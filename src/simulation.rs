//! Simulation plugin: resources, messages and the fixed-tick system order.
//!
//! Every gameplay system runs in `FixedUpdate`, grouped into the chained
//! [`SimSet`]s below.  Input sampling is the only thing in `Update`; it
//! writes the player's `HeldInput` and never touches physics.

use crate::config::SimConfig;
use crate::cutscene::{cutscene_system, CutsceneCommand};
use crate::hazard::{
    hazard_anchor_cleanup_system, hazard_classify_system, hazard_enemies_system,
    hazard_particles_system, hazard_pickups_system, hazard_player_system,
    hazard_projectiles_system, hazard_update_system,
};
use crate::particles::{particle_emitter_system, particle_update_system};
use crate::pickup::{pickup_lifetime_system, PickupCollected};
use crate::player::{
    award_kill_points_system, combo_decay_system, pickup_effect_system,
    player_collision_dispatch_system, player_contact_damage_system,
    player_deferred_actions_system, player_death_system, player_flash_system,
    player_movement_system, sample_player_input_system, PlayerIntent, PlayerScore,
};
use crate::projectile::{
    projectile_collision_system, projectile_lifetime_system, projectile_motion_system,
};
use crate::registry::despawn_pending_system;
use crate::signals::add_signals;
use bevy::prelude::*;
use bevy_rapier2d::prelude::*;

/// Fixed-tick phases, run in declaration order.
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SimSet {
    /// Despawn entities marked for destruction on an earlier tick.
    Cleanup,
    Movement,
    /// Collision and trigger dispatch, hazard classification, cutscenes.
    Dispatch,
    Hazard,
    Projectiles,
    /// Score awards and the death transition.
    Resolve,
}

pub struct SimulationPlugin;

impl Plugin for SimulationPlugin {
    fn build(&self, app: &mut App) {
        add_signals(app);
        app.add_message::<PickupCollected>()
            .add_message::<CutsceneCommand>()
            .add_message::<CollisionEvent>()
            .init_resource::<SimConfig>()
            .init_resource::<PlayerScore>()
            .init_resource::<PlayerIntent>()
            .configure_sets(
                FixedUpdate,
                (
                    SimSet::Cleanup,
                    SimSet::Movement,
                    SimSet::Dispatch,
                    SimSet::Hazard,
                    SimSet::Projectiles,
                    SimSet::Resolve,
                )
                    .chain(),
            )
            .add_systems(Update, sample_player_input_system)
            .add_systems(FixedUpdate, despawn_pending_system.in_set(SimSet::Cleanup))
            .add_systems(
                FixedUpdate,
                (
                    player_movement_system,
                    // Knockback overrides whatever movement just integrated.
                    player_deferred_actions_system,
                    combo_decay_system,
                    player_flash_system,
                )
                    .chain()
                    .in_set(SimSet::Movement),
            )
            .add_systems(
                FixedUpdate,
                (
                    player_collision_dispatch_system,
                    player_contact_damage_system,
                    projectile_collision_system,
                    hazard_classify_system,
                    cutscene_system,
                )
                    .chain()
                    .in_set(SimSet::Dispatch),
            )
            .add_systems(
                FixedUpdate,
                (
                    hazard_update_system,
                    hazard_particles_system,
                    hazard_enemies_system,
                    hazard_projectiles_system,
                    hazard_pickups_system,
                    hazard_player_system,
                    hazard_anchor_cleanup_system,
                )
                    .chain()
                    .in_set(SimSet::Hazard),
            )
            .add_systems(
                FixedUpdate,
                (
                    projectile_motion_system,
                    projectile_lifetime_system,
                    pickup_lifetime_system,
                    particle_update_system,
                    particle_emitter_system,
                )
                    .chain()
                    .in_set(SimSet::Projectiles),
            )
            .add_systems(
                FixedUpdate,
                (
                    pickup_effect_system,
                    award_kill_points_system,
                    player_death_system,
                )
                    .chain()
                    .in_set(SimSet::Resolve),
            );
    }
}
