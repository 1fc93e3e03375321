//! Black hole systems: classification, phase update and the per-category
//! effects of a live field.
//!
//! | System | Phase | Purpose |
//! |--------|-------|---------|
//! | [`hazard_classify_system`] | dispatch | prune and fill tracked sets, activate idle hazards |
//! | [`hazard_update_system`] | hazard | braking, spawn, damage cadence, dissipation, cleanup |
//! | [`hazard_particles_system`] | hazard | pull every live particle |
//! | [`hazard_enemies_system`] | hazard | instant kill inside, pull + periodic damage outside |
//! | [`hazard_projectiles_system`] | hazard | destroy inside, bend + drag outside |
//! | [`hazard_pickups_system`] | hazard | destroy inside, pull outside |
//! | [`hazard_player_system`] | hazard | lethal inside, pull + periodic damage outside |
//! | [`hazard_anchor_cleanup_system`] | hazard | drop anchors whose hazard is gone |
//!
//! Only spawned hazards act on anything; tracking starts at activation.

use super::state::{BlackHole, HazardAnchor, HazardPhase, HazardStep};
use crate::constants::{
    ENEMY_BLEND, ENEMY_PARTIAL_EXPLOSION, PARTICLE_BLEND, PARTICLE_SPEED, PICKUP_BLEND,
    PLAYER_BLEND, PLAYER_PARTIAL_EXPLOSION, PROJECTILE_DIRECTION_BLEND,
};
use crate::enemy::{damage_enemy, kill_enemy, Enemy};
use crate::particles::{Particle, ParticleEmitter};
use crate::pickup::{destroy_pickup, Pickup};
use crate::player::combat::segment_entities;
use crate::player::{Player, PlayerHealth, PlayerMotion, VisualSegments};
use crate::projectile::{destroy_projectile, Projectile};
use crate::registry::{Category, EntityRegistry, PendingDestroy};
use crate::signals::Signals;
use bevy::prelude::*;
use bevy_rapier2d::prelude::*;
use std::collections::HashSet;

#[inline]
fn blend(from: Vec2, to: Vec2, t: f32) -> Vec2 {
    from + (to - from) * t
}

// ── Classification ─────────────────────────────────────────────────────────────

/// Prune dead references and track whatever entered each hazard's outer zone.
pub fn hazard_classify_system(
    registry: EntityRegistry,
    mut hazards: Query<(Entity, &mut BlackHole, &Transform), Without<PendingDestroy>>,
) {
    for (entity, mut hole, transform) in hazards.iter_mut() {
        let hole = &mut *hole;
        hole.enemies.retain(|e| registry.is_live(*e));
        hole.projectiles.retain(|e| registry.is_live(*e));
        hole.pickups.retain(|e| registry.is_live(*e));

        if hole.phase() >= HazardPhase::Dissipating {
            continue;
        }

        let center = transform.translation.truncate();
        let outer = hole.outer_zone(center);
        let activation = hole.activation_zone(center);

        for enemy in registry.within(Category::Enemy, outer) {
            if !hole.is_tracking() && activation.contains_point(enemy.center) && hole.activate() {
                debug!("Black hole {entity} activated by enemy {}", enemy.entity);
            }
            if hole.is_tracking() {
                hole.enemies.insert(enemy.entity);
            }
        }
        if !hole.is_tracking() {
            continue;
        }
        for shot in registry.within(Category::Projectile, outer) {
            if shot.entity != entity {
                hole.projectiles.insert(shot.entity);
            }
        }
        for pickup in registry.within(Category::Pickup, outer) {
            hole.pickups.insert(pickup.entity);
        }
    }
}

// ── Phase update ───────────────────────────────────────────────────────────────

/// Advance every hazard and act on its phase transitions.
#[allow(clippy::type_complexity)]
pub fn hazard_update_system(
    mut commands: Commands,
    mut signals: Signals,
    time: Res<Time>,
    mut hazards: Query<(Entity, &mut BlackHole, &mut Projectile, &Transform), Without<PendingDestroy>>,
    mut anchors: Query<
        (&mut Transform, &mut ParticleEmitter),
        (With<HazardAnchor>, Without<BlackHole>),
    >,
) {
    let dt = time.delta_secs();

    for (entity, mut hole, mut projectile, transform) in hazards.iter_mut() {
        let center = transform.translation.truncate();
        let step = hole.tick(dt, &mut projectile.shot_speed);

        match step {
            HazardStep::Nothing => {}
            HazardStep::Spawned => {
                let tuning = &hole.tuning;
                let anchor = commands
                    .spawn((
                        HazardAnchor { hazard: entity },
                        ParticleEmitter::new(
                            tuning.emission_rate,
                            tuning.generated_particle_lifetime,
                            PARTICLE_SPEED,
                        ),
                        Transform::from_translation(center.extend(0.0)),
                    ))
                    .id();
                hole.anchor = Some(anchor);
                signals.animate(entity, "Spawn");
                info!("Black hole {entity} spawned at ({:.1}, {:.1})", center.x, center.y);
            }
            HazardStep::Expired => {
                debug!("Black hole {entity} expired without activating");
                signals.explode(entity, center, projectile.velocity);
                signals.destroy(&mut commands, entity);
            }
            HazardStep::Dissipated => {
                signals.explode(entity, center, Vec2::ZERO);
                if let Some((_, mut emitter)) = hole.anchor.and_then(|a| anchors.get_mut(a).ok()) {
                    emitter.enabled = false;
                }
                debug!("Black hole {entity} dissipating");
            }
            HazardStep::CleanUp => {
                if let Some(anchor) = hole.anchor.take() {
                    signals.destroy(&mut commands, anchor);
                }
                signals.destroy(&mut commands, entity);
            }
        }

        if let Some((mut anchor_transform, _)) = hole.anchor.and_then(|a| anchors.get_mut(a).ok()) {
            anchor_transform.translation = center.extend(anchor_transform.translation.z);
        }
    }
}

/// Destroy anchors whose hazard has been destroyed by other means.
pub fn hazard_anchor_cleanup_system(
    mut commands: Commands,
    mut signals: Signals,
    anchors: Query<(Entity, &HazardAnchor), Without<PendingDestroy>>,
    hazards: Query<(), (With<BlackHole>, Without<PendingDestroy>)>,
) {
    for (entity, anchor) in anchors.iter() {
        if !hazards.contains(anchor.hazard) {
            signals.destroy(&mut commands, entity);
        }
    }
}

// ── Per-category effects ───────────────────────────────────────────────────────

pub fn hazard_particles_system(
    hazards: Query<(&BlackHole, &Transform), Without<PendingDestroy>>,
    mut particles: Query<(&mut Particle, &Transform), (Without<PendingDestroy>, Without<BlackHole>)>,
) {
    for (hole, hazard_transform) in hazards.iter() {
        if !hole.is_spawned() {
            continue;
        }
        let center = hazard_transform.translation.truncate();
        let inner = hole.inner_zone(center);
        let outer = hole.outer_zone(center);
        let inner_field = hole.inner_field();
        let particle_field = hole.particle_field();

        for (mut particle, transform) in particles.iter_mut() {
            let position = transform.translation.truncate();
            if inner.contains_point(position) {
                particle.velocity = inner_field.force_at(position, center);
            } else if outer.contains_point(position) {
                let target = particle_field.force_at(position, center);
                particle.velocity = blend(particle.velocity, target, PARTICLE_BLEND);
                particle.extend_lifetime(hole.tuning.affected_particle_lifetime);
            }
        }
    }
}

pub fn hazard_enemies_system(
    mut commands: Commands,
    mut signals: Signals,
    registry: EntityRegistry,
    hazards: Query<(Entity, &BlackHole, &Transform), Without<PendingDestroy>>,
    mut enemies: Query<(&mut Enemy, Option<&mut Velocity>), Without<PendingDestroy>>,
) {
    for (hazard, hole, hazard_transform) in hazards.iter() {
        if !hole.is_spawned() {
            continue;
        }
        let center = hazard_transform.translation.truncate();
        let inner = hole.inner_zone(center);
        let outer = hole.outer_zone(center);
        let field = hole.outer_field();

        for entity in hole.enemies.iter() {
            let Some(snapshot) = registry.get(entity) else {
                continue;
            };
            let Ok((mut enemy, velocity)) = enemies.get_mut(entity) else {
                continue;
            };
            let position = snapshot.center;
            if inner.contains_point(position) {
                if !enemy.immune_to_instant_kill {
                    kill_enemy(&mut commands, &mut signals, entity, &mut enemy, position);
                    continue;
                }
            } else if !outer.contains_point(position) {
                continue;
            }

            if !enemy.immune_to_instant_kill {
                if let Some(mut velocity) = velocity {
                    let target = field.force_at(position, center);
                    velocity.linvel = blend(velocity.linvel, target, ENEMY_BLEND);
                }
            }
            if hole.damage_due() && !enemy.is_dead() {
                signals.explode_partial(entity, position, Vec2::ZERO, ENEMY_PARTIAL_EXPLOSION);
                damage_enemy(
                    &mut commands,
                    &mut signals,
                    entity,
                    &mut enemy,
                    position,
                    hazard,
                    hole.tuning.damage,
                );
            }
        }
    }
}

pub fn hazard_projectiles_system(
    mut commands: Commands,
    mut signals: Signals,
    time: Res<Time>,
    hazards: Query<(&BlackHole, &Transform), Without<PendingDestroy>>,
    mut projectiles: Query<
        (&mut Projectile, &mut Transform),
        (Without<PendingDestroy>, Without<BlackHole>),
    >,
    mut destroyed: Local<HashSet<Entity>>,
) {
    let dt = time.delta_secs();
    destroyed.clear();

    for (hole, hazard_transform) in hazards.iter() {
        if !hole.is_spawned() {
            continue;
        }
        let center = hazard_transform.translation.truncate();
        let inner = hole.inner_zone(center);
        let outer = hole.outer_zone(center);
        let field = hole.outer_field();

        for entity in hole.projectiles.iter() {
            if destroyed.contains(&entity) {
                continue;
            }
            let Ok((mut projectile, mut transform)) = projectiles.get_mut(entity) else {
                continue;
            };
            let position = transform.translation.truncate();
            if inner.contains_point(position) {
                destroy_projectile(&mut commands, &mut signals, entity, &projectile, position);
                destroyed.insert(entity);
            } else if outer.contains_point(position) {
                let force = field.force_at(position, center);
                let pull = force.normalize_or_zero();
                projectile.direction = blend(projectile.direction, pull, PROJECTILE_DIRECTION_BLEND);
                transform.translation += (force * dt).extend(0.0);
            }
        }
    }
}

pub fn hazard_pickups_system(
    mut commands: Commands,
    mut signals: Signals,
    registry: EntityRegistry,
    hazards: Query<(&BlackHole, &Transform), Without<PendingDestroy>>,
    mut pickups: Query<Option<&mut Velocity>, (With<Pickup>, Without<PendingDestroy>)>,
    mut destroyed: Local<HashSet<Entity>>,
) {
    destroyed.clear();

    for (hole, hazard_transform) in hazards.iter() {
        if !hole.is_spawned() {
            continue;
        }
        let center = hazard_transform.translation.truncate();
        let inner = hole.inner_zone(center);
        let outer = hole.outer_zone(center);
        let field = hole.outer_field();

        for entity in hole.pickups.iter() {
            if destroyed.contains(&entity) {
                continue;
            }
            let Some(snapshot) = registry.get(entity) else {
                continue;
            };
            let Ok(velocity) = pickups.get_mut(entity) else {
                continue;
            };
            let position = snapshot.center;
            if inner.contains_point(position) {
                destroy_pickup(&mut commands, &mut signals, entity, position);
                destroyed.insert(entity);
            } else if outer.contains_point(position) {
                if let Some(mut velocity) = velocity {
                    let target = field.force_at(position, center);
                    velocity.linvel = blend(velocity.linvel, target, PICKUP_BLEND);
                }
            }
        }
    }
}

/// The player is never tracked: every spawned hazard tests its centre directly.
#[allow(clippy::type_complexity)]
pub fn hazard_player_system(
    mut signals: Signals,
    time: Res<Time>,
    hazards: Query<(&BlackHole, &Transform), Without<PendingDestroy>>,
    mut players: Query<
        (
            Entity,
            &Transform,
            &mut PlayerMotion,
            &mut PlayerHealth,
            Option<&VisualSegments>,
        ),
        (With<Player>, Without<BlackHole>),
    >,
    segment_transforms: Query<&GlobalTransform>,
) {
    let now = time.elapsed_secs();

    for (hole, hazard_transform) in hazards.iter() {
        if !hole.is_spawned() {
            continue;
        }
        let center = hazard_transform.translation.truncate();
        let inner = hole.inner_zone(center);
        let outer = hole.outer_zone(center);
        let field = hole.outer_field();

        for (entity, transform, mut motion, mut health, segments) in players.iter_mut() {
            if health.is_dead() {
                continue;
            }
            let position = transform.translation.truncate();
            if inner.contains_point(position) {
                health.set(0.0, now);
                continue;
            }
            if !outer.contains_point(position) {
                continue;
            }

            let target = field.force_at(position, center);
            motion.velocity = blend(motion.velocity, target, PLAYER_BLEND);

            if hole.damage_due() {
                let pieces = segment_entities(entity, segments);
                let portion = PLAYER_PARTIAL_EXPLOSION / pieces.len() as f32;
                for piece in pieces {
                    let at = segment_transforms
                        .get(piece)
                        .map_or(position, |t| t.translation().truncate());
                    signals.explode_partial(piece, at, motion.velocity, portion);
                }
                health.damage(hole.tuning.damage, now);
            }
        }
    }
}
