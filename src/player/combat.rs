//! Player damage, knockback, invincibility flash, scoring and death.
//!
//! ## Damage pipeline
//!
//! 1. [`player_collision_dispatch_system`] keeps [`PlayerContacts`] in sync with
//!    Rapier `CollisionEvent`s, tracks no-jump zones and collects pickups.
//! 2. [`player_contact_damage_system`] retries damage for every contact each
//!    tick, so a sustained overlap hurts again once invincibility lapses.
//! 3. [`take_damage`] applies a [`ResolvedHit`]: health drops immediately and
//!    the knockback is queued on the player's [`DeferredQueue`] for
//!    `knockback_delay` seconds later.
//! 4. [`player_death_system`] runs the one-way death transition.

use super::state::{
    Dead, DamageFlash, HealthChange, InputLock, HeldInput, Player, PlayerAction, PlayerContacts,
    PlayerHealth, PlayerMotion, PlayerScore, VisualSegments,
};
use crate::config::{PlayerTuning, SimConfig};
use crate::enemy::Enemy;
use crate::pickup::{destroy_pickup, Pickup, PickupCollected, PickupKind};
use crate::projectile::{destroy_projectile, Projectile, ProjectileKind, Side};
use crate::registry::PendingDestroy;
use crate::schedule::DeferredQueue;
use crate::signals::{EnemyKilled, PlayerDied, ScoreChanged, Signals, VisibilityChanged};
use bevy::prelude::*;
use bevy_rapier2d::prelude::*;

// ── Damage resolution ──────────────────────────────────────────────────────────

/// Where a hit on the player came from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DamageSource {
    /// A hostile actor touching the player.
    Actor {
        position_x: f32,
        damage: f32,
        knockback: Vec2,
        /// Actors still playing their spawn animation deal nothing.
        spawned: bool,
    },
    Projectile {
        damage: f32,
        knockback: Vec2,
        direction: Vec2,
    },
}

impl DamageSource {
    pub fn from_enemy(enemy: &Enemy, position_x: f32) -> Self {
        DamageSource::Actor {
            position_x,
            damage: enemy.damage,
            knockback: enemy.knockback,
            spawned: enemy.spawned,
        }
    }

    pub fn from_projectile(projectile: &Projectile) -> Self {
        DamageSource::Projectile {
            damage: projectile.damage,
            knockback: projectile.knockback,
            direction: projectile.direction,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedHit {
    pub damage: f32,
    pub knockback: Vec2,
    /// +1 pushes the player right, −1 left.
    pub direction: f32,
}

/// Work out damage, knockback and push direction for a hit on a player at
/// `player_x`.  Non-zero overrides replace the source's own values.
///
/// Returns `None` for actors that have not finished spawning.
pub fn resolve_hit(
    player_x: f32,
    source: DamageSource,
    damage_override: f32,
    knockback_override: Vec2,
) -> Option<ResolvedHit> {
    let (damage, knockback, direction) = match source {
        DamageSource::Actor {
            position_x,
            damage,
            knockback,
            spawned,
        } => {
            if !spawned {
                return None;
            }
            (damage, knockback, (player_x - position_x).signum())
        }
        DamageSource::Projectile {
            damage,
            knockback,
            direction,
        } => (damage, knockback, direction.x.signum()),
    };
    Some(ResolvedHit {
        damage: if damage_override != 0.0 {
            damage_override
        } else {
            damage
        },
        knockback: if knockback_override != Vec2::ZERO {
            knockback_override
        } else {
            knockback
        },
        direction,
    })
}

/// Velocity applied by a knockback.
///
/// The horizontal term squares the knockback before scaling by gravity while
/// the vertical term does not; both are kept as tuned in the shipped levels.
/// A negative vertical knockback yields no lift rather than NaN.
pub fn knockback_velocity(knockback: Vec2, direction: f32, gravity: f32) -> Vec2 {
    Vec2::new(
        (knockback.x * knockback.x * -gravity).sqrt() * direction,
        (knockback.y * -gravity).max(0.0).sqrt(),
    )
}

/// Apply a resolved hit.  Returns `None` when invincibility blocked it.
pub fn take_damage(
    health: &mut PlayerHealth,
    actions: &mut DeferredQueue<PlayerAction>,
    hit: ResolvedHit,
    now: f32,
    tuning: &PlayerTuning,
) -> Option<HealthChange> {
    if !health.can_take_damage(now, tuning.invincibility_period) {
        return None;
    }
    if hit.damage == 0.0 {
        return Some(HealthChange::Unchanged);
    }
    let change = health.damage(hit.damage, now);
    if change != HealthChange::Died {
        actions.schedule(
            now + tuning.knockback_delay,
            PlayerAction::Knockback(knockback_velocity(hit.knockback, hit.direction, tuning.gravity)),
        );
    }
    Some(change)
}

// ── Systems ────────────────────────────────────────────────────────────────────

/// Sync contacts, no-jump zones and pickup collection from collision events.
#[allow(clippy::too_many_arguments)]
pub fn player_collision_dispatch_system(
    mut commands: Commands,
    mut signals: Signals,
    mut collision_events: MessageReader<CollisionEvent>,
    mut collected: MessageWriter<PickupCollected>,
    mut players: Query<(&mut PlayerContacts, &mut PlayerMotion), With<Player>>,
    enemies: Query<(), With<Enemy>>,
    projectiles: Query<&Projectile>,
    zones: Query<(), With<NoJumpZone>>,
    pickups: Query<(&Pickup, &Transform), Without<PendingDestroy>>,
) {
    for event in collision_events.read() {
        let (e1, e2, started) = match event {
            CollisionEvent::Started(a, b, _) => (*a, *b, true),
            CollisionEvent::Stopped(a, b, _) => (*a, *b, false),
        };
        let (player, other) = if players.contains(e1) {
            (e1, e2)
        } else if players.contains(e2) {
            (e2, e1)
        } else {
            continue;
        };
        let Ok((mut contacts, mut motion)) = players.get_mut(player) else {
            continue;
        };

        let hostile_shot = projectiles
            .get(other)
            .is_ok_and(|p| p.side == Side::Enemy && p.kind == ProjectileKind::Bullet);
        if enemies.contains(other) || hostile_shot {
            if started {
                contacts.add(other);
            } else {
                contacts.remove(other);
            }
        }

        if zones.contains(other) {
            if started {
                motion.no_jump_zones += 1;
            } else {
                motion.no_jump_zones = motion.no_jump_zones.saturating_sub(1);
            }
        }

        if started {
            if let Ok((pickup, transform)) = pickups.get(other) {
                collected.write(PickupCollected {
                    pickup: other,
                    player,
                    kind: pickup.kind,
                });
                destroy_pickup(
                    &mut commands,
                    &mut signals,
                    other,
                    transform.translation.truncate(),
                );
            }
        }
    }
}

/// Marker for areas where jumping is not allowed (portals).
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct NoJumpZone;

/// Attempt damage from every current contact.
pub fn player_contact_damage_system(
    mut commands: Commands,
    mut signals: Signals,
    time: Res<Time>,
    config: Res<SimConfig>,
    mut players: Query<
        (
            &Transform,
            &mut PlayerHealth,
            &mut PlayerContacts,
            &mut DeferredQueue<PlayerAction>,
        ),
        (With<Player>, Without<Dead>),
    >,
    enemies: Query<(&Enemy, &Transform), Without<PendingDestroy>>,
    projectiles: Query<(&Projectile, &Transform), Without<PendingDestroy>>,
) {
    let now = time.elapsed_secs();
    let tuning = &config.player;

    for (transform, mut health, mut contacts, mut actions) in players.iter_mut() {
        contacts
            .0
            .retain(|e| enemies.contains(*e) || projectiles.contains(*e));

        let player_x = transform.translation.x;
        for &contact in contacts.0.iter() {
            if !health.can_take_damage(now, tuning.invincibility_period) {
                break;
            }
            if let Ok((enemy, enemy_transform)) = enemies.get(contact) {
                let source = DamageSource::from_enemy(enemy, enemy_transform.translation.x);
                if let Some(hit) = resolve_hit(player_x, source, 0.0, Vec2::ZERO) {
                    take_damage(&mut health, &mut actions, hit, now, tuning);
                }
            } else if let Ok((projectile, shot_transform)) = projectiles.get(contact) {
                let source = DamageSource::from_projectile(projectile);
                if let Some(hit) = resolve_hit(player_x, source, 0.0, Vec2::ZERO) {
                    take_damage(&mut health, &mut actions, hit, now, tuning);
                }
                if projectile.caps.destroy_on_enemy {
                    destroy_projectile(
                        &mut commands,
                        &mut signals,
                        contact,
                        projectile,
                        shot_transform.translation.truncate(),
                    );
                }
            }
        }
    }
}

/// Run due knockbacks and speed resets.
///
/// A knockback moves the player by one step straight away so a grounded
/// player leaves the ground before the next movement tick zeroes its lift.
#[allow(clippy::type_complexity)]
pub fn player_deferred_actions_system(
    time: Res<Time>,
    mut q: Query<
        (
            &mut DeferredQueue<PlayerAction>,
            &mut PlayerMotion,
            &mut PlayerHealth,
            &mut Transform,
            Option<&mut KinematicCharacterController>,
        ),
        With<Player>,
    >,
) {
    let now = time.elapsed_secs();
    let dt = time.delta_secs();

    for (mut actions, mut motion, mut health, mut transform, mut controller) in q.iter_mut() {
        for action in actions.drain_due(now) {
            match action {
                PlayerAction::Knockback(velocity) => {
                    if health.is_dead() {
                        continue;
                    }
                    motion.velocity = velocity;
                    motion.grounded = false;
                    health.restart_invincibility(now);
                    match controller.as_deref_mut() {
                        Some(controller) => controller.translation = Some(velocity * dt),
                        None => transform.translation += (velocity * dt).extend(0.0),
                    }
                }
                PlayerAction::ResetSpeed => motion.speed_multiplier = 1.0,
            }
        }
    }
}

/// Toggle segment visibility while invincible.
pub fn player_flash_system(
    time: Res<Time>,
    config: Res<SimConfig>,
    mut visibility: MessageWriter<VisibilityChanged>,
    mut q: Query<
        (Entity, &PlayerHealth, &mut DamageFlash, Option<&VisualSegments>),
        (With<Player>, Without<Dead>),
    >,
) {
    let now = time.elapsed_secs();
    let dt = time.delta_secs();
    let tuning = &config.player;

    for (entity, health, mut flash, segments) in q.iter_mut() {
        let invincible = !health.can_take_damage(now, tuning.invincibility_period);
        let Some(visible) = flash.tick(dt, invincible, tuning.flash_time) else {
            continue;
        };
        for segment in segment_entities(entity, segments) {
            visibility.write(VisibilityChanged {
                entity: segment,
                visible,
            });
        }
    }
}

pub fn combo_decay_system(time: Res<Time>, config: Res<SimConfig>, mut score: ResMut<PlayerScore>) {
    score.tick_decay(time.delta_secs(), &config.player);
}

/// Award combo progress and points for every enemy killed this tick.
pub fn award_kill_points_system(
    config: Res<SimConfig>,
    mut kills: MessageReader<EnemyKilled>,
    mut score: ResMut<PlayerScore>,
    mut changed: MessageWriter<ScoreChanged>,
    players: Query<&PlayerHealth, With<Player>>,
) {
    let player_max_health = players
        .iter()
        .next()
        .map_or(config.player.max_health, |h| h.max());

    for kill in kills.read() {
        let delta = score.register_kill(kill.max_health, kill.damage, player_max_health, &config.player);
        changed.write(ScoreChanged {
            score: score.score,
            delta,
            combo: score.combo,
        });
    }
}

/// Apply the effect of collected pickups.
pub fn pickup_effect_system(
    time: Res<Time>,
    config: Res<SimConfig>,
    mut collected: MessageReader<PickupCollected>,
    mut score: ResMut<PlayerScore>,
    mut changed: MessageWriter<ScoreChanged>,
    mut players: Query<(&mut PlayerMotion, &mut DeferredQueue<PlayerAction>), With<Player>>,
) {
    let now = time.elapsed_secs();
    for pickup in collected.read() {
        match pickup.kind {
            PickupKind::Microchips(amount) => {
                score.add_microchips(i64::from(amount), config.player.max_microchips);
            }
            PickupKind::Points(points) => {
                let delta = score.add_points(i64::from(points), config.player.max_score);
                changed.write(ScoreChanged {
                    score: score.score,
                    delta,
                    combo: score.combo,
                });
            }
            PickupKind::SpeedBoost {
                multiplier,
                duration,
            } => {
                let Ok((mut motion, mut actions)) = players.get_mut(pickup.player) else {
                    continue;
                };
                motion.speed_multiplier = multiplier;
                actions.cancel(|a| *a == PlayerAction::ResetSpeed);
                actions.schedule(now + duration, PlayerAction::ResetSpeed);
            }
        }
    }
}

/// One-way death transition, run once per player.
#[allow(clippy::type_complexity)]
pub fn player_death_system(
    mut commands: Commands,
    mut signals: Signals,
    mut visibility: MessageWriter<VisibilityChanged>,
    mut died: MessageWriter<PlayerDied>,
    mut score: ResMut<PlayerScore>,
    mut q: Query<
        (
            Entity,
            &PlayerHealth,
            &mut InputLock,
            &mut HeldInput,
            &PlayerMotion,
            &Transform,
            Option<&VisualSegments>,
        ),
        (With<Player>, Without<Dead>),
    >,
    transforms: Query<&GlobalTransform>,
) {
    for (entity, health, mut lock, mut held, motion, transform, segments) in q.iter_mut() {
        if !health.is_dead() {
            continue;
        }
        commands.entity(entity).insert((Dead, ColliderDisabled));
        lock.disable(&mut held);

        let origin = transform.translation.truncate();
        for segment in segment_entities(entity, segments) {
            let position = transforms
                .get(segment)
                .map_or(origin, |t| t.translation().truncate());
            signals.explode(segment, position, motion.velocity);
            visibility.write(VisibilityChanged {
                entity: segment,
                visible: false,
            });
        }

        score.reset_combo();
        died.write(PlayerDied { player: entity });
        info!("Player {entity} died");
    }
}

pub(crate) fn segment_entities(player: Entity, segments: Option<&VisualSegments>) -> Vec<Entity> {
    match segments {
        Some(segments) if !segments.0.is_empty() => segments.0.clone(),
        _ => vec![player],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn actor_pushes_away_from_itself() {
        let source = DamageSource::Actor {
            position_x: 5.0,
            damage: 10.0,
            knockback: Vec2::new(2.0, 2.0),
            spawned: true,
        };
        let hit = resolve_hit(3.0, source, 0.0, Vec2::ZERO).unwrap();
        assert_eq!(hit.direction, -1.0);
        assert_eq!(hit.damage, 10.0);
    }

    #[test]
    fn unspawned_actor_deals_nothing() {
        let source = DamageSource::Actor {
            position_x: 0.0,
            damage: 10.0,
            knockback: Vec2::ONE,
            spawned: false,
        };
        assert!(resolve_hit(1.0, source, 0.0, Vec2::ZERO).is_none());
    }

    #[test]
    fn projectile_direction_sets_push_and_overrides_win() {
        let source = DamageSource::Projectile {
            damage: 5.0,
            knockback: Vec2::new(2.0, 2.0),
            direction: Vec2::new(-0.3, 0.9),
        };
        let hit = resolve_hit(0.0, source, 12.0, Vec2::new(1.0, 3.0)).unwrap();
        assert_eq!(hit.direction, -1.0);
        assert_eq!(hit.damage, 12.0);
        assert_eq!(hit.knockback, Vec2::new(1.0, 3.0));
    }

    #[test]
    fn zero_offset_pushes_right() {
        let source = DamageSource::Actor {
            position_x: 2.0,
            damage: 1.0,
            knockback: Vec2::ONE,
            spawned: true,
        };
        assert_eq!(resolve_hit(2.0, source, 0.0, Vec2::ZERO).unwrap().direction, 1.0);
    }

    #[test]
    fn knockback_formula_keeps_axis_asymmetry() {
        let v = knockback_velocity(Vec2::new(2.0, 2.0), -1.0, -35.0);
        assert!((v.x + (4.0f32 * 35.0).sqrt()).abs() < 1e-4);
        assert!((v.y - (2.0f32 * 35.0).sqrt()).abs() < 1e-4);
        assert_eq!(knockback_velocity(Vec2::new(0.0, -1.0), 1.0, -35.0).y, 0.0);
    }

    #[test]
    fn blocked_hit_changes_nothing() {
        let tuning = PlayerTuning::default();
        let mut health = PlayerHealth::new(100.0).unwrap();
        let mut actions = DeferredQueue::default();
        let hit = ResolvedHit {
            damage: 10.0,
            knockback: Vec2::ONE,
            direction: 1.0,
        };
        assert_eq!(
            take_damage(&mut health, &mut actions, hit, 1.0, &tuning),
            Some(HealthChange::Decreased)
        );
        assert_eq!(actions.len(), 1);
        assert_eq!(take_damage(&mut health, &mut actions, hit, 2.0, &tuning), None);
        assert_eq!(health.current(), 90.0);
        assert!(take_damage(&mut health, &mut actions, hit, 3.5, &tuning).is_some());
        assert_eq!(health.current(), 80.0);
    }

    #[test]
    fn lethal_hit_schedules_no_knockback() {
        let tuning = PlayerTuning::default();
        let mut health = PlayerHealth::new(10.0).unwrap();
        let mut actions = DeferredQueue::default();
        let hit = ResolvedHit {
            damage: 50.0,
            knockback: Vec2::ONE,
            direction: 1.0,
        };
        assert_eq!(
            take_damage(&mut health, &mut actions, hit, 0.0, &tuning),
            Some(HealthChange::Died)
        );
        assert!(actions.is_empty());
    }
}
