//! Hostile actors: health, contact damage and the damage entry point.
//!
//! Enemy AI and movement live outside this crate; the core only needs what an
//! enemy *is* to the player and to hazards.  Whatever hurts an enemy (a
//! player bullet, a hazard's damage tick) goes through [`damage_enemy`], and
//! instant kills go through [`kill_enemy`], so the kill signal and score award
//! happen in exactly one place.

use crate::registry::{Bounds, Category};
use crate::signals::{EnemyDamaged, EnemyKilled, Signals};
use bevy::prelude::*;
use bevy_rapier2d::prelude::*;

// ── Components ─────────────────────────────────────────────────────────────────

/// Hostile actor data.
#[derive(Component, Debug, Clone, PartialEq)]
pub struct Enemy {
    pub health: f32,
    pub max_health: f32,
    /// Contact damage dealt to the player.
    pub damage: f32,
    /// Knockback applied to the player on contact.
    pub knockback: Vec2,
    /// Survives a hazard's lethal zone (still takes its periodic damage).
    pub immune_to_instant_kill: bool,
    /// False while the spawn animation plays; such enemies deal no contact damage.
    pub spawned: bool,
}

impl Enemy {
    pub fn new(max_health: f32, damage: f32, knockback: Vec2) -> Self {
        Self {
            health: max_health,
            max_health,
            damage,
            knockback,
            immune_to_instant_kill: false,
            spawned: true,
        }
    }

    pub fn immune(mut self) -> Self {
        self.immune_to_instant_kill = true;
        self
    }

    /// Subtract `amount`; returns `true` when this hit was the killing blow.
    pub fn take_damage(&mut self, amount: f32) -> bool {
        if self.is_dead() {
            return false;
        }
        self.health = (self.health - amount).clamp(0.0, self.max_health);
        self.is_dead()
    }

    #[inline]
    pub fn is_dead(&self) -> bool {
        self.health <= 0.0
    }
}

// ── Damage entry points ────────────────────────────────────────────────────────

/// Apply `amount` damage from `source` to an enemy.
///
/// Returns `true` when the enemy died; it is then marked for destruction and
/// [`EnemyKilled`] is written.
pub fn damage_enemy(
    commands: &mut Commands,
    signals: &mut Signals,
    entity: Entity,
    enemy: &mut Enemy,
    position: Vec2,
    source: Entity,
    amount: f32,
) -> bool {
    if enemy.is_dead() {
        return false;
    }
    let killed = enemy.take_damage(amount);
    signals.enemy_damaged.write(EnemyDamaged {
        enemy: entity,
        source,
        amount,
    });
    if killed {
        finish_enemy(commands, signals, entity, enemy, position);
    }
    killed
}

/// Kill an enemy outright, bypassing damage and knockback.
pub fn kill_enemy(
    commands: &mut Commands,
    signals: &mut Signals,
    entity: Entity,
    enemy: &mut Enemy,
    position: Vec2,
) {
    if enemy.is_dead() {
        return;
    }
    enemy.health = 0.0;
    finish_enemy(commands, signals, entity, enemy, position);
}

fn finish_enemy(
    commands: &mut Commands,
    signals: &mut Signals,
    entity: Entity,
    enemy: &Enemy,
    position: Vec2,
) {
    signals.enemy_killed.write(EnemyKilled {
        enemy: entity,
        max_health: enemy.max_health,
        damage: enemy.damage,
    });
    signals.explode(entity, position, Vec2::ZERO);
    signals.destroy(commands, entity);
}

// ── Spawn ──────────────────────────────────────────────────────────────────────

/// Spawn an enemy with a circular sensor collider at `position`.
pub fn spawn_enemy(commands: &mut Commands, enemy: Enemy, position: Vec2, radius: f32) -> Entity {
    commands
        .spawn((
            enemy,
            Category::Enemy,
            Bounds::Circle { radius },
            RigidBody::Dynamic,
            GravityScale(0.0),
            Collider::ball(radius),
            Sensor,
            ActiveEvents::COLLISION_EVENTS,
            Velocity::zero(),
            Transform::from_translation(position.extend(0.0)),
        ))
        .id()
}
