//! Pickups dropped into the level: an optional random auto-destroy lifetime
//! and collection on player contact.
//!
//! What a pickup does once collected is applied by the player module
//! (`crate::player::combat::pickup_effect_system`); this module only owns the
//! pickup's own lifecycle.

use crate::config::PickupTuning;
use crate::registry::{Bounds, Category, PendingDestroy};
use crate::signals::Signals;
use bevy::prelude::*;
use bevy_rapier2d::prelude::*;
use rand::Rng;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PickupKind {
    Microchips(u32),
    /// Raw points, multiplied by the current combo when awarded.
    Points(i32),
    SpeedBoost { multiplier: f32, duration: f32 },
}

#[derive(Component, Debug, Clone, PartialEq)]
pub struct Pickup {
    pub kind: PickupKind,
    pub age: f32,
    /// `None` for pickups that stay until collected.
    pub lifetime: Option<f32>,
}

impl Pickup {
    pub fn permanent(kind: PickupKind) -> Self {
        Self {
            kind,
            age: 0.0,
            lifetime: None,
        }
    }

    /// Auto-destroying pickup with a lifetime drawn from the tuning window.
    pub fn timed(kind: PickupKind, tuning: &PickupTuning, rng: &mut impl Rng) -> Self {
        let lifetime = if tuning.max_lifetime > tuning.min_lifetime {
            rng.gen_range(tuning.min_lifetime..=tuning.max_lifetime)
        } else {
            tuning.min_lifetime
        };
        Self {
            kind,
            age: 0.0,
            lifetime: Some(lifetime),
        }
    }

    pub fn expired(&self) -> bool {
        self.lifetime.is_some_and(|lifetime| self.age >= lifetime)
    }
}

/// A pickup was collected by the player.
#[derive(Message, Debug, Clone, Copy, PartialEq)]
pub struct PickupCollected {
    pub pickup: Entity,
    pub player: Entity,
    pub kind: PickupKind,
}

/// Explode and destroy a pickup (expiry, collection and hazard kills alike).
pub fn destroy_pickup(commands: &mut Commands, signals: &mut Signals, entity: Entity, position: Vec2) {
    signals.explode(entity, position, Vec2::ZERO);
    signals.destroy(commands, entity);
}

pub fn spawn_pickup(commands: &mut Commands, pickup: Pickup, position: Vec2, radius: f32) -> Entity {
    commands
        .spawn((
            pickup,
            Category::Pickup,
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

pub fn pickup_lifetime_system(
    mut commands: Commands,
    mut signals: Signals,
    time: Res<Time>,
    mut q: Query<(Entity, &mut Pickup, &Transform), Without<PendingDestroy>>,
) {
    let dt = time.delta_secs();
    for (entity, mut pickup, transform) in q.iter_mut() {
        pickup.age += dt;
        if pickup.expired() {
            destroy_pickup(
                &mut commands,
                &mut signals,
                entity,
                transform.translation.truncate(),
            );
        }
    }
}
