//! Particle-like entities and emitters.
//!
//! Particles are lightweight ECS entities with a [`Particle`] component that
//! stores their own velocity and age.  They are the cheapest category a hazard
//! acts on: it overwrites or blends their velocity and can extend their
//! lifetime while they are caught.
//!
//! | System                     | Purpose                                          |
//! |----------------------------|--------------------------------------------------|
//! | `particle_update_system`   | Move particles and expire them at end of life    |
//! | `particle_emitter_system`  | Emit particles from enabled [`ParticleEmitter`]s |
//!
//! Expired particles are tagged [`PendingDestroy`] directly instead of going
//! through `request_destroy`: nobody listens for individual particle deaths.

use crate::registry::{Category, PendingDestroy};
use bevy::prelude::*;
use rand::Rng;

// ── Components ───────────────────────────────────────────────────────────────

/// Short-lived particle entity.
#[derive(Component, Debug, Clone, PartialEq)]
pub struct Particle {
    /// World-space velocity (units/s).
    pub velocity: Vec2,
    /// Time alive so far (s).
    pub age: f32,
    /// Total lifetime (s); the particle expires when `age >= lifetime`.
    pub lifetime: f32,
}

impl Particle {
    pub fn new(velocity: Vec2, lifetime: f32) -> Self {
        Self {
            velocity,
            age: 0.0,
            lifetime,
        }
    }

    /// Give the particle `remaining` more seconds from now.
    pub fn extend_lifetime(&mut self, remaining: f32) {
        self.lifetime = self.age + remaining;
    }

    #[inline]
    pub fn expired(&self) -> bool {
        self.age >= self.lifetime
    }
}

/// Continuous particle source.
#[derive(Component, Debug, Clone, PartialEq)]
pub struct ParticleEmitter {
    /// Particles per second.
    pub rate: f32,
    pub particle_lifetime: f32,
    pub speed: f32,
    pub enabled: bool,
    /// Fractional particles carried over between ticks.
    pub accumulator: f32,
}

impl ParticleEmitter {
    pub fn new(rate: f32, particle_lifetime: f32, speed: f32) -> Self {
        Self {
            rate,
            particle_lifetime,
            speed,
            enabled: true,
            accumulator: 0.0,
        }
    }

    /// Number of particles to emit this tick.
    pub fn advance(&mut self, dt: f32) -> u32 {
        if !self.enabled {
            self.accumulator = 0.0;
            return 0;
        }
        self.accumulator += self.rate * dt;
        let count = self.accumulator.floor();
        self.accumulator -= count;
        count as u32
    }
}

// ── Spawning ─────────────────────────────────────────────────────────────────

pub fn spawn_particle(commands: &mut Commands, position: Vec2, velocity: Vec2, lifetime: f32) {
    commands.spawn((
        Particle::new(velocity, lifetime),
        Category::Particle,
        Transform::from_translation(position.extend(0.0)),
    ));
}

// ── Systems ──────────────────────────────────────────────────────────────────

pub fn particle_update_system(
    mut commands: Commands,
    time: Res<Time>,
    mut query: Query<(Entity, &mut Transform, &mut Particle), Without<PendingDestroy>>,
) {
    let dt = time.delta_secs();

    for (entity, mut transform, mut particle) in query.iter_mut() {
        particle.age += dt;

        if particle.expired() {
            commands.entity(entity).try_insert(PendingDestroy);
            continue;
        }

        transform.translation.x += particle.velocity.x * dt;
        transform.translation.y += particle.velocity.y * dt;
    }
}

pub fn particle_emitter_system(
    mut commands: Commands,
    time: Res<Time>,
    mut emitters: Query<(&Transform, &mut ParticleEmitter), Without<PendingDestroy>>,
) {
    let dt = time.delta_secs();
    let mut rng = rand::thread_rng();

    for (transform, mut emitter) in emitters.iter_mut() {
        let origin = transform.translation.truncate();
        for _ in 0..emitter.advance(dt) {
            let angle = rng.gen_range(0.0..std::f32::consts::TAU);
            let velocity = Vec2::from_angle(angle) * emitter.speed;
            spawn_particle(&mut commands, origin, velocity, emitter.particle_lifetime);
        }
    }
}
