//! Black hole state: phase machine, damage cadence and tracked-entity sets.
//!
//! Everything here is plain data driven by [`BlackHole::tick`], so the phase
//! rules can be tested without an `App`.

use crate::config::HazardTuning;
use crate::constants::PARTICLE_FORCE_EXPONENT;
use crate::error::SimResult;
use crate::force_field::FieldParams;
use crate::registry::Zone;
use bevy::prelude::*;

/// Lifecycle phase.  Ordered; a hazard only ever moves forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum HazardPhase {
    /// Flying, waiting for an enemy to come close.
    #[default]
    Idle,
    /// An enemy came close; the shot is braking.
    Activated,
    /// The field is live.
    Spawned,
    /// The field is gone; waiting out the cleanup delay.
    Dissipating,
}

/// What a [`BlackHole::tick`] asks the owning system to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HazardStep {
    Nothing,
    /// Just entered [`HazardPhase::Spawned`]: create the particle anchor.
    Spawned,
    /// Idle for its whole lifetime: explode and destroy, silently.
    Expired,
    /// Just entered [`HazardPhase::Dissipating`].
    Dissipated,
    /// The cleanup delay has passed: destroy hazard and anchor.
    CleanUp,
}

/// Ordered entity set with insert-if-absent semantics.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrackedSet(Vec<Entity>);

impl TrackedSet {
    /// Returns `false` when the entity was already tracked.
    pub fn insert(&mut self, entity: Entity) -> bool {
        if self.contains(entity) {
            return false;
        }
        self.0.push(entity);
        true
    }

    pub fn contains(&self, entity: Entity) -> bool {
        self.0.contains(&entity)
    }

    pub fn retain(&mut self, keep: impl FnMut(&Entity) -> bool) {
        self.0.retain(keep);
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = Entity> + '_ {
        self.0.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// A radial force-field hazard.
///
/// The entity also carries a [`crate::projectile::Projectile`] of kind
/// `Hazard`; its shot speed is what [`BlackHole::tick`] brakes.
#[derive(Component, Debug, Clone, PartialEq)]
pub struct BlackHole {
    pub tuning: HazardTuning,
    phase: HazardPhase,
    /// Seconds since the hazard was fired.
    pub age: f32,
    damage_timer: f32,
    damage_due: bool,
    spawned_at: Option<f32>,
    dissipated_at: Option<f32>,
    /// Particle emitter entity created on spawn.
    pub anchor: Option<Entity>,
    pub enemies: TrackedSet,
    pub projectiles: TrackedSet,
    pub pickups: TrackedSet,
}

impl BlackHole {
    pub fn new(tuning: HazardTuning) -> SimResult<Self> {
        tuning.validate()?;
        // Starts full: the first spawned tick deals damage.
        let damage_timer = tuning.damage_rate.recip();
        Ok(Self {
            tuning,
            phase: HazardPhase::Idle,
            age: 0.0,
            damage_timer,
            damage_due: false,
            spawned_at: None,
            dissipated_at: None,
            anchor: None,
            enemies: TrackedSet::default(),
            projectiles: TrackedSet::default(),
            pickups: TrackedSet::default(),
        })
    }

    #[inline]
    pub fn phase(&self) -> HazardPhase {
        self.phase
    }

    /// Activated or Spawned: the hazard tracks what enters its outer zone.
    #[inline]
    pub fn is_tracking(&self) -> bool {
        matches!(self.phase, HazardPhase::Activated | HazardPhase::Spawned)
    }

    #[inline]
    pub fn is_spawned(&self) -> bool {
        self.phase == HazardPhase::Spawned
    }

    /// Whether this tick is a damage tick.
    #[inline]
    pub fn damage_due(&self) -> bool {
        self.damage_due
    }

    /// Idle → Activated.  Any other phase is a caller bug and is ignored.
    pub fn activate(&mut self) -> bool {
        if self.phase != HazardPhase::Idle {
            error!("Black hole activated while {:?}; ignoring", self.phase);
            return false;
        }
        self.phase = HazardPhase::Activated;
        true
    }

    pub fn inner_zone(&self, center: Vec2) -> Zone {
        Zone::new(center, self.tuning.inner_radius)
    }

    pub fn outer_zone(&self, center: Vec2) -> Zone {
        Zone::new(center, self.tuning.outer_radius)
    }

    /// Zone an enemy must enter to activate an idle hazard.
    pub fn activation_zone(&self, center: Vec2) -> Zone {
        self.outer_zone(center).scaled(self.tuning.activation_buffer)
    }

    /// Field inside the inner zone.  Normalised against the outer radius so
    /// the pull keeps growing toward the centre.
    pub fn inner_field(&self) -> FieldParams {
        FieldParams::new(
            self.tuning.inner_force,
            self.tuning.outer_radius,
            self.tuning.inner_rotation,
        )
    }

    pub fn outer_field(&self) -> FieldParams {
        FieldParams::new(
            self.tuning.outer_force,
            self.tuning.outer_radius,
            self.tuning.outer_rotation,
        )
    }

    /// Outer field with the steeper falloff particles use.
    pub fn particle_field(&self) -> FieldParams {
        self.outer_field().with_exponent(PARTICLE_FORCE_EXPONENT)
    }

    pub fn clear_tracked(&mut self) {
        self.enemies.clear();
        self.projectiles.clear();
        self.pickups.clear();
    }

    /// Advance one tick.  `shot_speed` is the hazard projectile's speed and is
    /// braked toward zero while activated.
    pub fn tick(&mut self, dt: f32, shot_speed: &mut f32) -> HazardStep {
        self.age += dt;
        self.damage_due = false;

        let mut step = HazardStep::Nothing;
        if self.phase == HazardPhase::Activated {
            *shot_speed += (0.0 - *shot_speed) * self.tuning.speed_smoothing;
            if *shot_speed <= self.tuning.spawn_speed {
                *shot_speed = 0.0;
                self.phase = HazardPhase::Spawned;
                self.spawned_at = Some(self.age);
                step = HazardStep::Spawned;
            }
        }

        match self.phase {
            HazardPhase::Idle if self.age >= self.tuning.lifetime => HazardStep::Expired,
            HazardPhase::Spawned => {
                let spawned_at = self.spawned_at.unwrap_or(self.age);
                if self.age - spawned_at >= self.tuning.lifetime {
                    self.phase = HazardPhase::Dissipating;
                    self.dissipated_at = Some(self.age);
                    self.clear_tracked();
                    return HazardStep::Dissipated;
                }
                if step != HazardStep::Spawned {
                    self.damage_timer += dt;
                }
                if self.damage_timer >= self.tuning.damage_rate.recip() {
                    self.damage_timer = 0.0;
                    self.damage_due = true;
                }
                step
            }
            HazardPhase::Dissipating => {
                let dissipated_at = self.dissipated_at.unwrap_or(self.age);
                if self.age - dissipated_at >= self.tuning.cleanup_delay {
                    HazardStep::CleanUp
                } else {
                    HazardStep::Nothing
                }
            }
            _ => step,
        }
    }
}

/// Particle emitter that follows a spawned black hole.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub struct HazardAnchor {
    pub hazard: Entity,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hole() -> BlackHole {
        BlackHole::new(HazardTuning::default()).unwrap()
    }

    #[test]
    fn inverted_radii_refuse_to_build() {
        let tuning = HazardTuning {
            inner_radius: 5.0,
            outer_radius: 5.0,
            ..HazardTuning::default()
        };
        assert!(BlackHole::new(tuning).is_err());
    }

    #[test]
    fn tracked_insert_is_idempotent() {
        let mut world = World::new();
        let e = world.spawn_empty().id();
        let mut set = TrackedSet::default();
        assert!(set.insert(e));
        assert!(!set.insert(e));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn activation_only_from_idle() {
        let mut h = hole();
        assert!(h.activate());
        assert!(!h.activate());
        assert_eq!(h.phase(), HazardPhase::Activated);
    }

    #[test]
    fn idle_hazard_expires_after_lifetime() {
        let mut h = hole();
        let mut speed = 15.0;
        for _ in 0..11 {
            assert_eq!(h.tick(0.5, &mut speed), HazardStep::Nothing);
        }
        assert_eq!(h.tick(0.5, &mut speed), HazardStep::Expired);
        assert_eq!(speed, 15.0);
    }

    #[test]
    fn braking_spawns_once_slow_enough() {
        let mut h = hole();
        h.activate();
        let mut speed = 15.0;
        let mut ticks = 0;
        while h.tick(1.0 / 60.0, &mut speed) != HazardStep::Spawned {
            ticks += 1;
            assert!(ticks < 100);
        }
        // 15 · 0.9^n <= 2 first holds at n = 20.
        assert_eq!(ticks, 19);
        assert!(h.is_spawned());
        assert!(h.damage_due());
    }

    #[test]
    fn activated_hazard_waits_past_lifetime() {
        let mut h = hole();
        h.tuning.speed_smoothing = 0.0;
        h.activate();
        let mut speed = 15.0;
        for _ in 0..200 {
            assert_eq!(h.tick(0.1, &mut speed), HazardStep::Nothing);
        }
        assert_eq!(h.phase(), HazardPhase::Activated);
    }

    #[test]
    fn damage_ticks_follow_rate() {
        let mut h = hole();
        h.activate();
        let mut speed = 0.0;
        let mut due = Vec::new();
        for _ in 0..10 {
            h.tick(0.1, &mut speed);
            due.push(h.damage_due());
        }
        // Rate 5/s at 0.1 s per tick: spawn tick, then every second tick.
        assert_eq!(
            due,
            vec![true, false, true, false, true, false, true, false, true, false]
        );
    }

    #[test]
    fn spawned_hazard_dissipates_then_cleans_up() {
        let mut h = hole();
        h.activate();
        let mut speed = 0.0;
        h.tick(0.5, &mut speed);
        h.enemies.insert(World::new().spawn_empty().id());

        let mut steps = Vec::new();
        for _ in 0..16 {
            let step = h.tick(0.5, &mut speed);
            if step != HazardStep::Nothing {
                steps.push(step);
            }
        }
        assert_eq!(steps[0], HazardStep::Dissipated);
        assert!(h.enemies.is_empty());
        assert_eq!(h.phase(), HazardPhase::Dissipating);
        assert_eq!(steps[1], HazardStep::CleanUp);
        assert!(!h.is_tracking());
    }
}
