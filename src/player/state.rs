//! Player components and resources.
//!
//! All ECS components and Bevy resources that describe player state live here.
//! Systems that mutate this state are in the sibling modules:
//! - [`super::control`]: input sampling, movement, go-to-point
//! - [`super::combat`]: damage, knockback, invincibility flash, score, death

use crate::config::PlayerTuning;
use crate::constants::{COMBO_DECAY_STEP, FLASH_EASING, FLASH_FAST_PERIOD};
use crate::error::{validate_positive, SimResult};
use bevy::prelude::*;
use rand::Rng;

// ── Components ─────────────────────────────────────────────────────────────────

/// Marker component for the player entity.
#[derive(Component)]
pub struct Player;

/// Added once, by the death transition.  Dead players take no damage and
/// ignore input.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct Dead;

/// What a health write did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HealthChange {
    Unchanged,
    Decreased,
    Increased,
    /// This write crossed to zero; reported exactly once per player.
    Died,
}

/// Current health plus the time of the last hit, which drives invincibility.
#[derive(Component, Debug, Clone, PartialEq)]
pub struct PlayerHealth {
    current: f32,
    max: f32,
    /// Fixed-clock time of the last decrease; `None` until the first hit.
    pub last_hit: Option<f32>,
    dead: bool,
}

impl PlayerHealth {
    pub fn new(max: f32) -> SimResult<Self> {
        validate_positive("PLAYER_MAX_HEALTH", max)?;
        Ok(Self {
            current: max,
            max,
            last_hit: None,
            dead: false,
        })
    }

    #[inline]
    pub fn current(&self) -> f32 {
        self.current
    }

    #[inline]
    pub fn max(&self) -> f32 {
        self.max
    }

    #[inline]
    pub fn is_dead(&self) -> bool {
        self.dead
    }

    /// Write a new health value.
    ///
    /// A decrease stamps `last_hit`; the value is clamped into `[0, max]`.
    /// Writes after death are ignored.
    pub fn set(&mut self, value: f32, now: f32) -> HealthChange {
        if self.dead {
            return HealthChange::Unchanged;
        }
        let previous = self.current;
        if value < previous {
            self.last_hit = Some(now);
        }
        self.current = value.clamp(0.0, self.max);
        if self.current <= 0.0 {
            self.dead = true;
            HealthChange::Died
        } else if self.current < previous {
            HealthChange::Decreased
        } else if self.current > previous {
            HealthChange::Increased
        } else {
            HealthChange::Unchanged
        }
    }

    pub fn damage(&mut self, amount: f32, now: f32) -> HealthChange {
        self.set(self.current - amount, now)
    }

    /// Damage is accepted strictly after the invincibility window has passed.
    pub fn can_take_damage(&self, now: f32, window: f32) -> bool {
        !self.dead && self.last_hit.is_none_or(|hit| now > hit + window)
    }

    pub fn restart_invincibility(&mut self, now: f32) {
        self.last_hit = Some(now);
    }
}

/// Visibility flashing while invincible.
///
/// The toggle period starts at `flash_time` and eases toward
/// [`FLASH_FAST_PERIOD`] so the flicker speeds up as the window runs out.
#[derive(Component, Debug, Clone, PartialEq)]
pub struct DamageFlash {
    pub timer: f32,
    pub period: f32,
    pub visible: bool,
}

impl DamageFlash {
    pub fn new(flash_time: f32) -> Self {
        Self {
            timer: 0.0,
            period: flash_time,
            visible: true,
        }
    }

    /// Advance one tick; returns the new visibility when it changed.
    pub fn tick(&mut self, dt: f32, invincible: bool, flash_time: f32) -> Option<bool> {
        if invincible {
            self.timer += dt;
            self.period += (FLASH_FAST_PERIOD - self.period) * FLASH_EASING;
            if self.timer > self.period {
                self.timer = 0.0;
                self.visible = !self.visible;
                return Some(self.visible);
            }
            None
        } else {
            self.timer = 0.0;
            self.period = flash_time;
            if self.visible {
                None
            } else {
                self.visible = true;
                Some(true)
            }
        }
    }
}

/// Sprite pieces that flash, hide and explode individually.
///
/// Without this component the player entity itself is the only segment.
#[derive(Component, Debug, Clone, Default)]
pub struct VisualSegments(pub Vec<Entity>);

/// Input as the fixed phase sees it; filled by the variable-rate sampler.
#[derive(Component, Debug, Clone, Copy, Default, PartialEq)]
pub struct HeldInput {
    pub left: bool,
    pub right: bool,
    pub run: bool,
    /// Latched until the next grounded fixed tick consumes it.
    pub jump: bool,
    pub fire: bool,
    pub aim_right: bool,
}

impl HeldInput {
    pub fn reset(&mut self) {
        self.left = false;
        self.right = false;
        self.run = false;
        self.jump = false;
    }

    /// -1, 0 or 1; right wins when both are held.
    pub fn direction(&self) -> f32 {
        if self.right {
            1.0
        } else if self.left {
            -1.0
        } else {
            0.0
        }
    }
}

/// Movement input gate used by cutscenes, go-to-point and death.
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InputLock {
    pub disabled: bool,
}

impl InputLock {
    pub fn disable(&mut self, held: &mut HeldInput) {
        self.disabled = true;
        held.reset();
    }

    pub fn enable(&mut self, held: &mut HeldInput) {
        held.reset();
        self.disabled = false;
    }
}

/// Kinematic movement state integrated by the fixed phase.
#[derive(Component, Debug, Clone, PartialEq)]
pub struct PlayerMotion {
    pub velocity: Vec2,
    pub grounded: bool,
    pub speed_multiplier: f32,
    /// Auto-run sections: run is forced and the player faces right.
    pub continuously_running: bool,
    pub facing_right: bool,
    /// Number of no-jump zones currently overlapped.
    pub no_jump_zones: u32,
}

impl Default for PlayerMotion {
    fn default() -> Self {
        Self {
            velocity: Vec2::ZERO,
            grounded: false,
            speed_multiplier: 1.0,
            continuously_running: false,
            facing_right: true,
            no_jump_zones: 0,
        }
    }
}

impl PlayerMotion {
    #[inline]
    pub fn in_no_jump_zone(&self) -> bool {
        self.no_jump_zones > 0
    }
}

/// Scripted walk to a target x, with input locked until arrival.
#[derive(Component, Debug, Clone, PartialEq)]
pub struct GoToPoint {
    pub target: Vec2,
    pub face_right: bool,
    pub auto_enable_input: bool,
    pub keep_inertia: bool,
    /// Set by [`GoToPoint::cancel`]; honoured on the next fixed tick.
    pub cancelled: bool,
    /// Input has been locked for this walk.
    pub engaged: bool,
}

impl GoToPoint {
    pub fn new(target: Vec2, face_right: bool, auto_enable_input: bool, keep_inertia: bool) -> Self {
        Self {
            target,
            face_right,
            auto_enable_input,
            keep_inertia,
            cancelled: false,
            engaged: false,
        }
    }

    pub fn cancel(&mut self) {
        self.cancelled = true;
    }
}

/// Actions the player schedules for itself on the fixed clock.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PlayerAction {
    Knockback(Vec2),
    ResetSpeed,
}

/// Entities the player is currently overlapping that can hurt it.
#[derive(Component, Debug, Clone, Default, PartialEq)]
pub struct PlayerContacts(pub Vec<Entity>);

impl PlayerContacts {
    pub fn add(&mut self, entity: Entity) {
        if !self.0.contains(&entity) {
            self.0.push(entity);
        }
    }

    pub fn remove(&mut self, entity: Entity) {
        self.0.retain(|e| *e != entity);
    }
}

/// Alternate idle animations played after standing still for a while.
#[derive(Component, Debug, Clone, PartialEq)]
pub struct IdleAnimations {
    pub names: Vec<&'static str>,
    pub timer: f32,
    pub wait: f32,
}

impl IdleAnimations {
    pub fn new(names: Vec<&'static str>, tuning: &PlayerTuning, rng: &mut impl Rng) -> Self {
        Self {
            names,
            timer: 0.0,
            wait: roll_idle_wait(tuning, rng),
        }
    }
}

pub fn roll_idle_wait(tuning: &PlayerTuning, rng: &mut impl Rng) -> f32 {
    if tuning.max_alt_idle_time > tuning.min_alt_idle_time {
        rng.gen_range(tuning.min_alt_idle_time..tuning.max_alt_idle_time)
    } else {
        tuning.min_alt_idle_time
    }
}

/// Animation parameters mirrored for the presentation layer.
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlayerAnimationState {
    pub walking: bool,
    pub running: bool,
    pub grounded: bool,
    pub falling: bool,
}

// ── Resources ──────────────────────────────────────────────────────────────────

/// Logical input for one frame, independent of the device that produced it.
///
/// Tests populate this resource directly.
#[derive(Resource, Debug, Clone, Copy, Default, PartialEq)]
pub struct PlayerIntent {
    pub left: bool,
    pub right: bool,
    pub run: bool,
    pub jump: bool,
    pub fire: bool,
    /// Aim direction while firing; its x sign sets facing.
    pub aim: Vec2,
}

/// Kills needed at `combo` to reach the next level:
/// `combo_start_kills − 1 + (1 + 2 + … + combo)`.
pub fn combo_threshold(combo_start_kills: u32, combo: u32) -> u32 {
    combo_start_kills.saturating_sub(1) + combo * (combo + 1) / 2
}

/// Score, combo multiplier and currency.
///
/// The combo only grows through kills and only shrinks through timed decay,
/// apart from the reset on death.
#[derive(Resource, Debug, Clone, PartialEq)]
pub struct PlayerScore {
    pub score: u32,
    pub combo: u32,
    /// Highest level reached in the current climb; longer gaps below it decay faster.
    pub max_combo: u32,
    pub kill_chain: u32,
    pub combo_timer: f32,
    pub microchips: u32,
}

impl Default for PlayerScore {
    fn default() -> Self {
        Self {
            score: 0,
            combo: 1,
            max_combo: 1,
            kill_chain: 0,
            combo_timer: 0.0,
            microchips: 0,
        }
    }
}

impl PlayerScore {
    /// Award `points × combo`, clamped to `[0, max_score]`.  Returns the
    /// change actually applied.
    pub fn add_points(&mut self, points: i64, max_score: u32) -> i64 {
        let before = i64::from(self.score);
        let after = (before + points * i64::from(self.combo)).clamp(0, i64::from(max_score));
        self.score = after as u32;
        after - before
    }

    /// Count a kill toward the combo and award its points.
    pub fn register_kill(
        &mut self,
        victim_health: f32,
        victim_damage: f32,
        player_max_health: f32,
        tuning: &PlayerTuning,
    ) -> i64 {
        self.kill_chain += 1;
        self.combo_timer = 0.0;
        if self.kill_chain >= combo_threshold(tuning.combo_start_kills, self.combo) {
            self.combo += 1;
            self.max_combo = self.combo;
        }
        let base = victim_health * victim_damage + victim_health / player_max_health * 100.0;
        self.add_points(base.round_ties_even() as i64, tuning.max_score)
    }

    /// Seconds the current level holds before decaying.
    pub fn decay_interval(&self, decrease_time: f32) -> f32 {
        let below_peak = self.max_combo.saturating_sub(self.combo) as f32;
        (decrease_time - COMBO_DECAY_STEP * below_peak).clamp(decrease_time * 0.25, decrease_time)
    }

    /// Advance the decay timer; returns `true` when the combo dropped a level.
    pub fn tick_decay(&mut self, dt: f32, tuning: &PlayerTuning) -> bool {
        if self.combo <= 1 {
            return false;
        }
        self.combo_timer += dt;
        if self.combo_timer < self.decay_interval(tuning.combo_decrease_time) {
            return false;
        }
        self.combo -= 1;
        self.kill_chain = if self.combo == 1 {
            0
        } else {
            combo_threshold(tuning.combo_start_kills, self.combo) - self.combo
        };
        self.combo_timer = 0.0;
        true
    }

    pub fn add_microchips(&mut self, amount: i64, max_microchips: u32) {
        self.microchips =
            (i64::from(self.microchips) + amount).clamp(0, i64::from(max_microchips)) as u32;
    }

    pub fn reset_combo(&mut self) {
        self.combo = 1;
        self.max_combo = 1;
        self.kill_chain = 0;
        self.combo_timer = 0.0;
    }
}
