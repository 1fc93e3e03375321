//! Centralised combat, movement and hazard constants.
//!
//! All tuneable values live here so they can be found, reasoned-about, and
//! modified in one place without source-diving across multiple modules.
//! [`crate::config::SimConfig`] mirrors the per-instance values and uses these
//! as its defaults; the blend factors further down are fixed behaviour and are
//! not exposed to the TOML file.

// ── Player: Health ────────────────────────────────────────────────────────────

/// Starting and maximum player health.
pub const PLAYER_MAX_HEALTH: f32 = 100.0;

/// Seconds after a hit during which further damage is ignored.
pub const INVINCIBILITY_PERIOD: f32 = 2.0;

/// Delay between a hit landing and the knockback velocity being applied.
///
/// The short gap lets the hit animation read before the player is thrown.
pub const KNOCKBACK_DELAY: f32 = 0.1;

// ── Player: Flash ─────────────────────────────────────────────────────────────

/// Initial visibility toggle period while invincible (seconds).
pub const FLASH_TIME: f32 = 0.25;

/// Period the toggle eases toward while the window lasts.
pub const FLASH_FAST_PERIOD: f32 = 0.05;

/// Per-tick easing factor from the current period toward [`FLASH_FAST_PERIOD`].
pub const FLASH_EASING: f32 = 0.025;

// ── Player: Movement ──────────────────────────────────────────────────────────

/// Vertical acceleration (world units / s²).  Negative is down.
pub const GRAVITY: f32 = -35.0;

/// Horizontal target speed while walking.
pub const WALK_SPEED: f32 = 10.0;

/// Horizontal target speed while the run intent is held.
pub const RUN_SPEED: f32 = 17.5;

/// Horizontal target speed while continuously running (auto-run sections).
pub const CONTINUOUS_RUN_SPEED: f32 = 10.0;

/// Horizontal easing rate on the ground (multiplied by dt).
pub const GROUND_DAMPING: f32 = 10.0;

/// Horizontal easing rate in the air (multiplied by dt).
pub const IN_AIR_DAMPING: f32 = 5.0;

/// Apex height of a jump (world units).
pub const JUMP_HEIGHT: f32 = 5.0;

/// Lower bound of the random idle time before an alternate idle animation.
pub const MIN_ALT_IDLE_TIME: f32 = 5.0;

/// Upper bound of the random idle time before an alternate idle animation.
pub const MAX_ALT_IDLE_TIME: f32 = 10.0;

// ── Player: Score ─────────────────────────────────────────────────────────────

/// Kills needed to reach combo 2.  Later levels add `combo` more kills each.
pub const COMBO_START_KILLS: u32 = 3;

/// Longest interval (seconds) before the combo decays by one level.
pub const COMBO_DECREASE_TIME: f32 = 1.0;

/// Seconds taken off the decay interval per level below the current peak combo.
pub const COMBO_DECAY_STEP: f32 = 0.25;

/// Score ceiling.
pub const MAX_SCORE: u32 = 999_999_999;

/// Microchip (currency) ceiling.
pub const MAX_MICROCHIPS: u32 = 99_999;

// ── Hazard ────────────────────────────────────────────────────────────────────

/// Radius of the lethal inner zone.
pub const HAZARD_INNER_RADIUS: f32 = 1.0;

/// Radius of the attraction/damage outer zone.
pub const HAZARD_OUTER_RADIUS: f32 = 5.0;

/// Force magnitude at the outer zone boundary.
pub const HAZARD_OUTER_FORCE: f32 = 20.0;

/// Force magnitude used inside the inner zone.
pub const HAZARD_INNER_FORCE: f32 = 40.0;

/// Tangential share of the outer force (spiral tightness).
pub const HAZARD_OUTER_ROTATION: f32 = 0.5;

/// Tangential share of the inner force.
pub const HAZARD_INNER_ROTATION: f32 = 1.0;

/// Fraction of the outer radius an enemy must be within to activate an idle hazard.
///
/// Valid range: [0.1, 1.0].
pub const HAZARD_ACTIVATION_BUFFER: f32 = 0.8;

/// Damage dealt per damage tick.
pub const HAZARD_DAMAGE: f32 = 5.0;

/// Damage ticks per second.
pub const HAZARD_DAMAGE_RATE: f32 = 5.0;

/// Seconds a hazard lives: before activation (failsafe) or after spawning.
pub const HAZARD_LIFETIME: f32 = 6.0;

/// Initial travel speed of a fired hazard.
pub const HAZARD_SHOT_SPEED: f32 = 15.0;

/// Shot speed at or below which an activated hazard spawns its field.
pub const HAZARD_SPAWN_SPEED: f32 = 2.0;

/// Per-tick easing factor of the shot speed toward zero once activated.
pub const HAZARD_SPEED_SMOOTHING: f32 = 0.1;

/// Delay between dissipation and the hazard + particle anchor being removed.
pub const HAZARD_CLEANUP_DELAY: f32 = 1.0;

/// Lifetime of particles emitted by the hazard's anchor.
pub const HAZARD_GENERATED_PARTICLE_LIFETIME: f32 = 0.5;

/// Remaining lifetime given to particles caught in the outer zone.
pub const HAZARD_AFFECTED_PARTICLE_LIFETIME: f32 = 1.0;

/// Particles emitted per second by the hazard's anchor.
pub const HAZARD_EMISSION_RATE: f32 = 40.0;

// ── Hazard: Blend factors ─────────────────────────────────────────────────────

/// Distance exponent of the force applied to particles in the outer zone.
pub const PARTICLE_FORCE_EXPONENT: f32 = 1.5;

pub const PARTICLE_BLEND: f32 = 0.1;
pub const ENEMY_BLEND: f32 = 0.5;
pub const PROJECTILE_DIRECTION_BLEND: f32 = 0.05;
pub const PICKUP_BLEND: f32 = 0.5;
pub const PLAYER_BLEND: f32 = 0.15;

/// Portion of an enemy broken off per hazard damage tick.
pub const ENEMY_PARTIAL_EXPLOSION: f32 = 0.05;

/// Portion of the player broken off per damage tick, shared across segments.
pub const PLAYER_PARTIAL_EXPLOSION: f32 = 0.1;

// ── Force Field ───────────────────────────────────────────────────────────────

/// Lower clamp of `distance / zone_radius` so the falloff stays bounded at the centre.
pub const MIN_NORMALIZED_DISTANCE: f32 = 0.05;

/// Distance exponent used when the caller has no reason to pick another.
pub const DEFAULT_DISTANCE_EXPONENT: f32 = 1.0;

// ── Projectile ────────────────────────────────────────────────────────────────

pub const PROJECTILE_DAMAGE: f32 = 5.0;
pub const PROJECTILE_KNOCKBACK: [f32; 2] = [2.0, 2.0];
pub const PROJECTILE_SHOT_SPEED: f32 = 15.0;

/// Failsafe lifetime of auto-destroying projectiles (seconds).
pub const PROJECTILE_LIFETIME: f32 = 3.0;

pub const PROJECTILE_SHAKE_DURATION: f32 = 0.5;
pub const PROJECTILE_SHAKE_INTENSITY: [f32; 2] = [0.0, 0.5];

// ── Pickup ────────────────────────────────────────────────────────────────────

/// Lower bound of a pickup's random auto-destroy lifetime.
pub const PICKUP_MIN_LIFETIME: f32 = 10.0;

/// Upper bound of a pickup's random auto-destroy lifetime.
pub const PICKUP_MAX_LIFETIME: f32 = 15.0;

/// Particle speed used by emitters and explosion stand-ins.
pub const PARTICLE_SPEED: f32 = 3.0;
