//! Runtime tuning loaded from `assets/sim.toml`.
//!
//! [`SimConfig`] is a Bevy [`Resource`] split into `[player]`, `[hazard]`,
//! `[projectile]` and `[pickup]` tables.  At startup, [`load_sim_config`]
//! reads `assets/sim.toml` and overwrites the defaults with any values present
//! in the file.  Tuning that breaks an invariant stops the app.  Missing keys fall back to the compile-time defaults in
//! [`crate::constants`], so a minimal TOML can override just the values you
//! care about.
//!
//! The tuning structs are also used directly as per-instance parameters: a
//! fired hazard copies [`HazardTuning`], the player copies [`PlayerTuning`].

use crate::constants::*;
use crate::error::{
    validate_activation_buffer, validate_combo_start_kills, validate_gravity,
    validate_non_negative, validate_positive, validate_zone_radii, SimError, SimResult,
};
use bevy::prelude::*;
use serde::Deserialize;

/// Path of the optional tuning file, relative to the working directory.
pub const CONFIG_PATH: &str = "assets/sim.toml";

/// Runtime-tunable combat and movement configuration.
#[derive(Resource, Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    pub player: PlayerTuning,
    pub hazard: HazardTuning,
    pub projectile: ProjectileTuning,
    pub pickup: PickupTuning,
}

/// Player health, movement and scoring parameters.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct PlayerTuning {
    // ── Health ───────────────────────────────────────────────────────────────
    pub max_health: f32,
    pub invincibility_period: f32,
    pub knockback_delay: f32,
    pub flash_time: f32,

    // ── Movement ─────────────────────────────────────────────────────────────
    pub gravity: f32,
    pub walk_speed: f32,
    pub run_speed: f32,
    pub continuous_run_speed: f32,
    pub ground_damping: f32,
    pub in_air_damping: f32,
    pub jump_height: f32,
    pub min_alt_idle_time: f32,
    pub max_alt_idle_time: f32,

    // ── Score ────────────────────────────────────────────────────────────────
    pub combo_start_kills: u32,
    pub combo_decrease_time: f32,
    pub max_score: u32,
    pub max_microchips: u32,
}

impl Default for PlayerTuning {
    fn default() -> Self {
        Self {
            max_health: PLAYER_MAX_HEALTH,
            invincibility_period: INVINCIBILITY_PERIOD,
            knockback_delay: KNOCKBACK_DELAY,
            flash_time: FLASH_TIME,
            gravity: GRAVITY,
            walk_speed: WALK_SPEED,
            run_speed: RUN_SPEED,
            continuous_run_speed: CONTINUOUS_RUN_SPEED,
            ground_damping: GROUND_DAMPING,
            in_air_damping: IN_AIR_DAMPING,
            jump_height: JUMP_HEIGHT,
            min_alt_idle_time: MIN_ALT_IDLE_TIME,
            max_alt_idle_time: MAX_ALT_IDLE_TIME,
            combo_start_kills: COMBO_START_KILLS,
            combo_decrease_time: COMBO_DECREASE_TIME,
            max_score: MAX_SCORE,
            max_microchips: MAX_MICROCHIPS,
        }
    }
}

impl PlayerTuning {
    pub fn validate(&self) -> SimResult<()> {
        validate_positive("PLAYER_MAX_HEALTH", self.max_health)?;
        validate_non_negative("INVINCIBILITY_PERIOD", self.invincibility_period)?;
        validate_non_negative("KNOCKBACK_DELAY", self.knockback_delay)?;
        validate_positive("FLASH_TIME", self.flash_time)?;
        validate_gravity(self.gravity)?;
        validate_non_negative("JUMP_HEIGHT", self.jump_height)?;
        validate_non_negative("GROUND_DAMPING", self.ground_damping)?;
        validate_non_negative("IN_AIR_DAMPING", self.in_air_damping)?;
        validate_combo_start_kills(self.combo_start_kills)?;
        validate_positive("COMBO_DECREASE_TIME", self.combo_decrease_time)?;
        if self.min_alt_idle_time > self.max_alt_idle_time {
            return Err(SimError::UnsafeConstant {
                name: "MIN_ALT_IDLE_TIME",
                value: self.min_alt_idle_time,
                safe_range: "[0.0, MAX_ALT_IDLE_TIME]",
            });
        }
        Ok(())
    }
}

/// Per-instance parameters of a radial hazard.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct HazardTuning {
    // ── Zones ────────────────────────────────────────────────────────────────
    pub inner_radius: f32,
    pub outer_radius: f32,
    pub activation_buffer: f32,

    // ── Field ────────────────────────────────────────────────────────────────
    pub inner_force: f32,
    pub outer_force: f32,
    pub inner_rotation: f32,
    pub outer_rotation: f32,

    // ── Damage ───────────────────────────────────────────────────────────────
    pub damage: f32,
    pub damage_rate: f32,

    // ── Lifecycle ────────────────────────────────────────────────────────────
    pub lifetime: f32,
    pub shot_speed: f32,
    pub spawn_speed: f32,
    pub speed_smoothing: f32,
    pub cleanup_delay: f32,

    // ── Particles ────────────────────────────────────────────────────────────
    pub emission_rate: f32,
    pub generated_particle_lifetime: f32,
    pub affected_particle_lifetime: f32,
}

impl Default for HazardTuning {
    fn default() -> Self {
        Self {
            inner_radius: HAZARD_INNER_RADIUS,
            outer_radius: HAZARD_OUTER_RADIUS,
            activation_buffer: HAZARD_ACTIVATION_BUFFER,
            inner_force: HAZARD_INNER_FORCE,
            outer_force: HAZARD_OUTER_FORCE,
            inner_rotation: HAZARD_INNER_ROTATION,
            outer_rotation: HAZARD_OUTER_ROTATION,
            damage: HAZARD_DAMAGE,
            damage_rate: HAZARD_DAMAGE_RATE,
            lifetime: HAZARD_LIFETIME,
            shot_speed: HAZARD_SHOT_SPEED,
            spawn_speed: HAZARD_SPAWN_SPEED,
            speed_smoothing: HAZARD_SPEED_SMOOTHING,
            cleanup_delay: HAZARD_CLEANUP_DELAY,
            emission_rate: HAZARD_EMISSION_RATE,
            generated_particle_lifetime: HAZARD_GENERATED_PARTICLE_LIFETIME,
            affected_particle_lifetime: HAZARD_AFFECTED_PARTICLE_LIFETIME,
        }
    }
}

impl HazardTuning {
    pub fn validate(&self) -> SimResult<()> {
        validate_zone_radii(self.inner_radius, self.outer_radius)?;
        validate_activation_buffer(self.activation_buffer)?;
        validate_positive("HAZARD_DAMAGE_RATE", self.damage_rate)?;
        validate_non_negative("HAZARD_DAMAGE", self.damage)?;
        validate_positive("HAZARD_LIFETIME", self.lifetime)?;
        validate_non_negative("HAZARD_CLEANUP_DELAY", self.cleanup_delay)?;
        validate_non_negative("HAZARD_EMISSION_RATE", self.emission_rate)?;
        if !(0.0..=1.0).contains(&self.speed_smoothing) {
            return Err(SimError::UnsafeConstant {
                name: "HAZARD_SPEED_SMOOTHING",
                value: self.speed_smoothing,
                safe_range: "[0.0, 1.0]",
            });
        }
        Ok(())
    }
}

/// Defaults for projectiles fired by the player and by enemies.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ProjectileTuning {
    pub damage: f32,
    pub knockback: [f32; 2],
    pub shot_speed: f32,
    pub lifetime: f32,
    pub shake_duration: f32,
    pub shake_intensity: [f32; 2],
}

impl Default for ProjectileTuning {
    fn default() -> Self {
        Self {
            damage: PROJECTILE_DAMAGE,
            knockback: PROJECTILE_KNOCKBACK,
            shot_speed: PROJECTILE_SHOT_SPEED,
            lifetime: PROJECTILE_LIFETIME,
            shake_duration: PROJECTILE_SHAKE_DURATION,
            shake_intensity: PROJECTILE_SHAKE_INTENSITY,
        }
    }
}

impl ProjectileTuning {
    pub fn validate(&self) -> SimResult<()> {
        validate_non_negative("PROJECTILE_DAMAGE", self.damage)?;
        validate_positive("PROJECTILE_LIFETIME", self.lifetime)?;
        validate_non_negative("PROJECTILE_SHAKE_DURATION", self.shake_duration)
    }
}

/// Pickup auto-destroy window.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct PickupTuning {
    pub min_lifetime: f32,
    pub max_lifetime: f32,
}

impl Default for PickupTuning {
    fn default() -> Self {
        Self {
            min_lifetime: PICKUP_MIN_LIFETIME,
            max_lifetime: PICKUP_MAX_LIFETIME,
        }
    }
}

impl PickupTuning {
    pub fn validate(&self) -> SimResult<()> {
        validate_positive("PICKUP_MIN_LIFETIME", self.min_lifetime)?;
        if self.max_lifetime < self.min_lifetime {
            return Err(SimError::UnsafeConstant {
                name: "PICKUP_MAX_LIFETIME",
                value: self.max_lifetime,
                safe_range: "[PICKUP_MIN_LIFETIME, ∞)",
            });
        }
        Ok(())
    }
}

impl SimConfig {
    /// Parse a TOML document, filling missing keys with defaults, and validate it.
    pub fn from_toml_str(contents: &str) -> SimResult<Self> {
        let config: SimConfig = toml::from_str(contents).map_err(|e| SimError::ConfigParse {
            path: CONFIG_PATH.to_string(),
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> SimResult<()> {
        self.player.validate()?;
        self.hazard.validate()?;
        self.projectile.validate()?;
        self.pickup.validate()
    }
}

/// Turn the contents of the tuning file (if there is one) into the config to run with.
///
/// A missing file or malformed TOML falls back to the compiled defaults.
/// Tuning that parses but breaks an invariant is returned as an error: the
/// simulation must not start with it.
pub fn settle_sim_config(contents: Option<&str>) -> SimResult<SimConfig> {
    let Some(contents) = contents else {
        info!("No {CONFIG_PATH} found; using compiled defaults");
        return Ok(SimConfig::default());
    };
    match SimConfig::from_toml_str(contents) {
        Ok(loaded) => {
            info!("Loaded simulation config from {CONFIG_PATH}");
            Ok(loaded)
        }
        Err(e @ SimError::ConfigParse { .. }) => {
            warn!("{e}; using defaults");
            Ok(SimConfig::default())
        }
        Err(e) => Err(e),
    }
}

/// Startup system: load `assets/sim.toml` into the `SimConfig` resource.
///
/// Invalid tuning is fatal: the error is logged and the app is asked to exit.
pub fn load_sim_config(mut config: ResMut<SimConfig>, mut exit: MessageWriter<AppExit>) {
    let contents = std::fs::read_to_string(CONFIG_PATH).ok();
    match settle_sim_config(contents.as_deref()) {
        Ok(loaded) => *config = loaded,
        Err(e) => {
            error!("Refusing to start: {e}");
            exit.write(AppExit::error());
        }
    }
}
