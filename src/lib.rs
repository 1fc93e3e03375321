//! Event Horizon gameplay core.
//!
//! Combat and movement for a 2D action game built on Bevy and Rapier: the
//! player's health, invincibility, combo scoring and knockback, projectiles,
//! and the black hole hazard with its spiral force field.  Add
//! [`simulation::SimulationPlugin`] to an app to run everything on the fixed
//! tick.

pub mod config;
pub mod constants;
pub mod cutscene;
pub mod enemy;
pub mod error;
pub mod force_field;
pub mod hazard;
pub mod particles;
pub mod pickup;
pub mod player;
pub mod projectile;
pub mod registry;
pub mod schedule;
pub mod signals;
pub mod simulation;
