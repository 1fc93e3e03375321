//! Simulation-specific error types.
//!
//! Only configuration can fail: hazards, players and projectiles refuse to be
//! built from tuning that would break their invariants.  Runtime problems
//! (stale entity handles, re-entrant transitions, zero distances) are
//! recovered locally and logged instead of surfacing here.
//!
//! ## Usage
//!
//! ```rust
//! use event_horizon::error::{validate_zone_radii, SimResult};
//!
//! fn build_zones(inner: f32, outer: f32) -> SimResult<()> {
//!     validate_zone_radii(inner, outer)?;
//!     Ok(())
//! }
//! ```

use std::fmt;

/// Top-level error enum for the combat simulation.
#[derive(Debug, Clone, PartialEq)]
pub enum SimError {
    /// A hazard's lethal zone is not strictly inside its outer zone.
    InvalidZoneRadii {
        inner: f32,
        outer: f32,
    },

    /// The first combo threshold would need zero kills, so every kill would
    /// promote the combo.
    InvalidComboThreshold {
        combo_start_kills: u32,
    },

    /// Tuning constant is outside its safe operating range.
    UnsafeConstant {
        /// Name of the constant (for logging).
        name: &'static str,
        /// The value that was rejected.
        value: f32,
        /// Human-readable description of the safe range.
        safe_range: &'static str,
    },

    /// The TOML configuration file could not be parsed.
    ConfigParse {
        path: String,
        message: String,
    },
}

impl fmt::Display for SimError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SimError::InvalidZoneRadii { inner, outer } => write!(
                f,
                "hazard inner radius {} must be positive and smaller than outer radius {}",
                inner, outer
            ),
            SimError::InvalidComboThreshold { combo_start_kills } => write!(
                f,
                "combo_start_kills = {} would make the first combo threshold zero (need ≥ 1)",
                combo_start_kills
            ),
            SimError::UnsafeConstant {
                name,
                value,
                safe_range,
            } => write!(
                f,
                "constant '{}' = {} is outside safe range {}",
                name, value, safe_range
            ),
            SimError::ConfigParse { path, message } => {
                write!(f, "failed to parse {}: {}", path, message)
            }
        }
    }
}

impl std::error::Error for SimError {}

/// Convenience alias: a `Result` using `SimError` as the error type.
pub type SimResult<T> = Result<T, SimError>;

// ── Validation helpers ────────────────────────────────────────────────────────

/// Returns an error unless `0 < inner < outer`.
pub fn validate_zone_radii(inner: f32, outer: f32) -> SimResult<()> {
    if inner > 0.0 && inner < outer && outer.is_finite() {
        Ok(())
    } else {
        Err(SimError::InvalidZoneRadii { inner, outer })
    }
}

/// Returns an error if the first combo threshold would be reached with no kills.
pub fn validate_combo_start_kills(value: u32) -> SimResult<()> {
    if value == 0 {
        Err(SimError::InvalidComboThreshold {
            combo_start_kills: value,
        })
    } else {
        Ok(())
    }
}

/// Returns an error if `value` is not strictly positive and finite.
pub fn validate_positive(name: &'static str, value: f32) -> SimResult<()> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(SimError::UnsafeConstant {
            name,
            value,
            safe_range: "(0.0, ∞)",
        })
    }
}

/// Returns an error if `value` is negative or not finite.
pub fn validate_non_negative(name: &'static str, value: f32) -> SimResult<()> {
    if value >= 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(SimError::UnsafeConstant {
            name,
            value,
            safe_range: "[0.0, ∞)",
        })
    }
}

/// Returns an error if the activation buffer is outside `[0.1, 1.0]`.
///
/// Below 0.1 an enemy would have to sit almost on the centre to trigger the
/// hazard, which in practice means it never activates.
pub fn validate_activation_buffer(value: f32) -> SimResult<()> {
    if (0.1..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(SimError::UnsafeConstant {
            name: "HAZARD_ACTIVATION_BUFFER",
            value,
            safe_range: "[0.1, 1.0]",
        })
    }
}

/// Returns an error if gravity does not point down.
///
/// Jump and knockback speeds take the square root of `-gravity`.
pub fn validate_gravity(value: f32) -> SimResult<()> {
    if value < 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(SimError::UnsafeConstant {
            name: "GRAVITY",
            value,
            safe_range: "(-∞, 0.0)",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zone_radii_require_strict_nesting() {
        assert!(validate_zone_radii(1.0, 5.0).is_ok());
        assert_eq!(
            validate_zone_radii(5.0, 5.0),
            Err(SimError::InvalidZoneRadii {
                inner: 5.0,
                outer: 5.0
            })
        );
        assert!(validate_zone_radii(0.0, 5.0).is_err());
        assert!(validate_zone_radii(6.0, 5.0).is_err());
    }

    #[test]
    fn activation_buffer_range_is_inclusive() {
        assert!(validate_activation_buffer(0.1).is_ok());
        assert!(validate_activation_buffer(1.0).is_ok());
        assert!(validate_activation_buffer(0.05).is_err());
        assert!(validate_activation_buffer(1.2).is_err());
    }

    #[test]
    fn display_names_the_constant() {
        let err = validate_positive("HAZARD_DAMAGE_RATE", 0.0).unwrap_err();
        let text = err.to_string();
        assert!(text.contains("HAZARD_DAMAGE_RATE"));
        assert!(text.contains("(0.0, ∞)"));
    }

    #[test]
    fn zero_start_kills_rejected() {
        assert!(validate_combo_start_kills(0).is_err());
        assert!(validate_combo_start_kills(1).is_ok());
    }
}
