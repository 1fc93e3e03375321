//! Spiral attraction force used by radial hazards.
//!
//! The force is the sum of a radial pull toward the centre and a tangential
//! component (the pull direction rotated 90° counter-clockwise) scaled by a
//! rotation factor, so caught entities spiral inward instead of falling
//! straight in.  The pull magnitude grows as the point approaches the centre:
//!
//! ```text
//! normalized = max(distance / zone_radius, MIN_NORMALIZED_DISTANCE)
//! magnitude  = base_strength / normalized^distance_exponent
//! ```
//!
//! At the zone boundary the magnitude equals `base_strength`.  The clamp keeps
//! it bounded near the centre, and a point exactly on the centre gets no force
//! at all since it has no direction to be pulled in.

use crate::constants::{DEFAULT_DISTANCE_EXPONENT, MIN_NORMALIZED_DISTANCE};
use bevy::prelude::*;

/// Compute the attraction velocity at `point` for a field centred on `center`.
pub fn compute_force(
    point: Vec2,
    center: Vec2,
    base_strength: f32,
    zone_radius: f32,
    rotation_factor: f32,
    distance_exponent: f32,
) -> Vec2 {
    let offset = center - point;
    let distance = offset.length();
    if distance <= f32::EPSILON || !distance.is_finite() {
        return Vec2::ZERO;
    }

    let radius = zone_radius.max(f32::EPSILON);
    let normalized = (distance / radius).max(MIN_NORMALIZED_DISTANCE);
    let magnitude = base_strength / normalized.powf(distance_exponent);

    let radial = offset / distance;
    radial * magnitude + radial.perp() * magnitude * rotation_factor
}

/// The scalar parameters of one field evaluation, bundled for reuse.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldParams {
    pub strength: f32,
    pub zone_radius: f32,
    pub rotation: f32,
    pub exponent: f32,
}

impl FieldParams {
    pub fn new(strength: f32, zone_radius: f32, rotation: f32) -> Self {
        Self {
            strength,
            zone_radius,
            rotation,
            exponent: DEFAULT_DISTANCE_EXPONENT,
        }
    }

    pub fn with_exponent(mut self, exponent: f32) -> Self {
        self.exponent = exponent;
        self
    }

    #[inline]
    pub fn force_at(&self, point: Vec2, center: Vec2) -> Vec2 {
        compute_force(
            point,
            center,
            self.strength,
            self.zone_radius,
            self.rotation,
            self.exponent,
        )
    }
}
