//! Combat timing and geometry constants
//!
//! Times are seconds, distances meters. Negative y points up the screen.

use std::f32::consts::{FRAC_PI_2, FRAC_PI_4};

// Sword swing timeline
pub const SWORD_RAISE_TIME: f32 = 0.2;
pub const SWORD_SLASH_TIME: f32 = 0.1;
pub const SWORD_RECOVERY_TIME: f32 = 0.2;
/// Vertical component of the swing's knockback direction before normalizing
pub const SWORD_KNOCKBACK_LIFT: f32 = -0.3;

// Bow
pub const BOW_RELEASE_TIME: f32 = 0.15;
/// Arrows appear this far along the aim from the archer's center
pub const ARROW_SPAWN_OFFSET: f32 = 0.5;
/// Resting aim when nothing is in range: 45 degrees up
pub const BOW_IDLE_AIM_RIGHT: f32 = -FRAC_PI_4;
pub const BOW_IDLE_AIM_LEFT: f32 = -3.0 * FRAC_PI_4;

// Lance state thresholds (fractions of max speed)
pub const LANCE_READY_RATIO: f32 = 0.9;
pub const LANCE_CHARGE_RATIO: f32 = 1.0;
pub const LANCE_DROP_RATIO: f32 = 0.85;

// Lance strike sector
pub const LANCE_REACH: f32 = 3.0;
pub const LANCE_HALF_WIDTH: f32 = 1.0;
pub const LANCE_MAX_DISTANCE: f32 = 3.5;

/// Seconds a charge may continue after its first hit
pub const LANCE_HIT_GRACE: f32 = 0.3;
/// Rider velocity multiplier on each impact
pub const LANCE_IMPACT_VELOCITY_SCALE: f32 = 0.2;
pub const LANCE_KNOCKBACK_LIFT: f32 = -0.5;
/// Upright pose used while idle or dismounted
pub const LANCE_RAISED_POSE: f32 = -FRAC_PI_2;
pub const LANCE_LEVELED_POSE: f32 = 0.0;

// Death
pub const DEATH_DURATION: f32 = 1.5;
pub const DEATH_BASE_SPIN: f32 = 2.5;
