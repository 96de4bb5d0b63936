//! Battle system constants - tuning that is not worth a config knob

// Facing
/// Horizontal gap below which a unit keeps its current facing
pub const FACING_THRESHOLD: f32 = 0.1;

// Ranged standoff band: retreat below this fraction of keep_distance
pub const RETREAT_FACTOR: f32 = 0.7;

// Cavalry loiter band around retreat_distance while cooling down
pub const CAVALRY_BAND_NEAR: f32 = 0.7;
pub const CAVALRY_BAND_FAR: f32 = 1.3;

/// Below this speed a finished charge locks heading to facing instead of velocity
pub const HEADING_MIN_SPEED: f32 = 0.1;

// Time
pub const DEFAULT_TICK_SECONDS: f32 = 1.0 / 60.0;
pub const MAX_BATTLE_SECONDS: f32 = 600.0; // 10 minutes
