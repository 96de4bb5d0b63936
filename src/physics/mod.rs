//! Motion integration and circle collisions

pub mod body;
pub mod collider;
pub mod collision;

pub use body::{MovementProfile, PhysicsBody};
pub use collider::Collider;
pub use collision::{Collidable, CollisionResolver, Contact};

/// Speeds below this are snapped to zero after integration
pub const VELOCITY_EPSILON: f32 = 0.01;

/// Center distance below which two circles are treated as coincident
pub const COINCIDENT_EPSILON: f32 = 0.001;

/// Speed ratios this close to 1.0 are reported as exactly 1.0
pub const RATIO_SNAP_EPSILON: f32 = 1e-4;
