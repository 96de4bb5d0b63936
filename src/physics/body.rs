//! Per-unit motion integration
//!
//! Acceleration is an accumulator: movement intent feeds it, `update`
//! consumes it. Impulses skip the accumulator and hit velocity directly.

use serde::{Deserialize, Serialize};

use crate::core::types::Vec2;
use crate::physics::{RATIO_SNAP_EPSILON, VELOCITY_EPSILON};

/// Movement parameters that a mount swaps in and out
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MovementProfile {
    pub max_speed: f32,
    pub acceleration_force: f32,
    pub friction: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhysicsBody {
    pub velocity: Vec2,
    pub acceleration: Vec2,
    pub mass: f32,
    pub max_speed: f32,
    pub acceleration_force: f32,
    /// Per-tick velocity multiplier in (0, 1]. 1.0 disables damping.
    pub friction: f32,
}

impl Default for PhysicsBody {
    fn default() -> Self {
        Self {
            velocity: Vec2::ZERO,
            acceleration: Vec2::ZERO,
            mass: 1.0,
            max_speed: 5.0,
            acceleration_force: 10.0,
            friction: 0.9,
        }
    }
}

impl PhysicsBody {
    pub fn new(mass: f32, max_speed: f32, acceleration_force: f32, friction: f32) -> Self {
        Self {
            mass,
            max_speed,
            acceleration_force,
            friction,
            ..Self::default()
        }
    }

    /// Push acceleration along a movement direction
    pub fn apply_acceleration(&mut self, direction: Vec2) {
        if direction.is_zero() {
            return;
        }
        self.acceleration += direction * self.acceleration_force;
    }

    /// Accumulate a force, scaled by inverse mass
    pub fn apply_force(&mut self, force: Vec2) {
        if self.mass > 0.0 {
            self.acceleration += force / self.mass;
        }
    }

    /// Instant velocity change (knockback, collision response)
    pub fn apply_impulse(&mut self, impulse: Vec2) {
        self.velocity += impulse;
    }

    /// Integrate one step and return the resulting velocity
    ///
    /// Acceleration is always cleared, so movement intent must be re-applied
    /// every tick.
    pub fn update(&mut self, dt: f32) -> Vec2 {
        self.velocity += self.acceleration * dt;
        self.velocity *= self.friction;
        self.velocity = self.velocity.limit(self.max_speed);
        self.acceleration = Vec2::ZERO;

        if self.velocity.length() < VELOCITY_EPSILON {
            self.velocity = Vec2::ZERO;
        }

        self.velocity
    }

    pub fn stop(&mut self) {
        self.velocity = Vec2::ZERO;
        self.acceleration = Vec2::ZERO;
    }

    pub fn speed(&self) -> f32 {
        self.velocity.length()
    }

    /// Current speed as a fraction of max speed
    ///
    /// A body sitting on the speed clamp reports exactly 1.0.
    pub fn speed_ratio(&self) -> f32 {
        if self.max_speed <= 0.0 {
            return 0.0;
        }
        let ratio = self.speed() / self.max_speed;
        if (ratio - 1.0).abs() < RATIO_SNAP_EPSILON {
            1.0
        } else {
            ratio
        }
    }

    pub fn movement_profile(&self) -> MovementProfile {
        MovementProfile {
            max_speed: self.max_speed,
            acceleration_force: self.acceleration_force,
            friction: self.friction,
        }
    }

    pub fn set_movement_profile(&mut self, profile: MovementProfile) {
        self.max_speed = profile.max_speed;
        self.acceleration_force = profile.acceleration_force;
        self.friction = profile.friction;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_clears_acceleration() {
        let mut body = PhysicsBody::default();
        body.apply_acceleration(Vec2::new(1.0, 0.0));
        body.update(0.1);
        assert_eq!(body.acceleration, Vec2::ZERO);
        assert!(body.velocity.x > 0.0);
    }

    #[test]
    fn test_update_applies_friction() {
        let mut body = PhysicsBody::default();
        body.velocity = Vec2::new(2.0, 0.0);
        let v = body.update(0.1);
        assert!((v.x - 1.8).abs() < 1e-6);
    }

    #[test]
    fn test_update_clamps_to_max_speed() {
        let mut body = PhysicsBody::default();
        body.apply_impulse(Vec2::new(100.0, 0.0));
        let v = body.update(0.016);
        assert!(v.length() <= body.max_speed + 1e-5);
        assert_eq!(body.speed_ratio(), 1.0);
    }

    #[test]
    fn test_tiny_velocity_snaps_to_zero() {
        let mut body = PhysicsBody::default();
        body.velocity = Vec2::new(0.005, 0.0);
        assert_eq!(body.update(0.016), Vec2::ZERO);
    }

    #[test]
    fn test_force_scaled_by_mass() {
        let mut body = PhysicsBody {
            mass: 4.0,
            ..PhysicsBody::default()
        };
        body.apply_force(Vec2::new(8.0, 0.0));
        assert_eq!(body.acceleration, Vec2::new(2.0, 0.0));
    }

    #[test]
    fn test_zero_direction_adds_nothing() {
        let mut body = PhysicsBody::default();
        body.apply_acceleration(Vec2::ZERO);
        assert_eq!(body.acceleration, Vec2::ZERO);
    }

    #[test]
    fn test_speed_ratio_zero_max_speed() {
        let mut body = PhysicsBody::default();
        body.max_speed = 0.0;
        body.velocity = Vec2::new(1.0, 0.0);
        assert_eq!(body.speed_ratio(), 0.0);
    }

    #[test]
    fn test_movement_profile_roundtrip() {
        let mut body = PhysicsBody::new(1.0, 3.0, 40.0, 0.9);
        let saved = body.movement_profile();
        body.set_movement_profile(MovementProfile {
            max_speed: 10.0,
            acceleration_force: 120.0,
            friction: 0.88,
        });
        assert_eq!(body.max_speed, 10.0);
        body.set_movement_profile(saved);
        assert_eq!(body.movement_profile(), saved);
    }
}
