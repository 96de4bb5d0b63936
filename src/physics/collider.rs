use serde::{Deserialize, Serialize};

use crate::core::types::Vec2;

/// Circle collider. The radius is fixed at construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Collider {
    radius: f32,
    pub mass: f32,
    pub enabled: bool,
}

impl Collider {
    pub fn new(radius: f32, mass: f32) -> Self {
        Self {
            radius,
            mass,
            enabled: true,
        }
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    /// Circles overlap when their centers are closer than the summed radii
    pub fn overlaps(&self, position: Vec2, other: &Collider, other_position: Vec2) -> bool {
        if !self.enabled || !other.enabled {
            return false;
        }
        position.distance(&other_position) < self.radius + other.radius
    }

    /// Point containment, used by projectiles
    pub fn contains_point(&self, position: Vec2, point: Vec2) -> bool {
        self.enabled && position.distance(&point) < self.radius
    }
}
