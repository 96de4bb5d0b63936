//! Arrows: straight-line projectiles that die on their first hit
//!
//! Unlike hitboxes there is no hit list. An arrow deactivates the moment it
//! connects, so it can never strike twice.

use serde::{Deserialize, Serialize};

use crate::combat::weapons::CombatantView;
use crate::core::types::{EntityId, Team, Vec2};

/// A landed arrow
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArrowHit {
    pub target: EntityId,
    pub damage: f32,
    pub knockback: Vec2,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Arrow {
    pub owner: EntityId,
    pub team: Team,
    pub position: Vec2,
    /// Unit flight direction
    pub direction: Vec2,
    pub speed: f32,
    pub range: f32,
    pub traveled: f32,
    pub damage: f32,
    pub knockback: f32,
    pub active: bool,
}

impl Arrow {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        owner: EntityId,
        team: Team,
        position: Vec2,
        direction: Vec2,
        speed: f32,
        range: f32,
        damage: f32,
        knockback: f32,
    ) -> Self {
        Self {
            owner,
            team,
            position,
            direction: direction.normalize(),
            speed,
            range,
            traveled: 0.0,
            damage,
            knockback,
            active: true,
        }
    }

    /// Fly one step and test for a hit
    ///
    /// The last step is shortened so the arrow never flies past its range.
    pub fn update(&mut self, dt: f32, combatants: &[CombatantView]) -> Option<ArrowHit> {
        if !self.active {
            return None;
        }

        let step = (self.speed * dt).min(self.range - self.traveled).max(0.0);
        self.position += self.direction * step;
        self.traveled += step;

        let hit = combatants
            .iter()
            .filter(|c| c.is_enemy_of(self.team))
            .find(|c| match c.radius {
                Some(radius) => c.position.distance(&self.position) < radius,
                None => false,
            })
            .map(|c| ArrowHit {
                target: c.id,
                damage: self.damage,
                knockback: self.direction * self.knockback,
            });

        if hit.is_some() || self.traveled >= self.range {
            self.active = false;
        }
        hit
    }
}
