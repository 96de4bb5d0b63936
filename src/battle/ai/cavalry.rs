//! Cavalry charge cycle: approach, ride through, loiter, repeat
//!
//! The plan never touches the lance. It steers the horse to full speed and
//! waits for the lance's end-of-charge event to move on.

use serde::{Deserialize, Serialize};

use crate::battle::ai::{AiActor, AiState, Movement};
use crate::battle::constants::{CAVALRY_BAND_FAR, CAVALRY_BAND_NEAR, HEADING_MIN_SPEED};
use crate::core::config::AiProfile;
use crate::core::types::Vec2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CavalryPhase {
    #[default]
    Approach,
    Continue,
    Cooldown,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CavalryPlan {
    pub phase: CavalryPhase,
    pub charge_timer: f32,
    pub pierce_timer: f32,
    /// Direction locked in when a charge ends
    pub heading: Vec2,
    pub charge_cooldown: f32,
    pub retreat_distance: f32,
    pub pierce_duration: f32,
}

impl CavalryPlan {
    pub fn from_profile(profile: &AiProfile) -> Self {
        Self {
            phase: CavalryPhase::Approach,
            charge_timer: 0.0,
            pierce_timer: 0.0,
            heading: Vec2::ZERO,
            charge_cooldown: profile.charge_cooldown,
            retreat_distance: profile.retreat_distance,
            pierce_duration: profile.pierce_duration,
        }
    }

    pub fn reset(&mut self) {
        self.phase = CavalryPhase::Approach;
        self.charge_timer = 0.0;
        self.pierce_timer = 0.0;
    }

    /// Advance one tick toward `target`
    pub fn step(&mut self, actor: &AiActor, target: Vec2, charge_ended: bool, dt: f32) -> (Movement, AiState) {
        let toward = (target - actor.position).normalize();

        match self.phase {
            CavalryPhase::Approach => {
                if charge_ended {
                    self.phase = CavalryPhase::Continue;
                    self.pierce_timer = self.pierce_duration;
                    self.heading = locked_heading(actor);
                    return (Movement::Steer(self.heading), AiState::ChargeContinue);
                }
                (Movement::Steer(toward), AiState::ChargeApproach)
            }
            CavalryPhase::Continue => {
                self.pierce_timer -= dt;
                if self.pierce_timer <= 0.0 {
                    self.phase = CavalryPhase::Cooldown;
                    self.charge_timer = self.charge_cooldown;
                    return (Movement::Hold, AiState::ChargeCooldown);
                }
                (Movement::Steer(self.heading), AiState::ChargeContinue)
            }
            CavalryPhase::Cooldown => {
                self.charge_timer -= dt;
                if self.charge_timer <= 0.0 {
                    self.phase = CavalryPhase::Approach;
                    return (Movement::Steer(toward), AiState::ChargeApproach);
                }
                let distance = actor.position.distance(&target);
                let movement = if distance < self.retreat_distance * CAVALRY_BAND_NEAR {
                    Movement::Steer(-toward)
                } else if distance > self.retreat_distance * CAVALRY_BAND_FAR {
                    Movement::Steer(toward)
                } else {
                    Movement::Hold
                };
                (movement, AiState::ChargeCooldown)
            }
        }
    }
}

/// Keep riding the way the horse is already going
fn locked_heading(actor: &AiActor) -> Vec2 {
    if actor.velocity.length() > HEADING_MIN_SPEED {
        actor.velocity.normalize()
    } else {
        Vec2::new(actor.facing.sign(), 0.0)
    }
}
