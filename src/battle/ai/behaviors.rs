//! Melee and ranged positioning
//!
//! Each behavior maps (self, target) to a movement and a flag saying whether
//! the unit is in position to attack this tick.

use crate::battle::ai::{AiActor, AiState, Movement};
use crate::battle::constants::RETREAT_FACTOR;
use crate::core::types::Vec2;

/// Result of one behavior step
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Step {
    pub movement: Movement,
    pub state: AiState,
    pub wants_attack: bool,
}

/// Close in, then stand and swing
pub fn melee_step(actor: &AiActor, target: Vec2, attack_range: f32) -> Step {
    let distance = actor.position.distance(&target);
    if distance > attack_range {
        Step {
            movement: Movement::Steer((target - actor.position).normalize()),
            state: AiState::Seek,
            wants_attack: false,
        }
    } else {
        Step {
            movement: Movement::Hold,
            state: AiState::Attack,
            wants_attack: true,
        }
    }
}

/// Hold a standoff band of `[RETREAT_FACTOR * keep, keep]` and fire from inside it
pub fn ranged_step(actor: &AiActor, target: Vec2, keep_distance: f32) -> Step {
    let distance = actor.position.distance(&target);
    let toward = (target - actor.position).normalize();

    if distance > keep_distance {
        Step {
            movement: Movement::Steer(toward),
            state: AiState::Seek,
            wants_attack: false,
        }
    } else if distance < keep_distance * RETREAT_FACTOR {
        Step {
            movement: Movement::Steer(-toward),
            state: AiState::Retreat,
            wants_attack: false,
        }
    } else {
        Step {
            movement: Movement::Hold,
            state: AiState::Attack,
            wants_attack: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{EntityId, Facing, Team};

    fn at(x: f32) -> AiActor {
        AiActor {
            id: EntityId::new(),
            team: Team::Enemy,
            position: Vec2::new(x, 0.0),
            facing: Facing::Left,
            velocity: Vec2::ZERO,
        }
    }

    #[test]
    fn test_melee_seeks_then_attacks() {
        let far = melee_step(&at(10.0), Vec2::ZERO, 2.0);
        assert_eq!(far.state, AiState::Seek);
        assert_eq!(far.movement, Movement::Steer(Vec2::new(-1.0, 0.0)));
        assert!(!far.wants_attack);

        let near = melee_step(&at(1.0), Vec2::ZERO, 2.0);
        assert_eq!(near.state, AiState::Attack);
        assert_eq!(near.movement, Movement::Hold);
        assert!(near.wants_attack);
    }

    #[test]
    fn test_melee_attacks_at_exact_range() {
        assert!(melee_step(&at(2.0), Vec2::ZERO, 2.0).wants_attack);
    }

    #[test]
    fn test_ranged_band() {
        let keep = 16.0;
        let seek = ranged_step(&at(20.0), Vec2::ZERO, keep);
        assert_eq!(seek.state, AiState::Seek);

        let retreat = ranged_step(&at(5.0), Vec2::ZERO, keep);
        assert_eq!(retreat.state, AiState::Retreat);
        assert_eq!(retreat.movement, Movement::Steer(Vec2::new(1.0, 0.0)));
        assert!(!retreat.wants_attack);

        let hold = ranged_step(&at(14.0), Vec2::ZERO, keep);
        assert_eq!(hold.state, AiState::Attack);
        assert!(hold.wants_attack);
    }
}
