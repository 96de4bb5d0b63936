//! Health and the death fade shared by every combatant

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::combat::constants::{DEATH_BASE_SPIN, DEATH_DURATION};
use crate::core::types::Vec2;

/// What a damage call actually did
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DamageOutcome {
    pub applied: bool,
    pub killed: bool,
}

impl DamageOutcome {
    pub const IGNORED: DamageOutcome = DamageOutcome {
        applied: false,
        killed: false,
    };
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vitality {
    pub health: f32,
    pub max_health: f32,
    /// False from the moment of death. Never flips back.
    pub alive: bool,
    pub dying: bool,
    /// False once the death fade has finished; the roster drops the unit
    pub active: bool,
    pub death_timer: f32,
    pub death_duration: f32,
    pub opacity: f32,
    pub death_rotation: f32,
    pub death_spin: f32,
}

impl Vitality {
    pub fn new(max_health: f32) -> Self {
        Self {
            health: max_health,
            max_health,
            alive: true,
            dying: false,
            active: true,
            death_timer: 0.0,
            death_duration: DEATH_DURATION,
            opacity: 1.0,
            death_rotation: 0.0,
            death_spin: 0.0,
        }
    }

    pub fn is_targetable(&self) -> bool {
        self.active && self.alive
    }

    pub fn health_ratio(&self) -> f32 {
        if self.max_health <= 0.0 {
            return 0.0;
        }
        self.health / self.max_health
    }

    /// Subtract health. Returns true when this call emptied it.
    pub fn absorb(&mut self, amount: f32) -> bool {
        if self.dying || !self.alive {
            return false;
        }
        self.health = (self.health - amount).clamp(0.0, self.max_health);
        self.health <= 0.0
    }

    /// Enter the death fade; spin direction follows the killing blow
    pub fn begin_death<R: Rng + ?Sized>(&mut self, knockback: Option<Vec2>, rng: &mut R) {
        self.alive = false;
        self.dying = true;
        self.death_timer = 0.0;
        self.death_spin = match knockback {
            Some(kb) if !kb.is_zero() => {
                let sign = if kb.y > 0.0 { 1.0 } else { -1.0 };
                (kb.length() + DEATH_BASE_SPIN) * sign
            }
            _ => {
                let sign = if rng.gen_bool(0.5) { 1.0 } else { -1.0 };
                DEATH_BASE_SPIN * sign
            }
        };
    }

    /// Advance the fade. Returns true on the tick the unit goes inactive.
    pub fn advance_death(&mut self, dt: f32) -> bool {
        if !self.dying || !self.active {
            return false;
        }
        self.death_timer += dt;
        self.opacity = (1.0 - self.death_timer / self.death_duration).max(0.0);
        self.death_rotation += self.death_spin * dt;

        if self.death_timer >= self.death_duration {
            self.active = false;
            return true;
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_health_clamped_at_zero() {
        let mut v = Vitality::new(50.0);
        assert!(v.absorb(80.0));
        assert_eq!(v.health, 0.0);
    }

    #[test]
    fn test_negative_damage_cannot_overheal() {
        let mut v = Vitality::new(50.0);
        v.absorb(-20.0);
        assert_eq!(v.health, 50.0);
    }

    #[test]
    fn test_dying_ignores_damage() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let mut v = Vitality::new(10.0);
        v.absorb(10.0);
        v.begin_death(None, &mut rng);
        assert!(!v.absorb(5.0));
        assert!(!v.alive);
        assert!(v.dying);
    }

    #[test]
    fn test_spin_follows_knockback() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let mut v = Vitality::new(10.0);
        v.begin_death(Some(Vec2::new(0.0, 2.0)), &mut rng);
        assert!((v.death_spin - 4.5).abs() < 1e-5);

        let mut up = Vitality::new(10.0);
        up.begin_death(Some(Vec2::new(3.0, -4.0)), &mut rng);
        assert!((up.death_spin + 7.5).abs() < 1e-5);
    }

    #[test]
    fn test_fade_completes_after_duration() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let mut v = Vitality::new(10.0);
        v.begin_death(None, &mut rng);

        let mut finished_at = None;
        for step in 1..=10 {
            if v.advance_death(0.25) {
                finished_at = Some(step);
                break;
            }
            assert!(v.opacity > 0.0);
        }
        assert_eq!(finished_at, Some(6));
        assert!(!v.active);
        assert_eq!(v.opacity, 0.0);
    }
}
