//! Melee swing: raise, slash, recover
//!
//! The only damage the sword ever deals is the hitbox it drops when the
//! raise finishes. The combat resolver decides who that hitbox touches.

use serde::{Deserialize, Serialize};

use crate::combat::constants::{
    SWORD_KNOCKBACK_LIFT, SWORD_RAISE_TIME, SWORD_RECOVERY_TIME, SWORD_SLASH_TIME,
};
use crate::combat::hitbox::Hitbox;
use crate::combat::weapons::{WeaponCore, WeaponEvent, WeaponOwner};
use crate::core::config::SwordConfig;
use crate::core::types::Vec2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SwingPhase {
    #[default]
    Idle,
    Raise,
    Slash,
    Recovery,
}

impl SwingPhase {
    pub fn duration(self) -> f32 {
        match self {
            SwingPhase::Idle => 0.0,
            SwingPhase::Raise => SWORD_RAISE_TIME,
            SwingPhase::Slash => SWORD_SLASH_TIME,
            SwingPhase::Recovery => SWORD_RECOVERY_TIME,
        }
    }

    /// Phase that follows once `elapsed` covers this phase's duration
    pub fn next(self, elapsed: f32) -> Option<SwingPhase> {
        let next = match self {
            SwingPhase::Idle => return None,
            SwingPhase::Raise => SwingPhase::Slash,
            SwingPhase::Slash => SwingPhase::Recovery,
            SwingPhase::Recovery => SwingPhase::Idle,
        };
        (elapsed >= self.duration()).then_some(next)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sword {
    pub core: WeaponCore,
    pub attack_range: f32,
    pub max_targets: usize,
    pub knockback: f32,
    pub phase: SwingPhase,
    pub phase_timer: f32,
}

impl Sword {
    pub fn from_config(config: &SwordConfig) -> Self {
        Self {
            core: WeaponCore::new(config.damage, config.cooldown),
            attack_range: config.attack_range,
            max_targets: config.max_targets,
            knockback: config.knockback,
            phase: SwingPhase::Idle,
            phase_timer: 0.0,
        }
    }

    pub fn in_range(&self, origin: Vec2, target: Vec2) -> bool {
        origin.distance(&target) <= self.attack_range
    }

    pub fn attack(&mut self) -> bool {
        if !self.core.can_attack() {
            return false;
        }
        self.core.attacking = true;
        self.phase = SwingPhase::Raise;
        self.phase_timer = 0.0;
        true
    }

    pub fn update(&mut self, owner: &WeaponOwner, dt: f32, events: &mut Vec<WeaponEvent>) {
        self.core.tick_cooldown(dt);
        if self.phase == SwingPhase::Idle {
            return;
        }

        self.phase_timer += dt;
        let Some(next) = self.phase.next(self.phase_timer) else {
            return;
        };
        self.phase_timer -= self.phase.duration();
        self.phase = next;

        match next {
            SwingPhase::Slash => events.push(WeaponEvent::SpawnHitbox(self.slash_hitbox(owner))),
            SwingPhase::Idle => {
                self.phase_timer = 0.0;
                self.core.finish_attack();
            }
            _ => {}
        }
    }

    /// Circle centered half a reach ahead of the owner
    fn slash_hitbox(&self, owner: &WeaponOwner) -> Hitbox {
        let facing = owner.facing.sign();
        let center = owner.position + Vec2::new(facing * self.attack_range / 2.0, 0.0);
        let knockback = Vec2::new(facing, SWORD_KNOCKBACK_LIFT).normalize() * self.knockback;
        Hitbox::new(
            owner.id,
            owner.team,
            center,
            self.attack_range,
            self.core.damage,
            knockback,
            self.max_targets,
            SWORD_SLASH_TIME,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{EntityId, Facing, Team};

    fn owner(facing: Facing) -> WeaponOwner {
        WeaponOwner {
            id: EntityId::new(),
            team: Team::Player,
            position: Vec2::new(10.0, 10.0),
            facing,
            speed_ratio: 0.0,
            mounted: false,
        }
    }

    fn run(sword: &mut Sword, owner: &WeaponOwner, steps: usize, dt: f32) -> Vec<WeaponEvent> {
        let mut events = Vec::new();
        for _ in 0..steps {
            sword.update(owner, dt, &mut events);
        }
        events
    }

    #[test]
    fn test_phase_table() {
        assert_eq!(SwingPhase::Raise.next(0.1), None);
        assert_eq!(SwingPhase::Raise.next(0.2), Some(SwingPhase::Slash));
        assert_eq!(SwingPhase::Slash.next(0.1), Some(SwingPhase::Recovery));
        assert_eq!(SwingPhase::Recovery.next(0.2), Some(SwingPhase::Idle));
        assert_eq!(SwingPhase::Idle.next(10.0), None);
    }

    #[test]
    fn test_single_hitbox_per_swing() {
        let mut sword = Sword::from_config(&SwordConfig::default());
        let owner = owner(Facing::Right);
        assert!(sword.attack());
        let events = run(&mut sword, &owner, 40, 0.05);
        let hitboxes = events
            .iter()
            .filter(|e| matches!(e, WeaponEvent::SpawnHitbox(_)))
            .count();
        assert_eq!(hitboxes, 1);
    }

    #[test]
    fn test_hitbox_emitted_when_raise_ends() {
        let mut sword = Sword::from_config(&SwordConfig::default());
        let owner = owner(Facing::Right);
        sword.attack();

        let dt = 0.05;
        let mut elapsed = 0.0;
        let mut emitted_at = None;
        for _ in 0..20 {
            elapsed += dt;
            if !run(&mut sword, &owner, 1, dt).is_empty() {
                emitted_at = Some(elapsed);
                break;
            }
        }
        let emitted_at = emitted_at.expect("swing should emit a hitbox");
        assert!(emitted_at >= SWORD_RAISE_TIME - 1e-4);
        assert!(emitted_at <= SWORD_RAISE_TIME + dt + 1e-4);
        assert_eq!(sword.phase, SwingPhase::Slash);
    }

    #[test]
    fn test_hitbox_geometry_follows_facing() {
        let mut sword = Sword::from_config(&SwordConfig::default());
        let owner = owner(Facing::Left);
        sword.attack();
        let events = run(&mut sword, &owner, 10, 0.05);
        let Some(WeaponEvent::SpawnHitbox(hitbox)) = events.first() else {
            panic!("expected a hitbox");
        };
        assert!((hitbox.position.x - 8.75).abs() < 1e-5);
        assert_eq!(hitbox.radius, 2.5);
        assert!(hitbox.knockback.x < 0.0);
        assert!(hitbox.knockback.y < 0.0);
        assert!((hitbox.knockback.length() - 2.0).abs() < 1e-5);
        assert!((hitbox.duration - SWORD_SLASH_TIME).abs() < 1e-6);
    }

    #[test]
    fn test_cooldown_starts_after_recovery() {
        let mut sword = Sword::from_config(&SwordConfig::default());
        let owner = owner(Facing::Right);
        sword.attack();

        let dt = 0.05;
        let mut elapsed = 0.0;
        while sword.core.attacking && elapsed < 2.0 {
            run(&mut sword, &owner, 1, dt);
            elapsed += dt;
        }
        let swing = SWORD_RAISE_TIME + SWORD_SLASH_TIME + SWORD_RECOVERY_TIME;
        assert!(elapsed >= swing - 1e-4, "swing ended early at {elapsed}");
        assert!(elapsed <= swing + 3.0 * dt, "swing ended late at {elapsed}");
        assert_eq!(sword.phase, SwingPhase::Idle);
        assert!(!sword.core.can_attack(), "cooldown should block");

        run(&mut sword, &owner, 21, dt);
        assert!(sword.core.can_attack());
    }

    #[test]
    fn test_attack_refused_mid_swing() {
        let mut sword = Sword::from_config(&SwordConfig::default());
        assert!(sword.attack());
        assert!(!sword.attack());
    }
}
