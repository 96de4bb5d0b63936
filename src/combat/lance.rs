//! Mounted lance: a charge that arms itself from the rider's speed
//!
//! Nothing ever calls `attack()` on a lance. Riding at full speed levels it,
//! and losing speed (or landing a hit) ends the charge. The end of a charge
//! is latched in `charge_just_ended` for whoever steers the rider.

use serde::{Deserialize, Serialize};

use crate::combat::constants::{
    LANCE_CHARGE_RATIO, LANCE_DROP_RATIO, LANCE_HALF_WIDTH, LANCE_HIT_GRACE,
    LANCE_IMPACT_VELOCITY_SCALE, LANCE_KNOCKBACK_LIFT, LANCE_LEVELED_POSE, LANCE_MAX_DISTANCE,
    LANCE_RAISED_POSE, LANCE_REACH, LANCE_READY_RATIO,
};
use crate::combat::weapons::{WeaponContext, WeaponCore, WeaponEvent, WeaponOwner};
use crate::core::config::LanceConfig;
use crate::core::types::{EntityId, Facing, Vec2};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LanceState {
    #[default]
    Idle,
    Ready,
    Charging,
    Cooldown,
}

impl LanceState {
    /// Speed-driven transitions out of Idle and Ready
    pub fn next_from_speed(self, speed_ratio: f32) -> Option<LanceState> {
        match self {
            LanceState::Idle if speed_ratio >= LANCE_READY_RATIO => Some(LanceState::Ready),
            LanceState::Ready if speed_ratio >= LANCE_CHARGE_RATIO => Some(LanceState::Charging),
            LanceState::Ready if speed_ratio < LANCE_DROP_RATIO => Some(LanceState::Idle),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Lance {
    pub core: WeaponCore,
    pub speed_threshold: f32,
    pub max_targets: usize,
    pub knockback: f32,
    pub state: LanceState,
    pub state_timer: f32,
    /// Time since the first hit of the current charge
    pub since_first_hit: Option<f32>,
    pub hit_targets: Vec<EntityId>,
    /// Cosmetic pose angle
    pub rotation: f32,
    charge_just_ended: bool,
}

impl Lance {
    pub fn from_config(config: &LanceConfig) -> Self {
        Self {
            core: WeaponCore::new(config.damage, config.cooldown),
            speed_threshold: config.speed_threshold,
            max_targets: config.max_targets,
            knockback: config.knockback,
            state: LanceState::Idle,
            state_timer: 0.0,
            since_first_hit: None,
            hit_targets: Vec::new(),
            rotation: LANCE_RAISED_POSE,
            charge_just_ended: false,
        }
    }

    /// Charges are driven by speed only
    pub fn attack(&mut self) -> bool {
        false
    }

    pub fn is_charging(&self) -> bool {
        self.state == LanceState::Charging
    }

    pub fn in_range(&self, owner: &WeaponOwner, target: Vec2) -> bool {
        self.is_charging() && in_charge_sector(owner.position, owner.facing, target)
    }

    /// Read and clear the end-of-charge latch
    pub fn take_charge_ended(&mut self) -> bool {
        std::mem::take(&mut self.charge_just_ended)
    }

    pub fn charge_just_ended(&self) -> bool {
        self.charge_just_ended
    }

    pub fn update(&mut self, ctx: &WeaponContext<'_>, events: &mut Vec<WeaponEvent>) {
        let dt = ctx.dt;
        self.core.tick_cooldown(dt);

        if !ctx.owner.mounted {
            self.state = LanceState::Idle;
            self.state_timer = 0.0;
            self.since_first_hit = None;
            self.core.attacking = false;
            self.rotation = LANCE_RAISED_POSE;
            return;
        }

        let ratio = ctx.owner.speed_ratio;
        match self.state {
            LanceState::Idle | LanceState::Ready => {
                self.state_timer += dt;
                match self.state.next_from_speed(ratio) {
                    Some(LanceState::Charging) => self.begin_charge(events),
                    Some(next) => {
                        self.state = next;
                        self.state_timer = 0.0;
                    }
                    None => {}
                }
            }
            LanceState::Charging => self.update_charge(ctx, ratio, events),
            LanceState::Cooldown => {
                self.state_timer -= dt;
                if self.state_timer <= 0.0 {
                    self.state = LanceState::Idle;
                    self.state_timer = 0.0;
                    self.core.attacking = false;
                }
            }
        }

        self.rotation = self.pose();
    }

    fn begin_charge(&mut self, events: &mut Vec<WeaponEvent>) {
        self.state = LanceState::Charging;
        self.state_timer = 0.0;
        self.since_first_hit = None;
        self.hit_targets.clear();
        self.core.attacking = true;
        events.push(WeaponEvent::ChargeStarted);
    }

    fn update_charge(&mut self, ctx: &WeaponContext<'_>, ratio: f32, events: &mut Vec<WeaponEvent>) {
        let owner = &ctx.owner;
        let knockback =
            Vec2::new(owner.facing.sign(), LANCE_KNOCKBACK_LIFT).normalize() * self.knockback;

        for target in ctx.combatants {
            if self.hit_targets.len() >= self.max_targets {
                break;
            }
            if !target.is_enemy_of(owner.team) || self.hit_targets.contains(&target.id) {
                continue;
            }
            if !in_charge_sector(owner.position, owner.facing, target.position) {
                continue;
            }

            events.push(WeaponEvent::Strike {
                target: target.id,
                damage: self.core.damage,
                knockback,
            });
            events.push(WeaponEvent::OwnerImpact {
                velocity_scale: LANCE_IMPACT_VELOCITY_SCALE,
            });
            self.hit_targets.push(target.id);
            self.since_first_hit.get_or_insert(0.0);
        }

        if self.hit_targets.len() >= self.max_targets || ratio < self.speed_threshold {
            self.end_charge(events);
            return;
        }
        if matches!(self.since_first_hit, Some(t) if t > LANCE_HIT_GRACE) {
            self.end_charge(events);
            return;
        }

        self.state_timer += ctx.dt;
        if let Some(t) = self.since_first_hit.as_mut() {
            *t += ctx.dt;
        }
    }

    fn end_charge(&mut self, events: &mut Vec<WeaponEvent>) {
        events.push(WeaponEvent::ChargeEnded {
            hits: self.hit_targets.len(),
        });
        self.state = LanceState::Cooldown;
        self.state_timer = self.core.cooldown;
        self.core.cooldown_timer = self.core.cooldown;
        self.since_first_hit = None;
        self.charge_just_ended = true;
    }

    fn pose(&self) -> f32 {
        match self.state {
            LanceState::Idle => LANCE_RAISED_POSE,
            LanceState::Ready => (LANCE_RAISED_POSE + LANCE_LEVELED_POSE) / 2.0,
            LanceState::Charging => LANCE_LEVELED_POSE,
            LanceState::Cooldown => {
                let progress = if self.core.cooldown > 0.0 {
                    1.0 - (self.state_timer / self.core.cooldown).clamp(0.0, 1.0)
                } else {
                    1.0
                };
                LANCE_LEVELED_POSE + (LANCE_RAISED_POSE - LANCE_LEVELED_POSE) * progress
            }
        }
    }
}

/// Forward box in front of the rider, trimmed to a max distance
pub fn in_charge_sector(origin: Vec2, facing: Facing, target: Vec2) -> bool {
    let dx = target.x - origin.x;
    let dy = target.y - origin.y;
    dx * facing.sign() >= 0.0
        && dx.abs() <= LANCE_REACH
        && dy.abs() <= LANCE_HALF_WIDTH
        && origin.distance(&target) <= LANCE_MAX_DISTANCE
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combat::weapons::CombatantView;
    use crate::core::types::Team;

    fn owner(speed_ratio: f32) -> WeaponOwner {
        WeaponOwner {
            id: EntityId::new(),
            team: Team::Enemy,
            position: Vec2::new(10.0, 10.0),
            facing: Facing::Right,
            speed_ratio,
            mounted: true,
        }
    }

    fn foe(x: f32, y: f32) -> CombatantView {
        CombatantView {
            id: EntityId::new(),
            team: Team::Player,
            position: Vec2::new(x, y),
            radius: Some(0.8),
            alive: true,
            active: true,
        }
    }

    fn step(lance: &mut Lance, owner: WeaponOwner, foes: &[CombatantView]) -> Vec<WeaponEvent> {
        let mut events = Vec::new();
        let ctx = WeaponContext {
            owner,
            combatants: foes,
            dt: 0.05,
        };
        lance.update(&ctx, &mut events);
        events
    }

    fn lance() -> Lance {
        Lance::from_config(&LanceConfig::default())
    }

    #[test]
    fn test_transition_table() {
        assert_eq!(LanceState::Idle.next_from_speed(0.89), None);
        assert_eq!(LanceState::Idle.next_from_speed(0.9), Some(LanceState::Ready));
        assert_eq!(LanceState::Idle.next_from_speed(1.0), Some(LanceState::Ready));
        assert_eq!(LanceState::Ready.next_from_speed(1.0), Some(LanceState::Charging));
        assert_eq!(LanceState::Ready.next_from_speed(0.95), None);
        assert_eq!(LanceState::Ready.next_from_speed(0.8), Some(LanceState::Idle));
    }

    #[test]
    fn test_charge_requires_ready_first() {
        let mut lance = lance();
        step(&mut lance, owner(1.0), &[]);
        assert_eq!(lance.state, LanceState::Ready, "idle never jumps straight to charging");
        let events = step(&mut lance, owner(1.0), &[]);
        assert_eq!(lance.state, LanceState::Charging);
        assert!(lance.core.attacking);
        assert!(matches!(events.as_slice(), [WeaponEvent::ChargeStarted]));
    }

    #[test]
    fn test_slow_rider_never_charges() {
        let mut lance = lance();
        for _ in 0..200 {
            step(&mut lance, owner(0.97), &[]);
            assert_ne!(lance.state, LanceState::Charging);
        }
    }

    #[test]
    fn test_dismount_forces_idle() {
        let mut lance = lance();
        step(&mut lance, owner(1.0), &[]);
        step(&mut lance, owner(1.0), &[]);
        let mut on_foot = owner(1.0);
        on_foot.mounted = false;
        step(&mut lance, on_foot, &[]);
        assert_eq!(lance.state, LanceState::Idle);
        assert!(!lance.core.attacking);
        assert_eq!(lance.rotation, LANCE_RAISED_POSE);
    }

    #[test]
    fn test_hit_slows_rider_and_strikes_once() {
        let mut lance = lance();
        step(&mut lance, owner(1.0), &[]);
        step(&mut lance, owner(1.0), &[]);

        let target = foe(12.0, 10.5);
        let events = step(&mut lance, owner(1.0), &[target]);
        let strikes = events
            .iter()
            .filter(|e| matches!(e, WeaponEvent::Strike { .. }))
            .count();
        let impacts = events
            .iter()
            .filter(|e| matches!(e, WeaponEvent::OwnerImpact { .. }))
            .count();
        assert_eq!(strikes, 1);
        assert_eq!(impacts, 1);

        let again = step(&mut lance, owner(1.0), &[target]);
        assert!(!again.iter().any(|e| matches!(e, WeaponEvent::Strike { .. })));
    }

    #[test]
    fn test_speed_loss_ends_charge_and_latches_event() {
        let mut lance = lance();
        step(&mut lance, owner(1.0), &[]);
        step(&mut lance, owner(1.0), &[]);
        let events = step(&mut lance, owner(0.5), &[]);
        assert_eq!(lance.state, LanceState::Cooldown);
        assert!(events.iter().any(|e| matches!(e, WeaponEvent::ChargeEnded { hits: 0 })));
        assert!(lance.take_charge_ended());
        assert!(!lance.take_charge_ended(), "latch clears on read");
    }

    #[test]
    fn test_grace_period_after_first_hit() {
        let mut lance = lance();
        step(&mut lance, owner(1.0), &[]);
        step(&mut lance, owner(1.0), &[]);
        step(&mut lance, owner(1.0), &[foe(11.0, 10.0)]);
        assert!(lance.is_charging());

        let mut ticks = 0;
        while lance.is_charging() && ticks < 100 {
            step(&mut lance, owner(1.0), &[]);
            ticks += 1;
        }
        assert_eq!(lance.state, LanceState::Cooldown);
        assert!(ticks >= 6 && ticks <= 8, "grace lasted {ticks} ticks");
    }

    #[test]
    fn test_max_targets_ends_charge() {
        let mut lance = lance();
        lance.max_targets = 2;
        step(&mut lance, owner(1.0), &[]);
        step(&mut lance, owner(1.0), &[]);
        let foes = [foe(11.0, 10.0), foe(11.5, 10.0), foe(12.0, 10.0)];
        let events = step(&mut lance, owner(1.0), &foes);
        let strikes = events
            .iter()
            .filter(|e| matches!(e, WeaponEvent::Strike { .. }))
            .count();
        assert_eq!(strikes, 2);
        assert_eq!(lance.state, LanceState::Cooldown);
    }

    #[test]
    fn test_cooldown_returns_to_idle() {
        let mut lance = lance();
        step(&mut lance, owner(1.0), &[]);
        step(&mut lance, owner(1.0), &[]);
        step(&mut lance, owner(0.0), &[]);
        assert_eq!(lance.state, LanceState::Cooldown);
        for _ in 0..41 {
            step(&mut lance, owner(0.0), &[]);
        }
        assert_eq!(lance.state, LanceState::Idle);
        assert!(!lance.core.attacking);
    }

    #[test]
    fn test_sector_geometry() {
        let origin = Vec2::new(0.0, 0.0);
        assert!(in_charge_sector(origin, Facing::Right, Vec2::new(2.0, 0.5)));
        assert!(!in_charge_sector(origin, Facing::Right, Vec2::new(-1.0, 0.0)));
        assert!(in_charge_sector(origin, Facing::Left, Vec2::new(-1.0, 0.0)));
        assert!(!in_charge_sector(origin, Facing::Right, Vec2::new(2.0, 1.5)));
        assert!(!in_charge_sector(origin, Facing::Right, Vec2::new(3.5, 0.0)));
        assert!(!in_charge_sector(origin, Facing::Right, Vec2::new(3.0, 1.0 + 1e-3)));
    }

    #[test]
    fn test_attack_is_refused() {
        let mut lance = lance();
        assert!(!lance.attack());
        assert!(!lance.core.attacking);
    }
}
