//! Weapon plumbing shared by every weapon kind
//!
//! Weapons never reach into the roster. Each tick they receive a
//! `WeaponContext` (the owner plus a read-only view of every combatant) and
//! push `WeaponEvent`s that the battle applies afterwards.

use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};

use crate::combat::bow::Bow;
use crate::combat::hitbox::Hitbox;
use crate::combat::lance::Lance;
use crate::combat::projectile::Arrow;
use crate::combat::sword::Sword;
use crate::core::types::{EntityId, Facing, Team, Vec2};

/// Timing and gating state every weapon carries
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeaponCore {
    pub damage: f32,
    pub cooldown: f32,
    pub cooldown_timer: f32,
    pub attacking: bool,
    pub enabled: bool,
}

impl WeaponCore {
    pub fn new(damage: f32, cooldown: f32) -> Self {
        Self {
            damage,
            cooldown,
            cooldown_timer: 0.0,
            attacking: false,
            enabled: true,
        }
    }

    pub fn can_attack(&self) -> bool {
        self.enabled && !self.attacking && self.cooldown_timer <= 0.0
    }

    pub fn tick_cooldown(&mut self, dt: f32) {
        if self.cooldown_timer > 0.0 {
            self.cooldown_timer -= dt;
        }
    }

    /// Finish an attack and start the cooldown
    pub fn finish_attack(&mut self) {
        self.attacking = false;
        self.cooldown_timer = self.cooldown;
    }
}

/// The weapon holder as seen at the start of the weapon phase
#[derive(Debug, Clone, Copy)]
pub struct WeaponOwner {
    pub id: EntityId,
    pub team: Team,
    pub position: Vec2,
    pub facing: Facing,
    pub speed_ratio: f32,
    pub mounted: bool,
}

/// Read-only view of a unit for targeting and hit tests
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CombatantView {
    pub id: EntityId,
    pub team: Team,
    pub position: Vec2,
    /// Collider radius, `None` when the unit has no enabled collider
    pub radius: Option<f32>,
    pub alive: bool,
    pub active: bool,
}

impl CombatantView {
    /// Alive, active and on the other side
    pub fn is_enemy_of(&self, team: Team) -> bool {
        self.active && self.alive && self.team.is_hostile_to(team)
    }
}

/// Nearest live enemy of `team` strictly closer than `max_distance`
pub fn nearest_enemy<'a>(
    combatants: &'a [CombatantView],
    team: Team,
    origin: Vec2,
    max_distance: f32,
) -> Option<&'a CombatantView> {
    combatants
        .iter()
        .filter(|c| c.is_enemy_of(team))
        .map(|c| (c, origin.distance(&c.position)))
        .filter(|(_, d)| *d < max_distance)
        .min_by_key(|(_, d)| OrderedFloat(*d))
        .map(|(c, _)| c)
}

pub struct WeaponContext<'a> {
    pub owner: WeaponOwner,
    pub combatants: &'a [CombatantView],
    pub dt: f32,
}

/// Side effects a weapon asks the battle to carry out
#[derive(Debug, Clone)]
pub enum WeaponEvent {
    SpawnHitbox(Hitbox),
    SpawnArrow(Arrow),
    /// Damage applied immediately to one target (lance impacts)
    Strike {
        target: EntityId,
        damage: f32,
        knockback: Vec2,
    },
    /// Scale the owner's velocity and drop pending acceleration
    OwnerImpact { velocity_scale: f32 },
    ChargeStarted,
    ChargeEnded { hits: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WeaponKind {
    Sword,
    Bow,
    Lance,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Weapon {
    Sword(Sword),
    Bow(Bow),
    Lance(Lance),
}

impl Weapon {
    pub fn kind(&self) -> WeaponKind {
        match self {
            Weapon::Sword(_) => WeaponKind::Sword,
            Weapon::Bow(_) => WeaponKind::Bow,
            Weapon::Lance(_) => WeaponKind::Lance,
        }
    }

    pub fn core(&self) -> &WeaponCore {
        match self {
            Weapon::Sword(w) => &w.core,
            Weapon::Bow(w) => &w.core,
            Weapon::Lance(w) => &w.core,
        }
    }

    pub fn core_mut(&mut self) -> &mut WeaponCore {
        match self {
            Weapon::Sword(w) => &mut w.core,
            Weapon::Bow(w) => &mut w.core,
            Weapon::Lance(w) => &mut w.core,
        }
    }

    pub fn can_attack(&self) -> bool {
        self.core().can_attack()
    }

    pub fn is_attacking(&self) -> bool {
        self.core().attacking
    }

    pub fn in_range(&self, owner: &WeaponOwner, target: Vec2) -> bool {
        match self {
            Weapon::Sword(w) => w.in_range(owner.position, target),
            Weapon::Bow(w) => w.in_range(owner.position, target),
            Weapon::Lance(w) => w.in_range(owner, target),
        }
    }

    /// Start an attack. Returns false when the weapon refused.
    pub fn attack(&mut self) -> bool {
        match self {
            Weapon::Sword(w) => w.attack(),
            Weapon::Bow(w) => w.attack(),
            Weapon::Lance(w) => w.attack(),
        }
    }

    pub fn update(&mut self, ctx: &WeaponContext<'_>, events: &mut Vec<WeaponEvent>) {
        match self {
            Weapon::Sword(w) => w.update(&ctx.owner, ctx.dt, events),
            Weapon::Bow(w) => w.update(ctx, events),
            Weapon::Lance(w) => w.update(ctx, events),
        }
    }
}

/// Everything a unit carries
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Loadout {
    pub weapons: Vec<Weapon>,
}

impl Loadout {
    pub fn new(weapons: Vec<Weapon>) -> Self {
        Self { weapons }
    }

    pub fn is_empty(&self) -> bool {
        self.weapons.is_empty()
    }

    pub fn any_attacking(&self) -> bool {
        self.weapons.iter().any(Weapon::is_attacking)
    }

    /// Fire the first weapon that accepts an attack, without a range check
    pub fn trigger_first_ready(&mut self) -> Option<WeaponKind> {
        self.weapons
            .iter_mut()
            .find_map(|w| if w.attack() { Some(w.kind()) } else { None })
    }

    /// Fire the first ready weapon whose range test passes
    pub fn trigger_first_in_range(&mut self, owner: &WeaponOwner, target: Vec2) -> Option<WeaponKind> {
        self.weapons
            .iter_mut()
            .filter(|w| w.can_attack() && w.in_range(owner, target))
            .find_map(|w| if w.attack() { Some(w.kind()) } else { None })
    }

    pub fn update(&mut self, ctx: &WeaponContext<'_>, events: &mut Vec<WeaponEvent>) {
        for weapon in &mut self.weapons {
            weapon.update(ctx, events);
        }
    }

    pub fn lance(&self) -> Option<&Lance> {
        self.weapons.iter().find_map(|w| match w {
            Weapon::Lance(lance) => Some(lance),
            _ => None,
        })
    }

    pub fn lance_mut(&mut self) -> Option<&mut Lance> {
        self.weapons.iter_mut().find_map(|w| match w {
            Weapon::Lance(lance) => Some(lance),
            _ => None,
        })
    }

    pub fn bow(&self) -> Option<&Bow> {
        self.weapons.iter().find_map(|w| match w {
            Weapon::Bow(bow) => Some(bow),
            _ => None,
        })
    }

    pub fn sword(&self) -> Option<&Sword> {
        self.weapons.iter().find_map(|w| match w {
            Weapon::Sword(sword) => Some(sword),
            _ => None,
        })
    }
}
