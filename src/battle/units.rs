//! Battlefield units: the player, infantry, archers and cavalry
//!
//! Every kind is the same struct. What differs is which optional parts are
//! filled in (AI controller, mount) and what the loadout carries.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::battle::ai::{AiActor, AiCommand, AiController, Movement, Target};
use crate::battle::constants::FACING_THRESHOLD;
use crate::battle::mount::Mount;
use crate::combat::bow::Bow;
use crate::combat::hitbox::Damageable;
use crate::combat::lance::Lance;
use crate::combat::state::{DamageOutcome, Vitality};
use crate::combat::sword::Sword;
use crate::combat::weapons::{CombatantView, Loadout, Weapon, WeaponKind, WeaponOwner};
use crate::core::config::{BattleConfig, UnitStats};
use crate::core::types::{BuildingId, EntityId, Facing, Team, Vec2};
use crate::physics::body::PhysicsBody;
use crate::physics::collider::Collider;
use crate::physics::collision::Collidable;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitKind {
    Player,
    Infantry,
    Archer,
    Cavalry,
}

impl UnitKind {
    pub fn stats(self, config: &BattleConfig) -> &UnitStats {
        match self {
            UnitKind::Player => &config.units.player,
            UnitKind::Infantry => &config.units.infantry,
            UnitKind::Archer => &config.units.archer,
            UnitKind::Cavalry => &config.units.cavalry,
        }
    }
}

/// Direct damage a weapon dealt to a building
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StructureStrike {
    pub building: BuildingId,
    pub damage: f32,
    pub weapon: WeaponKind,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Unit {
    pub id: EntityId,
    pub kind: UnitKind,
    pub team: Team,
    pub position: Vec2,
    pub facing: Facing,
    pub body: PhysicsBody,
    pub collider: Collider,
    pub vitality: Vitality,
    pub loadout: Loadout,
    pub ai: Option<AiController>,
    pub mount: Option<Mount>,
    pub is_moving: bool,
}

impl Unit {
    /// Build a unit of `kind` with stats, weapons and AI from the config
    pub fn spawn(kind: UnitKind, team: Team, position: Vec2, config: &BattleConfig) -> Self {
        let stats = kind.stats(config);
        let weapons = &config.weapons;
        let mut body = PhysicsBody::new(stats.mass, stats.max_speed, stats.acceleration, stats.friction);

        let (loadout, ai, mount) = match kind {
            UnitKind::Player => {
                let loadout = Loadout::new(vec![
                    Weapon::Sword(Sword::from_config(&weapons.sword)),
                    Weapon::Bow(Bow::from_config(&weapons.bow)),
                    Weapon::Lance(Lance::from_config(&weapons.lance)),
                ]);
                let mut mount = Mount::from_config(&config.mount);
                if config.player.start_mounted {
                    mount.mount(&mut body);
                }
                (loadout, None, Some(mount))
            }
            UnitKind::Infantry => (
                Loadout::new(vec![Weapon::Sword(Sword::from_config(&weapons.sword))]),
                Some(AiController::melee(&config.ai.infantry, config.structure_damage.melee)),
                None,
            ),
            UnitKind::Archer => (
                Loadout::new(vec![Weapon::Bow(Bow::from_config(&weapons.bow))]),
                Some(AiController::ranged(&config.ai.archer, config.structure_damage.ranged)),
                None,
            ),
            UnitKind::Cavalry => {
                let mut mount = Mount::from_config(&config.mount);
                mount.mount(&mut body);
                (
                    Loadout::new(vec![Weapon::Lance(Lance::from_config(&weapons.lance))]),
                    Some(AiController::cavalry(&config.ai.cavalry)),
                    Some(mount),
                )
            }
        };

        let facing = match team {
            Team::Player => Facing::Right,
            Team::Enemy => Facing::Left,
        };

        Self {
            id: EntityId::new(),
            kind,
            team,
            position,
            facing,
            body,
            collider: Collider::new(stats.size / 2.0, stats.mass),
            vitality: Vitality::new(stats.health),
            loadout,
            ai,
            mount,
            is_moving: false,
        }
    }

    pub fn is_alive(&self) -> bool {
        self.vitality.alive
    }

    pub fn is_active(&self) -> bool {
        self.vitality.active
    }

    pub fn is_mounted(&self) -> bool {
        self.mount.as_ref().is_some_and(|m| m.mounted)
    }

    /// Accelerate along a direction of length <= 1
    pub fn steer(&mut self, direction: Vec2) {
        if direction.is_zero() {
            self.hold();
            return;
        }
        self.body.apply_acceleration(direction);
        self.is_moving = true;
    }

    pub fn hold(&mut self) {
        self.is_moving = false;
    }

    /// Turn toward a point on the x axis, ignoring tiny offsets
    pub fn face_toward_x(&mut self, x: f32) {
        let dx = x - self.position.x;
        if dx.abs() > FACING_THRESHOLD {
            self.facing = Facing::from_sign(dx);
        }
    }

    pub fn mount_up(&mut self) -> bool {
        match self.mount.as_mut() {
            Some(mount) => mount.mount(&mut self.body),
            None => false,
        }
    }

    pub fn dismount(&mut self) -> bool {
        match self.mount.as_mut() {
            Some(mount) => mount.dismount(&mut self.body),
            None => false,
        }
    }

    /// Advance the death fade and integrate motion
    ///
    /// Returns true on the tick the death fade finishes.
    pub fn integrate(&mut self, dt: f32) -> bool {
        let faded = self.vitality.advance_death(dt);
        let velocity = self.body.update(dt);
        self.position += velocity * dt;
        faded
    }

    /// Keep the unit inside `[0, width] x [0, height]`
    ///
    /// Velocity pushing into a wall is dropped so units slide along it.
    pub fn clamp_to_bounds(&mut self, width: f32, height: f32) {
        if self.position.x < 0.0 || self.position.x > width {
            self.position.x = self.position.x.clamp(0.0, width);
            self.body.velocity.x = 0.0;
        }
        if self.position.y < 0.0 || self.position.y > height {
            self.position.y = self.position.y.clamp(0.0, height);
            self.body.velocity.y = 0.0;
        }
    }

    /// Lance impact: bleed speed and drop pending acceleration
    pub fn absorb_impact(&mut self, velocity_scale: f32) {
        self.body.velocity *= velocity_scale;
        self.body.acceleration = Vec2::ZERO;
    }

    /// Apply an AI decision. Returns the building damage if a weapon fired at one.
    pub fn execute(&mut self, command: &AiCommand) -> Option<StructureStrike> {
        if let Some(x) = command.face_toward_x {
            self.face_toward_x(x);
        }
        match command.movement {
            Movement::Steer(direction) => self.steer(direction),
            Movement::Hold => self.hold(),
        }

        let order = command.attack?;
        let owner = self.weapon_owner();
        let weapon = self.loadout.trigger_first_in_range(&owner, order.position)?;
        match (order.target, order.structure_damage) {
            (Target::Structure(building), Some(damage)) => Some(StructureStrike {
                building,
                damage,
                weapon,
            }),
            _ => None,
        }
    }

    pub fn weapon_owner(&self) -> WeaponOwner {
        WeaponOwner {
            id: self.id,
            team: self.team,
            position: self.position,
            facing: self.facing,
            speed_ratio: self.body.speed_ratio(),
            mounted: self.is_mounted(),
        }
    }

    pub fn combatant_view(&self) -> CombatantView {
        CombatantView {
            id: self.id,
            team: self.team,
            position: self.position,
            radius: self.collider.enabled.then(|| self.collider.radius()),
            alive: self.vitality.alive,
            active: self.vitality.active,
        }
    }

    pub fn ai_actor(&self) -> AiActor {
        AiActor {
            id: self.id,
            team: self.team,
            position: self.position,
            facing: self.facing,
            velocity: self.body.velocity,
        }
    }
}

impl Collidable for Unit {
    fn position(&self) -> Vec2 {
        self.position
    }

    fn translate(&mut self, offset: Vec2) {
        self.position += offset;
    }

    fn collider(&self) -> Option<&Collider> {
        Some(&self.collider)
    }

    fn body(&self) -> Option<&PhysicsBody> {
        Some(&self.body)
    }

    fn body_mut(&mut self) -> Option<&mut PhysicsBody> {
        Some(&mut self.body)
    }
}

impl Damageable for Unit {
    fn entity_id(&self) -> EntityId {
        self.id
    }

    fn team(&self) -> Team {
        self.team
    }

    fn position(&self) -> Vec2 {
        self.position
    }

    fn hit_radius(&self) -> Option<f32> {
        self.collider.enabled.then(|| self.collider.radius())
    }

    fn is_targetable(&self) -> bool {
        self.vitality.is_targetable()
    }

    fn take_damage<R: Rng + ?Sized>(
        &mut self,
        amount: f32,
        knockback: Option<Vec2>,
        rng: &mut R,
    ) -> DamageOutcome {
        if !self.vitality.is_targetable() {
            return DamageOutcome::IGNORED;
        }

        let depleted = self.vitality.absorb(amount);
        if let Some(kb) = knockback {
            self.body.apply_impulse(kb);
        }

        if depleted {
            self.vitality.begin_death(knockback, rng);
            // Corpses keep their knockback drift through the fade
            self.body.friction = 1.0;
            self.collider.enabled = false;
            self.is_moving = false;
            for weapon in &mut self.loadout.weapons {
                weapon.core_mut().enabled = false;
            }
        }

        DamageOutcome {
            applied: true,
            killed: depleted,
        }
    }
}
