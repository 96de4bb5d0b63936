//! Transient damage regions and the resolver that ages them
//!
//! A hitbox is data, not an entity. It remembers who it already struck so
//! one swing can never land twice on the same target.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::combat::state::DamageOutcome;
use crate::core::types::{EntityId, Team, Vec2};

/// Anything a hitbox can land on
pub trait Damageable {
    fn entity_id(&self) -> EntityId;
    fn team(&self) -> Team;
    fn position(&self) -> Vec2;
    /// Collider radius, `None` without an enabled collider
    fn hit_radius(&self) -> Option<f32>;
    fn is_targetable(&self) -> bool;
    fn take_damage<R: Rng + ?Sized>(
        &mut self,
        amount: f32,
        knockback: Option<Vec2>,
        rng: &mut R,
    ) -> DamageOutcome;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Hitbox {
    pub owner: EntityId,
    pub team: Team,
    pub position: Vec2,
    pub radius: f32,
    pub damage: f32,
    pub knockback: Vec2,
    pub max_targets: usize,
    pub duration: f32,
    pub timer: f32,
    pub hit_list: Vec<EntityId>,
}

impl Hitbox {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        owner: EntityId,
        team: Team,
        position: Vec2,
        radius: f32,
        damage: f32,
        knockback: Vec2,
        max_targets: usize,
        duration: f32,
    ) -> Self {
        Self {
            owner,
            team,
            position,
            radius,
            damage,
            knockback,
            max_targets,
            duration,
            timer: 0.0,
            hit_list: Vec::new(),
        }
    }

    pub fn is_full(&self) -> bool {
        self.hit_list.len() >= self.max_targets
    }

    pub fn is_spent(&self) -> bool {
        self.timer >= self.duration || self.is_full()
    }

    pub fn has_hit(&self, id: EntityId) -> bool {
        self.hit_list.contains(&id)
    }

    /// Owner, allies, corpses and already-struck units are never hit
    fn can_strike<T: Damageable>(&self, target: &T) -> Option<f32> {
        if !target.is_targetable() {
            return None;
        }
        let id = target.entity_id();
        if id == self.owner || target.team() == self.team || self.has_hit(id) {
            return None;
        }
        target.hit_radius()
    }
}

/// One landed hit
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HitReport {
    pub attacker: EntityId,
    pub target: EntityId,
    pub damage: f32,
    pub killed: bool,
}

#[derive(Debug, Clone, Default)]
pub struct HitboxResolver {
    hitboxes: Vec<Hitbox>,
}

impl HitboxResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, hitbox: Hitbox) {
        self.hitboxes.push(hitbox);
    }

    pub fn len(&self) -> usize {
        self.hitboxes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hitboxes.is_empty()
    }

    pub fn hitboxes(&self) -> &[Hitbox] {
        &self.hitboxes
    }

    pub fn clear(&mut self) {
        self.hitboxes.clear();
    }

    /// Age every hitbox, apply new hits, drop spent hitboxes
    pub fn update<T, R>(&mut self, dt: f32, targets: &mut [T], rng: &mut R) -> Vec<HitReport>
    where
        T: Damageable,
        R: Rng + ?Sized,
    {
        let mut reports = Vec::new();

        for hitbox in &mut self.hitboxes {
            hitbox.timer += dt;

            for target in targets.iter_mut() {
                if hitbox.is_full() {
                    break;
                }
                let Some(target_radius) = hitbox.can_strike(&*target) else {
                    continue;
                };
                if hitbox.position.distance(&target.position()) >= hitbox.radius + target_radius {
                    continue;
                }

                let knockback = (!hitbox.knockback.is_zero()).then_some(hitbox.knockback);
                let outcome = target.take_damage(hitbox.damage, knockback, rng);
                let target_id = target.entity_id();
                hitbox.hit_list.push(target_id);
                reports.push(HitReport {
                    attacker: hitbox.owner,
                    target: target_id,
                    damage: hitbox.damage,
                    killed: outcome.killed,
                });
            }
        }

        self.hitboxes.retain(|h| !h.is_spent());
        reports
    }
}
