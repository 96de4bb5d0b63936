//! Bow: continuous aim, timed draw, arrow release

use serde::{Deserialize, Serialize};

use crate::combat::constants::{
    ARROW_SPAWN_OFFSET, BOW_IDLE_AIM_LEFT, BOW_IDLE_AIM_RIGHT, BOW_RELEASE_TIME,
};
use crate::combat::projectile::Arrow;
use crate::combat::weapons::{nearest_enemy, WeaponContext, WeaponCore, WeaponEvent, WeaponOwner};
use crate::core::config::BowConfig;
use crate::core::types::{wrap_angle, Facing, Vec2};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bow {
    pub core: WeaponCore,
    pub arrow_speed: f32,
    pub range: f32,
    pub knockback: f32,
    pub rotation_speed: f32,
    pub draw_speed: f32,
    /// Current aim in radians
    pub aim: f32,
    pub draw_progress: f32,
    pub release_timer: f32,
}

impl Bow {
    pub fn from_config(config: &BowConfig) -> Self {
        Self {
            core: WeaponCore::new(config.damage, config.cooldown),
            arrow_speed: config.arrow_speed,
            range: config.range,
            knockback: config.knockback,
            rotation_speed: config.rotation_speed,
            draw_speed: config.draw_speed,
            aim: BOW_IDLE_AIM_RIGHT,
            draw_progress: 0.0,
            release_timer: 0.0,
        }
    }

    pub fn in_range(&self, origin: Vec2, target: Vec2) -> bool {
        origin.distance(&target) <= self.range
    }

    pub fn attack(&mut self) -> bool {
        if !self.core.can_attack() {
            return false;
        }
        self.core.attacking = true;
        self.draw_progress = 0.0;
        true
    }

    pub fn is_releasing(&self) -> bool {
        self.release_timer > 0.0
    }

    pub fn update(&mut self, ctx: &WeaponContext<'_>, events: &mut Vec<WeaponEvent>) {
        let dt = ctx.dt;
        self.core.tick_cooldown(dt);
        if self.release_timer > 0.0 {
            self.release_timer = (self.release_timer - dt).max(0.0);
        }

        if !self.core.attacking {
            let bearing = self.bearing(ctx);
            self.aim = rotate_toward(self.aim, bearing, self.rotation_speed * dt);
            return;
        }

        self.draw_progress += self.draw_speed * dt;
        if self.draw_progress >= 1.0 {
            events.push(WeaponEvent::SpawnArrow(self.release(&ctx.owner)));
        }
    }

    /// Aim target: nearest enemy in range, else 45 degrees up in front
    fn bearing(&self, ctx: &WeaponContext<'_>) -> f32 {
        let owner = &ctx.owner;
        match nearest_enemy(ctx.combatants, owner.team, owner.position, self.range) {
            Some(target) => (target.position - owner.position).angle(),
            None => idle_aim(owner.facing),
        }
    }

    fn release(&mut self, owner: &WeaponOwner) -> Arrow {
        let direction = Vec2::from_angle(self.aim);
        let arrow = Arrow::new(
            owner.id,
            owner.team,
            owner.position + direction * ARROW_SPAWN_OFFSET,
            direction,
            self.arrow_speed,
            self.range,
            self.core.damage,
            self.knockback,
        );
        self.draw_progress = 0.0;
        self.release_timer = BOW_RELEASE_TIME;
        self.core.finish_attack();
        arrow
    }
}

pub fn idle_aim(facing: Facing) -> f32 {
    match facing {
        Facing::Right => BOW_IDLE_AIM_RIGHT,
        Facing::Left => BOW_IDLE_AIM_LEFT,
    }
}

/// Turn `current` toward `target` by at most `max_step`, the short way round
pub fn rotate_toward(current: f32, target: f32, max_step: f32) -> f32 {
    let diff = wrap_angle(target - current);
    if diff.abs() <= max_step {
        return wrap_angle(target);
    }
    wrap_angle(current + max_step * diff.signum())
}
