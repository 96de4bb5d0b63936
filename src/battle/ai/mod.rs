//! Unit AI: target acquisition plus per-kind positioning
//!
//! Architecture: Context + Command
//! - `AiContext` is a read-only view of the battlefield for this tick
//! - `AiController::update` decides and returns an `AiCommand`
//! - The battle applies the command (steering, facing, weapon trigger)
//!
//! Targets are weak handles (`Target`) re-resolved against the context every
//! tick. A handle that no longer resolves forces re-acquisition.

mod behaviors;
mod cavalry;
mod targeting;

pub use behaviors::{melee_step, ranged_step, Step};
pub use cavalry::{CavalryPhase, CavalryPlan};
pub use targeting::{acquire_target, resolve_target};

use serde::{Deserialize, Serialize};

use crate::combat::weapons::CombatantView;
use crate::core::config::AiProfile;
use crate::core::types::{BuildingId, EntityId, Facing, Team, Vec2};

/// Weak reference to whatever the unit is after
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Target {
    Unit(EntityId),
    Structure(BuildingId),
}

/// The deciding unit as seen at the start of the tick
#[derive(Debug, Clone, Copy)]
pub struct AiActor {
    pub id: EntityId,
    pub team: Team,
    pub position: Vec2,
    pub facing: Facing,
    pub velocity: Vec2,
}

/// Read-only view of a building for targeting
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StructureView {
    pub id: BuildingId,
    pub team: Team,
    pub position: Vec2,
    pub standing: bool,
}

pub struct AiContext<'a> {
    pub combatants: &'a [CombatantView],
    pub structures: &'a [StructureView],
    /// The unit's lance finished a charge since the last decision
    pub charge_ended: bool,
    pub dt: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AiState {
    #[default]
    Idle,
    Seek,
    Attack,
    Retreat,
    ChargeApproach,
    ChargeContinue,
    ChargeCooldown,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Movement {
    /// Stop steering; friction bleeds off speed
    #[default]
    Hold,
    /// Unit direction to accelerate along
    Steer(Vec2),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AttackOrder {
    pub target: Target,
    pub position: Vec2,
    /// Fixed damage applied to the building when a weapon fires at it
    pub structure_damage: Option<f32>,
}

/// Everything the AI wants done this tick
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct AiCommand {
    pub movement: Movement,
    pub face_toward_x: Option<f32>,
    pub attack: Option<AttackOrder>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum AiBehavior {
    Melee,
    Ranged { keep_distance: f32 },
    Cavalry(CavalryPlan),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AiController {
    pub behavior: AiBehavior,
    pub state: AiState,
    pub target: Option<Target>,
    pub refresh_interval: f32,
    pub refresh_timer: f32,
    pub attack_range: f32,
    pub chase_distance: f32,
    pub structure_damage: f32,
}

impl AiController {
    fn with_behavior(behavior: AiBehavior, profile: &AiProfile, structure_damage: f32) -> Self {
        Self {
            behavior,
            state: AiState::Idle,
            target: None,
            refresh_interval: profile.refresh_interval,
            refresh_timer: 0.0,
            attack_range: profile.attack_range,
            chase_distance: profile.chase_distance,
            structure_damage,
        }
    }

    pub fn melee(profile: &AiProfile, structure_damage: f32) -> Self {
        Self::with_behavior(AiBehavior::Melee, profile, structure_damage)
    }

    pub fn ranged(profile: &AiProfile, structure_damage: f32) -> Self {
        Self::with_behavior(
            AiBehavior::Ranged {
                keep_distance: profile.keep_distance,
            },
            profile,
            structure_damage,
        )
    }

    /// Cavalry only hunts units; it never walks up to a building
    pub fn cavalry(profile: &AiProfile) -> Self {
        Self::with_behavior(
            AiBehavior::Cavalry(CavalryPlan::from_profile(profile)),
            profile,
            0.0,
        )
    }

    fn allows_structures(&self) -> bool {
        !matches!(self.behavior, AiBehavior::Cavalry(_))
    }

    pub fn cavalry_phase(&self) -> Option<CavalryPhase> {
        match &self.behavior {
            AiBehavior::Cavalry(plan) => Some(plan.phase),
            _ => None,
        }
    }

    /// Decide this tick's movement, facing and attack
    pub fn update(&mut self, actor: &AiActor, ctx: &AiContext<'_>) -> AiCommand {
        self.refresh_timer -= ctx.dt;

        let mut target_pos = self.target.and_then(|t| resolve_target(t, ctx));
        if self.refresh_timer <= 0.0 || target_pos.is_none() {
            self.refresh_timer = self.refresh_interval;
            self.target = acquire_target(actor, ctx, self.chase_distance, self.allows_structures());
            target_pos = self.target.and_then(|t| resolve_target(t, ctx));
        }

        let (target, position) = match (self.target, target_pos) {
            (Some(target), Some(position)) => (target, position),
            _ => {
                self.target = None;
                self.state = AiState::Idle;
                if let AiBehavior::Cavalry(plan) = &mut self.behavior {
                    plan.reset();
                }
                return AiCommand::default();
            }
        };

        let face_toward_x = Some(position.x);
        let structure_damage = match target {
            Target::Structure(_) => Some(self.structure_damage),
            Target::Unit(_) => None,
        };
        let order = AttackOrder {
            target,
            position,
            structure_damage,
        };

        let step = match &mut self.behavior {
            AiBehavior::Melee => melee_step(actor, position, self.attack_range),
            AiBehavior::Ranged { keep_distance } => ranged_step(actor, position, *keep_distance),
            AiBehavior::Cavalry(plan) => {
                let (movement, state) = plan.step(actor, position, ctx.charge_ended, ctx.dt);
                Step {
                    movement,
                    state,
                    wants_attack: false,
                }
            }
        };

        self.state = step.state;
        AiCommand {
            movement: step.movement,
            face_toward_x,
            attack: step.wants_attack.then_some(order),
        }
    }
}
