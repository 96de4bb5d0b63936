//! Read-only battle snapshots for renderers and the headless runner

use serde::Serialize;

use crate::battle::ai::{AiState, CavalryPhase};
use crate::battle::building::Building;
use crate::battle::execution::BattleOutcome;
use crate::battle::units::{Unit, UnitKind};
use crate::combat::lance::LanceState;
use crate::combat::projectile::Arrow;
use crate::core::types::{BuildingId, EntityId, Facing, Team, Tick, Vec2};

#[derive(Debug, Clone, Serialize)]
pub struct UnitSnapshot {
    pub id: EntityId,
    pub kind: UnitKind,
    pub team: Team,
    pub position: Vec2,
    pub velocity: Vec2,
    pub facing: Facing,
    pub health_ratio: f32,
    pub alive: bool,
    pub dying: bool,
    pub opacity: f32,
    pub death_rotation: f32,
    pub mounted: bool,
    pub attacking: bool,
    pub ai_state: Option<AiState>,
    pub cavalry_phase: Option<CavalryPhase>,
    pub lance_state: Option<LanceState>,
    pub bow_aim: Option<f32>,
}

impl From<&Unit> for UnitSnapshot {
    fn from(unit: &Unit) -> Self {
        Self {
            id: unit.id,
            kind: unit.kind,
            team: unit.team,
            position: unit.position,
            velocity: unit.body.velocity,
            facing: unit.facing,
            health_ratio: unit.vitality.health_ratio(),
            alive: unit.vitality.alive,
            dying: unit.vitality.dying,
            opacity: unit.vitality.opacity,
            death_rotation: unit.vitality.death_rotation,
            mounted: unit.is_mounted(),
            attacking: unit.loadout.any_attacking(),
            ai_state: unit.ai.as_ref().map(|ai| ai.state),
            cavalry_phase: unit.ai.as_ref().and_then(|ai| ai.cavalry_phase()),
            lance_state: unit.loadout.lance().map(|l| l.state),
            bow_aim: unit.loadout.bow().map(|b| b.aim),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct BuildingSnapshot {
    pub id: BuildingId,
    pub team: Team,
    pub position: Vec2,
    pub width: f32,
    pub height: f32,
    pub health_ratio: f32,
    pub standing: bool,
    pub spawns: u32,
}

impl From<&Building> for BuildingSnapshot {
    fn from(building: &Building) -> Self {
        Self {
            id: building.id,
            team: building.team,
            position: building.position,
            width: building.width,
            height: building.height,
            health_ratio: building.health_ratio(),
            standing: building.is_standing(),
            spawns: building.spawns,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ArrowSnapshot {
    pub team: Team,
    pub position: Vec2,
    pub direction: Vec2,
}

impl From<&Arrow> for ArrowSnapshot {
    fn from(arrow: &Arrow) -> Self {
        Self {
            team: arrow.team,
            position: arrow.position,
            direction: arrow.direction,
        }
    }
}

/// Everything a renderer needs for one frame
#[derive(Debug, Clone, Serialize)]
pub struct BattleSnapshot {
    pub tick: Tick,
    pub time: f32,
    pub paused: bool,
    pub outcome: BattleOutcome,
    pub units: Vec<UnitSnapshot>,
    pub buildings: Vec<BuildingSnapshot>,
    pub arrows: Vec<ArrowSnapshot>,
}

impl BattleSnapshot {
    pub fn unit(&self, id: EntityId) -> Option<&UnitSnapshot> {
        self.units.iter().find(|u| u.id == id)
    }

    pub fn count(&self, team: Team, kind: UnitKind) -> usize {
        self.units
            .iter()
            .filter(|u| u.team == team && u.kind == kind && u.alive)
            .count()
    }
}
