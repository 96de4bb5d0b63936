//! Battle system - real-time skirmish between two bases
//!
//! A player unit and waves of infantry, archers and cavalry fight on a
//! bounded 2D field. Bases field a squad on a timer until they are razed.
//!
//! Key pieces:
//! - `BattleState` owns everything and runs the ordered tick pipeline
//! - `Roster` holds units; ids are weak handles re-resolved every tick
//! - AI and weapons read snapshot views and return commands/events

pub mod ai;
pub mod building;
pub mod constants;
pub mod execution;
pub mod mount;
pub mod roster;
pub mod snapshot;
pub mod units;

// Re-exports for convenient access
pub use ai::{
    AiBehavior, AiCommand, AiContext, AiController, AiState, AttackOrder, CavalryPhase,
    CavalryPlan, Movement, StructureView, Target,
};
pub use building::Building;
pub use constants::*;
pub use execution::{
    check_battle_end, BattleEvent, BattleEventLog, BattleEventType, BattleOutcome, BattleState,
    BattleStats,
};
pub use mount::Mount;
pub use roster::Roster;
pub use snapshot::{ArrowSnapshot, BattleSnapshot, BuildingSnapshot, UnitSnapshot};
pub use units::{StructureStrike, Unit, UnitKind};
