pub mod config;
pub mod error;
pub mod types;

pub use config::BattleConfig;
pub use error::{Result, SkirmishError};
pub use types::{wrap_angle, BuildingId, EntityId, Facing, Team, Tick, Vec2};
