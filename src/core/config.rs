//! Battle configuration with documented defaults
//!
//! Every tunable number the simulation reads lives here. The config is
//! loaded once (usually from `data/battle.toml`), validated, and then handed
//! to `BattleState::new` by value. Nothing reads it through a global.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::core::error::{Result, SkirmishError};
use crate::core::types::Team;

/// Complete configuration for one battle
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BattleConfig {
    pub world: WorldConfig,
    pub physics: PhysicsConfig,
    pub units: UnitTable,
    pub weapons: WeaponTable,
    pub mount: MountConfig,
    pub ai: AiTable,
    pub player: PlayerConfig,
    pub squad: SquadConfig,
    pub structure_damage: StructureDamageConfig,
    pub buildings: Vec<BuildingConfig>,
}

// === WORLD ===

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// Battlefield width in meters. Positions are clamped to [0, map_width].
    pub map_width: f32,

    /// Battlefield height in meters.
    pub map_height: f32,

    /// Upper bound on a single tick's dt (seconds)
    ///
    /// A long frame (tab switch, debugger pause) would otherwise integrate a
    /// huge step and tunnel units through each other.
    pub max_step: f32,

    /// Seed for the battle RNG (collision fallback normals, death spin,
    /// spawn offsets)
    pub seed: u64,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            map_width: 120.0,
            map_height: 40.0,
            max_step: 0.1,
            seed: 42,
        }
    }
}

// === PHYSICS ===

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    /// Multiplier applied to the closing speed when two bodies collide
    ///
    /// 0.0 gives pure positional separation, 2.0 gives a soft bounce.
    pub collision_impulse_strength: f32,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            collision_impulse_strength: 2.0,
        }
    }
}

// === UNITS ===

/// Movement and durability stats for one unit kind
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UnitStats {
    /// Body diameter in meters; the collider radius is half of this
    pub size: f32,
    pub max_speed: f32,
    /// Acceleration applied per unit of movement intent
    ///
    /// With per-tick friction f and step dt, the terminal speed is roughly
    /// `f * acceleration * dt / (1 - f)`. Keep it above max_speed or the unit
    /// never reaches top speed.
    pub acceleration: f32,
    pub mass: f32,
    pub friction: f32,
    pub health: f32,
}

impl Default for UnitStats {
    fn default() -> Self {
        Self {
            size: 1.6,
            max_speed: 3.0,
            acceleration: 40.0,
            mass: 1.0,
            friction: 0.9,
            health: 100.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UnitTable {
    pub player: UnitStats,
    pub infantry: UnitStats,
    pub archer: UnitStats,
    pub cavalry: UnitStats,
}

impl Default for UnitTable {
    fn default() -> Self {
        Self {
            player: UnitStats {
                size: 2.0,
                max_speed: 5.0,
                acceleration: 60.0,
                mass: 2.0,
                friction: 0.9,
                health: 2000.0,
            },
            infantry: UnitStats::default(),
            archer: UnitStats {
                health: 60.0,
                ..UnitStats::default()
            },
            cavalry: UnitStats {
                size: 2.0,
                max_speed: 4.0,
                acceleration: 50.0,
                mass: 3.0,
                friction: 0.9,
                health: 150.0,
            },
        }
    }
}

// === WEAPONS ===

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SwordConfig {
    pub damage: f32,
    pub cooldown: f32,
    /// Reach in meters; also the hitbox radius
    pub attack_range: f32,
    pub max_targets: usize,
    pub knockback: f32,
}

impl Default for SwordConfig {
    fn default() -> Self {
        Self {
            damage: 10.0,
            cooldown: 1.0,
            attack_range: 2.5,
            max_targets: 3,
            knockback: 2.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BowConfig {
    pub damage: f32,
    pub cooldown: f32,
    pub arrow_speed: f32,
    /// Targeting range and maximum arrow flight distance
    pub range: f32,
    pub knockback: f32,
    /// Aim turn rate in radians per second
    pub rotation_speed: f32,
    /// Draw progress per second; a full draw takes `1 / draw_speed` seconds
    pub draw_speed: f32,
}

impl Default for BowConfig {
    fn default() -> Self {
        Self {
            damage: 15.0,
            cooldown: 1.5,
            arrow_speed: 15.0,
            range: 20.0,
            knockback: 1.0,
            rotation_speed: 8.0,
            draw_speed: 5.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LanceConfig {
    pub damage: f32,
    /// Seconds spent re-raising the lance after a charge
    pub cooldown: f32,
    /// Speed ratio below which an active charge breaks off
    pub speed_threshold: f32,
    pub max_targets: usize,
    pub knockback: f32,
}

impl Default for LanceConfig {
    fn default() -> Self {
        Self {
            damage: 40.0,
            cooldown: 2.0,
            speed_threshold: 0.7,
            max_targets: 5,
            knockback: 8.0,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WeaponTable {
    pub sword: SwordConfig,
    pub bow: BowConfig,
    pub lance: LanceConfig,
}

// === MOUNT ===

/// Movement profile a horse imposes on its rider
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MountConfig {
    pub max_speed: f32,
    pub acceleration: f32,
    pub friction: f32,
}

impl Default for MountConfig {
    fn default() -> Self {
        Self {
            max_speed: 10.0,
            acceleration: 120.0,
            friction: 0.88,
        }
    }
}

// === AI ===

/// Behavior tuning for one AI-driven unit kind
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AiProfile {
    /// Seconds between forced target re-acquisitions
    pub refresh_interval: f32,
    /// Distance at which the unit stops to attack
    pub attack_range: f32,
    /// Maximum distance at which enemy units are noticed
    pub chase_distance: f32,
    /// Preferred standoff distance (ranged only)
    pub keep_distance: f32,
    /// Seconds a cavalry unit loiters between charges
    pub charge_cooldown: f32,
    /// Loiter distance a cavalry unit holds while cooling down
    pub retreat_distance: f32,
    /// Seconds a cavalry unit keeps riding after a charge ends
    pub pierce_duration: f32,
}

impl Default for AiProfile {
    fn default() -> Self {
        Self {
            refresh_interval: 3.0,
            attack_range: 2.0,
            chase_distance: 30.0,
            keep_distance: 0.0,
            charge_cooldown: 3.0,
            retreat_distance: 10.0,
            pierce_duration: 3.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AiTable {
    pub infantry: AiProfile,
    pub archer: AiProfile,
    pub cavalry: AiProfile,
}

impl Default for AiTable {
    fn default() -> Self {
        let bow = BowConfig::default();
        Self {
            infantry: AiProfile::default(),
            archer: AiProfile {
                refresh_interval: 8.0,
                attack_range: bow.range,
                chase_distance: bow.range + 5.0,
                keep_distance: bow.range * 0.8,
                ..AiProfile::default()
            },
            cavalry: AiProfile {
                refresh_interval: 15.0,
                attack_range: 2.5,
                chase_distance: 40.0,
                ..AiProfile::default()
            },
        }
    }
}

// === PLAYER ===

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    /// Spawn the player unit at the map center
    pub enabled: bool,
    /// Radius searched for an auto-attack target
    pub auto_attack_range: f32,
    pub start_mounted: bool,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            auto_attack_range: 25.0,
            start_mounted: true,
        }
    }
}

// === SPAWNING ===

/// Composition and placement of one spawned wave
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SquadConfig {
    pub infantry: u32,
    pub archers: u32,
    pub cavalry: u32,
    /// Distance in front of the building where the wave appears
    pub forward_offset: f32,
    /// Half-extent of the random horizontal scatter
    pub jitter_x: f32,
    /// Half-extent of the random vertical scatter
    pub jitter_y: f32,
}

impl Default for SquadConfig {
    fn default() -> Self {
        Self {
            infantry: 4,
            archers: 2,
            cavalry: 1,
            forward_offset: 5.0,
            jitter_x: 2.0,
            jitter_y: 1.5,
        }
    }
}

/// Direct damage AI units deal to buildings per attack
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StructureDamageConfig {
    pub melee: f32,
    pub ranged: f32,
}

impl Default for StructureDamageConfig {
    fn default() -> Self {
        Self {
            melee: 10.0,
            ranged: 5.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildingConfig {
    pub team: Team,
    pub x: f32,
    pub y: f32,
    pub health: f32,
    pub spawn_interval: f32,
    pub first_spawn_time: f32,
    pub width: f32,
    pub height: f32,
}

impl Default for BuildingConfig {
    fn default() -> Self {
        Self {
            team: Team::Enemy,
            x: 0.0,
            y: 0.0,
            health: 500.0,
            spawn_interval: 10.0,
            first_spawn_time: 3.0,
            width: 4.0,
            height: 6.0,
        }
    }
}

impl BattleConfig {
    /// Create a config with default values and no buildings
    pub fn new() -> Self {
        Self::default()
    }

    /// Default config with one base per side at either end of the map
    pub fn skirmish() -> Self {
        let mut config = Self::default();
        let mid_y = config.world.map_height / 2.0;
        config.buildings = vec![
            BuildingConfig {
                team: Team::Player,
                x: 8.0,
                y: mid_y,
                ..BuildingConfig::default()
            },
            BuildingConfig {
                team: Team::Enemy,
                x: config.world.map_width - 8.0,
                y: mid_y,
                ..BuildingConfig::default()
            },
        ];
        config
    }

    /// Parse and validate a TOML document
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: BattleConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a TOML config file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)?;
        let config = Self::from_toml_str(&contents)?;
        tracing::debug!(?path, buildings = config.buildings.len(), "loaded battle config");
        Ok(config)
    }

    /// Load `data/<name>.toml`
    pub fn load_named(name: &str) -> Result<Self> {
        Self::load(config_path(name))
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> Result<()> {
        if self.world.map_width <= 0.0 || self.world.map_height <= 0.0 {
            return Err(SkirmishError::InvalidConfig(format!(
                "map size must be positive, got {}x{}",
                self.world.map_width, self.world.map_height
            )));
        }

        if self.world.max_step <= 0.0 {
            return Err(SkirmishError::InvalidConfig(
                "world.max_step must be positive".into(),
            ));
        }

        let units = [
            ("player", &self.units.player),
            ("infantry", &self.units.infantry),
            ("archer", &self.units.archer),
            ("cavalry", &self.units.cavalry),
        ];
        for (name, stats) in units {
            if stats.friction <= 0.0 || stats.friction > 1.0 {
                return Err(SkirmishError::InvalidConfig(format!(
                    "units.{name}.friction ({}) must be in (0, 1]",
                    stats.friction
                )));
            }
            if stats.mass <= 0.0 || stats.size <= 0.0 || stats.health <= 0.0 {
                return Err(SkirmishError::InvalidConfig(format!(
                    "units.{name} needs positive mass, size and health"
                )));
            }
        }

        if self.mount.friction <= 0.0 || self.mount.friction > 1.0 {
            return Err(SkirmishError::InvalidConfig(format!(
                "mount.friction ({}) must be in (0, 1]",
                self.mount.friction
            )));
        }

        if self.weapons.bow.draw_speed <= 0.0 {
            return Err(SkirmishError::InvalidConfig(
                "weapons.bow.draw_speed must be positive".into(),
            ));
        }

        if self.weapons.sword.max_targets == 0 || self.weapons.lance.max_targets == 0 {
            return Err(SkirmishError::InvalidConfig(
                "weapons.sword.max_targets and weapons.lance.max_targets must be at least 1".into(),
            ));
        }

        // Ready needs r >= 0.9, so a break-off threshold at or above it
        // would end every charge on the tick it starts
        let threshold = self.weapons.lance.speed_threshold;
        if threshold <= 0.0 || threshold >= 0.9 {
            return Err(SkirmishError::InvalidConfig(format!(
                "weapons.lance.speed_threshold ({threshold}) must be in (0, 0.9)"
            )));
        }

        if self.ai.archer.keep_distance <= 0.0 {
            return Err(SkirmishError::InvalidConfig(
                "ai.archer.keep_distance must be positive".into(),
            ));
        }

        if self.squad.jitter_x < 0.0 || self.squad.jitter_y < 0.0 {
            return Err(SkirmishError::InvalidConfig(
                "squad jitter must not be negative".into(),
            ));
        }

        for (i, building) in self.buildings.iter().enumerate() {
            if building.spawn_interval <= 0.0 {
                return Err(SkirmishError::InvalidConfig(format!(
                    "buildings[{i}].spawn_interval must be positive"
                )));
            }
        }

        Ok(())
    }
}

/// Get path to a named config file
fn config_path(name: &str) -> PathBuf {
    PathBuf::from("data").join(format!("{}.toml", name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(BattleConfig::default().validate().is_ok());
        assert!(BattleConfig::skirmish().validate().is_ok());
    }

    #[test]
    fn test_skirmish_places_opposing_bases() {
        let config = BattleConfig::skirmish();
        assert_eq!(config.buildings.len(), 2);
        assert_eq!(config.buildings[0].team, Team::Player);
        assert_eq!(config.buildings[1].team, Team::Enemy);
        assert!(config.buildings[0].x < config.buildings[1].x);
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config = BattleConfig::from_toml_str(
            r#"
            [world]
            map_width = 60.0

            [weapons.sword]
            damage = 25.0
            "#,
        )
        .expect("partial config should parse");

        assert_eq!(config.world.map_width, 60.0);
        assert_eq!(config.world.map_height, 40.0);
        assert_eq!(config.weapons.sword.damage, 25.0);
        assert_eq!(config.weapons.sword.max_targets, 3);
    }

    #[test]
    fn test_bad_friction_rejected() {
        let result = BattleConfig::from_toml_str(
            r#"
            [units.infantry]
            friction = 1.5
            "#,
        );
        assert!(matches!(result, Err(SkirmishError::InvalidConfig(_))));
    }

    #[test]
    fn test_zero_max_targets_rejected() {
        for table in ["sword", "lance"] {
            let result = BattleConfig::from_toml_str(&format!(
                "[weapons.{table}]\nmax_targets = 0\n"
            ));
            assert!(
                matches!(result, Err(SkirmishError::InvalidConfig(_))),
                "{table} accepted max_targets = 0"
            );
        }
    }

    #[test]
    fn test_malformed_toml_is_parse_error() {
        let result = BattleConfig::from_toml_str("[world\nmap_width = ");
        assert!(matches!(result, Err(SkirmishError::ConfigParse(_))));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let result = BattleConfig::load("data/does_not_exist.toml");
        assert!(matches!(result, Err(SkirmishError::IoError(_))));
    }

    #[test]
    fn test_load_shipped_config() {
        let config = BattleConfig::load_named("battle").expect("Should load data/battle.toml");
        assert_eq!(config.buildings.len(), 2);
    }

    #[test]
    fn test_archer_profile_follows_bow_range() {
        let config = BattleConfig::default();
        assert_eq!(config.ai.archer.attack_range, config.weapons.bow.range);
        assert!(config.ai.archer.keep_distance < config.ai.archer.attack_range);
    }
}
