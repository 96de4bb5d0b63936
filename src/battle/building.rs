//! Bases: passive structures that periodically field a squad
//!
//! The schedule is absolute (`next_spawn_at` advances by the interval), so
//! spawn times never drift with the tick length.

use serde::{Deserialize, Serialize};

use crate::core::config::BuildingConfig;
use crate::core::types::{BuildingId, Team, Vec2};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Building {
    pub id: BuildingId,
    pub team: Team,
    pub position: Vec2,
    pub width: f32,
    pub height: f32,
    pub health: f32,
    pub max_health: f32,
    pub spawn_interval: f32,
    /// Seconds since the building was placed
    pub elapsed: f32,
    pub next_spawn_at: f32,
    pub spawns: u32,
}

impl Building {
    pub fn from_config(id: BuildingId, config: &BuildingConfig) -> Self {
        Self {
            id,
            team: config.team,
            position: Vec2::new(config.x, config.y),
            width: config.width,
            height: config.height,
            health: config.health,
            max_health: config.health,
            spawn_interval: config.spawn_interval,
            elapsed: 0.0,
            next_spawn_at: config.first_spawn_time,
            spawns: 0,
        }
    }

    pub fn is_standing(&self) -> bool {
        self.health > 0.0
    }

    pub fn health_ratio(&self) -> f32 {
        if self.max_health <= 0.0 {
            return 0.0;
        }
        self.health / self.max_health
    }

    /// Advance the spawn clock. Returns true when a squad is due this tick.
    ///
    /// At most one squad per tick, even if a long step crossed two deadlines.
    pub fn update(&mut self, dt: f32) -> bool {
        if !self.is_standing() {
            return false;
        }
        self.elapsed += dt;
        if self.elapsed >= self.next_spawn_at {
            self.next_spawn_at += self.spawn_interval;
            self.spawns += 1;
            return true;
        }
        false
    }

    /// Returns true when this hit razed the building
    pub fn take_damage(&mut self, amount: f32) -> bool {
        if !self.is_standing() {
            return false;
        }
        self.health = (self.health - amount).max(0.0);
        !self.is_standing()
    }

    /// Where a fresh squad forms up: `forward_offset` from the center, toward the enemy
    pub fn spawn_origin(&self, forward_offset: f32) -> Vec2 {
        let forward = match self.team {
            Team::Player => 1.0,
            Team::Enemy => -1.0,
        };
        Vec2::new(self.position.x + forward * forward_offset, self.position.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn building() -> Building {
        Building::from_config(
            BuildingId(0),
            &BuildingConfig {
                team: Team::Enemy,
                x: 100.0,
                y: 20.0,
                spawn_interval: 10.0,
                first_spawn_time: 3.0,
                ..BuildingConfig::default()
            },
        )
    }

    fn spawn_times(b: &mut Building, dt: f32, seconds: f32) -> Vec<f32> {
        let mut times = Vec::new();
        let steps = (seconds / dt).round() as usize;
        for step in 1..=steps {
            if b.update(dt) {
                times.push(step as f32 * dt);
            }
        }
        times
    }

    #[test]
    fn test_first_spawn_then_interval() {
        let mut b = building();
        let times = spawn_times(&mut b, 0.1, 30.0);
        assert_eq!(times.len(), 3);
        assert!((times[0] - 3.0).abs() <= 0.1 + 1e-3);
        assert!((times[1] - 13.0).abs() <= 0.1 + 1e-3);
        assert!((times[2] - 23.0).abs() <= 0.1 + 1e-3);
        assert_eq!(b.spawns, 3);
    }

    #[test]
    fn test_razed_building_never_spawns() {
        let mut b = building();
        assert!(!b.take_damage(100.0));
        assert!(b.take_damage(1000.0));
        assert_eq!(b.health, 0.0);
        assert!(!b.take_damage(10.0));
        assert!(spawn_times(&mut b, 0.1, 30.0).is_empty());
    }

    #[test]
    fn test_spawn_origin_faces_enemy() {
        let enemy = building();
        assert_eq!(
            enemy.spawn_origin(5.0),
            Vec2::new(enemy.position.x - 5.0, enemy.position.y)
        );

        let mut ours = building();
        ours.team = Team::Player;
        assert!(ours.spawn_origin(5.0).x > ours.position.x);
    }
}
