//! Horses swap the rider's movement profile in and out

use serde::{Deserialize, Serialize};

use crate::core::config::MountConfig;
use crate::physics::body::{MovementProfile, PhysicsBody};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Mount {
    pub profile: MovementProfile,
    pub mounted: bool,
    /// Rider's own profile while mounted
    saved: Option<MovementProfile>,
}

impl Mount {
    pub fn from_config(config: &MountConfig) -> Self {
        Self {
            profile: MovementProfile {
                max_speed: config.max_speed,
                acceleration_force: config.acceleration,
                friction: config.friction,
            },
            mounted: false,
            saved: None,
        }
    }

    /// Returns false if already mounted
    pub fn mount(&mut self, body: &mut PhysicsBody) -> bool {
        if self.mounted {
            return false;
        }
        self.saved = Some(body.movement_profile());
        body.set_movement_profile(self.profile);
        self.mounted = true;
        true
    }

    /// Returns false if not mounted
    pub fn dismount(&mut self, body: &mut PhysicsBody) -> bool {
        if !self.mounted {
            return false;
        }
        if let Some(saved) = self.saved.take() {
            body.set_movement_profile(saved);
        }
        self.mounted = false;
        true
    }
}
