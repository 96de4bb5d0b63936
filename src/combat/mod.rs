//! Weapons, projectiles, hitboxes and the shared damage model

pub mod bow;
pub mod constants;
pub mod hitbox;
pub mod lance;
pub mod projectile;
pub mod state;
pub mod sword;
pub mod weapons;

pub use bow::{rotate_toward, Bow};
pub use hitbox::{Damageable, HitReport, Hitbox, HitboxResolver};
pub use lance::{in_charge_sector, Lance, LanceState};
pub use projectile::{Arrow, ArrowHit};
pub use state::{DamageOutcome, Vitality};
pub use sword::{SwingPhase, Sword};
pub use weapons::{
    nearest_enemy, CombatantView, Loadout, Weapon, WeaponContext, WeaponCore, WeaponEvent,
    WeaponKind, WeaponOwner,
};
