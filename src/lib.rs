//! Skirmish - real-time 2D battle simulation core

pub mod battle;
pub mod combat;
pub mod core;
pub mod physics;
