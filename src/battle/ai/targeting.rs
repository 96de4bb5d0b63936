//! Target acquisition and re-resolution of weak target handles

use ordered_float::OrderedFloat;

use crate::battle::ai::{AiActor, AiContext, StructureView, Target};
use crate::combat::weapons::nearest_enemy;
use crate::core::types::Vec2;

/// Nearest enemy unit inside `chase_distance`, else optionally the nearest
/// standing enemy structure
pub fn acquire_target(
    actor: &AiActor,
    ctx: &AiContext<'_>,
    chase_distance: f32,
    allow_structures: bool,
) -> Option<Target> {
    if let Some(unit) = nearest_enemy(ctx.combatants, actor.team, actor.position, chase_distance) {
        return Some(Target::Unit(unit.id));
    }
    if !allow_structures {
        return None;
    }
    nearest_structure(ctx.structures, actor)
}

fn nearest_structure(structures: &[StructureView], actor: &AiActor) -> Option<Target> {
    structures
        .iter()
        .filter(|s| s.standing && s.team.is_hostile_to(actor.team))
        .min_by_key(|s| OrderedFloat(actor.position.distance(&s.position)))
        .map(|s| Target::Structure(s.id))
}

/// Current position of a target, `None` once it is dead, removed or razed
pub fn resolve_target(target: Target, ctx: &AiContext<'_>) -> Option<Vec2> {
    match target {
        Target::Unit(id) => ctx
            .combatants
            .iter()
            .find(|c| c.id == id && c.alive && c.active)
            .map(|c| c.position),
        Target::Structure(id) => ctx
            .structures
            .iter()
            .find(|s| s.id == id && s.standing)
            .map(|s| s.position),
    }
}
