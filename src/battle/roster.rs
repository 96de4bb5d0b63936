//! Roster - every live unit plus an id index
//!
//! Units sit in a dense Vec so collision and hit resolution can walk a plain
//! slice. The index maps ids to slots and is patched on swap-remove.

use ahash::AHashMap;

use crate::battle::units::Unit;
use crate::combat::weapons::CombatantView;
use crate::core::types::{EntityId, Team};

#[derive(Debug, Clone, Default)]
pub struct Roster {
    units: Vec<Unit>,
    index: AHashMap<EntityId, usize>,
}

impl Roster {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, unit: Unit) -> EntityId {
        let id = unit.id;
        self.index.insert(id, self.units.len());
        self.units.push(unit);
        id
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.index.contains_key(&id)
    }

    pub fn get(&self, id: EntityId) -> Option<&Unit> {
        self.index.get(&id).and_then(|&i| self.units.get(i))
    }

    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Unit> {
        match self.index.get(&id) {
            Some(&i) => self.units.get_mut(i),
            None => None,
        }
    }

    pub fn remove(&mut self, id: EntityId) -> Option<Unit> {
        let slot = self.index.remove(&id)?;
        let unit = self.units.swap_remove(slot);
        if let Some(moved) = self.units.get(slot) {
            self.index.insert(moved.id, slot);
        }
        Some(unit)
    }

    /// Drop every unit whose death fade has finished
    pub fn remove_inactive(&mut self) -> Vec<Unit> {
        let finished: Vec<EntityId> = self
            .units
            .iter()
            .filter(|u| !u.is_active())
            .map(|u| u.id)
            .collect();
        finished.into_iter().filter_map(|id| self.remove(id)).collect()
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Unit> {
        self.units.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Unit> {
        self.units.iter_mut()
    }

    pub fn as_mut_slice(&mut self) -> &mut [Unit] {
        &mut self.units
    }

    pub fn ids(&self) -> Vec<EntityId> {
        self.units.iter().map(|u| u.id).collect()
    }

    /// Snapshot of every unit for targeting this tick
    pub fn views(&self) -> Vec<CombatantView> {
        self.units.iter().map(Unit::combatant_view).collect()
    }

    pub fn alive_count(&self, team: Team) -> usize {
        self.units
            .iter()
            .filter(|u| u.team == team && u.is_alive())
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::battle::units::UnitKind;
    use crate::core::config::BattleConfig;
    use crate::core::types::Vec2;

    fn unit(team: Team) -> Unit {
        Unit::spawn(UnitKind::Infantry, team, Vec2::ZERO, &BattleConfig::default())
    }

    #[test]
    fn test_insert_and_lookup() {
        let mut roster = Roster::new();
        let id = roster.insert(unit(Team::Player));
        assert!(roster.contains(id));
        assert_eq!(roster.get(id).map(|u| u.id), Some(id));
        assert_eq!(roster.len(), 1);
    }

    #[test]
    fn test_swap_remove_keeps_index_valid() {
        let mut roster = Roster::new();
        let a = roster.insert(unit(Team::Player));
        let b = roster.insert(unit(Team::Enemy));
        let c = roster.insert(unit(Team::Enemy));

        assert!(roster.remove(a).is_some());
        assert_eq!(roster.get(c).map(|u| u.id), Some(c));
        assert_eq!(roster.get(b).map(|u| u.id), Some(b));
        assert!(roster.get(a).is_none());
        assert!(roster.remove(a).is_none());
    }

    #[test]
    fn test_remove_inactive() {
        let mut roster = Roster::new();
        let keep = roster.insert(unit(Team::Player));
        let gone = roster.insert(unit(Team::Enemy));
        if let Some(u) = roster.get_mut(gone) {
            u.vitality.active = false;
        }

        let removed = roster.remove_inactive();
        assert_eq!(removed.len(), 1);
        assert_eq!(removed[0].id, gone);
        assert!(roster.contains(keep));
        assert_eq!(roster.alive_count(Team::Player), 1);
        assert_eq!(roster.alive_count(Team::Enemy), 0);
    }
}
