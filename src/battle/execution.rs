//! Battle execution loop
//!
//! Each tick: decisions -> physics -> collision -> weapons -> projectiles ->
//! combat -> removal -> spawners -> post-tick. Stages run strictly in order
//! and each one owns the roster while it runs.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::battle::ai::{AiContext, StructureView};
use crate::battle::building::Building;
use crate::battle::constants::FACING_THRESHOLD;
use crate::battle::roster::Roster;
use crate::battle::snapshot::BattleSnapshot;
use crate::battle::units::{StructureStrike, Unit, UnitKind};
use crate::combat::hitbox::{Damageable, HitboxResolver};
use crate::combat::lance::Lance;
use crate::combat::projectile::Arrow;
use crate::combat::weapons::{nearest_enemy, CombatantView, WeaponContext, WeaponEvent, WeaponOwner};
use crate::core::config::BattleConfig;
use crate::core::error::{Result, SkirmishError};
use crate::core::types::{BuildingId, EntityId, Facing, Team, Tick, Vec2};
use crate::physics::collision::CollisionResolver;

/// Battle outcome, decided by which side still has a standing base
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BattleOutcome {
    #[default]
    Undecided,
    Victory,
    Defeat,
    Draw,
}

/// Log entry for battle events
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BattleEvent {
    pub tick: Tick,
    pub event_type: BattleEventType,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum BattleEventType {
    UnitSpawned { unit_id: EntityId, kind: UnitKind, team: Team },
    SquadSpawned { building: BuildingId, count: usize },
    UnitKilled { unit_id: EntityId, killer: EntityId },
    UnitRemoved { unit_id: EntityId },
    HitLanded { attacker: EntityId, target: EntityId, damage: f32 },
    ArrowFired { owner: EntityId },
    ChargeStarted { unit_id: EntityId },
    ChargeEnded { unit_id: EntityId, hits: usize },
    BuildingDamaged { building: BuildingId, damage: f32 },
    BuildingDestroyed { building: BuildingId },
    BattleEnded { outcome: BattleOutcome },
}

/// Log of events from a single tick
#[derive(Debug, Clone, Default)]
pub struct BattleEventLog {
    pub events: Vec<BattleEvent>,
}

impl BattleEventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event_type: BattleEventType, description: String, tick: Tick) {
        self.events.push(BattleEvent {
            tick,
            event_type,
            description,
        });
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &BattleEvent> {
        self.events.iter()
    }

    pub fn count(&self, predicate: impl Fn(&BattleEventType) -> bool) -> usize {
        self.events.iter().filter(|e| predicate(&e.event_type)).count()
    }
}

/// Running totals across the whole battle
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BattleStats {
    pub hits: u32,
    pub damage_dealt: f32,
    pub player_team_kills: u32,
    pub enemy_team_kills: u32,
    pub arrows_fired: u32,
    pub charges: u32,
    pub squads_spawned: u32,
    pub units_spawned: u32,
    pub structure_damage: f32,
}

/// Complete battle state
#[derive(Debug)]
pub struct BattleState {
    pub config: BattleConfig,
    pub roster: Roster,
    pub buildings: Vec<Building>,
    pub arrows: Vec<Arrow>,
    pub hitboxes: HitboxResolver,
    collisions: CollisionResolver,
    rng: ChaCha8Rng,

    // Player
    pub player_id: Option<EntityId>,
    player_intent: Vec2,

    // Time
    pub tick: Tick,
    pub time: f32,
    pub paused: bool,
    pub outcome: BattleOutcome,

    pub stats: BattleStats,
    /// Events raised outside a tick, flushed by the next `run_tick`
    pending: BattleEventLog,
}

impl BattleState {
    /// Validate the config, place the bases and (optionally) the player
    pub fn new(config: BattleConfig) -> Result<Self> {
        config.validate()?;

        let buildings = config
            .buildings
            .iter()
            .enumerate()
            .map(|(i, b)| Building::from_config(BuildingId(i as u32), b))
            .collect();

        let mut state = Self {
            collisions: CollisionResolver::new(config.physics.collision_impulse_strength),
            rng: ChaCha8Rng::seed_from_u64(config.world.seed),
            roster: Roster::new(),
            buildings,
            arrows: Vec::new(),
            hitboxes: HitboxResolver::new(),
            player_id: None,
            player_intent: Vec2::ZERO,
            tick: 0,
            time: 0.0,
            paused: false,
            outcome: BattleOutcome::Undecided,
            stats: BattleStats::default(),
            pending: BattleEventLog::new(),
            config,
        };

        if state.config.player.enabled {
            let center = Vec2::new(
                state.config.world.map_width / 2.0,
                state.config.world.map_height / 2.0,
            );
            let id = state.spawn_unit(UnitKind::Player, Team::Player, center);
            state.player_id = Some(id);
        }

        tracing::info!(
            buildings = state.buildings.len(),
            player = state.player_id.is_some(),
            seed = state.config.world.seed,
            "battle created"
        );
        Ok(state)
    }

    /// Is the battle finished?
    pub fn is_finished(&self) -> bool {
        self.outcome != BattleOutcome::Undecided
    }

    pub fn pause(&mut self) {
        self.paused = true;
    }

    pub fn resume(&mut self) {
        self.paused = false;
    }

    /// Movement intent for the player unit; longer vectors are scaled to length 1
    pub fn set_player_intent(&mut self, intent: Vec2) {
        self.player_intent = intent.limit(1.0);
    }

    pub fn player_intent(&self) -> Vec2 {
        self.player_intent
    }

    pub fn player(&self) -> Option<&Unit> {
        self.player_id.and_then(|id| self.roster.get(id))
    }

    pub fn unit(&self, id: EntityId) -> Result<&Unit> {
        self.roster.get(id).ok_or(SkirmishError::EntityNotFound(id))
    }

    pub fn unit_mut(&mut self, id: EntityId) -> Result<&mut Unit> {
        self.roster.get_mut(id).ok_or(SkirmishError::EntityNotFound(id))
    }

    pub fn building(&self, id: BuildingId) -> Result<&Building> {
        self.buildings
            .get(id.0 as usize)
            .ok_or(SkirmishError::BuildingNotFound(id))
    }

    /// Register a unit with every system. Returns its id.
    pub fn add_unit(&mut self, unit: Unit) -> EntityId {
        self.stats.units_spawned += 1;
        self.pending.push(
            BattleEventType::UnitSpawned {
                unit_id: unit.id,
                kind: unit.kind,
                team: unit.team,
            },
            format!("{:?} {:?} joined the battle", unit.team, unit.kind),
            self.tick,
        );
        self.roster.insert(unit)
    }

    pub fn spawn_unit(&mut self, kind: UnitKind, team: Team, position: Vec2) -> EntityId {
        let unit = Unit::spawn(kind, team, position, &self.config);
        self.add_unit(unit)
    }

    /// Register a base. Its id is reassigned to its slot.
    pub fn add_building(&mut self, mut building: Building) -> BuildingId {
        let id = BuildingId(self.buildings.len() as u32);
        building.id = id;
        self.buildings.push(building);
        id
    }

    /// Inject an arrow created outside the weapon phase
    pub fn add_arrow(&mut self, arrow: Arrow) {
        self.arrows.push(arrow);
    }

    /// Damage a building directly. Returns true when this razed it.
    pub fn damage_building(&mut self, id: BuildingId, amount: f32) -> Result<bool> {
        let tick = self.tick;
        let building = self
            .buildings
            .get_mut(id.0 as usize)
            .ok_or(SkirmishError::BuildingNotFound(id))?;
        if !building.is_standing() {
            return Ok(false);
        }
        let razed = building.take_damage(amount);
        self.stats.structure_damage += amount;
        self.pending.push(
            BattleEventType::BuildingDamaged {
                building: id,
                damage: amount,
            },
            format!("Building {} took {amount} damage", id.0),
            tick,
        );
        if razed {
            tracing::info!(building = id.0, "building destroyed");
            self.pending.push(
                BattleEventType::BuildingDestroyed { building: id },
                format!("Building {} destroyed", id.0),
                tick,
            );
        }
        Ok(razed)
    }

    pub fn snapshot(&self) -> BattleSnapshot {
        BattleSnapshot {
            tick: self.tick,
            time: self.time,
            paused: self.paused,
            outcome: self.outcome,
            units: self.roster.iter().map(Into::into).collect(),
            buildings: self.buildings.iter().map(Into::into).collect(),
            arrows: self.arrows.iter().map(Into::into).collect(),
        }
    }

    /// Run a complete battle tick
    ///
    /// `dt` is clamped to `world.max_step`. Paused or finished battles only
    /// flush events raised since the last tick.
    pub fn run_tick(&mut self, dt: f32) -> BattleEventLog {
        let mut events = std::mem::take(&mut self.pending);

        if self.paused || self.is_finished() {
            return events;
        }
        let dt = dt.min(self.config.world.max_step);
        if dt <= 0.0 {
            return events;
        }

        // ===== PHASE 1: DECISIONS =====
        self.phase_decisions(dt);

        // ===== PHASE 2: PHYSICS =====
        self.phase_physics(dt);

        // ===== PHASE 3: COLLISION =====
        self.phase_collision();

        // ===== PHASE 4: WEAPONS =====
        self.phase_weapons(dt);

        // ===== PHASE 5: PROJECTILES =====
        self.phase_projectiles(dt);

        // ===== PHASE 6: COMBAT =====
        self.phase_combat(dt);

        // ===== PHASE 7: REMOVAL =====
        self.phase_removal();

        // ===== PHASE 8: SPAWNERS =====
        self.phase_spawners(dt);

        // ===== PHASE 9: POST-TICK =====
        self.phase_post_tick(dt);

        events.events.append(&mut self.pending.events);
        events
    }

    fn phase_decisions(&mut self, dt: f32) {
        let views = self.roster.views();
        let structures: Vec<StructureView> = self
            .buildings
            .iter()
            .map(|b| StructureView {
                id: b.id,
                team: b.team,
                position: b.position,
                standing: b.is_standing(),
            })
            .collect();

        let player_id = self.player_id;
        let intent = self.player_intent;
        let auto_attack_range = self.config.player.auto_attack_range;
        let mut strikes: Vec<StructureStrike> = Vec::new();

        for unit in self.roster.iter_mut() {
            if !unit.is_alive() {
                unit.hold();
                continue;
            }

            if Some(unit.id) == player_id {
                drive_player(unit, intent, auto_attack_range, &views);
                continue;
            }

            let actor = unit.ai_actor();
            let charge_ended = unit.loadout.lance_mut().is_some_and(Lance::take_charge_ended);
            let ctx = AiContext {
                combatants: &views,
                structures: &structures,
                charge_ended,
                dt,
            };
            let command = match unit.ai.as_mut() {
                Some(ai) => ai.update(&actor, &ctx),
                None => continue,
            };
            if let Some(strike) = unit.execute(&command) {
                strikes.push(strike);
            }
        }

        for strike in strikes {
            // Ids come from this tick's structure views, so the lookup cannot fail
            if let Err(err) = self.damage_building(strike.building, strike.damage) {
                tracing::warn!(%err, "structure strike dropped");
            }
        }
    }

    fn phase_physics(&mut self, dt: f32) {
        for unit in self.roster.iter_mut() {
            unit.integrate(dt);
        }
    }

    fn phase_collision(&mut self) {
        let contacts = self
            .collisions
            .resolve_all(self.roster.as_mut_slice(), &mut self.rng);
        if contacts > 0 {
            tracing::trace!(contacts, tick = self.tick, "collisions resolved");
        }

        let (width, height) = (self.config.world.map_width, self.config.world.map_height);
        for unit in self.roster.iter_mut() {
            unit.clamp_to_bounds(width, height);
        }
    }

    fn phase_weapons(&mut self, dt: f32) {
        let views = self.roster.views();
        let mut raised: Vec<(WeaponOwner, WeaponEvent)> = Vec::new();

        for unit in self.roster.iter_mut() {
            if !unit.is_alive() {
                continue;
            }
            let ctx = WeaponContext {
                owner: unit.weapon_owner(),
                combatants: &views,
                dt,
            };
            let mut out = Vec::new();
            unit.loadout.update(&ctx, &mut out);
            raised.extend(out.into_iter().map(|event| (ctx.owner, event)));
        }

        for (owner, event) in raised {
            self.apply_weapon_event(owner, event);
        }
    }

    fn apply_weapon_event(&mut self, owner: WeaponOwner, event: WeaponEvent) {
        match event {
            WeaponEvent::SpawnHitbox(hitbox) => self.hitboxes.add(hitbox),
            WeaponEvent::SpawnArrow(arrow) => {
                self.stats.arrows_fired += 1;
                self.pending.push(
                    BattleEventType::ArrowFired { owner: owner.id },
                    "Arrow loosed".to_string(),
                    self.tick,
                );
                self.arrows.push(arrow);
            }
            WeaponEvent::Strike {
                target,
                damage,
                knockback,
            } => self.strike(owner.id, target, damage, Some(knockback)),
            WeaponEvent::OwnerImpact { velocity_scale } => {
                if let Some(unit) = self.roster.get_mut(owner.id) {
                    unit.absorb_impact(velocity_scale);
                }
            }
            WeaponEvent::ChargeStarted => {
                tracing::debug!(unit = ?owner.id, "charge started");
                self.stats.charges += 1;
                self.pending.push(
                    BattleEventType::ChargeStarted { unit_id: owner.id },
                    "Lance leveled, charging".to_string(),
                    self.tick,
                );
            }
            WeaponEvent::ChargeEnded { hits } => {
                tracing::debug!(unit = ?owner.id, hits, "charge ended");
                self.pending.push(
                    BattleEventType::ChargeEnded {
                        unit_id: owner.id,
                        hits,
                    },
                    format!("Charge ended after {hits} hits"),
                    self.tick,
                );
            }
        }
    }

    /// Immediate damage from a lance impact or an arrow
    fn strike(&mut self, attacker: EntityId, target: EntityId, damage: f32, knockback: Option<Vec2>) {
        let Some(unit) = self.roster.get_mut(target) else {
            return;
        };
        let outcome = unit.take_damage(damage, knockback, &mut self.rng);
        if outcome.applied {
            self.record_hit(attacker, target, damage, outcome.killed);
        }
    }

    fn record_hit(&mut self, attacker: EntityId, target: EntityId, damage: f32, killed: bool) {
        self.stats.hits += 1;
        self.stats.damage_dealt += damage;
        self.pending.push(
            BattleEventType::HitLanded {
                attacker,
                target,
                damage,
            },
            format!("Hit for {damage}"),
            self.tick,
        );

        if !killed {
            return;
        }
        match self.roster.get(target).map(|u| u.team) {
            Some(Team::Enemy) => self.stats.player_team_kills += 1,
            Some(Team::Player) => self.stats.enemy_team_kills += 1,
            None => {}
        }
        tracing::debug!(?target, ?attacker, "unit killed");
        self.pending.push(
            BattleEventType::UnitKilled {
                unit_id: target,
                killer: attacker,
            },
            "Unit killed".to_string(),
            self.tick,
        );
    }

    fn phase_projectiles(&mut self, dt: f32) {
        let views = self.roster.views();
        let mut hits = Vec::new();
        for arrow in &mut self.arrows {
            if let Some(hit) = arrow.update(dt, &views) {
                hits.push((arrow.owner, hit));
            }
        }
        self.arrows.retain(|a| a.active);

        for (owner, hit) in hits {
            let knockback = (!hit.knockback.is_zero()).then_some(hit.knockback);
            self.strike(owner, hit.target, hit.damage, knockback);
        }
    }

    fn phase_combat(&mut self, dt: f32) {
        let reports = self
            .hitboxes
            .update(dt, self.roster.as_mut_slice(), &mut self.rng);
        for report in reports {
            self.record_hit(report.attacker, report.target, report.damage, report.killed);
        }
    }

    fn phase_removal(&mut self) {
        for unit in self.roster.remove_inactive() {
            self.pending.push(
                BattleEventType::UnitRemoved { unit_id: unit.id },
                format!("{:?} {:?} removed", unit.team, unit.kind),
                self.tick,
            );
        }
    }

    fn phase_spawners(&mut self, dt: f32) {
        let due: Vec<BuildingId> = self
            .buildings
            .iter_mut()
            .filter_map(|b| b.update(dt).then_some(b.id))
            .collect();

        for id in due {
            self.spawn_squad(id);
        }
    }

    /// Field one squad in front of a building
    fn spawn_squad(&mut self, id: BuildingId) {
        let Some(building) = self.buildings.get(id.0 as usize) else {
            return;
        };
        let team = building.team;
        let squad = &self.config.squad;
        let origin = building.spawn_origin(squad.forward_offset);

        let kinds: Vec<UnitKind> = std::iter::repeat(UnitKind::Infantry)
            .take(squad.infantry as usize)
            .chain(std::iter::repeat(UnitKind::Archer).take(squad.archers as usize))
            .chain(std::iter::repeat(UnitKind::Cavalry).take(squad.cavalry as usize))
            .collect();

        let (jitter_x, jitter_y) = (squad.jitter_x, squad.jitter_y);
        let (width, height) = (self.config.world.map_width, self.config.world.map_height);

        for kind in &kinds {
            let dx = self.rng.gen_range(-jitter_x..=jitter_x);
            let dy = self.rng.gen_range(-jitter_y..=jitter_y);
            let position = Vec2::new(
                (origin.x + dx).clamp(0.0, width),
                (origin.y + dy).clamp(0.0, height),
            );
            self.spawn_unit(*kind, team, position);
        }

        self.stats.squads_spawned += 1;
        tracing::debug!(building = id.0, ?team, size = kinds.len(), "squad spawned");
        self.pending.push(
            BattleEventType::SquadSpawned {
                building: id,
                count: kinds.len(),
            },
            format!("Building {} fielded {} units", id.0, kinds.len()),
            self.tick,
        );
    }

    fn phase_post_tick(&mut self, dt: f32) {
        // Check battle end
        if let Some(outcome) = check_battle_end(self) {
            self.outcome = outcome;
            tracing::info!(?outcome, tick = self.tick, time = self.time, "battle ended");
            self.pending.push(
                BattleEventType::BattleEnded { outcome },
                format!("Battle ended: {:?}", outcome),
                self.tick,
            );
        }

        // Advance clocks
        self.tick += 1;
        self.time += dt;
    }
}

/// Player movement follows the intent; weapons fire at the nearest enemy in reach
fn drive_player(unit: &mut Unit, intent: Vec2, auto_attack_range: f32, views: &[CombatantView]) {
    if intent.is_zero() {
        unit.hold();
    } else {
        unit.steer(intent);
        if intent.x.abs() > FACING_THRESHOLD {
            unit.facing = Facing::from_sign(intent.x);
        }
    }

    let Some(target) = nearest_enemy(views, unit.team, unit.position, auto_attack_range) else {
        return;
    };
    let owner = unit.weapon_owner();
    unit.loadout.trigger_first_in_range(&owner, target.position);
}

/// Check if battle should end
///
/// A side loses when every one of its buildings is razed. Battles without
/// buildings never end on their own.
pub fn check_battle_end(state: &BattleState) -> Option<BattleOutcome> {
    let lost = |team: Team| {
        let mut owned = state.buildings.iter().filter(|b| b.team == team).peekable();
        owned.peek().is_some() && owned.all(|b| !b.is_standing())
    };

    match (lost(Team::Player), lost(Team::Enemy)) {
        (true, true) => Some(BattleOutcome::Draw),
        (false, true) => Some(BattleOutcome::Victory),
        (true, false) => Some(BattleOutcome::Defeat),
        (false, false) => None,
    }
}
