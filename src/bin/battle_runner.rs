//! Headless Battle Runner
//!
//! Runs a skirmish at a fixed step and prints a JSON or text summary.

use clap::Parser;
use serde::Serialize;

use skirmish::battle::{BattleOutcome, BattleState, BuildingSnapshot, DEFAULT_TICK_SECONDS, MAX_BATTLE_SECONDS};
use skirmish::core::error::Result;
use skirmish::core::types::{Team, Vec2};
use skirmish::core::BattleConfig;

/// Headless Battle Runner - fixed-step skirmish without a renderer
#[derive(Parser, Debug)]
#[command(name = "battle_runner")]
#[command(about = "Run a skirmish headless and print a summary")]
struct Args {
    /// Config file (TOML). Defaults to data/battle.toml, then built-in defaults.
    #[arg(long)]
    config: Option<String>,

    /// Random seed, overrides world.seed from the config
    #[arg(long)]
    seed: Option<u64>,

    /// Simulated seconds before the run stops undecided
    #[arg(long, default_value_t = 120.0)]
    duration: f32,

    /// Seconds per tick
    #[arg(long, default_value_t = DEFAULT_TICK_SECONDS)]
    dt: f32,

    /// Output format: json or text
    #[arg(long, default_value = "json")]
    format: String,

    /// Print every battle event to stderr
    #[arg(long, short = 'v')]
    verbose: bool,

    /// Leave the player standing still instead of patrolling
    #[arg(long)]
    player_idle: bool,
}

/// JSON output structure
#[derive(Serialize)]
struct RunSummary {
    outcome: BattleOutcome,
    ticks: u64,
    simulated_seconds: f32,
    seed: u64,
    units_spawned: u32,
    squads_spawned: u32,
    hits: u32,
    damage_dealt: f32,
    player_team_kills: u32,
    enemy_team_kills: u32,
    arrows_fired: u32,
    charges: u32,
    structure_damage: f32,
    player_survivors: usize,
    enemy_survivors: usize,
    player_alive: bool,
    buildings: Vec<BuildingSnapshot>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let level = if args.verbose { "skirmish=debug" } else { "skirmish=info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let mut config = load_config(args.config.as_deref())?;
    if let Some(seed) = args.seed {
        config.world.seed = seed;
    }
    let seed = config.world.seed;

    let mut state = BattleState::new(config)?;
    let duration = args.duration.min(MAX_BATTLE_SECONDS);
    let mut patrol = Patrol::new(state.config.world.map_width);

    tracing::info!(seed, duration, dt = args.dt, "battle started");

    while !state.is_finished() && state.time < duration {
        if !args.player_idle {
            if let Some(player) = state.player() {
                let intent = patrol.intent(player.position.x);
                state.set_player_intent(intent);
            }
        }

        let events = state.run_tick(args.dt);

        if args.verbose {
            for event in events.iter() {
                eprintln!(
                    "  [{}] {:?}: {}",
                    event.tick, event.event_type, event.description
                );
            }
        }
    }

    let snapshot = state.snapshot();
    let summary = RunSummary {
        outcome: state.outcome,
        ticks: state.tick,
        simulated_seconds: state.time,
        seed,
        units_spawned: state.stats.units_spawned,
        squads_spawned: state.stats.squads_spawned,
        hits: state.stats.hits,
        damage_dealt: state.stats.damage_dealt,
        player_team_kills: state.stats.player_team_kills,
        enemy_team_kills: state.stats.enemy_team_kills,
        arrows_fired: state.stats.arrows_fired,
        charges: state.stats.charges,
        structure_damage: state.stats.structure_damage,
        player_survivors: state.roster.alive_count(Team::Player),
        enemy_survivors: state.roster.alive_count(Team::Enemy),
        player_alive: state.player().is_some_and(|p| p.is_alive()),
        buildings: snapshot.buildings,
    };

    match args.format.as_str() {
        "json" => {
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
        "text" => print_text(&summary),
        _ => {
            eprintln!("Unknown format '{}', defaulting to json", args.format);
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
    }

    Ok(())
}

fn load_config(path: Option<&str>) -> Result<BattleConfig> {
    match path {
        Some(path) => BattleConfig::load(path),
        None => BattleConfig::load_named("battle").or_else(|e| {
            tracing::warn!(%e, "data/battle.toml unavailable, using built-in skirmish");
            Ok(BattleConfig::skirmish())
        }),
    }
}

fn print_text(summary: &RunSummary) {
    println!("Battle Result");
    println!("=============");
    println!("Outcome: {:?}", summary.outcome);
    println!("Ticks: {} ({:.1}s simulated)", summary.ticks, summary.simulated_seconds);
    println!("Squads spawned: {} ({} units)", summary.squads_spawned, summary.units_spawned);
    println!("Hits: {} for {:.0} damage", summary.hits, summary.damage_dealt);
    println!("Kills: player side {}, enemy side {}", summary.player_team_kills, summary.enemy_team_kills);
    println!("Arrows: {}, charges: {}", summary.arrows_fired, summary.charges);
    println!("Survivors: player side {}, enemy side {}", summary.player_survivors, summary.enemy_survivors);
    println!("Player alive: {}", summary.player_alive);
    for building in &summary.buildings {
        println!(
            "Building {} ({:?}): {:.0}% health, {} squads",
            building.id.0,
            building.team,
            building.health_ratio * 100.0,
            building.spawns
        );
    }
    println!();
    println!("Seed: {}", summary.seed);
}

/// Scripted stand-in for a human: ride back and forth across the middle
struct Patrol {
    left: f32,
    right: f32,
    heading: f32,
}

impl Patrol {
    fn new(map_width: f32) -> Self {
        Self {
            left: map_width * 0.3,
            right: map_width * 0.7,
            heading: 1.0,
        }
    }

    fn intent(&mut self, x: f32) -> Vec2 {
        if x >= self.right {
            self.heading = -1.0;
        } else if x <= self.left {
            self.heading = 1.0;
        }
        Vec2::new(self.heading, 0.0)
    }
}
