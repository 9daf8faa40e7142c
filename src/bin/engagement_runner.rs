//! Headless Engagement Runner
//!
//! Plays one squad through a single sector engagement and prints a summary.
//! The tokio clock drives every roll animation.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use danger_close::core::config::EngineConfig;
use danger_close::core::error::{EngineError, Result};
use danger_close::core::types::CombatantId;
use danger_close::engagement::{
    AdvanceResult, EngagementEngine, EngagementStatus, EngineEvent, InMemoryMission,
    InMemoryRoster, MemoryLog,
};
use danger_close::mission::{roll_objective, roll_sector, Difficulty, HardTarget, SectorContent, ThreatLevel};
use danger_close::squad::{
    parse_roster, Armor, Combatant, DefensivePosition, Gear, Intent, OffensivePosition, Weapon,
};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::Serialize;
use tokio::time::{interval, Instant, Interval, MissedTickBehavior};

type Engine = EngagementEngine<InMemoryRoster, InMemoryMission, MemoryLog>;

/// Headless Engagement Runner - one squad, one sector
#[derive(Parser, Debug)]
#[command(name = "engagement_runner")]
#[command(about = "Resolve a squad engagement against a generated sector")]
struct Args {
    /// Threat level of the sector (1-4)
    #[arg(long, default_value_t = 2)]
    threat: u8,

    /// Engine config file (TOML)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Stored roster document (JSON); a demo squad is used if omitted
    #[arg(long)]
    roster: Option<PathBuf>,

    /// Squad name used in log lines
    #[arg(long, default_value = "Viper")]
    squad: String,

    /// Maximum exchanges before the engagement is called
    #[arg(long, default_value_t = 6)]
    max_exchanges: u32,

    /// Random seed for deterministic runs
    #[arg(long)]
    seed: Option<u64>,

    /// Hold the sector as a defense objective instead of pushing for victory
    #[arg(long)]
    defend: bool,

    /// Skip the roll animations instead of waiting them out
    #[arg(long)]
    instant: bool,

    /// Output format: json or text
    #[arg(long, default_value = "json")]
    format: String,

    /// Enable debug tracing
    #[arg(long, short = 'v')]
    verbose: bool,
}

/// JSON output structure
#[derive(Serialize)]
struct EngagementSummary {
    seed: u64,
    objective: String,
    sector: String,
    threat: String,
    advance_total: Option<i32>,
    advance_outcome: Option<String>,
    exchanges: u32,
    momentum: i8,
    status: String,
    log: Vec<String>,
}

/// Host clock feeding the roll controllers
enum HostClock {
    Realtime { epoch: Instant, ticker: Interval },
    Simulated { now: Duration },
}

impl HostClock {
    fn new(instant: bool, tick: Duration) -> Self {
        if instant {
            Self::Simulated {
                now: Duration::ZERO,
            }
        } else {
            let mut ticker = interval(tick);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            Self::Realtime {
                epoch: Instant::now(),
                ticker,
            }
        }
    }

    fn now(&self) -> Duration {
        match self {
            Self::Realtime { epoch, .. } => epoch.elapsed(),
            Self::Simulated { now } => *now,
        }
    }

    /// Wait for the next deadline of the engine
    async fn wait(&mut self, engine: &Engine) {
        match self {
            Self::Realtime { ticker, .. } => {
                ticker.tick().await;
            }
            Self::Simulated { now } => {
                *now += engine.next_deadline(*now).unwrap_or_default();
            }
        }
    }
}

/// Drive the clock until every roll in flight has finalized
async fn settle(engine: &mut Engine, clock: &mut HostClock) -> Vec<EngineEvent> {
    let mut events = Vec::new();
    while engine.is_rolling() {
        clock.wait(engine).await;
        events.extend(engine.tick(clock.now()));
    }
    events
}

fn demo_squad() -> Vec<Combatant> {
    vec![
        Combatant::new(CombatantId(1), "Hale")
            .with_weapon(Weapon::AssaultRifle)
            .with_armor(Armor::Medium),
        Combatant::new(CombatantId(2), "Okafor")
            .with_weapon(Weapon::MarksmanRifle)
            .with_armor(Armor::Light)
            .with_gear(Gear::SniperRifle),
        Combatant::new(CombatantId(3), "Reyes")
            .with_weapon(Weapon::Carbine)
            .with_armor(Armor::Heavy)
            .with_gear(Gear::HeavyMachineGun),
        Combatant::new(CombatantId(4), "Lindqvist")
            .with_weapon(Weapon::AssaultRifle)
            .with_armor(Armor::Medium)
            .with_gear(Gear::Medkit),
        Combatant::new(CombatantId(5), "Tamura")
            .with_weapon(Weapon::Carbine)
            .with_armor(Armor::Light)
            .with_gear(Gear::Demolitions),
        Combatant::new(CombatantId(6), "Vance").with_weapon(Weapon::AssaultRifle),
    ]
}

fn load_squad(args: &Args) -> Result<Vec<Combatant>> {
    match &args.roster {
        Some(path) => parse_roster(&std::fs::read_to_string(path)?),
        None => Ok(demo_squad()),
    }
}

/// Gear holders dig in; everyone else fires from where they stand
fn order_fire(engine: &mut Engine) {
    for combatant in engine.squad() {
        if combatant.is_incapacitated() {
            engine.set_intent(combatant.id, None);
            continue;
        }
        if combatant.has_gear(Gear::SniperRifle) || combatant.has_gear(Gear::HeavyMachineGun) {
            engine.set_defensive_position(combatant.id, DefensivePosition::Fortified);
        }
        if combatant.offensive_position == OffensivePosition::Limited {
            engine.set_offensive_position(combatant.id, OffensivePosition::Engaged);
        }
        engine.set_intent(combatant.id, Some(Intent::Fire));
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let args = Args::parse();

    let filter = if args.verbose {
        "danger_close=debug,engagement_runner=debug"
    } else {
        "danger_close=info,engagement_runner=info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let mut config = match &args.config {
        Some(path) => EngineConfig::load(path)?,
        None => EngineConfig::default(),
    };
    let seed = args.seed.or(config.seed).unwrap_or_else(rand::random);
    config.seed = Some(seed);
    let mut rng = ChaCha8Rng::seed_from_u64(seed);

    let threat = ThreatLevel::from_number(args.threat).ok_or_else(|| {
        EngineError::InvalidConfig(format!("threat level must be 1-4, got {}", args.threat))
    })?;
    let difficulty = match threat {
        ThreatLevel::One => Difficulty::Routine,
        ThreatLevel::Two | ThreatLevel::Three => Difficulty::Hazardous,
        ThreatLevel::Four => Difficulty::Desperate,
    };

    let objective = roll_objective(&mut rng);
    let mut sector = roll_sector("Objective Alpha", difficulty, &mut rng);
    sector.content = SectorContent::Threat(threat);
    let target = HardTarget::new("Comms Relay", config.default_hard_target_hits);
    let target_id = target.id;
    let sector = sector.with_hard_target(target);
    let sector_id = sector.id;

    tracing::info!("Mission: {}", objective);
    tracing::info!(
        "Sector {}: {} cover, {} space, {} weather, {}",
        sector.display_name(),
        sector.cover,
        sector.space,
        sector.weather,
        sector.content
    );

    let roster = InMemoryRoster::new(args.squad.clone(), load_squad(&args)?);
    let tick = config.advance_roll.tick_interval();
    let mut engine = EngagementEngine::new(
        config,
        roster,
        InMemoryMission::new(vec![sector]),
        MemoryLog::new(),
    )?;
    let mut clock = HostClock::new(args.instant, tick);

    engine.select_sector(Some(sector_id));
    for alert in engine.terrain_alerts() {
        tracing::warn!("Terrain alert: {}", alert);
    }

    // Advance into the sector
    let modifiers = engine.modifiers();
    tracing::info!("Advance modifier {}", modifiers.total());
    engine.start_advance_roll(clock.now());
    let advance: Option<AdvanceResult> = settle(&mut engine, &mut clock)
        .await
        .into_iter()
        .find_map(|event| match event {
            EngineEvent::AdvanceResolved(result) => Some(result),
            _ => None,
        });
    engine.apply_advance_outcome();

    if args.defend {
        engine.enter_defense_objective();
    }

    let mut exchanges = 0;
    let overwhelmed = advance.is_some_and(|r| r.outcome.positions().is_none());
    while !overwhelmed && engine.engagement_status().is_none() && exchanges < args.max_exchanges {
        exchanges += 1;
        tracing::debug!("Exchange {}", exchanges);

        order_fire(&mut engine);
        let pool = engine.offense_pool();

        engine.start_tactic_roll(clock.now());
        engine.start_dice_roll(pool.max(1), clock.now());
        let events = settle(&mut engine, &mut clock).await;
        engine.apply_tactic_outcome();

        let best = events.iter().find_map(|event| match event {
            EngineEvent::DicePoolResolved(result) => result.highest(),
            _ => None,
        });
        match best {
            Some(6) => {
                engine.adjust_hard_target_hits(target_id, -1);
                engine.adjust_momentum(1);
            }
            Some(face) if face >= 4 && pool > 0 => {
                engine.adjust_momentum(1);
            }
            _ => {
                engine.adjust_momentum(-1);
            }
        }

        for combatant in engine.squad() {
            if !combatant.is_incapacitated() {
                engine.injury_check(combatant.id);
            }
        }

        if args.defend {
            engine.complete_exchange();
        }
    }

    let final_sector = engine.selected_sector();
    let status = if overwhelmed {
        "Overwhelm".to_string()
    } else {
        match engine.engagement_status() {
            Some(EngagementStatus::Victory) => "Victory".to_string(),
            Some(EngagementStatus::Defeat) => "Defeat".to_string(),
            None => "Undecided".to_string(),
        }
    };

    let summary = EngagementSummary {
        seed,
        objective,
        sector: final_sector
            .as_ref()
            .map(|s| s.display_name().to_string())
            .unwrap_or_default(),
        threat: threat.to_string(),
        advance_total: advance.map(|r| r.total),
        advance_outcome: advance.map(|r| r.outcome.to_string()),
        exchanges,
        momentum: final_sector.map(|s| s.momentum).unwrap_or_default(),
        status,
        log: engine.log().texts().iter().map(|t| t.to_string()).collect(),
    };

    match args.format.as_str() {
        "text" => {
            println!("Engagement Result");
            println!("=================");
            println!("Objective: {}", summary.objective);
            println!("Sector: {} ({})", summary.sector, summary.threat);
            if let (Some(total), Some(outcome)) = (summary.advance_total, &summary.advance_outcome) {
                println!("Advance: {} ({})", outcome, total);
            }
            println!("Exchanges: {}", summary.exchanges);
            println!("Momentum: {}", summary.momentum);
            println!("Status: {}", summary.status);
            println!("Seed: {}", summary.seed);
            println!();
            for line in &summary.log {
                println!("{}", line);
            }
        }
        _ => {
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
    }

    Ok(())
}
