//! Headless enemy simulation runner.
//!
//! Loads a [`SimConfig`] from an INI file, spawns a scenario of demo entities
//! and runs the fixed-step simulation for a number of frames, logging what
//! happened along the way.
//!
//! # Scenario files
//!
//! A scenario is a JSON array of spawn requests. Positions are in tiles and
//! get scaled by `ppm`; every other key is passed through to the definition.
//!
//! ```json
//! [
//!   { "tag": "dummy",   "config": { "position": [0.0, 0.0], "shoot_every": 0.5 } },
//!   { "tag": "bouncer", "config": { "position": [5.0, 0.0], "bounce_delay": 1.0 } }
//! ]
//! ```
//!
//! Without `--scenario` a built-in arena with one of each demo is used, its
//! positions jittered by `--seed`.
//!
//! # Running
//!
//! ```sh
//! RUST_LOG=debug cargo run --release -- --ticks 600 --seed 7
//! ```

use std::path::{Path, PathBuf};

use clap::Parser;
use enemysim::enemies::{self, bouncer, dummy, magnet, nest, saucer, springer};
use enemysim::error::{SimError, SimResult};
use enemysim::events::damage::DamageEvent;
use enemysim::events::lifecycle::LifecycleEvent;
use enemysim::resources::cullbounds::CullBounds;
use enemysim::resources::simconfig::SimConfig;
use enemysim::simulation::Simulation;
use enemysim::spawn::{SpawnConfig, SpawnValue};
use glam::Vec2;
use log::{debug, info, warn};
use rustc_hash::FxHashMap;
use serde::Deserialize;

/// Enemy simulation, headless
#[derive(Parser)]
#[command(version, about = "Runs the enemy simulation without a renderer.")]
struct Cli {
    /// INI file with [simulation] and [culling] sections.
    #[arg(long, value_name = "PATH", default_value = "./enemysim.ini")]
    config: PathBuf,

    /// JSON scenario to spawn instead of the built-in arena.
    #[arg(long, value_name = "PATH")]
    scenario: Option<PathBuf>,

    /// Frames to run.
    #[arg(long, default_value_t = 600)]
    ticks: u32,

    /// Seed for the built-in arena's position jitter.
    #[arg(long)]
    seed: Option<u64>,

    /// Real seconds per frame fed to the accumulator. Defaults to the fixed tick.
    #[arg(long)]
    dt: Option<f32>,
}

#[derive(Debug, Deserialize)]
struct ScenarioEntry {
    tag: String,
    #[serde(default)]
    config: SpawnConfig,
}

fn load_scenario(path: &Path) -> SimResult<Vec<ScenarioEntry>> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| SimError::Config(format!("failed to read {path:?}: {e}")))?;
    Ok(serde_json::from_str(&text)?)
}

fn arena(rng: &mut fastrand::Rng) -> Vec<ScenarioEntry> {
    let mut jitter = |x: f32| x + rng.f32() * 2.0 - 1.0;
    let at = |tag: &str, position: Vec2| ScenarioEntry {
        tag: tag.to_string(),
        config: SpawnConfig::new().with("position", position),
    };
    let mut entries = vec![
        at(dummy::TAG, Vec2::new(0.0, 0.0)),
        at(bouncer::TAG, Vec2::new(jitter(5.0), 0.0)),
        at(saucer::TAG, Vec2::new(jitter(7.0), 4.0)),
        at(magnet::TAG, Vec2::new(jitter(-6.0), 0.5)),
        at(nest::TAG, Vec2::new(jitter(-3.0), 6.0)),
        at(springer::TAG, Vec2::new(jitter(3.0), 0.0)),
    ];
    entries[0].config.set("shoot_every", 0.5f32);
    entries
}

/// Positions are given in tiles; the definitions expect world units.
fn scale_position(config: &mut SpawnConfig, ppm: f32) {
    if let Some(SpawnValue::Vec2(p)) = config.get("position").cloned() {
        config.set("position", p * ppm);
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let mut config = SimConfig::with_path(cli.config.clone());
    if let Err(e) = config.load_from_file() {
        warn!("{e}; using defaults");
    }
    let ppm = config.ppm;
    let camera = Vec2::new(config.camera_width, config.camera_height) * ppm;
    let frame_dt = cli.dt.unwrap_or(config.fixed_dt);

    let mut sim = Simulation::new(config);
    enemies::register_all(&mut sim);
    sim.set_cull_bounds(CullBounds::centered(Vec2::new(0.0, camera.y / 4.0), camera));

    let entries = match &cli.scenario {
        Some(path) => match load_scenario(path) {
            Ok(entries) => entries,
            Err(e) => {
                log::error!("scenario: {e}");
                std::process::exit(1);
            }
        },
        None => {
            let mut rng = match cli.seed {
                Some(seed) => fastrand::Rng::with_seed(seed),
                None => fastrand::Rng::new(),
            };
            arena(&mut rng)
        }
    };

    for mut entry in entries {
        scale_position(&mut entry.config, ppm);
        if let Err(e) = sim.spawn(&entry.tag, entry.config) {
            warn!("skipping {}: {e}", entry.tag);
        }
    }
    info!("spawned {} entities", sim.live_count());

    let mut ticks = 0;
    let mut damage_dealt = 0;
    let mut kills = 0;
    let mut sounds: FxHashMap<String, usize> = FxHashMap::default();
    let mut despawns: FxHashMap<String, usize> = FxHashMap::default();

    for _ in 0..cli.ticks {
        ticks += sim.advance(frame_dt);

        for hit in sim.drain_messages::<DamageEvent>() {
            debug!(
                "hit: {:?} -> {:?} for {}{}",
                hit.damager,
                hit.target,
                hit.amount,
                if hit.lethal { " (lethal)" } else { "" }
            );
            damage_dealt += hit.amount.max(0) as i64;
            kills += usize::from(hit.lethal);
        }
        for event in sim.drain_messages::<LifecycleEvent>() {
            if let LifecycleEvent::Despawned { tag, reason, .. } = event {
                debug!("despawned {tag}: {reason:?}");
                *despawns.entry(tag).or_default() += 1;
            }
        }
        for sound in sim.drain_sounds() {
            *sounds.entry(sound.tag).or_default() += 1;
        }
    }

    info!(
        "ran {ticks} ticks, {:.2}s simulated, {} entities alive",
        sim.time().elapsed,
        sim.live_count()
    );
    info!("damage dealt: {damage_dealt}, lethal hits: {kills}");
    let mut despawns: Vec<_> = despawns.into_iter().collect();
    despawns.sort();
    for (tag, count) in despawns {
        info!("  despawned {count:>4} x {tag}");
    }
    let mut sounds: Vec<_> = sounds.into_iter().collect();
    sounds.sort();
    for (tag, count) in sounds {
        info!("  played    {count:>4} x {tag}");
    }
}
