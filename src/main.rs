//! Wall Climber headless runner
//!
//! Usage: `wall-climber [tuning.json] [seconds]`
//!
//! Drives the simulation through the fixed-step accumulator with an
//! autopilot: whenever the player clings to a wall it waits for the aim to
//! swing, presses, charges for a while and releases. Finished runs go into
//! the climb records.

use std::env;
use std::process::ExitCode;
use std::time::{SystemTime, UNIX_EPOCH};

use wall_climber::consts::{MAX_SUBSTEPS, SIM_DT};
use wall_climber::records::ClimbEntry;
use wall_climber::sim::{
    ActionInput, GameEvent, GamePhase, GameState, LaunchPhase, SessionBindings, StreamRequest, TickInput, tick,
};
use wall_climber::{ClimbRecords, Tuning};

const RECORDS_PATH: &str = "wall_climber_records.json";
/// Host frame time fed to the accumulator (a 45 Hz display)
const FRAME_DT: f32 = 1.0 / 45.0;
const DEFAULT_SECONDS: f32 = 60.0;

/// Scripted player: aim dwell, then a fixed-length charge
struct Autopilot {
    input: ActionInput,
    dwell: f32,
    charge: f32,
    on_wall_for: f32,
    holding_for: Option<f32>,
}

impl Autopilot {
    fn new(dwell: f32, charge: f32) -> Self {
        Self {
            input: ActionInput::new(),
            dwell,
            charge,
            on_wall_for: 0.0,
            holding_for: None,
        }
    }

    /// Feed device-level events for the coming tick
    fn drive(&mut self, state: &GameState, dt: f32) {
        let sweeping = state
            .launcher
            .as_ref()
            .is_some_and(|l| l.phase() != LaunchPhase::Idle);

        if !state.is_on_wall() || !sweeping {
            self.on_wall_for = 0.0;
            if self.holding_for.take().is_some() {
                self.input.release();
            }
            return;
        }

        match self.holding_for.as_mut() {
            Some(held) => {
                *held += dt;
                if *held >= self.charge {
                    self.input.release();
                    self.holding_for = None;
                    self.on_wall_for = 0.0;
                }
            }
            None => {
                self.on_wall_for += dt;
                if self.on_wall_for >= self.dwell {
                    self.input.press();
                    self.holding_for = Some(0.0);
                }
            }
        }
    }
}

fn unix_millis() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs_f64() * 1000.0)
        .unwrap_or(0.0)
}

fn main() -> ExitCode {
    env_logger::init();

    let mut args = env::args().skip(1);
    let tuning = match args.next() {
        Some(path) => match Tuning::load(&path) {
            Ok(tuning) => tuning,
            Err(err) => {
                log::error!("Failed to load tuning {}: {}", path, err);
                return ExitCode::FAILURE;
            }
        },
        None => Tuning::default(),
    };
    let seconds = args
        .next()
        .and_then(|s| s.parse::<f32>().ok())
        .filter(|s| *s > 0.0)
        .unwrap_or(DEFAULT_SECONDS);

    let mut records = ClimbRecords::load(RECORDS_PATH).unwrap_or_else(|err| {
        log::warn!("Ignoring unreadable climb records: {}", err);
        ClimbRecords::new()
    });

    let mut seed = unix_millis() as u64;
    let mut state = GameState::new(seed, tuning, SessionBindings::standard());
    let mut pilot = Autopilot::new(0.25, 0.6);

    let mut accumulator = 0.0;
    let mut elapsed = 0.0;
    let mut launches = 0u32;
    let mut spawns = 0u64;
    let mut runs = 0u32;

    log::info!("Wall Climber (headless) running {:.0}s of simulated time", seconds);

    while elapsed < seconds {
        accumulator += FRAME_DT;
        elapsed += FRAME_DT;

        let mut substeps = 0;
        while accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
            pilot.drive(&state, SIM_DT);
            let input = TickInput {
                action: pilot.input.snapshot(),
                restart: None,
            };
            tick(&mut state, &input, SIM_DT);
            accumulator -= SIM_DT;
            substeps += 1;

            spawns += state
                .requests
                .iter()
                .filter(|r| matches!(r, StreamRequest::Spawn { .. }))
                .count() as u64;

            for event in &state.events {
                match event {
                    GameEvent::Launched(launch) => {
                        launches += 1;
                        log::debug!("launch #{} at {:.1} deg, force {:.1}", launches, launch.angle_deg, launch.force);
                    }
                    GameEvent::PlayerHit { kind, id } => log::info!("Hit {:?} #{}", kind, id),
                    GameEvent::GameOver { score } => log::info!("Run over, score {}", score),
                }
            }

            if state.phase == GamePhase::GameOver {
                runs += 1;
                finish_run(&mut records, &state);
                seed = seed.wrapping_add(1);
                let restart = TickInput {
                    restart: Some(seed),
                    ..Default::default()
                };
                tick(&mut state, &restart, SIM_DT);
                pilot = Autopilot::new(0.25, 0.6);
            }
        }
    }

    if state.score.display() > 0 {
        runs += 1;
        finish_run(&mut records, &state);
    }

    let culled = state.walls.as_ref().map_or(0, |m| m.culled_total())
        + state.hazards.as_ref().map_or(0, |m| m.culled_total())
        + state.flyers.as_ref().map_or(0, |m| m.culled_total());
    log::info!(
        "Done: {} run(s), {} launches, {} spawns ({} reclaimed this run), current score {}, best {}",
        runs,
        launches,
        spawns,
        culled,
        state.score.display(),
        records.top_score().unwrap_or(0)
    );
    for error in &state.disabled {
        log::warn!("Subsystem was disabled: {}", error);
    }

    if let Err(err) = records.save(RECORDS_PATH) {
        log::error!("Failed to save climb records: {}", err);
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}

fn finish_run(records: &mut ClimbRecords, state: &GameState) {
    let entry = ClimbEntry {
        score: state.score.display(),
        height: state.score.distance,
        seed: state.seed,
        timestamp: unix_millis(),
    };
    if let Some(rank) = records.add_run(entry) {
        log::info!("New climb record #{} ({} points)", rank, state.score.display());
    }
}
