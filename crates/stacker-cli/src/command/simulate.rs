use std::{path::PathBuf, time::Duration};

use rand::Rng as _;
use serde::Serialize;
use stacker_engine::{EventLog, GameConfig, GameEvent, GameSession, PieceSeed};

use crate::{
    script::{Script, ScriptStep},
    util::{self, Output},
};

const DEFAULT_PIECES: usize = 10;

#[derive(Default, Debug, Clone, clap::Args)]
pub(crate) struct SimulateArg {
    /// Config file; the built-in defaults are used when omitted
    #[arg(long)]
    config: Option<PathBuf>,
    /// Piece seed as 32 hex digits; random when omitted
    #[arg(long)]
    seed: Option<PieceSeed>,
    /// Input script: L/R shift, C/A rotate, D drop, H hard drop, `.` waits
    /// one fall interval. Every other command also advances time by the
    /// slide duration. Defaults to hard-dropping 10 pieces.
    #[arg(long)]
    script: Option<Script>,
    /// Stop once this many pieces have been placed
    #[arg(long)]
    pieces: Option<u64>,
    /// Print a JSON snapshot instead of text
    #[arg(long)]
    json: bool,
    /// Output file path for the JSON snapshot
    #[arg(long, requires = "json")]
    output: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
struct Report {
    seed: PieceSeed,
    state: String,
    pieces_dealt: u64,
    duration_ms: u64,
    /// Grid rows, top row first.
    grid: Vec<String>,
    events: Vec<GameEvent>,
}

pub(crate) fn run(arg: &SimulateArg) -> anyhow::Result<()> {
    let config = util::load_config(arg.config.as_ref())?;
    let seed = arg.seed.unwrap_or_else(|| rand::rng().random());
    let script = arg
        .script
        .clone()
        .unwrap_or_else(|| Script::hard_drops(DEFAULT_PIECES));

    eprintln!(
        "Simulating {} steps with seed {seed}...",
        script.steps().len()
    );
    let report = simulate(&config, seed, &script, arg.pieces)?;
    eprintln!(
        "Finished: {} after {} pieces ({} events)",
        report.state,
        report.pieces_dealt,
        report.events.len()
    );

    if arg.json {
        return Output::save_json(&report, arg.output.clone());
    }
    for row in &report.grid {
        println!("{row}");
    }
    println!();
    for event in &report.events {
        println!("{event:?}");
    }
    Ok(())
}

fn simulate(
    config: &GameConfig,
    seed: PieceSeed,
    script: &Script,
    piece_limit: Option<u64>,
) -> anyhow::Result<Report> {
    let mut session = GameSession::with_seed(config, seed)?;
    let log = EventLog::new();
    session.subscribe(log.listener());

    let step_time = config.slide_duration();
    session.tick(Duration::ZERO);
    for step in script.steps() {
        if piece_limit.is_some_and(|limit| session.pieces_dealt() > limit) {
            break;
        }
        if session.session_state().is_game_over() {
            eprintln!("Game over, skipping the rest of the script");
            break;
        }
        match step {
            ScriptStep::Input(command) => {
                session.handle_input(*command);
                session.tick(step_time);
            }
            ScriptStep::Wait => session.tick(config.fall_interval()),
        }
    }

    Ok(Report {
        seed,
        state: format!("{:?}", session.session_state()),
        pieces_dealt: session.pieces_dealt(),
        duration_ms: u64::try_from(session.duration().as_millis()).unwrap_or(u64::MAX),
        grid: session
            .field()
            .grid()
            .to_string()
            .lines()
            .map(str::to_owned)
            .collect(),
        events: log.take(),
    })
}
