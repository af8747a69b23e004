use anyhow::{bail, Context};
use clap::Parser;
use env_logger::Env;
use merge_2048::config::GameConfig;
use merge_2048::engine::{Direction, Game};
use merge_2048::serialization::{self, FileStore, MemoryStore, ScoreStore};
use rand::{rngs::StdRng, Rng, SeedableRng};
use std::path::PathBuf;

/// One display refresh at 60 Hz.
const FRAME_NANOS: u64 = 16_666_667;

#[derive(Debug, Parser)]
#[command(name = "merge-2048", about = "Play a 2048 session from scripted or random moves")]
struct Args {
    /// RNG seed for tile spawns (and for --random moves); entropy when absent
    #[arg(long)]
    seed: Option<u64>,

    /// Move script: U/R/D/L letters or 0-3 codes, separators ignored (e.g. "LLUR" or "3,3,0,1")
    #[arg(long)]
    moves: Option<String>,

    /// Append this many uniformly random moves after the script
    #[arg(long, default_value_t = 0)]
    random: usize,

    /// TOML file with gameplay and timing settings
    #[arg(long)]
    config: Option<PathBuf>,

    /// File that keeps the personal best between sessions
    #[arg(long)]
    best_file: Option<PathBuf>,

    /// Resume from a saved game instead of starting fresh
    #[arg(long)]
    load: Option<PathBuf>,

    /// Write the final state here
    #[arg(long)]
    save: Option<PathBuf>,

    /// Keep playing after a win
    #[arg(long)]
    keep_going: bool,

    /// Only print the summary
    #[arg(short, long)]
    quiet: bool,
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => GameConfig::from_toml(path)
            .with_context(|| format!("Failed to read config '{}'", path.display()))?,
        None => GameConfig::default(),
    };
    let store: Box<dyn ScoreStore> = match &args.best_file {
        Some(path) => Box::new(FileStore::new(path)),
        None => Box::new(MemoryStore::new()),
    };
    let mut game = match args.seed {
        Some(seed) => Game::with_seed(config, store, seed),
        None => Game::new(config, store),
    };

    if let Some(path) = &args.load {
        let saved = serialization::read_from_path(path)
            .with_context(|| format!("Failed to read saved game '{}'", path.display()))?;
        game.load(&saved)
            .with_context(|| format!("Saved game '{}' does not fit this board", path.display()))?;
    }

    let mut directions = match &args.moves {
        Some(script) => parse_moves(script)?,
        None => Vec::new(),
    };
    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(1)),
        None => StdRng::from_entropy(),
    };
    directions.extend((0..args.random).map(|_| Direction::ALL[rng.gen_range(0..4)]));

    if !args.quiet {
        println!("{}", game.grid());
    }

    for direction in directions {
        if game.game_won() && args.keep_going {
            game.continue_playing();
        }
        if !game.is_active() {
            break;
        }
        let outcome = game.make_move(direction);
        let frames = settle(&mut game);
        if !args.quiet && outcome.moved {
            println!("{:?}: +{} points, {} merges, {} frames", direction, outcome.points, outcome.merges, frames);
            println!("{}", game.grid());
        }
    }

    println!(
        "Turns: {}, Score: {}, Highest tile: {}, Status: {:?}, Personal best: {}",
        game.moves(),
        game.score(),
        game.grid().highest_tile(),
        game.status(),
        game.personal_best_display()
    );

    if let Some(path) = &args.save {
        serialization::write_to_path(path, &game.save())
            .with_context(|| format!("Failed to write saved game '{}'", path.display()))?;
    }
    Ok(())
}

/// Tick frames until every animation of the last move has run out.
fn settle<S: ScoreStore>(game: &mut Game<S>) -> u32 {
    let mut frames = 0;
    while game.animations().is_animation_active() {
        game.tick(FRAME_NANOS);
        frames += 1;
    }
    frames
}

fn parse_moves(script: &str) -> anyhow::Result<Vec<Direction>> {
    let mut directions = Vec::with_capacity(script.len());
    for ch in script.chars() {
        let direction = match ch.to_ascii_uppercase() {
            'U' | '0' => Direction::Up,
            'R' | '1' => Direction::Right,
            'D' | '2' => Direction::Down,
            'L' | '3' => Direction::Left,
            c if c.is_whitespace() || c == ',' => continue,
            other => bail!("Unknown move '{}' in script", other),
        };
        directions.push(direction);
    }
    Ok(directions)
}
