use anyhow::Context;
use clap::Parser;
use merge_2048::config::GameConfig;
use merge_2048::engine::Game;
use merge_2048::serialization::{self, MemoryStore};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "inspect", about = "Print the contents of a saved merge-2048 game")]
struct Args {
    /// Saved game written by `merge-2048 --save`
    input: PathBuf,

    /// Dump the raw stored record as well
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let saved = serialization::read_from_path(&args.input)
        .with_context(|| format!("Failed to read '{}'", args.input.display()))?;

    if args.verbose {
        println!("{:#?}", saved);
    }

    // Loading validates dimensions, values and codes.
    let mut game = Game::with_seed(GameConfig::default(), MemoryStore::new(), 0);
    game.load(&saved)
        .with_context(|| format!("'{}' is not a valid saved game", args.input.display()))?;

    let state = game.state();
    println!("{}", game.grid());
    println!(
        "Turns: {}, Score: {}, Tiles: {}, Highest tile: {}, Status: {:?} (code {}), Personal best: {}",
        game.moves(),
        game.score(),
        game.grid().tile_count(),
        game.grid().highest_tile(),
        state.status(),
        state.code(),
        game.personal_best_display()
    );
    Ok(())
}
