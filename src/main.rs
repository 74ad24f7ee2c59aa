use anyhow::Result;
use clap::Parser;
use engine::{run_null_script, Game, Side};

mod demo;

#[derive(Parser, Debug)]
struct Args {
    #[arg(long, help = "RNG seed for the AI controllers")]
    seed: Option<u64>,

    #[arg(long, default_value_t = 40, help = "Round limit before giving up")]
    turns: i32,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    // Headless spectator run of the demo scenario with built-in AI on
    // both sides and a script that acks every hook.
    let (mut game, handle) =
        Game::new(demo::house(), demo::catalog(), Side::None)?;
    if let Some(seed) = args.seed {
        game.reseed(seed);
    }
    demo::populate(&mut game)?;
    let script = std::thread::spawn(move || run_null_script(handle));

    while game.winner().is_none() && game.turn <= args.turns {
        game.think(16);
    }
    match game.winner() {
        Some(side) => println!("{side:?} win on turn {}", game.turn),
        None => println!("no winner after {} turns", args.turns),
    }

    drop(game);
    script
        .join()
        .map_err(|_| anyhow::anyhow!("script thread panicked"))?;
    Ok(())
}
