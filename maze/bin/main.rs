use std::thread;

use clap::Parser;
use maze::{
    util::render, Controller, ManualScheduler, MazeConfig, Outcome, Renderer, Snapshot, WallSet,
};
use rand::{rngs::StdRng, SeedableRng};

/// Generate a random maze and search it breadth first from the top edge to the bottom edge
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Number of cell columns
    #[arg(short = 'W', long, default_value_t = 48)]
    width: usize,

    /// Number of cell rows
    #[arg(short = 'H', long, default_value_t = 48)]
    height: usize,

    /// Seed for the maze generator
    #[arg(short, long)]
    seed: Option<u64>,

    /// Print every BFS layer as it is discovered
    #[arg(short, long)]
    animate: bool,

    /// Milliseconds between two animated layers
    #[arg(short, long, default_value_t = 10)]
    tempo: u64,
}

/// Keeps the latest frame around until the main loop prints it
#[derive(Default)]
struct Terminal {
    snapshot: Option<Snapshot>,
}

impl Renderer for Terminal {
    fn on_walls_generated(&mut self, walls: &WallSet) {
        log::debug!("maze has {} walls", walls.len());
        self.snapshot = None;
    }

    fn on_snapshot(&mut self, snapshot: &Snapshot) {
        self.snapshot = Some(snapshot.clone());
    }

    fn on_terminal(&mut self, outcome: &Outcome) {
        if let Outcome::PathFound(result) = outcome {
            log::debug!(
                "path enters through {} and leaves through {}",
                result.entrance,
                result.exit
            );
        }
    }
}

fn main() -> Result<(), anyhow::Error> {
    env_logger::init();
    let args = Args::parse();

    let config = MazeConfig {
        width: args.width,
        height: args.height,
        tempo_ms: args.tempo,
        seed: args.seed,
    };
    let rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let mut controller = Controller::new(config, rng, Terminal::default(), ManualScheduler::new())?;
    println!("{}", controller.maze());

    if args.animate {
        controller.solve_animated();
        while let Some(delay) = controller.scheduler_mut().fire() {
            thread::sleep(delay);
            controller.tick();
            if let Some(snapshot) = controller.renderer_mut().snapshot.take() {
                // clear the screen and move the cursor home before drawing the next frame
                print!("\x1B[2J\x1B[H");
                println!("wave {}", snapshot.wave_step);
                println!("{}", render(controller.maze(), Some(&snapshot), None));
            }
        }
    } else {
        controller.solve_immediate();
    }

    match controller.outcome() {
        Some(Outcome::PathFound(result)) => {
            println!("{}", render(controller.maze(), None, Some(result)));
            println!(
                "found path of {} steps from {} to {}",
                result.steps,
                result.origin(),
                result.goal()
            );
        }
        Some(Outcome::Exhausted) | None => println!("no path found"),
    }

    Ok(())
}
