#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that plays Tanks Grid World episodes.

use anyhow::{Context, Result};
use clap::Parser;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::info;

use tanks_grid_world_env::{Environment, TanksGridWorld};
use tanks_grid_world_rendering::{GridRenderer, RendererConfig};
use tanks_grid_world_rendering_minifb::MinifbSurfaceFactory;
use tanks_grid_world_world::Observation;

/// Command-line arguments accepted by the tanks-grid-world binary.
#[derive(Debug, Parser)]
#[command(
    name = "tanks-grid-world",
    about = "Plays rollouts against the Tanks Grid World environment"
)]
struct Args {
    /// Number of steps to play before stopping.
    #[arg(long, default_value_t = 30)]
    steps: u32,

    /// Seed for the action-sampling RNG; the environment itself resets
    /// deterministically regardless of seed.
    #[arg(long)]
    seed: Option<u64>,

    /// Fixed raw action index submitted on every step instead of sampling.
    #[arg(long)]
    action: Option<u8>,

    /// Present each step in a native window at the canonical cadence.
    #[arg(long)]
    render: bool,

    /// Print the observed cell codes after each step.
    #[arg(long)]
    show_observation: bool,
}

/// Entry point for the Tanks Grid World command-line interface.
fn main() -> Result<()> {
    tracing_subscriber::fmt::init();
    run(Args::parse())
}

fn run(args: Args) -> Result<()> {
    info!(
        steps = args.steps,
        render = args.render,
        "starting rollout"
    );

    let mut env = build_environment(args.render);
    let mut rng = match args.seed {
        Some(seed) => ChaCha8Rng::seed_from_u64(seed),
        None => ChaCha8Rng::from_entropy(),
    };

    let (observation, _) = env.reset(args.seed, None);
    if args.show_observation {
        print_observation(&observation);
    }

    let mut total_reward = 0_i64;
    for step_index in 0..args.steps {
        let step = match args.action {
            Some(index) => env.step_index(index),
            None => {
                let action = env.action_space().sample(&mut rng);
                env.step(action)
            }
        }
        .with_context(|| format!("step {step_index} failed"))?;

        total_reward += i64::from(step.reward);
        if args.show_observation {
            print_observation(&step.observation);
        }
        if step.terminated || step.truncated {
            break;
        }
    }

    env.close();
    println!("episode reward: {total_reward}");
    Ok(())
}

fn build_environment(render: bool) -> TanksGridWorld {
    if render {
        let renderer = GridRenderer::new(
            RendererConfig::canonical(),
            Box::new(MinifbSurfaceFactory::new()),
        );
        TanksGridWorld::with_renderer(renderer)
    } else {
        TanksGridWorld::new()
    }
}

fn print_observation(observation: &Observation) {
    for row in observation.cells() {
        let line: String = row
            .iter()
            .map(|cell| char::from(b'0' + cell.code()))
            .collect();
        println!("{line}");
    }
    println!();
}
