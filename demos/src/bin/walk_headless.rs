//! Headless walking demo.
//!
//! Spawns a biped on seeded rolling terrain and walks it forward while
//! slowly turning, printing pose and step telemetry twice a second.
//!
//! Run: `cargo run -p strider-demos --bin walk_headless -- --seed 7 --secs 10`

use std::time::Duration;

use clap::Parser;

use strider_core::config::BipedConfig;
use strider_core::time::Clock;
use strider_demos::Scene;
use strider_gait::LegSide;
use strider_locomotion::MoveDirection;
use strider_physics::Heightfield;

#[derive(Parser, Debug)]
#[command(about = "Walk a biped across rolling terrain, headless")]
struct Args {
    /// Terrain seed.
    #[arg(long, default_value_t = 7)]
    seed: u64,

    /// Seconds of simulated walking.
    #[arg(long, default_value_t = 10.0)]
    secs: f64,

    /// Walk speed in m/s.
    #[arg(long, default_value_t = 2.0)]
    speed: f64,

    /// Turn left the whole time.
    #[arg(long)]
    turn: bool,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let args = Args::parse();

    let terrain = Heightfield::rolling(args.seed, 257, 1.0, 0.8, 30.0);
    let config = BipedConfig {
        walk_speed: args.speed.clamp(0.0, 9.0),
        ..BipedConfig::default()
    };
    let mut scene = Scene::spawn(terrain, config, 0.0, 0.0, 0.0);

    println!(
        "spawned at {:?}, stance height {:.2} m, walking {:.1} m/s for {:.1} s",
        scene.position(),
        scene.biped.stance_height(),
        scene.biped.walk_speed(),
        args.secs
    );

    let mut clock = Clock::new(scene.dt);
    let mut steps = (0_usize, 0_usize);
    let mut next_report = 0.5;

    // Feed wall-time-sized frames; the clock dispenses fixed steps.
    while clock.time().secs_f64() < args.secs {
        clock.tick(Duration::from_millis(16));
        while clock.should_step() && clock.time().secs_f64() < args.secs {
            scene.tick_with(|biped, ctx| {
                if args.turn {
                    biped.turn_left(ctx.dt);
                }
                biped.walk_in_dir(ctx, MoveDirection::Forward.walk_angle());
            });

            for leg in scene.biped.take_step_events() {
                match leg {
                    LegSide::Left => steps.0 += 1,
                    LegSide::Right => steps.1 += 1,
                }
            }

            let now = clock.time().secs_f64();
            if now >= next_report {
                next_report += 0.5;
                let pos = scene.position();
                println!(
                    "t={:5.2}s  pos=({:6.2}, {:6.2}, {:5.2})  steps L/R = {}/{}",
                    now, pos.x, pos.y, pos.z, steps.0, steps.1
                );
            }
        }
    }

    let pos = scene.position();
    println!(
        "done: travelled {:.2} m over terrain, {} left / {} right steps",
        pos.xy().norm(),
        steps.0,
        steps.1
    );
}
