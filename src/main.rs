use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, ValueEnum};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::info;
use tracing_subscriber::EnvFilter;

use chaosgame::palette::tag_color;
use chaosgame::presets::Fractal;
use chaosgame::render::{self, AnimationConfig, RenderConfig, Shading, Viewport};
use chaosgame::{drop_warm_up, run, run_ensemble, Entry, Point2, Result, DEFAULT_WARM_UP};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum FractalArg {
    /// Sierpinski triangle.
    Triangle,
    /// Six-pointed flower.
    Flower,
    /// Barnsley fern.
    Fern,
    /// Heighway dragon.
    Dragon,
    /// Sierpinski carpet.
    Carpet,
    /// The word MATH.
    Math,
}

impl From<FractalArg> for Fractal {
    fn from(arg: FractalArg) -> Self {
        match arg {
            FractalArg::Triangle => Fractal::Triangle,
            FractalArg::Flower => Fractal::Flower,
            FractalArg::Fern => Fractal::Fern,
            FractalArg::Dragon => Fractal::Dragon,
            FractalArg::Carpet => Fractal::Carpet,
            FractalArg::Math => Fractal::Math,
        }
    }
}

/// Plays Barnsley's chaos game and draws the visited points.
#[derive(Parser, Debug)]
#[command(name = "chaosgame")]
#[command(about = "Render iterated function system fractals with the chaos game")]
struct Args {
    /// Rule set to play.
    #[arg(value_enum, default_value = "math")]
    fractal: FractalArg,

    /// Starting x coordinate.
    #[arg(long, default_value_t = 0.1, allow_hyphen_values = true)]
    x: f64,

    /// Starting y coordinate.
    #[arg(long, default_value_t = 0.1, allow_hyphen_values = true)]
    y: f64,

    /// Iterations per run.
    #[arg(short, long, default_value_t = 40_000)]
    iterations: usize,

    /// Leading entries of each run left out of the picture.
    #[arg(short, long, default_value_t = DEFAULT_WARM_UP)]
    warmup: usize,

    /// Seed for the first run; drawn from entropy when omitted.
    #[arg(short, long)]
    seed: Option<u64>,

    /// Independent runs merged into one picture, seeded seed, seed+1, ...
    #[arg(short, long, default_value_t = 1)]
    runs: usize,

    #[arg(long, default_value_t = 800)]
    width: u32,

    #[arg(long, default_value_t = 600)]
    height: u32,

    /// Fade pixels by how often they were hit.
    #[arg(long)]
    density: bool,

    /// Frame the bounding box of the points instead of the preset frame.
    #[arg(long)]
    fit: bool,

    /// Write a progressive GIF instead of a still PNG.
    #[arg(long)]
    animate: bool,

    /// Entries added per animation frame.
    #[arg(long, default_value_t = 400)]
    points_per_frame: usize,

    /// Milliseconds between animation frames.
    #[arg(long, default_value_t = 20)]
    frame_delay: u32,

    /// Output file; defaults to <fractal>.png or <fractal>.gif.
    #[arg(short, long)]
    output: Option<PathBuf>,
}

fn play(args: &Args) -> Result<PathBuf> {
    let fractal = Fractal::from(args.fractal);
    let preset = fractal.preset()?;
    let initial: Point2 = [args.x, args.y];
    let seed = args.seed.unwrap_or_else(rand::random);

    info!(
        %fractal,
        seed,
        runs = args.runs,
        iterations = args.iterations,
        warmup = args.warmup,
        "playing chaos game"
    );

    let entries: Vec<Entry<Point2, usize>> = if args.runs <= 1 {
        let trajectory = run(
            &preset.rules,
            initial,
            args.iterations,
            StdRng::seed_from_u64(seed),
        );
        drop_warm_up(trajectory, args.warmup).collect()
    } else {
        let seeds: Vec<u64> = (0..args.runs as u64).map(|i| seed.wrapping_add(i)).collect();
        run_ensemble(&preset.rules, &initial, args.iterations, &seeds)
            .into_iter()
            .flat_map(|entries| drop_warm_up(entries.into_iter(), args.warmup))
            .collect()
    };

    let viewport = if args.fit {
        Viewport::fit(entries.iter().map(|e| &e.point))?.padded(0.02)
    } else {
        preset.viewport
    };

    let config = RenderConfig {
        width: args.width,
        height: args.height,
        shading: if args.density {
            Shading::Density
        } else {
            Shading::Flat
        },
        ..RenderConfig::default()
    };

    let extension = if args.animate { "gif" } else { "png" };
    let output = args
        .output
        .clone()
        .unwrap_or_else(|| PathBuf::from(format!("{fractal}.{extension}")));

    if args.animate {
        let animation = AnimationConfig {
            points_per_frame: args.points_per_frame,
            frame_delay: args.frame_delay,
        };
        render::render_gif(&output, &entries, &viewport, &config, &animation, tag_color)?;
    } else {
        render::render_png(&output, &entries, &viewport, &config, tag_color)?;
    }

    info!(output = %output.display(), points = entries.len(), "done");
    Ok(output)
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("chaosgame=info")),
        )
        .init();

    let args = Args::parse();
    match play(&args) {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error playing chaos game: {}", e);
            ExitCode::FAILURE
        }
    }
}
