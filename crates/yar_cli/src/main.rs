use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use std::path::PathBuf;
use yar_renderer::{render, RenderConfig, DEFAULT_BUCKET_SIZE};

/// Render a yar scene file to a PNG image.
#[derive(Parser, Debug)]
#[command(name = "yar", version, about)]
struct Args {
    /// Scene description (JSON)
    scene: PathBuf,

    /// Output image, always written as PNG
    output: PathBuf,

    /// Number of render threads (defaults to one per core)
    #[arg(short = 't', long)]
    threads: Option<usize>,

    /// Bucket edge length in pixels
    #[arg(short = 'b', long, default_value_t = DEFAULT_BUCKET_SIZE)]
    bucket_size: u32,

    /// Apply gamma 2.0 to the output
    #[arg(long)]
    gamma: bool,

    /// More log output (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let level = match args.verbose {
        0 => log::LevelFilter::Info,
        1 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();

    if args.threads == Some(0) {
        anyhow::bail!("--threads must be at least 1");
    }

    let scene = yar_core::load_scene(&args.scene)
        .with_context(|| format!("Failed to load scene {}", args.scene.display()))?;

    let config = RenderConfig {
        bucket_size: args.bucket_size,
        threads: args.threads,
        gamma: args.gamma,
    };

    let framebuffer = render(&scene, &config).context("Render failed")?;

    framebuffer
        .save_png(&args.output, config.gamma)
        .with_context(|| format!("Failed to write {}", args.output.display()))?;

    Ok(())
}
