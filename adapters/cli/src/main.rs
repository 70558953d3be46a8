#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that plays Trailgrid in the terminal.

mod backdrop;
mod canvas;
mod clock;
mod shell;

use std::{
    fs,
    io,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use clap::Parser;
use rand::Rng;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use trailgrid_core::{GameConfig, PixelSize};

use crate::{backdrop::FileImageLoader, clock::SystemClock, shell::App};

const DEMO_MAP: &str = include_str!("../maps/demo.toml");

#[derive(Debug, Parser)]
#[command(author, version, about = "Explore a grid, collect rewards and find an exit", long_about = None)]
struct Args {
    /// TOML map file; the bundled demo map is used when omitted
    #[arg(short, long)]
    map: Option<PathBuf>,
    /// Seed for marker placement; random when omitted
    #[arg(short, long)]
    seed: Option<u64>,
    /// Skip the tour of exits before play
    #[arg(long)]
    no_intro: bool,
    /// Visible viewport in pixels, written as WIDTHxHEIGHT
    #[arg(long, default_value = "300x250", value_parser = parse_wrapper)]
    wrapper: PixelSize,
}

fn parse_wrapper(value: &str) -> Result<PixelSize, String> {
    let (width, height) = value
        .split_once(|c| c == 'x' || c == 'X')
        .ok_or_else(|| format!("expected WIDTHxHEIGHT, got {value:?}"))?;
    let parse = |part: &str| {
        part.trim()
            .parse::<f64>()
            .ok()
            .filter(|extent| *extent > 0.0)
            .ok_or_else(|| format!("{part:?} is not a positive pixel extent"))
    };
    Ok(PixelSize::new(parse(width)?, parse(height)?))
}

fn load_config(path: Option<&Path>) -> Result<GameConfig> {
    let source = match path {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("failed to read map file {}", path.display()))?,
        None => DEMO_MAP.to_owned(),
    };
    toml::from_str(&source).context("failed to parse map")
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();
}

/// Entry point for the Trailgrid command-line interface.
fn main() -> Result<()> {
    init_tracing();
    let args = Args::parse();

    let mut config = load_config(args.map.as_deref())?;
    if args.no_intro {
        config.intro = None;
    }
    let map_image = config.map_image.clone();
    let seed = args.seed.unwrap_or_else(|| rand::thread_rng().gen());
    info!(seed, map = ?args.map, "trailgrid_starting");

    let stdout = io::stdout();
    let mut app = App::new(config, args.wrapper, SystemClock, stdout.lock())?;
    if let Some(location) = map_image {
        let base = args
            .map
            .as_deref()
            .and_then(Path::parent)
            .map(Path::to_path_buf)
            .unwrap_or_default();
        app.load_map(&FileImageLoader::new(base), &location);
    }

    app.run(seed, io::stdin().lock())
}
