//! swscreen Probe
//!
//! Resolves a screen the way a driver loader would and reports the outcome.
//! The rasterizer entry points are stand-ins that only record what they were
//! handed, so the probe is safe to run on any machine.

mod probe;

use anyhow::{bail, Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use swscreen_render::ScreenFactory;
use swscreen_services::{DriverOptions, Settings};

#[derive(Parser, Debug)]
#[command(name = "swscreen", about = "Probe software/render-only screen selection")]
struct Cli {
    /// Backend to request (overrides GALLIUM_DRIVER)
    #[arg(long)]
    driver: Option<String>,

    /// Force software rendering (overrides LIBGL_ALWAYS_SOFTWARE)
    #[arg(long)]
    software: bool,

    /// Only consider Vulkan-capable software rasterizers
    #[arg(long)]
    vk: bool,

    /// JSON settings file (default: $SWSCREEN_CONFIG)
    #[arg(long)]
    config: Option<PathBuf>,

    /// List the backends compiled into this build and exit
    #[arg(long)]
    list: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "swscreen=info,swscreen_render=info".into()),
        )
        .init();

    tracing::info!("swscreen v{}", swscreen_core::VERSION);

    if cli.list {
        for backend in swscreen_core::Backend::available() {
            println!("{backend}");
        }
        return Ok(());
    }

    let settings = match &cli.config {
        Some(path) => Settings::load(path),
        None => Settings::from_env(),
    }
    .context("loading settings")?;

    let mut options = DriverOptions::from_env();
    if let Some(driver) = cli.driver {
        options = options.with_override(driver);
    }
    options.only_software |= cli.software;

    let winsys: swscreen_core::WinsysHandle = Arc::new(probe::ProbeWinsys);
    let factory = ScreenFactory::new(probe::ProbeRasterizers, &settings, options);

    let Some(screen) = factory.sw_screen_create_vk(&winsys, cli.vk) else {
        bail!("no screen could be created");
    };

    println!("{} ({})", screen.name(), screen.vendor());
    let mut layer = screen.wrapped();
    while let Some(inner) = layer {
        println!("  wraps {} ({})", inner.name(), inner.vendor());
        layer = inner.wrapped();
    }
    for (backend, stage, count) in factory.metrics().iter() {
        tracing::debug!(backend, stage = stage.as_str(), count, "selection metric");
    }
    Ok(())
}
