// SPDX-License-Identifier: MIT OR Apache-2.0
//! `choreo` - headless driver for the studio page choreography
//!
//! Builds the page on the sequencing core and plays a scripted visit:
//! - Loading screen with scroll locked until it finishes
//! - Section reveals, parallax and loops
//! - Services accordion cycling through its panels
//! - Pinned project cards and the travelling decoration
//!
//! ## Architecture
//!
//! The page is laid out once into a static measurement provider that stands
//! in for the browser. Each frame feeds a smoothed scroll offset and the
//! frame time to the orchestrator, then reports the resulting inline styles
//! as JSON lines or a final summary on stdout. Logs go to stderr.

mod error;
mod layout;
mod loading;
mod page;
mod sections;
mod settings;
mod simulation;

use clap::Parser;
use error::AppError;
use settings::{AppSettings, OutputFormat};
use simulation::{RunSummary, Simulation};
use std::io::Write;
use std::path::PathBuf;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[derive(Parser, Debug)]
#[command(name = "choreo")]
#[command(about = "Play the studio page choreography frame by frame")]
struct Args {
    /// Settings file (RON). Defaults to `choreo.ron` when present.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Number of frames to play; defaults to the configured run length
    #[arg(long)]
    frames: Option<u64>,

    /// Output format, overriding the settings file
    #[arg(long, value_enum)]
    format: Option<OutputFormat>,

    /// Write the default settings to this path and exit
    #[arg(long)]
    write_default_config: Option<PathBuf>,
}

fn main() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("choreo_app=info,choreo_sequencer=info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::parse();
    if let Err(e) = run(args) {
        tracing::error!("choreo failed: {e}");
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<(), AppError> {
    if let Some(path) = &args.write_default_config {
        AppSettings::default().save(path)?;
        tracing::info!("Wrote default settings to {}", path.display());
        return Ok(());
    }

    let mut settings = AppSettings::load_or_default(args.config.as_deref())?;
    if let Some(format) = args.format {
        settings.output = format;
    }
    let frames = args.frames.unwrap_or_else(|| settings.frame_count());
    let format = settings.output;

    tracing::info!(
        "Playing {frames} frames at {} fps on a {}x{} viewport",
        settings.frame_rate,
        settings.viewport.width,
        settings.viewport.height
    );

    let mut simulation = Simulation::new(settings)?;
    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    let summary = match format {
        OutputFormat::Json => simulation.run(frames, |snapshot| {
            serde_json::to_writer(&mut out, snapshot)?;
            writeln!(out)?;
            Ok(())
        })?,
        OutputFormat::Summary => simulation.run(frames, |_| Ok(()))?,
    };

    if format == OutputFormat::Summary {
        print_summary(&mut out, &summary)?;
    }
    out.flush()?;
    Ok(())
}

fn print_summary(out: &mut impl Write, summary: &RunSummary) -> Result<(), AppError> {
    writeln!(out, "frames:            {}", summary.frames)?;
    writeln!(out, "simulated time:    {:.2}s", summary.duration)?;
    match summary.ready_at {
        Some(at) => writeln!(out, "content ready at:  {at:.2}s")?,
        None => writeln!(out, "content ready at:  never")?,
    }
    writeln!(out, "loading steps:     {}", summary.loading_steps.join(" -> "))?;
    writeln!(out, "final scroll:      {:.1}px", summary.final_scroll)?;
    writeln!(out, "orb handoffs:      {}", summary.ownership_changes)?;
    writeln!(out, "panels opened:     {}", summary.services_selected)?;
    writeln!(out, "listeners:         {}", summary.listeners)?;
    Ok(())
}
