//! CineLens CLI — inspect recordings and render camera motion offline.
//!
//! Usage:
//!   cinelens segments <EVENTS>   Generate zoom segments from an event log
//!   cinelens frames <EVENTS>     Render the full camera/cursor timeline
//!   cinelens simulate <EVENTS>   Replay the live engine up to a timestamp
//!   cinelens cursor <EVENTS>     Evaluate the cursor overlay at a timestamp

use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "cinelens",
    about = "Deterministic camera motion for screen recordings",
    version,
    author
)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate zoom segments from a JSONL event log
    Segments {
        /// Path to the events file (JSONL)
        events: PathBuf,

        /// Zoom level applied while tracking (defaults from saved config)
        #[arg(long)]
        zoom: Option<f64>,

        /// Transition speed preset: slow|normal|fast (defaults from saved config)
        #[arg(long)]
        speed: Option<String>,

        /// Recording duration in milliseconds (derived from events if omitted)
        #[arg(long)]
        duration_ms: Option<f64>,

        /// Write segments as JSON to this path instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Render one camera + cursor state per output frame
    Frames {
        /// Path to the events file (JSONL)
        events: PathBuf,

        /// Output frame rate
        #[arg(long, default_value = "30.0")]
        fps: f64,

        /// Zoom level applied while tracking (defaults from saved config)
        #[arg(long)]
        zoom: Option<f64>,

        /// Transition speed preset: slow|normal|fast (defaults from saved config)
        #[arg(long)]
        speed: Option<String>,

        /// Recording duration in milliseconds (derived from events if omitted)
        #[arg(long)]
        duration_ms: Option<f64>,

        /// Write frames as JSONL to this path instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Replay the live camera engine and print its state at a timestamp
    Simulate {
        /// Path to the events file (JSONL)
        events: PathBuf,

        /// Timestamp to seek to, in milliseconds
        #[arg(long)]
        time_ms: f64,

        /// Zoom level applied while tracking (defaults from saved config)
        #[arg(long)]
        zoom: Option<f64>,

        /// Transition speed preset: slow|normal|fast (defaults from saved config)
        #[arg(long)]
        speed: Option<String>,
    },

    /// Evaluate the smoothed cursor overlay at a timestamp
    Cursor {
        /// Path to the events file (JSONL)
        events: PathBuf,

        /// Timestamp to evaluate, in milliseconds
        #[arg(long)]
        time_ms: f64,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    cinelens_common::logging::init_logging(&cinelens_common::config::LoggingConfig {
        level: log_level.to_string(),
        json: false,
        file: None,
    });

    match cli.command {
        Commands::Segments {
            events,
            zoom,
            speed,
            duration_ms,
            output,
        } => commands::segments::run(events, zoom, speed, duration_ms, output),
        Commands::Frames {
            events,
            fps,
            zoom,
            speed,
            duration_ms,
            output,
        } => commands::frames::run(events, fps, zoom, speed, duration_ms, output),
        Commands::Simulate {
            events,
            time_ms,
            zoom,
            speed,
        } => commands::simulate::run(events, time_ms, zoom, speed),
        Commands::Cursor { events, time_ms } => commands::cursor::run(events, time_ms),
    }
}
