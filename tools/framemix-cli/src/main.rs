//! Framemix CLI — drive the compositing engine from the command line.
//!
//! Usage:
//!   framemix mix <SCENE>       Mix a scene for N ticks, optionally writing raw output
//!   framemix formats           List the supported working pixel formats
//!   framemix scene             Print a scene file template

use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "framemix",
    about = "Multi-stream video frame compositing",
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
    /// Mix a scene of synthetic sources into output frames
    Mix {
        /// Path to the scene JSON file
        scene: PathBuf,

        /// Number of output ticks to produce
        #[arg(long, default_value = "250")]
        frames: u64,

        /// Output frame rate used for timestamps
        #[arg(long, default_value = "25")]
        fps: u32,

        /// Write raw concatenated planes to this file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// List supported working pixel formats
    Formats,

    /// Print a scene file template
    Scene {
        /// Write the template here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    framemix_common::logging::init_logging(&framemix_common::logging::LoggingConfig {
        level: log_level.to_string(),
        json: false,
    });

    match cli.command {
        Commands::Mix {
            scene,
            frames,
            fps,
            output,
        } => commands::mix::run(scene, frames, fps, output),
        Commands::Formats => commands::formats::run(),
        Commands::Scene { output } => commands::scene::run(output),
    }
}
