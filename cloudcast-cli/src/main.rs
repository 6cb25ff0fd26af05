//! Cloudcast CLI - Command-line interface
//!
//! This binary drives the cloudcast library against a cloudcasting API:
//! dataset metadata queries, single-frame fetches, full-variable preloads,
//! and terminal playback.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

use cloudcast::config::Config;
use cloudcast::logging::init_logging;
use cloudcast::playback::PlaybackSpeed;
use cloudcast::variable::VariableId;

mod commands;
mod host;

#[derive(Parser)]
#[command(name = "cloudcast")]
#[command(version = cloudcast::VERSION)]
#[command(about = "Cloud-forecast raster overlays on the command line", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Show dataset metadata from the data-info endpoint
    Info,
    /// Fetch one overlay and write it as a PNG
    Fetch {
        /// Forecast variable, e.g. IR_016
        variable: VariableId,
        /// Time step (0-11, 15 minutes each)
        step: u8,
        /// Output file (default: {variable}_{step}.png)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Preload every time step of a variable
    Preload {
        /// Forecast variable, e.g. IR_016
        variable: VariableId,
        /// Directory to write layer PNGs into
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Preload a variable and animate it in the terminal
    Play {
        /// Forecast variable, e.g. IR_016
        variable: VariableId,
        /// Frame interval: 4x, 2x, 1x, or 0.5x
        #[arg(long, default_value = "1x")]
        speed: PlaybackSpeed,
        /// Directory to write layer PNGs into
        #[arg(long)]
        out: Option<PathBuf>,
        /// Stop after this many frames instead of running until Ctrl-C
        #[arg(long)]
        frames: Option<u32>,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let config = Config::load();

    let _logging_guard =
        match init_logging(&config.logging.directory, &config.logging.file_name) {
            Ok(guard) => Some(guard),
            Err(e) => {
                eprintln!("warning: logging disabled: {}", e);
                None
            }
        };

    let result = match cli.command {
        Command::Info => commands::info(&config).await,
        Command::Fetch {
            variable,
            step,
            output,
        } => commands::fetch(&config, variable, step, output).await,
        Command::Preload { variable, out } => commands::preload(&config, variable, out).await,
        Command::Play {
            variable,
            speed,
            out,
            frames,
        } => commands::play(&config, variable, speed, out, frames).await,
    };

    if let Err(e) = result {
        eprintln!("error: {}", e);
        process::exit(1);
    }
}
