//! Slidereel CLI: build media timelines and compile them into one video.
//!
//! Usage:
//!   slidereel init <FILE>            Create a new empty timeline
//!   slidereel add <FILE> <MEDIA>...  Append images or clips to a timeline
//!   slidereel info <FILE>            Show a timeline's play order
//!   slidereel probe <MEDIA>          Print a video's probed duration
//!   slidereel compile <FILE>         Compile a timeline into one video
//!   slidereel check                  Check that the external tools work

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use slidereel_common::AppConfig;

mod commands;

#[derive(Parser)]
#[command(
    name = "slidereel",
    about = "Turn ordered images and clips into one concatenated video",
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
    /// Create a new empty timeline file
    Init {
        /// Path of the timeline file to create
        file: PathBuf,
    },

    /// Append media items to a timeline
    Add {
        /// Path of the timeline file
        file: PathBuf,

        /// Media files to append, in play order
        media: Vec<PathBuf>,

        /// Treat every file as a still image
        #[arg(long, conflicts_with = "video")]
        image: bool,

        /// Treat every file as a video clip
        #[arg(long, conflicts_with = "image")]
        video: bool,

        /// Display duration for still images, in seconds
        #[arg(short, long)]
        duration: Option<f64>,
    },

    /// Show a timeline's items in play order
    Info {
        /// Path of the timeline file
        file: PathBuf,
    },

    /// Print a video's probed duration in seconds
    Probe {
        /// Media file to probe
        media: PathBuf,
    },

    /// Compile a timeline into one concatenated video
    Compile {
        /// Path of the timeline file
        file: PathBuf,

        /// Output video path
        #[arg(short, long)]
        output: PathBuf,

        /// Output resolution as WIDTHxHEIGHT
        #[arg(long)]
        resolution: Option<String>,

        /// Output frame rate
        #[arg(long)]
        fps: Option<String>,
    },

    /// Check that ffmpeg and ffprobe can be spawned
    Check,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = AppConfig::load();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    slidereel_common::logging::init_logging(&slidereel_common::LoggingConfig {
        level: log_level.to_string(),
        json: false,
        file: None,
    });

    match cli.command {
        Commands::Init { file } => commands::init::run(file),
        Commands::Add {
            file,
            media,
            image,
            video,
            duration,
        } => commands::add::run(file, media, image, video, duration, &config),
        Commands::Info { file } => commands::info::run(file),
        Commands::Probe { media } => commands::probe::run(media, &config),
        Commands::Compile {
            file,
            output,
            resolution,
            fps,
        } => commands::compile::run(file, output, resolution, fps, &config).await,
        Commands::Check => commands::check::run(&config),
    }
}
