//! Start command - run the timing station against a frame source.

use std::path::PathBuf;

use chrono::Local;
use clap::Args;
use console::style;
use tokio::runtime::Runtime;
use tokio_util::sync::CancellationToken;

use trackside::app::{AppConfig, KioskApp};
use trackside::config::ConfigFile;
use trackside::frame::ImageSequenceSource;
use trackside::scanner::{ScanEvent, StatusLevel, StatusMessage};
use trackside::track::Track;

use crate::error::CliError;

/// Arguments for the start command.
#[derive(Debug, Args)]
pub struct StartArgs {
    /// Directory of frame images to scan, processed in name order
    #[arg(long)]
    pub frames: PathBuf,

    /// Backend base URL (overrides config)
    #[arg(long)]
    pub server: Option<String>,

    /// Scan-region side length in pixels (overrides config)
    #[arg(long)]
    pub region_size: Option<u32>,

    /// Duplicate-suppression window in milliseconds (overrides config)
    #[arg(long)]
    pub cooldown_ms: Option<u64>,

    /// Course available at this station, as ID,NAME[,MILES]; repeatable
    #[arg(long = "track", value_parser = parse_track)]
    pub tracks: Vec<Track>,

    /// Track id to select at startup (overrides config)
    #[arg(long)]
    pub default_track: Option<String>,

    /// Config file path (defaults to ~/.trackside/config.ini)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Write logs to daily-rotated files in this directory
    #[arg(long)]
    pub log_dir: Option<PathBuf>,
}

fn parse_track(value: &str) -> Result<Track, String> {
    let parts: Vec<&str> = value.split(',').collect();
    match parts.as_slice() {
        [id, name] => Ok(Track::new(*id, *name)),
        [id, name, miles] => {
            let miles: f64 = miles
                .parse()
                .map_err(|_| format!("invalid distance '{}'", miles))?;
            Ok(Track::new(*id, *name).with_distance_miles(miles))
        }
        _ => Err("expected ID,NAME or ID,NAME,MILES".to_string()),
    }
}

/// Run the start command.
pub fn run(args: StartArgs) -> Result<(), CliError> {
    // Keep the file-log guard alive for the whole run
    let _log_guard = match &args.log_dir {
        Some(dir) => Some(
            trackside::logging::init_with_file(dir)
                .map_err(|e| CliError::Config(format!("Cannot open log directory: {}", e)))?,
        ),
        None => {
            trackside::logging::init();
            None
        }
    };

    // Resolve settings: CLI > config file > defaults
    let config_path = match &args.config {
        Some(path) => path.clone(),
        None => ConfigFile::default_path()?,
    };
    let mut file = ConfigFile::load_or_default(&config_path)?;
    tracing::info!(path = %config_path.display(), "Resolved configuration");

    if let Some(server) = &args.server {
        file.base_url = server.clone();
    }
    if let Some(size) = args.region_size {
        file.scanner = file.scanner.with_region_size(size);
    }
    if let Some(ms) = args.cooldown_ms {
        file.scanner = file
            .scanner
            .with_cooldown(std::time::Duration::from_millis(ms));
    }
    if args.default_track.is_some() {
        file.default_track_id = args.default_track.clone();
    }

    let config = AppConfig::from_config_file(&file, args.tracks.clone());

    // Print banner
    println!("Trackside Timing Station v{}", trackside::VERSION);
    println!("==============================");
    println!();
    println!("Server:      {}", config.base_url);
    println!("Frames:      {}", args.frames.display());
    println!(
        "Scan region: {}px, cooldown {}ms",
        config.scanner.region_size,
        config.scanner.cooldown.as_millis()
    );
    match config
        .tracks
        .iter()
        .find(|t| Some(t.id.as_str()) == config.default_track_id.as_deref())
    {
        Some(track) => println!("Track:       {}", track.name),
        None => println!("Track:       none selected"),
    }
    println!();
    println!("Press Ctrl+C to stop");
    println!();

    let source = ImageSequenceSource::from_dir(&args.frames)?;

    let runtime = Runtime::new().map_err(|e| CliError::Runtime(e.to_string()))?;

    // Set up signal handler for graceful shutdown
    let interrupt = CancellationToken::new();
    let interrupt_clone = interrupt.clone();
    ctrlc::set_handler(move || {
        interrupt_clone.cancel();
    })
    .map_err(|e| CliError::Config(format!("Failed to set signal handler: {}", e)))?;

    runtime.block_on(async move {
        let mut app = KioskApp::start(config, source)?;
        let mut events = match app.take_events() {
            Some(events) => events,
            None => return Err(CliError::Config("event stream unavailable".to_string())),
        };
        let state = app.state();

        loop {
            tokio::select! {
                biased;

                _ = interrupt.cancelled() => {
                    println!();
                    println!("Received shutdown signal, stopping...");
                    break;
                }

                event = events.recv() => {
                    match event {
                        Some(ScanEvent::Status(status)) => print_status(&status),
                        Some(ScanEvent::Outline(_)) => {
                            // Geometry only matters to a graphical overlay
                        }
                        Some(ScanEvent::HistoryUpdated) => {
                            let lines = state.lock().unwrap().history.render_lines(Local::now());
                            println!();
                            println!("--- Recent scans ---");
                            for line in lines {
                                println!("{}", line);
                            }
                            println!("--------------------");
                        }
                        // Channel closed: the daemon stopped (camera failure)
                        None => break,
                    }
                }
            }
        }

        let snapshot = app.metrics_snapshot();
        app.shutdown().await;
        println!();
        println!("Session: {}", snapshot);
        Ok(())
    })
}

fn print_status(status: &StatusMessage) {
    let text = match status.level {
        StatusLevel::Info => style(status.text.as_str()).dim().to_string(),
        StatusLevel::Success => style(status.text.as_str()).green().to_string(),
        StatusLevel::Warning => style(status.text.as_str()).yellow().to_string(),
        StatusLevel::Error => style(status.text.as_str()).red().bold().to_string(),
    };
    println!("{}", text);
}
