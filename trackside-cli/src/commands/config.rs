//! Configuration management CLI commands.

use std::path::PathBuf;

use clap::Subcommand;

use trackside::config::ConfigFile;

use crate::error::CliError;

/// Config subcommands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommands {
    /// Show the effective configuration
    Show {
        /// Config file path (defaults to ~/.trackside/config.ini)
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Write a config file with default settings
    Init {
        /// Config file path (defaults to ~/.trackside/config.ini)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Show the configuration file path
    Path,
}

/// Run a config subcommand.
pub fn run(command: ConfigCommands) -> Result<(), CliError> {
    match command {
        ConfigCommands::Show { config } => run_show(config),
        ConfigCommands::Init { config, force } => run_init(config, force),
        ConfigCommands::Path => run_path(),
    }
}

fn resolve_path(path: Option<PathBuf>) -> Result<PathBuf, CliError> {
    match path {
        Some(path) => Ok(path),
        None => Ok(ConfigFile::default_path()?),
    }
}

fn run_show(path: Option<PathBuf>) -> Result<(), CliError> {
    let path = resolve_path(path)?;
    let config = ConfigFile::load_or_default(&path)?;

    println!("Config file: {}", path.display());
    println!();
    println!("[server]");
    println!("base_url = {}", config.base_url);
    println!("timeout_secs = {}", config.timeout.as_secs());
    println!();
    println!("[scanner]");
    println!("region_size = {}", config.scanner.region_size);
    println!("cooldown_ms = {}", config.scanner.cooldown.as_millis());
    println!("attach_track = {}", config.scanner.attach_track);
    println!("show_lap_metrics = {}", config.scanner.show_lap_metrics);
    println!();
    println!("[camera]");
    println!("facing = {}", config.camera.facing.as_str());
    println!("width = {}", config.camera.ideal_width);
    println!("height = {}", config.camera.ideal_height);
    if let Some(id) = &config.default_track_id {
        println!();
        println!("[track]");
        println!("default_id = {}", id);
    }
    Ok(())
}

fn run_init(path: Option<PathBuf>, force: bool) -> Result<(), CliError> {
    let path = resolve_path(path)?;
    if path.exists() && !force {
        return Err(CliError::Config(format!(
            "{} already exists. Use --force to overwrite.",
            path.display()
        )));
    }

    ConfigFile::default().save(&path)?;
    println!("Wrote default configuration to {}", path.display());
    Ok(())
}

fn run_path() -> Result<(), CliError> {
    println!("{}", ConfigFile::default_path()?.display());
    Ok(())
}
