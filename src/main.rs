// this_file: src/main.rs
//! Shuhua CLI - vertical text compositing tool

use anyhow::{Context, Result};
use camino::Utf8PathBuf;
use clap::{Parser, Subcommand};
use log::{error, info};
use shuhua::{logging, CompositionConfig, Session};
use std::io::{self, Read};

/// Shuhua - composite vertical CJK text onto template images
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Set log level (error, warn, info, debug, trace)
    #[arg(short = 'l', long, global = true)]
    log_level: Option<String>,

    /// Enable quiet mode (only errors)
    #[arg(short = 'q', long, global = true, conflicts_with = "log_level")]
    quiet: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a composition config and write the output image
    Compose {
        /// Path to the JSON composition config
        config: Utf8PathBuf,

        /// Override the output path from the config
        #[arg(short, long)]
        output: Option<Utf8PathBuf>,
    },

    /// Validate a composition config
    Validate {
        /// Input file (uses stdin if not specified)
        #[arg(short, long)]
        input: Option<Utf8PathBuf>,
    },

    /// Show version information
    Version,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = cli
        .log_level
        .as_deref()
        .unwrap_or(logging::default_level());
    logging::init_logging(log_level, cli.quiet, true);

    match cli.command {
        Commands::Compose { config, output } => compose(&config, output)?,
        Commands::Validate { input } => validate(input)?,
        Commands::Version => {
            println!("shuhua version {}", shuhua::VERSION);
            println!("Vertical text compositor");
        }
    }

    Ok(())
}

/// Run one session and print its report as JSON
fn compose(config_path: &Utf8PathBuf, output: Option<Utf8PathBuf>) -> Result<()> {
    let mut config = CompositionConfig::from_path(config_path)
        .with_context(|| format!("Failed to load config {}", config_path))?;

    if let Some(output) = output {
        info!("Overriding output path with {}", output);
        config.output = output;
        config.validate()?;
    }

    let report = match Session::new(config).run() {
        Ok(report) => report,
        Err(e) => {
            error!("Composition failed: {}", e);
            return Err(e.into());
        }
    };

    println!("{}", serde_json::to_string(&report)?);
    Ok(())
}

/// Validate a config from a file or stdin
fn validate(input: Option<Utf8PathBuf>) -> Result<()> {
    let json = if let Some(path) = input {
        std::fs::read_to_string(&path).with_context(|| format!("Failed to read {}", path))?
    } else {
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        buffer
    };

    match CompositionConfig::from_json(&json) {
        Ok(config) => {
            println!("✓ Valid composition config");
            println!("  Version: {}", config.version);
            println!("  Template: {}", config.template.claimed_name());
            println!("  Fonts: {}", config.fonts.len());
            println!("  Blocks: {}", config.blocks.len());
            Ok(())
        }
        Err(e) => {
            println!("✗ Invalid composition config: {}", e);
            Err(e.into())
        }
    }
}
