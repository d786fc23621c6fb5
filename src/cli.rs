use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "skyview", version, about = "Terminal weather forecasts")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Path to config.yaml
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Increase log verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Re-run interactive setup
    Init,
    /// List known cities, optionally filtered
    Cities {
        /// Case-insensitive part of the city name
        filter: Option<String>,
    },
    /// Print the forecast for a city
    Forecast {
        city: String,

        /// Show temperatures in °F
        #[arg(long)]
        imperial: bool,

        /// Include every day instead of just the first
        #[arg(long)]
        detailed: bool,

        /// Emit the forecast as JSON
        #[arg(long)]
        json: bool,
    },
}

impl Cli {
    /// Log filter used when RUST_LOG is not set
    pub fn default_log_level(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "debug",
            _ => "trace",
        }
    }
}
