use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// `sms-locator` - acquire one high-accuracy position fix and text it.
#[derive(Parser, Debug)]
#[command(name = "sms-locator")]
#[command(version)]
#[command(about = "Acquire one GPS fix and send it as an SMS.", long_about = None)]
pub struct Cli {
    /// Config file (default: ~/.sms-locator/config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Log at debug level regardless of observability.log_level
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Check a destination number against the configured rule
    Validate {
        /// Number as typed; non-digits are stripped
        number: String,
    },

    /// Print the message that would be sent for a position
    Encode {
        /// Latitude in decimal degrees
        #[arg(long, allow_negative_numbers = true)]
        lat: f64,

        /// Longitude in decimal degrees
        #[arg(long, allow_negative_numbers = true)]
        lon: f64,

        /// Timestamp in epoch milliseconds (default: now)
        #[arg(long)]
        timestamp: Option<i64>,

        /// Characters per segment (default: dispatch.segment_limit)
        #[arg(long)]
        segment_limit: Option<usize>,
    },

    /// Acquire a fix and send it to NUMBER
    Send {
        number: String,
    },

    /// Acquire a fix and print it without sending
    Locate,

    /// Line-driven session against a live controller
    Interactive,

    /// Print the effective configuration
    Config,
}
