//! Juggler CLI
//!
//! Command-line tools for exercising the Juggler sequencer.
//!
//! # Commands
//!
//! - `stress` - Run the multi-threaded chain stress test and verify the logs
//! - `version` - Show version information

mod commands;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

/// Juggler command-line tools.
#[derive(Parser)]
#[command(name = "juggler")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(global = true, short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the chain stress test
    Stress {
        /// Number of worker threads
        #[arg(short, long, default_value = "255")]
        workers: usize,

        /// Number of shared resources (1 to 63)
        #[arg(short, long, default_value = "4")]
        resources: u32,

        /// Close read sets before writing, enabling overtakes
        #[arg(short, long)]
        limited: bool,

        /// Upper bound of the random pause between operations, in milliseconds
        #[arg(short, long, default_value = "100")]
        jitter_ms: u64,

        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Show version information
    Version,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match cli.command {
        Commands::Stress {
            workers,
            resources,
            limited,
            jitter_ms,
            format,
        } => {
            commands::stress::run(workers, resources, limited, jitter_ms, &format)?;
        }
        Commands::Version => {
            println!("Juggler CLI v{}", env!("CARGO_PKG_VERSION"));
            println!("Juggler Core v{}", juggler_core::VERSION);
        }
    }

    Ok(())
}
