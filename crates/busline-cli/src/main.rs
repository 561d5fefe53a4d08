//! busline CLI - Mapping checker and wire file decoder
//!
//! Commands:
//! - `busline check` - Validate a type mapping file
//! - `busline decode` - Decode an envelope and print each message

use busline_core::LogLevel;
use clap::{Parser, Subcommand};

mod decode;
mod mapping;

#[derive(Parser)]
#[command(name = "busline")]
#[command(author, version, about = "Tooling for busline message envelopes", long_about = None)]
struct Cli {
    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long, global = true, default_value = "warn")]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a mapping file
    Check {
        /// Path to the mapping file (.toml or .json)
        #[arg(short, long)]
        mapping: String,
    },

    /// Decode an envelope file and print each message
    Decode {
        /// Path to the mapping file (.toml or .json)
        #[arg(short, long)]
        mapping: String,

        /// Path to the wire file holding a `{"MessageParts": [...]}` envelope
        wire: String,

        /// Pretty-print message values
        #[arg(short, long)]
        pretty: bool,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    busline_logging::init_logging(cli.log_level)?;

    match cli.command {
        Commands::Check { mapping } => {
            mapping::check(&mapping)?;
        }
        Commands::Decode {
            mapping,
            wire,
            pretty,
        } => {
            decode::run(&mapping, &wire, pretty)?;
        }
    }

    Ok(())
}
