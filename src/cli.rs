//! Command-line interface.

use clap::{ArgAction, Parser, Subcommand};
use orderly_rename::RuleMode;
use std::path::PathBuf;
use std::str::FromStr;

#[derive(Debug, Parser)]
#[command(name = "orderly", version, about = "Order, select, batch-rename and upload image sets")]
pub struct Cli {
    /// Configuration file (TOML, YAML or JSON).
    #[arg(short, long, global = true, env = "ORDERLY_CONFIG")]
    pub config: Option<PathBuf>,
    /// Increase log verbosity (-v debug, -vv trace).
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,
    /// Report what would happen without writing to the cache or uploading.
    #[arg(long, global = true)]
    pub dry_run: bool,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Import image files onto the end of the board.
    Add {
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// Show the board and every derived group.
    List,
    /// Swap the items at positions FROM and TO (1-based).
    Move {
        #[arg(value_parser = clap::value_parser!(u32).range(1..))]
        from: u32,
        #[arg(value_parser = clap::value_parser!(u32).range(1..))]
        to: u32,
    },
    /// Remove an item from the board.
    Remove { id: String },
    /// Rename items, selected in the order given.
    Rename {
        /// amazon, prefix-index, custom-sequence or ai-generated.
        #[arg(short, long, default_value = "prefix-index", value_parser = parse_mode)]
        mode: RuleMode,
        /// Defaults to `default_prefix` from the configuration.
        #[arg(short, long)]
        prefix: Option<String>,
        #[arg(short, long, default_value = "")]
        suffix: String,
        /// Comma-separated names for custom-sequence.
        #[arg(long, default_value = "")]
        sequence: String,
        #[arg(required = true)]
        ids: Vec<String>,
    },
    /// Upload a derived group to a configured service.
    Upload {
        group: String,
        #[arg(short, long)]
        service: String,
    },
    /// Remove every board item, or every derived item with --derived.
    Clear {
        #[arg(long)]
        derived: bool,
    },
}

fn parse_mode(value: &str) -> Result<RuleMode, String> {
    RuleMode::from_str(value).map_err(|err| err.to_string())
}
