use clap::{Parser, Subcommand};
use std::path::PathBuf;

use vodfeed::entity::EntityKind;

/// Browse the video-on-demand catalog from the terminal
#[derive(Parser)]
#[command(name = "vodfeed")]
#[command(about = "Paginate and inspect the VOD catalog", long_about = None)]
pub struct Cli {
    /// Path to a TOML config file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Fetch a single page
    Page {
        /// Page URL; defaults to the first catalog page
        #[arg(short, long)]
        url: Option<String>,
        /// Print records as JSON
        #[arg(long)]
        json: bool,
    },
    /// Walk the catalog page by page, like scrolling the feed
    Browse {
        /// Number of pages to load
        #[arg(short, long, default_value_t = 2)]
        pages: usize,
    },
    /// Resolve one school or sport
    Entity {
        /// school | sport
        kind: EntityKind,
        id: u64,
    },
}
