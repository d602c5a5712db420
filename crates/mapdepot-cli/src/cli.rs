use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "mapdepot",
    about = "Mapdepot: incremental build pipeline for the public map database",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Incremental run: validate changed packages and publish updates
    Update {
        #[command(flatten)]
        build: BuildOpts,

        /// Exit nonzero when any candidate is rejected
        #[arg(long)]
        strict: bool,
    },

    /// Full rebuild: reprocess every package, mint fresh page tokens
    Rebuild {
        #[command(flatten)]
        build: BuildOpts,
    },

    /// Validate packages one-shot, without touching published state
    Validate {
        /// Package files to validate
        #[arg(required = true)]
        packages: Vec<PathBuf>,

        /// Player count the packages must declare
        #[arg(long)]
        expected_players: u8,

        /// Path to the maptools executable (default: resolve via PATH)
        #[arg(long)]
        maptools: Option<PathBuf>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Args)]
pub struct BuildOpts {
    /// Path to the repositories config JSON
    #[arg(long)]
    pub repos_config: PathBuf,

    /// Path to the public URLs config JSON
    #[arg(long)]
    pub urls_config: PathBuf,

    /// Directory holding one checkout per repository id
    #[arg(long)]
    pub source_root: PathBuf,

    /// Root of the published JSON data tree
    #[arg(long, default_value = "data")]
    pub data_root: PathBuf,

    /// Root of the content-addressed asset tree
    #[arg(long, default_value = "assets")]
    pub assets_root: PathBuf,

    /// Site-relative URL prefix the data tree is served under
    #[arg(long, default_value = "")]
    pub data_root_relurl: String,

    /// Records per published page
    #[arg(long, default_value_t = mapdepot_store::DEFAULT_PAGE_CAPACITY)]
    pub page_capacity: usize,

    /// Validation worker threads (default: one per CPU)
    #[arg(long)]
    pub workers: Option<usize>,

    /// Path to the maptools executable (default: resolve via PATH)
    #[arg(long)]
    pub maptools: Option<PathBuf>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}
