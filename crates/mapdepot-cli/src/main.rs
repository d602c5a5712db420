//! Mapdepot CLI: the `mapdepot` command.

mod cli;
mod commands;
mod support;

use clap::Parser;
use cli::{Cli, Commands};

fn main() {
    let cli = Cli::parse();

    match cli.command {
        Commands::Update { build, strict } => commands::update::run_update(build, strict),

        Commands::Rebuild { build } => commands::rebuild::run_rebuild(build),

        Commands::Validate {
            packages,
            expected_players,
            maptools,
            json,
        } => commands::validate::run_validate(packages, expected_players, maptools, json),
    }
}
