mod clear;
mod complete;
mod index;
mod stats;
mod view;

use clap::{Parser, Subcommand};
use luasense_core::config::LuasenseConfig;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "luasense",
    version,
    about = "Completion engine for Lua scripts driving a JVM host",
    long_about = "Luasense indexes the public members of classes found in JAR, ZIP and DEX \
                  archives and uses that index to complete Lua expressions: keywords, \
                  identifiers, class names, package functions and member chains."
)]
pub struct Cli {
    /// Base directory for the index, logs and config (defaults to $LUASENSE_HOME or ~/.luasense)
    #[arg(long, global = true, value_name = "DIR")]
    pub home: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Scan archives into the class index
    #[command(
        long_about = "Reflects every public class of the given archives into the persistent index. \
                      Directories are searched for archives. Archives already indexed with the \
                      same modification time are skipped."
    )]
    Index {
        /// Archives or directories containing archives
        #[arg(value_name = "PATH", required = true)]
        paths: Vec<PathBuf>,
    },
    /// Complete a line of Lua at a cursor position
    Complete(complete::CompleteArgs),
    /// Show index statistics
    Stats,
    /// Remove the persisted index
    Clear,
}

pub fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = match &cli.home {
        Some(home) => LuasenseConfig::load_from(home),
        None => LuasenseConfig::load(),
    };
    let _guard = luasense_runtime::init_logging(&config, "cli", false);

    match cli.command {
        Commands::Index { paths } => {
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(index::run(&config, paths))
        }
        Commands::Complete(args) => complete::run(config, args),
        Commands::Stats => stats::run(&config),
        Commands::Clear => clear::run(&config),
    }
}
