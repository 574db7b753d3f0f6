//! Root CLI structure for particle-sim

use clap::{Parser, Subcommand};

use crate::commands::run::RunArgs;
use crate::commands::scene::SceneArgs;

#[derive(Parser)]
#[command(name = "particle-sim")]
#[command(about = "Run particle effects headless and report what they would draw", long_about = None)]
#[command(version)]
#[command(author)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Verbosity level (can be repeated for more detail)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Simulate a single emitter
    Run(RunArgs),

    /// Simulate a scene file, or the built-in showcase
    Scene(SceneArgs),

    /// List the available emitter kinds
    Kinds,

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}
