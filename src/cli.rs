use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// dhwgen stochastic Degree Heating Week ensemble generator.
#[derive(Parser)]
#[command(
    name = "dhwgen",
    version,
    about = "Stochastic Degree Heating Week ensemble generator"
)]
pub struct Cli {
    /// Increase verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Available subcommands.
#[derive(Subcommand)]
pub enum Command {
    /// Generate one ensemble per configured scenario.
    Generate(GenerateArgs),
}

/// Arguments for the `generate` subcommand.
#[derive(clap::Args)]
pub struct GenerateArgs {
    /// Path to TOML configuration file.
    #[arg(short, long, default_value = "dhwgen.toml")]
    pub config: PathBuf,

    /// Override output directory from config.
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Override base RNG seed from config.
    #[arg(short, long)]
    pub seed: Option<u64>,
}
