// ABOUTME: Command line argument definitions and parsing using Clap
// ABOUTME: Defines the main CLI structure and subcommands for muster

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "muster")]
#[command(about = "An execution engine for hierarchical task network plans")]
#[command(version)]
pub struct Args {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(short, long, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(short, long, global = true, help = "Path to configuration file")]
    pub config: Option<PathBuf>,

    #[arg(long, global = true, help = "Disable colored output")]
    pub no_color: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Execute a plan from a YAML or JSON file
    Run {
        #[arg(help = "Path to plan file")]
        plan: PathBuf,

        #[arg(long, help = "Ask for confirmation before dispatching each task")]
        confirm: bool,

        #[arg(short, long, help = "Write the run report to a JSON file")]
        output: Option<PathBuf>,
    },

    /// Validate a plan file without executing it
    Validate {
        #[arg(help = "Path to plan file")]
        plan: PathBuf,
    },

    /// Write a starter plan file
    Init {
        #[arg(help = "Name of the plan to create")]
        name: String,

        #[arg(short, long, help = "Output directory", default_value = ".")]
        output_dir: PathBuf,
    },
}

impl Args {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
