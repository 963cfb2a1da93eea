//! Command line interface

use std::path::PathBuf;
use std::process;

use clap::error::ErrorKind;
use clap::{Args, Parser};

/// Render sbatch scripts for Turbomole job directories and submit them
#[derive(Debug, Parser)]
#[command(name = "turbosub", version, about)]
pub struct Cli {
    #[command(flatten)]
    pub modes: RunModes,
    /// Read configuration from this file instead of the default location
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,
    /// Job directories to process
    #[arg(value_name = "DIR")]
    pub dirs: Vec<PathBuf>,
}

/// Switches that change what a run does to each directory
#[derive(Debug, Clone, Copy, Default, Args)]
pub struct RunModes {
    /// Only submit directories an interrupted optimisation left behind
    #[arg(long)]
    pub restart: bool,
    /// Write job scripts but submit nothing
    #[arg(long)]
    pub dry_run: bool,
    /// Request undivided memory for a NumForce run
    #[arg(long)]
    pub numforce: bool,
    /// Ask for exclusive use of the node
    #[arg(long)]
    pub exclusive: bool,
    /// Skip the control file and leave the memory request empty
    #[arg(long)]
    pub no_control: bool,
}

/// Parse the command line.
///
/// Requested help or version output exits 0, anything malformed exits 1.
pub fn parse() -> Cli {
    match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => match err.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => err.exit(),
            _ => {
                let _ = err.print();
                process::exit(1);
            }
        },
    }
}
