use anyhow::Result;
use log::{info, warn};

use crate::slurm::scheduler::Sbatch;

mod batch;
mod cli;
mod config;
mod control;
mod slurm;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = cli::parse();
    let config = config::load(args.config.as_deref())?;
    let template = slurm::script::load_template(config.template.as_deref())?;

    if args.dirs.is_empty() {
        warn!("no target directories given");
        return Ok(());
    }

    let summary = batch::run(&config, args.modes, &template, &Sbatch, &args.dirs);
    info!(
        "done: {} submitted, {} rendered, {} skipped",
        summary.submitted, summary.rendered, summary.skipped
    );

    Ok(())
}
