use std::io;
use std::path::Path;
use std::process::{Command, ExitStatus};

use log::{debug, info};

/// Hands a rendered script to the batch system.
pub trait Scheduler {
    /// Submit `script` with the scheduler process running inside `workdir`.
    fn submit(&self, script: &Path, workdir: &Path) -> io::Result<ExitStatus>;
}

/// The real sbatch binary on `$PATH`
pub struct Sbatch;

impl Scheduler for Sbatch {
    fn submit(&self, script: &Path, workdir: &Path) -> io::Result<ExitStatus> {
        info!("running sbatch in {}", workdir.display());
        // stdout and stderr stay inherited, the job id prints straight through
        let status = Command::new("sbatch")
            .arg(script)
            .current_dir(workdir)
            .status()?;
        debug!("sbatch exited with {status}");
        Ok(status)
    }
}
