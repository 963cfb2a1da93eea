use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

use chrono::Utc;
use log::info;

use crate::config::JobConfig;
use crate::slurm::script::Substitutions;

/// File name of the rendered submission script inside each job directory
pub const SCRIPT_NAME: &str = "job.sh";

/// Placeholder tokens understood by the stock template.
///
/// Custom templates may use any subset of these; unknown text is left alone.
pub const JOBNAME: &str = "@JOBNAME@";
pub const PARTITION: &str = "@PARTITION@";
pub const NODES: &str = "@NODES@";
pub const NTASKS: &str = "@NTASKS@";
pub const CPUS: &str = "@CPUS@";
pub const TIME: &str = "@TIME@";
pub const MODE: &str = "@MODE@";
pub const COMMAND: &str = "@COMMAND@";
pub const MEMORY: &str = "@MEMORY@";
pub const WORKDIR: &str = "@WORKDIR@";
pub const DATE: &str = "@DATE@";

/// A rendered sbatch submission script for one job directory
pub struct JobScript {
    pub content: String,
}

impl JobScript {
    /// Render the template for one directory.
    ///
    /// Scheduler options from the configuration are substituted first, the
    /// per-directory values after them. A configured command may therefore
    /// mention `@MEMORY@` or `@WORKDIR@` and still come out resolved.
    pub fn render(
        config: &JobConfig,
        template: &str,
        exclusive: bool,
        dir: &Path,
        memory: Option<u64>,
    ) -> JobScript {
        let mut subs = Substitutions::new();
        subs.set(PARTITION, config.partition.clone())
            .set(NODES, config.nodes.to_string())
            .set(NTASKS, config.tasks_per_node.to_string())
            .set(CPUS, config.cpus_per_task.to_string())
            .set(TIME, config.time.clone())
            .set(MODE, config.mode.to_string())
            .set(COMMAND, config.command.clone())
            .set(MEMORY, memory_value(memory))
            .set(WORKDIR, dir.display().to_string())
            .set(JOBNAME, job_name(&config.name_prefix, config.name_depth, dir))
            .set(DATE, Utc::now().to_string());
        JobScript {
            content: subs.render(template, exclusive),
        }
    }

    /// Write the script into the job directory it was rendered for.
    pub fn write_to(&self, dir: &Path) -> io::Result<PathBuf> {
        let path = dir.join(SCRIPT_NAME);
        info!("writing job script to {}", path.display());
        fs::write(&path, &self.content)?;
        Ok(path)
    }
}

/// Format the `@MEMORY@` value: whole megabytes with the sbatch unit suffix,
/// or nothing at all when accounting is switched off.
fn memory_value(memory: Option<u64>) -> String {
    match memory {
        Some(mb) => format!("{mb}mb"),
        None => String::new(),
    }
}

/// Derive the job name from the tail of the directory path.
///
/// The last `depth` normal path segments are joined with underscores behind
/// the configured prefix. Paths with fewer segments use all of them.
pub fn job_name(prefix: &str, depth: u32, dir: &Path) -> String {
    let segments: Vec<&str> = dir
        .components()
        .filter_map(|component| match component {
            Component::Normal(segment) => segment.to_str(),
            _ => None,
        })
        .collect();
    let start = segments.len().saturating_sub(depth as usize);
    format!("{}{}", prefix, segments[start..].join("_"))
}
