//! Job parameters read from an optional JSON configuration file

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use log::info;
use serde::Deserialize;

/// Scheduler options and naming rules applied to every submitted job.
///
/// Every field has a sensible default, so a configuration file only needs the
/// keys it wants to change. Unknown keys are rejected rather than silently
/// ignored.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct JobConfig {
    /// Partition the jobs are queued on
    #[serde(default = "default_partition")]
    pub partition: String,
    #[serde(default = "default_nodes")]
    pub nodes: u32,
    #[serde(default = "default_tasks_per_node")]
    pub tasks_per_node: u32,
    #[serde(default = "default_cpus_per_task")]
    pub cpus_per_task: u32,
    /// Wall time limit in sbatch syntax
    #[serde(default = "default_time")]
    pub time: String,
    #[serde(default)]
    pub mode: RunMode,
    /// Command line the job script runs inside the directory
    #[serde(default = "default_command")]
    pub command: String,
    /// Megabytes added on top of what the control file asks for
    #[serde(default = "default_memory_buffer")]
    pub memory_buffer: u64,
    #[serde(default = "default_name_prefix")]
    pub name_prefix: String,
    /// How many trailing path segments make up the job name
    #[serde(default = "default_name_depth")]
    pub name_depth: u32,
    #[serde(default = "default_control_file")]
    pub control_file: String,
    /// Template file used instead of the built-in one
    #[serde(default)]
    pub template: Option<PathBuf>,
}

/// How the Turbomole binaries are driven inside the job
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunMode {
    Serial,
    #[default]
    Parallel,
}

impl fmt::Display for RunMode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            RunMode::Serial => write!(f, "serial"),
            RunMode::Parallel => write!(f, "parallel"),
        }
    }
}

fn default_partition() -> String {
    "standard".to_string()
}

fn default_nodes() -> u32 {
    1
}

fn default_tasks_per_node() -> u32 {
    1
}

fn default_cpus_per_task() -> u32 {
    4
}

fn default_time() -> String {
    "72:00:00".to_string()
}

fn default_command() -> String {
    "jobex -ri -c 200".to_string()
}

fn default_memory_buffer() -> u64 {
    200
}

fn default_name_prefix() -> String {
    "tm_".to_string()
}

fn default_name_depth() -> u32 {
    2
}

fn default_control_file() -> String {
    "control".to_string()
}

impl Default for JobConfig {
    fn default() -> Self {
        JobConfig {
            partition: default_partition(),
            nodes: default_nodes(),
            tasks_per_node: default_tasks_per_node(),
            cpus_per_task: default_cpus_per_task(),
            time: default_time(),
            mode: RunMode::default(),
            command: default_command(),
            memory_buffer: default_memory_buffer(),
            name_prefix: default_name_prefix(),
            name_depth: default_name_depth(),
            control_file: default_control_file(),
            template: None,
        }
    }
}

impl JobConfig {
    /// Reject values no job could be submitted with.
    pub fn validate(&self) -> Result<()> {
        if self.nodes == 0 {
            bail!("nodes must be at least 1");
        }
        if self.tasks_per_node == 0 {
            bail!("tasks_per_node must be at least 1");
        }
        if self.cpus_per_task == 0 {
            bail!("cpus_per_task must be at least 1");
        }
        if self.name_depth == 0 {
            bail!("name_depth must be at least 1");
        }
        Ok(())
    }
}

/// Load the configuration, preferring an explicitly given file.
///
/// An explicit path must exist and parse. Without one, the default location
/// is read when present and the built-in defaults apply otherwise.
pub fn load(path: Option<&Path>) -> Result<JobConfig> {
    let config = match path {
        Some(path) => read(path)?,
        None => match default_path() {
            Some(path) if path.exists() => read(&path)?,
            _ => JobConfig::default(),
        },
    };
    config.validate()?;
    Ok(config)
}

fn read(path: &Path) -> Result<JobConfig> {
    info!("reading configuration from {}", path.display());
    let text = fs::read_to_string(path)
        .with_context(|| format!("can't read configuration {}", path.display()))?;
    serde_json::from_str(&text)
        .with_context(|| format!("can't parse configuration {}", path.display()))
}

/// `~/.config/turbosub/config.json` or the platform equivalent
fn default_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("turbosub").join("config.json"))
}
