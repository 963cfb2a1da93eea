//! One submission pass over the target directories

use std::path::{Path, PathBuf};

use log::{info, warn};

use crate::cli::RunModes;
use crate::config::JobConfig;
use crate::control::markers::RunState;
use crate::control::resources::Resources;
use crate::slurm::job::JobScript;
use crate::slurm::memory;
use crate::slurm::scheduler::Scheduler;

/// What one pass did, for the closing log line
#[derive(Debug, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub submitted: usize,
    pub rendered: usize,
    pub skipped: usize,
}

/// Process every directory independently.
///
/// A directory that can't be read, filtered or written is logged and skipped,
/// never the end of the pass.
pub fn run<S: Scheduler>(
    config: &JobConfig,
    modes: RunModes,
    template: &str,
    scheduler: &S,
    dirs: &[PathBuf],
) -> BatchSummary {
    let cores = memory::total_cores(config.nodes, config.tasks_per_node, config.cpus_per_task);
    let mut summary = BatchSummary::default();

    for dir in dirs {
        let dir = match canonical(dir) {
            Some(dir) => dir,
            None => {
                summary.skipped += 1;
                continue;
            }
        };

        if !modes.no_control && !dir.join(&config.control_file).exists() {
            warn!("{}: no {} file, skipping", dir.display(), config.control_file);
            summary.skipped += 1;
            continue;
        }

        if modes.restart {
            let state = RunState::probe(&dir);
            let eligible = modes.restart && state.restartable && !state.converged;
            if !eligible {
                info!("{}: nothing to restart, skipping", dir.display());
                summary.skipped += 1;
                continue;
            }
        }

        let memory = match modes.no_control {
            true => None,
            false => {
                let resources = match Resources::read(&dir, &config.control_file) {
                    Ok(resources) => resources,
                    Err(e) => {
                        warn!(
                            "{}: can't read {}: {}, skipping",
                            dir.display(),
                            config.control_file,
                            e
                        );
                        summary.skipped += 1;
                        continue;
                    }
                };
                match modes.numforce {
                    true => Some(memory::undivided(&resources, config.memory_buffer)),
                    false => Some(memory::per_cpu(&resources, cores, config.memory_buffer)),
                }
            }
        };

        let script = JobScript::render(config, template, modes.exclusive, &dir, memory);
        let script_path = match script.write_to(&dir) {
            Ok(path) => path,
            Err(e) => {
                warn!("{}: can't write job script: {}, skipping", dir.display(), e);
                summary.skipped += 1;
                continue;
            }
        };
        summary.rendered += 1;

        if modes.dry_run {
            info!("{}: dry run, not submitting", dir.display());
            continue;
        }

        match scheduler.submit(&script_path, &dir) {
            Ok(_) => summary.submitted += 1,
            Err(e) => warn!("{}: sbatch did not start: {}", dir.display(), e),
        }
    }

    summary
}

/// Absolute form of a target directory, or a logged skip.
fn canonical(dir: &Path) -> Option<PathBuf> {
    match dir.canonicalize() {
        Ok(dir) => Some(dir),
        Err(e) => {
            warn!("{}: {}, skipping", dir.display(), e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::fs;
    use std::io;
    use std::os::unix::process::ExitStatusExt;
    use std::process::ExitStatus;

    use crate::slurm::script::DEFAULT_TEMPLATE;

    struct FakeScheduler {
        calls: RefCell<Vec<(PathBuf, PathBuf)>>,
    }

    impl FakeScheduler {
        fn new() -> Self {
            FakeScheduler {
                calls: RefCell::new(Vec::new()),
            }
        }
    }

    impl Scheduler for FakeScheduler {
        fn submit(&self, script: &Path, workdir: &Path) -> io::Result<ExitStatus> {
            self.calls
                .borrow_mut()
                .push((script.to_path_buf(), workdir.to_path_buf()));
            Ok(ExitStatus::from_raw(0))
        }
    }

    struct UnavailableScheduler;

    impl Scheduler for UnavailableScheduler {
        fn submit(&self, _: &Path, _: &Path) -> io::Result<ExitStatus> {
            Err(io::Error::new(io::ErrorKind::NotFound, "sbatch not found"))
        }
    }

    fn job_dir(root: &Path, name: &str, control: Option<&str>) -> PathBuf {
        let dir = root.join(name);
        fs::create_dir(&dir).expect("dir");
        if let Some(text) = control {
            fs::write(dir.join("control"), text).expect("control");
        }
        dir
    }

    #[test]
    fn renders_submits_and_skips_per_directory() {
        let root = tempfile::tempdir().expect("tempdir");
        let d1 = job_dir(root.path(), "d1", Some("$ricore 300\n$rpacor 200\n"));
        let d2 = job_dir(root.path(), "d2", None);

        let config = JobConfig {
            tasks_per_node: 4,
            cpus_per_task: 1,
            memory_buffer: 100,
            ..JobConfig::default()
        };
        let scheduler = FakeScheduler::new();
        let summary = run(
            &config,
            RunModes::default(),
            DEFAULT_TEMPLATE,
            &scheduler,
            &[d1.clone(), d2.clone()],
        );

        assert_eq!(
            summary,
            BatchSummary {
                submitted: 1,
                rendered: 1,
                skipped: 1
            }
        );
        // (300 + 200 + 4 + 100) over 4 cores, rounded up
        let script = fs::read_to_string(d1.join("job.sh")).expect("script");
        assert!(script.contains("--mem-per-cpu=151mb"));
        assert!(!d2.join("job.sh").exists());

        let calls = scheduler.calls.borrow();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].1, d1.canonicalize().expect("canonical"));
        assert_eq!(calls[0].0, calls[0].1.join("job.sh"));
    }

    #[test]
    fn restart_needs_a_marker() {
        let root = tempfile::tempdir().expect("tempdir");
        let fresh = job_dir(root.path(), "fresh", Some("$ricore 300\n"));
        let stopped = job_dir(root.path(), "stopped", Some("$ricore 300\n"));
        fs::write(stopped.join("GEO_OPT_RUNNING"), "").expect("marker");
        let done = job_dir(root.path(), "done", Some("$ricore 300\n"));
        fs::write(done.join("GEO_OPT_FAILED"), "").expect("marker");
        fs::write(done.join("GEO_OPT_CONVERGED"), "").expect("marker");

        let modes = RunModes {
            restart: true,
            ..RunModes::default()
        };
        let scheduler = FakeScheduler::new();
        let summary = run(
            &JobConfig::default(),
            modes,
            DEFAULT_TEMPLATE,
            &scheduler,
            &[fresh.clone(), stopped.clone(), done.clone()],
        );

        assert_eq!(
            summary,
            BatchSummary {
                submitted: 1,
                rendered: 1,
                skipped: 2
            }
        );
        assert!(stopped.join("job.sh").exists());
        assert!(!fresh.join("job.sh").exists());
        assert!(!done.join("job.sh").exists());
    }

    #[test]
    fn dry_run_writes_scripts_without_submitting() {
        let root = tempfile::tempdir().expect("tempdir");
        let dir = job_dir(root.path(), "d", Some("$ricore 300\n$rpacor 200\n"));
        let modes = RunModes {
            dry_run: true,
            ..RunModes::default()
        };
        let scheduler = FakeScheduler::new();
        let summary = run(
            &JobConfig::default(),
            modes,
            DEFAULT_TEMPLATE,
            &scheduler,
            &[dir.clone()],
        );

        assert_eq!(
            summary,
            BatchSummary {
                submitted: 0,
                rendered: 1,
                skipped: 0
            }
        );
        assert!(dir.join("job.sh").exists());
        assert!(scheduler.calls.borrow().is_empty());
    }

    #[test]
    fn no_control_submits_without_a_memory_request() {
        let root = tempfile::tempdir().expect("tempdir");
        let dir = job_dir(root.path(), "bare", None);
        let modes = RunModes {
            no_control: true,
            ..RunModes::default()
        };
        let scheduler = FakeScheduler::new();
        let summary = run(
            &JobConfig::default(),
            modes,
            DEFAULT_TEMPLATE,
            &scheduler,
            &[dir.clone()],
        );

        assert_eq!(
            summary,
            BatchSummary {
                submitted: 1,
                rendered: 1,
                skipped: 0
            }
        );
        let script = fs::read_to_string(dir.join("job.sh")).expect("script");
        assert!(script.contains("--mem-per-cpu=\n"));
    }

    #[test]
    fn numforce_requests_the_undivided_need() {
        let root = tempfile::tempdir().expect("tempdir");
        let dir = job_dir(root.path(), "nf", Some("$ricore 300\n$rpacor 200\n"));
        let modes = RunModes {
            numforce: true,
            ..RunModes::default()
        };
        let config = JobConfig {
            memory_buffer: 100,
            ..JobConfig::default()
        };
        let scheduler = FakeScheduler::new();
        run(&config, modes, DEFAULT_TEMPLATE, &scheduler, &[dir.clone()]);

        let script = fs::read_to_string(dir.join("job.sh")).expect("script");
        assert!(script.contains("--mem-per-cpu=600mb"));
    }

    #[test]
    fn missing_directory_does_not_stop_the_pass() {
        let root = tempfile::tempdir().expect("tempdir");
        let good = job_dir(root.path(), "good", Some("$ricore 100\n$rpacor 100\n"));
        let absent = root.path().join("absent");

        let scheduler = FakeScheduler::new();
        let summary = run(
            &JobConfig::default(),
            RunModes::default(),
            DEFAULT_TEMPLATE,
            &scheduler,
            &[absent, good.clone()],
        );

        assert_eq!(
            summary,
            BatchSummary {
                submitted: 1,
                rendered: 1,
                skipped: 1
            }
        );
        assert!(good.join("job.sh").exists());
    }

    #[test]
    fn unreadable_control_is_skipped() {
        let root = tempfile::tempdir().expect("tempdir");
        let dir = root.path().join("odd");
        fs::create_dir(&dir).expect("dir");
        fs::create_dir(dir.join("control")).expect("control dir");

        let scheduler = FakeScheduler::new();
        let summary = run(
            &JobConfig::default(),
            RunModes::default(),
            DEFAULT_TEMPLATE,
            &scheduler,
            &[dir],
        );

        assert_eq!(
            summary,
            BatchSummary {
                submitted: 0,
                rendered: 0,
                skipped: 1
            }
        );
    }

    #[test]
    fn failed_spawn_leaves_the_script_behind() {
        let root = tempfile::tempdir().expect("tempdir");
        let d1 = job_dir(root.path(), "d1", Some("$ricore 100\n"));
        let d2 = job_dir(root.path(), "d2", Some("$ricore 100\n"));

        let summary = run(
            &JobConfig::default(),
            RunModes::default(),
            DEFAULT_TEMPLATE,
            &UnavailableScheduler,
            &[d1.clone(), d2.clone()],
        );

        assert_eq!(
            summary,
            BatchSummary {
                submitted: 0,
                rendered: 2,
                skipped: 0
            }
        );
        assert!(d1.join("job.sh").exists());
        assert!(d2.join("job.sh").exists());
    }
}
