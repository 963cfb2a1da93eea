use crate::control::resources::Resources;

/// Cores one job occupies: nodes × tasks per node × cpus per task.
pub fn total_cores(nodes: u32, tasks_per_node: u32, cpus_per_task: u32) -> u64 {
    nodes as u64 * tasks_per_node as u64 * cpus_per_task as u64
}

/// Per-cpu memory request in MB.
///
/// The control-file settings cover the whole job, so they are spread over all
/// cores together with one MB per core and the configured buffer, rounded up
/// to keep the total at or above what the job needs.
pub fn per_cpu(resources: &Resources, cores: u64, buffer: u64) -> u64 {
    let need = resources.ricore + resources.rpacor + cores + buffer;
    (need + cores - 1) / cores
}

/// Whole-job memory request in MB for NumForce runs.
///
/// NumForce schedules its displacement calculations itself, so the request is
/// handed over undivided.
pub fn undivided(resources: &Resources, buffer: u64) -> u64 {
    resources.ricore + resources.rpacor + buffer
}
