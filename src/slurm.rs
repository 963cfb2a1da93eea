//! Render sbatch job scripts and hand them to the scheduler

/// Derive the memory request from control-file settings and job topology
pub mod memory;

/// Placeholder substitution over the submission template
pub mod script;

/// Assemble and write one directory's job script
pub mod job;

/// The sbatch collaborator
pub mod scheduler;
