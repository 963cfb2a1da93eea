//! Per-directory run state read from Turbomole files

/// Extract memory settings from the `control` file
pub mod resources;

/// Probe marker files left behind by jobex
pub mod markers;
