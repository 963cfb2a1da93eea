use std::path::Path;

/// Marker files whose presence means a run was started and can be picked up
/// again: killed mid-optimisation, failed, or out of cycles.
pub const RESTART_MARKERS: [&str; 3] = ["GEO_OPT_RUNNING", "GEO_OPT_FAILED", "not.converged"];

/// Marker file jobex leaves once a geometry optimisation has converged.
pub const CONVERGED_MARKER: &str = "GEO_OPT_CONVERGED";

/// Run state inferred from marker files in a target directory.
///
/// Presence is all that matters; the markers are never opened.
#[derive(Debug, Clone, Copy)]
pub struct RunState {
    pub restartable: bool,
    pub converged: bool,
}

impl RunState {
    pub fn probe(dir: &Path) -> Self {
        Self {
            restartable: RESTART_MARKERS.iter().any(|name| dir.join(name).exists()),
            converged: dir.join(CONVERGED_MARKER).exists(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn untouched_directory_has_no_state() {
        let dir = tempdir().expect("tempdir");
        let state = RunState::probe(dir.path());
        assert!(!state.restartable);
        assert!(!state.converged);
    }

    #[test]
    fn any_restart_marker_counts() {
        for marker in RESTART_MARKERS {
            let dir = tempdir().expect("tempdir");
            fs::write(dir.path().join(marker), "").expect("marker");
            assert!(RunState::probe(dir.path()).restartable, "{marker}");
        }
    }

    #[test]
    fn converged_marker_alone_is_not_restartable() {
        let dir = tempdir().expect("tempdir");
        fs::write(dir.path().join(CONVERGED_MARKER), "").expect("marker");
        let state = RunState::probe(dir.path());
        assert!(!state.restartable);
        assert!(state.converged);
    }

    #[test]
    fn restart_and_converged_markers_can_coexist() {
        let dir = tempdir().expect("tempdir");
        fs::write(dir.path().join("GEO_OPT_FAILED"), "").expect("marker");
        fs::write(dir.path().join(CONVERGED_MARKER), "").expect("marker");
        let state = RunState::probe(dir.path());
        assert!(state.restartable);
        assert!(state.converged);
    }
}
