//! Harness around a controller with in-memory collaborators

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use equiv_core::features::solver::{MemoryQueryRecorder, ScriptedSolver};
use equiv_core::{CegarController, EquivConfig, EquivalenceOracle};
use equiv_storage::InMemoryResultStore;
use tempfile::TempDir;

pub const BENCHMARK: &str = "Ell/sqrt";

pub fn test_config(artifacts: &Path) -> EquivConfig {
    let mut config = EquivConfig::default();
    config.run.artifacts_dir = artifacts.to_path_buf();
    config.solver.parallelism = 2;
    config.solver.timeout_ms = 1_000;
    config
}

pub struct Harness {
    pub controller: CegarController,
    pub store: Arc<InMemoryResultStore>,
    pub solver: Arc<ScriptedSolver>,
    pub recorder: Arc<MemoryQueryRecorder>,
    pub dir: TempDir,
}

impl Harness {
    pub fn new(solver: ScriptedSolver) -> Self {
        Self::with_config(solver, |_| {})
    }

    pub fn with_config(solver: ScriptedSolver, configure: impl FnOnce(&mut EquivConfig)) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let mut config = test_config(dir.path());
        configure(&mut config);

        let solver = Arc::new(solver);
        let recorder = Arc::new(MemoryQueryRecorder::new());
        let store = Arc::new(InMemoryResultStore::new());
        let oracle = EquivalenceOracle::new(
            solver.clone(),
            recorder.clone(),
            Duration::from_millis(config.solver.timeout_ms),
        );
        let controller = CegarController::new(config, oracle, store.clone());

        Self {
            controller,
            store,
            solver,
            recorder,
            dir,
        }
    }

    pub fn tool(&self) -> String {
        self.controller.config().tool_label()
    }

    pub fn results_path(&self) -> std::path::PathBuf {
        self.dir
            .path()
            .join(BENCHMARK)
            .join(self.tool())
            .join("results.txt")
    }
}
