use std::path::Path;

use crate::envelope::TrainOutcome;

/// A small trait abstraction for the trainer strategies built by the
/// factory. This is the full capability set the launcher relies on, so
/// implementations can live next to their model code without the launcher
/// knowing anything else about them.
pub trait BinaryTrainer {
    /// Run identifier for this trainer instance. Must be callable before any
    /// training has happened, and must not touch the filesystem.
    fn get_runid(&self) -> i64;

    /// Train on the dataset at `path` and report the outcome. Every failure
    /// is folded into the returned envelope; this never panics across the
    /// boundary.
    fn train_dataset(&mut self, path: &Path) -> TrainOutcome;

    /// Optional human readable name for the strategy
    fn name(&self) -> &str {
        "trainer"
    }
}
