//! Launcher core: argument triage, strategy resolution, and the boundary
//! that guarantees every invocation ends in a well-formed result envelope.
use std::path::Path;
use std::str::FromStr;

use anyhow::Result;

use foresight_classifiers::config::{load_trainer_config, Strategy, TrainerConfig};
use foresight_classifiers::envelope::TrainOutcome;
use foresight_classifiers::models::factory::build_trainer;

/// Environment variable selecting the trainer strategy by name.
pub const STRATEGY_ENV: &str = "FORESIGHT_STRATEGY";
/// Environment variable pointing at an optional JSON trainer configuration.
pub const CONFIG_ENV: &str = "FORESIGHT_TRAIN_CONFIG";

/// Resolve the trainer configuration from the environment.
///
/// Precedence: defaults, then the JSON file named by `FORESIGHT_TRAIN_CONFIG`,
/// then a `FORESIGHT_STRATEGY` override.
pub fn resolve_config() -> Result<TrainerConfig> {
    let mut config = match std::env::var_os(CONFIG_ENV) {
        Some(path) => load_trainer_config(Path::new(&path))?,
        None => TrainerConfig::default(),
    };
    if let Ok(name) = std::env::var(STRATEGY_ENV) {
        config.strategy = Strategy::from_str(&name).map_err(anyhow::Error::msg)?;
    }
    Ok(config)
}

/// Run the launcher over the raw process argument list (program name first)
/// and return the envelope to print. Never panics and never returns an
/// error: every failure is folded into the envelope so the caller can
/// always emit one JSON line and exit with its `status`.
pub fn run(argv: &[String]) -> TrainOutcome {
    let config = match resolve_config() {
        Ok(config) => config,
        Err(err) => {
            log::error!("Invalid trainer configuration: {:#}", err);
            return TrainOutcome::failure(
                None,
                argv.get(1).map(String::as_str),
                format!("Invalid trainer configuration: {:#}", err),
            );
        }
    };

    // Fewer than three usable arguments: report usage through the envelope.
    // A placeholder trainer supplies the run id; construction is side-effect
    // free so it leaves no trace.
    if argv.len() < 4 {
        let placeholder = build_trainer(&config, "", "");
        return TrainOutcome::missing_arguments(placeholder.get_runid(), argv);
    }

    // The first three arguments are used; anything further is ignored.
    let modelid = &argv[1];
    let directory = &argv[2];
    let training_file = &argv[3];

    let mut trainer = build_trainer(&config, modelid, directory);
    log::info!(
        "[Foresight] Training model {} with strategy {}",
        modelid,
        trainer.name()
    );
    trainer.train_dataset(Path::new(training_file))
}
