//! Shared run plumbing for trainer strategies: run identity, dataset
//! preparation, and persistence of the artifacts every successful run
//! leaves behind.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Utc;
use ndarray::{Array1, Array2};
use serde::Serialize;

use crate::config::TrainerConfig;
use crate::dataset::read_training_csv;
use crate::envelope::TrainOutcome;
use crate::preprocessing::{fit_scaler, transform_all, Scaler};
use crate::report::TrainingReport;
use crate::stats::EvaluationMetrics;

/// Identity and output location shared by every trainer strategy.
#[derive(Debug, Clone)]
pub struct RunContext {
    pub modelid: String,
    pub directory: PathBuf,
    pub runid: i64,
    pub config: TrainerConfig,
}

impl RunContext {
    pub fn new(modelid: &str, directory: &str, config: TrainerConfig) -> Self {
        RunContext {
            modelid: modelid.to_string(),
            directory: PathBuf::from(directory),
            runid: Utc::now().timestamp(),
            config,
        }
    }

    /// Output directory for this run: `<directory>/<modelid>/<runid>`.
    ///
    /// Created lazily at training time so an unconfigured trainer can hand
    /// out its run id without filesystem side effects.
    pub fn run_dir(&self) -> PathBuf {
        self.directory
            .join(&self.modelid)
            .join(self.runid.to_string())
    }

    pub fn prepare_run_dir(&self) -> Result<PathBuf> {
        let dir = self.run_dir();
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create run directory: {}", dir.display()))?;
        Ok(dir)
    }

    /// Failure envelope carrying this run's identity.
    pub fn failure(&self, message: impl Into<String>) -> TrainOutcome {
        TrainOutcome::failure(Some(self.runid), Some(&self.modelid), message)
    }
}

/// A dataset loaded, split, and standardized for training.
#[derive(Debug, Clone)]
pub struct PreparedData {
    pub x_train: Array2<f32>,
    pub y_train: Array1<i32>,
    pub x_test: Array2<f32>,
    pub y_test: Array1<i32>,
    pub scaler: Scaler,
    pub feature_names: Vec<String>,
}

/// Load a training CSV, split off the evaluation partition, and standardize
/// both partitions with a scaler fitted on the training split only.
pub fn prepare_dataset(path: &Path, config: &TrainerConfig) -> Result<PreparedData> {
    let data = read_training_csv(path)?;
    log::info!(
        "Loaded {} samples with {} features from {}",
        data.n_samples(),
        data.n_features(),
        path.display()
    );

    let (train, test) = data.split(config.test_fraction, config.seed);
    let scaler = fit_scaler(&train.x);
    let x_train = transform_all(&train.x, &scaler);

    let (x_test, y_test) = if test.n_samples() == 0 {
        log::warn!("Dataset too small to hold out a test partition; evaluating on training data");
        (x_train.clone(), train.y.clone())
    } else {
        (transform_all(&test.x, &scaler), test.y)
    };

    Ok(PreparedData {
        x_train,
        y_train: train.y,
        x_test,
        y_test,
        scaler,
        feature_names: data.feature_names,
    })
}

/// Persist the artifacts of a completed run and assemble the success
/// envelope.
///
/// Writes `model.json`, `config.json` and `report.html` under the run
/// directory, then returns an envelope carrying the evaluation metrics, the
/// final training loss, the strategy name and the run directory.
pub fn finish_run<M: Serialize>(
    ctx: &RunContext,
    strategy_name: &str,
    model: &M,
    metrics: EvaluationMetrics,
    losses: &[f32],
) -> Result<TrainOutcome> {
    let dir = ctx.prepare_run_dir()?;

    let model_path = dir.join("model.json");
    let model_json = serde_json::to_vec_pretty(model).context("Failed to serialize model")?;
    std::fs::write(&model_path, model_json)
        .with_context(|| format!("Failed to write model: {}", model_path.display()))?;

    let config_path = dir.join("config.json");
    let config_json =
        serde_json::to_vec_pretty(&ctx.config).context("Failed to serialize config")?;
    std::fs::write(&config_path, config_json)
        .with_context(|| format!("Failed to write config: {}", config_path.display()))?;

    let report = TrainingReport::new(strategy_name, &ctx.modelid, ctx.runid, &metrics, losses);
    report.save(&dir.join("report.html"), &ctx.config)?;

    log::info!(
        "Run {} for model {} finished; artifacts in {}",
        ctx.runid,
        ctx.modelid,
        dir.display()
    );

    let metrics_object = match serde_json::to_value(metrics).context("Failed to serialize metrics")? {
        serde_json::Value::Object(object) => object,
        _ => unreachable!("metrics serialize to an object"),
    };

    let mut outcome = TrainOutcome::success(ctx.runid, &ctx.modelid)
        .with_value("strategy", serde_json::json!(strategy_name))
        .with_object(metrics_object)
        .with_value("dir", serde_json::json!(dir.display().to_string()));
    if let Some(&final_loss) = losses.last() {
        outcome = outcome.with_value("loss", serde_json::json!(final_loss));
    }
    Ok(outcome)
}
