//! From-scratch logistic regression trained with batch gradient descent.
use std::path::Path;

use anyhow::Result;
use ndarray::{Array1, Array2};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::config::TrainerConfig;
use crate::envelope::TrainOutcome;
use crate::models::sigmoid_vec;
use crate::models::trainer_trait::BinaryTrainer;
use crate::preprocessing::Scaler;
use crate::run::{finish_run, prepare_dataset, RunContext};
use crate::stats::{evaluate, log_loss};

const STRATEGY_NAME: &str = "logistic-regression";

/// Learned parameters persisted to `model.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogisticModel {
    pub strategy: String,
    pub weights: Vec<f32>,
    pub bias: f32,
    pub feature_names: Vec<String>,
    pub scaler: Scaler,
}

pub struct LogisticTrainer {
    ctx: RunContext,
    model: Option<LogisticModel>,
}

impl LogisticTrainer {
    pub fn new(modelid: &str, directory: &str, config: TrainerConfig) -> Self {
        LogisticTrainer {
            ctx: RunContext::new(modelid, directory, config),
            model: None,
        }
    }

    pub fn model(&self) -> Option<&LogisticModel> {
        self.model.as_ref()
    }

    fn train_inner(&mut self, path: &Path) -> Result<TrainOutcome> {
        let prepared = prepare_dataset(path, &self.ctx.config)?;

        let (weights, bias, losses) =
            fit_logistic(&prepared.x_train, &prepared.y_train, &self.ctx.config);

        let scores = predict_proba(&prepared.x_test, &weights, bias);
        let metrics = evaluate(&scores, &prepared.y_test);
        log::info!(
            "Evaluation: accuracy {:.4}, auc {:.4} over {} held-out samples",
            metrics.accuracy,
            metrics.auc,
            prepared.y_test.len()
        );

        let model = LogisticModel {
            strategy: STRATEGY_NAME.to_string(),
            weights: weights.to_vec(),
            bias,
            feature_names: prepared.feature_names.clone(),
            scaler: prepared.scaler.clone(),
        };
        let outcome = finish_run(&self.ctx, STRATEGY_NAME, &model, metrics, &losses)?;
        self.model = Some(model);
        Ok(outcome)
    }
}

impl BinaryTrainer for LogisticTrainer {
    fn get_runid(&self) -> i64 {
        self.ctx.runid
    }

    fn train_dataset(&mut self, path: &Path) -> TrainOutcome {
        match self.train_inner(path) {
            Ok(outcome) => outcome,
            Err(err) => {
                log::error!("Training failed: {:#}", err);
                self.ctx.failure(format!("Training failed: {:#}", err))
            }
        }
    }

    fn name(&self) -> &str {
        STRATEGY_NAME
    }
}

/// Batch gradient descent on the logistic loss.
///
/// Returns the learned weight vector, bias, and the per-epoch log-loss
/// history.
fn fit_logistic(
    x: &Array2<f32>,
    y: &Array1<i32>,
    config: &TrainerConfig,
) -> (Array1<f32>, f32, Vec<f32>) {
    let n = x.nrows() as f32;
    let mut rng: StdRng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let mut weights = Array1::from_shape_fn(x.ncols(), |_| rng.gen_range(-0.01..0.01f32));
    let mut bias = 0.0f32;
    let targets = y.mapv(|v| v as f32);

    let mut losses = Vec::with_capacity(config.epochs);
    for _ in 0..config.epochs {
        let probabilities = sigmoid_vec(&(x.dot(&weights) + bias));
        let residual = &probabilities - &targets;

        let grad_w = x.t().dot(&residual) / n;
        let grad_b = residual.sum() / n;

        weights = &weights - &(grad_w * config.learning_rate);
        bias -= grad_b * config.learning_rate;

        losses.push(log_loss(&probabilities, y));
    }

    (weights, bias, losses)
}

/// Predicted probability of the positive class for each row.
pub fn predict_proba(x: &Array2<f32>, weights: &Array1<f32>, bias: f32) -> Array1<f32> {
    sigmoid_vec(&(x.dot(weights) + bias))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TrainerConfig;

    fn separable_data(n_per_class: usize) -> (Array2<f32>, Array1<i32>) {
        let mut rows = Vec::new();
        let mut labels = Vec::new();
        for i in 0..n_per_class {
            let jitter = (i % 5) as f32 * 0.05;
            rows.extend_from_slice(&[2.0 + jitter, -1.5 - jitter]);
            labels.push(1);
            rows.extend_from_slice(&[-2.0 - jitter, 1.5 + jitter]);
            labels.push(0);
        }
        let x = Array2::from_shape_vec((n_per_class * 2, 2), rows).unwrap();
        (x, Array1::from_vec(labels))
    }

    #[test]
    fn gradient_descent_separates_blobs() {
        let (x, y) = separable_data(20);
        let config = TrainerConfig {
            seed: Some(42),
            epochs: 400,
            ..TrainerConfig::default()
        };

        let (weights, bias, losses) = fit_logistic(&x, &y, &config);
        let scores = predict_proba(&x, &weights, bias);

        let correct = scores
            .iter()
            .zip(y.iter())
            .filter(|(&score, &label)| (score > 0.5) == (label == 1))
            .count();
        assert!(correct as f32 / y.len() as f32 > 0.95);

        // loss should decrease over training
        assert!(losses.last().unwrap() < losses.first().unwrap());
    }
}
