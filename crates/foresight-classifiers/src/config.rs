use std::path::Path;
use std::str::FromStr;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Central configuration for trainers in the crate.
#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(default)]
pub struct TrainerConfig {
    /// Classifier strategy built by the factory.
    pub strategy: Strategy,
    pub learning_rate: f32,
    pub epochs: usize,
    /// Fraction of samples held out for evaluation.
    pub test_fraction: f32,
    /// Hidden layer width for the neural-network strategies.
    pub hidden_units: usize,
    /// Hidden layer widths for the deep TensorFlow strategy.
    pub deep_hidden_units: Vec<usize>,
    /// Fixed RNG seed for reproducible splits and weight initialization.
    pub seed: Option<u64>,
}

impl Default for TrainerConfig {
    fn default() -> Self {
        Self {
            strategy: Strategy::default(),
            learning_rate: 0.5,
            epochs: 500,
            test_fraction: 0.2,
            hidden_units: 8,
            deep_hidden_units: vec![32, 16, 8],
            seed: None,
        }
    }
}

/// Supported trainer strategies.
///
/// The TensorFlow-backed variants are only part of the compiled enum when the
/// `tensorflow` feature is enabled, so a default build never requires
/// libtensorflow to be present.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum Strategy {
    LogisticRegression,
    NeuralNetwork,
    #[cfg(feature = "tensorflow")]
    TensorflowNn,
    #[cfg(feature = "tensorflow")]
    TensorflowLogistic,
    #[cfg(feature = "tensorflow")]
    TensorflowDnn,
}

impl Default for Strategy {
    fn default() -> Self {
        Strategy::LogisticRegression
    }
}

impl Strategy {
    pub fn name(&self) -> &'static str {
        match self {
            Strategy::LogisticRegression => "logistic-regression",
            Strategy::NeuralNetwork => "neural-network",
            #[cfg(feature = "tensorflow")]
            Strategy::TensorflowNn => "tensorflow-nn",
            #[cfg(feature = "tensorflow")]
            Strategy::TensorflowLogistic => "tensorflow-logistic",
            #[cfg(feature = "tensorflow")]
            Strategy::TensorflowDnn => "tensorflow-dnn",
        }
    }
}

impl FromStr for Strategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "logistic-regression" => Ok(Strategy::LogisticRegression),
            "neural-network" => Ok(Strategy::NeuralNetwork),
            #[cfg(feature = "tensorflow")]
            "tensorflow-nn" => Ok(Strategy::TensorflowNn),
            #[cfg(feature = "tensorflow")]
            "tensorflow-logistic" => Ok(Strategy::TensorflowLogistic),
            #[cfg(feature = "tensorflow")]
            "tensorflow-dnn" => Ok(Strategy::TensorflowDnn),
            _ => Err(format!(
                "Unknown strategy: {}. Valid options are logistic-regression and neural-network. \
                 The tensorflow-nn, tensorflow-logistic and tensorflow-dnn strategies require \
                 compiling with `--features tensorflow`",
                s
            )),
        }
    }
}

/// Load a trainer configuration from a JSON file.
pub fn load_trainer_config<P: AsRef<Path>>(path: P) -> Result<TrainerConfig> {
    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read config: {}", path.as_ref().display()))?;
    let config: TrainerConfig = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse config: {}", path.as_ref().display()))?;
    Ok(config)
}
