use crate::config::{Strategy, TrainerConfig};
use crate::models::trainer_trait::BinaryTrainer;

/// Build a boxed trainer for the configured strategy.
/// Currently this is a thin factory implemented as a single function.
pub fn build_trainer(
    config: &TrainerConfig,
    modelid: &str,
    directory: &str,
) -> Box<dyn BinaryTrainer> {
    match config.strategy {
        Strategy::LogisticRegression => Box::new(
            crate::models::logistic::LogisticTrainer::new(modelid, directory, config.clone()),
        ),

        Strategy::NeuralNetwork => Box::new(crate::models::neural_net::NeuralNetTrainer::new(
            modelid,
            directory,
            config.clone(),
        )),

        #[cfg(feature = "tensorflow")]
        Strategy::TensorflowNn => Box::new(crate::models::tensorflow::TensorFlowTrainer::nn(
            modelid,
            directory,
            config.clone(),
        )),

        #[cfg(feature = "tensorflow")]
        Strategy::TensorflowLogistic => Box::new(
            crate::models::tensorflow::TensorFlowTrainer::logistic(modelid, directory, config.clone()),
        ),

        #[cfg(feature = "tensorflow")]
        Strategy::TensorflowDnn => Box::new(crate::models::tensorflow::TensorFlowTrainer::dnn(
            modelid,
            directory,
            config.clone(),
        )), // When compiled, `Strategy` only contains the variants enabled by
            // features. The above arms are exhaustive for the compiled enum,
            // so no catch-all arm is necessary.
    }
}
