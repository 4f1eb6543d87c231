//! TensorFlow-backed trainer variants (plain NN, logistic regression, deep
//! NN) sharing one graph-mode builder. Requires the `tensorflow` feature and
//! a libtensorflow installation.
use std::path::Path;

use anyhow::{Context, Result};
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};
use tensorflow::ops;
use tensorflow::train::{GradientDescentOptimizer, MinimizeOptions, Optimizer};
use tensorflow::{
    DataType, Output, Scope, Session, SessionOptions, SessionRunArgs, Status, Tensor, Variable,
};

use crate::config::TrainerConfig;
use crate::envelope::TrainOutcome;
use crate::models::trainer_trait::BinaryTrainer;
use crate::preprocessing::Scaler;
use crate::run::{finish_run, prepare_dataset, RunContext};
use crate::stats::{evaluate, log_loss};

/// Learned parameters of one dense layer, persisted to `model.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayerWeights {
    pub w: Vec<f32>,
    pub w_shape: (usize, usize),
    pub b: Vec<f32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TensorFlowModel {
    pub strategy: String,
    pub hidden_layers: Vec<usize>,
    pub layers: Vec<LayerWeights>,
    pub feature_names: Vec<String>,
    pub scaler: Scaler,
}

pub struct TensorFlowTrainer {
    ctx: RunContext,
    hidden_layers: Vec<usize>,
    strategy_name: &'static str,
}

impl TensorFlowTrainer {
    /// Single sigmoid hidden layer.
    pub fn nn(modelid: &str, directory: &str, config: TrainerConfig) -> Self {
        let hidden = config.hidden_units.max(1);
        TensorFlowTrainer {
            ctx: RunContext::new(modelid, directory, config),
            hidden_layers: vec![hidden],
            strategy_name: "tensorflow-nn",
        }
    }

    /// No hidden layers: a sigmoid output over a linear combination.
    pub fn logistic(modelid: &str, directory: &str, config: TrainerConfig) -> Self {
        TensorFlowTrainer {
            ctx: RunContext::new(modelid, directory, config),
            hidden_layers: Vec::new(),
            strategy_name: "tensorflow-logistic",
        }
    }

    /// Stack of sigmoid hidden layers from `deep_hidden_units`.
    pub fn dnn(modelid: &str, directory: &str, config: TrainerConfig) -> Self {
        let mut hidden = config.deep_hidden_units.clone();
        if hidden.is_empty() {
            hidden.push(config.hidden_units.max(1));
        }
        TensorFlowTrainer {
            ctx: RunContext::new(modelid, directory, config),
            hidden_layers: hidden,
            strategy_name: "tensorflow-dnn",
        }
    }

    fn train_inner(&mut self, path: &Path) -> Result<TrainOutcome> {
        let prepared = prepare_dataset(path, &self.ctx.config)?;

        let fitted = fit_graph(
            &prepared.x_train,
            &prepared.y_train,
            &prepared.x_test,
            &self.hidden_layers,
            &self.ctx.config,
        )
        .context("TensorFlow training failed")?;

        let metrics = evaluate(&fitted.test_scores, &prepared.y_test);
        log::info!(
            "Evaluation: accuracy {:.4}, auc {:.4} over {} held-out samples",
            metrics.accuracy,
            metrics.auc,
            prepared.y_test.len()
        );

        let model = TensorFlowModel {
            strategy: self.strategy_name.to_string(),
            hidden_layers: self.hidden_layers.clone(),
            layers: fitted.layers,
            feature_names: prepared.feature_names.clone(),
            scaler: prepared.scaler.clone(),
        };
        finish_run(&self.ctx, self.strategy_name, &model, metrics, &fitted.losses)
    }
}

impl BinaryTrainer for TensorFlowTrainer {
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
        self.strategy_name
    }
}

struct FittedGraph {
    layers: Vec<LayerWeights>,
    losses: Vec<f32>,
    test_scores: Array1<f32>,
}

/// One dense layer: `activation(input * w + b)`.
fn layer<O: Into<Output>>(
    input: O,
    input_size: u64,
    output_size: u64,
    activation: &dyn Fn(Output, &mut Scope) -> Result<Output, Status>,
    scope: &mut Scope,
) -> Result<(Vec<Variable>, Output), Status> {
    let mut scope = scope.new_sub_scope("layer");
    let scope = &mut scope;
    let w_shape = ops::constant(&[input_size as i64, output_size as i64][..], scope)?;
    let w = Variable::builder()
        .initial_value(
            ops::RandomStandardNormal::new()
                .dtype(DataType::Float)
                .build(w_shape, scope)?,
        )
        .data_type(DataType::Float)
        .shape([input_size, output_size])
        .build(&mut scope.with_op_name("w"))?;
    let b = Variable::builder()
        .const_initial_value(Tensor::<f32>::new(&[output_size]))
        .build(&mut scope.with_op_name("b"))?;
    Ok((
        vec![w.clone(), b.clone()],
        activation(
            ops::add(
                ops::mat_mul(input, w.output().clone(), scope)?,
                b.output().clone(),
                scope,
            )?
            .into(),
            scope,
        )?,
    ))
}

/// Build and train the graph, then score the held-out partition with the
/// same session.
fn fit_graph(
    x_train: &Array2<f32>,
    y_train: &Array1<i32>,
    x_test: &Array2<f32>,
    hidden_layers: &[usize],
    config: &TrainerConfig,
) -> Result<FittedGraph, Status> {
    let n_features = x_train.ncols() as u64;

    let mut scope = Scope::new_root_scope();
    let scope = &mut scope;
    let input = ops::Placeholder::new()
        .dtype(DataType::Float)
        .build(&mut scope.with_op_name("input"))?;
    let label = ops::Placeholder::new()
        .dtype(DataType::Float)
        .build(&mut scope.with_op_name("label"))?;

    let mut variables = Vec::new();
    let mut current: Output = input.clone().into();
    let mut current_size = n_features;
    for &width in hidden_layers {
        let (vars, out) = layer(
            current,
            current_size,
            width as u64,
            &|x, scope| Ok(ops::sigmoid(x, scope)?.into()),
            scope,
        )?;
        variables.extend(vars);
        current = out;
        current_size = width as u64;
    }
    let (vars_out, output) = layer(
        current,
        current_size,
        1,
        &|x, scope| Ok(ops::sigmoid(x, scope)?.into()),
        scope,
    )?;
    variables.extend(vars_out);

    let error = ops::sub(output.clone(), label.clone(), scope)?;
    let error_squared = ops::mul(error.clone(), error, scope)?;

    let optimizer =
        GradientDescentOptimizer::new(ops::constant(config.learning_rate, scope)?.into());
    let (minimizer_vars, minimize) = optimizer.minimize(
        scope,
        error_squared.clone().into(),
        MinimizeOptions::default().with_variables(&variables),
    )?;

    let session = Session::new(&SessionOptions::new(), &scope.graph())?;

    // Initialize variables.
    let mut run_args = SessionRunArgs::new();
    for var in &variables {
        run_args.add_target(var.initializer());
    }
    for var in &minimizer_vars {
        run_args.add_target(var.initializer());
    }
    session.run(&mut run_args)?;

    let input_tensor = matrix_tensor(x_train);
    let n_train = y_train.len() as u64;
    let mut label_tensor = Tensor::<f32>::new(&[n_train, 1]);
    for (i, &value) in y_train.iter().enumerate() {
        label_tensor[i] = value as f32;
    }

    // Full-batch training; the per-epoch loss is averaged host-side.
    let mut losses = Vec::with_capacity(config.epochs);
    for _ in 0..config.epochs {
        let mut run_args = SessionRunArgs::new();
        run_args.add_target(&minimize);
        let output_fetch = run_args.request_fetch(&output.operation, output.index);
        run_args.add_feed(&input, 0, &input_tensor);
        run_args.add_feed(&label, 0, &label_tensor);
        session.run(&mut run_args)?;

        let probabilities = run_args.fetch::<f32>(output_fetch)?;
        let probabilities = Array1::from_vec(probabilities.to_vec());
        losses.push(log_loss(&probabilities, y_train));
    }

    // Score the held-out partition.
    let test_tensor = matrix_tensor(x_test);
    let mut run_args = SessionRunArgs::new();
    let output_fetch = run_args.request_fetch(&output.operation, output.index);
    run_args.add_feed(&input, 0, &test_tensor);
    session.run(&mut run_args)?;
    let test_scores = Array1::from_vec(run_args.fetch::<f32>(output_fetch)?.to_vec());

    // Pull the learned weights out of the session for persistence.
    let mut layers = Vec::new();
    for pair in variables.chunks(2) {
        let mut run_args = SessionRunArgs::new();
        let w_fetch = {
            let out = pair[0].output();
            run_args.request_fetch(&out.operation, out.index)
        };
        let b_fetch = {
            let out = pair[1].output();
            run_args.request_fetch(&out.operation, out.index)
        };
        session.run(&mut run_args)?;
        let w = run_args.fetch::<f32>(w_fetch)?;
        let b = run_args.fetch::<f32>(b_fetch)?;
        let dims = w.dims().to_vec();
        layers.push(LayerWeights {
            w: w.to_vec(),
            w_shape: (dims[0] as usize, dims[1] as usize),
            b: b.to_vec(),
        });
    }

    Ok(FittedGraph {
        layers,
        losses,
        test_scores,
    })
}

fn matrix_tensor(x: &Array2<f32>) -> Tensor<f32> {
    let mut tensor = Tensor::<f32>::new(&[x.nrows() as u64, x.ncols() as u64]);
    for r in 0..x.nrows() {
        for c in 0..x.ncols() {
            tensor[r * x.ncols() + c] = x[[r, c]];
        }
    }
    tensor
}
