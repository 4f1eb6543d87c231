pub mod logistic;
pub mod neural_net;
#[cfg(feature = "tensorflow")]
pub mod tensorflow;

pub mod factory;
pub mod trainer_trait;

use ndarray::{Array1, Array2};

// sigmoid "clamps" values (in a fairly scaled way) to 0..1
pub(crate) fn sigmoid(v: f32) -> f32 {
    1.0 / (1.0 + (-v).exp())
}

pub(crate) fn sigmoid_vec(z: &Array1<f32>) -> Array1<f32> {
    z.mapv(sigmoid)
}

pub(crate) fn sigmoid_mat(z: &Array2<f32>) -> Array2<f32> {
    z.mapv(sigmoid)
}

/// Derivative of the sigmoid expressed in terms of its activation value.
pub(crate) fn sigmoid_derivative(a: &Array2<f32>) -> Array2<f32> {
    a.mapv(|v| v * (1.0 - v))
}
