//! Small preprocessing utilities shared by the trainer strategies.
//!
//! Provides a simple Scaler for mean/std standardization. The scaler is
//! fitted on the training split only and persisted with the model so that
//! later inference can reproduce the exact transformation.

use ndarray::Array2;
use serde::{Deserialize, Serialize};

/// Simple standard scaler (per-column mean/std).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Scaler {
    pub mean: Vec<f32>,
    pub std: Vec<f32>,
}

impl Scaler {
    /// Minimum stddev to avoid division by zero when transforming.
    const MIN_STD: f32 = 1e-6;
}

/// Fit a `Scaler` from an `Array2<f32>` where rows are samples and
/// columns are features.
pub fn fit_scaler(x: &Array2<f32>) -> Scaler {
    let nrows = x.nrows();
    let ncols = x.ncols();
    assert!(
        nrows > 0 && ncols > 0,
        "fit_scaler requires non-empty matrix"
    );

    let mut mean = vec![0.0f32; ncols];
    for r in 0..nrows {
        for c in 0..ncols {
            mean[c] += x[[r, c]];
        }
    }
    let nrows_f = nrows as f32;
    for v in mean.iter_mut() {
        *v /= nrows_f;
    }

    let mut var = vec![0.0f32; ncols];
    for r in 0..nrows {
        for c in 0..ncols {
            let d = x[[r, c]] - mean[c];
            var[c] += d * d;
        }
    }
    for v in var.iter_mut() {
        *v = (*v / nrows_f).sqrt().max(Scaler::MIN_STD);
    }

    Scaler { mean, std: var }
}

/// Transform all rows using the provided `Scaler` and return a new `Array2<f32>`.
pub fn transform_all(x: &Array2<f32>, sc: &Scaler) -> Array2<f32> {
    let nrows = x.nrows();
    let ncols = x.ncols();
    let mut out = Vec::with_capacity(nrows * ncols);

    for r in 0..nrows {
        for c in 0..ncols {
            let v = (x[[r, c]] - sc.mean[c]) / sc.std[c];
            out.push(v);
        }
    }

    Array2::from_shape_vec((nrows, ncols), out).expect("transform_all: shape mismatch")
}
