//! Training dataset CSV reader.
//!
//! A training file is a delimited text file with one header row of column
//! names. Every other column is a numeric feature; the target column (the
//! last column by default) holds the 0/1 class label.
use std::path::Path;

use anyhow::{anyhow, Context, Result};
use csv::StringRecord;
use ndarray::{Array1, Array2, Axis};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::error::DatasetError;

/// Parsed training data ready for model fitting.
#[derive(Debug, Clone)]
pub struct TrainingData {
    pub x: Array2<f32>,
    pub y: Array1<i32>,
    pub feature_names: Vec<String>,
}

/// Configuration for reading training CSV files.
#[derive(Debug, Clone)]
pub struct DatasetReaderConfig {
    /// Field delimiter. Defaults to comma; `.tsv`/`.tab` files switch to tab.
    pub delimiter: u8,
    /// Column holding the 0/1 target. When `None`, the last column is used.
    pub label_column: Option<String>,
}

impl Default for DatasetReaderConfig {
    fn default() -> Self {
        Self {
            delimiter: b',',
            label_column: None,
        }
    }
}

impl DatasetReaderConfig {
    /// Reader configuration with the delimiter inferred from the file
    /// extension.
    pub fn for_path<P: AsRef<Path>>(path: P) -> Self {
        let delimiter = match path
            .as_ref()
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase())
        {
            Some(ext) if ext == "tsv" || ext == "tab" => b'\t',
            _ => b',',
        };
        Self {
            delimiter,
            label_column: None,
        }
    }
}

/// Read a training file into a feature matrix and label vector.
pub fn read_training_csv<P: AsRef<Path>>(path: P) -> Result<TrainingData> {
    let config = DatasetReaderConfig::for_path(&path);
    read_training_csv_with_config(path, &config)
}

/// Read a training file using a custom reader configuration.
pub fn read_training_csv_with_config<P: AsRef<Path>>(
    path: P,
    config: &DatasetReaderConfig,
) -> Result<TrainingData> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(config.delimiter)
        .has_headers(true)
        .from_path(&path)
        .with_context(|| format!("Failed to open training file: {}", path.as_ref().display()))?;

    let headers = reader
        .headers()
        .context("Failed to read training file header row")?
        .clone();

    if headers.len() < 2 {
        return Err(DatasetError::NoFeatures.into());
    }

    let label_idx = match &config.label_column {
        Some(name) => find_column(&headers, name)
            .ok_or_else(|| anyhow!("Missing target column '{}'", name))?,
        None => headers.len() - 1,
    };

    let feature_indices: Vec<usize> = (0..headers.len()).filter(|&idx| idx != label_idx).collect();
    let feature_names: Vec<String> = feature_indices
        .iter()
        .map(|&idx| headers.get(idx).unwrap_or("").to_string())
        .collect();

    let mut features = Vec::new();
    let mut labels = Vec::new();

    for (row_idx, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("Failed to read row {}", row_idx + 1))?;

        let raw_label = record
            .get(label_idx)
            .ok_or_else(|| anyhow!("Missing target value at row {}", row_idx + 1))?
            .trim();
        labels.push(parse_label(raw_label, row_idx + 1)?);

        for &idx in &feature_indices {
            let value = record
                .get(idx)
                .ok_or_else(|| anyhow!("Missing feature value at row {}", row_idx + 1))?;
            let parsed = value.trim().parse::<f32>().with_context(|| {
                format!(
                    "Invalid feature '{}' at row {}",
                    headers.get(idx).unwrap_or(""),
                    row_idx + 1
                )
            })?;
            if !parsed.is_finite() {
                return Err(DatasetError::NonFiniteFeature {
                    row: row_idx + 1,
                    column: headers.get(idx).unwrap_or("").to_string(),
                }
                .into());
            }
            features.push(parsed);
        }
    }

    let n_samples = labels.len();
    if n_samples == 0 {
        return Err(DatasetError::Empty.into());
    }

    let n_positive = labels.iter().filter(|&&v| v == 1).count();
    if n_positive == 0 {
        return Err(DatasetError::SingleClass(0).into());
    }
    if n_positive == n_samples {
        return Err(DatasetError::SingleClass(1).into());
    }

    let n_features = feature_indices.len();
    let x = Array2::from_shape_vec((n_samples, n_features), features)
        .context("Failed to build feature matrix")?;
    let y = Array1::from_vec(labels);

    Ok(TrainingData {
        x,
        y,
        feature_names,
    })
}

impl TrainingData {
    pub fn n_samples(&self) -> usize {
        self.x.nrows()
    }

    pub fn n_features(&self) -> usize {
        self.x.ncols()
    }

    /// Shuffled train/test split.
    ///
    /// The test partition gets `test_fraction` of the samples, clamped so
    /// both partitions are non-empty whenever there are at least two
    /// samples. A fixed `seed` makes the split reproducible.
    pub fn split(&self, test_fraction: f32, seed: Option<u64>) -> (TrainingData, TrainingData) {
        let n = self.n_samples();
        let mut indices: Vec<usize> = (0..n).collect();
        let mut rng: StdRng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        indices.shuffle(&mut rng);

        let n_test = if n < 2 {
            0
        } else {
            (((n as f32) * test_fraction).round() as usize).clamp(1, n - 1)
        };
        let (test_idx, train_idx) = indices.split_at(n_test);
        (self.select(train_idx), self.select(test_idx))
    }

    fn select(&self, indices: &[usize]) -> TrainingData {
        TrainingData {
            x: self.x.select(Axis(0), indices),
            y: self.y.select(Axis(0), indices),
            feature_names: self.feature_names.clone(),
        }
    }
}

fn parse_label(raw: &str, row: usize) -> Result<i32> {
    let invalid = || DatasetError::NonBinaryLabel {
        row,
        value: raw.to_string(),
    };
    let value = raw.parse::<f32>().map_err(|_| invalid())?;
    if value == 0.0 {
        Ok(0)
    } else if value == 1.0 {
        Ok(1)
    } else {
        Err(invalid().into())
    }
}

fn find_column(headers: &StringRecord, name: &str) -> Option<usize> {
    headers
        .iter()
        .position(|header| header.eq_ignore_ascii_case(name))
}
