use ndarray::Array1;
use serde::Serialize;

/// Confusion-matrix cell counts for binary predictions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConfusionCounts {
    pub true_positives: usize,
    pub false_positives: usize,
    pub true_negatives: usize,
    pub false_negatives: usize,
}

impl ConfusionCounts {
    pub fn total(&self) -> usize {
        self.true_positives + self.false_positives + self.true_negatives + self.false_negatives
    }

    pub fn accuracy(&self) -> f32 {
        let total = self.total();
        if total == 0 {
            return 0.0;
        }
        (self.true_positives + self.true_negatives) as f32 / total as f32
    }

    pub fn precision(&self) -> f32 {
        let predicted_positive = self.true_positives + self.false_positives;
        if predicted_positive == 0 {
            return 0.0;
        }
        self.true_positives as f32 / predicted_positive as f32
    }

    pub fn recall(&self) -> f32 {
        let actual_positive = self.true_positives + self.false_negatives;
        if actual_positive == 0 {
            return 0.0;
        }
        self.true_positives as f32 / actual_positive as f32
    }

    pub fn f1_score(&self) -> f32 {
        let p = self.precision();
        let r = self.recall();
        if p + r == 0.0 {
            return 0.0;
        }
        2.0 * p * r / (p + r)
    }
}

/// Evaluation metrics reported in the training result envelope.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct EvaluationMetrics {
    pub accuracy: f32,
    pub precision: f32,
    pub recall: f32,
    pub f1_score: f32,
    pub auc: f32,
}

/// Count confusion-matrix cells by thresholding scores at `threshold`.
///
/// # Arguments
///
/// * `scores` - Predicted probabilities (0..1), one per sample.
/// * `labels` - Binary labels, 1 for the positive class and 0 for the negative class.
/// * `threshold` - Scores strictly above this value are predicted positive.
pub fn confusion_counts(
    scores: &Array1<f32>,
    labels: &Array1<i32>,
    threshold: f32,
) -> ConfusionCounts {
    debug_assert_eq!(scores.len(), labels.len());
    let mut counts = ConfusionCounts::default();
    for (&score, &label) in scores.iter().zip(labels.iter()) {
        let predicted_positive = score > threshold;
        match (predicted_positive, label == 1) {
            (true, true) => counts.true_positives += 1,
            (true, false) => counts.false_positives += 1,
            (false, false) => counts.true_negatives += 1,
            (false, true) => counts.false_negatives += 1,
        }
    }
    counts
}

/// Estimate the area under the ROC curve with the rank-sum method.
///
/// Ties are resolved by assigning the average rank to every member of a tied
/// group, which matches the trapezoidal AUC over the empirical ROC curve.
///
/// # Arguments
///
/// * `scores` - Predicted scores; higher means more likely positive.
/// * `labels` - Binary labels (1 positive, 0 negative).
///
/// # Returns
///
/// The AUC in [0, 1], or 0.5 when only one class is present.
pub fn roc_auc(scores: &Array1<f32>, labels: &Array1<i32>) -> f32 {
    let n_pos = labels.iter().filter(|&&v| v == 1).count();
    let n_neg = labels.len() - n_pos;
    if n_pos == 0 || n_neg == 0 {
        return 0.5;
    }

    let mut sorted_indices = (0..scores.len()).collect::<Vec<usize>>();
    sorted_indices.sort_unstable_by(|&a, &b| {
        scores[a]
            .partial_cmp(&scores[b])
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    // Average ranks over tied score groups, then sum the positive ranks.
    let mut rank_sum_pos = 0.0f64;
    let mut i = 0;
    while i < sorted_indices.len() {
        let mut j = i;
        while j < sorted_indices.len() && scores[sorted_indices[j]] == scores[sorted_indices[i]] {
            j += 1;
        }
        // ranks are 1-based; everyone in [i, j) shares the average rank
        let avg_rank = ((i + 1 + j) as f64) / 2.0;
        for &idx in &sorted_indices[i..j] {
            if labels[idx] == 1 {
                rank_sum_pos += avg_rank;
            }
        }
        i = j;
    }

    let n_pos_f = n_pos as f64;
    let n_neg_f = n_neg as f64;
    let auc = (rank_sum_pos - n_pos_f * (n_pos_f + 1.0) / 2.0) / (n_pos_f * n_neg_f);
    auc as f32
}

/// Mean negative log-likelihood of binary labels under predicted probabilities.
///
/// Probabilities are clamped away from 0 and 1 so a confident wrong
/// prediction yields a large but finite loss.
pub fn log_loss(probabilities: &Array1<f32>, labels: &Array1<i32>) -> f32 {
    debug_assert_eq!(probabilities.len(), labels.len());
    if probabilities.is_empty() {
        return 0.0;
    }
    const EPS: f32 = 1e-7;
    let mut total = 0.0f32;
    for (&p, &label) in probabilities.iter().zip(labels.iter()) {
        let p = p.clamp(EPS, 1.0 - EPS);
        total += if label == 1 { -p.ln() } else { -(1.0 - p).ln() };
    }
    total / probabilities.len() as f32
}

/// Compute the full metric set at the conventional 0.5 threshold.
pub fn evaluate(scores: &Array1<f32>, labels: &Array1<i32>) -> EvaluationMetrics {
    let counts = confusion_counts(scores, labels, 0.5);
    EvaluationMetrics {
        accuracy: counts.accuracy(),
        precision: counts.precision(),
        recall: counts.recall(),
        f1_score: counts.f1_score(),
        auc: roc_auc(scores, labels),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn confusion_counts_known_example() {
        let scores = Array1::from_vec(vec![0.9, 0.8, 0.4, 0.2, 0.6, 0.1]);
        let labels = Array1::from_vec(vec![1, 1, 1, 0, 0, 0]);
        let counts = confusion_counts(&scores, &labels, 0.5);
        assert_eq!(counts.true_positives, 2);
        assert_eq!(counts.false_negatives, 1);
        assert_eq!(counts.false_positives, 1);
        assert_eq!(counts.true_negatives, 2);
        assert!((counts.accuracy() - 4.0 / 6.0).abs() < 1e-6);
    }

    #[test]
    fn perfect_separation_has_auc_one() {
        let scores = Array1::from_vec(vec![0.9, 0.8, 0.7, 0.3, 0.2, 0.1]);
        let labels = Array1::from_vec(vec![1, 1, 1, 0, 0, 0]);
        assert!((roc_auc(&scores, &labels) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn random_scores_have_auc_half_with_ties() {
        let scores = Array1::from_vec(vec![0.5; 8]);
        let labels = Array1::from_vec(vec![1, 0, 1, 0, 1, 0, 1, 0]);
        assert!((roc_auc(&scores, &labels) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn single_class_auc_falls_back() {
        let scores = Array1::from_vec(vec![0.1, 0.9]);
        let labels = Array1::from_vec(vec![1, 1]);
        assert!((roc_auc(&scores, &labels) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn log_loss_is_finite_for_confident_mistakes() {
        let probabilities = Array1::from_vec(vec![1.0, 0.0]);
        let labels = Array1::from_vec(vec![0, 1]);
        let loss = log_loss(&probabilities, &labels);
        assert!(loss.is_finite());
        assert!(loss > 1.0);
    }

    #[test]
    fn evaluate_bounds() {
        let scores = Array1::from_vec(vec![0.9, 0.1, 0.7, 0.3]);
        let labels = Array1::from_vec(vec![1, 0, 1, 0]);
        let metrics = evaluate(&scores, &labels);
        for value in [
            metrics.accuracy,
            metrics.precision,
            metrics.recall,
            metrics.f1_score,
            metrics.auc,
        ] {
            assert!((0.0..=1.0).contains(&value));
        }
    }
}
