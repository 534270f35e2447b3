use crate::types::{AnomalyLabel, FeatureMatrix, LabelVector, VegError, VegResult};
use ndarray::{Array1, ArrayView1, Axis};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Capability interface for per-pixel outlier models.
///
/// The pipeline treats the model as opaque: one label per feature-matrix
/// row, in row order. Implementations are read-only after construction and
/// `Send + Sync`, so one model instance may serve concurrent requests.
pub trait AnomalyScorer: Send + Sync {
    /// Time-series length (feature-matrix column count) the model was
    /// trained for. Drives the stack builder's required length.
    fn expected_time_length(&self) -> usize;

    /// Classify each pixel time series. Must fail with
    /// `ModelCompatibility` when the matrix column count differs from
    /// [`expected_time_length`](Self::expected_time_length).
    fn predict(&self, matrix: &FeatureMatrix) -> VegResult<LabelVector>;

    /// Standard compatibility check for implementations to call at the top
    /// of `predict`.
    fn ensure_compatible(&self, matrix: &FeatureMatrix) -> VegResult<()> {
        let actual = matrix.len_of(Axis(1));
        let expected = self.expected_time_length();
        if actual != expected {
            return Err(VegError::ModelCompatibility { expected, actual });
        }
        Ok(())
    }
}

/// Tuning parameters for [`DeviationScorer`]
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct DeviationScorerParams {
    /// Expected fraction of anomalous pixels in the training matrix; sets
    /// the score threshold at the matching quantile
    pub contamination: f64,
    /// Floor applied to per-time-step standard deviations to keep constant
    /// time steps from blowing up the z-scores
    pub min_std: f64,
}

impl Default for DeviationScorerParams {
    fn default() -> Self {
        Self {
            contamination: 0.02,
            min_std: 1e-6,
        }
    }
}

/// Deterministic reference outlier model: mean squared z-score of a pixel's
/// time series against the per-time-step population statistics.
///
/// Stands in for heavier unsupervised models (isolation forests and the
/// like) behind the same [`AnomalyScorer`] trait; fitting and prediction are
/// fully deterministic, so pipeline output is reproducible bit for bit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviationScorer {
    time_length: usize,
    column_means: Vec<f64>,
    column_stds: Vec<f64>,
    threshold: f64,
    params: DeviationScorerParams,
}

impl DeviationScorer {
    /// Fit per-time-step statistics and the contamination-quantile threshold
    /// on a training feature matrix.
    pub fn fit(matrix: &FeatureMatrix, params: DeviationScorerParams) -> VegResult<Self> {
        let (pixels, time) = matrix.dim();
        if pixels == 0 || time == 0 {
            return Err(VegError::ZeroArea(format!(
                "cannot fit scorer on an empty feature matrix ({}x{})",
                pixels, time
            )));
        }
        if !(0.0..=1.0).contains(&params.contamination) {
            return Err(VegError::Processing(format!(
                "contamination must lie in [0, 1], got {}",
                params.contamination
            )));
        }

        log::info!(
            "Fitting deviation scorer on {} pixels x {} time steps (contamination {})",
            pixels,
            time,
            params.contamination
        );

        let mut column_means = Vec::with_capacity(time);
        let mut column_stds = Vec::with_capacity(time);
        for column in matrix.axis_iter(Axis(1)) {
            let mean = column.iter().map(|v| *v as f64).sum::<f64>() / pixels as f64;
            let var = column
                .iter()
                .map(|v| {
                    let d = *v as f64 - mean;
                    d * d
                })
                .sum::<f64>()
                / pixels as f64;
            column_means.push(mean);
            column_stds.push(var.sqrt().max(params.min_std));
        }

        let mut scores: Vec<f64> = matrix
            .axis_iter(Axis(0))
            .map(|row| score_row(&row, &column_means, &column_stds))
            .collect();
        scores.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

        let flagged = ((pixels as f64) * params.contamination).ceil() as usize;
        let threshold = if flagged == 0 {
            f64::INFINITY
        } else if flagged >= pixels {
            f64::NEG_INFINITY
        } else {
            // Highest training score still labeled normal
            scores[pixels - flagged - 1]
        };

        log::debug!("Score threshold set to {}", threshold);

        Ok(Self {
            time_length: time,
            column_means,
            column_stds,
            threshold,
            params,
        })
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn params(&self) -> &DeviationScorerParams {
        &self.params
    }

    fn label_row(&self, row: &ArrayView1<'_, f32>) -> AnomalyLabel {
        let score = score_row(row, &self.column_means, &self.column_stds);
        if score > self.threshold {
            AnomalyLabel::Anomaly
        } else {
            AnomalyLabel::Normal
        }
    }
}

impl AnomalyScorer for DeviationScorer {
    fn expected_time_length(&self) -> usize {
        self.time_length
    }

    fn predict(&self, matrix: &FeatureMatrix) -> VegResult<LabelVector> {
        self.ensure_compatible(matrix)?;

        let pixels = matrix.len_of(Axis(0));
        log::info!("Scoring {} pixel time series", pixels);

        // Pointwise per-row work; the parallel path is order-preserving and
        // bit-identical to the serial one.
        let labels: Vec<AnomalyLabel> = if cfg!(feature = "parallel") {
            matrix
                .axis_iter(Axis(0))
                .into_par_iter()
                .map(|row| self.label_row(&row))
                .collect()
        } else {
            matrix
                .axis_iter(Axis(0))
                .map(|row| self.label_row(&row))
                .collect()
        };

        Ok(Array1::from_vec(labels))
    }
}

fn score_row(row: &ArrayView1<'_, f32>, means: &[f64], stds: &[f64]) -> f64 {
    let mut sum = 0.0;
    for (t, value) in row.iter().enumerate() {
        let z = (*value as f64 - means[t]) / stds[t];
        sum += z * z;
    }
    sum / row.len() as f64
}
