use crate::types::{AnomalyMap, AnomalyStatistics, LabelVector, VegError, VegResult};

/// Fold a flat label vector back into the spatial layout of the input grids
/// and derive summary statistics.
///
/// Uses the exact inverse of the row-major flattening applied by
/// [`to_feature_matrix`](crate::core::features::to_feature_matrix), so
/// `reconstruct(flatten(X), h, w)` reproduces `X` for any label grid `X`.
pub fn reconstruct(
    labels: &LabelVector,
    height: usize,
    width: usize,
) -> VegResult<(AnomalyMap, AnomalyStatistics)> {
    let total_pixels = height * width;
    if total_pixels == 0 {
        return Err(VegError::ZeroArea(format!(
            "cannot reconstruct a {}x{} anomaly map",
            height, width
        )));
    }
    if labels.len() != total_pixels {
        return Err(VegError::Processing(format!(
            "label vector has {} entries, expected {} for a {}x{} map",
            labels.len(),
            total_pixels,
            height,
            width
        )));
    }

    let map = labels
        .to_owned()
        .into_shape((height, width))
        .map_err(|e| VegError::Processing(format!("failed to reshape label vector: {}", e)))?;

    let anomaly_count = map.iter().filter(|l| l.is_anomaly()).count();
    let statistics = AnomalyStatistics {
        anomaly_count,
        total_pixels,
        percentage: 100.0 * anomaly_count as f64 / total_pixels as f64,
    };

    log::info!("Anomaly map reconstructed: {}", statistics);

    Ok((map, statistics))
}
