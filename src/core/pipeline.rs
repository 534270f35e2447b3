use crate::core::anomaly_map::reconstruct;
use crate::core::features::to_feature_matrix;
use crate::core::scorer::AnomalyScorer;
use crate::core::stack::TemporalStackBuilder;
use crate::io::{raster, BaselineProvider};
use crate::types::{AnomalyMap, AnomalyStatistics, Grid, VegError, VegResult};
use std::path::Path;

/// Output contract handed to the presentation adapter.
#[derive(Debug, Clone)]
pub struct AnomalyReport {
    /// The query grid as submitted, untouched by the pipeline
    pub query_grid: Grid,
    pub anomaly_map: AnomalyMap,
    pub statistics: AnomalyStatistics,
}

/// End-to-end anomaly detection for a single query raster.
///
/// The scorer is read-only configuration passed in at construction; the
/// pipeline holds no other state, so one instance may serve concurrent
/// requests. Each request either fully succeeds or aborts at the failing
/// stage with no partial output.
pub struct AnomalyPipeline<S: AnomalyScorer> {
    scorer: S,
}

impl<S: AnomalyScorer> AnomalyPipeline<S> {
    pub fn new(scorer: S) -> Self {
        Self { scorer }
    }

    pub fn scorer(&self) -> &S {
        &self.scorer
    }

    /// Run detection for an already-read query grid.
    ///
    /// Stages: temporal stack assembly, feature-matrix reshape, scoring,
    /// spatial reconstruction. A baseline archive too small to reach the
    /// scorer's expected time length fails with `InsufficientBaseline`
    /// before any scoring happens.
    pub fn detect(&self, query: Grid, baselines: &dyn BaselineProvider) -> VegResult<AnomalyReport> {
        let required = self.scorer.expected_time_length();
        let builder = TemporalStackBuilder::new(required);

        let stack = builder.build(&query, baselines)?;
        if stack.len() < required {
            return Err(VegError::InsufficientBaseline {
                available: stack.len() - 1,
                required: required - 1,
            });
        }

        let matrix = to_feature_matrix(&stack);
        drop(stack);

        let labels = self.scorer.predict(&matrix)?;
        drop(matrix);

        let (height, width) = query.dim();
        let (anomaly_map, statistics) = reconstruct(&labels, height, width)?;

        log::info!("Detection complete: {}", statistics);

        Ok(AnomalyReport {
            query_grid: query,
            anomaly_map,
            statistics,
        })
    }

    /// Read the query raster from disk, then run [`detect`](Self::detect).
    pub fn detect_file<P: AsRef<Path>>(
        &self,
        path: P,
        baselines: &dyn BaselineProvider,
    ) -> VegResult<AnomalyReport> {
        let query = raster::read_grid(path)?;
        self.detect(query, baselines)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{AnomalyLabel, LabelVector, FeatureMatrix};
    use ndarray::{Array1, Array2, Axis};

    struct MemoryProvider {
        identifiers: Vec<String>,
        grids: Vec<Grid>,
    }

    impl MemoryProvider {
        fn new(grids: Vec<Grid>) -> Self {
            let identifiers = (0..grids.len()).map(|i| format!("b{:02}.tif", i)).collect();
            Self { identifiers, grids }
        }
    }

    impl BaselineProvider for MemoryProvider {
        fn identifiers(&self) -> &[String] {
            &self.identifiers
        }

        fn read(&self, identifier: &str) -> VegResult<Grid> {
            let idx = self
                .identifiers
                .iter()
                .position(|id| id == identifier)
                .unwrap();
            Ok(self.grids[idx].clone())
        }
    }

    /// Flags every pixel whose time-series mean exceeds a fixed cut.
    struct MeanCutScorer {
        time_length: usize,
        cut: f32,
    }

    impl AnomalyScorer for MeanCutScorer {
        fn expected_time_length(&self) -> usize {
            self.time_length
        }

        fn predict(&self, matrix: &FeatureMatrix) -> VegResult<LabelVector> {
            self.ensure_compatible(matrix)?;
            let labels: Vec<AnomalyLabel> = matrix
                .axis_iter(Axis(0))
                .map(|row| {
                    let mean = row.sum() / row.len() as f32;
                    if mean > self.cut {
                        AnomalyLabel::Anomaly
                    } else {
                        AnomalyLabel::Normal
                    }
                })
                .collect();
            Ok(Array1::from_vec(labels))
        }
    }

    #[test]
    fn test_detect_maps_labels_back_to_pixels() {
        // Pixel (1, 0) carries a persistently high series
        let make_grid = |hot: f32| {
            let mut g = Array2::from_elem((2, 2), 0.2_f32);
            g[[1, 0]] = hot;
            g
        };

        let query = make_grid(0.9);
        let provider = MemoryProvider::new((0..3).map(|_| make_grid(0.85)).collect());

        let pipeline = AnomalyPipeline::new(MeanCutScorer {
            time_length: 4,
            cut: 0.5,
        });

        let report = pipeline.detect(query.clone(), &provider).unwrap();
        assert_eq!(report.query_grid, query);
        assert_eq!(report.anomaly_map[[1, 0]], AnomalyLabel::Anomaly);
        assert_eq!(report.statistics.anomaly_count, 1);
        assert_eq!(report.statistics.total_pixels, 4);
    }

    #[test]
    fn test_insufficient_baseline_aborts_before_scoring() {
        let provider = MemoryProvider::new(vec![Array2::from_elem((2, 2), 0.2_f32); 5]);
        let pipeline = AnomalyPipeline::new(MeanCutScorer {
            time_length: 24,
            cut: 0.5,
        });

        let err = pipeline
            .detect(Array2::from_elem((2, 2), 0.2), &provider)
            .unwrap_err();
        match err {
            VegError::InsufficientBaseline {
                available,
                required,
            } => {
                assert_eq!(available, 5);
                assert_eq!(required, 23);
            }
            other => panic!("expected InsufficientBaseline, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_query_file_is_resource_error() {
        let provider = MemoryProvider::new(vec![]);
        let pipeline = AnomalyPipeline::new(MeanCutScorer {
            time_length: 1,
            cut: 0.5,
        });

        let err = pipeline
            .detect_file("/nonexistent/ndvi.tif", &provider)
            .unwrap_err();
        assert!(matches!(err, VegError::ResourceAccess { .. }));
        assert_eq!(err.stage(), "raster-access");
    }
}
