//! Core anomaly-detection pipeline modules

pub mod anomaly_map;
pub mod features;
pub mod pipeline;
pub mod scorer;
pub mod stack;

// Re-export main types
pub use anomaly_map::reconstruct;
pub use features::{time_step_from_matrix, to_feature_matrix};
pub use pipeline::{AnomalyPipeline, AnomalyReport};
pub use scorer::{AnomalyScorer, DeviationScorer, DeviationScorerParams};
pub use stack::{TemporalStack, TemporalStackBuilder};
