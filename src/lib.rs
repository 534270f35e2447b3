//! Verdant: A Fast, Modular Vegetation Anomaly Detector
//!
//! This library compares a newly acquired vegetation-index raster against a
//! temporal baseline of prior rasters and flags anomalous pixels with an
//! unsupervised outlier model trained on per-pixel time series.

pub mod core;
pub mod io;
pub mod types;

// Re-export main types and functions for easier access
pub use types::{
    AnomalyLabel, AnomalyMap, AnomalyStatistics, FeatureMatrix, Grid, LabelVector, VegError,
    VegResult,
};

pub use crate::core::{
    AnomalyPipeline, AnomalyReport, AnomalyScorer, DeviationScorer, DeviationScorerParams,
    TemporalStack, TemporalStackBuilder,
};

pub use io::{BaselineArchive, BaselineProvider, ScorerStore};
