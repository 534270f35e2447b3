use ndarray::{Array1, Array2, Array3};
use serde::{Deserialize, Serialize};

/// Real-valued vegetation-index sample (normalized indices lie in [-1, 1])
pub type VegSample = f32;

/// 2D vegetation-index grid for one time step (height x width)
pub type Grid = Array2<VegSample>;

/// 3D temporal data cube (time x height x width)
pub type StackArray = Array3<VegSample>;

/// Per-pixel time-series matrix (pixels x time), model input
pub type FeatureMatrix = Array2<VegSample>;

/// One classification label per feature-matrix row
pub type LabelVector = Array1<AnomalyLabel>;

/// Spatial per-pixel classification result (height x width)
pub type AnomalyMap = Array2<AnomalyLabel>;

/// Per-pixel classification outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AnomalyLabel {
    Normal,
    Anomaly,
}

impl AnomalyLabel {
    /// Decode the signed convention used by scikit-learn style outlier
    /// models: -1 = anomaly, +1 = normal.
    pub fn from_signed(value: i8) -> Self {
        if value < 0 {
            AnomalyLabel::Anomaly
        } else {
            AnomalyLabel::Normal
        }
    }

    /// Encode back to the signed -1/+1 convention.
    pub fn to_signed(self) -> i8 {
        match self {
            AnomalyLabel::Anomaly => -1,
            AnomalyLabel::Normal => 1,
        }
    }

    pub fn is_anomaly(self) -> bool {
        matches!(self, AnomalyLabel::Anomaly)
    }
}

impl std::fmt::Display for AnomalyLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AnomalyLabel::Normal => write!(f, "normal"),
            AnomalyLabel::Anomaly => write!(f, "anomaly"),
        }
    }
}

/// Summary statistics derived from an anomaly map
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnomalyStatistics {
    pub anomaly_count: usize,
    pub total_pixels: usize,
    /// 100 * anomaly_count / total_pixels
    pub percentage: f64,
}

impl std::fmt::Display for AnomalyStatistics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} of {} pixels anomalous ({:.2}%)",
            self.anomaly_count, self.total_pixels, self.percentage
        )
    }
}

/// Error types for vegetation anomaly processing
#[derive(Debug, thiserror::Error)]
pub enum VegError {
    #[error(
        "shape mismatch in '{source_id}': expected {expected_height}x{expected_width}, \
         got {actual_height}x{actual_width}"
    )]
    ShapeMismatch {
        source_id: String,
        expected_height: usize,
        expected_width: usize,
        actual_height: usize,
        actual_width: usize,
    },

    #[error("insufficient baseline: {available} baseline grids available, {required} required")]
    InsufficientBaseline { available: usize, required: usize },

    #[error(
        "model incompatibility: model expects time length {expected}, feature matrix has {actual}"
    )]
    ModelCompatibility { expected: usize, actual: usize },

    #[error("zero-area raster: {0}")]
    ZeroArea(String),

    #[error("resource access error for '{path}': {reason}")]
    ResourceAccess { path: String, reason: String },

    #[error("invalid data format: {0}")]
    InvalidFormat(String),

    #[error("processing error: {0}")]
    Processing(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl VegError {
    /// Pipeline stage at which this error class is detected; consumed by the
    /// presentation layer when rendering a failed request.
    pub fn stage(&self) -> &'static str {
        match self {
            VegError::ResourceAccess { .. } | VegError::InvalidFormat(_) | VegError::Io(_) => {
                "raster-access"
            }
            VegError::ShapeMismatch { .. }
            | VegError::ZeroArea(_)
            | VegError::InsufficientBaseline { .. } => "stack-assembly",
            VegError::ModelCompatibility { .. } => "scoring",
            VegError::Processing(_) => "reconstruction",
        }
    }
}

/// Result type for vegetation anomaly operations
pub type VegResult<T> = Result<T, VegError>;
