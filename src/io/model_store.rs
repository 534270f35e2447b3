use crate::core::scorer::{DeviationScorer, DeviationScorerParams};
use crate::types::{FeatureMatrix, VegError, VegResult};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

/// On-disk persistence for a fitted scorer, JSON format.
///
/// The store is get/put only; the loaded model is immutable and shared
/// read-only by the pipeline.
#[derive(Debug, Clone)]
pub struct ScorerStore {
    path: PathBuf,
}

impl ScorerStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    pub fn load(&self) -> VegResult<DeviationScorer> {
        let file = File::open(&self.path).map_err(|e| VegError::ResourceAccess {
            path: self.path.display().to_string(),
            reason: e.to_string(),
        })?;
        let scorer = serde_json::from_reader(BufReader::new(file)).map_err(|e| {
            VegError::InvalidFormat(format!(
                "model store '{}' is corrupt: {}",
                self.path.display(),
                e
            ))
        })?;
        log::info!("Model loaded from {}", self.path.display());
        Ok(scorer)
    }

    pub fn save(&self, scorer: &DeviationScorer) -> VegResult<()> {
        let file = File::create(&self.path).map_err(|e| VegError::ResourceAccess {
            path: self.path.display().to_string(),
            reason: e.to_string(),
        })?;
        serde_json::to_writer_pretty(BufWriter::new(file), scorer).map_err(|e| {
            VegError::Processing(format!(
                "failed to serialize model to '{}': {}",
                self.path.display(),
                e
            ))
        })?;
        log::info!("Model saved to {}", self.path.display());
        Ok(())
    }

    /// Load the stored model if present, otherwise fit one on `matrix` and
    /// persist it.
    pub fn load_or_fit(
        &self,
        matrix: &FeatureMatrix,
        params: DeviationScorerParams,
    ) -> VegResult<DeviationScorer> {
        if self.exists() {
            return self.load();
        }
        let scorer = DeviationScorer::fit(matrix, params)?;
        self.save(&scorer)?;
        Ok(scorer)
    }
}
