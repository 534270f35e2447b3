use crate::io::raster;
use crate::types::{Grid, VegError, VegResult};
use chrono::NaiveDate;
use std::path::{Path, PathBuf};

/// Ordered, enumerable access to the historical baseline rasters.
///
/// The iteration order feeds straight into feature-matrix columns, so it is
/// part of the persisted contract alongside the trained model: a provider
/// must return the same identifiers in the same order for the lifetime of
/// that model.
pub trait BaselineProvider {
    /// Raster identifiers in the provider's deterministic, stable order.
    fn identifiers(&self) -> &[String];

    /// Read one baseline grid by identifier.
    fn read(&self, identifier: &str) -> VegResult<Grid>;
}

/// Baseline archive backed by a directory of single-band TIFF rasters.
///
/// Ordering is chronological when every filename carries a parseable
/// acquisition date (`YYYYMM` or `YYYYMMDD`, separators allowed), and
/// purely lexical otherwise. The ordering is fixed at `open` time.
#[derive(Debug, Clone)]
pub struct BaselineArchive {
    root: PathBuf,
    identifiers: Vec<String>,
}

impl BaselineArchive {
    /// Enumerate `.tif`/`.tiff` files under `root` and fix their order.
    pub fn open<P: AsRef<Path>>(root: P) -> VegResult<Self> {
        let root = root.as_ref().to_path_buf();

        let entries = std::fs::read_dir(&root).map_err(|e| VegError::ResourceAccess {
            path: root.display().to_string(),
            reason: e.to_string(),
        })?;

        let mut identifiers = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| VegError::ResourceAccess {
                path: root.display().to_string(),
                reason: e.to_string(),
            })?;
            let name = entry.file_name().to_string_lossy().into_owned();
            let lower = name.to_ascii_lowercase();
            if lower.ends_with(".tif") || lower.ends_with(".tiff") {
                identifiers.push(name);
            }
        }

        let chronological = identifiers
            .iter()
            .map(|name| acquisition_date(name))
            .collect::<Option<Vec<_>>>();

        match chronological {
            Some(dates) => {
                let mut keyed: Vec<(NaiveDate, String)> =
                    dates.into_iter().zip(identifiers).collect();
                keyed.sort();
                identifiers = keyed.into_iter().map(|(_, name)| name).collect();
                log::info!(
                    "Baseline archive {}: {} rasters, chronological order",
                    root.display(),
                    identifiers.len()
                );
            }
            None => {
                identifiers.sort();
                log::info!(
                    "Baseline archive {}: {} rasters, lexical order",
                    root.display(),
                    identifiers.len()
                );
            }
        }

        Ok(Self { root, identifiers })
    }

    pub fn len(&self) -> usize {
        self.identifiers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.identifiers.is_empty()
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl BaselineProvider for BaselineArchive {
    fn identifiers(&self) -> &[String] {
        &self.identifiers
    }

    fn read(&self, identifier: &str) -> VegResult<Grid> {
        raster::read_grid(self.root.join(identifier))
    }
}

/// Extract an acquisition date from a raster filename.
///
/// Accepts the first digit runs forming `YYYYMMDD`, `YYYYMM`,
/// `YYYY-MM[-DD]` or `YYYY_MM[_DD]`; missing day defaults to the 1st.
fn acquisition_date(name: &str) -> Option<NaiveDate> {
    let mut runs: Vec<&str> = Vec::new();
    let mut start = None;
    for (i, ch) in name.char_indices() {
        if ch.is_ascii_digit() {
            if start.is_none() {
                start = Some(i);
            }
        } else if let Some(s) = start.take() {
            runs.push(&name[s..i]);
        }
    }
    if let Some(s) = start {
        runs.push(&name[s..]);
    }

    let first = runs.first()?;
    let (year, month, day) = if first.len() >= 6 {
        let year = first[..4].parse().ok()?;
        let month = first[4..6].parse().ok()?;
        let day = if first.len() >= 8 {
            first[6..8].parse().ok()?
        } else {
            1
        };
        (year, month, day)
    } else if first.len() == 4 {
        let year = first.parse().ok()?;
        let month = runs.get(1)?.parse().ok()?;
        let day = runs
            .get(2)
            .and_then(|r| r.parse().ok())
            .filter(|d| *d >= 1 && *d <= 31)
            .unwrap_or(1);
        (year, month, day)
    } else {
        return None;
    };

    NaiveDate::from_ymd_opt(year, month, day)
}
