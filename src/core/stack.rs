use crate::io::BaselineProvider;
use crate::types::{Grid, StackArray, VegError, VegResult};
use ndarray::{ArrayView2, Axis};

/// Time-aligned stack of shape-consistent vegetation-index grids.
///
/// Index 0 along the time axis is always the query grid under evaluation;
/// the remaining slices are baseline grids in the provider's deterministic
/// order. Construction goes through [`TemporalStack::from_grids`] or
/// [`TemporalStackBuilder::build`], which enforce the shape invariants.
#[derive(Debug, Clone)]
pub struct TemporalStack {
    data: StackArray,
}

impl TemporalStack {
    /// Assemble a stack from pre-read grids, query grid first.
    ///
    /// Fails with `ZeroArea` on an empty grid list or zero-pixel grids, and
    /// with `ShapeMismatch` when any grid disagrees with the first one.
    pub fn from_grids(grids: Vec<Grid>) -> VegResult<Self> {
        let first = grids.first().ok_or_else(|| {
            VegError::ZeroArea("cannot build a temporal stack from zero grids".to_string())
        })?;

        let (height, width) = first.dim();
        if height == 0 || width == 0 {
            return Err(VegError::ZeroArea(format!(
                "query grid has zero area ({}x{})",
                height, width
            )));
        }

        for (t, grid) in grids.iter().enumerate() {
            let (h, w) = grid.dim();
            if (h, w) != (height, width) {
                return Err(VegError::ShapeMismatch {
                    source_id: format!("stack slice {}", t),
                    expected_height: height,
                    expected_width: width,
                    actual_height: h,
                    actual_width: w,
                });
            }
        }

        let mut data = StackArray::zeros((grids.len(), height, width));
        for (t, grid) in grids.iter().enumerate() {
            data.index_axis_mut(Axis(0), t).assign(grid);
        }

        Ok(Self { data })
    }

    /// Number of time steps in the stack.
    pub fn len(&self) -> usize {
        self.data.len_of(Axis(0))
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// (time, height, width)
    pub fn dim(&self) -> (usize, usize, usize) {
        self.data.dim()
    }

    pub fn height(&self) -> usize {
        self.data.len_of(Axis(1))
    }

    pub fn width(&self) -> usize {
        self.data.len_of(Axis(2))
    }

    /// Grid at time step `t`; `t == 0` is the query grid.
    pub fn time_step(&self, t: usize) -> ArrayView2<'_, f32> {
        self.data.index_axis(Axis(0), t)
    }

    pub fn data(&self) -> &StackArray {
        &self.data
    }
}

/// Assembles a temporal stack from a query grid and a baseline archive.
#[derive(Debug, Clone)]
pub struct TemporalStackBuilder {
    /// Expected time-series length of the downstream model (query + baselines)
    required_length: usize,
}

impl TemporalStackBuilder {
    pub fn new(required_length: usize) -> Self {
        Self { required_length }
    }

    pub fn required_length(&self) -> usize {
        self.required_length
    }

    /// Build a stack with `query` at position 0, followed by baseline grids
    /// in the provider's deterministic order.
    ///
    /// Baselines are appended until `required_length` grids are collected or
    /// the provider is exhausted. A provider with too few grids yields a
    /// shorter stack, never one padded with fabricated data; compatibility
    /// with the scoring model is the caller's check. Every baseline must
    /// match the query grid's dimensions or the build aborts with a
    /// `ShapeMismatch` naming the offending identifier.
    pub fn build(&self, query: &Grid, provider: &dyn BaselineProvider) -> VegResult<TemporalStack> {
        let (height, width) = query.dim();
        if height == 0 || width == 0 {
            return Err(VegError::ZeroArea(format!(
                "query grid has zero area ({}x{})",
                height, width
            )));
        }

        log::info!(
            "Building temporal stack: target length {}, query grid {}x{}",
            self.required_length,
            height,
            width
        );

        let mut grids = Vec::with_capacity(self.required_length.max(1));
        grids.push(query.clone());

        for identifier in provider.identifiers() {
            if grids.len() >= self.required_length {
                break;
            }

            let grid = provider.read(identifier)?;
            let (h, w) = grid.dim();
            if (h, w) != (height, width) {
                return Err(VegError::ShapeMismatch {
                    source_id: identifier.clone(),
                    expected_height: height,
                    expected_width: width,
                    actual_height: h,
                    actual_width: w,
                });
            }
            grids.push(grid);
        }

        log::debug!(
            "Assembled {} of {} requested time steps",
            grids.len(),
            self.required_length
        );

        TemporalStack::from_grids(grids)
    }
}
