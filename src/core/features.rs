use crate::core::stack::TemporalStack;
use crate::types::{FeatureMatrix, Grid, VegError, VegResult};
use ndarray::Axis;

/// Reshape a temporal stack (time x height x width) into the per-pixel
/// feature matrix (height*width x time) consumed by the anomaly model.
///
/// Pixels are flattened row-major, so feature row `i` is the time series of
/// the pixel at `(i / width, i % width)`. Values are rearranged, never
/// altered; the mapping is inverted by [`time_step_from_matrix`].
pub fn to_feature_matrix(stack: &TemporalStack) -> FeatureMatrix {
    let (time, height, width) = stack.dim();
    let pixels = height * width;

    log::debug!(
        "Reshaping stack ({} x {} x {}) into feature matrix ({} x {})",
        time,
        height,
        width,
        pixels,
        time
    );

    let mut matrix = FeatureMatrix::zeros((pixels, time));
    for (t, grid) in stack.data().axis_iter(Axis(0)).enumerate() {
        // Row-major iteration over a standard-layout 2D view
        for (pixel, value) in grid.iter().enumerate() {
            matrix[[pixel, t]] = *value;
        }
    }

    matrix
}

/// Recover the grid for time step `t` from a feature matrix, undoing the
/// row-major flattening of [`to_feature_matrix`].
pub fn time_step_from_matrix(
    matrix: &FeatureMatrix,
    t: usize,
    height: usize,
    width: usize,
) -> VegResult<Grid> {
    let (pixels, time) = matrix.dim();

    if t >= time {
        return Err(VegError::Processing(format!(
            "time step {} out of range for matrix with {} columns",
            t, time
        )));
    }
    if pixels != height * width {
        return Err(VegError::Processing(format!(
            "feature matrix has {} rows, expected {} for a {}x{} grid",
            pixels,
            height * width,
            height,
            width
        )));
    }

    let column = matrix.index_axis(Axis(1), t).to_owned();
    column
        .into_shape((height, width))
        .map_err(|e| VegError::Processing(format!("failed to reshape time step {}: {}", t, e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{array, Array2};

    fn stack_from(grids: Vec<Grid>) -> TemporalStack {
        TemporalStack::from_grids(grids).unwrap()
    }

    #[test]
    fn test_matrix_shape_and_pixel_rows() {
        let g0 = array![[0.5_f32, -0.2], [0.1, 0.9]];
        let g1 = array![[0.1_f32, 0.2], [0.3, 0.4]];
        let stack = stack_from(vec![g0, g1]);

        let matrix = to_feature_matrix(&stack);
        assert_eq!(matrix.dim(), (4, 2));

        // Row-major: pixel 1 is (0,1), pixel 2 is (1,0)
        assert_eq!(matrix[[0, 0]], 0.5);
        assert_eq!(matrix[[1, 0]], -0.2);
        assert_eq!(matrix[[2, 1]], 0.3);
        assert_eq!(matrix[[3, 1]], 0.4);
    }

    #[test]
    fn test_row_bijection_round_trip() {
        let grids: Vec<Grid> = (0..5)
            .map(|t| {
                Array2::from_shape_fn((3, 4), |(r, c)| (t * 100 + r * 10 + c) as f32 / 100.0)
            })
            .collect();
        let stack = stack_from(grids.clone());

        let matrix = to_feature_matrix(&stack);
        assert_eq!(matrix.dim(), (12, 5));

        for (t, original) in grids.iter().enumerate() {
            let recovered = time_step_from_matrix(&matrix, t, 3, 4).unwrap();
            assert_eq!(&recovered, original);
        }
    }

    #[test]
    fn test_out_of_range_time_step() {
        let stack = stack_from(vec![Array2::from_elem((2, 2), 0.1_f32)]);
        let matrix = to_feature_matrix(&stack);

        assert!(time_step_from_matrix(&matrix, 1, 2, 2).is_err());
        assert!(time_step_from_matrix(&matrix, 0, 3, 3).is_err());
    }
}
