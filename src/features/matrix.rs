use ndarray::{s, Array1, Array2, Axis};

const ZERO_VARIANCE: f64 = 1e-10;

/// Extend the frame axis with zero columns up to `target` frames.
///
/// Matrices already at or beyond `target` are returned unchanged; nothing is truncated.
pub fn pad_frames(matrix: Array2<f32>, target: usize) -> Array2<f32> {
    let (rows, frames) = matrix.dim();
    if frames >= target {
        return matrix;
    }
    let mut padded = Array2::zeros((rows, target));
    padded.slice_mut(s![.., ..frames]).assign(&matrix);
    padded
}

/// Standardize every row to zero mean and unit population variance.
///
/// A constant row has nothing to scale and becomes all zeros.
pub fn standardize_rows(matrix: &Array2<f32>) -> Array2<f32> {
    let mut output = matrix.clone();
    if matrix.ncols() == 0 {
        return output;
    }
    for mut row in output.axis_iter_mut(Axis(0)) {
        let count = row.len() as f64;
        let mean = row.iter().map(|&v| v as f64).sum::<f64>() / count;
        let variance = row
            .iter()
            .map(|&v| (v as f64 - mean).powi(2))
            .sum::<f64>()
            / count;
        let std_dev = variance.sqrt();
        let scale = if std_dev <= ZERO_VARIANCE { 1.0 } else { std_dev };
        row.mapv_inplace(|v| ((v as f64 - mean) / scale) as f32);
    }
    output
}

/// Per-coefficient mean across frames.
pub fn frame_means(matrix: &Array2<f32>) -> Array1<f32> {
    matrix
        .mean_axis(Axis(1))
        .unwrap_or_else(|| Array1::zeros(matrix.nrows()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    #[test]
    fn short_matrix_is_zero_padded() {
        let matrix = array![[1.0_f32, 2.0], [3.0, 4.0]];
        let padded = pad_frames(matrix, 5);
        assert_eq!(padded.dim(), (2, 5));
        assert_eq!(padded.row(0).to_vec(), vec![1.0, 2.0, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn exact_length_is_untouched() {
        let matrix = Array2::from_elem((3, 275), 0.5_f32);
        let padded = pad_frames(matrix.clone(), 275);
        assert_eq!(padded, matrix);
    }

    #[test]
    fn longer_matrix_is_not_truncated() {
        let matrix = Array2::<f32>::ones((2, 300));
        assert_eq!(pad_frames(matrix, 275).dim(), (2, 300));
    }

    #[test]
    fn rows_have_zero_mean_unit_variance() {
        let matrix = array![[1.0_f32, 2.0, 3.0, 4.0], [10.0, 0.0, 10.0, 0.0]];
        let scaled = standardize_rows(&matrix);
        for row in scaled.rows() {
            let mean = row.sum() / row.len() as f32;
            let var = row.mapv(|v| (v - mean).powi(2)).sum() / row.len() as f32;
            assert_abs_diff_eq!(mean, 0.0, epsilon = 1e-6);
            assert_abs_diff_eq!(var, 1.0, epsilon = 1e-5);
        }
        assert_abs_diff_eq!(scaled[[1, 0]], 1.0, epsilon = 1e-6);
    }

    #[test]
    fn constant_row_becomes_zero() {
        let matrix = array![[7.0_f32, 7.0, 7.0], [0.0, 0.0, 0.0]];
        let scaled = standardize_rows(&matrix);
        assert!(scaled.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn means_follow_rows() {
        let matrix = array![[1.0_f32, 3.0], [2.0, 2.0]];
        assert_eq!(frame_means(&matrix).to_vec(), vec![2.0, 2.0]);
    }
}
