//! Symmetry-augmenting transform for paired rows.

use ndarray::{Array2, ArrayView2, s};

use super::StackError;

/// Re-express consecutive row pairs as both concatenation orders.
///
/// Rows `(2i, 2i+1)` are two orderings of one logical unit (e.g. a left/right
/// paired observation). Each output row becomes the concatenation of both
/// members' features: row `2i` as `(row_2i, row_2i+1)` and row `2i+1` as
/// `(row_2i+1, row_2i)`. Output shape is `(rows, 2 * cols)`; pair positions
/// are preserved.
///
/// # Errors
///
/// [`StackError::OddRowCount`] if the row count is odd - pairing is an input
/// contract, not something this transform can repair.
pub fn bilateralize(features: ArrayView2<f32>) -> Result<Array2<f32>, StackError> {
    let (rows, cols) = features.dim();
    if rows % 2 != 0 {
        return Err(StackError::OddRowCount { rows });
    }

    let mut out = Array2::zeros((rows, 2 * cols));
    for pair in 0..rows / 2 {
        let first = features.row(2 * pair);
        let second = features.row(2 * pair + 1);

        out.slice_mut(s![2 * pair, ..cols]).assign(&first);
        out.slice_mut(s![2 * pair, cols..]).assign(&second);
        out.slice_mut(s![2 * pair + 1, ..cols]).assign(&second);
        out.slice_mut(s![2 * pair + 1, cols..]).assign(&first);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;
    use proptest::prelude::*;

    #[test]
    fn doubles_columns_and_mirrors_pairs() {
        let features = array![[1.0f32, 2.0], [3.0, 4.0], [5.0, 6.0], [7.0, 8.0]];
        let out = bilateralize(features.view()).unwrap();

        assert_eq!(out.dim(), (4, 4));
        assert_eq!(out.row(0).to_vec(), vec![1.0, 2.0, 3.0, 4.0]);
        assert_eq!(out.row(1).to_vec(), vec![3.0, 4.0, 1.0, 2.0]);
        assert_eq!(out.row(2).to_vec(), vec![5.0, 6.0, 7.0, 8.0]);
        assert_eq!(out.row(3).to_vec(), vec![7.0, 8.0, 5.0, 6.0]);
    }

    #[test]
    fn odd_row_count_fails() {
        let features = array![[1.0f32], [2.0], [3.0]];
        let result = bilateralize(features.view());
        assert!(matches!(result, Err(StackError::OddRowCount { rows: 3 })));
    }

    #[test]
    fn empty_matrix_is_noop() {
        let features = Array2::<f32>::zeros((0, 3));
        let out = bilateralize(features.view()).unwrap();
        assert_eq!(out.dim(), (0, 6));
    }

    #[test]
    fn swapping_output_pairs_swaps_halves() {
        // Swapping the two rows of an output pair yields the same pair with
        // its column halves exchanged: the transform is its own inverse up to
        // pair order.
        let features = array![[1.0f32, 2.0], [3.0, 4.0]];
        let out = bilateralize(features.view()).unwrap();

        let swapped = array![
            [out[[1, 0]], out[[1, 1]], out[[1, 2]], out[[1, 3]]],
            [out[[0, 0]], out[[0, 1]], out[[0, 2]], out[[0, 3]]],
        ];
        let cols = 2;
        for r in 0..2 {
            for c in 0..cols {
                assert_eq!(swapped[[r, c]], out[[r, cols + c]]);
                assert_eq!(swapped[[r, cols + c]], out[[r, c]]);
            }
        }
    }

    proptest! {
        #[test]
        fn shape_contract(half_rows in 0usize..16, cols in 1usize..8) {
            let rows = half_rows * 2;
            let features = Array2::from_shape_fn(
                (rows, cols),
                |(r, c)| (r * cols + c) as f32,
            );
            let out = bilateralize(features.view()).unwrap();
            prop_assert_eq!(out.dim(), (rows, 2 * cols));

            let odd = Array2::<f32>::zeros((rows + 1, cols));
            prop_assert!(bilateralize(odd.view()).is_err());
        }
    }
}
