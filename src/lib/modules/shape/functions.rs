use ndarray::{ArrayD, Axis, IxDyn};

use crate::error::{FLiESError, FLiESResult};

use super::models::Covariate;

/// Shape the value must take before broadcasting against `target_shape`,
/// or None if the two shapes cannot be reconciled.
///
/// Vectors are aligned on the leading axis: a vector holds one value per
/// observation and the observations run along the first axis of the target.
/// Higher-rank values are aligned on the trailing axes.
fn aligned_shape(value_shape: &[usize], target_shape: &[usize]) -> Option<Vec<usize>> {
    if value_shape.len() > target_shape.len() {
        return None;
    }
    let aligned: Vec<usize> = if value_shape.len() == 1 {
        let mut aligned = vec![1; target_shape.len()];
        aligned[0] = value_shape[0];
        aligned
    } else {
        let padding = target_shape.len() - value_shape.len();
        std::iter::repeat(1)
            .take(padding)
            .chain(value_shape.iter().copied())
            .collect()
    };
    let compatible = aligned
        .iter()
        .zip(target_shape)
        .all(|(value, target)| value == target || *value == 1);

    compatible.then_some(aligned)
}

/// Normalize an array to `target_shape`.
///
/// Identity when the shapes are equal; zero-dimensional arrays are treated as
/// scalars. Never truncates or reshapes data: a value that cannot be broadcast
/// is rejected with [`FLiESError::ShapeMismatch`].
pub fn reconcile_array<T: Clone>(array: ArrayD<T>, target_shape: &[usize]) -> FLiESResult<ArrayD<T>> {
    if array.shape() == target_shape {
        return Ok(array);
    }

    if array.ndim() == 0 {
        if let Some(value) = array.first() {
            return Ok(ArrayD::from_elem(IxDyn(target_shape), value.clone()));
        }
    }

    let mismatch = || FLiESError::ShapeMismatch {
        value_shape: array.shape().to_vec(),
        target_shape: target_shape.to_vec(),
    };

    let aligned = aligned_shape(array.shape(), target_shape).ok_or_else(mismatch)?;

    let mut view = array.view();
    while view.ndim() < aligned.len() {
        let axis = if array.ndim() == 1 { view.ndim() } else { 0 };
        view = view.insert_axis(Axis(axis));
    }

    let broadcast = view.broadcast(IxDyn(target_shape)).ok_or_else(mismatch)?;
    Ok(broadcast.to_owned())
}

/// Normalize a covariate to `target_shape`. Scalars always succeed.
pub fn reconcile<T: Clone>(value: Covariate<T>, target_shape: &[usize]) -> FLiESResult<ArrayD<T>> {
    match value {
        Covariate::Scalar(value) => Ok(ArrayD::from_elem(IxDyn(target_shape), value)),
        Covariate::Array(array) => reconcile_array(array, target_shape),
    }
}

/// The shape every covariate is reconciled to: the highest-rank shape, ties
/// broken by the larger number of elements. Empty input or all scalars give
/// a zero-dimensional shape.
pub fn common_shape(shapes: &[Vec<usize>]) -> Vec<usize> {
    shapes
        .iter()
        .max_by_key(|shape| (shape.len(), shape.iter().product::<usize>()))
        .cloned()
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{array, Array2};

    #[test]
    fn scalar_fills_target_shape() {
        let result = reconcile(Covariate::Scalar(0.3), &[4, 5]).expect("should reconcile");
        assert_eq!(result.shape(), &[4, 5]);
        assert!(result.iter().all(|v| *v == 0.3));

        let result = reconcile(Covariate::Scalar(7), &[]).expect("should reconcile");
        assert_eq!(result.ndim(), 0);
        assert_eq!(result.first(), Some(&7));
    }

    #[test]
    fn equal_shape_is_identity() {
        let value = array![[5, 5, 5], [6, 6, 6]].into_dyn();
        let result = reconcile(Covariate::Array(value.clone()), &[2, 3]).expect("should reconcile");
        assert_eq!(result, value);
    }

    #[test]
    fn vector_broadcasts_along_leading_axis() {
        let result = reconcile(Covariate::from(vec![5, 6]), &[2, 5]).expect("should reconcile");
        let expected: Array2<i32> = array![[5, 5, 5, 5, 5], [6, 6, 6, 6, 6]];
        assert_eq!(result, expected.into_dyn());
    }

    #[test]
    fn vector_length_must_match_leading_axis() {
        let result = reconcile(Covariate::from(vec![5.0, 6.0]), &[3]);
        match result {
            Err(FLiESError::ShapeMismatch {
                value_shape,
                target_shape,
            }) => {
                assert_eq!(value_shape, vec![2]);
                assert_eq!(target_shape, vec![3]);
            }
            other => panic!("expected a shape mismatch, got {:?}", other),
        }

        // matching the trailing axis is not enough for a vector
        let result = reconcile(Covariate::from(vec![1.0, 2.0, 3.0, 4.0, 5.0]), &[2, 5]);
        assert!(matches!(result, Err(FLiESError::ShapeMismatch { .. })));
    }

    #[test]
    fn unit_vector_fills_target_shape() {
        let result = reconcile(Covariate::from(vec![9.0]), &[3, 2]).expect("should reconcile");
        assert_eq!(result.shape(), &[3, 2]);
        assert!(result.iter().all(|v| *v == 9.0));
    }

    #[test]
    fn grid_broadcasts_on_trailing_axes() {
        let row = array![[1.0, 2.0, 3.0]].into_dyn();
        let result = reconcile(Covariate::Array(row), &[2, 3]).expect("should reconcile");
        assert_eq!(result, array![[1.0, 2.0, 3.0], [1.0, 2.0, 3.0]].into_dyn());

        let grid = array![[1.0, 2.0], [3.0, 4.0]].into_dyn();
        let result = reconcile(Covariate::Array(grid), &[3, 2, 2]).expect("should reconcile");
        assert_eq!(result.shape(), &[3, 2, 2]);
        assert_eq!(result[&[2, 1, 0][..]], 3.0);
    }

    #[test]
    fn incompatible_grid_is_rejected() {
        let grid = Array2::<f64>::zeros((4, 5)).into_dyn();
        assert!(reconcile(Covariate::Array(grid.clone()), &[5, 4]).is_err());
        // a value never loses dimensions
        assert!(reconcile(Covariate::Array(grid), &[20]).is_err());
    }

    #[test]
    fn zero_dimensional_array_is_a_scalar() {
        let value = ArrayD::from_elem(IxDyn(&[]), 2.5);
        let result = reconcile(Covariate::Array(value), &[2, 2]).expect("should reconcile");
        assert!(result.iter().all(|v| *v == 2.5));
    }

    #[test]
    fn reconcile_is_idempotent() {
        let target = [2, 4];
        let values: Vec<Covariate<f64>> = vec![
            Covariate::Scalar(1.5),
            Covariate::from(vec![1.0, 2.0]),
            Covariate::Array(array![[1.0, 2.0, 3.0, 4.0]].into_dyn()),
        ];
        for value in values {
            let once = reconcile(value, &target).expect("should reconcile");
            let twice = reconcile(Covariate::Array(once.clone()), &target).expect("should reconcile");
            assert_eq!(once, twice);
        }
    }

    #[test]
    fn common_shape_prefers_rasters() {
        let shapes = vec![vec![], vec![2], vec![4, 5], vec![2, 2]];
        assert_eq!(common_shape(&shapes), vec![4, 5]);
        assert_eq!(common_shape(&[vec![], vec![]]), Vec::<usize>::new());
    }
}
