use ndarray::{Array1, Array2, ArrayD};

/// A value fed to the radiative transfer computation.
///
/// External sources return scalars (one value for the whole scene), per-site
/// vectors or raster grids; all of them end up as a `Covariate` before being
/// reconciled to a common shape.
#[derive(Debug, Clone, PartialEq)]
pub enum Covariate<T> {
    Scalar(T),
    Array(ArrayD<T>),
}

impl<T: Clone> Covariate<T> {
    /// Shape of the value, empty for scalars and zero-dimensional arrays
    pub fn shape(&self) -> Vec<usize> {
        match self {
            Covariate::Scalar(_) => vec![],
            Covariate::Array(array) => array.shape().to_vec(),
        }
    }
}

impl From<f64> for Covariate<f64> {
    fn from(value: f64) -> Self {
        Covariate::Scalar(value)
    }
}

impl From<i32> for Covariate<i32> {
    fn from(value: i32) -> Self {
        Covariate::Scalar(value)
    }
}

impl<T> From<Vec<T>> for Covariate<T> {
    fn from(values: Vec<T>) -> Self {
        Covariate::Array(Array1::from_vec(values).into_dyn())
    }
}

impl<T> From<Array1<T>> for Covariate<T> {
    fn from(array: Array1<T>) -> Self {
        Covariate::Array(array.into_dyn())
    }
}

impl<T> From<Array2<T>> for Covariate<T> {
    fn from(array: Array2<T>) -> Self {
        Covariate::Array(array.into_dyn())
    }
}

impl<T> From<ArrayD<T>> for Covariate<T> {
    fn from(array: ArrayD<T>) -> Self {
        Covariate::Array(array)
    }
}
