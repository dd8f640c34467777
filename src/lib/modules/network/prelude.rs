use crate::error::FLiESResult;

use super::models::{Features, Prediction};

/// Trait defining the behavior of a FLiES-ANN inference backend
pub trait RadiativeTransfer {
    /// predict transmittance, spectral proportions and diffuse fractions
    /// for every cell of the features
    fn predict(&self, features: &Features) -> FLiESResult<Prediction>;
}
