use serde_derive::{Deserialize, Serialize};

use crate::modules::services::models::AtmosphericVariable;

/// Values used when a covariate is neither in the table nor available from a
/// service
#[allow(non_snake_case)]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Defaults {
    pub COT: Option<f64>,
    pub AOT: Option<f64>,
    pub vapor_gccm: Option<f64>,
    pub ozone_cm: Option<f64>,
    pub elevation_km: Option<f64>,
}

impl Defaults {
    /// clear sky, no aerosols, dry atmosphere, standard ozone column
    pub fn reference() -> Self {
        Self {
            COT: Some(0.0),
            AOT: Some(0.0),
            vapor_gccm: Some(0.0),
            ozone_cm: Some(0.3),
            elevation_km: None,
        }
    }

    pub fn atmospheric(&self, variable: AtmosphericVariable) -> Option<f64> {
        use AtmosphericVariable::*;
        match variable {
            COT => self.COT,
            AOT => self.AOT,
            vapor_gccm => self.vapor_gccm,
            ozone_cm => self.ozone_cm,
        }
    }
}
