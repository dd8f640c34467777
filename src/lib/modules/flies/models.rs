use crate::modules::shape::models::Covariate;

/// Inputs of a FLiES-ANN run, each one scalar, per-site or gridded
#[allow(non_snake_case)]
#[derive(Debug, Clone)]
pub struct ModelInputs {
    /// day of year
    pub doy: Covariate<f64>,
    /// surface albedo [-]
    pub albedo: Covariate<f64>,
    /// cloud optical thickness [-]
    pub COT: Covariate<f64>,
    /// aerosol optical thickness [-]
    pub AOT: Covariate<f64>,
    /// water vapor [g/cm2]
    pub vapor_gccm: Covariate<f64>,
    /// ozone [cm]
    pub ozone_cm: Covariate<f64>,
    /// elevation [km]
    pub elevation_km: Covariate<f64>,
    /// solar zenith angle [°]
    pub SZA: Covariate<f64>,
    /// Köppen-Geiger climate code
    pub KG_climate: Covariate<i32>,
}

impl ModelInputs {
    pub fn shapes(&self) -> Vec<Vec<usize>> {
        vec![
            self.doy.shape(),
            self.albedo.shape(),
            self.COT.shape(),
            self.AOT.shape(),
            self.vapor_gccm.shape(),
            self.ozone_cm.shape(),
            self.elevation_km.shape(),
            self.SZA.shape(),
            self.KG_climate.shape(),
        ]
    }
}
