use crate::{
    error::FLiESResult, models::input::Observation, modules::geometry::models::Location,
};

use super::models::{AtmosphericVariable, ServiceRecord};

/// Atmospheric reanalysis (GEOS-5 FP)
pub trait AtmosphereSource {
    /// Values of `variable` for the observations. The records may come back in
    /// any order, and may cover every site at every requested time.
    fn query(
        &self,
        variable: AtmosphericVariable,
        observations: &[Observation],
    ) -> FLiESResult<Vec<ServiceRecord>>;
}

/// Surface elevation (NASADEM)
pub trait ElevationSource {
    /// elevation [km] at the locations, records without a time
    fn elevation_km(&self, locations: &[Location]) -> FLiESResult<Vec<ServiceRecord>>;
}

/// Köppen-Geiger climate lookup
pub trait ClimateSource {
    /// numeric Köppen-Geiger code at the locations, records without a time
    fn koppen_geiger(&self, locations: &[Location]) -> FLiESResult<Vec<ServiceRecord>>;
}
