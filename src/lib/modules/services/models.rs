use chrono::{DateTime, Utc};
use serde_derive::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumProperty, EnumString};

use crate::modules::geometry::models::Location;

use super::prelude::{AtmosphereSource, ClimateSource, ElevationSource};

/// Atmospheric variables retrieved from the reanalysis
#[allow(non_camel_case_types, clippy::upper_case_acronyms)]
#[derive(
    Debug,
    PartialEq,
    Eq,
    Hash,
    Copy,
    Clone,
    EnumString,
    EnumIter,
    EnumProperty,
    Display,
    Serialize,
    Deserialize,
)]
pub enum AtmosphericVariable {
    #[strum(props(long_name = "Cloud optical thickness", units = "-"))]
    COT,
    #[strum(props(long_name = "Aerosol optical thickness", units = "-"))]
    AOT,
    #[strum(props(long_name = "Water vapor", units = "g/cm2"))]
    vapor_gccm,
    #[strum(props(long_name = "Ozone", units = "cm"))]
    ozone_cm,
}

/// One value returned by an external service
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ServiceRecord {
    pub location: Location,
    /// None for static services (elevation, climate)
    pub time: Option<DateTime<Utc>>,
    pub value: f64,
}

impl ServiceRecord {
    pub fn new(location: Location, time: Option<DateTime<Utc>>, value: f64) -> Self {
        Self {
            location,
            time,
            value,
        }
    }
}

/// External services available to a run. Missing services are None.
#[derive(Default, Clone, Copy)]
pub struct Services<'a> {
    pub atmosphere: Option<&'a dyn AtmosphereSource>,
    pub elevation: Option<&'a dyn ElevationSource>,
    pub climate: Option<&'a dyn ClimateSource>,
}

impl Services<'_> {
    pub fn none() -> Self {
        Self::default()
    }
}
