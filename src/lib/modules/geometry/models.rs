use std::fmt::Display;

use crate::{
    constants::COORDINATE_RESOLUTION,
    error::{FLiESError, FLiESResult},
};

/// A WGS84 point
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Location {
    /// longitude [°]
    pub lon: f64,
    /// latitude [°]
    pub lat: f64,
}

impl Location {
    pub fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }

    /// integer key of the location at `COORDINATE_RESOLUTION`
    pub fn key(&self) -> FLiESResult<(i64, i64)> {
        if !self.lon.is_finite() || !self.lat.is_finite() {
            return Err(FLiESError::GeometryParse {
                value: self.to_string(),
                reason: "coordinates must be finite".to_owned(),
            });
        }
        Ok((
            (self.lon / COORDINATE_RESOLUTION).round() as i64,
            (self.lat / COORDINATE_RESOLUTION).round() as i64,
        ))
    }
}

impl Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "POINT ({} {})", self.lon, self.lat)
    }
}

/// The set of sites of an input table, in row order
#[derive(Debug, Clone, Default)]
pub struct MultiPoint {
    pub points: Vec<Location>,
}

impl MultiPoint {
    pub fn new(points: Vec<Location>) -> Self {
        Self { points }
    }
}
