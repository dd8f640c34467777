use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

use serde_derive::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumString};

use crate::{
    error::{FLiESError, FLiESResult},
    modules::geometry::models::Location,
};

const NAIVE_TIME_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];

/// Parse a UTC time as written in a table cell.
/// Times without an offset are taken as UTC; a bare date is midnight.
pub fn parse_time(text: &str, row: usize) -> FLiESResult<DateTime<Utc>> {
    let text = text.trim();
    if let Ok(time) = DateTime::parse_from_rfc3339(text) {
        return Ok(time.with_timezone(&Utc));
    }
    if let Ok(time) = DateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S%.f%:z") {
        return Ok(time.with_timezone(&Utc));
    }
    for format in NAIVE_TIME_FORMATS {
        if let Ok(time) = NaiveDateTime::parse_from_str(text, format) {
            return Ok(time.and_utc());
        }
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|time| time.and_utc())
        .ok_or_else(|| FLiESError::TimeParse {
            value: text.to_owned(),
            row,
        })
}

/// A site-time pair, one per row of an input table
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Observation {
    pub time: DateTime<Utc>,
    pub location: Location,
}

impl Observation {
    pub fn new(time: DateTime<Utc>, location: Location) -> Self {
        Self { time, location }
    }
}

#[allow(clippy::upper_case_acronyms, non_camel_case_types)]
#[derive(
    Debug, PartialEq, Eq, Hash, Copy, Clone, EnumString, EnumIter, Display, Serialize, Deserialize,
)]
pub enum InputVariableName {
    /// SITE AND TIME

    /// Observation time, UTC
    time_UTC,
    /// Point geometry of the site
    geometry,
    /// Latitude [°]
    lat,
    /// Longitude [°]
    lon,
    /// Day of year
    doy,

    /// SURFACE AND ATMOSPHERE

    /// Surface albedo [-]
    albedo,
    /// Cloud optical thickness [-]
    COT,
    /// Aerosol optical thickness [-]
    AOT,
    /// Water vapor [g/cm2]
    vapor_gccm,
    /// Ozone [cm]
    ozone_cm,
    /// Elevation [km]
    elevation_km,
    /// Solar zenith angle [°]
    SZA,

    /// CLIMATE

    /// Köppen-Geiger climate class
    KG_climate,
    /// Köppen-Geiger climate class, short column name
    KG,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn time_formats() {
        let expected = Utc.with_ymd_and_hms(2024, 7, 28, 20, 40, 25).unwrap();
        for text in [
            "2024-07-28 20:40:25",
            "2024-07-28T20:40:25",
            "2024-07-28T20:40:25Z",
            "2024-07-28 20:40:25+00:00",
            "2024-07-28T22:40:25+02:00",
            " 2024-07-28 20:40:25.000 ",
        ] {
            assert_eq!(parse_time(text, 0).expect(text), expected);
        }
        assert_eq!(
            parse_time("2024-07-28", 0).expect("date"),
            Utc.with_ymd_and_hms(2024, 7, 28, 0, 0, 0).unwrap()
        );
    }

    #[test]
    fn bad_time() {
        match parse_time("yesterday", 3) {
            Err(FLiESError::TimeParse { value, row }) => {
                assert_eq!(value, "yesterday");
                assert_eq!(row, 3);
            }
            other => panic!("unexpected {other:?}"),
        }
    }
}
