use crate::error::{FLiESError, FLiESResult};

use super::models::{Location, MultiPoint};

fn parse_error(value: &str, reason: impl Into<String>) -> FLiESError {
    FLiESError::GeometryParse {
        value: value.to_owned(),
        reason: reason.into(),
    }
}

fn parse_coordinates<'a>(
    value: &str,
    parts: impl Iterator<Item = &'a str>,
) -> FLiESResult<Location> {
    let coords = parts
        .map(|part| {
            part.trim()
                .parse::<f64>()
                .map_err(|_| parse_error(value, format!("'{}' is not a number", part.trim())))
        })
        .collect::<FLiESResult<Vec<f64>>>()?;

    if coords.len() != 2 {
        return Err(parse_error(
            value,
            format!("expected 2 coordinates, found {}", coords.len()),
        ));
    }
    checked_location(value, coords[0], coords[1])
}

/// A location with finite coordinates and latitude within [-90, 90]
fn checked_location(value: &str, lon: f64, lat: f64) -> FLiESResult<Location> {
    if !lon.is_finite() || !lat.is_finite() {
        return Err(parse_error(value, "coordinates must be finite"));
    }
    if !(-90.0..=90.0).contains(&lat) {
        return Err(parse_error(value, format!("latitude {lat} out of range")));
    }
    Ok(Location::new(lon, lat))
}

/// Sites from separate longitude and latitude columns, checked like
/// [`parse_point`]. Blank cells are rejected.
pub fn points_from_coords(lons: &[f64], lats: &[f64]) -> FLiESResult<MultiPoint> {
    let points = lons
        .iter()
        .zip(lats)
        .enumerate()
        .map(|(row, (lon, lat))| {
            checked_location(&format!("lon={lon}, lat={lat} (row {row})"), *lon, *lat)
        })
        .collect::<FLiESResult<Vec<Location>>>()?;
    Ok(MultiPoint::new(points))
}

/// Parse a point geometry.
///
/// Accepts WKT (`POINT (lon lat)`), comma separated (`lon,lat`) and
/// whitespace separated (`lon lat`) coordinates.
pub fn parse_point(value: &str) -> FLiESResult<Location> {
    let text = value.trim();
    if text.is_empty() {
        return Err(parse_error(value, "empty geometry"));
    }

    if text
        .get(..5)
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case("POINT"))
    {
        let body = text[5..].trim();
        let body = body
            .strip_prefix('(')
            .and_then(|b| b.strip_suffix(')'))
            .ok_or_else(|| parse_error(value, "expected parenthesised coordinates"))?;
        return parse_coordinates(value, body.split_whitespace());
    }

    if text.contains(',') {
        return parse_coordinates(value, text.split(','));
    }

    parse_coordinates(value, text.split_whitespace())
}
