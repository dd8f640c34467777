use chrono::{DateTime, Datelike, Timelike, Utc};
use std::f64::consts::PI;

use crate::constants::{DAYS_IN_YEAR, ECCENTRICITY_AMPLITUDE, SOLAR_CONSTANT};

pub fn day_of_year(time: &DateTime<Utc>) -> f64 {
    time.ordinal() as f64
}

pub fn solar_declination(
    doy: f64, // day of year
) -> f64 {
    // [rad]
    // FAO-56 approximation, same as the one used for the daylight hours
    0.409 * ((2.0 * PI / DAYS_IN_YEAR) * doy - 1.39).sin()
}

pub fn solar_hour(
    time: &DateTime<Utc>, // UTC time
    lon: f64,             // longitude [°]
) -> f64 {
    // [h] solar apparent hour of day
    let hour_utc = time.hour() as f64 + time.minute() as f64 / 60.0 + time.second() as f64 / 3600.0;
    (hour_utc + lon / 15.0).rem_euclid(24.0)
}

/// Solar zenith angle [°] for a site at a given UTC time
pub fn solar_zenith_angle(
    lat: f64,             // latitude [°]
    lon: f64,             // longitude [°]
    time: &DateTime<Utc>, // UTC time
) -> f64 {
    let declination = solar_declination(day_of_year(time));
    let hour_angle = (15.0 * (solar_hour(time, lon) - 12.0)).to_radians();
    let lat_rad = lat.to_radians();

    let cos_sza = lat_rad.sin() * declination.sin()
        + lat_rad.cos() * declination.cos() * hour_angle.cos();
    cos_sza.clamp(-1.0, 1.0).acos().to_degrees()
}

/// Top of atmosphere shortwave irradiance on a horizontal surface [W/m2]
pub fn toa_irradiance(
    doy: f64, // day of year
    sza: f64, // solar zenith angle [°]
) -> f64 {
    let distance_correction = 1.0 + ECCENTRICITY_AMPLITUDE * (2.0 * PI * doy / DAYS_IN_YEAR).cos();
    // no radiation with the sun below the horizon
    SOLAR_CONSTANT * distance_correction * sza.to_radians().cos().max(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn day_of_year_from_time() {
        let time = Utc.with_ymd_and_hms(2024, 7, 28, 20, 40, 25).unwrap();
        assert_eq!(day_of_year(&time), 210.0);
    }

    #[test]
    fn solar_hour_wraps() {
        let time = Utc.with_ymd_and_hms(2024, 1, 1, 2, 0, 0).unwrap();
        assert!((solar_hour(&time, -45.0) - 23.0).abs() < 1e-9);
        assert!((solar_hour(&time, 15.0) - 3.0).abs() < 1e-9);
    }

    #[test]
    fn sun_high_at_equinox_noon_on_equator() {
        // local solar noon on the Greenwich meridian close to the March equinox
        let time = Utc.with_ymd_and_hms(2023, 3, 21, 12, 0, 0).unwrap();
        let sza = solar_zenith_angle(0.0, 0.0, &time);
        assert!(sza < 2.0, "sza = {}", sza);

        // midnight: sun well below the horizon
        let time = Utc.with_ymd_and_hms(2023, 3, 21, 0, 0, 0).unwrap();
        assert!(solar_zenith_angle(0.0, 0.0, &time) > 170.0);
    }

    #[test]
    fn toa_irradiance_values() {
        let doy = 1.0;
        let zenith = toa_irradiance(doy, 0.0);
        let expected = SOLAR_CONSTANT * (1.0 + 0.033 * (2.0 * PI / 365.0).cos());
        assert!((zenith - expected).abs() < 1e-9);

        let slanted = toa_irradiance(doy, 60.0);
        assert!((slanted - expected * 0.5).abs() < 1e-6);

        assert_eq!(toa_irradiance(doy, 95.0), 0.0);
    }
}
