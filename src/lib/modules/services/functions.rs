use std::collections::{hash_map::Entry, HashMap};

use log::debug;

use crate::{
    error::{FLiESError, FLiESResult},
    models::input::Observation,
};

use super::models::ServiceRecord;

/// (longitude, latitude, timestamp) a record is matched on
type RecordKey = (i64, i64, Option<i64>);

fn same_value(a: f64, b: f64) -> bool {
    a == b || (a.is_nan() && b.is_nan())
}

/// Align service records with the observations.
///
/// Records are keyed by location (rounded to the coordinate resolution) and,
/// when the service returns times, by timestamp. A response must either time
/// every record or none of them. The result holds one value per observation,
/// in observation order. The position of a record in `records` never matters.
pub fn join_records(
    variable: &str,
    observations: &[Observation],
    records: &[ServiceRecord],
) -> FLiESResult<Vec<f64>> {
    let n_timed = records.iter().filter(|record| record.time.is_some()).count();
    if n_timed > 0 && n_timed < records.len() {
        return Err(FLiESError::Service {
            service: variable.to_owned(),
            reason: format!(
                "{} of {} records carry a time, expected all or none",
                n_timed,
                records.len()
            ),
        });
    }
    let timed = n_timed > 0;

    let mut index: HashMap<RecordKey, f64> = HashMap::with_capacity(records.len());
    for record in records {
        let (lon, lat) = record.location.key()?;
        let key = (lon, lat, record.time.map(|time| time.timestamp()));
        match index.entry(key) {
            Entry::Vacant(entry) => {
                entry.insert(record.value);
            }
            Entry::Occupied(entry) => {
                if !same_value(*entry.get(), record.value) {
                    return Err(FLiESError::AmbiguousServiceRecord {
                        variable: variable.to_owned(),
                        lon: record.location.lon,
                        lat: record.location.lat,
                    });
                }
            }
        }
    }
    debug!(
        "Joining {} {} records on {} observations",
        index.len(),
        variable,
        observations.len()
    );

    observations
        .iter()
        .map(|observation| {
            let (lon, lat) = observation.location.key()?;
            let time = timed.then(|| observation.time.timestamp());
            index
                .get(&(lon, lat, time))
                .copied()
                .ok_or_else(|| FLiESError::MissingServiceRecord {
                    variable: variable.to_owned(),
                    lon: observation.location.lon,
                    lat: observation.location.lat,
                    time: timed.then(|| observation.time.to_rfc3339()),
                })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::geometry::models::Location;
    use chrono::{DateTime, TimeZone, Utc};

    fn times() -> Vec<DateTime<Utc>> {
        vec![
            Utc.with_ymd_and_hms(2024, 7, 28, 18, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2024, 7, 29, 18, 0, 0).unwrap(),
        ]
    }

    fn sites() -> Vec<Location> {
        vec![Location::new(-118.2, 34.1), Location::new(12.5, 41.9)]
    }

    /// every site at every time, time major, value = 10 * time + site
    fn cross_product() -> Vec<ServiceRecord> {
        let mut records = vec![];
        for (t, time) in times().into_iter().enumerate() {
            for (s, site) in sites().into_iter().enumerate() {
                records.push(ServiceRecord::new(site, Some(time), (10 * t + s) as f64));
            }
        }
        records
    }

    #[test]
    fn join_cross_product_by_key() {
        let (times, sites) = (times(), sites());
        // second site at the first time, first site at the second time
        let observations = vec![
            Observation::new(times[0], sites[1]),
            Observation::new(times[1], sites[0]),
        ];
        let values = join_records("COT", &observations, &cross_product()).expect("should join");
        assert_eq!(values, vec![1.0, 10.0]);

        let mut reversed = cross_product();
        reversed.reverse();
        let values = join_records("COT", &observations, &reversed).expect("should join");
        assert_eq!(values, vec![1.0, 10.0]);
    }

    #[test]
    fn coordinates_match_at_resolution() {
        let observation = Observation::new(times()[0], Location::new(-118.2000000001, 34.1));
        let values =
            join_records("COT", &[observation], &cross_product()).expect("should join");
        assert_eq!(values, vec![0.0]);
    }

    #[test]
    fn static_records_ignore_time() {
        let records: Vec<ServiceRecord> = sites()
            .into_iter()
            .map(|site| ServiceRecord::new(site, None, site.lat))
            .collect();
        let observations: Vec<Observation> = times()
            .into_iter()
            .map(|time| Observation::new(time, sites()[1]))
            .collect();
        let values = join_records("elevation_km", &observations, &records).expect("should join");
        assert_eq!(values, vec![41.9, 41.9]);
    }

    #[test]
    fn missing_record() {
        let late = Utc.with_ymd_and_hms(2024, 7, 30, 18, 0, 0).unwrap();
        let observation = Observation::new(late, sites()[0]);
        match join_records("AOT", &[observation], &cross_product()) {
            Err(FLiESError::MissingServiceRecord { variable, time, .. }) => {
                assert_eq!(variable, "AOT");
                assert!(time.is_some());
            }
            other => panic!("unexpected {other:?}"),
        }
        // fewer records than observations is never filled by position
        let mut truncated = cross_product();
        truncated.truncate(1);
        let observations = vec![
            Observation::new(times()[0], sites()[0]),
            Observation::new(times()[0], sites()[1]),
        ];
        assert!(join_records("AOT", &observations, &truncated).is_err());
    }

    #[test]
    fn conflicting_records() {
        let mut records = cross_product();
        records.push(ServiceRecord::new(sites()[0], Some(times()[0]), 99.0));
        assert!(matches!(
            join_records("COT", &[], &records),
            Err(FLiESError::AmbiguousServiceRecord { .. })
        ));

        // exact duplicates are harmless
        let mut records = cross_product();
        let first = records[0];
        records.push(first);
        let observation = Observation::new(times()[0], sites()[0]);
        assert_eq!(
            join_records("COT", &[observation], &records).expect("should join"),
            vec![0.0]
        );
    }

    #[test]
    fn mixed_timed_and_static_records() {
        let mut records = cross_product();
        records.push(ServiceRecord::new(sites()[0], None, 5.0));
        let observation = Observation::new(times()[0], sites()[0]);
        match join_records("ozone_cm", &[observation], &records) {
            Err(FLiESError::Service { service, reason }) => {
                assert_eq!(service, "ozone_cm");
                assert!(reason.contains("4 of 5"));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn sites_without_coordinates_never_match() {
        let origin = Location::new(0.0, 0.0);
        let records = vec![ServiceRecord::new(origin, None, 0.4)];
        let observation = Observation::new(times()[0], Location::new(f64::NAN, f64::NAN));
        assert!(matches!(
            join_records("elevation_km", &[observation], &records),
            Err(FLiESError::GeometryParse { .. })
        ));
    }
}
