use chrono::{DateTime, Utc};
use itertools::Itertools;
use log::{info, warn};
use rayon::prelude::*;
use strum::IntoEnumIterator;

use crate::{
    error::{FLiESError, FLiESResult},
    models::{
        input::{parse_time, InputVariableName, Observation},
        output::{Output, OutputVariableName},
        table::Table,
    },
    modules::{
        climate::functions::climate_code,
        flies::{functions::process_flies, models::ModelInputs},
        geometry::{
            functions::{parse_point, points_from_coords},
            models::MultiPoint,
        },
        network::prelude::RadiativeTransfer,
        services::{
            functions::join_records,
            models::{AtmosphericVariable, Services},
        },
        shape::{functions::reconcile, models::Covariate},
        solar::functions::{day_of_year, solar_zenith_angle},
    },
};

use super::models::Defaults;

fn name(variable: InputVariableName) -> String {
    variable.to_string()
}

/// Sites of the table, from `geometry` or from `lat` and `lon`
pub fn extract_geometry(table: &Table) -> FLiESResult<MultiPoint> {
    use InputVariableName::*;
    if table.has_column(&name(geometry)) {
        let points = table
            .text(&name(geometry))?
            .par_iter()
            .map(|text| parse_point(text))
            .collect::<FLiESResult<Vec<_>>>()?;
        return Ok(MultiPoint::new(points));
    }
    if table.has_column(&name(lat)) && table.has_column(&name(lon)) {
        let lats = table.numeric(&name(lat))?;
        let lons = table.numeric(&name(lon))?;
        return points_from_coords(&lons, &lats);
    }
    Err(FLiESError::MissingColumn(vec![
        name(geometry),
        name(lat),
        name(lon),
    ]))
}

pub fn extract_times(table: &Table) -> FLiESResult<Vec<DateTime<Utc>>> {
    table
        .text(&name(InputVariableName::time_UTC))?
        .iter()
        .enumerate()
        .map(|(row, text)| parse_time(text, row))
        .collect()
}

/// Name of the climate column, `KG_climate` preferred over `KG`
fn climate_column(table: &Table) -> Option<String> {
    [InputVariableName::KG_climate, InputVariableName::KG]
        .into_iter()
        .map(name)
        .find(|column| table.has_column(column))
}

fn climate_codes(table: &Table, column: &str) -> FLiESResult<Vec<i32>> {
    table
        .text(column)?
        .iter()
        .map(|text| climate_code(text))
        .collect()
}

fn column(table: &Table, variable: InputVariableName) -> FLiESResult<Option<Covariate<f64>>> {
    let column = name(variable);
    if !table.has_column(&column) {
        return Ok(None);
    }
    Ok(Some(Covariate::from(table.numeric(&column)?)))
}

/// Values of a covariate, one per table row
fn covariate_values<T: Clone + Into<f64>>(
    covariate: &Covariate<T>,
    n_rows: usize,
) -> FLiESResult<Vec<f64>> {
    let values = reconcile(covariate.clone(), &[n_rows])?;
    Ok(values.iter().map(|value| value.clone().into()).collect())
}

/// Covariates the table did not provide, in input order
fn derived_columns(table: &Table, inputs: &ModelInputs) -> FLiESResult<Vec<(String, Vec<f64>)>> {
    use InputVariableName::*;
    let n_rows = table.n_rows();
    let mut columns = vec![];
    for (variable, covariate) in [
        (doy, &inputs.doy),
        (COT, &inputs.COT),
        (AOT, &inputs.AOT),
        (vapor_gccm, &inputs.vapor_gccm),
        (ozone_cm, &inputs.ozone_cm),
        (elevation_km, &inputs.elevation_km),
        (SZA, &inputs.SZA),
    ] {
        if !table.has_column(&name(variable)) {
            columns.push((name(variable), covariate_values(covariate, n_rows)?));
        }
    }
    if climate_column(table).is_none() {
        columns.push((
            name(KG_climate),
            covariate_values(&inputs.KG_climate, n_rows)?,
        ));
    }
    Ok(columns)
}

/// Append `covariates` and then the radiation columns to a copy of the table
fn output_table(
    table: &Table,
    covariates: Vec<(String, Vec<f64>)>,
    output: &Output,
    legacy: bool,
) -> FLiESResult<Table> {
    let mut result = table.clone();
    for (column, values) in covariates {
        result.insert_numeric(&column, values)?;
    }
    for variable in OutputVariableName::iter() {
        let column = if legacy {
            variable.legacy_name()
        } else {
            variable.to_string()
        };
        let values: Vec<f64> = output.get(&variable).iter().copied().collect();
        result.insert_numeric(&column, values)?;
    }
    Ok(result)
}

/// Process a table holding every FLiES input.
///
/// Requires `doy`, `albedo`, `COT`, `AOT`, `vapor_gccm`, `ozone_cm`,
/// `elevation_km`, `SZA` and one of `KG_climate`/`KG`. The radiation columns are
/// appended with their short names (`VIS`, `NIRdiff`, `tm`, ...).
pub fn process_flies_table(table: &Table, model: &dyn RadiativeTransfer) -> FLiESResult<Table> {
    use InputVariableName::*;
    let required = [doy, albedo, COT, AOT, vapor_gccm, ozone_cm, elevation_km, SZA];

    let mut missing: Vec<String> = required
        .into_iter()
        .map(name)
        .filter(|column| !table.has_column(column))
        .collect();
    let kg_column = climate_column(table);
    if kg_column.is_none() {
        missing.push(name(KG));
    }
    let kg_column = match kg_column {
        Some(column) if missing.is_empty() => column,
        _ => return Err(FLiESError::MissingColumn(missing)),
    };

    let numeric = |variable: InputVariableName| -> FLiESResult<Covariate<f64>> {
        Ok(Covariate::from(table.numeric(&name(variable))?))
    };
    let inputs = ModelInputs {
        doy: numeric(doy)?,
        albedo: numeric(albedo)?,
        COT: numeric(COT)?,
        AOT: numeric(AOT)?,
        vapor_gccm: numeric(vapor_gccm)?,
        ozone_cm: numeric(ozone_cm)?,
        elevation_km: numeric(elevation_km)?,
        SZA: numeric(SZA)?,
        KG_climate: Covariate::from(climate_codes(table, &kg_column)?),
    };

    let output = process_flies(inputs, model)?;
    output_table(table, vec![], &output, true)
}

fn atmospheric_covariate(
    table: &Table,
    variable: AtmosphericVariable,
    observations: &[Observation],
    services: &Services,
    defaults: &Defaults,
) -> FLiESResult<Covariate<f64>> {
    let column = variable.to_string();
    if table.has_column(&column) {
        return Ok(Covariate::from(table.numeric(&column)?));
    }
    if let Some(source) = services.atmosphere {
        info!("started retrieving {} from GEOS-5 FP", column);
        let records = source.query(variable, observations)?;
        let values = join_records(&column, observations, &records)?;
        info!("completed retrieving {} from GEOS-5 FP", column);
        return Ok(Covariate::from(values));
    }
    match defaults.atmospheric(variable) {
        Some(value) => {
            warn!("{} not available, using {}", column, value);
            Ok(Covariate::Scalar(value))
        }
        None => Err(FLiESError::MissingColumn(vec![column])),
    }
}

fn elevation_covariate(
    table: &Table,
    observations: &[Observation],
    services: &Services,
    defaults: &Defaults,
) -> FLiESResult<Covariate<f64>> {
    if let Some(values) = column(table, InputVariableName::elevation_km)? {
        return Ok(values);
    }
    let column = name(InputVariableName::elevation_km);
    if let Some(source) = services.elevation {
        info!("started retrieving elevation from NASADEM");
        let locations: Vec<_> = observations
            .iter()
            .map(|o| o.location)
            .unique_by(|location| location.key().ok())
            .collect();
        let records = source.elevation_km(&locations)?;
        let values = join_records(&column, observations, &records)?;
        info!("completed retrieving elevation from NASADEM");
        return Ok(Covariate::from(values));
    }
    match defaults.elevation_km {
        Some(value) => {
            warn!("{} not available, using {}", column, value);
            Ok(Covariate::Scalar(value))
        }
        None => Err(FLiESError::MissingColumn(vec![column])),
    }
}

fn climate_covariate(
    table: &Table,
    observations: &[Observation],
    services: &Services,
) -> FLiESResult<Covariate<i32>> {
    if let Some(column) = climate_column(table) {
        return Ok(Covariate::from(climate_codes(table, &column)?));
    }
    let Some(source) = services.climate else {
        return Err(FLiESError::MissingColumn(vec![
            name(InputVariableName::KG_climate),
            name(InputVariableName::KG),
        ]));
    };
    info!("started retrieving Koppen-Geiger climate");
    let locations: Vec<_> = observations
        .iter()
        .map(|o| o.location)
        .unique_by(|location| location.key().ok())
        .collect();
    let records = source.koppen_geiger(&locations)?;
    let codes = join_records(&name(InputVariableName::KG_climate), observations, &records)?
        .into_iter()
        .map(|code| {
            if code.is_finite() && code.fract() == 0.0 {
                Ok(code as i32)
            } else {
                Err(FLiESError::UnknownClimate(code.to_string()))
            }
        })
        .collect::<FLiESResult<Vec<i32>>>()?;
    info!("completed retrieving Koppen-Geiger climate");
    Ok(Covariate::from(codes))
}

/// Process a table of site-time observations, retrieving what is missing.
///
/// Requires `time_UTC`, `geometry` (or `lat` and `lon`) and `albedo`. `doy` and
/// `SZA` are derived from time and location when absent. Other covariates come
/// from the table, then from `services`, then from `defaults`; a covariate
/// found nowhere is a missing column. Covariates not read from the table are
/// appended as columns, followed by the radiation columns with their full names.
pub fn process_flies_ann_table(
    table: &Table,
    model: &dyn RadiativeTransfer,
    services: Services,
    defaults: &Defaults,
) -> FLiESResult<Table> {
    info!("started extracting geometry from FLiES input table");
    let geometry = extract_geometry(table)?;
    info!("completed extracting geometry from FLiES input table");

    info!("started extracting time from FLiES input table");
    let times = extract_times(table)?;
    info!("completed extracting time from FLiES input table");

    let observations: Vec<Observation> = times
        .iter()
        .zip(&geometry.points)
        .map(|(time, location)| Observation::new(*time, *location))
        .collect();

    let albedo = column(table, InputVariableName::albedo)?
        .ok_or_else(|| FLiESError::MissingColumn(vec![name(InputVariableName::albedo)]))?;

    let doy = match column(table, InputVariableName::doy)? {
        Some(doy) => doy,
        None => Covariate::from(times.iter().map(day_of_year).collect::<Vec<f64>>()),
    };

    let sza = match column(table, InputVariableName::SZA)? {
        Some(sza) => sza,
        None => Covariate::from(
            observations
                .par_iter()
                .map(|o| solar_zenith_angle(o.location.lat, o.location.lon, &o.time))
                .collect::<Vec<f64>>(),
        ),
    };

    let atmospheric = |variable| {
        atmospheric_covariate(table, variable, &observations, &services, defaults)
    };
    let inputs = ModelInputs {
        doy,
        albedo,
        COT: atmospheric(AtmosphericVariable::COT)?,
        AOT: atmospheric(AtmosphericVariable::AOT)?,
        vapor_gccm: atmospheric(AtmosphericVariable::vapor_gccm)?,
        ozone_cm: atmospheric(AtmosphericVariable::ozone_cm)?,
        elevation_km: elevation_covariate(table, &observations, &services, defaults)?,
        SZA: sza,
        KG_climate: climate_covariate(table, &observations, &services)?,
    };

    let covariates = derived_columns(table, &inputs)?;
    let output = process_flies(inputs, model)?;
    output_table(table, covariates, &output, false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::{
        geometry::models::Location,
        network::models::{Features, Prediction},
        services::{
            cached::CachedSource,
            models::ServiceRecord,
            prelude::AtmosphereSource,
        },
    };
    use ndarray::ArrayD;
    use std::cell::RefCell;

    /// transmittance is 1 - COT / 100, the rest depends on the aerosol type
    struct FakeModel {
        seen: RefCell<Option<Features>>,
    }

    impl FakeModel {
        fn new() -> Self {
            Self {
                seen: RefCell::new(None),
            }
        }

        fn features(&self) -> Features {
            self.seen.borrow().clone().expect("model was not called")
        }
    }

    impl RadiativeTransfer for FakeModel {
        fn predict(&self, features: &Features) -> FLiESResult<Prediction> {
            self.seen.replace(Some(features.clone()));
            let fill = |v: f64| ArrayD::from_elem(features.COT.raw_dim(), v);
            Ok(Prediction {
                tm: features.COT.mapv(|cot| (1.0 - cot / 100.0).clamp(0.0, 1.0)),
                puv: fill(0.05),
                pvis: fill(0.45),
                pnir: fill(0.5),
                fduv: fill(0.5),
                fdvis: fill(0.2),
                fdnir: features.atype.clone() / 10.0,
            })
        }
    }

    fn read(csv: &str) -> Table {
        Table::from_reader(csv.as_bytes()).expect("should read")
    }

    const STRICT: &str = "doy,albedo,COT,AOT,vapor_gccm,ozone_cm,elevation_km,SZA,KG\n\
        172,0.2,0,0.1,1.0,0.3,0.5,0,BWk\n\
        172,0.2,50,0.1,1.0,0.3,0.5,60,14\n";

    #[test]
    fn strict_table_uses_short_names() {
        let model = FakeModel::new();
        let result = process_flies_table(&read(STRICT), &model).expect("should process");

        assert_eq!(result.n_rows(), 2);
        for column in ["SWin_Wm2", "SWin_TOA_Wm2", "VIS", "NIRdiff", "tm", "fdnir"] {
            assert!(result.has_column(column), "missing {column}");
        }
        assert!(!result.has_column("PAR_Wm2"));

        let tm = result.numeric("tm").expect("tm");
        assert_eq!(tm, vec![1.0, 0.5]);
        let fdnir = result.numeric("fdnir").expect("fdnir");
        assert_eq!(fdnir, vec![0.2, 0.1]);
    }

    #[test]
    fn strict_table_lists_missing_columns() {
        let table = read("doy,albedo,COT\n1,0.2,0\n");
        match process_flies_table(&table, &FakeModel::new()) {
            Err(FLiESError::MissingColumn(columns)) => {
                assert_eq!(
                    columns,
                    vec!["AOT", "vapor_gccm", "ozone_cm", "elevation_km", "SZA", "KG"]
                );
            }
            other => panic!("unexpected {:?}", other.map(|t| t.n_rows())),
        }
    }

    const OBSERVATIONS: &str = "time_UTC,geometry,albedo,KG_climate\n\
        2024-07-28 20:00:00,POINT (-118.2 34.1),0.12,BSk\n\
        2024-07-29 20:00:00,\"12.5,41.9\",0.2,Csa\n";

    #[test]
    fn retrieve_with_defaults() {
        let model = FakeModel::new();
        let mut defaults = Defaults::reference();
        defaults.elevation_km = Some(0.0);
        let result =
            process_flies_ann_table(&read(OBSERVATIONS), &model, Services::none(), &defaults)
                .expect("should process");

        for variable in OutputVariableName::iter() {
            assert!(result.has_column(&variable.to_string()));
        }
        let features = model.features();
        assert!(features.COT.iter().all(|v| *v == 0.0));
        assert!(features.ozone_cm.iter().all(|v| *v == 0.3));
        assert_eq!(features.atype.as_slice(), Some(&[2.0, 1.0][..]));

        // SZA derived from time and location
        let expected = solar_zenith_angle(
            34.1,
            -118.2,
            &parse_time("2024-07-28 20:00:00", 0).expect("time"),
        );
        assert!((features.SZA[0] - expected).abs() < 1e-9);
    }

    #[test]
    fn retrieve_without_source_or_default_fails() {
        match process_flies_ann_table(
            &read(OBSERVATIONS),
            &FakeModel::new(),
            Services::none(),
            &Defaults::reference(),
        ) {
            Err(FLiESError::MissingColumn(columns)) => assert_eq!(columns, vec!["elevation_km"]),
            other => panic!("unexpected {:?}", other.map(|t| t.n_rows())),
        }
    }

    #[test]
    fn missing_geometry_and_climate() {
        let table = read("time_UTC,albedo\n2024-07-28 20:00:00,0.2\n");
        assert!(matches!(
            extract_geometry(&table),
            Err(FLiESError::MissingColumn(_))
        ));

        let table = read("time_UTC,lat,lon,albedo,elevation_km\n2024-07-28 20:00:00,34.1,-118.2,0.2,0.1\n");
        match process_flies_ann_table(
            &table,
            &FakeModel::new(),
            Services::none(),
            &Defaults::reference(),
        ) {
            Err(FLiESError::MissingColumn(columns)) => {
                assert_eq!(columns, vec!["KG_climate", "KG"])
            }
            other => panic!("unexpected {:?}", other.map(|t| t.n_rows())),
        }
    }

    /// GEOS-5 FP style answer: every site at every requested time
    struct CrossProductAtmosphere;

    impl AtmosphereSource for CrossProductAtmosphere {
        fn query(
            &self,
            variable: AtmosphericVariable,
            observations: &[Observation],
        ) -> FLiESResult<Vec<ServiceRecord>> {
            let value: fn(f64) -> f64 = match variable {
                AtmosphericVariable::COT => |lat| lat,
                _ => |_| 0.1,
            };
            let mut records = vec![];
            for time in observations.iter().map(|o| o.time) {
                for location in observations.iter().map(|o| o.location) {
                    records.push(ServiceRecord::new(location, Some(time), value(location.lat)));
                }
            }
            Ok(records)
        }
    }

    #[test]
    fn retrieve_from_services() {
        let table = read(
            "time_UTC,lat,lon,albedo\n\
            2024-07-28 20:00:00,34.1,-118.2,0.12\n\
            2024-07-29 20:00:00,41.9,12.5,0.2\n",
        );
        let static_source = CachedSource::new()
            .with_elevation(vec![
                ServiceRecord::new(Location::new(12.5, 41.9), None, 0.02),
                ServiceRecord::new(Location::new(-118.2, 34.1), None, 0.09),
            ])
            .with_climate(vec![
                ServiceRecord::new(Location::new(-118.2, 34.1), None, 7.0),
                ServiceRecord::new(Location::new(12.5, 41.9), None, 8.0),
            ]);
        let services = Services {
            atmosphere: Some(&CrossProductAtmosphere),
            elevation: Some(&static_source),
            climate: Some(&static_source),
        };

        let model = FakeModel::new();
        let result = process_flies_ann_table(&table, &model, services, &Defaults::default())
            .expect("should process");
        assert_eq!(result.n_rows(), 2);

        let features = model.features();
        assert_eq!(features.COT.as_slice(), Some(&[34.1, 41.9][..]));
        assert_eq!(features.elevation_km.as_slice(), Some(&[0.09, 0.02][..]));
        assert_eq!(features.atype.as_slice(), Some(&[2.0, 1.0][..]));
        assert_eq!(features.AOT.as_slice(), Some(&[0.1, 0.1][..]));

        // retrieved covariates are written next to the radiation columns
        assert_eq!(result.numeric("COT").expect("COT"), vec![34.1, 41.9]);
        assert_eq!(result.numeric("elevation_km").expect("elevation"), vec![0.09, 0.02]);
        assert_eq!(result.numeric("KG_climate").expect("climate"), vec![7.0, 8.0]);
        assert_eq!(result.numeric("doy").expect("doy"), vec![210.0, 211.0]);
        assert!(result.has_column("SZA"));
        let names = result.column_names();
        let position = |column: &str| names.iter().position(|n| n == column);
        assert!(position("ozone_cm") < position("SWin_Wm2"));
    }

    #[test]
    fn invalid_coordinates_fail() {
        let source = CachedSource::new().with_elevation(vec![
            ServiceRecord::new(Location::new(0.0, 0.0), None, 0.0),
            ServiceRecord::new(Location::new(10.0, 95.0), None, 0.1),
        ]);
        let services = Services {
            elevation: Some(&source),
            ..Services::none()
        };
        for rows in ["2024-07-28 20:00:00,,,0.2,8\n", "2024-07-28 20:00:00,95,10,0.2,8\n"] {
            let table = read(&format!("time_UTC,lat,lon,albedo,KG\n{rows}"));
            match process_flies_ann_table(&table, &FakeModel::new(), services, &Defaults::reference()) {
                Err(FLiESError::GeometryParse { .. }) => {}
                other => panic!("unexpected {:?}", other.map(|t| t.n_rows())),
            }
        }
    }
}
