use std::{collections::HashMap, path::Path};

use chrono::{DateTime, Utc};
use itertools::izip;
use log::info;

use crate::{
    error::{FLiESError, FLiESResult},
    models::{
        input::{InputVariableName, Observation},
        table::Table,
    },
    modules::{
        climate::functions::climate_code,
        geometry::models::Location,
        table::functions::{extract_geometry, extract_times},
    },
};

use super::{
    models::{AtmosphericVariable, ServiceRecord},
    prelude::{AtmosphereSource, ClimateSource, ElevationSource},
};

fn times(table: &Table) -> FLiESResult<Vec<Option<DateTime<Utc>>>> {
    if !table.has_column(&InputVariableName::time_UTC.to_string()) {
        return Ok(vec![None; table.n_rows()]);
    }
    Ok(extract_times(table)?.into_iter().map(Some).collect())
}

/// Records of a CSV with `lat`, `lon`, optional `time_UTC` and a `value_column`
pub fn records_from_table(table: &Table, value_column: &str) -> FLiESResult<Vec<ServiceRecord>> {
    let values = table.numeric(value_column)?;
    let records = izip!(extract_geometry(table)?.points, times(table)?, values)
        .map(|(location, time, value)| ServiceRecord::new(location, time, value))
        .collect();
    Ok(records)
}

/// Climate records: the value column holds codes or class names
pub fn climate_records_from_table(table: &Table) -> FLiESResult<Vec<ServiceRecord>> {
    let column = [InputVariableName::KG_climate, InputVariableName::KG]
        .iter()
        .map(|name| name.to_string())
        .find(|name| table.has_column(name))
        .ok_or_else(|| {
            FLiESError::MissingColumn(vec![
                InputVariableName::KG_climate.to_string(),
                InputVariableName::KG.to_string(),
            ])
        })?;
    let codes = table
        .text(&column)?
        .iter()
        .map(|text| climate_code(text).map(f64::from))
        .collect::<FLiESResult<Vec<f64>>>()?;
    let records = izip!(extract_geometry(table)?.points, times(table)?, codes)
        .map(|(location, time, code)| ServiceRecord::new(location, time, code))
        .collect();
    Ok(records)
}

/// Service responses saved to CSV files, served back for every query
#[derive(Debug, Clone, Default)]
pub struct CachedSource {
    atmosphere: HashMap<AtmosphericVariable, Vec<ServiceRecord>>,
    elevation: Option<Vec<ServiceRecord>>,
    climate: Option<Vec<ServiceRecord>>,
}

impl CachedSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_atmosphere(
        mut self,
        variable: AtmosphericVariable,
        records: Vec<ServiceRecord>,
    ) -> Self {
        self.atmosphere.insert(variable, records);
        self
    }

    pub fn with_elevation(mut self, records: Vec<ServiceRecord>) -> Self {
        self.elevation = Some(records);
        self
    }

    pub fn with_climate(mut self, records: Vec<ServiceRecord>) -> Self {
        self.climate = Some(records);
        self
    }

    pub fn load_atmosphere(
        self,
        variable: AtmosphericVariable,
        path: impl AsRef<Path>,
    ) -> FLiESResult<Self> {
        let path = path.as_ref();
        let records = records_from_table(&Table::from_path(path)?, &variable.to_string())?;
        info!("Loaded {} {} records from {}", records.len(), variable, path.display());
        Ok(self.with_atmosphere(variable, records))
    }

    pub fn load_elevation(self, path: impl AsRef<Path>) -> FLiESResult<Self> {
        let path = path.as_ref();
        let column = InputVariableName::elevation_km.to_string();
        let records = records_from_table(&Table::from_path(path)?, &column)?;
        info!("Loaded {} elevation records from {}", records.len(), path.display());
        Ok(self.with_elevation(records))
    }

    pub fn load_climate(self, path: impl AsRef<Path>) -> FLiESResult<Self> {
        let path = path.as_ref();
        let records = climate_records_from_table(&Table::from_path(path)?)?;
        info!("Loaded {} climate records from {}", records.len(), path.display());
        Ok(self.with_climate(records))
    }

    pub fn has_atmosphere(&self) -> bool {
        !self.atmosphere.is_empty()
    }

    pub fn has_elevation(&self) -> bool {
        self.elevation.is_some()
    }

    pub fn has_climate(&self) -> bool {
        self.climate.is_some()
    }
}

fn not_cached(service: &str, what: &str) -> FLiESError {
    FLiESError::Service {
        service: service.to_owned(),
        reason: format!("no cached {what} records"),
    }
}

impl AtmosphereSource for CachedSource {
    fn query(
        &self,
        variable: AtmosphericVariable,
        _observations: &[Observation],
    ) -> FLiESResult<Vec<ServiceRecord>> {
        self.atmosphere
            .get(&variable)
            .cloned()
            .ok_or_else(|| not_cached("GEOS5FP", &variable.to_string()))
    }
}

impl ElevationSource for CachedSource {
    fn elevation_km(&self, _locations: &[Location]) -> FLiESResult<Vec<ServiceRecord>> {
        self.elevation
            .clone()
            .ok_or_else(|| not_cached("NASADEM", "elevation"))
    }
}

impl ClimateSource for CachedSource {
    fn koppen_geiger(&self, _locations: &[Location]) -> FLiESResult<Vec<ServiceRecord>> {
        self.climate
            .clone()
            .ok_or_else(|| not_cached("Koppen-Geiger", "climate"))
    }
}
