use std::{fs::File, io::Read};

use flies::modules::{
    services::{cached::CachedSource, models::AtmosphericVariable},
    table::models::Defaults,
};
use log::info;
use serde_derive::{Deserialize, Serialize};

use crate::common::helpers::RunError;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProcessingMode {
    /// every covariate is a column of the input table
    Strict,
    /// missing covariates come from the cached services, then from the defaults
    #[default]
    Retrieve,
}

/// CSV files holding service responses
#[allow(non_snake_case)]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub COT: Option<String>,
    pub AOT: Option<String>,
    pub vapor_gccm: Option<String>,
    pub ozone_cm: Option<String>,
    pub elevation_km: Option<String>,
    pub KG_climate: Option<String>,
}

impl CacheConfig {
    fn atmosphere(&self) -> Vec<(AtmosphericVariable, &String)> {
        [
            (AtmosphericVariable::COT, &self.COT),
            (AtmosphericVariable::AOT, &self.AOT),
            (AtmosphericVariable::vapor_gccm, &self.vapor_gccm),
            (AtmosphericVariable::ozone_cm, &self.ozone_cm),
        ]
        .into_iter()
        .filter_map(|(variable, path)| path.as_ref().map(|path| (variable, path)))
        .collect()
    }

    pub fn is_empty(&self) -> bool {
        self == &CacheConfig::default()
    }

    /// Load every configured file, None when nothing is cached
    pub fn load(&self) -> Result<Option<CachedSource>, RunError> {
        if self.is_empty() {
            return Ok(None);
        }
        let mut source = CachedSource::new();
        for (variable, path) in self.atmosphere() {
            source = source
                .load_atmosphere(variable, path)
                .map_err(|err| format!("Cannot load cached {} from {}: {}", variable, path, err))?;
        }
        if let Some(path) = &self.elevation_km {
            source = source
                .load_elevation(path)
                .map_err(|err| format!("Cannot load cached elevation from {}: {}", path, err))?;
        }
        if let Some(path) = &self.KG_climate {
            source = source
                .load_climate(path)
                .map_err(|err| format!("Cannot load cached climate from {}: {}", path, err))?;
        }
        Ok(Some(source))
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunConfig {
    #[serde(default)]
    pub mode: ProcessingMode,
    /// path of the network weights (JSON)
    #[serde(default)]
    pub network: Option<String>,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub defaults: Defaults,
}

impl RunConfig {
    pub fn from_yaml_str(contents: &str) -> Result<Self, RunError> {
        let conf = serde_yaml::from_str(contents)
            .map_err(|err| format!("Cannot parse config: {}", err))?;
        Ok(conf)
    }

    pub fn from_file(config_file: &str) -> Result<Self, RunError> {
        if !(config_file.ends_with(".yaml") || config_file.ends_with(".yml")) {
            return Err(RunError::from(format!(
                "Unsupported config file format: {}",
                config_file
            )));
        }
        let mut file = File::open(config_file)
            .map_err(|err| format!("Cannot open config file {}: {}", config_file, err))?;

        let mut contents = String::new();
        file.read_to_string(&mut contents)
            .map_err(|err| format!("Cannot read config file {}: {}", config_file, err))?;

        let conf = Self::from_yaml_str(&contents)
            .map_err(|err| format!("Cannot parse config file {}: {}", config_file, err))?;
        info!("Loaded configuration from {}", config_file);
        Ok(conf)
    }
}
