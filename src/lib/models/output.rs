use ndarray::ArrayD;
use strum::EnumProperty;
use strum_macros::{Display, EnumIter, EnumProperty, EnumString};

#[allow(non_snake_case)]
#[derive(Debug, Clone, Copy)]
pub struct OutputElement {
    // ------------------- IRRADIANCE ------------------- //
    /// Incoming shortwave radiation at the surface
    pub SWin: f64,
    /// Incoming shortwave radiation at the top of the atmosphere
    pub SWin_TOA: f64,
    /// Ultraviolet radiation
    pub UV: f64,
    /// Photosynthetically active (visible) radiation
    pub PAR: f64,
    /// Near-infrared radiation
    pub NIR: f64,
    /// Diffuse visible radiation
    pub PAR_diffuse: f64,
    /// Diffuse near-infrared radiation
    pub NIR_diffuse: f64,
    /// Direct visible radiation
    pub PAR_direct: f64,
    /// Direct near-infrared radiation
    pub NIR_direct: f64,

    // ---------------- NETWORK OUTPUTS ----------------- //
    pub transmittance: f64,
    pub UV_proportion: f64,
    pub PAR_proportion: f64,
    pub NIR_proportion: f64,
    pub UV_diffuse_fraction: f64,
    pub PAR_diffuse_fraction: f64,
    pub NIR_diffuse_fraction: f64,
}

impl Default for OutputElement {
    fn default() -> Self {
        Self {
            SWin: f64::NAN,
            SWin_TOA: f64::NAN,
            UV: f64::NAN,
            PAR: f64::NAN,
            NIR: f64::NAN,
            PAR_diffuse: f64::NAN,
            NIR_diffuse: f64::NAN,
            PAR_direct: f64::NAN,
            NIR_direct: f64::NAN,

            transmittance: f64::NAN,
            UV_proportion: f64::NAN,
            PAR_proportion: f64::NAN,
            NIR_proportion: f64::NAN,
            UV_diffuse_fraction: f64::NAN,
            PAR_diffuse_fraction: f64::NAN,
            NIR_diffuse_fraction: f64::NAN,
        }
    }
}

#[allow(non_camel_case_types, clippy::upper_case_acronyms)]
#[derive(
    Debug, PartialEq, Eq, Hash, Copy, Clone, EnumString, EnumProperty, EnumIter, Display,
)]
pub enum OutputVariableName {
    #[strum(props(long_name = "Incoming shortwave radiation", units = "W/m2", legacy = "SWin_Wm2"))]
    SWin_Wm2,
    #[strum(props(
        long_name = "Top of atmosphere incoming shortwave radiation",
        units = "W/m2",
        legacy = "SWin_TOA_Wm2"
    ))]
    SWin_TOA_Wm2,
    #[strum(props(long_name = "Ultraviolet radiation", units = "W/m2", legacy = "UV"))]
    UV_Wm2,
    #[strum(props(long_name = "Visible radiation", units = "W/m2", legacy = "VIS"))]
    PAR_Wm2,
    #[strum(props(long_name = "Near-infrared radiation", units = "W/m2", legacy = "NIR"))]
    NIR_Wm2,
    #[strum(props(long_name = "Diffuse visible radiation", units = "W/m2", legacy = "VISdiff"))]
    PAR_diffuse_Wm2,
    #[strum(props(
        long_name = "Diffuse near-infrared radiation",
        units = "W/m2",
        legacy = "NIRdiff"
    ))]
    NIR_diffuse_Wm2,
    #[strum(props(long_name = "Direct visible radiation", units = "W/m2", legacy = "VISdir"))]
    PAR_direct_Wm2,
    #[strum(props(
        long_name = "Direct near-infrared radiation",
        units = "W/m2",
        legacy = "NIRdir"
    ))]
    NIR_direct_Wm2,
    #[strum(props(long_name = "Atmospheric transmittance", units = "-", legacy = "tm"))]
    atmospheric_transmittance,
    #[strum(props(long_name = "Proportion of ultraviolet radiation", units = "-", legacy = "puv"))]
    UV_proportion,
    #[strum(props(long_name = "Proportion of visible radiation", units = "-", legacy = "pvis"))]
    PAR_proportion,
    #[strum(props(
        long_name = "Proportion of near-infrared radiation",
        units = "-",
        legacy = "pnir"
    ))]
    NIR_proportion,
    #[strum(props(
        long_name = "Diffuse fraction of ultraviolet radiation",
        units = "-",
        legacy = "fduv"
    ))]
    UV_diffuse_fraction,
    #[strum(props(
        long_name = "Diffuse fraction of visible radiation",
        units = "-",
        legacy = "fdvis"
    ))]
    PAR_diffuse_fraction,
    #[strum(props(
        long_name = "Diffuse fraction of near-infrared radiation",
        units = "-",
        legacy = "fdnir"
    ))]
    NIR_diffuse_fraction,
}

impl OutputVariableName {
    /// column name used by the legacy FLiES table
    pub fn legacy_name(&self) -> String {
        self.get_str("legacy")
            .map(str::to_owned)
            .unwrap_or_else(|| self.to_string())
    }

    pub fn long_name(&self) -> &'static str {
        self.get_str("long_name").unwrap_or("")
    }

    pub fn units(&self) -> &'static str {
        self.get_str("units").unwrap_or("")
    }
}

pub struct Output {
    pub data: ArrayD<OutputElement>,
}

impl Output {
    pub fn new(data: ArrayD<OutputElement>) -> Self {
        Self { data }
    }

    pub fn shape(&self) -> &[usize] {
        self.data.shape()
    }

    pub fn get_array(&self, func: fn(&OutputElement) -> f64) -> ArrayD<f64> {
        self.data.map(func)
    }

    pub fn get(&self, variable: &OutputVariableName) -> ArrayD<f64> {
        use OutputVariableName::*;
        match variable {
            SWin_Wm2 => self.get_array(|o| o.SWin),
            SWin_TOA_Wm2 => self.get_array(|o| o.SWin_TOA),
            UV_Wm2 => self.get_array(|o| o.UV),
            PAR_Wm2 => self.get_array(|o| o.PAR),
            NIR_Wm2 => self.get_array(|o| o.NIR),
            PAR_diffuse_Wm2 => self.get_array(|o| o.PAR_diffuse),
            NIR_diffuse_Wm2 => self.get_array(|o| o.NIR_diffuse),
            PAR_direct_Wm2 => self.get_array(|o| o.PAR_direct),
            NIR_direct_Wm2 => self.get_array(|o| o.NIR_direct),

            atmospheric_transmittance => self.get_array(|o| o.transmittance),
            UV_proportion => self.get_array(|o| o.UV_proportion),
            PAR_proportion => self.get_array(|o| o.PAR_proportion),
            NIR_proportion => self.get_array(|o| o.NIR_proportion),
            UV_diffuse_fraction => self.get_array(|o| o.UV_diffuse_fraction),
            PAR_diffuse_fraction => self.get_array(|o| o.PAR_diffuse_fraction),
            NIR_diffuse_fraction => self.get_array(|o| o.NIR_diffuse_fraction),
        }
    }
}
