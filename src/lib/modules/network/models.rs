use std::{fs::File, io::BufReader, path::Path};

use log::info;
use ndarray::{Array1, Array2, ArrayD};
use serde_derive::{Deserialize, Serialize};
use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter, EnumString};

use crate::error::{FLiESError, FLiESResult};

/// Inputs of the network
#[allow(non_camel_case_types, clippy::upper_case_acronyms)]
#[derive(
    Debug, PartialEq, Eq, Hash, Copy, Clone, EnumString, EnumIter, Display, Serialize, Deserialize,
)]
pub enum FeatureName {
    /// cloud type [-]
    ctype,
    /// aerosol type [-]
    atype,
    /// cloud optical thickness [-]
    COT,
    /// aerosol optical thickness [-]
    AOT,
    /// water vapor [g/cm2]
    vapor_gccm,
    /// ozone [cm]
    ozone_cm,
    /// surface albedo [-]
    albedo,
    /// elevation [km]
    elevation_km,
    /// solar zenith angle [°]
    SZA,
}

/// Outputs of the network
#[allow(non_camel_case_types)]
#[derive(
    Debug, PartialEq, Eq, Hash, Copy, Clone, EnumString, EnumIter, Display, Serialize, Deserialize,
)]
pub enum PredictionName {
    /// atmospheric transmittance
    tm,
    /// UV proportion
    puv,
    /// visible proportion
    pvis,
    /// near infrared proportion
    pnir,
    /// UV diffuse fraction
    fduv,
    /// visible diffuse fraction
    fdvis,
    /// near infrared diffuse fraction
    fdnir,
}

/// Model inputs, all reconciled to the same shape
#[derive(Debug, Clone)]
#[allow(non_snake_case)]
pub struct Features {
    pub ctype: ArrayD<f64>,
    pub atype: ArrayD<f64>,
    pub COT: ArrayD<f64>,
    pub AOT: ArrayD<f64>,
    pub vapor_gccm: ArrayD<f64>,
    pub ozone_cm: ArrayD<f64>,
    pub albedo: ArrayD<f64>,
    pub elevation_km: ArrayD<f64>,
    pub SZA: ArrayD<f64>,
}

impl Features {
    pub fn get(&self, name: &FeatureName) -> &ArrayD<f64> {
        use FeatureName::*;
        match name {
            ctype => &self.ctype,
            atype => &self.atype,
            COT => &self.COT,
            AOT => &self.AOT,
            vapor_gccm => &self.vapor_gccm,
            ozone_cm => &self.ozone_cm,
            albedo => &self.albedo,
            elevation_km => &self.elevation_km,
            SZA => &self.SZA,
        }
    }

    pub fn shape(&self) -> &[usize] {
        self.COT.shape()
    }

    pub fn len(&self) -> usize {
        self.COT.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Network outputs, each in [0, 1] and shaped like the features
#[derive(Debug, Clone)]
pub struct Prediction {
    pub tm: ArrayD<f64>,
    pub puv: ArrayD<f64>,
    pub pvis: ArrayD<f64>,
    pub pnir: ArrayD<f64>,
    pub fduv: ArrayD<f64>,
    pub fdvis: ArrayD<f64>,
    pub fdnir: ArrayD<f64>,
}

impl Prediction {
    pub fn get_mut(&mut self, name: &PredictionName) -> &mut ArrayD<f64> {
        use PredictionName::*;
        match name {
            tm => &mut self.tm,
            puv => &mut self.puv,
            pvis => &mut self.pvis,
            pnir => &mut self.pnir,
            fduv => &mut self.fduv,
            fdvis => &mut self.fdvis,
            fdnir => &mut self.fdnir,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumString, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Activation {
    Linear,
    Relu,
    Sigmoid,
    Tanh,
}

/// Layer as exported to JSON: `weights` is `[n_inputs][n_outputs]`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayerDefinition {
    pub weights: Vec<Vec<f64>>,
    pub biases: Vec<f64>,
    pub activation: Activation,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkDefinition {
    pub inputs: Vec<FeatureName>,
    pub outputs: Vec<PredictionName>,
    /// subtracted from the inputs before the first layer
    #[serde(default)]
    pub input_offset: Option<Vec<f64>>,
    /// inputs are divided by this after the offset
    #[serde(default)]
    pub input_scale: Option<Vec<f64>>,
    pub layers: Vec<LayerDefinition>,
}

#[derive(Debug, Clone)]
pub struct DenseLayer {
    pub weights: Array2<f64>,
    pub biases: Array1<f64>,
    pub activation: Activation,
}

/// Fully connected feed-forward network
#[derive(Debug, Clone)]
pub struct DenseNetwork {
    pub inputs: Vec<FeatureName>,
    pub outputs: Vec<PredictionName>,
    pub input_offset: Array1<f64>,
    pub input_scale: Array1<f64>,
    pub layers: Vec<DenseLayer>,
}

fn network_error(msg: impl Into<String>) -> FLiESError {
    FLiESError::Network(msg.into())
}

impl DenseLayer {
    fn new(index: usize, def: LayerDefinition) -> FLiESResult<Self> {
        let n_in = def.weights.len();
        let n_out = def.weights.first().map(|row| row.len()).unwrap_or(0);
        if n_in == 0 || n_out == 0 {
            return Err(network_error(format!("layer {index} has no weights")));
        }
        if def.weights.iter().any(|row| row.len() != n_out) {
            return Err(network_error(format!("layer {index} has ragged weights")));
        }
        if def.biases.len() != n_out {
            return Err(network_error(format!(
                "layer {index} has {} biases for {n_out} units",
                def.biases.len()
            )));
        }
        let flat: Vec<f64> = def.weights.into_iter().flatten().collect();
        let weights = Array2::from_shape_vec((n_in, n_out), flat)
            .map_err(|err| network_error(format!("layer {index}: {err}")))?;
        Ok(Self {
            weights,
            biases: Array1::from_vec(def.biases),
            activation: def.activation,
        })
    }

    pub fn n_inputs(&self) -> usize {
        self.weights.nrows()
    }

    pub fn n_outputs(&self) -> usize {
        self.weights.ncols()
    }
}

impl DenseNetwork {
    pub fn new(def: NetworkDefinition) -> FLiESResult<Self> {
        let n_features = def.inputs.len();
        if n_features == 0 {
            return Err(network_error("network has no inputs"));
        }

        let layers = def
            .layers
            .into_iter()
            .enumerate()
            .map(|(index, layer)| DenseLayer::new(index, layer))
            .collect::<FLiESResult<Vec<_>>>()?;

        let first = layers
            .first()
            .ok_or_else(|| network_error("network has no layers"))?;
        if first.n_inputs() != n_features {
            return Err(network_error(format!(
                "first layer expects {} inputs, {} features declared",
                first.n_inputs(),
                n_features
            )));
        }
        for (index, pair) in layers.windows(2).enumerate() {
            if pair[0].n_outputs() != pair[1].n_inputs() {
                return Err(network_error(format!(
                    "layer {} produces {} values, layer {} expects {}",
                    index,
                    pair[0].n_outputs(),
                    index + 1,
                    pair[1].n_inputs()
                )));
            }
        }
        let n_outputs = layers.last().map(|l| l.n_outputs()).unwrap_or(0);
        if n_outputs != def.outputs.len() {
            return Err(network_error(format!(
                "last layer produces {} values, {} outputs declared",
                n_outputs,
                def.outputs.len()
            )));
        }

        if let Some(missing) = PredictionName::iter().find(|name| !def.outputs.contains(name)) {
            return Err(network_error(format!("network does not predict {missing}")));
        }

        let input_offset = def.input_offset.unwrap_or_else(|| vec![0.0; n_features]);
        let input_scale = def.input_scale.unwrap_or_else(|| vec![1.0; n_features]);
        if input_offset.len() != n_features || input_scale.len() != n_features {
            return Err(network_error("input scaling does not match the inputs"));
        }
        if let Some((feature, scale)) = def
            .inputs
            .iter()
            .zip(&input_scale)
            .find(|(_, scale)| **scale == 0.0 || !scale.is_finite())
        {
            return Err(network_error(format!(
                "input scale of {feature} must be finite and non-zero, found {scale}"
            )));
        }

        Ok(Self {
            inputs: def.inputs,
            outputs: def.outputs,
            input_offset: Array1::from_vec(input_offset),
            input_scale: Array1::from_vec(input_scale),
            layers,
        })
    }

    pub fn from_json(json: &str) -> FLiESResult<Self> {
        let def: NetworkDefinition =
            serde_json::from_str(json).map_err(|err| network_error(err.to_string()))?;
        Self::new(def)
    }

    pub fn from_file(path: impl AsRef<Path>) -> FLiESResult<Self> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let def: NetworkDefinition = serde_json::from_reader(BufReader::new(file))
            .map_err(|err| network_error(format!("{}: {}", path.display(), err)))?;
        let network = Self::new(def)?;
        info!(
            "Loaded network from {} ({} layers)",
            path.display(),
            network.layers.len()
        );
        Ok(network)
    }
}
