use log::debug;
use ndarray::{Array2, ArrayD, Axis, IxDyn};

use crate::error::{FLiESError, FLiESResult};

use super::{
    models::{Activation, DenseNetwork, Features, Prediction},
    prelude::RadiativeTransfer,
};

pub fn activate(activation: Activation, x: f64) -> f64 {
    match activation {
        Activation::Linear => x,
        Activation::Relu => x.max(0.0),
        Activation::Sigmoid => 1.0 / (1.0 + (-x).exp()),
        Activation::Tanh => x.tanh(),
    }
}

/// Evaluate the network on a `[n_samples, n_inputs]` matrix
pub fn evaluate(network: &DenseNetwork, inputs: &Array2<f64>) -> Array2<f64> {
    let mut x = inputs - &network.input_offset;
    x /= &network.input_scale;

    for layer in &network.layers {
        let mut y = x.dot(&layer.weights) + &layer.biases;
        let activation = layer.activation;
        y.par_mapv_inplace(|v| activate(activation, v));
        x = y;
    }
    x
}

/// Stack the features in the order the network expects
fn feature_matrix(network: &DenseNetwork, features: &Features) -> FLiESResult<Array2<f64>> {
    let n = features.len();
    let mut matrix = Array2::<f64>::zeros((n, network.inputs.len()));
    for (j, name) in network.inputs.iter().enumerate() {
        let values = features.get(name);
        if values.shape() != features.shape() {
            return Err(FLiESError::ShapeMismatch {
                value_shape: values.shape().to_vec(),
                target_shape: features.shape().to_vec(),
            });
        }
        // logical order is the same for every feature since the shapes match
        for (m, v) in matrix.column_mut(j).iter_mut().zip(values.iter()) {
            *m = *v;
        }
    }
    Ok(matrix)
}

impl RadiativeTransfer for DenseNetwork {
    fn predict(&self, features: &Features) -> FLiESResult<Prediction> {
        let shape = features.shape().to_vec();
        let inputs = feature_matrix(self, features)?;
        debug!("Evaluating network on {} samples", inputs.nrows());

        let mut outputs = evaluate(self, &inputs);

        // samples with missing inputs have no prediction
        for (mut output, input) in outputs.outer_iter_mut().zip(inputs.outer_iter()) {
            if input.iter().any(|v| v.is_nan()) {
                output.fill(f64::NAN);
            }
        }

        let empty = ArrayD::<f64>::zeros(IxDyn(&shape));
        let mut prediction = Prediction {
            tm: empty.clone(),
            puv: empty.clone(),
            pvis: empty.clone(),
            pnir: empty.clone(),
            fduv: empty.clone(),
            fdvis: empty.clone(),
            fdnir: empty,
        };

        for (j, name) in self.outputs.iter().enumerate() {
            let column = outputs.index_axis(Axis(1), j).mapv(|v| v.clamp(0.0, 1.0));
            *prediction.get_mut(name) = column
                .into_shape_with_order(IxDyn(&shape))
                .map_err(|err| FLiESError::Network(format!("cannot reshape {name}: {err}")))?;
        }
        Ok(prediction)
    }
}
