use chrono::{DateTime, Utc};
use ndarray::{ArrayD, IxDyn};
use pyo3::{exceptions::PyValueError, prelude::*, types::PyModule, wrap_pyfunction, Bound};
use strum::IntoEnumIterator;

use crate::{
    error::FLiESError,
    models::{
        output::{Output, OutputVariableName},
        table::Table,
    },
    modules::{
        flies::{functions::process_flies, models::ModelInputs},
        geometry::functions::parse_point as parse_point_fn,
        network::models::DenseNetwork,
        services::models::Services,
        shape::{functions::reconcile_array, models::Covariate},
        solar::functions::solar_zenith_angle as solar_zenith_angle_fn,
        table::{
            functions::{process_flies_ann_table, process_flies_table},
            models::Defaults,
        },
    },
};

fn to_py_err(err: FLiESError) -> PyErr {
    PyValueError::new_err(err.to_string())
}

#[pyclass(name = "Network")]
pub struct PyNetwork {
    inner: DenseNetwork,
}

#[pymethods]
impl PyNetwork {
    #[new]
    fn new(path: String) -> PyResult<Self> {
        let inner = DenseNetwork::from_file(&path).map_err(to_py_err)?;
        Ok(Self { inner })
    }

    fn inputs(&self) -> Vec<String> {
        self.inner.inputs.iter().map(|v| v.to_string()).collect()
    }
}

#[pyclass(name = "Output")]
pub struct PyOutput {
    inner: Output,
}

#[pymethods]
impl PyOutput {
    fn len(&self) -> usize {
        self.inner.data.len()
    }

    fn shape(&self) -> Vec<usize> {
        self.inner.shape().to_vec()
    }

    /// values of a variable, by full or short name, flattened in row order
    fn get(&self, name: &str) -> PyResult<Vec<f64>> {
        let variable = OutputVariableName::iter()
            .find(|v| v.to_string() == name || v.legacy_name() == name)
            .ok_or_else(|| PyValueError::new_err(format!("Unknown output variable '{name}'")))?;
        Ok(self.inner.get(&variable).iter().copied().collect())
    }

    fn available_variables(&self) -> Vec<String> {
        OutputVariableName::iter().map(|v| v.to_string()).collect()
    }
}

/// Run FLiES-ANN on per-site vectors; length one vectors apply to every site
#[pyfunction]
#[allow(non_snake_case, clippy::too_many_arguments)]
fn flies(
    network: &PyNetwork,
    doy: Vec<f64>,
    albedo: Vec<f64>,
    COT: Vec<f64>,
    AOT: Vec<f64>,
    vapor_gccm: Vec<f64>,
    ozone_cm: Vec<f64>,
    elevation_km: Vec<f64>,
    SZA: Vec<f64>,
    KG_climate: Vec<i32>,
) -> PyResult<PyOutput> {
    let inputs = ModelInputs {
        doy: Covariate::from(doy),
        albedo: Covariate::from(albedo),
        COT: Covariate::from(COT),
        AOT: Covariate::from(AOT),
        vapor_gccm: Covariate::from(vapor_gccm),
        ozone_cm: Covariate::from(ozone_cm),
        elevation_km: Covariate::from(elevation_km),
        SZA: Covariate::from(SZA),
        KG_climate: Covariate::from(KG_climate),
    };
    let inner = process_flies(inputs, &network.inner).map_err(to_py_err)?;
    Ok(PyOutput { inner })
}

/// Process a CSV table and write the result. `strict` selects the table
/// holding every input, otherwise missing covariates take the reference
/// defaults.
#[pyfunction]
#[pyo3(signature = (network, input_path, output_path, strict=false))]
fn process_table(
    network: &PyNetwork,
    input_path: String,
    output_path: String,
    strict: bool,
) -> PyResult<usize> {
    let table = Table::from_path(&input_path).map_err(to_py_err)?;
    let result = if strict {
        process_flies_table(&table, &network.inner)
    } else {
        process_flies_ann_table(
            &table,
            &network.inner,
            Services::none(),
            &Defaults::reference(),
        )
    }
    .map_err(to_py_err)?;
    result.to_path(&output_path).map_err(to_py_err)?;
    Ok(result.n_rows())
}

/// Broadcast `values` of shape `value_shape` to `target_shape`, flattened
#[pyfunction]
fn reconcile(
    values: Vec<f64>,
    value_shape: Vec<usize>,
    target_shape: Vec<usize>,
) -> PyResult<Vec<f64>> {
    let array = ArrayD::from_shape_vec(IxDyn(&value_shape), values)
        .map_err(|err| PyValueError::new_err(err.to_string()))?;
    let result = reconcile_array(array, &target_shape).map_err(to_py_err)?;
    Ok(result.iter().copied().collect())
}

/// (lon, lat) of a point geometry
#[pyfunction]
fn parse_point(text: &str) -> PyResult<(f64, f64)> {
    let location = parse_point_fn(text).map_err(to_py_err)?;
    Ok((location.lon, location.lat))
}

#[pyfunction]
fn solar_zenith_angle(lat: f64, lon: f64, time: DateTime<Utc>) -> f64 {
    solar_zenith_angle_fn(lat, lon, &time)
}

#[pyfunction]
fn available_output_variables() -> Vec<String> {
    OutputVariableName::iter().map(|v| v.to_string()).collect()
}

/// (name, short name, long name, units) of every output variable
#[pyfunction]
fn output_variable_info() -> Vec<(String, String, String, String)> {
    OutputVariableName::iter()
        .map(|v| {
            (
                v.to_string(),
                v.legacy_name(),
                v.long_name().to_string(),
                v.units().to_string(),
            )
        })
        .collect()
}

#[pymodule]
fn flies_py(py: Python<'_>, module: Bound<'_, PyModule>) -> PyResult<()> {
    module.add_class::<PyNetwork>()?;
    module.add_class::<PyOutput>()?;

    module.add_function(wrap_pyfunction!(flies, py)?)?;
    module.add_function(wrap_pyfunction!(process_table, py)?)?;
    module.add_function(wrap_pyfunction!(reconcile, py)?)?;
    module.add_function(wrap_pyfunction!(parse_point, py)?)?;
    module.add_function(wrap_pyfunction!(solar_zenith_angle, py)?)?;
    module.add_function(wrap_pyfunction!(available_output_variables, py)?)?;
    module.add_function(wrap_pyfunction!(output_variable_info, py)?)?;

    module.add("FLIES_VERSION", crate::version::FULL_VERSION)?;
    Ok(())
}
