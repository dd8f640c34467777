use chrono::Utc;
use itertools::izip;
use log::{debug, info, trace};
use ndarray::{ArrayD, IxDyn};
use ndarray_stats::QuantileExt;

use crate::{
    error::{FLiESError, FLiESResult},
    models::output::{Output, OutputElement},
    modules::{
        climate::functions::{determine_atype, determine_ctype},
        network::{
            models::{Features, Prediction},
            prelude::RadiativeTransfer,
        },
        shape::functions::{common_shape, reconcile},
        solar::functions::toa_irradiance,
    },
};

fn log_range(name: &str, values: &ArrayD<f64>) {
    debug!(
        "{}: min {:.4}, max {:.4}",
        name,
        values.min_skipnan(),
        values.max_skipnan()
    );
}

/// Split the surface irradiance into its spectral and direct/diffuse parts
pub fn partition(
    toa: f64,                           // top of atmosphere irradiance [W/m2]
    tm: f64,                            // atmospheric transmittance [-]
    proportions: (f64, f64, f64),       // UV, visible, near-infrared proportions [-]
    diffuse_fractions: (f64, f64, f64), // UV, visible, near-infrared diffuse fractions [-]
) -> OutputElement {
    let (puv, pvis, pnir) = proportions;
    let (fduv, fdvis, fdnir) = diffuse_fractions;

    let swin = toa * tm;
    let uv = swin * puv;
    let par = swin * pvis;
    let nir = swin * pnir;
    let par_diffuse = par * fdvis;
    let nir_diffuse = nir * fdnir;

    OutputElement {
        SWin: swin,
        SWin_TOA: toa,
        UV: uv,
        PAR: par,
        NIR: nir,
        PAR_diffuse: par_diffuse,
        NIR_diffuse: nir_diffuse,
        PAR_direct: par - par_diffuse,
        NIR_direct: nir - nir_diffuse,

        transmittance: tm,
        UV_proportion: puv,
        PAR_proportion: pvis,
        NIR_proportion: pnir,
        UV_diffuse_fraction: fduv,
        PAR_diffuse_fraction: fdvis,
        NIR_diffuse_fraction: fdnir,
    }
}

fn radiation(
    shape: &[usize],
    doy: &ArrayD<f64>,
    sza: &ArrayD<f64>,
    prediction: &Prediction,
) -> FLiESResult<ArrayD<OutputElement>> {
    let elements: Vec<OutputElement> = izip!(
        doy.iter(),
        sza.iter(),
        prediction.tm.iter(),
        prediction.puv.iter(),
        prediction.pvis.iter(),
        prediction.pnir.iter(),
        prediction.fduv.iter(),
        prediction.fdvis.iter(),
        prediction.fdnir.iter()
    )
    .map(|(doy, sza, tm, puv, pvis, pnir, fduv, fdvis, fdnir)| {
        partition(
            toa_irradiance(*doy, *sza),
            *tm,
            (*puv, *pvis, *pnir),
            (*fduv, *fdvis, *fdnir),
        )
    })
    .collect();

    let n_elements = elements.len();
    ArrayD::from_shape_vec(IxDyn(shape), elements).map_err(|_| FLiESError::ShapeMismatch {
        value_shape: vec![n_elements],
        target_shape: shape.to_vec(),
    })
}

/// Run FLiES-ANN on a set of covariates.
///
/// Every covariate is reconciled to the shape of the largest one before the
/// backend is invoked; the result holds one element per reconciled cell.
pub fn process_flies(
    inputs: super::models::ModelInputs,
    model: &dyn RadiativeTransfer,
) -> FLiESResult<Output> {
    let start = Utc::now();
    let shape = common_shape(&inputs.shapes());
    info!("Started FLiES-ANN processing, shape {:?}", shape);

    let doy = reconcile(inputs.doy, &shape)?;
    let cot = reconcile(inputs.COT, &shape)?;
    let atype = determine_atype(inputs.KG_climate.clone(), &cot)?;
    let ctype = determine_ctype(inputs.KG_climate, &cot)?;

    let features = Features {
        ctype: ctype.mapv(f64::from),
        atype: atype.mapv(f64::from),
        AOT: reconcile(inputs.AOT, &shape)?,
        vapor_gccm: reconcile(inputs.vapor_gccm, &shape)?,
        ozone_cm: reconcile(inputs.ozone_cm, &shape)?,
        albedo: reconcile(inputs.albedo, &shape)?,
        elevation_km: reconcile(inputs.elevation_km, &shape)?,
        SZA: reconcile(inputs.SZA, &shape)?,
        COT: cot,
    };

    if !features.is_empty() {
        log_range("COT", &features.COT);
        log_range("AOT", &features.AOT);
        log_range("vapor_gccm", &features.vapor_gccm);
        log_range("ozone_cm", &features.ozone_cm);
        log_range("albedo", &features.albedo);
        log_range("elevation_km", &features.elevation_km);
        log_range("SZA", &features.SZA);
    }

    let c = Utc::now();
    let prediction = model.predict(&features)?;
    trace!("Inference took {} seconds", Utc::now() - c);

    let data = radiation(&shape, &doy, &features.SZA, &prediction)?;
    info!(
        "Completed FLiES-ANN processing of {} cells in {} seconds",
        data.len(),
        Utc::now() - start
    );
    Ok(Output::new(data))
}
