use ndarray::{ArrayD, Zip};

use crate::{
    constants::{ATYPE_CONTINENTAL, ATYPE_DESERT, CTYPE_CLEAR, CTYPE_CUMULUS, CTYPE_STRATUS},
    error::{FLiESError, FLiESResult},
    modules::shape::{functions::reconcile, models::Covariate},
};

use super::models::KoppenGeiger;

/// Numeric climate code of a table cell or service value.
/// Integer codes are kept as they are (0 marks water or missing data), class
/// names are looked up in the legend.
pub fn climate_code(value: &str) -> FLiESResult<i32> {
    let text = value.trim();
    match text.parse::<f64>() {
        Ok(code) if code.fract() == 0.0 => Ok(code as i32),
        Ok(_) => Err(FLiESError::UnknownClimate(value.to_owned())),
        Err(_) => KoppenGeiger::parse(text).map(|class| class.code()),
    }
}

fn aerosol_type(kg: i32) -> i32 {
    match KoppenGeiger::from_code(kg) {
        Some(class) if class.is_arid() => ATYPE_DESERT,
        _ => ATYPE_CONTINENTAL,
    }
}

fn cloud_type(kg: i32, cot: f64) -> i32 {
    if cot == 0.0 {
        return CTYPE_CLEAR;
    }
    match KoppenGeiger::from_code(kg) {
        Some(class) if class.is_tropical() => CTYPE_CUMULUS,
        _ => CTYPE_STRATUS,
    }
}

/// Aerosol type for each cell of `cot`.
/// The climate classes are reconciled to the shape of `cot` first.
pub fn determine_atype(kg_climate: Covariate<i32>, cot: &ArrayD<f64>) -> FLiESResult<ArrayD<i32>> {
    let kg = reconcile(kg_climate, cot.shape())?;
    Ok(kg.mapv(aerosol_type))
}

/// Cloud type for each cell of `cot`: clear sky where there are no clouds,
/// cumulus in tropical climates, stratus elsewhere.
pub fn determine_ctype(kg_climate: Covariate<i32>, cot: &ArrayD<f64>) -> FLiESResult<ArrayD<i32>> {
    let kg = reconcile(kg_climate, cot.shape())?;
    let mut ctype = ArrayD::<i32>::zeros(cot.raw_dim());
    Zip::from(&mut ctype)
        .and(&kg)
        .and(cot)
        .par_for_each(|c, kg, cot| *c = cloud_type(*kg, *cot));
    Ok(ctype)
}
