//! Serialization boundary helpers.
//!
//! Computation keeps full precision. Rounding to two decimals happens only
//! here, via `serialize_with`, and any non-finite value becomes `null`.

use serde::ser::SerializeSeq;
use serde::Serializer;

/// Round half away from zero to 2 decimal places. `-0.0` becomes `0.0`.
pub fn round2(value: f64) -> f64 {
    let r = (value * 100.0).round() / 100.0;
    if r == 0.0 {
        0.0
    } else {
        r
    }
}

pub fn ser_f64<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    if value.is_finite() {
        serializer.serialize_f64(round2(*value))
    } else {
        serializer.serialize_none()
    }
}

pub fn ser_opt_f64<S: Serializer>(value: &Option<f64>, serializer: S) -> Result<S::Ok, S::Error> {
    match value {
        Some(v) if v.is_finite() => serializer.serialize_f64(round2(*v)),
        _ => serializer.serialize_none(),
    }
}

pub fn ser_f64_seq<S: Serializer>(values: &[f64], serializer: S) -> Result<S::Ok, S::Error> {
    let mut seq = serializer.serialize_seq(Some(values.len()))?;
    for v in values {
        if v.is_finite() {
            seq.serialize_element(&round2(*v))?;
        } else {
            seq.serialize_element(&Option::<f64>::None)?;
        }
    }
    seq.end()
}
