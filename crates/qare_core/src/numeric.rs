//! Numeric domain guards
//!
//! Gantree: L0_Foundation → NumericGuards
//!
//! Floating accumulation can push an arcsine argument slightly past ±1.
//! Finite values are clamped and logged; non-finite values are errors.

use crate::error::{QareError, QareResult};
use crate::types::Probability;
use log::warn;

/// Tolerance below which clamping is silent
pub const CLAMP_TOLERANCE: f64 = 1e-9;

/// Clamp a finite value into [-1, 1]
/// Gantree: clamp_unit(x, ctx) -> Result<f64> // [-1,1] 클램프
pub fn clamp_unit(value: f64, context: &str) -> QareResult<f64> {
    if !value.is_finite() {
        return Err(QareError::NumericDomain {
            value,
            context: context.to_string(),
        });
    }
    if value.abs() > 1.0 + CLAMP_TOLERANCE {
        warn!("{}: argument {} outside [-1, 1], clamping", context, value);
    }
    Ok(value.clamp(-1.0, 1.0))
}

/// Arcsine with domain clamping
pub fn safe_asin(value: f64, context: &str) -> QareResult<f64> {
    Ok(clamp_unit(value, context)?.asin())
}

/// atan2 that rejects non-finite inputs
pub fn safe_atan2(y: f64, x: f64, context: &str) -> QareResult<f64> {
    for v in [y, x] {
        if !v.is_finite() {
            return Err(QareError::NumericDomain {
                value: v,
                context: context.to_string(),
            });
        }
    }
    Ok(y.atan2(x))
}

/// Clip into [0, 1]; NaN becomes 0
#[inline]
pub fn clip_probability(value: f64) -> f64 {
    Probability::clipped(value).value()
}
