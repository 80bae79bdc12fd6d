//! Guards and tolerant comparison for measured scalars.

use crate::CoreError;

/// Absolute and relative tolerance for comparing two measured values.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Tolerances {
    pub abs: f64,
    pub rel: f64,
}

impl Tolerances {
    /// Impact velocities read from study files or converted from other units
    pub const VELOCITY: Tolerances = Tolerances {
        abs: 1e-9,
        rel: 1e-9,
    };
}

impl Default for Tolerances {
    fn default() -> Self {
        Self {
            abs: 1e-12,
            rel: 1e-9,
        }
    }
}

/// True when `a` and `b` agree within either the absolute or the relative tolerance.
pub fn nearly_equal(a: f64, b: f64, tol: Tolerances) -> bool {
    let diff = (a - b).abs();
    diff <= tol.abs || diff <= tol.rel * a.abs().max(b.abs())
}

pub fn ensure_finite(v: f64, what: &'static str) -> Result<f64, CoreError> {
    if v.is_finite() {
        Ok(v)
    } else {
        Err(CoreError::NonFinite { what, value: v })
    }
}

pub fn ensure_positive(v: f64, what: &'static str) -> Result<f64, CoreError> {
    match ensure_finite(v, what)? {
        v if v > 0.0 => Ok(v),
        v => Err(CoreError::NonPositive { what, value: v }),
    }
}
