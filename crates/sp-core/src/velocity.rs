//! Impact velocity, the independent variable of a sweep.

use core::cmp::Ordering;
use core::fmt;
use serde::{Deserialize, Serialize};

use crate::units::{Speed, VelocityUnit, mps};
use crate::{CoreError, CoreResult, Tolerances, ensure_positive, nearly_equal};

/// Positive, finite impact velocity in metres per second.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct Velocity(f64);

impl Velocity {
    pub fn new(mps: f64) -> CoreResult<Self> {
        ensure_positive(mps, "velocity").map(Self)
    }

    /// Build from a value expressed in `unit`.
    pub fn from_unit(value: f64, unit: VelocityUnit) -> CoreResult<Self> {
        Self::new(unit.to_mps(ensure_positive(value, "velocity")?))
    }

    pub fn mps(self) -> f64 {
        self.0
    }

    pub fn quantity(self) -> Speed {
        mps(self.0)
    }

    /// Equality up to unit-conversion noise.
    pub fn approx_eq(self, other: Velocity) -> bool {
        nearly_equal(self.0, other.0, Tolerances::VELOCITY)
    }

    /// Directory name for this velocity's artifacts: `velocity_<v>`.
    pub fn dir_name(self) -> String {
        format!("velocity_{self}")
    }

    /// Solver job name: `SpallJob_v<v>` with the velocity truncated to an integer.
    pub fn job_name(self) -> String {
        format!("SpallJob_v{}", self.0.trunc() as u64)
    }
}

impl TryFrom<f64> for Velocity {
    type Error = CoreError;

    fn try_from(v: f64) -> Result<Self, Self::Error> {
        Self::new(v)
    }
}

impl From<Velocity> for f64 {
    fn from(v: Velocity) -> Self {
        v.0
    }
}

impl PartialEq for Velocity {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Velocity {}

impl PartialOrd for Velocity {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Velocity {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

/// Whole velocities print without a fractional part (`250`), others as-is (`250.5`).
impl fmt::Display for Velocity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.fract() == 0.0 && self.0 < 1e15 {
            write!(f, "{:.0}", self.0)
        } else {
            write!(f, "{}", self.0)
        }
    }
}
