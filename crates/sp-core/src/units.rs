//! Velocity units accepted in study files.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::CoreError;

/// SI speed quantity.
pub type Speed = uom::si::f64::Velocity;

#[inline]
pub fn mps(v: f64) -> Speed {
    use uom::si::velocity::meter_per_second;
    Speed::new::<meter_per_second>(v)
}

/// Unit in which a study file lists its velocities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum VelocityUnit {
    #[default]
    #[serde(rename = "m/s")]
    MetersPerSecond,
    #[serde(rename = "km/s")]
    KilometersPerSecond,
    #[serde(rename = "ft/s")]
    FeetPerSecond,
}

impl VelocityUnit {
    pub fn quantity(self, value: f64) -> Speed {
        use uom::si::velocity::{foot_per_second, kilometer_per_second, meter_per_second};
        match self {
            Self::MetersPerSecond => Speed::new::<meter_per_second>(value),
            Self::KilometersPerSecond => Speed::new::<kilometer_per_second>(value),
            Self::FeetPerSecond => Speed::new::<foot_per_second>(value),
        }
    }

    /// Convert a value in this unit to metres per second.
    pub fn to_mps(self, value: f64) -> f64 {
        use uom::si::velocity::meter_per_second;
        self.quantity(value).get::<meter_per_second>()
    }
}

impl fmt::Display for VelocityUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MetersPerSecond => write!(f, "m/s"),
            Self::KilometersPerSecond => write!(f, "km/s"),
            Self::FeetPerSecond => write!(f, "ft/s"),
        }
    }
}

impl FromStr for VelocityUnit {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "m/s" | "mps" => Ok(Self::MetersPerSecond),
            "km/s" | "kmps" => Ok(Self::KilometersPerSecond),
            "ft/s" | "fps" => Ok(Self::FeetPerSecond),
            other => Err(CoreError::UnknownUnit {
                unit: other.to_string(),
            }),
        }
    }
}
