//! Typed keys for the nested result mappings.
//!
//! Raw simulation output is addressed as step → frame → field → component.
//! Each level gets its own key type so a component name can never be used
//! where a field type is expected.

use core::cmp::Ordering;
use core::fmt;
use serde::{Deserialize, Serialize};

macro_rules! name_key {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn new(name: impl Into<String>) -> Self {
                Self(name.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl core::borrow::Borrow<str> for $name {
            fn borrow(&self) -> &str {
                &self.0
            }
        }
    };
}

name_key!(
    /// Name of an analysis step (e.g. `Step-1`).
    StepName
);
name_key!(
    /// Field output type (e.g. `stress`, `strain`).
    FieldType
);
name_key!(
    /// Component of a field output (e.g. `S11`, `U2`).
    ComponentName
);
name_key!(
    /// Logical history channel name as reported (e.g. `kinetic_energy`).
    ChannelName
);
name_key!(
    /// Raw channel identifier inside the solver output (e.g. `KE`).
    RawChannel
);

impl FieldType {
    pub const STRESS: &'static str = "stress";
    pub const STRAIN: &'static str = "strain";

    pub fn stress() -> Self {
        Self::new(Self::STRESS)
    }

    pub fn strain() -> Self {
        Self::new(Self::STRAIN)
    }
}

/// Simulated time of a frame, in seconds.
///
/// Ordered with `f64::total_cmp` so it can be used as a sorted key.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FrameTime(f64);

impl FrameTime {
    pub fn new(seconds: f64) -> Self {
        Self(seconds)
    }

    pub fn seconds(self) -> f64 {
        self.0
    }
}

impl PartialEq for FrameTime {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for FrameTime {}

impl PartialOrd for FrameTime {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for FrameTime {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl fmt::Display for FrameTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
