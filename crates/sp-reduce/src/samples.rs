//! Reduction of a raw sample set to {max, min, mean}.

use serde::{Deserialize, Serialize};
use sp_project::EmptySamplePolicy;

/// Statistics of one component's samples over all nodes/elements of a frame.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct FieldSample {
    pub max: f64,
    pub min: f64,
    pub mean: f64,
}

/// Reduce `values` to max, min and arithmetic mean.
///
/// An empty slice reduces to all zeros. Use [`reduce_samples_with`] to
/// drop empty sets instead.
pub fn reduce_samples(values: &[f64]) -> FieldSample {
    if values.is_empty() {
        return FieldSample::default();
    }

    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let mean = values.iter().sum::<f64>() / values.len() as f64;

    FieldSample { max, min, mean }
}

/// Reduce `values`, returning `None` for an empty set under [`EmptySamplePolicy::Skip`].
pub fn reduce_samples_with(values: &[f64], policy: EmptySamplePolicy) -> Option<FieldSample> {
    match (values.is_empty(), policy) {
        (true, EmptySamplePolicy::Skip) => None,
        _ => Some(reduce_samples(values)),
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn mean_lies_between_min_and_max(values in prop::collection::vec(-1.0e6_f64..1.0e6_f64, 1..64)) {
            let s = reduce_samples(&values);
            let tol = 1e-9 * s.max.abs().max(s.min.abs()).max(1.0);
            prop_assert!(s.min <= s.max);
            prop_assert!(s.mean >= s.min - tol);
            prop_assert!(s.mean <= s.max + tol);
            prop_assert!(values.contains(&s.max));
            prop_assert!(values.contains(&s.min));
        }
    }
}
