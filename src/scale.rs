//! Bucket boundaries and colors for the joined values.
//!
//! Three strategies place the boundaries: equal ranges ([`ClusteringMode::Equidistant`]),
//! equal counts ([`ClusteringMode::Quantile`]) and 1-D k-means ([`ClusteringMode::Kmeans`]).
//! Whatever the strategy, a scale with `steps` buckets always has `steps + 1` limits and
//! `steps` colors. Bucket `i` covers `[limits[i], limits[i + 1])`; the last bucket is closed.
//! Where limits repeat, a value on the repeated limit goes to the lowest bucket it can.

use crate::join::JoinedDataset;
use crate::models::Feature;
use crate::options::ClusteringMode;
use crate::palette::{Color, ramp};
use serde::Serialize;

/// Iteration cap for k-means.
pub const KMEANS_MAX_ITERATIONS: usize = 100;

/// One legend row: a bucket's color and range.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LegendEntry {
    pub color: Color,
    pub from: f64,
    pub to: f64,
    /// Whether `to` belongs to the bucket (only for the last bucket).
    pub closed: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Scale {
    pub limits: Vec<f64>,
    pub colors: Vec<Color>,
    pub legend: Vec<LegendEntry>,
    /// Number of values the boundaries were computed from.
    pub samples: usize,
}

/// Parameters for [`build_scale`].
#[derive(Debug, Clone, Copy)]
pub struct ScaleSpec {
    pub mode: ClusteringMode,
    pub steps: usize,
    pub min_color: Color,
    pub max_color: Color,
}

impl Scale {
    pub fn steps(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples == 0
    }

    /// Index of the bucket containing `value`.
    ///
    /// Values below the first limit land in the first bucket and values above the last
    /// limit in the last one. A value equal to a limit that occurs more than once belongs
    /// to the lowest bucket whose upper limit is >= it.
    pub fn bucket_of(&self, value: f64) -> usize {
        let steps = self.steps();
        if steps <= 1 {
            return 0;
        }
        let interior = &self.limits[1..steps];
        let repeated = self.limits.iter().filter(|l| **l == value).count() > 1;
        if repeated {
            interior.partition_point(|l| *l < value)
        } else {
            interior.partition_point(|l| *l <= value)
        }
    }
}

/// Values of the features present on the map that have joined data, in feature order.
pub fn eligible_values(features: &[Feature], data: &JoinedDataset, code_type: &str) -> Vec<f64> {
    features
        .iter()
        .filter_map(|f| data.value_for_feature(f, code_type))
        .filter(|v| v.is_finite())
        .collect()
}

/// Build the scale for the features on the map.
pub fn create_scale(
    features: &[Feature],
    data: &JoinedDataset,
    code_type: &str,
    spec: ScaleSpec,
) -> Scale {
    build_scale(&eligible_values(features, data, code_type), spec)
}

/// Build a scale from raw values. Never fails: no values yields an empty scale whose
/// limits are all zero.
pub fn build_scale(values: &[f64], spec: ScaleSpec) -> Scale {
    let steps = spec.steps.max(1);
    let mut sorted: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    sorted.sort_by(f64::total_cmp);

    let limits = if sorted.is_empty() {
        vec![0.0; steps + 1]
    } else {
        match spec.mode {
            ClusteringMode::Equidistant => equidistant_limits(&sorted, steps),
            ClusteringMode::Quantile => quantile_limits(&sorted, steps),
            ClusteringMode::Kmeans => kmeans_limits(&sorted, steps),
        }
    };

    let colors = ramp(spec.min_color, spec.max_color, steps);
    let legend = colors
        .iter()
        .enumerate()
        .map(|(i, color)| LegendEntry {
            color: *color,
            from: limits[i],
            to: limits[i + 1],
            closed: i + 1 == steps,
        })
        .collect();

    log::debug!(
        "{:?} scale over {} values: limits={:?}",
        spec.mode,
        sorted.len(),
        limits
    );

    Scale {
        limits,
        colors,
        legend,
        samples: sorted.len(),
    }
}

/// `min + i * (max - min) / steps` for `i = 0..=steps`.
pub fn equidistant_limits(sorted: &[f64], steps: usize) -> Vec<f64> {
    let (min, max) = (sorted[0], sorted[sorted.len() - 1]);
    let width = (max - min) / steps as f64;
    let mut limits: Vec<f64> = (0..=steps).map(|i| min + i as f64 * width).collect();
    // Pin the top exactly; accumulated rounding must not drop the max out of range.
    limits[steps] = max;
    limits
}

/// The `i / steps` quantiles of the sorted values, interpolating between closest ranks.
pub fn quantile_limits(sorted: &[f64], steps: usize) -> Vec<f64> {
    let n = sorted.len();
    let mut limits = Vec::with_capacity(steps + 1);
    limits.push(sorted[0]);
    for i in 1..steps {
        let p = (n - 1) as f64 * i as f64 / steps as f64;
        let lo = p.floor() as usize;
        let frac = p - lo as f64;
        let q = if frac == 0.0 || lo + 1 >= n || sorted[lo] == sorted[lo + 1] {
            sorted[lo]
        } else {
            sorted[lo] * (1.0 - frac) + sorted[lo + 1] * frac
        };
        limits.push(q);
    }
    limits.push(sorted[n - 1]);
    limits
}

/// 1-D k-means with `steps` clusters; boundaries sit halfway between adjacent centers.
pub fn kmeans_limits(sorted: &[f64], steps: usize) -> Vec<f64> {
    let (min, max) = (sorted[0], sorted[sorted.len() - 1]);
    let centers = kmeans_centers(sorted, steps);

    let mut limits = Vec::with_capacity(steps + 1);
    limits.push(min);
    for pair in centers.windows(2) {
        limits.push(((pair[0] + pair[1]) / 2.0).clamp(min, max));
    }
    limits.push(max);
    limits
}

/// Final, sorted cluster centers.
pub fn kmeans_centers(sorted: &[f64], k: usize) -> Vec<f64> {
    let (min, max) = (sorted[0], sorted[sorted.len() - 1]);
    let span = max - min;
    let mut centers: Vec<f64> = (0..k)
        .map(|j| min + span * (2 * j + 1) as f64 / (2 * k) as f64)
        .collect();
    let mut assignment: Vec<usize> = vec![usize::MAX; sorted.len()];

    for iteration in 0..KMEANS_MAX_ITERATIONS {
        let mut changed = false;
        for (slot, v) in assignment.iter_mut().zip(sorted) {
            let nearest = nearest_center(&centers, *v);
            if *slot != nearest {
                *slot = nearest;
                changed = true;
            }
        }
        if !changed {
            log::trace!("k-means converged after {iteration} iterations");
            break;
        }

        let mut sums = vec![0.0; k];
        let mut counts = vec![0usize; k];
        for (c, v) in assignment.iter().zip(sorted) {
            sums[*c] += v;
            counts[*c] += 1;
        }
        for j in 0..k {
            if counts[j] > 0 {
                centers[j] = sums[j] / counts[j] as f64;
            }
        }
    }

    centers.sort_by(f64::total_cmp);
    centers
}

/// Index of the closest center; ties go to the lower index.
fn nearest_center(centers: &[f64], v: f64) -> usize {
    let mut best = 0;
    let mut best_d = f64::INFINITY;
    for (j, c) in centers.iter().enumerate() {
        let d = (v - c).abs();
        if d < best_d {
            best = j;
            best_d = d;
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nearest_center_breaks_ties_low() {
        assert_eq!(nearest_center(&[0.0, 2.0], 1.0), 0);
        assert_eq!(nearest_center(&[0.0, 2.0], 1.5), 1);
    }

    #[test]
    fn kmeans_separates_obvious_groups() {
        let sorted = [1.0, 1.1, 1.2, 10.0, 10.1, 10.2];
        let centers = kmeans_centers(&sorted, 2);
        assert!((centers[0] - 1.1).abs() < 1e-9);
        assert!((centers[1] - 10.1).abs() < 1e-9);
    }
}
