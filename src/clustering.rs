//! General k-means clustering of day profiles
//!
//! Centroids start from randomly chosen samples, so results depend on the
//! random source. `fit_seeded` gives reproducible output; the
//! threshold-based day clustering in `patterns` is the deterministic path.

use chrono::NaiveDate;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

use crate::models::{LogEntry, Metric};
use crate::patterns::{euclidean, PatternDetector, PROFILE_METRICS};

pub const DEFAULT_MAX_ITERATIONS: usize = 100;
pub const DEFAULT_TOLERANCE: f64 = 0.001;

/// Settings for the optional k-means day-profile pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayProfileConfig {
    pub k: usize,
    pub seed: u64,
}

impl Default for DayProfileConfig {
    fn default() -> Self {
        Self { k: 3, seed: 42 }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct KMeansResult {
    pub centroids: Vec<Vec<f64>>,
    /// Cluster index for each input sample
    pub assignments: Vec<usize>,
    pub iterations: usize,
    pub converged: bool,
}

impl KMeansResult {
    pub fn cluster_sizes(&self) -> Vec<usize> {
        let mut sizes = vec![0; self.centroids.len()];
        for &c in &self.assignments {
            sizes[c] += 1;
        }
        sizes
    }
}

/// K-means over dense feature vectors
#[derive(Debug, Clone)]
pub struct KMeans {
    k: usize,
    max_iterations: usize,
    /// Largest centroid movement still treated as converged
    tolerance: f64,
}

impl KMeans {
    pub fn new(k: usize) -> Self {
        Self {
            k,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            tolerance: DEFAULT_TOLERANCE,
        }
    }

    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Cluster `data` with a deterministic random source
    pub fn fit_seeded(&self, data: &[Vec<f64>], seed: u64) -> Option<KMeansResult> {
        let mut rng = StdRng::seed_from_u64(seed);
        self.fit(data, &mut rng)
    }

    /// Cluster `data` into at most `k` groups.
    ///
    /// Returns `None` for empty input, `k == 0`, or rows of unequal width.
    /// `k` is reduced to the sample count when fewer samples exist.
    pub fn fit<R: Rng + ?Sized>(&self, data: &[Vec<f64>], rng: &mut R) -> Option<KMeansResult> {
        let width = data.first()?.len();
        if self.k == 0 || data.iter().any(|row| row.len() != width) {
            return None;
        }
        let k = self.k.min(data.len());

        let mut centroids: Vec<Vec<f64>> = rand::seq::index::sample(rng, data.len(), k)
            .into_iter()
            .map(|i| data[i].clone())
            .collect();
        let mut assignments = vec![0; data.len()];
        let mut iterations = 0;
        let mut converged = false;

        while iterations < self.max_iterations {
            iterations += 1;

            for (slot, sample) in assignments.iter_mut().zip(data) {
                *slot = nearest(&centroids, sample);
            }

            let mut sums = vec![vec![0.0; width]; k];
            let mut counts = vec![0usize; k];
            for (sample, &c) in data.iter().zip(&assignments) {
                counts[c] += 1;
                for (sum, value) in sums[c].iter_mut().zip(sample) {
                    *sum += value;
                }
            }

            let mut movement: f64 = 0.0;
            for c in 0..k {
                // An empty cluster keeps its previous centroid
                if counts[c] == 0 {
                    continue;
                }
                let updated: Vec<f64> = sums[c].iter().map(|s| s / counts[c] as f64).collect();
                movement = movement.max(euclidean(&centroids[c], &updated));
                centroids[c] = updated;
            }

            if movement < self.tolerance {
                converged = true;
                break;
            }
        }

        for (slot, sample) in assignments.iter_mut().zip(data) {
            *slot = nearest(&centroids, sample);
        }

        debug!(k, iterations, converged, "k-means finished");
        Some(KMeansResult {
            centroids,
            assignments,
            iterations,
            converged,
        })
    }
}

fn nearest(centroids: &[Vec<f64>], sample: &[f64]) -> usize {
    centroids
        .iter()
        .enumerate()
        .min_by(|(_, a), (_, b)| {
            euclidean(sample, a)
                .partial_cmp(&euclidean(sample, b))
                .unwrap_or(std::cmp::Ordering::Equal)
        })
        .map(|(i, _)| i)
        .unwrap_or(0)
}

/// One k-means group of days, centroid expressed in metric units
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DayProfile {
    pub centroid: BTreeMap<Metric, f64>,
    pub dates: Vec<NaiveDate>,
}

/// Group days by their profile metrics with seeded k-means
pub fn day_profiles(logs: &[LogEntry], config: DayProfileConfig) -> Vec<DayProfile> {
    let profiles = PatternDetector::normalized_profiles(logs);
    let vectors: Vec<Vec<f64>> = profiles.iter().map(|(_, v)| v.clone()).collect();
    let Some(result) = KMeans::new(config.k).fit_seeded(&vectors, config.seed) else {
        return Vec::new();
    };

    let mut groups: Vec<DayProfile> = result
        .centroids
        .iter()
        .map(|centroid| DayProfile {
            centroid: PROFILE_METRICS
                .iter()
                .zip(centroid)
                .map(|(&metric, &v)| {
                    let domain = metric.domain();
                    (metric, domain.snap(v * domain.span() + domain.min))
                })
                .collect(),
            dates: Vec::new(),
        })
        .collect();

    for ((date, _), &c) in profiles.iter().zip(&result.assignments) {
        groups[c].dates.push(*date);
    }
    groups.retain(|g| !g.dates.is_empty());
    groups
}
