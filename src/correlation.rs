//! Pairwise metric correlations
//!
//! Builds a Pearson correlation matrix over all tracked metrics, reports
//! strong pairs, and groups metrics into correlation clusters.
//!
//! Cluster extraction is a single greedy pass in [`Metric::ALL`] order: each
//! unprocessed metric seeds a cluster and absorbs every other unprocessed
//! metric it is directly correlated with. Membership is therefore *not*
//! transitive. If A~B and B~C but not A~C, and A is scanned first, C is left
//! for a later cluster. The result depends on scan order, and that order is
//! fixed.

use serde::{Deserialize, Serialize};

use crate::models::{LogEntry, Metric};

/// Default |r| above which a pair is reported
pub const DEFAULT_CORRELATION_THRESHOLD: f64 = 0.6;

/// Direction of a reported correlation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CorrelationDirection {
    Positive,
    Negative,
}

/// A strong correlation between two metrics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Correlation {
    pub first: Metric,
    pub second: Metric,
    pub coefficient: f64,
    pub direction: CorrelationDirection,
    /// Number of days where both metrics were valid
    pub sample_size: usize,
    pub description: String,
}

/// Symmetric metric × metric matrix of Pearson coefficients
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CorrelationMatrix {
    pub metrics: Vec<Metric>,
    pub values: Vec<Vec<f64>>,
    /// Aligned day counts behind each coefficient
    pub sample_sizes: Vec<Vec<usize>>,
}

impl CorrelationMatrix {
    fn index_of(&self, metric: Metric) -> Option<usize> {
        self.metrics.iter().position(|&m| m == metric)
    }

    /// Coefficient for a pair, 0 when either metric is not in the matrix
    pub fn get(&self, a: Metric, b: Metric) -> f64 {
        match (self.index_of(a), self.index_of(b)) {
            (Some(i), Some(j)) => self.values[i][j],
            _ => 0.0,
        }
    }

    pub fn sample_size(&self, a: Metric, b: Metric) -> usize {
        match (self.index_of(a), self.index_of(b)) {
            (Some(i), Some(j)) => self.sample_sizes[i][j],
            _ => 0,
        }
    }
}

/// Correlation computations over a log collection
pub struct CorrelationAnalyzer {
    threshold: f64,
    min_days: usize,
}

impl CorrelationAnalyzer {
    pub fn new() -> Self {
        Self::with_settings(DEFAULT_CORRELATION_THRESHOLD, 5)
    }

    pub fn with_settings(threshold: f64, min_days: usize) -> Self {
        Self {
            threshold,
            min_days: min_days.max(2),
        }
    }

    /// Pearson correlation of two equal-length sequences.
    ///
    /// `r = (nΣxy − ΣxΣy) / sqrt((nΣx² − (Σx)²)(nΣy² − (Σy)²))`, or 0 when
    /// the lengths differ or either side has no variance.
    pub fn pearson(xs: &[f64], ys: &[f64]) -> f64 {
        let n = xs.len();
        if n == 0 || n != ys.len() {
            return 0.0;
        }

        let n_f = n as f64;
        let sum_x: f64 = xs.iter().sum();
        let sum_y: f64 = ys.iter().sum();
        let sum_xy: f64 = xs.iter().zip(ys).map(|(x, y)| x * y).sum();
        let sum_xx: f64 = xs.iter().map(|x| x * x).sum();
        let sum_yy: f64 = ys.iter().map(|y| y * y).sum();

        let numerator = n_f * sum_xy - sum_x * sum_y;
        let variance_x = n_f * sum_xx - sum_x * sum_x;
        let variance_y = n_f * sum_yy - sum_y * sum_y;
        // Relative cutoff: constant inputs leave only rounding noise here
        if variance_x <= 1e-10 * n_f * sum_xx || variance_y <= 1e-10 * n_f * sum_yy {
            return 0.0;
        }
        let denominator = (variance_x * variance_y).sqrt();
        if !denominator.is_finite() || denominator == 0.0 {
            return 0.0;
        }
        (numerator / denominator).clamp(-1.0, 1.0)
    }

    /// Values of two metrics on the days where both are valid
    pub fn aligned_values(logs: &[LogEntry], a: Metric, b: Metric) -> (Vec<f64>, Vec<f64>) {
        logs.iter()
            .filter_map(|entry| Some((entry.value(a)?, entry.value(b)?)))
            .unzip()
    }

    /// Full matrix over [`Metric::ALL`]; the diagonal is 1
    pub fn matrix(&self, logs: &[LogEntry]) -> CorrelationMatrix {
        let metrics = Metric::ALL.to_vec();
        let size = metrics.len();
        let mut values = vec![vec![0.0; size]; size];
        let mut sample_sizes = vec![vec![0; size]; size];

        for i in 0..size {
            values[i][i] = 1.0;
            sample_sizes[i][i] = logs.iter().filter(|e| e.value(metrics[i]).is_some()).count();
            for j in (i + 1)..size {
                let (xs, ys) = Self::aligned_values(logs, metrics[i], metrics[j]);
                let r = if xs.len() >= self.min_days {
                    Self::pearson(&xs, &ys)
                } else {
                    0.0
                };
                values[i][j] = r;
                values[j][i] = r;
                sample_sizes[i][j] = xs.len();
                sample_sizes[j][i] = xs.len();
            }
        }

        CorrelationMatrix {
            metrics,
            values,
            sample_sizes,
        }
    }

    /// Off-diagonal pairs whose |r| exceeds the threshold, strongest first
    pub fn significant_correlations(&self, matrix: &CorrelationMatrix) -> Vec<Correlation> {
        let mut correlations = Vec::new();
        let size = matrix.metrics.len();

        for i in 0..size {
            for j in (i + 1)..size {
                let r = matrix.values[i][j];
                if r.abs() <= self.threshold {
                    continue;
                }
                let (first, second) = (matrix.metrics[i], matrix.metrics[j]);
                let direction = if r > 0.0 {
                    CorrelationDirection::Positive
                } else {
                    CorrelationDirection::Negative
                };
                let verb = match direction {
                    CorrelationDirection::Positive => "increases with",
                    CorrelationDirection::Negative => "decreases with",
                };

                correlations.push(Correlation {
                    first,
                    second,
                    coefficient: r,
                    direction,
                    sample_size: matrix.sample_sizes[i][j],
                    description: format!(
                        "{} {} {} (r = {:.2})",
                        first.label(),
                        verb,
                        second.label(),
                        r
                    ),
                });
            }
        }

        correlations.sort_by(|a, b| {
            b.coefficient
                .abs()
                .partial_cmp(&a.coefficient.abs())
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        correlations
    }

    /// Greedy single-pass grouping; see the module docs for its ordering
    /// contract. Singleton groups are not reported.
    pub fn clusters(&self, matrix: &CorrelationMatrix) -> Vec<Vec<Metric>> {
        let size = matrix.metrics.len();
        let mut processed = vec![false; size];
        let mut clusters = Vec::new();

        for i in 0..size {
            if processed[i] {
                continue;
            }
            processed[i] = true;
            let mut cluster = vec![matrix.metrics[i]];

            for j in 0..size {
                if !processed[j] && matrix.values[i][j].abs() > self.threshold {
                    processed[j] = true;
                    cluster.push(matrix.metrics[j]);
                }
            }

            if cluster.len() > 1 {
                clusters.push(cluster);
            }
        }

        clusters
    }
}

impl Default for CorrelationAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}
