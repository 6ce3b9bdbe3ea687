//! Anomaly detection over the display window
//!
//! Two families of checks:
//! - proportion thresholds (how often flares or severe symptom days occur)
//! - statistical outliers per metric, using both Z-scores and Tukey fences
//!   on index-based quartiles

use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;
use std::fmt;
use tracing::debug;

use crate::models::{LogEntry, Metric, MetricPolarity};

/// Anomaly detection thresholds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnomalyConfig {
    /// Flare-day share above which frequency is reported as high
    pub flare_high_ratio: f64,
    /// Flare-day share above which frequency is reported as elevated
    pub flare_moderate_ratio: f64,
    /// Share of severe days per metric that triggers a report
    pub severe_day_ratio: f64,
    /// A higher-is-worse slider at or above this is a severe day
    pub severe_high_value: f64,
    /// A higher-is-better slider at or below this is a severe day
    pub severe_low_value: f64,
    /// Minimum positive values before outlier statistics are computed
    pub outlier_min_points: usize,
    pub z_threshold: f64,
    pub iqr_multiplier: f64,
    /// Outlier count (max of Z and IQR counts) needed to report a metric
    pub min_outlier_flags: usize,
}

impl Default for AnomalyConfig {
    fn default() -> Self {
        Self {
            flare_high_ratio: 0.4,
            flare_moderate_ratio: 0.2,
            severe_day_ratio: 0.3,
            severe_high_value: 7.0,
            severe_low_value: 3.0,
            outlier_min_points: 10,
            z_threshold: 2.0,
            iqr_multiplier: 1.5,
            min_outlier_flags: 2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AnomalyKind {
    FlareFrequency,
    SevereSymptoms,
    StatisticalOutlier,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Moderate,
    High,
}

/// A categorical finding about the display window
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Anomaly {
    pub kind: AnomalyKind,
    pub metric: Option<Metric>,
    pub severity: Severity,
    pub message: String,
}

impl fmt::Display for Anomaly {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

/// Outlier statistics for one metric
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OutlierStats {
    pub mean: f64,
    pub std_dev: f64,
    pub q1: f64,
    pub q3: f64,
    pub z_count: usize,
    pub iqr_count: usize,
}

pub struct AnomalyDetector {
    config: AnomalyConfig,
}

impl AnomalyDetector {
    pub fn new() -> Self {
        Self::with_config(AnomalyConfig::default())
    }

    pub fn with_config(config: AnomalyConfig) -> Self {
        Self { config }
    }

    /// Run every check over the display window
    pub fn detect(&self, logs: &[LogEntry]) -> Vec<Anomaly> {
        let mut anomalies = self.threshold_anomalies(logs);
        anomalies.extend(self.statistical_outliers(logs));
        debug!(count = anomalies.len(), "anomaly detection complete");
        anomalies
    }

    /// Flare frequency and severe-day proportions
    pub fn threshold_anomalies(&self, logs: &[LogEntry]) -> Vec<Anomaly> {
        let mut anomalies = Vec::new();
        if logs.is_empty() {
            return anomalies;
        }

        let flare_days = logs.iter().filter(|e| e.flare).count();
        let flare_ratio = flare_days as f64 / logs.len() as f64;
        if flare_ratio > self.config.flare_high_ratio {
            anomalies.push(Anomaly {
                kind: AnomalyKind::FlareFrequency,
                metric: None,
                severity: Severity::High,
                message: format!(
                    "High flare-up frequency: {} of {} days ({:.0}%)",
                    flare_days,
                    logs.len(),
                    flare_ratio * 100.0
                ),
            });
        } else if flare_ratio > self.config.flare_moderate_ratio {
            anomalies.push(Anomaly {
                kind: AnomalyKind::FlareFrequency,
                metric: None,
                severity: Severity::Moderate,
                message: format!(
                    "Elevated flare-up frequency: {} of {} days ({:.0}%)",
                    flare_days,
                    logs.len(),
                    flare_ratio * 100.0
                ),
            });
        }

        for metric in Metric::SLIDERS {
            let values: Vec<f64> = logs.iter().filter_map(|e| e.value(metric)).collect();
            if values.is_empty() {
                continue;
            }

            let (severe, phrase) = match metric.polarity() {
                MetricPolarity::HigherIsWorse => (
                    values.iter().filter(|&&v| v >= self.config.severe_high_value).count(),
                    "severe",
                ),
                MetricPolarity::HigherIsBetter => (
                    values.iter().filter(|&&v| v <= self.config.severe_low_value).count(),
                    "very poor",
                ),
                MetricPolarity::Neutral => continue,
            };

            let ratio = severe as f64 / values.len() as f64;
            if ratio > self.config.severe_day_ratio {
                anomalies.push(Anomaly {
                    kind: AnomalyKind::SevereSymptoms,
                    metric: Some(metric),
                    severity: if ratio > 0.5 {
                        Severity::High
                    } else {
                        Severity::Moderate
                    },
                    message: format!(
                        "{} was {} on {:.0}% of logged days",
                        metric.label(),
                        phrase,
                        ratio * 100.0
                    ),
                });
            }
        }

        anomalies
    }

    /// Outlier statistics over the positive values of `metric`, or `None`
    /// below the minimum point count
    pub fn outlier_stats(&self, logs: &[LogEntry], metric: Metric) -> Option<OutlierStats> {
        let values: Vec<f64> = logs
            .iter()
            .filter_map(|e| e.value(metric))
            .filter(|&v| v > 0.0)
            .collect();
        if values.len() < self.config.outlier_min_points {
            return None;
        }

        let mean = values.iter().mean();
        let std_dev = values.iter().population_std_dev();
        let z_count = if std_dev > 0.0 {
            values
                .iter()
                .filter(|&&v| ((v - mean) / std_dev).abs() > self.config.z_threshold)
                .count()
        } else {
            0
        };

        let mut sorted = values.clone();
        sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
        let n = sorted.len();
        let q1 = sorted[n / 4];
        let q3 = sorted[(3 * n) / 4];
        let iqr = q3 - q1;
        let lower = q1 - self.config.iqr_multiplier * iqr;
        let upper = q3 + self.config.iqr_multiplier * iqr;
        let iqr_count = values.iter().filter(|&&v| v < lower || v > upper).count();

        Some(OutlierStats {
            mean,
            std_dev,
            q1,
            q3,
            z_count,
            iqr_count,
        })
    }

    /// Metrics with at least `min_outlier_flags` outliers by either method
    pub fn statistical_outliers(&self, logs: &[LogEntry]) -> Vec<Anomaly> {
        Metric::ALL
            .iter()
            .filter_map(|&metric| {
                let stats = self.outlier_stats(logs, metric)?;
                let flagged = stats.z_count.max(stats.iqr_count);
                if flagged < self.config.min_outlier_flags {
                    return None;
                }

                Some(Anomaly {
                    kind: AnomalyKind::StatisticalOutlier,
                    metric: Some(metric),
                    severity: Severity::Low,
                    message: format!(
                        "{} had {} unusual readings (average {:.1}, {} beyond {:.0} standard deviations, {} outside the typical range)",
                        metric.label(),
                        flagged,
                        stats.mean,
                        stats.z_count,
                        self.config.z_threshold,
                        stats.iqr_count
                    ),
                })
            })
            .collect()
    }
}

impl Default for AnomalyDetector {
    fn default() -> Self {
        Self::new()
    }
}
