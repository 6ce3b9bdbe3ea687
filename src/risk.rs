//! Flare-up risk from historical pre-flare fingerprints
//!
//! The days leading up to each past flare are averaged into a fingerprint
//! and the most recent days are scored against it.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::models::{sorted_by_date, LogEntry, Metric};

/// Fingerprint metrics and their weights in percent
pub const RISK_WEIGHTS: [(Metric, u32); 5] = [
    (Metric::BackPain, 30),
    (Metric::Stiffness, 25),
    (Metric::Fatigue, 25),
    (Metric::Swelling, 10),
    (Metric::Mood, 10),
];

/// Risk assessment thresholds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskConfig {
    pub min_history_days: usize,
    /// Days before each flare that form its fingerprint
    pub lookback_days: usize,
    /// Flares with fewer preceding days are skipped
    pub min_lookback_days: usize,
    pub recent_days: usize,
    /// Absolute difference below which a metric counts as matching
    pub match_tolerance: f64,
    pub min_similarity: f64,
    pub min_matching_metrics: usize,
    pub high_similarity: f64,
    pub moderate_similarity: f64,
}

impl Default for RiskConfig {
    fn default() -> Self {
        Self {
            min_history_days: 14,
            lookback_days: 3,
            min_lookback_days: 2,
            recent_days: 3,
            match_tolerance: 1.5,
            min_similarity: 0.7,
            min_matching_metrics: 3,
            high_similarity: 0.85,
            moderate_similarity: 0.75,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Moderate,
    High,
}

/// Average value of each fingerprint metric; `None` where no value was logged
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskFingerprint {
    pub averages: Vec<(Metric, Option<f64>)>,
    /// Number of flares that contributed
    pub flare_count: usize,
}

impl RiskFingerprint {
    pub fn average(&self, metric: Metric) -> Option<f64> {
        self.averages
            .iter()
            .find(|(m, _)| *m == metric)
            .and_then(|(_, v)| *v)
    }
}

/// How one metric of the recent days compares to the fingerprint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskFactor {
    pub metric: Metric,
    pub recent: f64,
    pub pre_flare: f64,
    pub similarity: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlareRisk {
    pub level: RiskLevel,
    /// Similarity as a whole percentage
    pub confidence: u32,
    pub similarity: f64,
    pub matching_metrics: usize,
}

/// Full comparison of the recent days against the fingerprint
#[derive(Debug, Clone, PartialEq)]
pub struct RiskAssessment {
    pub fingerprint: RiskFingerprint,
    pub similarity: f64,
    pub factors: Vec<RiskFactor>,
    pub verdict: Option<FlareRisk>,
}

pub struct RiskAssessor {
    config: RiskConfig,
}

impl RiskAssessor {
    pub fn new() -> Self {
        Self::with_config(RiskConfig::default())
    }

    pub fn with_config(config: RiskConfig) -> Self {
        Self { config }
    }

    /// Average the days preceding each flare into one fingerprint.
    ///
    /// Returns `None` when there is not enough history or no flare has
    /// enough preceding days.
    pub fn fingerprint(&self, logs: &[LogEntry]) -> Option<RiskFingerprint> {
        let sorted = sorted_by_date(logs);
        if sorted.len() < self.config.min_history_days {
            return None;
        }

        let windows: Vec<&[&LogEntry]> = sorted
            .iter()
            .enumerate()
            .filter(|(_, e)| e.flare)
            .filter_map(|(i, _)| {
                let start = i.saturating_sub(self.config.lookback_days);
                let window = &sorted[start..i];
                (window.len() >= self.config.min_lookback_days).then_some(window)
            })
            .collect();
        if windows.is_empty() {
            return None;
        }

        let averages = RISK_WEIGHTS
            .iter()
            .map(|&(metric, _)| {
                let per_flare: Vec<f64> = windows
                    .iter()
                    .filter_map(|window| average(window, metric))
                    .collect();
                let value = (!per_flare.is_empty())
                    .then(|| per_flare.iter().sum::<f64>() / per_flare.len() as f64);
                (metric, value)
            })
            .collect();

        Some(RiskFingerprint {
            averages,
            flare_count: windows.len(),
        })
    }

    /// Score the most recent days against the pre-flare fingerprint
    pub fn assess(&self, logs: &[LogEntry]) -> Option<RiskAssessment> {
        let fingerprint = self.fingerprint(logs)?;
        let sorted = sorted_by_date(logs);
        let recent = &sorted[sorted.len().saturating_sub(self.config.recent_days)..];

        let mut weighted_percent = 0.0;
        let mut factors = Vec::new();
        for &(metric, weight) in &RISK_WEIGHTS {
            let (Some(now), Some(before)) = (average(recent, metric), fingerprint.average(metric))
            else {
                continue;
            };
            let similarity = 1.0 - (now - before).abs() / 10.0;
            weighted_percent += weight as f64 * similarity;
            if (now - before).abs() < self.config.match_tolerance {
                factors.push(RiskFactor {
                    metric,
                    recent: now,
                    pre_flare: before,
                    similarity,
                });
            }
        }
        let similarity = weighted_percent / 100.0;

        let verdict = (similarity > self.config.min_similarity
            && factors.len() >= self.config.min_matching_metrics)
            .then(|| FlareRisk {
                level: if similarity > self.config.high_similarity {
                    RiskLevel::High
                } else if similarity > self.config.moderate_similarity {
                    RiskLevel::Moderate
                } else {
                    RiskLevel::Low
                },
                confidence: (similarity * 100.0).round() as u32,
                similarity,
                matching_metrics: factors.len(),
            });

        debug!(
            similarity,
            matching = factors.len(),
            flares = fingerprint.flare_count,
            "flare risk assessed"
        );
        Some(RiskAssessment {
            fingerprint,
            similarity,
            factors,
            verdict,
        })
    }
}

impl Default for RiskAssessor {
    fn default() -> Self {
        Self::new()
    }
}

fn average(entries: &[&LogEntry], metric: Metric) -> Option<f64> {
    let values: Vec<f64> = entries.iter().filter_map(|e| e.value(metric)).collect();
    (!values.is_empty()).then(|| values.iter().sum::<f64>() / values.len() as f64)
}
