//! Temporal and multi-metric patterns in the display window
//!
//! - trend acceleration: slopes of the two halves of the window compared
//! - weekday seasonality: spread between the best and worst weekday
//! - day clustering: days with a similar multi-metric profile grouped
//!   greedily (same order-dependent policy as correlation clusters)

use chrono::{Datelike, Weekday};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

use crate::models::{sorted_by_date, LogEntry, Metric, MetricPolarity};
use crate::regression::RegressionEngine;

/// Metrics compared when clustering days by profile
pub const PROFILE_METRICS: [Metric; 5] = [
    Metric::Fatigue,
    Metric::Stiffness,
    Metric::BackPain,
    Metric::Sleep,
    Metric::Mood,
];

/// Pattern detection thresholds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PatternConfig {
    /// Slope change between halves (units/day) that counts as acceleration
    pub acceleration_threshold: f64,
    pub min_half_points: usize,
    /// Weekday average spread that counts as a weekly pattern
    pub seasonality_spread: f64,
    pub min_weekdays: usize,
    /// Euclidean distance between normalized day profiles
    pub cluster_distance: f64,
    /// Share of valid days the dominant cluster must exceed
    pub cluster_share: f64,
    pub min_cluster_days: usize,
    pub elevated_level: f64,
    pub depressed_level: f64,
}

impl Default for PatternConfig {
    fn default() -> Self {
        Self {
            acceleration_threshold: 0.15,
            min_half_points: 3,
            seasonality_spread: 1.5,
            min_weekdays: 5,
            cluster_distance: 0.3,
            cluster_share: 0.4,
            min_cluster_days: 5,
            elevated_level: 7.0,
            depressed_level: 4.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PatternKind {
    TrendAcceleration,
    TrendDeceleration,
    WeeklyCycle,
    DayCluster,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pattern {
    pub kind: PatternKind,
    pub metric: Option<Metric>,
    pub message: String,
    /// Size of the effect in the pattern's own units (slope change,
    /// weekday spread, or cluster share)
    pub magnitude: f64,
}

/// Dominant group of similar days
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DayCluster {
    pub dates: Vec<chrono::NaiveDate>,
    pub share: f64,
    pub elevated: Vec<Metric>,
    pub depressed: Vec<Metric>,
}

pub struct PatternDetector {
    config: PatternConfig,
}

impl PatternDetector {
    pub fn new() -> Self {
        Self::with_config(PatternConfig::default())
    }

    pub fn with_config(config: PatternConfig) -> Self {
        Self { config }
    }

    pub fn detect(&self, logs: &[LogEntry]) -> Vec<Pattern> {
        let mut patterns = self.trend_acceleration(logs);
        patterns.extend(self.weekly_cycles(logs));
        if let Some(cluster) = self.dominant_day_cluster(logs) {
            patterns.push(Self::describe_cluster(&cluster));
        }
        debug!(count = patterns.len(), "pattern detection complete");
        patterns
    }

    /// Compare the slope of the first and second half of the window.
    ///
    /// The window is split by entry index, not by date. Each half keeps only
    /// positive values and needs `min_half_points` of them.
    pub fn trend_acceleration(&self, logs: &[LogEntry]) -> Vec<Pattern> {
        let sorted = sorted_by_date(logs);
        let mid = sorted.len() / 2;
        let (first_half, second_half) = sorted.split_at(mid);
        let mut patterns = Vec::new();

        for metric in Metric::SLIDERS {
            let (Some(early), Some(late)) = (
                self.half_slope(first_half, metric),
                self.half_slope(second_half, metric),
            ) else {
                continue;
            };

            let change = late - early;
            if change.abs() <= self.config.acceleration_threshold {
                continue;
            }

            let worsening = match metric.polarity() {
                MetricPolarity::HigherIsBetter => change < 0.0,
                _ => change > 0.0,
            };
            let (kind, verb) = if change > 0.0 {
                (PatternKind::TrendAcceleration, "rising faster")
            } else {
                (PatternKind::TrendDeceleration, "falling faster")
            };

            patterns.push(Pattern {
                kind,
                metric: Some(metric),
                message: format!(
                    "{} is {} in the second half of the period ({:+.2} → {:+.2} per day), {}",
                    metric.label(),
                    verb,
                    early,
                    late,
                    if worsening {
                        "a worsening shift"
                    } else {
                        "an improving shift"
                    }
                ),
                magnitude: change,
            });
        }

        patterns
    }

    fn half_slope(&self, half: &[&LogEntry], metric: Metric) -> Option<f64> {
        let origin = half.first()?.date;
        let (xs, ys): (Vec<f64>, Vec<f64>) = half
            .iter()
            .filter_map(|e| {
                let value = e.value(metric).filter(|&v| v > 0.0)?;
                Some(((e.date - origin).num_days() as f64, value))
            })
            .unzip();

        if xs.len() < self.config.min_half_points {
            return None;
        }
        RegressionEngine::weighted_linear(&xs, &ys).map(|fit| fit.slope)
    }

    /// Average per weekday for one metric, for weekdays that have data
    pub fn weekday_averages(logs: &[LogEntry], metric: Metric) -> BTreeMap<u32, (Weekday, f64)> {
        let mut sums: BTreeMap<u32, (Weekday, f64, usize)> = BTreeMap::new();
        for entry in logs {
            if let Some(value) = entry.value(metric) {
                let weekday = entry.date.weekday();
                let slot = sums
                    .entry(weekday.num_days_from_monday())
                    .or_insert((weekday, 0.0, 0));
                slot.1 += value;
                slot.2 += 1;
            }
        }

        sums.into_iter()
            .map(|(key, (weekday, sum, count))| (key, (weekday, sum / count as f64)))
            .collect()
    }

    /// Sliders whose best and worst weekday averages differ by more than
    /// `seasonality_spread`, given data for at least `min_weekdays` weekdays
    pub fn weekly_cycles(&self, logs: &[LogEntry]) -> Vec<Pattern> {
        let mut patterns = Vec::new();

        for metric in Metric::SLIDERS {
            let averages = Self::weekday_averages(logs, metric);
            if averages.len() < self.config.min_weekdays {
                continue;
            }

            let by_value = |a: &&(Weekday, f64), b: &&(Weekday, f64)| {
                a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal)
            };
            let (Some(high), Some(low)) = (
                averages.values().max_by(by_value),
                averages.values().min_by(by_value),
            ) else {
                continue;
            };

            let spread = high.1 - low.1;
            if spread > self.config.seasonality_spread {
                patterns.push(Pattern {
                    kind: PatternKind::WeeklyCycle,
                    metric: Some(metric),
                    message: format!(
                        "{} tends to be highest on {} ({:.1}) and lowest on {} ({:.1})",
                        metric.label(),
                        weekday_name(high.0),
                        high.1,
                        weekday_name(low.0),
                        low.1
                    ),
                    magnitude: spread,
                });
            }
        }

        patterns
    }

    /// Days whose profile metrics are all valid, with values scaled to [0, 1]
    pub fn normalized_profiles(logs: &[LogEntry]) -> Vec<(chrono::NaiveDate, Vec<f64>)> {
        sorted_by_date(logs)
            .into_iter()
            .filter_map(|entry| {
                let vector = PROFILE_METRICS
                    .iter()
                    .map(|&metric| {
                        let domain = metric.domain();
                        entry
                            .value(metric)
                            .map(|v| (v - domain.min) / domain.span())
                    })
                    .collect::<Option<Vec<f64>>>()?;
                Some((entry.date, vector))
            })
            .collect()
    }

    /// Largest greedy cluster of similar days, if it covers more than
    /// `cluster_share` of valid days and shows an elevated or depressed
    /// metric.
    ///
    /// Each unassigned day, in date order, opens a cluster and takes every
    /// other unassigned day within `cluster_distance` of it. Distances are
    /// measured to the opening day only.
    pub fn dominant_day_cluster(&self, logs: &[LogEntry]) -> Option<DayCluster> {
        let profiles = Self::normalized_profiles(logs);
        let n = profiles.len();
        if n < self.config.min_cluster_days {
            return None;
        }

        let distances: Vec<Vec<f64>> = profiles
            .iter()
            .map(|(_, a)| profiles.iter().map(|(_, b)| euclidean(a, b)).collect())
            .collect();

        let mut assigned = vec![false; n];
        let mut largest: Vec<usize> = Vec::new();
        for i in 0..n {
            if assigned[i] {
                continue;
            }
            assigned[i] = true;
            let mut members = vec![i];
            for j in 0..n {
                if !assigned[j] && distances[i][j] <= self.config.cluster_distance {
                    assigned[j] = true;
                    members.push(j);
                }
            }
            if members.len() > largest.len() {
                largest = members;
            }
        }

        let share = largest.len() as f64 / n as f64;
        if share <= self.config.cluster_share {
            return None;
        }

        let mut elevated = Vec::new();
        let mut depressed = Vec::new();
        for (k, &metric) in PROFILE_METRICS.iter().enumerate() {
            let domain = metric.domain();
            let average = largest
                .iter()
                .map(|&i| profiles[i].1[k] * domain.span() + domain.min)
                .sum::<f64>()
                / largest.len() as f64;
            if average >= self.config.elevated_level {
                elevated.push(metric);
            } else if average <= self.config.depressed_level {
                depressed.push(metric);
            }
        }

        if elevated.is_empty() && depressed.is_empty() {
            return None;
        }

        Some(DayCluster {
            dates: largest.iter().map(|&i| profiles[i].0).collect(),
            share,
            elevated,
            depressed,
        })
    }

    fn describe_cluster(cluster: &DayCluster) -> Pattern {
        let labels = |metrics: &[Metric]| {
            metrics
                .iter()
                .map(|m| m.label())
                .collect::<Vec<_>>()
                .join(", ")
        };

        let mut traits = Vec::new();
        if !cluster.elevated.is_empty() {
            traits.push(format!("high {}", labels(&cluster.elevated)));
        }
        if !cluster.depressed.is_empty() {
            traits.push(format!("low {}", labels(&cluster.depressed)));
        }

        Pattern {
            kind: PatternKind::DayCluster,
            metric: None,
            message: format!(
                "{:.0}% of days share a similar profile: {}",
                cluster.share * 100.0,
                traits.join("; ")
            ),
            magnitude: cluster.share,
        }
    }
}

impl Default for PatternDetector {
    fn default() -> Self {
        Self::new()
    }
}

pub(crate) fn euclidean(a: &[f64], b: &[f64]) -> f64 {
    a.iter()
        .zip(b)
        .map(|(x, y)| (x - y).powi(2))
        .sum::<f64>()
        .sqrt()
}

fn weekday_name(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    // 2024-01-01 is a Monday
    fn day(n: u64) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap() + chrono::Days::new(n)
    }

    #[test]
    fn test_acceleration_detected() {
        // Flat for ten days, then climbing 0.5/day
        let logs: Vec<LogEntry> = (0..20)
            .map(|i| {
                let pain = if i < 10 { 3.0 } else { 3.0 + 0.5 * (i - 9) as f64 };
                LogEntry::new(day(i)).with(Metric::BackPain, pain)
            })
            .collect();

        let patterns = PatternDetector::new().trend_acceleration(&logs);
        assert_eq!(patterns.len(), 1);
        assert_eq!(patterns[0].kind, PatternKind::TrendAcceleration);
        assert_eq!(patterns[0].metric, Some(Metric::BackPain));
        assert!(patterns[0].message.contains("worsening"));
    }

    #[test]
    fn test_improving_sleep_decline_is_worsening() {
        let logs: Vec<LogEntry> = (0..20)
            .map(|i| {
                let sleep = if i < 10 { 8.0 } else { 8.0 - 0.4 * (i - 9) as f64 };
                LogEntry::new(day(i)).with(Metric::Sleep, sleep)
            })
            .collect();

        let patterns = PatternDetector::new().trend_acceleration(&logs);
        assert_eq!(patterns[0].kind, PatternKind::TrendDeceleration);
        assert!(patterns[0].message.contains("worsening"));
    }

    #[test]
    fn test_acceleration_needs_points_in_both_halves() {
        let logs: Vec<LogEntry> = (0..6)
            .map(|i| LogEntry::new(day(i)).with(Metric::Fatigue, (i * i) as f64 / 4.0))
            .collect();
        let detector = PatternDetector::with_config(PatternConfig {
            min_half_points: 4,
            ..PatternConfig::default()
        });
        assert!(detector.trend_acceleration(&logs).is_empty());
    }

    #[test]
    fn test_weekly_cycle() {
        // Mondays are bad, every other day is moderate
        let logs: Vec<LogEntry> = (0..28)
            .map(|i| {
                let fatigue = if i % 7 == 0 { 8.0 } else { 4.0 };
                LogEntry::new(day(i)).with(Metric::Fatigue, fatigue)
            })
            .collect();

        let patterns = PatternDetector::new().weekly_cycles(&logs);
        assert_eq!(patterns.len(), 1);
        assert!(patterns[0].message.contains("Monday"));
        assert!((patterns[0].magnitude - 4.0).abs() < 1e-9);
    }

    #[test]
    fn test_weekly_cycle_needs_five_weekdays() {
        let logs: Vec<LogEntry> = (0..4)
            .map(|i| LogEntry::new(day(i)).with(Metric::Fatigue, if i == 0 { 9.0 } else { 1.0 }))
            .collect();
        assert!(PatternDetector::new().weekly_cycles(&logs).is_empty());
    }

    #[test]
    fn test_dominant_cluster_describes_profile() {
        let logs: Vec<LogEntry> = (0..10)
            .map(|i| {
                let entry = LogEntry::new(day(i));
                if i < 6 {
                    entry
                        .with(Metric::Fatigue, 8.0)
                        .with(Metric::Stiffness, 8.0)
                        .with(Metric::BackPain, 7.5)
                        .with(Metric::Sleep, 3.0)
                        .with(Metric::Mood, 5.0)
                } else {
                    entry
                        .with(Metric::Fatigue, 2.0)
                        .with(Metric::Stiffness, 1.0)
                        .with(Metric::BackPain, 2.0)
                        .with(Metric::Sleep, 9.0)
                        .with(Metric::Mood, 9.0)
                }
            })
            .collect();

        let cluster = PatternDetector::new().dominant_day_cluster(&logs).unwrap();
        assert_eq!(cluster.dates.len(), 6);
        assert!((cluster.share - 0.6).abs() < 1e-9);
        assert_eq!(
            cluster.elevated,
            vec![Metric::Fatigue, Metric::Stiffness, Metric::BackPain]
        );
        assert_eq!(cluster.depressed, vec![Metric::Sleep]);
    }

    fn uniform_days(levels: &[f64]) -> Vec<LogEntry> {
        levels
            .iter()
            .enumerate()
            .map(|(i, &level)| {
                let mut entry = LogEntry::new(day(i as u64));
                for metric in PROFILE_METRICS {
                    entry = entry.with(metric, level);
                }
                entry
            })
            .collect()
    }

    #[test]
    fn test_cluster_at_share_threshold_not_reported() {
        // Three well separated groups; the largest holds exactly 4 of 10 days
        let levels = [8.0, 2.0, 5.0, 8.0, 2.0, 5.0, 8.0, 2.0, 5.0, 8.0];
        let detector = PatternDetector::new();
        assert!(detector.dominant_day_cluster(&uniform_days(&levels)).is_none());

        let mut levels = levels.to_vec();
        levels.push(8.0);
        let cluster = detector.dominant_day_cluster(&uniform_days(&levels)).unwrap();
        assert_eq!(cluster.dates.len(), 5);
        assert!((cluster.share - 5.0 / 11.0).abs() < 1e-9);
        assert_eq!(cluster.elevated, PROFILE_METRICS.to_vec());
    }

    #[test]
    fn test_neutral_cluster_not_reported() {
        let logs: Vec<LogEntry> = (0..10)
            .map(|i| {
                let mut entry = LogEntry::new(day(i));
                for metric in PROFILE_METRICS {
                    entry = entry.with(metric, 5.0);
                }
                entry
            })
            .collect();
        assert!(PatternDetector::new().dominant_day_cluster(&logs).is_none());
    }

    #[test]
    fn test_days_missing_profile_metrics_are_skipped() {
        let logs = vec![
            LogEntry::new(day(0)).with(Metric::Fatigue, 5.0),
            LogEntry::new(day(1)),
        ];
        assert!(PatternDetector::normalized_profiles(&logs).is_empty());
    }
}
