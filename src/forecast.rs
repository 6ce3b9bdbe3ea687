//! Display-grade forecasts and confidence bands
//!
//! Raw model output is often too flat to read on a chart: a slope of
//! 0.01/day rounds to the same displayed value for weeks. The projector
//! turns a fitted model into a sequence that is
//!
//! - clamped to the metric's domain and snapped to its display precision,
//! - anchored on the model's next-step prediction,
//! - guaranteed a minimum number of distinct values for the horizon
//!   (7 for 90+ days, 5 for 30+, 3 for 7+, 2 otherwise),
//! - free of runs of identical values longer than `ceil(days / 4)`.
//!
//! When the raw predictions already satisfy those rules they are returned
//! as-is. Otherwise the horizon is split into equal segments separated by
//! forced steps that follow the model's direction, or oscillate around the
//! anchor when the trend is flat. The output depends only on the model, the
//! horizon and the metric.

use serde::{Deserialize, Serialize};
use statrs::distribution::{ContinuousCDF, Normal};

use crate::models::{Metric, MetricDomain};
use crate::regression::TrendModel;

/// Share of extra width added to the interval by the end of the horizon
const HORIZON_WIDENING: f64 = 0.5;

/// One forecast day with its confidence band
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForecastPoint {
    /// Days after the last training observation, starting at 1
    pub days_ahead: usize,
    pub value: f64,
    pub lower: f64,
    pub upper: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    Up,
    Down,
    Flat,
}

/// Turns fitted models into clamped, display-ready forecasts
pub struct ForecastProjector;

impl ForecastProjector {
    /// Minimum number of distinct forecast values for a horizon
    pub fn min_distinct_values(days_ahead: usize) -> usize {
        match days_ahead {
            d if d >= 90 => 7,
            d if d >= 30 => 5,
            d if d >= 7 => 3,
            _ => 2,
        }
    }

    /// Longest allowed run of identical consecutive values
    pub fn max_run_length(days_ahead: usize) -> usize {
        days_ahead.div_ceil(4).max(1)
    }

    /// Critical value for a two-sided interval at `confidence` (e.g. 0.95).
    ///
    /// The usual levels use the fixed normal-approximation constants; any
    /// other level falls back to the standard normal quantile.
    pub fn critical_value(confidence: f64) -> f64 {
        let rounded = (confidence * 1000.0).round() as i64;
        match rounded {
            900 => 1.645,
            950 => 1.96,
            990 => 2.576,
            _ => {
                let level = confidence.clamp(0.5, 0.9999);
                Normal::new(0.0, 1.0)
                    .map(|n| n.inverse_cdf(1.0 - (1.0 - level) / 2.0))
                    .unwrap_or(1.96)
            }
        }
    }

    /// Display forecast for `days_ahead` days after the last training point
    pub fn project(trend: &TrendModel, metric: Metric, days_ahead: usize) -> Vec<f64> {
        if days_ahead == 0 {
            return Vec::new();
        }

        let domain = metric.domain();
        let raw: Vec<i64> = (1..=days_ahead)
            .map(|day| domain.to_ticks(domain.snap(trend.predict_ahead(day))))
            .collect();

        if days_ahead == 1 {
            return to_values(&domain, &raw);
        }

        let min_distinct = Self::min_distinct_values(days_ahead).min(days_ahead);
        let max_run = Self::max_run_length(days_ahead);
        if distinct_ticks(&raw) >= min_distinct && longest_tick_run(&raw) <= max_run {
            return to_values(&domain, &raw);
        }

        let direction = trend_direction(trend.result.slope, days_ahead, &domain);
        let segments = min_distinct
            .max(days_ahead.div_ceil(max_run))
            .min(days_ahead);

        let forced_ticks = domain.to_ticks(domain.forced_step).max(1);
        let net_ticks = (raw[raw.len() - 1] - raw[0]).abs();
        let spread_ticks = (net_ticks as f64 / (segments - 1) as f64).round() as i64;
        let step_ticks = forced_ticks.max(spread_ticks);

        let bounds = (domain.to_ticks(domain.min), domain.to_ticks(domain.max));
        let mut levels = build_levels(raw[0], segments, step_ticks, direction, metric.seed(), bounds);
        if levels.len() < segments && step_ticks != forced_ticks {
            levels = build_levels(raw[0], segments, forced_ticks, direction, metric.seed(), bounds);
        }
        let segments = levels.len();

        let mut ticks = Vec::with_capacity(days_ahead);
        for (segment, &level) in levels.iter().enumerate() {
            let start = segment * days_ahead / segments;
            let end = (segment + 1) * days_ahead / segments;
            ticks.extend(std::iter::repeat(level).take(end - start));
        }

        to_values(&domain, &ticks)
    }

    /// Confidence bounds around each forecast value.
    ///
    /// `margin = t · se · sqrt(1 + 1/n) · (1 + (i / days) · 0.5)` with `i`
    /// the zero-based horizon index; bounds are clamped to the domain.
    pub fn confidence_intervals(
        values: &[f64],
        standard_error: f64,
        n: usize,
        metric: Metric,
        confidence: f64,
    ) -> Vec<(f64, f64)> {
        let domain = metric.domain();
        let t = Self::critical_value(confidence);
        let base = t * standard_error * (1.0 + 1.0 / n.max(1) as f64).sqrt();
        let days = values.len().max(1) as f64;

        values
            .iter()
            .enumerate()
            .map(|(i, &value)| {
                let margin = base * (1.0 + (i as f64 / days) * HORIZON_WIDENING);
                (domain.clamp(value - margin), domain.clamp(value + margin))
            })
            .collect()
    }

    /// Display forecast joined with its confidence band
    pub fn forecast(
        trend: &TrendModel,
        metric: Metric,
        days_ahead: usize,
        confidence: f64,
    ) -> Vec<ForecastPoint> {
        let values = Self::project(trend, metric, days_ahead);
        let bands = Self::confidence_intervals(
            &values,
            trend.result.standard_error,
            trend.n,
            metric,
            confidence,
        );

        values
            .into_iter()
            .zip(bands)
            .enumerate()
            .map(|(i, (value, (lower, upper)))| ForecastPoint {
                days_ahead: i + 1,
                value,
                lower,
                upper,
            })
            .collect()
    }
}

/// Number of distinct values once snapped to the metric's display grid
pub fn distinct_values(values: &[f64], metric: Metric) -> usize {
    let domain = metric.domain();
    let ticks: Vec<i64> = values.iter().map(|&v| domain.to_ticks(v)).collect();
    distinct_ticks(&ticks)
}

/// Longest run of identical consecutive values on the display grid
pub fn longest_run(values: &[f64], metric: Metric) -> usize {
    let domain = metric.domain();
    let ticks: Vec<i64> = values.iter().map(|&v| domain.to_ticks(v)).collect();
    longest_tick_run(&ticks)
}

fn to_values(domain: &MetricDomain, ticks: &[i64]) -> Vec<f64> {
    ticks.iter().map(|&t| domain.from_ticks(t)).collect()
}

fn distinct_ticks(ticks: &[i64]) -> usize {
    let mut sorted = ticks.to_vec();
    sorted.sort_unstable();
    sorted.dedup();
    sorted.len()
}

fn longest_tick_run(ticks: &[i64]) -> usize {
    let mut longest = 0;
    let mut current = 0;
    let mut previous: Option<i64> = None;
    for &tick in ticks {
        if previous == Some(tick) {
            current += 1;
        } else {
            current = 1;
            previous = Some(tick);
        }
        longest = longest.max(current);
    }
    longest
}

/// Flat when the whole-horizon change stays under one display increment
fn trend_direction(slope: f64, days_ahead: usize, domain: &MetricDomain) -> Direction {
    let change = slope * days_ahead as f64;
    if !change.is_finite() || change.abs() < domain.precision {
        Direction::Flat
    } else if change > 0.0 {
        Direction::Up
    } else {
        Direction::Down
    }
}

/// Distinct tick levels for each segment, anchor first.
///
/// Trending: a staircase away from the anchor in the trend direction,
/// spilling to the other side of the anchor if the domain runs out; the
/// extra levels are ordered so the last segment sits furthest along the
/// trend. Flat: `+1, -1, +2, -2, ...` steps around the anchor, the starting
/// side chosen by the metric seed.
fn build_levels(
    anchor: i64,
    count: usize,
    step: i64,
    direction: Direction,
    seed: u64,
    (lo, hi): (i64, i64),
) -> Vec<i64> {
    let in_bounds = |tick: i64| tick >= lo && tick <= hi;
    let mut extras: Vec<i64> = Vec::with_capacity(count.saturating_sub(1));
    let needed = count.saturating_sub(1);

    match direction {
        Direction::Up | Direction::Down => {
            let sign = if direction == Direction::Up { 1 } else { -1 };
            let mut k = 1;
            while extras.len() < needed && in_bounds(anchor + sign * k * step) {
                extras.push(anchor + sign * k * step);
                k += 1;
            }
            let mut k = 1;
            while extras.len() < needed && in_bounds(anchor - sign * k * step) {
                extras.push(anchor - sign * k * step);
                k += 1;
            }
            extras.sort_unstable_by_key(|&tick| sign * tick);
        }
        Direction::Flat => {
            let first_sign = if seed % 2 == 0 { 1 } else { -1 };
            let span = ((hi - lo) / step.max(1)).max(1);
            let mut k: i64 = 1;
            while extras.len() < needed && k <= 2 * span + 2 {
                let magnitude = (k + 1) / 2;
                let sign = if k % 2 == 1 { first_sign } else { -first_sign };
                let tick = anchor + sign * magnitude * step;
                if in_bounds(tick) {
                    extras.push(tick);
                }
                k += 1;
            }
        }
    }

    let mut levels = Vec::with_capacity(count);
    levels.push(anchor);
    levels.extend(extras);
    levels
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::regression::{FittedModel, LinearFit, ModelType, RegressionResult};
    use proptest::prelude::*;

    fn linear_trend(slope: f64, intercept: f64, last_x: f64, standard_error: f64) -> TrendModel {
        let fit = LinearFit {
            slope,
            intercept,
            r_squared: 0.8,
            standard_error,
        };
        TrendModel {
            result: RegressionResult {
                slope,
                intercept,
                r_squared: 0.8,
                standard_error,
                model_type: ModelType::Linear,
            },
            model: FittedModel::Linear(fit),
            n: 20,
            last_x,
        }
    }

    #[test]
    fn test_minimum_distinct_thresholds() {
        assert_eq!(ForecastProjector::min_distinct_values(3), 2);
        assert_eq!(ForecastProjector::min_distinct_values(7), 3);
        assert_eq!(ForecastProjector::min_distinct_values(30), 5);
        assert_eq!(ForecastProjector::min_distinct_values(90), 7);
        assert_eq!(ForecastProjector::max_run_length(7), 2);
        assert_eq!(ForecastProjector::max_run_length(30), 8);
    }

    #[test]
    fn test_critical_values() {
        assert_eq!(ForecastProjector::critical_value(0.95), 1.96);
        assert_eq!(ForecastProjector::critical_value(0.90), 1.645);
        assert_eq!(ForecastProjector::critical_value(0.99), 2.576);
        let t80 = ForecastProjector::critical_value(0.80);
        assert!((t80 - 1.2816).abs() < 1e-3);
    }

    #[test]
    fn test_steep_trend_is_returned_unchanged() {
        let trend = linear_trend(0.3, 2.0, 10.0, 0.5);
        let values = ForecastProjector::project(&trend, Metric::BackPain, 7);

        let expected: Vec<f64> = (1..=7)
            .map(|d| Metric::BackPain.domain().snap(trend.predict_ahead(d)))
            .collect();
        assert_eq!(values, expected);
    }

    #[test]
    fn test_first_value_is_next_step_prediction() {
        let trend = linear_trend(0.001, 4.0, 20.0, 0.2);
        let values = ForecastProjector::project(&trend, Metric::Fatigue, 30);

        let next = Metric::Fatigue.domain().snap(trend.predict_ahead(1));
        assert_eq!(values[0], next);
    }

    #[test]
    fn test_flat_trend_gets_forced_steps() {
        let trend = linear_trend(0.0, 5.0, 20.0, 0.2);
        let values = ForecastProjector::project(&trend, Metric::Mood, 30);

        assert_eq!(values.len(), 30);
        assert!(distinct_values(&values, Metric::Mood) >= 5);
        assert!(longest_run(&values, Metric::Mood) <= 8);
        assert_eq!(values[0], 5.0);
        // Bounded oscillation around the anchor
        assert!(values.iter().all(|v| (v - 5.0).abs() <= 0.61));
    }

    #[test]
    fn test_small_upward_trend_ends_higher() {
        let trend = linear_trend(0.01, 4.0, 20.0, 0.2);
        let values = ForecastProjector::project(&trend, Metric::Stiffness, 30);

        assert!(values[values.len() - 1] > values[0]);
        assert!(distinct_values(&values, Metric::Stiffness) >= 5);
    }

    #[test]
    fn test_small_downward_trend_ends_lower() {
        let trend = linear_trend(-0.01, 6.0, 20.0, 0.2);
        let values = ForecastProjector::project(&trend, Metric::Stiffness, 30);

        assert!(values[values.len() - 1] < values[0]);
        assert!(distinct_values(&values, Metric::Stiffness) >= 5);
        assert!(longest_run(&values, Metric::Stiffness) <= 8);
    }

    #[test]
    fn test_downward_trend_at_floor_stays_in_domain() {
        let trend = linear_trend(-0.5, 0.5, 10.0, 1.0);
        let values = ForecastProjector::project(&trend, Metric::Swelling, 14);

        assert!(values.iter().all(|v| (0.0..=10.0).contains(v)));
        assert!(distinct_values(&values, Metric::Swelling) >= 3);
        assert!(longest_run(&values, Metric::Swelling) <= 4);
    }

    #[test]
    fn test_confidence_intervals_widen_and_clamp() {
        let values = vec![5.0; 10];
        let bands = ForecastProjector::confidence_intervals(&values, 1.0, 10, Metric::Sleep, 0.95);

        let first_width = bands[0].1 - bands[0].0;
        let last_width = bands[9].1 - bands[9].0;
        assert!(last_width > first_width);

        let expected = 1.96 * (1.1f64).sqrt();
        assert!((bands[0].1 - 5.0 - expected).abs() < 1e-9);

        let clamped = ForecastProjector::confidence_intervals(&[9.8], 2.0, 10, Metric::Sleep, 0.99);
        assert_eq!(clamped[0].1, 10.0);
    }

    #[test]
    fn test_zero_horizon() {
        let trend = linear_trend(1.0, 0.0, 0.0, 0.0);
        assert!(ForecastProjector::project(&trend, Metric::Fatigue, 0).is_empty());
        assert_eq!(ForecastProjector::project(&trend, Metric::Fatigue, 1).len(), 1);
    }

    #[test]
    fn test_forecast_points_carry_bands() {
        let trend = linear_trend(0.1, 3.0, 10.0, 0.4);
        let points = ForecastProjector::forecast(&trend, Metric::JointPain, 7, 0.95);

        assert_eq!(points.len(), 7);
        assert_eq!(points[0].days_ahead, 1);
        assert!(points.iter().all(|p| p.lower <= p.value && p.value <= p.upper));
    }

    #[test]
    fn test_projection_is_deterministic() {
        let trend = linear_trend(0.0, 70.0, 40.0, 3.0);
        let first = ForecastProjector::project(&trend, Metric::Bpm, 90);
        let second = ForecastProjector::project(&trend, Metric::Bpm, 90);
        assert_eq!(first, second);
        assert!(distinct_values(&first, Metric::Bpm) >= 7);
    }

    proptest! {
        #[test]
        fn test_forecast_properties(
            metric_index in 0usize..15,
            slope in -50.0f64..50.0,
            intercept in -1000.0f64..60000.0,
            last_x in 0.0f64..400.0,
            days_ahead in 1usize..120,
        ) {
            let metric = Metric::ALL[metric_index];
            let domain = metric.domain();
            let scale = domain.span() / 10.0;
            let trend = linear_trend(slope * scale / 50.0, intercept, last_x, 0.5 * scale);

            let values = ForecastProjector::project(&trend, metric, days_ahead);
            prop_assert_eq!(values.len(), days_ahead);
            prop_assert!(values.iter().all(|&v| v >= domain.min && v <= domain.max));

            if days_ahead >= 2 {
                let required = ForecastProjector::min_distinct_values(days_ahead).min(days_ahead);
                prop_assert!(distinct_values(&values, metric) >= required);
                prop_assert!(longest_run(&values, metric) <= ForecastProjector::max_run_length(days_ahead));
            }

            let first = domain.snap(trend.predict_ahead(1));
            prop_assert_eq!(domain.to_ticks(values[0]), domain.to_ticks(first));

            let bands = ForecastProjector::confidence_intervals(
                &values, trend.result.standard_error, trend.n, metric, 0.95,
            );
            prop_assert!(bands.iter().all(|&(lo, hi)| lo >= domain.min && hi <= domain.max && lo <= hi));
        }
    }
}
