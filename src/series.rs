//! Per-metric numeric series extraction
//!
//! Turns a collection of journal entries into a date-ordered series of
//! `(day_offset, value)` points for a single metric. The day offset is the
//! number of whole days since the first *valid* entry for that metric, not
//! the entry's index, so gaps in logging stretch the x-axis the way they
//! stretch the calendar.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::{sorted_by_date, LogEntry, Metric};

/// A single observation on the series x-axis
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeriesPoint {
    /// Whole days since the first valid entry
    pub day_offset: i64,
    pub value: f64,
    pub date: NaiveDate,
}

/// Ordered observations for one metric
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricSeries {
    pub metric: Metric,
    pub points: Vec<SeriesPoint>,
}

impl MetricSeries {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn xs(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.day_offset as f64).collect()
    }

    pub fn values(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.value).collect()
    }

    pub fn last(&self) -> Option<&SeriesPoint> {
        self.points.last()
    }

    pub fn mean(&self) -> Option<f64> {
        if self.points.is_empty() {
            return None;
        }
        Some(self.points.iter().map(|p| p.value).sum::<f64>() / self.points.len() as f64)
    }
}

/// Builds validated series from raw log collections
pub struct MetricSeriesBuilder;

impl MetricSeriesBuilder {
    /// Extract the series for `metric`, using the metric's own positivity rule
    pub fn build(logs: &[LogEntry], metric: Metric) -> MetricSeries {
        Self::build_with(logs, metric, metric.requires_positive())
    }

    /// Extract the series for `metric` with an explicit positivity rule.
    ///
    /// With `requires_positive`, a zero reading is treated as "not logged".
    /// Entries whose value is absent or out of the metric's domain are
    /// skipped. The result may be empty; callers check the length before
    /// fitting anything to it.
    pub fn build_with(logs: &[LogEntry], metric: Metric, requires_positive: bool) -> MetricSeries {
        let domain = metric.domain();
        let mut points = Vec::new();
        let mut origin: Option<NaiveDate> = None;

        for entry in sorted_by_date(logs) {
            let value = match entry.raw_value(metric) {
                Some(v) if domain.contains(v) && (!requires_positive || v > 0.0) => v,
                _ => continue,
            };

            let first = *origin.get_or_insert(entry.date);
            points.push(SeriesPoint {
                day_offset: (entry.date - first).num_days(),
                value,
                date: entry.date,
            });
        }

        MetricSeries { metric, points }
    }
}
