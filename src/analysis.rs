//! Full analysis of a journal window
//!
//! [`AnalysisEngine::analyze`] takes a display window and an optional longer
//! training window. Models are fitted on the training window; averages,
//! current values, correlations, anomalies and patterns come from the display
//! window; flare risk uses the training window since it needs history.
//! Missing prerequisites never fail the call, they only leave the
//! corresponding output empty.

use chrono::Days;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;
use std::collections::BTreeMap;
use tracing::{debug, info};

use crate::advice::{AdviceGenerator, AdviceProfile};
use crate::anomaly::{Anomaly, AnomalyConfig, AnomalyDetector};
use crate::clustering::{day_profiles, DayProfile, DayProfileConfig};
use crate::correlation::{
    Correlation, CorrelationAnalyzer, CorrelationMatrix, DEFAULT_CORRELATION_THRESHOLD,
};
use crate::forecast::{ForecastPoint, ForecastProjector};
use crate::models::{LogEntry, Metric, MetricPolarity};
use crate::patterns::{Pattern, PatternConfig, PatternDetector};
use crate::regression::{RegressionEngine, RegressionResult};
use crate::risk::{FlareRisk, RiskAssessor, RiskConfig, RiskFactor};
use crate::series::MetricSeriesBuilder;

/// Share of the domain span within which a value counts as unchanged
const STATUS_BAND: f64 = 0.05;

/// Settings for one analysis run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Forecast horizon in days
    pub forecast_days: usize,
    pub confidence_level: f64,
    pub correlation_threshold: f64,
    /// Aligned days needed before a pair gets a coefficient
    pub min_correlation_days: usize,
    pub anomaly: AnomalyConfig,
    pub patterns: PatternConfig,
    pub risk: RiskConfig,
    /// Enables the seeded k-means day-profile pass
    pub day_profiles: Option<DayProfileConfig>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            forecast_days: 7,
            confidence_level: 0.95,
            correlation_threshold: DEFAULT_CORRELATION_THRESHOLD,
            min_correlation_days: 5,
            anomaly: AnomalyConfig::default(),
            patterns: PatternConfig::default(),
            risk: RiskConfig::default(),
            day_profiles: None,
        }
    }
}

/// How much a metric moves around its average
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stability {
    Stable,
    Variable,
    Volatile,
}

impl Stability {
    /// Classify by standard deviation relative to the domain span
    pub fn classify(std_dev: f64, metric: Metric) -> Self {
        let relative = std_dev / metric.domain().span();
        if relative < 0.1 {
            Stability::Stable
        } else if relative < 0.2 {
            Stability::Variable
        } else {
            Stability::Volatile
        }
    }
}

/// Direction of a change, read through the metric's polarity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendStatus {
    Improving,
    Worsening,
    Stable,
    /// Neutral metrics only
    Rising,
    Falling,
}

impl TrendStatus {
    pub fn classify(change: f64, metric: Metric) -> Self {
        if change.abs() <= metric.domain().span() * STATUS_BAND {
            return TrendStatus::Stable;
        }
        match (metric.polarity(), change > 0.0) {
            (MetricPolarity::HigherIsWorse, true) | (MetricPolarity::HigherIsBetter, false) => {
                TrendStatus::Worsening
            }
            (MetricPolarity::HigherIsWorse, false) | (MetricPolarity::HigherIsBetter, true) => {
                TrendStatus::Improving
            }
            (MetricPolarity::Neutral, true) => TrendStatus::Rising,
            (MetricPolarity::Neutral, false) => TrendStatus::Falling,
        }
    }
}

/// Per-metric summary of the display window with the fitted trend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendRecord {
    pub average: f64,
    pub current: f64,
    pub min: f64,
    pub max: f64,
    pub variance: f64,
    pub stability: Stability,
    /// Current value against the window average
    pub status: TrendStatus,
    /// End of the forecast horizon against the current value
    pub predicted_status: Option<TrendStatus>,
    pub regression: Option<RegressionResult>,
    pub forecast: Vec<ForecastPoint>,
    pub projected_7_days: Option<f64>,
    pub projected_30_days: Option<f64>,
    pub data_points: usize,
}

/// Everything one analysis call produces
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub entries_analyzed: usize,
    pub trends: BTreeMap<Metric, TrendRecord>,
    pub correlations: Vec<Correlation>,
    pub correlation_matrix: CorrelationMatrix,
    pub correlation_clusters: Vec<Vec<Metric>>,
    pub anomalies: Vec<Anomaly>,
    pub patterns: Vec<Pattern>,
    pub risk_factors: Vec<RiskFactor>,
    pub flare_risk: Option<FlareRisk>,
    pub advice: Vec<String>,
    pub day_profiles: Option<Vec<DayProfile>>,
}

/// Runs every analysis over a journal window
pub struct AnalysisEngine {
    config: AnalysisConfig,
    advice: AdviceProfile,
}

impl AnalysisEngine {
    pub fn new() -> Self {
        Self::with_config(AnalysisConfig::default())
    }

    pub fn with_config(config: AnalysisConfig) -> Self {
        Self {
            config,
            advice: AdviceProfile::default(),
        }
    }

    /// Use condition-specific advice text
    pub fn with_advice(mut self, advice: AdviceProfile) -> Self {
        self.advice = advice;
        self
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Analyze `display`, fitting models on `training` (or `display` when
    /// no training window is given)
    pub fn analyze(&self, display: &[LogEntry], training: Option<&[LogEntry]>) -> AnalysisResult {
        if display.is_empty() {
            info!("empty display window, nothing to analyze");
            return AnalysisResult::default();
        }
        let training = training.unwrap_or(display);

        let trends: BTreeMap<Metric, TrendRecord> = Metric::ALL
            .par_iter()
            .filter_map(|&metric| {
                self.trend_record(display, training, metric)
                    .map(|record| (metric, record))
            })
            .collect();

        let correlations = CorrelationAnalyzer::with_settings(
            self.config.correlation_threshold,
            self.config.min_correlation_days,
        );
        let correlation_matrix = correlations.matrix(display);
        let significant = correlations.significant_correlations(&correlation_matrix);
        let correlation_clusters = correlations.clusters(&correlation_matrix);

        let anomalies = AnomalyDetector::with_config(self.config.anomaly.clone()).detect(display);
        let patterns = PatternDetector::with_config(self.config.patterns.clone()).detect(display);

        let (risk_factors, flare_risk) =
            match RiskAssessor::with_config(self.config.risk.clone()).assess(training) {
                Some(assessment) => (assessment.factors, assessment.verdict),
                None => (Vec::new(), None),
            };

        let day_profiles = self
            .config
            .day_profiles
            .map(|settings| day_profiles(display, settings));

        let mut result = AnalysisResult {
            entries_analyzed: display.len(),
            trends,
            correlations: significant,
            correlation_matrix,
            correlation_clusters,
            anomalies,
            patterns,
            risk_factors,
            flare_risk,
            advice: Vec::new(),
            day_profiles,
        };
        result.advice = AdviceGenerator::new(&self.advice).generate(&result);

        info!(
            entries = result.entries_analyzed,
            trends = result.trends.len(),
            correlations = result.correlations.len(),
            anomalies = result.anomalies.len(),
            patterns = result.patterns.len(),
            flare_risk = result.flare_risk.is_some(),
            "analysis complete"
        );
        result
    }

    /// Summary and fitted trend for one metric, or `None` when the display
    /// window has no valid value for it
    pub fn trend_record(
        &self,
        display: &[LogEntry],
        training: &[LogEntry],
        metric: Metric,
    ) -> Option<TrendRecord> {
        let shown = MetricSeriesBuilder::build(display, metric);
        let current = shown.last()?.value;
        let values = shown.values();

        let average = values.iter().mean();
        let variance = values.iter().population_variance();
        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);

        let mut record = TrendRecord {
            average,
            current,
            min,
            max,
            variance,
            stability: Stability::classify(variance.sqrt(), metric),
            status: TrendStatus::classify(current - average, metric),
            predicted_status: None,
            regression: None,
            forecast: Vec::new(),
            projected_7_days: None,
            projected_30_days: None,
            data_points: shown.len(),
        };

        let history = MetricSeriesBuilder::build(training, metric);
        let Some(trend) = RegressionEngine::fit_series(&history) else {
            debug!(%metric, points = history.len(), "too few points for a trend");
            return Some(record);
        };
        debug!(%metric, model = ?trend.result.model_type, r2 = trend.result.r_squared, "trend fitted");

        let domain = metric.domain();
        record.forecast = ForecastProjector::forecast(
            &trend,
            metric,
            self.config.forecast_days,
            self.config.confidence_level,
        );
        record.predicted_status = record
            .forecast
            .last()
            .map(|point| TrendStatus::classify(point.value - current, metric));
        record.projected_7_days = Some(domain.snap(trend.predict_ahead(7)));
        record.projected_30_days = Some(domain.snap(trend.predict_ahead(30)));
        record.regression = Some(trend.result);

        Some(record)
    }
}

impl Default for AnalysisEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// Entries from the last `days` calendar days, counted back from the most
/// recent entry (inclusive)
pub fn display_window(logs: &[LogEntry], days: usize) -> Vec<LogEntry> {
    let Some(latest) = logs.iter().map(|e| e.date).max() else {
        return Vec::new();
    };
    let Some(start) = latest.checked_sub_days(Days::new(days.saturating_sub(1) as u64)) else {
        return logs.to_vec();
    };

    let mut window: Vec<LogEntry> = logs.iter().filter(|e| e.date >= start).cloned().collect();
    window.sort_by_key(|e| e.date);
    window
}
