use chrono::NaiveDate;
use flarewatch::analysis::TrendStatus;
use flarewatch::correlation::CorrelationDirection;
use flarewatch::regression::ModelType;
use flarewatch::risk::RiskLevel;
use flarewatch::{AnalysisConfig, AnalysisEngine, LogEntry, Metric};

/// Integration tests that run complete analyses over synthetic journals

#[cfg(test)]
mod integration_tests {
    use super::*;

    fn day(n: u64) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap() + chrono::Days::new(n)
    }

    /// Back pain climbing 2 -> 9, sleep falling 8 -> 3, fatigue mirroring sleep
    fn worsening_month() -> Vec<LogEntry> {
        (0..30)
            .map(|i| {
                let t = i as f64 / 29.0;
                LogEntry::new(day(i))
                    .with(Metric::BackPain, 2.0 + 7.0 * t)
                    .with(Metric::Sleep, 8.0 - 5.0 * t)
                    .with(Metric::Fatigue, 3.0 + 5.0 * t)
            })
            .collect()
    }

    #[test]
    fn test_worsening_month_trends_and_correlations() {
        let logs = worsening_month();
        let result = AnalysisEngine::new().analyze(&logs, None);

        let pain = &result.trends[&Metric::BackPain];
        let pain_regression = pain.regression.as_ref().unwrap();
        assert!(pain_regression.slope > 0.0);
        assert!(pain_regression.r_squared > 0.99);
        assert_eq!(pain_regression.model_type, ModelType::Linear);
        assert_eq!(pain.forecast.len(), 7);

        let sleep = &result.trends[&Metric::Sleep];
        assert!(sleep.regression.as_ref().unwrap().slope < 0.0);
        assert_eq!(sleep.status, TrendStatus::Worsening);

        assert!(result.correlation_matrix.get(Metric::Sleep, Metric::Fatigue) < -0.3);
        let sleep_fatigue = result
            .correlations
            .iter()
            .find(|c| {
                (c.first == Metric::Sleep && c.second == Metric::Fatigue)
                    || (c.first == Metric::Fatigue && c.second == Metric::Sleep)
            })
            .expect("sleep and fatigue should be reported");
        assert_eq!(sleep_fatigue.direction, CorrelationDirection::Negative);
        assert!(sleep_fatigue.description.contains("decreases with"));
    }

    #[test]
    fn test_forecasts_stay_in_domain() {
        let logs = worsening_month();
        let engine = AnalysisEngine::with_config(AnalysisConfig {
            forecast_days: 90,
            ..AnalysisConfig::default()
        });
        let result = engine.analyze(&logs, None);

        for (metric, record) in &result.trends {
            let domain = metric.domain();
            assert_eq!(record.forecast.len(), 90);
            for point in &record.forecast {
                assert!(domain.contains(point.value), "{metric}: {}", point.value);
                assert!(point.lower <= point.value && point.value <= point.upper);
            }
        }
    }

    #[test]
    fn test_flat_journal_is_quiet() {
        let logs: Vec<LogEntry> = (0..20)
            .map(|i| {
                Metric::ALL
                    .iter()
                    .fold(LogEntry::new(day(i)), |entry, &metric| entry.with(metric, 5.0))
            })
            .collect();

        let result = AnalysisEngine::new().analyze(&logs, None);

        let fatigue = &result.trends[&Metric::Fatigue];
        assert!(fatigue.regression.as_ref().unwrap().slope.abs() < 1e-9);
        assert_eq!(fatigue.average, 5.0);
        // 5 is outside the heart-rate and weight domains
        assert!(!result.trends.contains_key(&Metric::Bpm));
        assert!(!result.trends.contains_key(&Metric::Weight));

        assert!(result.correlations.is_empty());
        assert!(result.correlation_clusters.is_empty());
        assert!(result.anomalies.is_empty());
        assert!(result.patterns.is_empty());
        assert!(result.flare_risk.is_none());
        assert!(result.risk_factors.is_empty());
    }

    #[test]
    fn test_repeat_of_pre_flare_days_raises_risk() {
        let build_up = |date| {
            LogEntry::new(date)
                .with(Metric::BackPain, 7.0)
                .with(Metric::Stiffness, 6.0)
                .with(Metric::Fatigue, 8.0)
                .with(Metric::Swelling, 4.0)
                .with(Metric::Mood, 3.0)
        };
        let calm = |date| {
            LogEntry::new(date)
                .with(Metric::BackPain, 2.0)
                .with(Metric::Stiffness, 2.0)
                .with(Metric::Fatigue, 2.0)
                .with(Metric::Swelling, 1.0)
                .with(Metric::Mood, 8.0)
        };

        let mut logs: Vec<LogEntry> = (0..8).map(|i| calm(day(i))).collect();
        logs.extend((8..11).map(|i| build_up(day(i))));
        logs.push(build_up(day(11)).with_flare(true));
        logs.extend((12..18).map(|i| calm(day(i))));
        logs.extend((18..21).map(|i| build_up(day(i))));

        let result = AnalysisEngine::new().analyze(&logs, None);
        let risk = result.flare_risk.expect("recent days match the build-up");
        assert_eq!(risk.similarity, 1.0);
        assert_eq!(risk.confidence, 100);
        assert_eq!(risk.level, RiskLevel::High);
        assert_eq!(result.risk_factors.len(), 5);
        assert!(result.advice[0].contains("100% match"));
    }

    #[test]
    fn test_training_window_extends_history() {
        let training = worsening_month();
        let display = &training[23..];

        let result = AnalysisEngine::new().analyze(display, Some(&training));
        let pain = &result.trends[&Metric::BackPain];

        assert_eq!(result.entries_analyzed, 7);
        assert_eq!(pain.data_points, 7);
        // Fitted on all 30 days
        let expected_slope = 7.0 / 29.0;
        assert!((pain.regression.as_ref().unwrap().slope - expected_slope).abs() < 1e-9);
    }

    #[test]
    fn test_result_serializes_with_camel_case_keys() {
        let result = AnalysisEngine::new().analyze(&worsening_month(), None);
        let json = serde_json::to_value(&result).unwrap();

        assert!(json["trends"]["backPain"]["regression"]["rSquared"].is_number());
        assert_eq!(json["trends"]["backPain"]["regression"]["modelType"], "linear");
        assert!(json["correlationMatrix"].is_object());
        assert!(json["flareRisk"].is_null());
    }
}
