//! Plain-language suggestions derived from an analysis result
//!
//! All condition-specific wording lives in an [`AdviceProfile`] that the
//! caller passes in; nothing here depends on ambient state.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::analysis::{AnalysisResult, TrendStatus};
use crate::anomaly::{AnomalyKind, Severity};
use crate::models::Metric;
use crate::risk::RiskLevel;

/// Condition-specific advice text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdviceProfile {
    /// Condition the journal is kept for, used in messages
    pub condition: String,
    /// Shown when the recent days resemble past pre-flare days
    pub flare_guidance: String,
    /// Shown when flares are frequent in the window
    pub frequent_flare_guidance: String,
    /// Shown when nothing specific applies
    pub general: Vec<String>,
    /// Suggestions for a metric that is trending the wrong way, keyed by
    /// metric key such as `backPain`
    pub metric_tips: BTreeMap<String, String>,
}

impl Default for AdviceProfile {
    fn default() -> Self {
        let metric_tips = [
            (
                Metric::BackPain,
                "Gentle stretching and alternating heat and cold can ease back pain",
            ),
            (
                Metric::Stiffness,
                "Short mobility routines through the day help limit stiffness",
            ),
            (
                Metric::Fatigue,
                "Pace activities and plan rest breaks before you need them",
            ),
            (
                Metric::Sleep,
                "Keep a regular bedtime and limit screens in the hour before sleep",
            ),
            (
                Metric::Swelling,
                "Elevate swollen joints and note any foods logged before swelling days",
            ),
            (
                Metric::Mood,
                "Low mood often follows pain; consider talking it through with someone you trust",
            ),
            (
                Metric::Hydration,
                "Keep a water bottle within reach to raise daily intake",
            ),
            (
                Metric::Steps,
                "Short, frequent walks keep activity up without overloading joints",
            ),
        ]
        .into_iter()
        .map(|(metric, tip)| (metric.key().to_string(), tip.to_string()))
        .collect();

        Self {
            condition: "chronic inflammatory condition".to_string(),
            flare_guidance: "Recent days look like the lead-up to past flares. Prioritise rest, \
                             keep medication on schedule and contact your care team if symptoms escalate"
                .to_string(),
            frequent_flare_guidance: "Flares are frequent in this period; bring this log to your \
                                      next appointment to review your treatment plan"
                .to_string(),
            metric_tips,
            general: vec![
                "Keep logging daily; trends become more reliable with every entry".to_string(),
            ],
        }
    }
}

/// Builds advice from an [`AnalysisResult`] using one profile
pub struct AdviceGenerator<'a> {
    profile: &'a AdviceProfile,
}

impl<'a> AdviceGenerator<'a> {
    pub fn new(profile: &'a AdviceProfile) -> Self {
        Self { profile }
    }

    pub fn generate(&self, result: &AnalysisResult) -> Vec<String> {
        let mut advice = Vec::new();

        if let Some(risk) = &result.flare_risk {
            if risk.level >= RiskLevel::Moderate {
                advice.push(format!(
                    "{} ({}% match with your pre-flare pattern)",
                    self.profile.flare_guidance, risk.confidence
                ));
            }
        }

        let frequent_flares = result
            .anomalies
            .iter()
            .any(|a| a.kind == AnomalyKind::FlareFrequency && a.severity == Severity::High);
        if frequent_flares {
            advice.push(self.profile.frequent_flare_guidance.clone());
        }

        for (metric, record) in &result.trends {
            let worsening = record.status == TrendStatus::Worsening
                || record.predicted_status == Some(TrendStatus::Worsening);
            if !worsening {
                continue;
            }
            if let Some(tip) = self.profile.metric_tips.get(metric.key()) {
                advice.push(tip.clone());
            }
        }

        if let Some(strongest) = result.correlations.first() {
            advice.push(format!(
                "{} and {} are closely linked in your log; improving one may help the other",
                strongest.first.label(),
                strongest.second.label()
            ));
        }

        if advice.is_empty() {
            advice.extend(self.profile.general.iter().cloned());
        }
        advice
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{Stability, TrendRecord};
    use crate::risk::FlareRisk;

    fn record(status: TrendStatus) -> TrendRecord {
        TrendRecord {
            average: 5.0,
            current: 7.0,
            min: 3.0,
            max: 7.0,
            variance: 1.0,
            stability: Stability::Stable,
            status,
            predicted_status: None,
            regression: None,
            forecast: Vec::new(),
            projected_7_days: None,
            projected_30_days: None,
            data_points: 10,
        }
    }

    #[test]
    fn test_general_advice_when_nothing_stands_out() {
        let profile = AdviceProfile::default();
        let advice = AdviceGenerator::new(&profile).generate(&AnalysisResult::default());
        assert_eq!(advice, profile.general);
    }

    #[test]
    fn test_tips_come_from_the_profile() {
        let mut profile = AdviceProfile::default();
        profile
            .metric_tips
            .insert("fatigue".to_string(), "Try a short afternoon rest".to_string());

        let mut result = AnalysisResult::default();
        result.trends.insert(Metric::Fatigue, record(TrendStatus::Worsening));
        result.trends.insert(Metric::Mood, record(TrendStatus::Improving));

        let advice = AdviceGenerator::new(&profile).generate(&result);
        assert_eq!(advice, vec!["Try a short afternoon rest".to_string()]);
    }

    #[test]
    fn test_flare_risk_leads() {
        let profile = AdviceProfile {
            flare_guidance: "Rest up".to_string(),
            ..AdviceProfile::default()
        };
        let result = AnalysisResult {
            flare_risk: Some(FlareRisk {
                level: RiskLevel::High,
                confidence: 91,
                similarity: 0.91,
                matching_metrics: 4,
            }),
            ..AnalysisResult::default()
        };

        let advice = AdviceGenerator::new(&profile).generate(&result);
        assert_eq!(advice[0], "Rest up (91% match with your pre-flare pattern)");
    }
}
