// Library interface for FlareWatch modules
// The CLI and integration tests both go through these exports

pub mod advice;
pub mod analysis;
pub mod anomaly;
pub mod clustering;
pub mod config;
pub mod correlation;
pub mod error;
pub mod forecast;
pub mod import;
pub mod logging;
pub mod models;
pub mod patterns;
pub mod regression;
pub mod risk;
pub mod series;

// Re-export commonly used types for convenience
pub use models::*;
pub use analysis::{AnalysisConfig, AnalysisEngine, AnalysisResult, TrendRecord};
pub use advice::AdviceProfile;
pub use regression::{RegressionEngine, RegressionResult};
pub use forecast::ForecastProjector;
pub use correlation::CorrelationAnalyzer;
pub use anomaly::AnomalyDetector;
pub use patterns::PatternDetector;
pub use risk::RiskAssessor;
pub use series::MetricSeriesBuilder;
pub use error::{FlareWatchError, Result};
pub use logging::{LogConfig, LogFormat, LogLevel};
