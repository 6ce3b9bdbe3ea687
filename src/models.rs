use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

/// Tracked measurement in a journal entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Metric {
    Fatigue,
    Stiffness,
    #[serde(alias = "legacyPain")]
    BackPain,
    Sleep,
    JointPain,
    Mobility,
    DailyFunction,
    Swelling,
    Mood,
    Irritability,
    WeatherSensitivity,
    Bpm,
    Weight,
    Steps,
    Hydration,
}

impl Metric {
    /// Every tracked metric, in the fixed order used for scans and matrices
    pub const ALL: [Metric; 15] = [
        Metric::Fatigue,
        Metric::Stiffness,
        Metric::BackPain,
        Metric::Sleep,
        Metric::JointPain,
        Metric::Mobility,
        Metric::DailyFunction,
        Metric::Swelling,
        Metric::Mood,
        Metric::Irritability,
        Metric::WeatherSensitivity,
        Metric::Bpm,
        Metric::Weight,
        Metric::Steps,
        Metric::Hydration,
    ];

    /// The 0-10 self-report sliders
    pub const SLIDERS: [Metric; 11] = [
        Metric::Fatigue,
        Metric::Stiffness,
        Metric::BackPain,
        Metric::Sleep,
        Metric::JointPain,
        Metric::Mobility,
        Metric::DailyFunction,
        Metric::Swelling,
        Metric::Mood,
        Metric::Irritability,
        Metric::WeatherSensitivity,
    ];

    /// Identifier used in serialized output and seeds
    pub fn key(&self) -> &'static str {
        match self {
            Metric::Fatigue => "fatigue",
            Metric::Stiffness => "stiffness",
            Metric::BackPain => "backPain",
            Metric::Sleep => "sleep",
            Metric::JointPain => "jointPain",
            Metric::Mobility => "mobility",
            Metric::DailyFunction => "dailyFunction",
            Metric::Swelling => "swelling",
            Metric::Mood => "mood",
            Metric::Irritability => "irritability",
            Metric::WeatherSensitivity => "weatherSensitivity",
            Metric::Bpm => "bpm",
            Metric::Weight => "weight",
            Metric::Steps => "steps",
            Metric::Hydration => "hydration",
        }
    }

    /// Human-readable label
    pub fn label(&self) -> &'static str {
        match self {
            Metric::Fatigue => "Fatigue",
            Metric::Stiffness => "Stiffness",
            Metric::BackPain => "Back Pain",
            Metric::Sleep => "Sleep",
            Metric::JointPain => "Joint Pain",
            Metric::Mobility => "Mobility",
            Metric::DailyFunction => "Daily Function",
            Metric::Swelling => "Swelling",
            Metric::Mood => "Mood",
            Metric::Irritability => "Irritability",
            Metric::WeatherSensitivity => "Weather Sensitivity",
            Metric::Bpm => "BPM",
            Metric::Weight => "Weight",
            Metric::Steps => "Steps",
            Metric::Hydration => "Hydration",
        }
    }

    /// Valid range for values of this metric
    pub fn domain(&self) -> MetricDomain {
        match self {
            Metric::Bpm => MetricDomain::new(30.0, 200.0, 1.0, 1.0),
            Metric::Weight => MetricDomain::new(30.0, 300.0, 0.1, 0.2),
            Metric::Steps => MetricDomain::new(0.0, 50_000.0, 1.0, 250.0),
            Metric::Hydration => MetricDomain::new(0.0, 20.0, 0.1, 0.2),
            _ => MetricDomain::new(0.0, 10.0, 0.1, 0.2),
        }
    }

    /// Whether zero means "not logged" for this metric
    pub fn requires_positive(&self) -> bool {
        matches!(self, Metric::Bpm | Metric::Weight)
    }

    pub fn polarity(&self) -> MetricPolarity {
        match self {
            Metric::Fatigue
            | Metric::Stiffness
            | Metric::BackPain
            | Metric::JointPain
            | Metric::Swelling
            | Metric::Irritability
            | Metric::WeatherSensitivity => MetricPolarity::HigherIsWorse,
            Metric::Sleep
            | Metric::Mobility
            | Metric::DailyFunction
            | Metric::Mood
            | Metric::Steps
            | Metric::Hydration => MetricPolarity::HigherIsBetter,
            Metric::Bpm | Metric::Weight => MetricPolarity::Neutral,
        }
    }

    pub fn is_slider(&self) -> bool {
        Self::SLIDERS.contains(self)
    }

    /// Stable per-metric seed derived from the metric identifier (FNV-1a)
    pub fn seed(&self) -> u64 {
        self.key().bytes().fold(0xcbf2_9ce4_8422_2325_u64, |hash, byte| {
            (hash ^ byte as u64).wrapping_mul(0x0000_0100_0000_01b3)
        })
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl FromStr for Metric {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_lowercase();

        if normalized == "legacypain" {
            return Ok(Metric::BackPain);
        }

        Metric::ALL
            .iter()
            .find(|m| m.key().to_lowercase() == normalized)
            .copied()
            .ok_or_else(|| format!("Unknown metric: {}", s))
    }
}

/// Whether a rising value is good or bad news for the person logging it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MetricPolarity {
    HigherIsWorse,
    HigherIsBetter,
    Neutral,
}

/// Declared numeric range of a metric, with display granularity
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MetricDomain {
    pub min: f64,
    pub max: f64,
    /// Smallest distinguishable display increment
    pub precision: f64,
    /// Increment used when a forecast needs a synthetic step
    pub forced_step: f64,
}

impl MetricDomain {
    pub const fn new(min: f64, max: f64, precision: f64, forced_step: f64) -> Self {
        Self {
            min,
            max,
            precision,
            forced_step,
        }
    }

    pub fn span(&self) -> f64 {
        self.max - self.min
    }

    pub fn contains(&self, value: f64) -> bool {
        value.is_finite() && value >= self.min && value <= self.max
    }

    pub fn clamp(&self, value: f64) -> f64 {
        if value.is_nan() {
            return self.min;
        }
        value.clamp(self.min, self.max)
    }

    /// Value expressed in whole display increments
    pub fn to_ticks(&self, value: f64) -> i64 {
        (value / self.precision).round() as i64
    }

    pub fn from_ticks(&self, ticks: i64) -> f64 {
        ticks as f64 * self.precision
    }

    /// Clamp, then snap to the display grid
    pub fn snap(&self, value: f64) -> f64 {
        let ticks = self
            .to_ticks(self.clamp(value))
            .clamp(self.to_ticks(self.min), self.to_ticks(self.max));
        self.from_ticks(ticks)
    }
}

/// Parse a raw textual measurement into a number, if it is one.
///
/// Empty strings and anything non-numeric yield `None` rather than a
/// substitute value, so "absent" stays distinguishable from zero.
pub fn parse_metric_value(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// One calendar day of self-report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEntry {
    pub date: NaiveDate,

    #[serde(default, deserialize_with = "deserialize_metric")]
    pub fatigue: Option<f64>,
    #[serde(default, deserialize_with = "deserialize_metric")]
    pub stiffness: Option<f64>,
    /// General pain slider, called `legacyPain` by older exports
    #[serde(default, alias = "legacyPain", deserialize_with = "deserialize_metric")]
    pub back_pain: Option<f64>,
    #[serde(default, deserialize_with = "deserialize_metric")]
    pub sleep: Option<f64>,
    #[serde(default, deserialize_with = "deserialize_metric")]
    pub joint_pain: Option<f64>,
    #[serde(default, deserialize_with = "deserialize_metric")]
    pub mobility: Option<f64>,
    #[serde(default, deserialize_with = "deserialize_metric")]
    pub daily_function: Option<f64>,
    #[serde(default, deserialize_with = "deserialize_metric")]
    pub swelling: Option<f64>,
    #[serde(default, deserialize_with = "deserialize_metric")]
    pub mood: Option<f64>,
    #[serde(default, deserialize_with = "deserialize_metric")]
    pub irritability: Option<f64>,
    #[serde(default, deserialize_with = "deserialize_metric")]
    pub weather_sensitivity: Option<f64>,

    /// Resting heart rate, 30-200
    #[serde(default, deserialize_with = "deserialize_metric")]
    pub bpm: Option<f64>,
    /// Body weight in kg, 30-300
    #[serde(default, deserialize_with = "deserialize_metric")]
    pub weight: Option<f64>,
    #[serde(default, deserialize_with = "deserialize_metric")]
    pub steps: Option<f64>,
    /// Glasses of water, 0-20
    #[serde(default, deserialize_with = "deserialize_metric")]
    pub hydration: Option<f64>,

    #[serde(default, deserialize_with = "deserialize_flare")]
    pub flare: bool,

    #[serde(default)]
    pub symptoms: Vec<String>,
    #[serde(default)]
    pub stressors: Vec<String>,
    #[serde(default)]
    pub pain_location: Option<String>,
    #[serde(default)]
    pub food: Vec<String>,
    #[serde(default)]
    pub exercise: Vec<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl LogEntry {
    /// Empty entry for a date; every measurement absent
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            fatigue: None,
            stiffness: None,
            back_pain: None,
            sleep: None,
            joint_pain: None,
            mobility: None,
            daily_function: None,
            swelling: None,
            mood: None,
            irritability: None,
            weather_sensitivity: None,
            bpm: None,
            weight: None,
            steps: None,
            hydration: None,
            flare: false,
            symptoms: Vec::new(),
            stressors: Vec::new(),
            pain_location: None,
            food: Vec::new(),
            exercise: Vec::new(),
            notes: None,
        }
    }

    /// Raw recorded value, whether or not it is in range
    pub fn raw_value(&self, metric: Metric) -> Option<f64> {
        match metric {
            Metric::Fatigue => self.fatigue,
            Metric::Stiffness => self.stiffness,
            Metric::BackPain => self.back_pain,
            Metric::Sleep => self.sleep,
            Metric::JointPain => self.joint_pain,
            Metric::Mobility => self.mobility,
            Metric::DailyFunction => self.daily_function,
            Metric::Swelling => self.swelling,
            Metric::Mood => self.mood,
            Metric::Irritability => self.irritability,
            Metric::WeatherSensitivity => self.weather_sensitivity,
            Metric::Bpm => self.bpm,
            Metric::Weight => self.weight,
            Metric::Steps => self.steps,
            Metric::Hydration => self.hydration,
        }
    }

    /// Recorded value if it lies in the metric's domain (and is positive
    /// where zero means "not logged")
    pub fn value(&self, metric: Metric) -> Option<f64> {
        self.raw_value(metric).filter(|&v| {
            metric.domain().contains(v) && (!metric.requires_positive() || v > 0.0)
        })
    }

    pub fn set_value(&mut self, metric: Metric, value: Option<f64>) {
        let slot = match metric {
            Metric::Fatigue => &mut self.fatigue,
            Metric::Stiffness => &mut self.stiffness,
            Metric::BackPain => &mut self.back_pain,
            Metric::Sleep => &mut self.sleep,
            Metric::JointPain => &mut self.joint_pain,
            Metric::Mobility => &mut self.mobility,
            Metric::DailyFunction => &mut self.daily_function,
            Metric::Swelling => &mut self.swelling,
            Metric::Mood => &mut self.mood,
            Metric::Irritability => &mut self.irritability,
            Metric::WeatherSensitivity => &mut self.weather_sensitivity,
            Metric::Bpm => &mut self.bpm,
            Metric::Weight => &mut self.weight,
            Metric::Steps => &mut self.steps,
            Metric::Hydration => &mut self.hydration,
        };
        *slot = value;
    }

    /// Builder-style setter, convenient for fixtures
    pub fn with(mut self, metric: Metric, value: f64) -> Self {
        self.set_value(metric, Some(value));
        self
    }

    pub fn with_flare(mut self, flare: bool) -> Self {
        self.flare = flare;
        self
    }
}

/// Interpret the many spellings of the flare flag ("Yes", "true", 1, ...)
pub fn parse_flare(raw: &str) -> bool {
    matches!(
        raw.trim().to_lowercase().as_str(),
        "yes" | "y" | "true" | "1" | "flare"
    )
}

fn deserialize_flare<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum FlareRepr {
        Bool(bool),
        Number(f64),
        Text(String),
    }

    Ok(match Option::<FlareRepr>::deserialize(deserializer)? {
        Some(FlareRepr::Bool(b)) => b,
        Some(FlareRepr::Number(n)) => n != 0.0,
        Some(FlareRepr::Text(s)) => parse_flare(&s),
        None => false,
    })
}

/// Accept a number, a numeric string or null; blank and non-numeric strings
/// become `None`
fn deserialize_metric<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum MetricRepr {
        Number(f64),
        Text(String),
    }

    Ok(match Option::<MetricRepr>::deserialize(deserializer)? {
        Some(MetricRepr::Number(n)) => Some(n).filter(|v| v.is_finite()),
        Some(MetricRepr::Text(s)) => parse_metric_value(&s),
        None => None,
    })
}

/// Sort a log collection by date without mutating the caller's copy
pub fn sorted_by_date(logs: &[LogEntry]) -> Vec<&LogEntry> {
    let mut sorted: Vec<&LogEntry> = logs.iter().collect();
    sorted.sort_by_key(|entry| entry.date);
    sorted
}
