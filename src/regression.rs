//! Regression models for symptom trends
//!
//! Three model families are fitted, in order of preference:
//!
//! 1. **Recency-weighted linear regression.** Point `i` of `n` carries weight
//!    `sqrt((i + 1) / n) + 0.5`, so the newest observation counts three times
//!    as much as the oldest.
//! 2. **Polynomial (degree <= 3)** via the normal equations, tried when the
//!    linear fit explains less than half the variance.
//! 3. **Lightweight autoregressive forecaster**, tried on longer, noisy
//!    series. Coefficients come from per-lag autocorrelation rather than a
//!    full Yule-Walker solve.
//!
//! A later model only replaces an earlier one when it clears that model's
//! improvement condition. Nothing here fails: insufficient data yields `None`.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::series::MetricSeries;

/// Linear R² below which the polynomial fallback is attempted
const POLYNOMIAL_TRIGGER_R2: f64 = 0.5;
/// R² gain the polynomial must exceed to be adopted
const POLYNOMIAL_MIN_GAIN: f64 = 0.1;
const MAX_POLYNOMIAL_DEGREE: usize = 3;

const AR_MIN_POINTS: usize = 10;
/// Linear R² below which the autoregressive model may be adopted
const AR_TRIGGER_R2: f64 = 0.6;
/// AR first-step error must be under this share of the linear error
const AR_IMPROVEMENT_RATIO: f64 = 0.8;
/// Number of steps the AR recursion is iterated
pub const AR_FORECAST_STEPS: usize = 7;
/// Lag-1 autocorrelation at which the series is differenced first
const AR_DIFFERENCING_THRESHOLD: f64 = 0.8;
/// Window used as the reference level for AR adoption
const RECENT_WINDOW: usize = 7;

/// Model family used for a trend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelType {
    Linear,
    Polynomial,
    Arima,
}

/// Summary statistics of the selected model
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegressionResult {
    /// Per-day change. For polynomial models this is the linear coefficient,
    /// for autoregressive models the mean per-step forecast change.
    pub slope: f64,
    pub intercept: f64,
    /// Coefficient of determination, always within [0, 1]
    pub r_squared: f64,
    pub standard_error: f64,
    pub model_type: ModelType,
}

/// Weighted least-squares line
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearFit {
    pub slope: f64,
    pub intercept: f64,
    pub r_squared: f64,
    pub standard_error: f64,
}

impl LinearFit {
    pub fn predict(&self, x: f64) -> f64 {
        self.slope * x + self.intercept
    }
}

/// Least-squares polynomial, coefficients in ascending power order
#[derive(Debug, Clone, PartialEq)]
pub struct PolynomialFit {
    pub coefficients: Vec<f64>,
    pub r_squared: f64,
    pub standard_error: f64,
}

impl PolynomialFit {
    pub fn predict(&self, x: f64) -> f64 {
        // Horner's scheme
        self.coefficients
            .iter()
            .rev()
            .fold(0.0, |acc, &c| acc * x + c)
    }

    pub fn degree(&self) -> usize {
        self.coefficients.len().saturating_sub(1)
    }
}

/// Autoregressive fit and its iterated forecasts
#[derive(Debug, Clone, PartialEq)]
pub struct ArFit {
    /// Per-lag coefficients, `coefficients[k - 1]` for lag `k`
    pub coefficients: Vec<f64>,
    /// Whether the recursion ran on first differences
    pub differenced: bool,
    /// Forecast levels for steps 1..=len after the last observation
    pub forecasts: Vec<f64>,
    pub last_value: f64,
    pub r_squared: f64,
    pub standard_error: f64,
}

impl ArFit {
    pub fn order(&self) -> usize {
        self.coefficients.len()
    }

    /// Mean change per forecast step
    pub fn mean_step(&self) -> f64 {
        match self.forecasts.last() {
            Some(&last) => (last - self.last_value) / self.forecasts.len() as f64,
            None => 0.0,
        }
    }
}

/// A fitted model that can be evaluated at any x (day offset)
#[derive(Debug, Clone, PartialEq)]
pub enum FittedModel {
    Linear(LinearFit),
    Polynomial(PolynomialFit),
    /// AR forecasts anchored after `last_x`; `baseline` covers x values at or
    /// before the last observation
    Autoregressive {
        fit: ArFit,
        baseline: LinearFit,
        last_x: f64,
    },
}

impl FittedModel {
    pub fn predict(&self, x: f64) -> f64 {
        match self {
            FittedModel::Linear(fit) => fit.predict(x),
            FittedModel::Polynomial(fit) => fit.predict(x),
            FittedModel::Autoregressive {
                fit,
                baseline,
                last_x,
            } => {
                let step = (x - last_x).round() as i64;
                if step <= 0 || fit.forecasts.is_empty() {
                    return baseline.predict(x);
                }
                let step = step as usize;
                match fit.forecasts.get(step - 1) {
                    Some(&value) => value,
                    None => {
                        let last = fit.forecasts[fit.forecasts.len() - 1];
                        last + fit.mean_step() * (step - fit.forecasts.len()) as f64
                    }
                }
            }
        }
    }

    pub fn model_type(&self) -> ModelType {
        match self {
            FittedModel::Linear(_) => ModelType::Linear,
            FittedModel::Polynomial(_) => ModelType::Polynomial,
            FittedModel::Autoregressive { .. } => ModelType::Arima,
        }
    }
}

/// Selected model for one training series
#[derive(Debug, Clone, PartialEq)]
pub struct TrendModel {
    pub result: RegressionResult,
    pub model: FittedModel,
    /// Number of training points
    pub n: usize,
    /// Day offset of the last training point
    pub last_x: f64,
}

impl TrendModel {
    pub fn predict(&self, x: f64) -> f64 {
        self.model.predict(x)
    }

    /// Prediction `days` after the last training point
    pub fn predict_ahead(&self, days: usize) -> f64 {
        self.predict(self.last_x + days as f64)
    }
}

/// Regression fitting and model selection
pub struct RegressionEngine;

impl RegressionEngine {
    /// Recency-weight for point `index` of `n`
    pub fn recency_weight(index: usize, n: usize) -> f64 {
        ((index + 1) as f64 / n as f64).sqrt() + 0.5
    }

    /// Recency-weighted linear regression. Needs at least two points.
    pub fn weighted_linear(xs: &[f64], ys: &[f64]) -> Option<LinearFit> {
        let n = xs.len();
        if n < 2 || ys.len() != n {
            return None;
        }

        let weights: Vec<f64> = (0..n).map(|i| Self::recency_weight(i, n)).collect();
        let weight_sum: f64 = weights.iter().sum();

        let mean_x = weights.iter().zip(xs).map(|(w, x)| w * x).sum::<f64>() / weight_sum;
        let mean_y = weights.iter().zip(ys).map(|(w, y)| w * y).sum::<f64>() / weight_sum;

        let mut numerator = 0.0;
        let mut denominator = 0.0;
        for i in 0..n {
            let dx = xs[i] - mean_x;
            numerator += weights[i] * dx * (ys[i] - mean_y);
            denominator += weights[i] * dx * dx;
        }

        let slope = if denominator.abs() < f64::EPSILON {
            0.0
        } else {
            numerator / denominator
        };
        let intercept = mean_y - slope * mean_x;

        let mut ss_res = 0.0;
        let mut ss_tot = 0.0;
        for i in 0..n {
            let residual = ys[i] - (slope * xs[i] + intercept);
            ss_res += weights[i] * residual * residual;
            ss_tot += weights[i] * (ys[i] - mean_y).powi(2);
        }

        Some(LinearFit {
            slope,
            intercept,
            r_squared: r_squared(ss_res, ss_tot),
            standard_error: standard_error(ss_res, n, 2),
        })
    }

    /// Unweighted least-squares polynomial of the given degree.
    ///
    /// Solves the normal equations `(VᵀV) c = Vᵀy` built from the Vandermonde
    /// matrix `V`. Returns `None` when there are too few points or the system
    /// is singular.
    pub fn polynomial(xs: &[f64], ys: &[f64], degree: usize) -> Option<PolynomialFit> {
        let n = xs.len();
        let size = degree + 1;
        if n < size || ys.len() != n || degree == 0 {
            return None;
        }

        // Power sums Σx^k for k in 0..=2·degree
        let mut power_sums = vec![0.0; 2 * degree + 1];
        let mut moments = vec![0.0; size];
        for (&x, &y) in xs.iter().zip(ys) {
            let mut power = 1.0;
            for (k, sum) in power_sums.iter_mut().enumerate() {
                *sum += power;
                if k < size {
                    moments[k] += power * y;
                }
                power *= x;
            }
        }

        let mut matrix: Vec<Vec<f64>> = (0..size)
            .map(|row| {
                let mut line: Vec<f64> = (0..size).map(|col| power_sums[row + col]).collect();
                line.push(moments[row]);
                line
            })
            .collect();

        let coefficients = solve_augmented(&mut matrix)?;
        let fit = PolynomialFit {
            coefficients,
            r_squared: 0.0,
            standard_error: 0.0,
        };

        let mean_y = ys.iter().sum::<f64>() / n as f64;
        let mut ss_res = 0.0;
        let mut ss_tot = 0.0;
        for (&x, &y) in xs.iter().zip(ys) {
            ss_res += (y - fit.predict(x)).powi(2);
            ss_tot += (y - mean_y).powi(2);
        }

        Some(PolynomialFit {
            r_squared: r_squared(ss_res, ss_tot),
            standard_error: standard_error(ss_res, n, size),
            ..fit
        })
    }

    /// Autoregressive fit over the raw values, iterated `steps` ahead.
    ///
    /// The order grows with history: AR(1) below 20 points, AR(2) below 30,
    /// AR(3) beyond. Strongly persistent series (lag-1 autocorrelation of at
    /// least 0.8) are differenced once and the forecasts re-integrated.
    pub fn autoregressive(values: &[f64], steps: usize) -> Option<ArFit> {
        let n = values.len();
        if n < AR_MIN_POINTS {
            return None;
        }

        let differenced = autocorrelation(values, 1) >= AR_DIFFERENCING_THRESHOLD;
        let work: Vec<f64> = if differenced {
            values.windows(2).map(|w| w[1] - w[0]).collect()
        } else {
            values.to_vec()
        };

        let order = match n {
            0..=19 => 1,
            20..=29 => 2,
            _ => 3,
        };
        let coefficients: Vec<f64> = (1..=order)
            .map(|lag| autocorrelation(&work, lag) / order as f64)
            .collect();

        let mean = work.iter().sum::<f64>() / work.len() as f64;
        let step_ahead = |history: &[f64]| -> f64 {
            coefficients
                .iter()
                .enumerate()
                .map(|(k, phi)| phi * (history[history.len() - 1 - k] - mean))
                .sum::<f64>()
                + mean
        };

        // In-sample one-step predictions, compared in level space
        let mut actual = Vec::new();
        let mut predicted = Vec::new();
        for t in order..work.len() {
            let next = step_ahead(&work[..t]);
            if differenced {
                actual.push(values[t + 1]);
                predicted.push(values[t] + next);
            } else {
                actual.push(values[t]);
                predicted.push(next);
            }
        }
        let actual_mean = actual.iter().sum::<f64>() / actual.len().max(1) as f64;
        let ss_res: f64 = actual
            .iter()
            .zip(&predicted)
            .map(|(a, p)| (a - p).powi(2))
            .sum();
        let ss_tot: f64 = actual.iter().map(|a| (a - actual_mean).powi(2)).sum();

        let mut history = work.clone();
        let mut forecasts = Vec::with_capacity(steps);
        let last_value = values[n - 1];
        let mut level = last_value;
        for _ in 0..steps {
            let next = step_ahead(&history);
            history.push(next);
            if differenced {
                level += next;
                forecasts.push(level);
            } else {
                forecasts.push(next);
            }
        }

        Some(ArFit {
            coefficients,
            differenced,
            forecasts,
            last_value,
            r_squared: r_squared(ss_res, ss_tot),
            standard_error: standard_error(ss_res, actual.len(), 2),
        })
    }

    /// Fit a series and select the model, or `None` below two points
    pub fn fit_series(series: &MetricSeries) -> Option<TrendModel> {
        Self::fit(&series.xs(), &series.values())
    }

    /// Fit `(xs, ys)` and select linear, polynomial or autoregressive
    pub fn fit(xs: &[f64], ys: &[f64]) -> Option<TrendModel> {
        let linear = Self::weighted_linear(xs, ys)?;
        let n = xs.len();
        let last_x = xs[n - 1];

        let mut model = FittedModel::Linear(linear);
        let mut result = RegressionResult {
            slope: linear.slope,
            intercept: linear.intercept,
            r_squared: linear.r_squared,
            standard_error: linear.standard_error,
            model_type: ModelType::Linear,
        };

        if linear.r_squared < POLYNOMIAL_TRIGGER_R2 && n >= 4 {
            let degree = MAX_POLYNOMIAL_DEGREE.min(n - 1);
            if let Some(poly) = Self::polynomial(xs, ys, degree) {
                if poly.r_squared > linear.r_squared + POLYNOMIAL_MIN_GAIN {
                    debug!(
                        linear_r2 = linear.r_squared,
                        poly_r2 = poly.r_squared,
                        "polynomial model adopted"
                    );
                    result = RegressionResult {
                        slope: poly.coefficients.get(1).copied().unwrap_or(0.0),
                        intercept: poly.coefficients[0],
                        r_squared: poly.r_squared,
                        standard_error: poly.standard_error,
                        model_type: ModelType::Polynomial,
                    };
                    model = FittedModel::Polynomial(poly);
                }
            }
        }

        if n >= AR_MIN_POINTS && linear.r_squared < AR_TRIGGER_R2 {
            if let Some(ar) = Self::autoregressive(ys, AR_FORECAST_STEPS) {
                let recent = &ys[n.saturating_sub(RECENT_WINDOW)..];
                let recent_mean = recent.iter().sum::<f64>() / recent.len() as f64;
                let linear_error = (linear.predict(last_x + 1.0) - recent_mean).abs();
                let ar_error = ar
                    .forecasts
                    .first()
                    .map(|f| (f - recent_mean).abs())
                    .unwrap_or(f64::INFINITY);

                if ar_error < AR_IMPROVEMENT_RATIO * linear_error {
                    debug!(ar_error, linear_error, order = ar.order(), "autoregressive model adopted");
                    result = RegressionResult {
                        slope: ar.mean_step(),
                        intercept: linear.intercept,
                        r_squared: ar.r_squared,
                        standard_error: ar.standard_error,
                        model_type: ModelType::Arima,
                    };
                    model = FittedModel::Autoregressive {
                        fit: ar,
                        baseline: linear,
                        last_x,
                    };
                }
            }
        }

        Some(TrendModel {
            result,
            model,
            n,
            last_x,
        })
    }
}

/// Pearson-style autocorrelation at `lag`
pub fn autocorrelation(values: &[f64], lag: usize) -> f64 {
    let n = values.len();
    if lag == 0 || n <= lag {
        return 0.0;
    }
    let mean = values.iter().sum::<f64>() / n as f64;
    let denominator: f64 = values.iter().map(|v| (v - mean).powi(2)).sum();
    if denominator.abs() < f64::EPSILON {
        return 0.0;
    }
    let numerator: f64 = (lag..n)
        .map(|t| (values[t] - mean) * (values[t - lag] - mean))
        .sum();
    numerator / denominator
}

fn r_squared(ss_res: f64, ss_tot: f64) -> f64 {
    if ss_tot.abs() < f64::EPSILON {
        return 0.0;
    }
    let r2 = 1.0 - ss_res / ss_tot;
    if r2.is_finite() {
        r2.clamp(0.0, 1.0)
    } else {
        0.0
    }
}

fn standard_error(ss_res: f64, n: usize, parameters: usize) -> f64 {
    if n > parameters {
        (ss_res / (n - parameters) as f64).sqrt()
    } else {
        0.0
    }
}

/// Gaussian elimination with partial (row) pivoting on an augmented matrix
fn solve_augmented(matrix: &mut [Vec<f64>]) -> Option<Vec<f64>> {
    let size = matrix.len();

    for col in 0..size {
        let pivot_row = (col..size).max_by(|&a, &b| {
            matrix[a][col]
                .abs()
                .partial_cmp(&matrix[b][col].abs())
                .unwrap_or(std::cmp::Ordering::Equal)
        })?;
        if matrix[pivot_row][col].abs() < 1e-12 {
            return None;
        }
        matrix.swap(col, pivot_row);

        for row in (col + 1)..size {
            let factor = matrix[row][col] / matrix[col][col];
            for k in col..=size {
                matrix[row][k] -= factor * matrix[col][k];
            }
        }
    }

    let mut solution = vec![0.0; size];
    for row in (0..size).rev() {
        let tail: f64 = ((row + 1)..size)
            .map(|k| matrix[row][k] * solution[k])
            .sum();
        solution[row] = (matrix[row][size] - tail) / matrix[row][row];
    }

    if solution.iter().all(|c| c.is_finite()) {
        Some(solution)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn indices(n: usize) -> Vec<f64> {
        (0..n).map(|i| i as f64).collect()
    }

    #[test]
    fn test_recency_weights() {
        assert!((RegressionEngine::recency_weight(3, 4) - 1.5).abs() < 1e-12);
        assert!(RegressionEngine::recency_weight(0, 100) > 0.5);
        assert!(RegressionEngine::recency_weight(0, 4) < RegressionEngine::recency_weight(1, 4));
    }

    #[test]
    fn test_increasing_series_fits_perfectly() {
        let xs = indices(12);
        let ys: Vec<f64> = (1..=12).map(|v| v as f64).collect();

        let model = RegressionEngine::fit(&xs, &ys).unwrap();
        assert!(model.result.slope > 0.0);
        assert!((model.result.slope - 1.0).abs() < 1e-9);
        assert!((model.result.r_squared - 1.0).abs() < 1e-9);
        assert_eq!(model.result.model_type, ModelType::Linear);
    }

    #[test]
    fn test_constant_series() {
        let xs = indices(10);
        let ys = vec![5.0; 10];

        let fit = RegressionEngine::weighted_linear(&xs, &ys).unwrap();
        assert!(fit.slope.abs() < 1e-12);
        assert_eq!(fit.r_squared, 0.0);
        assert!((fit.intercept - 5.0).abs() < 1e-9);
        assert_eq!(fit.standard_error, 0.0);
    }

    #[test]
    fn test_insufficient_points() {
        assert!(RegressionEngine::weighted_linear(&[1.0], &[3.0]).is_none());
        assert!(RegressionEngine::fit(&[], &[]).is_none());
    }

    #[test]
    fn test_two_points_have_no_standard_error() {
        let fit = RegressionEngine::weighted_linear(&[0.0, 1.0], &[2.0, 4.0]).unwrap();
        assert!((fit.slope - 2.0).abs() < 1e-9);
        assert_eq!(fit.standard_error, 0.0);
    }

    #[test]
    fn test_polynomial_recovers_quadratic() {
        let xs = indices(8);
        let ys: Vec<f64> = xs.iter().map(|x| 2.0 + 0.5 * x - 0.25 * x * x).collect();

        let fit = RegressionEngine::polynomial(&xs, &ys, 2).unwrap();
        assert!((fit.coefficients[0] - 2.0).abs() < 1e-6);
        assert!((fit.coefficients[1] - 0.5).abs() < 1e-6);
        assert!((fit.coefficients[2] + 0.25).abs() < 1e-6);
        assert!(fit.r_squared > 0.999);
    }

    #[test]
    fn test_polynomial_adopted_for_symmetric_curve() {
        // A parabola has no linear trend but a perfect quadratic fit
        let xs = indices(9);
        let ys: Vec<f64> = xs.iter().map(|x| (x - 4.0) * (x - 4.0) * 0.5).collect();

        let model = RegressionEngine::fit(&xs, &ys).unwrap();
        assert_eq!(model.result.model_type, ModelType::Polynomial);
        assert!(model.result.r_squared > 0.99);
        assert!((model.predict(4.0)).abs() < 1e-6);
    }

    #[test]
    fn test_polynomial_rejected_without_enough_gain() {
        // A zigzag has no curve for a cubic to follow
        let xs = indices(9);
        let ys: Vec<f64> = (0..9).map(|i| if i % 2 == 0 { 4.0 } else { 2.0 }).collect();

        let linear = RegressionEngine::weighted_linear(&xs, &ys).unwrap();
        let poly = RegressionEngine::polynomial(&xs, &ys, MAX_POLYNOMIAL_DEGREE).unwrap();
        assert!(linear.r_squared < POLYNOMIAL_TRIGGER_R2);
        assert!(poly.r_squared <= linear.r_squared + POLYNOMIAL_MIN_GAIN);

        let model = RegressionEngine::fit(&xs, &ys).unwrap();
        assert_eq!(model.result.model_type, ModelType::Linear);
        assert_eq!(model.result.r_squared, linear.r_squared);
    }

    #[test]
    fn test_singular_system() {
        // All x identical: the normal equations are singular
        let xs = vec![2.0; 6];
        let ys = vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
        assert!(RegressionEngine::polynomial(&xs, &ys, 2).is_none());
    }

    #[test]
    fn test_autocorrelation() {
        let alternating: Vec<f64> = (0..20).map(|i| if i % 2 == 0 { 1.0 } else { -1.0 }).collect();
        assert!(autocorrelation(&alternating, 1) < -0.9);
        assert_eq!(autocorrelation(&[3.0; 10], 1), 0.0);
        assert_eq!(autocorrelation(&[1.0, 2.0], 5), 0.0);
    }

    #[test]
    fn test_autoregressive_requires_history() {
        let values: Vec<f64> = (0..9).map(|v| v as f64).collect();
        assert!(RegressionEngine::autoregressive(&values, 7).is_none());
    }

    #[test]
    fn test_autoregressive_forecast_count_and_order() {
        let values: Vec<f64> = (0..24)
            .map(|i| 5.0 + if i % 3 == 0 { 1.0 } else { -0.5 })
            .collect();
        let ar = RegressionEngine::autoregressive(&values, 7).unwrap();

        assert_eq!(ar.forecasts.len(), 7);
        assert_eq!(ar.order(), 2);
        assert!(!ar.differenced);
        assert!((0.0..=1.0).contains(&ar.r_squared));
    }

    #[test]
    fn test_autoregressive_differences_trending_series() {
        let values: Vec<f64> = (0..20).map(|i| i as f64 * 0.5).collect();
        let ar = RegressionEngine::autoregressive(&values, 3).unwrap();

        assert!(ar.differenced);
        // Constant differences carry the trend forward
        assert!((ar.forecasts[0] - 10.0).abs() < 1e-9);
        assert!((ar.forecasts[2] - 11.0).abs() < 1e-9);
        assert!((ar.mean_step() - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_autoregressive_adoption_on_oscillating_series() {
        // Sawtooth with a level shift at the end: the weighted line overshoots,
        // the AR recursion stays near the recent level
        let mut ys: Vec<f64> = (0..20)
            .map(|i| if i % 2 == 0 { 3.0 } else { 7.0 })
            .collect();
        ys.extend_from_slice(&[5.0, 5.0, 5.0, 5.0, 5.0, 5.0, 5.0]);
        let xs = indices(ys.len());

        let model = RegressionEngine::fit(&xs, &ys).unwrap();
        assert_eq!(model.result.model_type, ModelType::Arima);
        assert!((0.0..=1.0).contains(&model.result.r_squared));
        let next = model.predict_ahead(1);
        assert!((next - 5.0).abs() < 2.0);
    }

    #[test]
    fn test_noisy_trend_keeps_linear_model() {
        // Steady climb with a small zigzag: linear R² stays well above 0.6
        let xs = indices(20);
        let ys: Vec<f64> = (0..20)
            .map(|i| 2.0 + 0.3 * i as f64 + if i % 2 == 0 { 0.3 } else { -0.3 })
            .collect();

        let linear = RegressionEngine::weighted_linear(&xs, &ys).unwrap();
        assert!(linear.r_squared >= AR_TRIGGER_R2);

        let model = RegressionEngine::fit(&xs, &ys).unwrap();
        assert_eq!(model.result.model_type, ModelType::Linear);
        assert!((model.result.slope - 0.3).abs() < 0.05);
    }

    #[test]
    fn test_fitted_model_ar_extrapolates_past_forecasts() {
        let fit = ArFit {
            coefficients: vec![0.5],
            differenced: false,
            forecasts: vec![5.0, 6.0],
            last_value: 4.0,
            r_squared: 0.5,
            standard_error: 0.1,
        };
        let model = FittedModel::Autoregressive {
            fit,
            baseline: LinearFit {
                slope: 0.0,
                intercept: 4.0,
                r_squared: 0.0,
                standard_error: 0.0,
            },
            last_x: 10.0,
        };

        assert_eq!(model.predict(9.0), 4.0);
        assert_eq!(model.predict(11.0), 5.0);
        assert_eq!(model.predict(12.0), 6.0);
        assert!((model.predict(13.0) - 7.0).abs() < 1e-9);
        assert_eq!(model.model_type(), ModelType::Arima);
    }
}
