//! Classical seasonal decomposition (moving-average method).
//!
//! For a series `x` with seasonal period `p`:
//!
//! ```text
//! trend_t    = centred moving average of x (window p; 2×p for even p)
//! detrended  = x - trend        (additive)     | x / trend        (multiplicative)
//! season_k   = mean(detrended at positions ≡ k mod p), re-centred
//! resid      = x - trend - seas (additive)     | x / (trend·seas) (multiplicative)
//! ```
//!
//! The trend is undefined for the first and last `p / 2` points, so `trend` and
//! `resid` are `None` there. The seasonal component is defined everywhere.

use serde::Serialize;

use crate::error::AnalysisError;

/// How the components combine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DecompositionModel {
    /// `x = trend + seasonal + resid`
    Additive,
    /// `x = trend * seasonal * resid` (requires strictly positive data)
    Multiplicative,
}

/// Four aligned components of equal length.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Decomposition {
    pub model: DecompositionModel,
    pub period: usize,
    pub observed: Vec<f64>,
    pub trend: Vec<Option<f64>>,
    pub seasonal: Vec<f64>,
    pub resid: Vec<Option<f64>>,
}

/// Decompose `values` into trend, seasonal and residual components.
///
/// Requires at least two full periods of data.
pub fn decompose(
    values: &[f64],
    period: usize,
    model: DecompositionModel,
) -> Result<Decomposition, AnalysisError> {
    if period < 2 {
        return Err(AnalysisError::InvalidConfig(format!(
            "seasonal period must be >= 2, got {period}"
        )));
    }
    let needed = 2 * period;
    if values.len() < needed {
        return Err(AnalysisError::InsufficientData {
            needed,
            actual: values.len(),
        });
    }
    if values.iter().any(|v| !v.is_finite()) {
        return Err(AnalysisError::malformed(None, "decomposition input contains non-finite values"));
    }
    if model == DecompositionModel::Multiplicative && values.iter().any(|&v| v <= 0.0) {
        return Err(AnalysisError::malformed(
            None,
            "multiplicative decomposition requires strictly positive values",
        ));
    }

    let trend = centered_moving_average(values, period);

    // Per-position mean of the detrended series.
    let mut sums = vec![0.0; period];
    let mut counts = vec![0usize; period];
    for (i, (x, t)) in values.iter().zip(&trend).enumerate() {
        if let Some(t) = t {
            let d = match model {
                DecompositionModel::Additive => x - t,
                DecompositionModel::Multiplicative => x / t,
            };
            sums[i % period] += d;
            counts[i % period] += 1;
        }
    }
    // Two full periods guarantee every position has at least one defined trend value.
    let mut pattern: Vec<f64> = sums
        .iter()
        .zip(&counts)
        .map(|(s, &c)| if c > 0 { s / c as f64 } else { 0.0 })
        .collect();

    let centre = pattern.iter().sum::<f64>() / period as f64;
    match model {
        DecompositionModel::Additive => pattern.iter_mut().for_each(|v| *v -= centre),
        DecompositionModel::Multiplicative => pattern.iter_mut().for_each(|v| *v /= centre),
    }

    let seasonal: Vec<f64> = (0..values.len()).map(|i| pattern[i % period]).collect();

    let resid = values
        .iter()
        .zip(&trend)
        .zip(&seasonal)
        .map(|((x, t), s)| {
            t.map(|t| match model {
                DecompositionModel::Additive => x - t - s,
                DecompositionModel::Multiplicative => x / (t * s),
            })
        })
        .collect();

    Ok(Decomposition {
        model,
        period,
        observed: values.to_vec(),
        trend,
        seasonal,
        resid,
    })
}

/// Two-sided moving average.
///
/// Odd periods use `period` equal weights; even periods use a `period + 1`
/// window with half weights at both ends so the filter stays centred.
pub fn centered_moving_average(values: &[f64], period: usize) -> Vec<Option<f64>> {
    let weights: Vec<f64> = if period % 2 == 0 {
        let mut w = vec![1.0 / period as f64; period + 1];
        w[0] = 0.5 / period as f64;
        w[period] = 0.5 / period as f64;
        w
    } else {
        vec![1.0 / period as f64; period]
    };
    let half = weights.len() / 2;

    let n = values.len();
    let mut out = vec![None; n];
    if n < weights.len() {
        return out;
    }
    for i in half..(n - half) {
        let window = &values[i - half..=i + half];
        let v: f64 = window.iter().zip(&weights).map(|(x, w)| x * w).sum();
        out[i] = Some(v);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn synthetic(n: usize) -> Vec<f64> {
        let pattern = [1.0, 0.5, 0.0, -0.5, -1.0, -0.5, 0.0, 0.5, 1.0, 0.5, 0.0, -1.5];
        (0..n).map(|i| 5.0 + 0.01 * i as f64 + pattern[i % 12]).collect()
    }

    #[test]
    fn additive_components_sum_to_observed() {
        let x = synthetic(48);
        let d = decompose(&x, 12, DecompositionModel::Additive).unwrap();

        assert_eq!(d.trend.len(), 48);
        assert!(d.trend[..6].iter().all(Option::is_none));
        assert!(d.trend[42..].iter().all(Option::is_none));
        assert!(d.trend[6..42].iter().all(Option::is_some));

        for i in 6..42 {
            let t = d.trend[i].unwrap();
            let r = d.resid[i].unwrap();
            assert!((t + d.seasonal[i] + r - x[i]).abs() < 1e-9);
        }
    }

    #[test]
    fn linear_trend_is_recovered_exactly() {
        let x = synthetic(48);
        let d = decompose(&x, 12, DecompositionModel::Additive).unwrap();
        // The pattern sums to zero, so the 2x12 filter removes it entirely.
        for i in 6..42 {
            let expected = 5.0 + 0.01 * i as f64;
            assert!((d.trend[i].unwrap() - expected).abs() < 1e-9);
        }
        let seasonal_sum: f64 = d.seasonal[..12].iter().sum();
        assert!(seasonal_sum.abs() < 1e-9);
        assert!((d.seasonal[0] - 1.0).abs() < 1e-9);
        assert!((d.seasonal[4] + 1.0).abs() < 1e-9);
    }

    #[test]
    fn short_series_is_rejected() {
        let x = synthetic(23);
        let err = decompose(&x, 12, DecompositionModel::Additive).unwrap_err();
        assert!(matches!(
            err,
            AnalysisError::InsufficientData { needed: 24, actual: 23 }
        ));
    }

    #[test]
    fn multiplicative_seasonal_is_centred_on_one() {
        let x: Vec<f64> = (0..36)
            .map(|i| 10.0 * if i % 4 == 0 { 1.2 } else { 0.9333333333333333 })
            .collect();
        let d = decompose(&x, 4, DecompositionModel::Multiplicative).unwrap();
        let m: f64 = d.seasonal[..4].iter().sum::<f64>() / 4.0;
        assert!((m - 1.0).abs() < 1e-9);
        assert!(d.seasonal[0] > 1.0);
    }

    #[test]
    fn odd_period_uses_equal_weights() {
        let x = [1.0, 2.0, 3.0, 4.0, 5.0];
        let t = centered_moving_average(&x, 3);
        assert_eq!(t[0], None);
        assert!((t[1].unwrap() - 2.0).abs() < 1e-12);
        assert!((t[3].unwrap() - 4.0).abs() < 1e-12);
        assert_eq!(t[4], None);
    }
}
