//! Brightness Summary Module
//! Descriptive statistics over an extraction, used for logging and color normalization.

use crate::data::FireRecord;
use chrono::NaiveDate;

/// Descriptive statistics for the brightness of a set of detections.
#[derive(Debug, Clone, PartialEq)]
pub struct BrightnessSummary {
    pub count: usize,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub median: f64,
    pub p05: f64,
    pub p95: f64,
}

impl Default for BrightnessSummary {
    fn default() -> Self {
        Self {
            count: 0,
            min: f64::NAN,
            max: f64::NAN,
            mean: f64::NAN,
            median: f64::NAN,
            p05: f64::NAN,
            p95: f64::NAN,
        }
    }
}

impl BrightnessSummary {
    /// Compute statistics over brightness values. NaN values are ignored.
    pub fn from_values(values: &[f64]) -> Self {
        let mut sorted: Vec<f64> = values.iter().copied().filter(|v| !v.is_nan()).collect();
        let n = sorted.len();
        if n == 0 {
            return Self::default();
        }

        sorted.sort_by(|a, b| a.total_cmp(b));

        let mean = sorted.iter().sum::<f64>() / n as f64;
        let median = if n % 2 == 0 {
            (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
        } else {
            sorted[n / 2]
        };

        Self {
            count: n,
            min: sorted[0],
            max: sorted[n - 1],
            mean,
            median,
            p05: percentile(&sorted, 5.0),
            p95: percentile(&sorted, 95.0),
        }
    }

    pub fn from_records(records: &[FireRecord]) -> Self {
        let values: Vec<f64> = records.iter().map(|r| r.brightness).collect();
        Self::from_values(&values)
    }

    /// Map a brightness onto [0, 1] relative to the observed min/max.
    ///
    /// A degenerate range (all values equal, or no data) maps to 0.5.
    pub fn normalize(&self, value: f64) -> f64 {
        let span = self.max - self.min;
        if !span.is_finite() || span <= 0.0 {
            return 0.5;
        }
        ((value - self.min) / span).clamp(0.0, 1.0)
    }
}

/// Calculate percentile using linear interpolation (NumPy compatible).
fn percentile(sorted_values: &[f64], p: f64) -> f64 {
    let n = sorted_values.len();
    if n == 0 {
        return f64::NAN;
    }
    if n == 1 {
        return sorted_values[0];
    }

    let rank = (p / 100.0) * (n - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = (rank.ceil() as usize).min(n - 1);
    let frac = rank - lower as f64;

    if lower == upper {
        sorted_values[lower]
    } else {
        sorted_values[lower] * (1.0 - frac) + sorted_values[upper] * frac
    }
}

/// Earliest and latest detection date, if any.
pub fn date_span(dates: &[NaiveDate]) -> Option<(NaiveDate, NaiveDate)> {
    let first = *dates.iter().min()?;
    let last = *dates.iter().max()?;
    Some((first, last))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_of_known_values() {
        let s = BrightnessSummary::from_values(&[330.0, 300.0, 310.0, 320.0]);

        assert_eq!(s.count, 4);
        assert_eq!(s.min, 300.0);
        assert_eq!(s.max, 330.0);
        assert_eq!(s.mean, 315.0);
        assert_eq!(s.median, 315.0);
        assert!((s.p05 - 301.5).abs() < 1e-9);
        assert!((s.p95 - 328.5).abs() < 1e-9);
    }

    #[test]
    fn empty_summary_is_nan() {
        let s = BrightnessSummary::from_values(&[]);

        assert_eq!(s.count, 0);
        assert!(s.mean.is_nan());
        assert_eq!(s.normalize(42.0), 0.5);
    }

    #[test]
    fn normalize_clamps_and_handles_flat_range() {
        let s = BrightnessSummary::from_values(&[100.0, 200.0]);
        assert_eq!(s.normalize(100.0), 0.0);
        assert_eq!(s.normalize(150.0), 0.5);
        assert_eq!(s.normalize(500.0), 1.0);

        let flat = BrightnessSummary::from_values(&[7.0, 7.0, 7.0]);
        assert_eq!(flat.normalize(7.0), 0.5);
    }

    #[test]
    fn date_span_covers_unordered_dates() {
        let d = |s| NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap();
        let dates = vec![d("2021-01-03"), d("2021-01-01"), d("2021-01-02")];

        assert_eq!(date_span(&dates), Some((d("2021-01-01"), d("2021-01-03"))));
        assert_eq!(date_span(&[]), None);
    }
}
