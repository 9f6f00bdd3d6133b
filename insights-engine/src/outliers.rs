//! Outlier detection over numeric columns, two interchangeable methods.

use serde::{Deserialize, Serialize};

use crate::errors::InsightsError;
use crate::stats::{mean, quantile_sorted, std_pop};

/// Detection method, selected by configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutlierMethod {
    /// Outlier if value < Q1 − 1.5·IQR or > Q3 + 1.5·IQR.
    Iqr,
    /// Outlier if |value − mean| / std > 3. Zero std flags nothing.
    Zscore,
}

impl OutlierMethod {
    pub fn parse(s: &str) -> Result<Self, InsightsError> {
        match s.trim().to_lowercase().as_str() {
            "iqr" => Ok(OutlierMethod::Iqr),
            "zscore" => Ok(OutlierMethod::Zscore),
            other => Err(InsightsError::Config(format!(
                "unknown outlier method: {other}"
            ))),
        }
    }
}

/// Max outlier indices reported per column.
const MAX_INDICES: usize = 20;

/// Flags outlier positions among `(row_index, value)` pairs.
///
/// Indices are sample row positions, in ascending order, capped at 20.
/// A column with zero spread (IQR or std of 0) flags nothing.
pub fn detect_outlier_indices(values: &[(usize, f64)], method: OutlierMethod) -> Vec<usize> {
    if values.is_empty() {
        return Vec::new();
    }
    let nums: Vec<f64> = values.iter().map(|(_, v)| *v).collect();

    let keep: Box<dyn Fn(f64) -> bool> = match method {
        OutlierMethod::Zscore => {
            let m = mean(&nums).unwrap_or(0.0);
            let s = std_pop(&nums).unwrap_or(0.0);
            if s == 0.0 {
                return Vec::new();
            }
            Box::new(move |v| ((v - m) / s).abs() > 3.0)
        }
        OutlierMethod::Iqr => {
            let mut sorted = nums.clone();
            sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
            let q1 = quantile_sorted(&sorted, 0.25).unwrap_or(0.0);
            let q3 = quantile_sorted(&sorted, 0.75).unwrap_or(0.0);
            let iqr = q3 - q1;
            if iqr == 0.0 {
                return Vec::new();
            }
            let lower = q1 - 1.5 * iqr;
            let upper = q3 + 1.5 * iqr;
            Box::new(move |v| v < lower || v > upper)
        }
    };

    values
        .iter()
        .filter(|(_, v)| keep(*v))
        .map(|(i, _)| *i)
        .take(MAX_INDICES)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn indexed(values: &[f64]) -> Vec<(usize, f64)> {
        values.iter().copied().enumerate().collect()
    }

    #[test]
    fn iqr_flags_the_literal_formula() {
        // Q1=2, Q3=3, IQR=1 → bounds [0.5, 4.5]; only 100 is outside.
        let indices = detect_outlier_indices(&indexed(&[1.0, 2.0, 2.0, 3.0, 100.0]), OutlierMethod::Iqr);
        assert_eq!(indices, vec![4]);
    }

    #[test]
    fn zscore_follows_its_own_formula_not_iqr() {
        // One extreme value among five keeps z below 3 (max z ≈ 2 with n=5).
        let indices =
            detect_outlier_indices(&indexed(&[1.0, 2.0, 2.0, 3.0, 100.0]), OutlierMethod::Zscore);
        assert!(indices.is_empty());

        // A genuinely extreme point in a larger sample does get flagged.
        let mut values: Vec<f64> = vec![10.0; 30];
        values[0] = 9.0;
        values[29] = 10_000.0;
        let indices = detect_outlier_indices(&indexed(&values), OutlierMethod::Zscore);
        assert_eq!(indices, vec![29]);
    }

    #[test]
    fn zero_spread_flags_nothing() {
        let flat = indexed(&[5.0, 5.0, 5.0, 5.0]);
        assert!(detect_outlier_indices(&flat, OutlierMethod::Iqr).is_empty());
        assert!(detect_outlier_indices(&flat, OutlierMethod::Zscore).is_empty());
    }

    #[test]
    fn indices_are_capped_at_twenty() {
        // 152 clustered values plus 48 far-away ones; quartiles stay in the
        // cluster, so all 48 qualify but only 20 indices are reported.
        let mut values: Vec<f64> = (0..200).map(|i| (i % 7) as f64).collect();
        for v in values.iter_mut().skip(152) {
            *v = 1000.0;
        }
        let indices = detect_outlier_indices(&indexed(&values), OutlierMethod::Iqr);
        assert_eq!(indices.len(), 20);
        assert_eq!(indices[0], 152);
    }
}
