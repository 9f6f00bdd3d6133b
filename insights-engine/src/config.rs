//! Runtime configuration for insights and chart suggestions.

use crate::errors::InsightsError;
use crate::outliers::OutlierMethod;

/// Tuning knobs, loaded from environment variables.
#[derive(Clone, Debug)]
pub struct InsightsConfig {
    /// Hard cap on sampled rows per computation.
    pub sample_max: usize,
    /// Columns above this missing ratio are flagged low-quality.
    pub missing_threshold: f64,
    /// Outlier detection method applied to numeric columns.
    pub outlier_method: OutlierMethod,
    /// Cap on rendered data points per suggested chart.
    pub charts_max_points: usize,
}

impl Default for InsightsConfig {
    fn default() -> Self {
        Self {
            sample_max: 5000,
            missing_threshold: 0.3,
            outlier_method: OutlierMethod::Iqr,
            charts_max_points: 50,
        }
    }
}

impl InsightsConfig {
    /// Loads configuration from environment variables.
    ///
    /// # Env
    /// - `INSIGHTS_SAMPLE_MAX` (default 5000)
    /// - `INSIGHTS_MISSING_THRESHOLD` (default 0.3)
    /// - `INSIGHTS_OUTLIER_METHOD` = `iqr` | `zscore` (default `iqr`)
    /// - `CHARTS_MAX_POINTS` (default 50)
    ///
    /// # Errors
    /// Returns [`InsightsError::Config`] on unparseable values.
    pub fn from_env() -> Result<Self, InsightsError> {
        let mut cfg = Self::default();

        if let Some(v) = env_nonempty("INSIGHTS_SAMPLE_MAX") {
            cfg.sample_max = v
                .parse()
                .map_err(|_| InsightsError::Config("INSIGHTS_SAMPLE_MAX: expected usize".into()))?;
        }
        if let Some(v) = env_nonempty("INSIGHTS_MISSING_THRESHOLD") {
            cfg.missing_threshold = v.parse().map_err(|_| {
                InsightsError::Config("INSIGHTS_MISSING_THRESHOLD: expected f64".into())
            })?;
        }
        if let Some(v) = env_nonempty("INSIGHTS_OUTLIER_METHOD") {
            cfg.outlier_method = OutlierMethod::parse(&v)?;
        }
        if let Some(v) = env_nonempty("CHARTS_MAX_POINTS") {
            cfg.charts_max_points = v
                .parse()
                .map_err(|_| InsightsError::Config("CHARTS_MAX_POINTS: expected usize".into()))?;
        }

        if cfg.sample_max == 0 {
            return Err(InsightsError::Config("sample_max must be > 0".into()));
        }
        if !(0.0..=1.0).contains(&cfg.missing_threshold) {
            return Err(InsightsError::Config(
                "missing_threshold must be within 0.0..=1.0".into(),
            ));
        }
        if cfg.charts_max_points < 2 {
            return Err(InsightsError::Config(
                "charts_max_points must be >= 2".into(),
            ));
        }
        Ok(cfg)
    }
}

fn env_nonempty(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|s| !s.trim().is_empty())
}
