//! Statistical insights over stored datasets.
//!
//! The engine samples rows from a [`dataset_store::DatasetStore`], profiles
//! every column, flags anomalies, and caches the resulting report per
//! `(dataset_id, sample_rows, target_column)`. Chart suggestions reuse the
//! same sample and profiles.
//!
//! Everything here is pure computation over local files; no network calls.

mod anomalies;
mod cells;
mod charts;
mod profiling;
mod stats;

pub mod cache;
pub mod config;
pub mod errors;
pub mod models;
pub mod outliers;

use std::sync::Arc;
use std::time::Instant;

use tracing::info;

use dataset_store::{DatasetStore, Row};

use crate::cache::{CacheKey, InsightsCache};

pub use crate::config::InsightsConfig;
pub use crate::errors::InsightsError;
pub use crate::models::{
    Aggregation, ChartSpec, ChartType, ColumnProfile, DatasetOverview, InsightsAnomalies,
    InsightsReport, MissingColumnAnomaly, NumericSummary, OutlierAnomaly, SuspectValueAnomaly,
    TopValue,
};
pub use crate::outliers::OutlierMethod;

/// Options for one insights computation.
#[derive(Debug, Clone, Default)]
pub struct InsightsParams {
    /// Requested sample size; clamped to the configured maximum.
    pub sample_rows: Option<usize>,
    /// Column the analysis should focus on; must exist in the dataset.
    pub target_column: Option<String>,
    /// Skip the cache and overwrite the entry with a fresh report.
    pub force_recompute: bool,
}

/// Result of one insights request, with cache provenance.
#[derive(Debug, Clone)]
pub struct InsightsOutcome {
    pub report: Arc<InsightsReport>,
    /// True when the report was served from cache without recomputation.
    pub cached: bool,
}

/// Options for chart suggestions.
#[derive(Debug, Clone)]
pub struct ChartParams {
    /// Free-text question steering the first suggestion.
    pub question: Option<String>,
    /// Maximum number of charts returned.
    pub max_charts: usize,
}

impl Default for ChartParams {
    fn default() -> Self {
        Self {
            question: None,
            max_charts: 3,
        }
    }
}

/// Facade over profiling, anomaly detection, chart suggestions, and caching.
pub struct InsightsEngine {
    cfg: InsightsConfig,
    datasets: DatasetStore,
    cache: InsightsCache,
}

impl InsightsEngine {
    pub fn new(cfg: InsightsConfig, datasets: DatasetStore) -> Self {
        Self {
            cfg,
            datasets,
            cache: InsightsCache::new(),
        }
    }

    /// Builds the engine from environment variables.
    ///
    /// # Errors
    /// Returns [`InsightsError::Config`] on invalid settings.
    pub fn from_env(datasets: DatasetStore) -> Result<Self, InsightsError> {
        Ok(Self::new(InsightsConfig::from_env()?, datasets))
    }

    pub fn config(&self) -> &InsightsConfig {
        &self.cfg
    }

    /// Computes (or returns a cached) insights report.
    ///
    /// The sample is the first `min(sample_rows, nb_rows, sample_max)` rows
    /// of the dataset, so identical requests see identical samples.
    ///
    /// # Errors
    /// - [`InsightsError::Dataset`] when the dataset does not exist.
    /// - [`InsightsError::Validation`] when `target_column` is unknown.
    pub async fn compute_insights(
        &self,
        dataset_id: &str,
        params: &InsightsParams,
    ) -> Result<InsightsOutcome, InsightsError> {
        let requested = params.sample_rows.unwrap_or(self.cfg.sample_max);
        if requested == 0 {
            return Err(InsightsError::Validation("sample_rows must be > 0".into()));
        }
        let sample_rows = requested.min(self.cfg.sample_max);

        let key = CacheKey {
            dataset_id: dataset_id.to_string(),
            sample_rows,
            target_column: params.target_column.clone(),
        };

        let started = Instant::now();
        let (report, cached) = self
            .cache
            .get_or_compute(key, params.force_recompute, || {
                self.build_report(dataset_id, sample_rows, params.target_column.clone())
            })
            .await?;
        info!(
            dataset_id,
            sample_rows_used = report.sample_rows_used,
            cached,
            latency_ms = started.elapsed().as_millis() as u64,
            "insights ready"
        );
        Ok(InsightsOutcome { report, cached })
    }

    /// Suggests charts for a dataset, optionally steered by a question.
    ///
    /// Runs the insights pipeline first (cache permitting) so suggestions
    /// and report agree on column types.
    ///
    /// # Errors
    /// Same failure modes as [`Self::compute_insights`], plus
    /// [`InsightsError::Validation`] when `max_charts` is zero.
    pub async fn suggest_charts(
        &self,
        dataset_id: &str,
        params: &ChartParams,
    ) -> Result<Vec<ChartSpec>, InsightsError> {
        if params.max_charts == 0 {
            return Err(InsightsError::Validation("max_charts must be > 0".into()));
        }

        let insights = self
            .compute_insights(dataset_id, &InsightsParams::default())
            .await?
            .report;
        let sample = self
            .datasets
            .read_rows(dataset_id, Some(insights.sample_rows_used))?;

        Ok(charts::suggest_charts(
            &insights,
            &sample,
            params.question.as_deref(),
            params.max_charts,
            self.cfg.charts_max_points,
        ))
    }

    /// Drops cached reports for a dataset, e.g. after a re-upload.
    pub fn invalidate(&self, dataset_id: &str) {
        self.cache.invalidate_dataset(dataset_id);
    }

    async fn build_report(
        &self,
        dataset_id: &str,
        sample_rows: usize,
        target_column: Option<String>,
    ) -> Result<InsightsReport, InsightsError> {
        let meta = self.datasets.load_meta(dataset_id)?;

        if let Some(target) = &target_column {
            if !meta.columns.iter().any(|c| c == target) {
                return Err(InsightsError::Validation(format!(
                    "unknown target column: {target}"
                )));
            }
        }

        let sample: Vec<Row> = self.datasets.read_rows(dataset_id, Some(sample_rows))?;

        let overview = profiling::build_overview(&meta, &sample);
        let profiles = profiling::build_column_profiles(&meta, &sample);
        let anomalies = anomalies::build_anomalies(
            &sample,
            &profiles,
            self.cfg.missing_threshold,
            self.cfg.outlier_method,
        );
        let recommendations = anomalies::build_recommendations(&anomalies);

        Ok(InsightsReport {
            dataset_id: dataset_id.to_string(),
            generated_at: chrono::Utc::now(),
            sample_rows_used: sample.len(),
            target_column,
            dataset_overview: overview,
            column_profiles: profiles,
            anomalies,
            recommendations,
        })
    }
}
