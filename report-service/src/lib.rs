//! Executive report generation over a dataset.
//!
//! One call compacts the dataset's insights and chart suggestions into a
//! small JSON payload, asks the LLM for a markdown report grounded in that
//! payload only, and persists the result as `report.md` next to the dataset
//! files. Without a wired provider (or when the completion comes back
//! blank) a deterministic markdown template built from the same insights is
//! written instead, so the endpoint works in LLM-less deployments.

mod errors;
mod render;

pub use errors::ReportError;

use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

use dataset_store::DatasetStore;
use insights_engine::{ChartParams, InsightsEngine, InsightsParams};
use llm_service::CompletionProvider;

/// Grounding contract for the report-writing completion.
pub const SYSTEM_PROMPT: &str = "You are an analytics assistant. \
    Use only the provided insights and chart specs. Do not invent facts. \
    If information is missing, say so explicitly.";

const REPORT_FILE: &str = "report.md";

/// Result of one report generation.
#[derive(Debug, Clone, Serialize)]
pub struct ReportOutcome {
    pub dataset_id: String,
    pub report_markdown: String,
    /// False when the markdown came from the deterministic template.
    pub used_llm: bool,
    pub generated_at: DateTime<Utc>,
}

/// Orchestrates insights, charts, drafting, and persistence.
pub struct ReportService {
    insights: Arc<InsightsEngine>,
    datasets: DatasetStore,
    provider: Option<Arc<dyn CompletionProvider>>,
}

impl ReportService {
    pub fn new(
        insights: Arc<InsightsEngine>,
        datasets: DatasetStore,
        provider: Option<Arc<dyn CompletionProvider>>,
    ) -> Self {
        Self {
            insights,
            datasets,
            provider,
        }
    }

    /// Generates (and persists) the executive report for one dataset.
    ///
    /// # Errors
    /// - [`ReportError::Insights`] when the dataset does not exist or the
    ///   insights run fails.
    /// - [`ReportError::Llm`] when drafting fails upstream.
    /// - [`ReportError::Io`] when `report.md` cannot be written.
    pub async fn generate(&self, dataset_id: &str) -> Result<ReportOutcome, ReportError> {
        let started = Instant::now();

        let report = self
            .insights
            .compute_insights(dataset_id, &InsightsParams::default())
            .await?
            .report;
        let charts = self
            .insights
            .suggest_charts(dataset_id, &ChartParams::default())
            .await?;

        let (markdown, used_llm) = match &self.provider {
            Some(provider) => {
                let payload = render::compact_payload(&report, &charts);
                let prompt = format!(
                    "Write an executive report in Markdown with sections: \
                     Dataset summary, Key insights (5 bullets), Anomalies, \
                     Recommended charts. Use only the provided JSON.\n\n{}",
                    serde_json::to_string_pretty(&payload)?
                );
                let draft = provider.complete(&prompt, Some(SYSTEM_PROMPT)).await?;
                let draft = draft.trim();
                if draft.is_empty() {
                    (render::report_template(&report, &charts), true)
                } else {
                    (draft.to_string(), true)
                }
            }
            None => (render::report_template(&report, &charts), false),
        };

        let path = self.datasets.dataset_dir(dataset_id).join(REPORT_FILE);
        std::fs::write(&path, &markdown)?;

        info!(
            dataset_id,
            used_llm,
            bytes = markdown.len(),
            latency_ms = started.elapsed().as_millis() as u64,
            "report generated"
        );
        Ok(ReportOutcome {
            dataset_id: dataset_id.to_string(),
            report_markdown: markdown,
            used_llm,
            generated_at: Utc::now(),
        })
    }
}
