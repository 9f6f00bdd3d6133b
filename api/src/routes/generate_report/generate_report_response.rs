use report_service::ReportOutcome;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct GenerateReportResponse {
    pub message: String,
    #[serde(flatten)]
    pub outcome: ReportOutcome,
}
