//! JSON rendering of a `ScoreReport`. Field order follows the struct layout.

use crate::structure::ScoreReport;
use crate::ReportError;

pub fn render_json(report: &ScoreReport) -> Result<String, ReportError> {
    serde_json::to_string_pretty(report).map_err(|e| ReportError::Json(e.to_string()))
}
