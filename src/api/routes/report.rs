//! Report Routes
//!
//! - POST /api/v1/reports/hospital/pdf - Hospital statistics report as a PDF download

use axum::{
    extract::State,
    http::{header, HeaderValue},
    response::{IntoResponse, Response},
};
use chrono::{Datelike, Utc};
use std::sync::Arc;

use crate::api::dto::ReportForm;
use crate::api::error::{ApiError, ApiResult};
use crate::api::state::AppState;

/// POST /api/v1/reports/hospital/pdf
///
/// Form fields: `type` (year|quarter|month), `year`, `quarter`, `month`.
/// A request without a body gets the current year's report.
/// The whole document is produced before the response starts, so failures
/// surface as JSON errors rather than truncated downloads.
pub async fn hospital_pdf(
    State(state): State<Arc<AppState>>,
    form: ReportForm,
) -> ApiResult<Response> {
    let spec = form.into_spec(Utc::now().year())?;
    let report = state.engine.generate(spec).await?;

    let disposition = content_disposition(&report.filename)?;

    Ok((
        [
            (header::CONTENT_TYPE, HeaderValue::from_static("application/pdf")),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        report.bytes,
    )
        .into_response())
}

/// `attachment` disposition with an ASCII fallback name and the exact UTF-8 name
fn content_disposition(filename: &str) -> ApiResult<HeaderValue> {
    let value = format!(
        "attachment; filename=\"{}\"; filename*=UTF-8''{}",
        ascii_filename(filename),
        urlencoding::encode(filename)
    );
    HeaderValue::from_str(&value)
        .map_err(|e| ApiError::Internal(format!("Invalid Content-Disposition: {}", e)))
}

fn ascii_filename(filename: &str) -> String {
    filename
        .chars()
        .map(|c| match c {
            '/' | '\\' => '-',
            '"' => '\'',
            c if c.is_ascii() && !c.is_ascii_control() => c,
            _ => '_',
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ascii_filename() {
        assert_eq!(
            ascii_filename("hospital-estadisticas-Quarter 2 / 2025.pdf"),
            "hospital-estadisticas-Quarter 2 - 2025.pdf"
        );
        assert_eq!(
            ascii_filename("hospital-estadisticas-Año 2025.pdf"),
            "hospital-estadisticas-A_o 2025.pdf"
        );
    }

    #[test]
    fn test_content_disposition() {
        let value = content_disposition("hospital-estadisticas-Mes 3/2025.pdf").unwrap();
        assert_eq!(
            value.to_str().unwrap(),
            "attachment; filename=\"hospital-estadisticas-Mes 3-2025.pdf\"; \
             filename*=UTF-8''hospital-estadisticas-Mes%203%2F2025.pdf"
        );
    }
}
