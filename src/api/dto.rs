//! Data Transfer Objects
//!
//! Request and response types for the API endpoints.

use crate::api::error::ApiError;
use crate::report::{PeriodMode, PeriodSpec, ReportResult};
use axum::{
    async_trait,
    body::{to_bytes, Body},
    extract::{FromRequest, Request},
    Form,
};
use serde::{Deserialize, Serialize};

/// Largest form body accepted by the report endpoint
const MAX_FORM_BYTES: usize = 16 * 1024;

// ============================================
// REPORT DTOs
// ============================================

/// Form body of `POST /api/v1/reports/hospital/pdf`
///
/// Every field arrives as text and is interpreted leniently: numbers are read
/// from their leading digits and anything unreadable counts as absent.
#[derive(Debug, Default, Deserialize)]
pub struct ReportForm {
    #[serde(rename = "type", default)]
    pub period_type: Option<String>,
    #[serde(default)]
    pub year: Option<String>,
    #[serde(default)]
    pub quarter: Option<String>,
    #[serde(default)]
    pub month: Option<String>,
}

impl ReportForm {
    /// Interpret the form as a period request
    ///
    /// `type` defaults to `year` and `year` to `default_year`.
    pub fn into_spec(self, default_year: i32) -> ReportResult<PeriodSpec> {
        let mode = match self.period_type.as_deref() {
            Some(raw) if !raw.trim().is_empty() => raw.parse::<PeriodMode>()?,
            _ => PeriodMode::Year,
        };

        let year = self
            .year
            .as_deref()
            .and_then(parse_leading_int)
            .and_then(|y| i32::try_from(y).ok())
            .filter(|y| *y != 0)
            .unwrap_or(default_year);

        // Out-of-range values stay visible so the resolver rejects them
        let small = |field: Option<String>| {
            field
                .as_deref()
                .and_then(parse_leading_int)
                .map(|v| u32::try_from(v).unwrap_or(0))
        };

        Ok(PeriodSpec {
            mode,
            year,
            quarter: small(self.quarter),
            month: small(self.month),
        })
    }
}

/// An empty body means "all defaults". Anything else must be a valid
/// urlencoded form, otherwise the request is rejected with a JSON 400.
#[async_trait]
impl<S> FromRequest<S> for ReportForm
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let (parts, body) = req.into_parts();
        let bytes = to_bytes(body, MAX_FORM_BYTES)
            .await
            .map_err(|e| ApiError::Validation(format!("Unreadable request body: {}", e)))?;

        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(ReportForm::default());
        }

        let req = Request::from_parts(parts, Body::from(bytes));
        let Form(form) = Form::<ReportForm>::from_request(req, state)
            .await
            .map_err(|rejection| ApiError::Validation(rejection.body_text()))?;
        Ok(form)
    }
}

/// Read an integer from the start of `raw`
///
/// Surrounding whitespace and one leading sign are accepted, trailing garbage is
/// ignored (`"2025abc"` reads as 2025). Returns `None` when no digit follows.
pub fn parse_leading_int(raw: &str) -> Option<i64> {
    let s = raw.trim();
    let (negative, digits) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };

    let end = digits
        .bytes()
        .position(|b| !b.is_ascii_digit())
        .unwrap_or(digits.len());
    if end == 0 {
        return None;
    }

    let value = digits[..end].parse::<i64>().ok()?;
    Some(if negative { -value } else { value })
}

// ============================================
// HEALTH DTOs
// ============================================

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Overall status: "healthy" or "unhealthy"
    pub status: String,
    /// Record store status: "ok" or "error"
    pub store: String,
    /// Server uptime in seconds
    pub uptime_seconds: u64,
    /// Server version
    pub version: String,
}
