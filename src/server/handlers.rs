use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Json, Response};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

use crate::catalog::EclipseKind;
use crate::finder::{today_in, FinderError, Report};

use super::state::AppState;
use super::static_files;

// ─── Error response ──────────────────────────────────────────────

#[derive(Serialize)]
struct ApiErrorBody {
    error: String,
    code: &'static str,
}

#[derive(Debug)]
pub(super) struct ApiError {
    status: StatusCode,
    code: &'static str,
    message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ApiErrorBody { error: self.message, code: self.code };
        (self.status, Json(body)).into_response()
    }
}

impl From<FinderError> for ApiError {
    fn from(e: FinderError) -> Self {
        bad_request(e.code(), e.to_string())
    }
}

fn bad_request(code: &'static str, message: impl Into<String>) -> ApiError {
    ApiError { status: StatusCode::BAD_REQUEST, code, message: message.into() }
}

// ─── GET / ───────────────────────────────────────────────────────

pub async fn index() -> Html<&'static str> {
    Html(static_files::INDEX_HTML)
}

// ─── GET /api/eclipses ───────────────────────────────────────────

#[derive(Deserialize)]
pub struct EclipseQuery {
    pub location: Option<String>,
    pub date: Option<String>,
    pub kind: Option<String>,
}

pub(super) async fn eclipses(
    State(state): State<Arc<AppState>>,
    Query(params): Query<EclipseQuery>,
) -> Result<Json<Report>, ApiError> {
    let start = Instant::now();

    let kinds = match params.kind.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        None => EclipseKind::ALL.to_vec(),
        Some(k) => vec![k.parse::<EclipseKind>().map_err(|e| bad_request("invalid_kind", e))?],
    };

    let location = params.location.as_deref().unwrap_or("");
    let report = state
        .finder
        .lookup_str(location, params.date.as_deref(), today_in(state.tz), &kinds)
        .map_err(|e| {
            warn!(location, error = %e, "rejected eclipse query");
            ApiError::from(e)
        })?;

    info!(
        location = %report.location.formatted(),
        date = %report.reference_date,
        elapsed_ms = start.elapsed().as_secs_f64() * 1000.0,
        "GET /api/eclipses"
    );
    Ok(Json(report))
}

// ─── GET /api/regions ────────────────────────────────────────────

#[derive(Serialize)]
pub struct RegionList {
    pub macro_regions: Vec<String>,
    pub countries: Vec<String>,
}

pub async fn regions(State(state): State<Arc<AppState>>) -> Json<RegionList> {
    let tables = state.finder.normalizer().tables();
    Json(RegionList {
        macro_regions: tables.macro_regions().to_vec(),
        countries: tables.countries().iter().map(|c| c.name.clone()).collect(),
    })
}
