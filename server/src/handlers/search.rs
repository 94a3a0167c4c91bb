//! Search submission, polling, results and report download.

use crate::error::{ApiError, ApiResult};
use crate::report::{render_report, report_filename};
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Form, Json,
};
use lookout_core::{EmailAddress, Job, JobId};
use serde::{Deserialize, Serialize};
use serde_json::json;

/// Form body of `POST /search`.
#[derive(Debug, Deserialize)]
pub struct SearchForm {
    /// Address to search for
    #[serde(default)]
    pub email: String,
}

/// Response of `POST /search`.
#[derive(Debug, Serialize, Deserialize)]
pub struct SearchResponse {
    /// Id to poll with
    pub search_id: String,
}

const RESULTS_NOT_FOUND: &str = "Results not found or search not completed";

/// `POST /search`: validate the email and start a job.
pub async fn submit_search(
    State(state): State<AppState>,
    Form(form): Form<SearchForm>,
) -> ApiResult<Json<SearchResponse>> {
    let email = form.email.trim();
    if email.is_empty() {
        return Err(ApiError::bad_request("EMAIL_REQUIRED", "Email is required"));
    }

    let email = EmailAddress::parse(email).map_err(|_| {
        ApiError::bad_request("INVALID_EMAIL", "Please enter a valid email address")
    })?;

    let search_id = state.runner().submit(email).await?;
    tracing::info!(job_id = %search_id, "search submitted");

    Ok(Json(SearchResponse {
        search_id: search_id.to_string(),
    }))
}

/// `GET /status/{id}`: progress of a job.
pub async fn search_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Response> {
    match find_job(&state, &id).await? {
        Some(job) => Ok(Json(job.status_view()).into_response()),
        None => Ok((StatusCode::NOT_FOUND, Json(json!({ "status": "not_found" }))).into_response()),
    }
}

/// `GET /results/{id}`: classified results of a completed job.
pub async fn search_results(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Response> {
    let job = find_job(&state, &id).await?;

    match job.as_ref().and_then(Job::completed_results) {
        Some(results) => Ok(Json(results).into_response()),
        None => Err(ApiError::not_found("RESULTS_NOT_FOUND", RESULTS_NOT_FOUND)),
    }
}

/// `GET /download/{id}`: plain-text report of a completed job.
pub async fn download_report(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Response> {
    let job = find_job(&state, &id)
        .await?
        .ok_or_else(|| ApiError::not_found("RESULTS_NOT_FOUND", RESULTS_NOT_FOUND))?;

    let report = render_report(&job)
        .ok_or_else(|| ApiError::not_found("RESULTS_NOT_FOUND", RESULTS_NOT_FOUND))?;

    let disposition = format!("attachment; filename=\"{}\"", report_filename(&job));

    Ok((
        [
            (header::CONTENT_TYPE, "text/plain; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        report,
    )
        .into_response())
}

/// Look a job up by its path segment. Malformed ids are simply unknown.
async fn find_job(state: &AppState, id: &str) -> ApiResult<Option<Job>> {
    let Ok(id) = JobId::new(id) else {
        return Ok(None);
    };

    Ok(state.store().read(&id).await?)
}
