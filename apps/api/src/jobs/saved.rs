//! Saved jobs: a candidate's bookmark list.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::auth::extractor::AuthUser;
use crate::errors::AppError;
use crate::jobs::handlers::JobListResponse;
use crate::models::user::Role;
use crate::state::AppState;

const CANDIDATES_ONLY: &str = "Only candidates can save jobs";

/// GET /api/saved-jobs
pub async fn handle_list_saved(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<JobListResponse>, AppError> {
    auth.require_role(Role::Candidate, CANDIDATES_ONLY)?;
    let jobs = state.store.list_saved_jobs(auth.user.id).await?;
    Ok(Json(JobListResponse { jobs }))
}

/// PUT /api/saved-jobs/:job_id
pub async fn handle_save_job(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(job_id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    auth.require_role(Role::Candidate, CANDIDATES_ONLY)?;
    if state.store.get_job(job_id).await?.is_none() {
        return Err(AppError::NotFound("Job not found".to_string()));
    }
    state.store.save_job(auth.user.id, job_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /api/saved-jobs/:job_id
pub async fn handle_unsave_job(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(job_id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    auth.require_role(Role::Candidate, CANDIDATES_ONLY)?;
    state.store.unsave_job(auth.user.id, job_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
