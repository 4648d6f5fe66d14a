//! Dashboard endpoints. Each one assembles what the dashboard page shows
//! in a single response.

use axum::{extract::State, Json};
use serde::Serialize;

use crate::auth::extractor::AuthUser;
use crate::dashboard::summary::{
    candidate_stats, recruiter_summary, CandidateStats, PostedJob, RecruiterStats,
};
use crate::errors::AppError;
use crate::models::application::{Application, ApplicationScope};
use crate::models::job::Job;
use crate::models::user::Role;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct CandidateDashboard {
    pub applications: Vec<Application>,
    pub saved_jobs: Vec<Job>,
    pub stats: CandidateStats,
}

#[derive(Debug, Serialize)]
pub struct RecruiterDashboard {
    pub jobs: Vec<PostedJob>,
    pub stats: RecruiterStats,
}

/// GET /api/dashboard/candidate
pub async fn handle_candidate_dashboard(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<CandidateDashboard>, AppError> {
    auth.require_role(Role::Candidate, "Only candidates have a candidate dashboard")?;

    let applications = state
        .store
        .list_applications(ApplicationScope {
            candidate_id: Some(auth.user.id),
            ..Default::default()
        })
        .await?;
    let saved_jobs = state.store.list_saved_jobs(auth.user.id).await?;
    let stats = candidate_stats(&applications);

    Ok(Json(CandidateDashboard {
        applications,
        saved_jobs,
        stats,
    }))
}

/// GET /api/dashboard/recruiter
pub async fn handle_recruiter_dashboard(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<RecruiterDashboard>, AppError> {
    auth.require_role(Role::Recruiter, "Only recruiters have a recruiter dashboard")?;

    let jobs = state.store.list_jobs(None, Some(auth.user.id)).await?;
    let applications = state
        .store
        .list_applications(ApplicationScope {
            recruiter_id: Some(auth.user.id),
            ..Default::default()
        })
        .await?;
    let (jobs, stats) = recruiter_summary(jobs, &applications);

    Ok(Json(RecruiterDashboard { jobs, stats }))
}
