use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::auth::extractor::AuthUser;
use crate::errors::AppError;
use crate::jobs::search::{JobSearch, JobSearchParams};
use crate::models::application::ApplicationScope;
use crate::models::job::{ExperienceLevel, Job, JobStatus, JobType, NewJob};
use crate::models::user::Role;
use crate::state::AppState;
use crate::storage::discard_blobs;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct CreateJobRequest {
    #[serde(default)]
    pub title: String,
    /// Defaults to the recruiter's company.
    pub company: Option<String>,
    #[serde(default)]
    pub location: String,
    pub job_type: JobType,
    pub experience: ExperienceLevel,
    pub salary_min: i64,
    pub salary_max: i64,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub requirements: Vec<String>,
}

/// Partial update: absent fields keep their stored value.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateJobRequest {
    pub title: Option<String>,
    pub company: Option<String>,
    pub location: Option<String>,
    pub job_type: Option<JobType>,
    pub experience: Option<ExperienceLevel>,
    pub salary_min: Option<i64>,
    pub salary_max: Option<i64>,
    pub description: Option<String>,
    pub tags: Option<Vec<String>>,
    pub requirements: Option<Vec<String>>,
    pub status: Option<JobStatus>,
}

#[derive(Debug, Serialize)]
pub struct JobResponse {
    pub job: Job,
}

#[derive(Debug, Serialize)]
pub struct JobListResponse {
    pub jobs: Vec<Job>,
}

#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub success: bool,
}

// ────────────────────────────────────────────────────────────────────────────
// Validation
// ────────────────────────────────────────────────────────────────────────────

/// Trims entries, drops blanks and case-insensitive duplicates, keeps order.
pub fn clean_list(items: Vec<String>) -> Vec<String> {
    let mut seen: Vec<String> = Vec::new();
    let mut out = Vec::new();
    for item in items {
        let item = item.trim().to_string();
        let key = item.to_lowercase();
        if item.is_empty() || seen.contains(&key) {
            continue;
        }
        seen.push(key);
        out.push(item);
    }
    out
}

fn require_text(field: &str, value: &str) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::Validation(format!("{field} is required")));
    }
    Ok(())
}

/// Checks the fields every posting needs, whether new or edited.
pub fn validate_posting(
    title: &str,
    company: &str,
    location: &str,
    description: &str,
    salary_min: i64,
    salary_max: i64,
) -> Result<(), AppError> {
    require_text("title", title)?;
    require_text("company", company)?;
    require_text("location", location)?;
    require_text("description", description)?;
    if salary_min < 0 {
        return Err(AppError::Validation(
            "salary_min cannot be negative".to_string(),
        ));
    }
    if salary_min > salary_max {
        return Err(AppError::Validation(format!(
            "salary_min ({salary_min}) exceeds salary_max ({salary_max})"
        )));
    }
    Ok(())
}

async fn load_owned_job(
    state: &AppState,
    auth: &AuthUser,
    id: Uuid,
    action: &str,
) -> Result<Job, AppError> {
    let job = state
        .store
        .get_job(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Job not found".to_string()))?;

    if job.posted_by != auth.user.id {
        return Err(AppError::Forbidden(format!(
            "You can only {action} your own job postings"
        )));
    }
    Ok(job)
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// GET /api/jobs
///
/// Public listing of active jobs, filtered and sorted by the query string.
pub async fn handle_list_jobs(
    State(state): State<AppState>,
    Query(params): Query<JobSearchParams>,
) -> Result<Json<JobListResponse>, AppError> {
    let search = JobSearch::from_params(&params)?;
    let jobs = state.store.list_jobs(Some(JobStatus::Active), None).await?;
    Ok(Json(JobListResponse {
        jobs: search.apply(jobs),
    }))
}

/// GET /api/jobs/:id
pub async fn handle_get_job(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<JobResponse>, AppError> {
    let job = state
        .store
        .get_job(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Job not found".to_string()))?;
    Ok(Json(JobResponse { job }))
}

/// POST /api/jobs
pub async fn handle_create_job(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<CreateJobRequest>,
) -> Result<(StatusCode, Json<JobResponse>), AppError> {
    auth.require_role(Role::Recruiter, "Only recruiters can post jobs")?;

    let company = req
        .company
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty())
        .or_else(|| auth.user.company.clone())
        .unwrap_or_default();

    let new_job = NewJob {
        title: req.title.trim().to_string(),
        company,
        location: req.location.trim().to_string(),
        job_type: req.job_type,
        experience: req.experience,
        salary_min: req.salary_min,
        salary_max: req.salary_max,
        description: req.description.trim().to_string(),
        tags: clean_list(req.tags),
        requirements: clean_list(req.requirements),
        posted_by: auth.user.id,
    };
    validate_posting(
        &new_job.title,
        &new_job.company,
        &new_job.location,
        &new_job.description,
        new_job.salary_min,
        new_job.salary_max,
    )?;

    let job = state.store.create_job(new_job).await?;
    Ok((StatusCode::CREATED, Json(JobResponse { job })))
}

/// PUT /api/jobs/:id
pub async fn handle_update_job(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateJobRequest>,
) -> Result<Json<JobResponse>, AppError> {
    let mut job = load_owned_job(&state, &auth, id, "update").await?;

    if let Some(title) = req.title {
        job.title = title.trim().to_string();
    }
    if let Some(company) = req.company {
        job.company = company.trim().to_string();
    }
    if let Some(location) = req.location {
        job.location = location.trim().to_string();
    }
    if let Some(job_type) = req.job_type {
        job.job_type = job_type;
    }
    if let Some(experience) = req.experience {
        job.experience = experience;
    }
    if let Some(min) = req.salary_min {
        job.salary_min = min;
    }
    if let Some(max) = req.salary_max {
        job.salary_max = max;
    }
    if let Some(description) = req.description {
        job.description = description.trim().to_string();
    }
    if let Some(tags) = req.tags {
        job.tags = clean_list(tags);
    }
    if let Some(requirements) = req.requirements {
        job.requirements = clean_list(requirements);
    }
    if let Some(status) = req.status {
        job.status = status;
    }

    validate_posting(
        &job.title,
        &job.company,
        &job.location,
        &job.description,
        job.salary_min,
        job.salary_max,
    )?;

    let job = state.store.update_job(&job).await?;
    info!("Job {} updated by {}", job.id, auth.user.id);
    Ok(Json(JobResponse { job }))
}

/// DELETE /api/jobs/:id
pub async fn handle_delete_job(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<DeleteResponse>, AppError> {
    load_owned_job(&state, &auth, id, "delete").await?;

    // Collected first: the applications go with the job.
    let resume_keys: Vec<String> = state
        .store
        .list_applications(ApplicationScope {
            job_id: Some(id),
            ..Default::default()
        })
        .await?
        .into_iter()
        .filter_map(|a| a.resume_key)
        .collect();

    if !state.store.delete_job(id).await? {
        return Err(AppError::NotFound("Job not found".to_string()));
    }
    discard_blobs(state.blobs.as_ref(), resume_keys).await;
    info!("Job {id} deleted by {}", auth.user.id);
    Ok(Json(DeleteResponse { success: true }))
}
