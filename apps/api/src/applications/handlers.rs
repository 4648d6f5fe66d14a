use axum::{
    extract::{Multipart, Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::applications::filter::{ApplicantFilter, ApplicationListParams};
use crate::applications::resume::{resume_key, ResumeFormat};
use crate::auth::extractor::AuthUser;
use crate::auth::handlers::{is_plausible_email, non_blank, normalize_email};
use crate::errors::AppError;
use crate::models::application::{
    Application, ApplicationScope, ApplicationStatus, NewApplication,
};
use crate::models::job::JobStatus;
use crate::models::user::Role;
use crate::state::AppState;
use crate::storage::discard_blobs;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct CreateApplicationRequest {
    pub job_id: Uuid,
    /// Defaults to the candidate's name.
    pub full_name: Option<String>,
    /// Defaults to the candidate's email.
    pub email: Option<String>,
    pub phone: Option<String>,
    pub cover_letter: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: ApplicationStatus,
}

#[derive(Debug, Serialize)]
pub struct ApplicationResponse {
    pub application: Application,
}

#[derive(Debug, Serialize)]
pub struct ApplicationListResponse {
    pub applications: Vec<Application>,
}

/// Loads an application the caller is allowed to see.
async fn load_visible(
    state: &AppState,
    auth: &AuthUser,
    id: Uuid,
) -> Result<Application, AppError> {
    let application = state
        .store
        .get_application(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Application not found".to_string()))?;

    if !application.is_visible_to(auth.user.id) {
        return Err(AppError::Forbidden(
            "You do not have permission to view this application".to_string(),
        ));
    }
    Ok(application)
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// GET /api/applications
///
/// Candidates get their own applications, recruiters the applications to
/// jobs they posted.
pub async fn handle_list_applications(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(params): Query<ApplicationListParams>,
) -> Result<Json<ApplicationListResponse>, AppError> {
    let filter = ApplicantFilter::from_params(&params)?;

    let scope = match auth.user.role {
        Role::Candidate => ApplicationScope {
            candidate_id: Some(auth.user.id),
            job_id: params.job_id,
            ..Default::default()
        },
        Role::Recruiter => ApplicationScope {
            recruiter_id: Some(auth.user.id),
            job_id: params.job_id,
            ..Default::default()
        },
    };

    let applications = state.store.list_applications(scope).await?;
    Ok(Json(ApplicationListResponse {
        applications: filter.apply(applications),
    }))
}

/// POST /api/applications
pub async fn handle_create_application(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<CreateApplicationRequest>,
) -> Result<(StatusCode, Json<ApplicationResponse>), AppError> {
    auth.require_role(Role::Candidate, "Only candidates can submit applications")?;

    let job = state
        .store
        .get_job(req.job_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Job not found".to_string()))?;

    if job.status != JobStatus::Active {
        return Err(AppError::Conflict(
            "This job is no longer accepting applications".to_string(),
        ));
    }

    if state
        .store
        .find_application(auth.user.id, job.id)
        .await?
        .is_some()
    {
        return Err(AppError::Conflict(
            "You have already applied to this job".to_string(),
        ));
    }

    let full_name = non_blank(req.full_name).unwrap_or_else(|| auth.user.name.clone());
    let email = non_blank(req.email)
        .map(|e| normalize_email(&e))
        .unwrap_or_else(|| auth.user.email.clone());
    if !is_plausible_email(&email) {
        return Err(AppError::Validation(format!("'{email}' is not a valid email")));
    }

    let application = state
        .store
        .create_application(NewApplication {
            job_id: job.id,
            candidate_id: auth.user.id,
            recruiter_id: job.posted_by,
            job_title: job.title,
            company: job.company,
            full_name,
            email,
            phone: non_blank(req.phone),
            cover_letter: non_blank(req.cover_letter),
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApplicationResponse { application }),
    ))
}

/// GET /api/applications/:id
pub async fn handle_get_application(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApplicationResponse>, AppError> {
    let application = load_visible(&state, &auth, id).await?;
    Ok(Json(ApplicationResponse { application }))
}

/// PATCH /api/applications/:id
///
/// Moves an application through Pending → Reviewed → Interview →
/// Accepted | Rejected. Only the recruiter who posted the job may do so.
pub async fn handle_update_status(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateStatusRequest>,
) -> Result<Json<ApplicationResponse>, AppError> {
    auth.require_role(
        Role::Recruiter,
        "Only recruiters can update application status",
    )?;

    let application = state
        .store
        .get_application(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Application not found".to_string()))?;

    if application.recruiter_id != auth.user.id {
        return Err(AppError::Forbidden(
            "You can only manage applications to your own job postings".to_string(),
        ));
    }

    if application.status == req.status {
        return Ok(Json(ApplicationResponse { application }));
    }
    if !application.status.can_transition_to(req.status) {
        return Err(AppError::Conflict(format!(
            "Cannot move an application from {} to {}",
            application.status.as_str(),
            req.status.as_str()
        )));
    }

    let application = state
        .store
        .update_application_status(id, application.status, req.status)
        .await?
        .ok_or_else(|| AppError::NotFound("Application not found".to_string()))?;

    info!(
        "Application {} moved to {} by {}",
        id,
        application.status.as_str(),
        auth.user.id
    );
    Ok(Json(ApplicationResponse { application }))
}

/// PUT /api/applications/:id/resume
///
/// Multipart upload; the file goes in the `resume` field.
pub async fn handle_upload_resume(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    mut multipart: Multipart,
) -> Result<Json<ApplicationResponse>, AppError> {
    let application = load_visible(&state, &auth, id).await?;
    if application.candidate_id != auth.user.id {
        return Err(AppError::Forbidden(
            "Only the applicant can upload a resume".to_string(),
        ));
    }

    let max_bytes = state.config.max_resume_bytes;
    let mut upload = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Invalid multipart body: {e}")))?
    {
        if field.name() != Some("resume") {
            continue;
        }
        let format = ResumeFormat::detect(field.file_name(), field.content_type())
            .ok_or_else(|| {
                AppError::Validation("Resume must be a PDF, DOC or DOCX file".to_string())
            })?;
        let bytes = field.bytes().await.map_err(|e| {
            AppError::Validation(format!("Could not read resume upload: {e}"))
        })?;
        upload = Some((format, bytes));
        break;
    }

    let (format, bytes) = upload
        .ok_or_else(|| AppError::Validation("Missing 'resume' file field".to_string()))?;
    if bytes.is_empty() {
        return Err(AppError::Validation("Resume file is empty".to_string()));
    }
    if bytes.len() > max_bytes {
        return Err(AppError::Validation(format!(
            "Resume exceeds the {max_bytes} byte limit"
        )));
    }

    let key = resume_key(application.id, format);
    let previous_key = application.resume_key;
    state.blobs.put(&key, bytes, format.content_type()).await?;

    let application = state
        .store
        .set_application_resume(id, &key)
        .await?
        .ok_or_else(|| AppError::NotFound("Application not found".to_string()))?;

    // The replaced file is unreachable once the row points at the new one.
    discard_blobs(state.blobs.as_ref(), previous_key.filter(|old| *old != key)).await;

    info!("Resume uploaded for application {id}");
    Ok(Json(ApplicationResponse { application }))
}

/// GET /api/applications/:id/resume
pub async fn handle_download_resume(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Response, AppError> {
    let application = load_visible(&state, &auth, id).await?;
    let key = application
        .resume_key
        .ok_or_else(|| AppError::NotFound("No resume uploaded".to_string()))?;

    let blob = state
        .blobs
        .get(&key)
        .await?
        .ok_or_else(|| AppError::NotFound("No resume uploaded".to_string()))?;

    let file_name = key.rsplit('/').next().unwrap_or("resume");
    Ok((
        [
            (header::CONTENT_TYPE, blob.content_type),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{file_name}\""),
            ),
        ],
        blob.bytes,
    )
        .into_response())
}
