pub mod health;


use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post, put},
    Router,
};

use crate::applications::handlers as applications;
use crate::auth::handlers as auth;
use crate::dashboard::handlers as dashboard;
use crate::jobs::{handlers as jobs, saved};
use crate::state::AppState;

/// Multipart framing on top of the resume bytes themselves.
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

pub fn build_router(state: AppState) -> Router {
    let resume_body_limit = state.config.max_resume_bytes + MULTIPART_OVERHEAD_BYTES;

    Router::new()
        .route("/health", get(health::health_handler))
        // Auth
        .route("/api/auth/signup", post(auth::handle_signup))
        .route("/api/auth/login", post(auth::handle_login))
        .route("/api/auth/logout", post(auth::handle_logout))
        .route("/api/auth/me", get(auth::handle_me))
        // Jobs
        .route(
            "/api/jobs",
            get(jobs::handle_list_jobs).post(jobs::handle_create_job),
        )
        .route(
            "/api/jobs/:id",
            get(jobs::handle_get_job)
                .put(jobs::handle_update_job)
                .delete(jobs::handle_delete_job),
        )
        // Applications
        .route(
            "/api/applications",
            get(applications::handle_list_applications)
                .post(applications::handle_create_application),
        )
        .route(
            "/api/applications/:id",
            get(applications::handle_get_application).patch(applications::handle_update_status),
        )
        .route(
            "/api/applications/:id/resume",
            put(applications::handle_upload_resume)
                .get(applications::handle_download_resume)
                .layer(DefaultBodyLimit::max(resume_body_limit)),
        )
        // Saved jobs
        .route("/api/saved-jobs", get(saved::handle_list_saved))
        .route(
            "/api/saved-jobs/:job_id",
            put(saved::handle_save_job).delete(saved::handle_unsave_job),
        )
        // Dashboards
        .route(
            "/api/dashboard/candidate",
            get(dashboard::handle_candidate_dashboard),
        )
        .route(
            "/api/dashboard/recruiter",
            get(dashboard::handle_recruiter_dashboard),
        )
        .with_state(state)
}
