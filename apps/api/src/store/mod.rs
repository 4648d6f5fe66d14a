//! Persistence seam for users, jobs, applications and saved jobs.
//!
//! `AppState` holds an `Arc<dyn Store>`: `PgStore` in production,
//! `MemoryStore` for local demos and tests.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::application::{
    Application, ApplicationScope, ApplicationStatus, NewApplication,
};
use crate::models::job::{Job, JobStatus, NewJob};
use crate::models::user::{NewUser, User};

pub use memory::MemoryStore;
pub use postgres::PgStore;

fn status_changed(current: ApplicationStatus) -> AppError {
    AppError::Conflict(format!(
        "Application status was changed to {} by another request",
        current.as_str()
    ))
}

#[async_trait]
pub trait Store: Send + Sync {
    /// Inserts a user. A duplicate email yields `AppError::Conflict`.
    async fn create_user(&self, user: NewUser) -> Result<User, AppError>;
    async fn get_user(&self, id: Uuid) -> Result<Option<User>, AppError>;
    /// Looks up by the normalized (lowercased) email.
    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, AppError>;

    /// Jobs newest first, optionally narrowed by status and poster.
    async fn list_jobs(
        &self,
        status: Option<JobStatus>,
        posted_by: Option<Uuid>,
    ) -> Result<Vec<Job>, AppError>;
    async fn get_job(&self, id: Uuid) -> Result<Option<Job>, AppError>;
    async fn create_job(&self, job: NewJob) -> Result<Job, AppError>;
    /// Persists every mutable field of `job` and bumps `updated_at`.
    async fn update_job(&self, job: &Job) -> Result<Job, AppError>;
    /// Deletes a job with its applications and saved entries.
    /// Returns false when no such job existed.
    async fn delete_job(&self, id: Uuid) -> Result<bool, AppError>;

    /// Applications newest first.
    async fn list_applications(
        &self,
        scope: ApplicationScope,
    ) -> Result<Vec<Application>, AppError>;
    async fn get_application(&self, id: Uuid) -> Result<Option<Application>, AppError>;
    async fn find_application(
        &self,
        candidate_id: Uuid,
        job_id: Uuid,
    ) -> Result<Option<Application>, AppError>;
    /// A second application for the same candidate and job yields `AppError::Conflict`.
    async fn create_application(&self, application: NewApplication)
        -> Result<Application, AppError>;
    /// Moves an application from `from` to `to` in one step. If the stored
    /// status is no longer `from` the write is refused with `AppError::Conflict`.
    async fn update_application_status(
        &self,
        id: Uuid,
        from: ApplicationStatus,
        to: ApplicationStatus,
    ) -> Result<Option<Application>, AppError>;
    async fn set_application_resume(
        &self,
        id: Uuid,
        resume_key: &str,
    ) -> Result<Option<Application>, AppError>;

    /// Idempotent.
    async fn save_job(&self, user_id: Uuid, job_id: Uuid) -> Result<(), AppError>;
    /// Idempotent.
    async fn unsave_job(&self, user_id: Uuid, job_id: Uuid) -> Result<(), AppError>;
    /// Saved jobs, most recently saved first.
    async fn list_saved_jobs(&self, user_id: Uuid) -> Result<Vec<Job>, AppError>;
}
