use anyhow::anyhow;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::application::{
    Application, ApplicationScope, ApplicationStatus, NewApplication,
};
use crate::models::job::{Job, JobStatus, NewJob};
use crate::models::user::{NewUser, User};
use crate::store::{status_changed, Store};

// Enum columns are TEXT; rows are decoded as strings and parsed into the
// domain types on the way out.

#[derive(Debug, FromRow)]
struct UserRow {
    id: Uuid,
    name: String,
    email: String,
    password_hash: String,
    role: String,
    company: Option<String>,
    created_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = AppError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        Ok(User {
            id: row.id,
            name: row.name,
            email: row.email,
            password_hash: row.password_hash,
            role: row.role.parse().map_err(corrupt)?,
            company: row.company,
            created_at: row.created_at,
        })
    }
}

#[derive(Debug, FromRow)]
struct JobRow {
    id: Uuid,
    title: String,
    company: String,
    location: String,
    job_type: String,
    experience: String,
    salary_min: i64,
    salary_max: i64,
    description: String,
    tags: Vec<String>,
    requirements: Vec<String>,
    status: String,
    posted_by: Uuid,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<JobRow> for Job {
    type Error = AppError;

    fn try_from(row: JobRow) -> Result<Self, Self::Error> {
        Ok(Job {
            id: row.id,
            title: row.title,
            company: row.company,
            location: row.location,
            job_type: row.job_type.parse().map_err(corrupt)?,
            experience: row.experience.parse().map_err(corrupt)?,
            salary_min: row.salary_min,
            salary_max: row.salary_max,
            description: row.description,
            tags: row.tags,
            requirements: row.requirements,
            status: row.status.parse().map_err(corrupt)?,
            posted_by: row.posted_by,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug, FromRow)]
struct ApplicationRow {
    id: Uuid,
    job_id: Uuid,
    candidate_id: Uuid,
    recruiter_id: Uuid,
    job_title: String,
    company: String,
    full_name: String,
    email: String,
    phone: Option<String>,
    cover_letter: Option<String>,
    resume_key: Option<String>,
    status: String,
    applied_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<ApplicationRow> for Application {
    type Error = AppError;

    fn try_from(row: ApplicationRow) -> Result<Self, Self::Error> {
        Ok(Application {
            id: row.id,
            job_id: row.job_id,
            candidate_id: row.candidate_id,
            recruiter_id: row.recruiter_id,
            job_title: row.job_title,
            company: row.company,
            full_name: row.full_name,
            email: row.email,
            phone: row.phone,
            cover_letter: row.cover_letter,
            resume_key: row.resume_key,
            status: row.status.parse().map_err(corrupt)?,
            applied_at: row.applied_at,
            updated_at: row.updated_at,
        })
    }
}

fn corrupt(msg: String) -> AppError {
    AppError::Internal(anyhow!("corrupt row: {msg}"))
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.is_unique_violation())
}

fn convert_all<R, T>(rows: Vec<R>) -> Result<Vec<T>, AppError>
where
    T: TryFrom<R, Error = AppError>,
{
    rows.into_iter().map(T::try_from).collect()
}

/// PostgreSQL-backed store. One table per collection; see `migrations/`.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Store for PgStore {
    async fn create_user(&self, user: NewUser) -> Result<User, AppError> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            INSERT INTO users (name, email, password_hash, role, company)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.role.as_str())
        .bind(&user.company)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                AppError::Conflict(format!("A user with email {} already exists", user.email))
            } else {
                AppError::Database(e)
            }
        })?;

        info!("Created {} account {}", user.role, row.id);
        row.try_into()
    }

    async fn get_user(&self, id: Uuid) -> Result<Option<User>, AppError> {
        sqlx::query_as::<_, UserRow>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .map(User::try_from)
            .transpose()
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        sqlx::query_as::<_, UserRow>("SELECT * FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?
            .map(User::try_from)
            .transpose()
    }

    async fn list_jobs(
        &self,
        status: Option<JobStatus>,
        posted_by: Option<Uuid>,
    ) -> Result<Vec<Job>, AppError> {
        let rows = sqlx::query_as::<_, JobRow>(
            r#"
            SELECT * FROM jobs
            WHERE ($1::text IS NULL OR status = $1)
              AND ($2::uuid IS NULL OR posted_by = $2)
            ORDER BY created_at DESC
            "#,
        )
        .bind(status.map(|s| s.as_str()))
        .bind(posted_by)
        .fetch_all(&self.pool)
        .await?;
        convert_all(rows)
    }

    async fn get_job(&self, id: Uuid) -> Result<Option<Job>, AppError> {
        sqlx::query_as::<_, JobRow>("SELECT * FROM jobs WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .map(Job::try_from)
            .transpose()
    }

    async fn create_job(&self, job: NewJob) -> Result<Job, AppError> {
        let row = sqlx::query_as::<_, JobRow>(
            r#"
            INSERT INTO jobs
                (title, company, location, job_type, experience, salary_min, salary_max,
                 description, tags, requirements, status, posted_by)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, 'Active', $11)
            RETURNING *
            "#,
        )
        .bind(&job.title)
        .bind(&job.company)
        .bind(&job.location)
        .bind(job.job_type.as_str())
        .bind(job.experience.as_str())
        .bind(job.salary_min)
        .bind(job.salary_max)
        .bind(&job.description)
        .bind(&job.tags)
        .bind(&job.requirements)
        .bind(job.posted_by)
        .fetch_one(&self.pool)
        .await?;

        info!("Recruiter {} posted job {}", job.posted_by, row.id);
        row.try_into()
    }

    async fn update_job(&self, job: &Job) -> Result<Job, AppError> {
        sqlx::query_as::<_, JobRow>(
            r#"
            UPDATE jobs SET
                title = $2, company = $3, location = $4, job_type = $5, experience = $6,
                salary_min = $7, salary_max = $8, description = $9, tags = $10,
                requirements = $11, status = $12, updated_at = now()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(job.id)
        .bind(&job.title)
        .bind(&job.company)
        .bind(&job.location)
        .bind(job.job_type.as_str())
        .bind(job.experience.as_str())
        .bind(job.salary_min)
        .bind(job.salary_max)
        .bind(&job.description)
        .bind(&job.tags)
        .bind(&job.requirements)
        .bind(job.status.as_str())
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Job {} not found", job.id)))?
        .try_into()
    }

    async fn delete_job(&self, id: Uuid) -> Result<bool, AppError> {
        // applications and saved_jobs rows go with it (ON DELETE CASCADE)
        let result = sqlx::query("DELETE FROM jobs WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_applications(
        &self,
        scope: ApplicationScope,
    ) -> Result<Vec<Application>, AppError> {
        let rows = sqlx::query_as::<_, ApplicationRow>(
            r#"
            SELECT * FROM applications
            WHERE ($1::uuid IS NULL OR candidate_id = $1)
              AND ($2::uuid IS NULL OR recruiter_id = $2)
              AND ($3::uuid IS NULL OR job_id = $3)
            ORDER BY applied_at DESC
            "#,
        )
        .bind(scope.candidate_id)
        .bind(scope.recruiter_id)
        .bind(scope.job_id)
        .fetch_all(&self.pool)
        .await?;
        convert_all(rows)
    }

    async fn get_application(&self, id: Uuid) -> Result<Option<Application>, AppError> {
        sqlx::query_as::<_, ApplicationRow>("SELECT * FROM applications WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .map(Application::try_from)
            .transpose()
    }

    async fn find_application(
        &self,
        candidate_id: Uuid,
        job_id: Uuid,
    ) -> Result<Option<Application>, AppError> {
        sqlx::query_as::<_, ApplicationRow>(
            "SELECT * FROM applications WHERE candidate_id = $1 AND job_id = $2",
        )
        .bind(candidate_id)
        .bind(job_id)
        .fetch_optional(&self.pool)
        .await?
        .map(Application::try_from)
        .transpose()
    }

    async fn create_application(
        &self,
        application: NewApplication,
    ) -> Result<Application, AppError> {
        let row = sqlx::query_as::<_, ApplicationRow>(
            r#"
            INSERT INTO applications
                (job_id, candidate_id, recruiter_id, job_title, company,
                 full_name, email, phone, cover_letter, status)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, 'Pending')
            RETURNING *
            "#,
        )
        .bind(application.job_id)
        .bind(application.candidate_id)
        .bind(application.recruiter_id)
        .bind(&application.job_title)
        .bind(&application.company)
        .bind(&application.full_name)
        .bind(&application.email)
        .bind(&application.phone)
        .bind(&application.cover_letter)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                AppError::Conflict("You have already applied to this job".to_string())
            } else {
                AppError::Database(e)
            }
        })?;

        info!(
            "Candidate {} applied to job {} (application {})",
            application.candidate_id, application.job_id, row.id
        );
        row.try_into()
    }

    async fn update_application_status(
        &self,
        id: Uuid,
        from: ApplicationStatus,
        to: ApplicationStatus,
    ) -> Result<Option<Application>, AppError> {
        let row = sqlx::query_as::<_, ApplicationRow>(
            r#"
            UPDATE applications SET status = $2, updated_at = now()
            WHERE id = $1 AND status = $3
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(to.as_str())
        .bind(from.as_str())
        .fetch_optional(&self.pool)
        .await?;

        if let Some(row) = row {
            return Application::try_from(row).map(Some);
        }
        // Nothing matched: either the application is gone or its status moved on.
        match self.get_application(id).await? {
            Some(current) => Err(status_changed(current.status)),
            None => Ok(None),
        }
    }

    async fn set_application_resume(
        &self,
        id: Uuid,
        resume_key: &str,
    ) -> Result<Option<Application>, AppError> {
        sqlx::query_as::<_, ApplicationRow>(
            "UPDATE applications SET resume_key = $2, updated_at = now() WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(resume_key)
        .fetch_optional(&self.pool)
        .await?
        .map(Application::try_from)
        .transpose()
    }

    async fn save_job(&self, user_id: Uuid, job_id: Uuid) -> Result<(), AppError> {
        sqlx::query(
            "INSERT INTO saved_jobs (user_id, job_id) VALUES ($1, $2) ON CONFLICT DO NOTHING",
        )
        .bind(user_id)
        .bind(job_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn unsave_job(&self, user_id: Uuid, job_id: Uuid) -> Result<(), AppError> {
        sqlx::query("DELETE FROM saved_jobs WHERE user_id = $1 AND job_id = $2")
            .bind(user_id)
            .bind(job_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn list_saved_jobs(&self, user_id: Uuid) -> Result<Vec<Job>, AppError> {
        let rows = sqlx::query_as::<_, JobRow>(
            r#"
            SELECT j.* FROM saved_jobs s
            JOIN jobs j ON j.id = s.job_id
            WHERE s.user_id = $1
            ORDER BY s.saved_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        convert_all(rows)
    }
}
