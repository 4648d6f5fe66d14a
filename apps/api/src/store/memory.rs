use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::application::{
    Application, ApplicationScope, ApplicationStatus, NewApplication,
};
use crate::models::job::{Job, JobStatus, NewJob};
use crate::models::user::{NewUser, User};
use crate::store::{status_changed, Store};

#[derive(Default)]
struct Collections {
    users: Vec<User>,
    // Insertion order; listings walk these in reverse for newest first.
    jobs: Vec<Job>,
    applications: Vec<Application>,
    saved: Vec<(Uuid, Uuid, DateTime<Utc>)>,
}

/// In-process store backed by vectors behind one lock.
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Collections>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn create_user(&self, user: NewUser) -> Result<User, AppError> {
        let mut db = self.inner.write().await;
        if db.users.iter().any(|u| u.email == user.email) {
            return Err(AppError::Conflict(format!(
                "A user with email {} already exists",
                user.email
            )));
        }
        let user = User {
            id: Uuid::new_v4(),
            name: user.name,
            email: user.email,
            password_hash: user.password_hash,
            role: user.role,
            company: user.company,
            created_at: Utc::now(),
        };
        db.users.push(user.clone());
        Ok(user)
    }

    async fn get_user(&self, id: Uuid) -> Result<Option<User>, AppError> {
        let db = self.inner.read().await;
        Ok(db.users.iter().find(|u| u.id == id).cloned())
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let db = self.inner.read().await;
        Ok(db.users.iter().find(|u| u.email == email).cloned())
    }

    async fn list_jobs(
        &self,
        status: Option<JobStatus>,
        posted_by: Option<Uuid>,
    ) -> Result<Vec<Job>, AppError> {
        let db = self.inner.read().await;
        Ok(db
            .jobs
            .iter()
            .rev()
            .filter(|j| status.map_or(true, |s| j.status == s))
            .filter(|j| posted_by.map_or(true, |p| j.posted_by == p))
            .cloned()
            .collect())
    }

    async fn get_job(&self, id: Uuid) -> Result<Option<Job>, AppError> {
        let db = self.inner.read().await;
        Ok(db.jobs.iter().find(|j| j.id == id).cloned())
    }

    async fn create_job(&self, job: NewJob) -> Result<Job, AppError> {
        let now = Utc::now();
        let job = Job {
            id: Uuid::new_v4(),
            title: job.title,
            company: job.company,
            location: job.location,
            job_type: job.job_type,
            experience: job.experience,
            salary_min: job.salary_min,
            salary_max: job.salary_max,
            description: job.description,
            tags: job.tags,
            requirements: job.requirements,
            status: JobStatus::Active,
            posted_by: job.posted_by,
            created_at: now,
            updated_at: now,
        };
        self.inner.write().await.jobs.push(job.clone());
        Ok(job)
    }

    async fn update_job(&self, job: &Job) -> Result<Job, AppError> {
        let mut db = self.inner.write().await;
        let stored = db
            .jobs
            .iter_mut()
            .find(|j| j.id == job.id)
            .ok_or_else(|| AppError::NotFound(format!("Job {} not found", job.id)))?;
        *stored = Job {
            id: stored.id,
            posted_by: stored.posted_by,
            created_at: stored.created_at,
            updated_at: Utc::now(),
            ..job.clone()
        };
        Ok(stored.clone())
    }

    async fn delete_job(&self, id: Uuid) -> Result<bool, AppError> {
        let mut db = self.inner.write().await;
        let before = db.jobs.len();
        db.jobs.retain(|j| j.id != id);
        if db.jobs.len() == before {
            return Ok(false);
        }
        db.applications.retain(|a| a.job_id != id);
        db.saved.retain(|(_, job_id, _)| *job_id != id);
        Ok(true)
    }

    async fn list_applications(
        &self,
        scope: ApplicationScope,
    ) -> Result<Vec<Application>, AppError> {
        let db = self.inner.read().await;
        Ok(db
            .applications
            .iter()
            .rev()
            .filter(|a| scope.candidate_id.map_or(true, |id| a.candidate_id == id))
            .filter(|a| scope.recruiter_id.map_or(true, |id| a.recruiter_id == id))
            .filter(|a| scope.job_id.map_or(true, |id| a.job_id == id))
            .cloned()
            .collect())
    }

    async fn get_application(&self, id: Uuid) -> Result<Option<Application>, AppError> {
        let db = self.inner.read().await;
        Ok(db.applications.iter().find(|a| a.id == id).cloned())
    }

    async fn find_application(
        &self,
        candidate_id: Uuid,
        job_id: Uuid,
    ) -> Result<Option<Application>, AppError> {
        let db = self.inner.read().await;
        Ok(db
            .applications
            .iter()
            .find(|a| a.candidate_id == candidate_id && a.job_id == job_id)
            .cloned())
    }

    async fn create_application(
        &self,
        application: NewApplication,
    ) -> Result<Application, AppError> {
        let mut db = self.inner.write().await;
        if db
            .applications
            .iter()
            .any(|a| a.candidate_id == application.candidate_id && a.job_id == application.job_id)
        {
            return Err(AppError::Conflict(
                "You have already applied to this job".to_string(),
            ));
        }
        let now = Utc::now();
        let application = Application {
            id: Uuid::new_v4(),
            job_id: application.job_id,
            candidate_id: application.candidate_id,
            recruiter_id: application.recruiter_id,
            job_title: application.job_title,
            company: application.company,
            full_name: application.full_name,
            email: application.email,
            phone: application.phone,
            cover_letter: application.cover_letter,
            resume_key: None,
            status: ApplicationStatus::Pending,
            applied_at: now,
            updated_at: now,
        };
        db.applications.push(application.clone());
        Ok(application)
    }

    async fn update_application_status(
        &self,
        id: Uuid,
        from: ApplicationStatus,
        to: ApplicationStatus,
    ) -> Result<Option<Application>, AppError> {
        let mut db = self.inner.write().await;
        let Some(application) = db.applications.iter_mut().find(|a| a.id == id) else {
            return Ok(None);
        };
        if application.status != from {
            return Err(status_changed(application.status));
        }
        application.status = to;
        application.updated_at = Utc::now();
        Ok(Some(application.clone()))
    }

    async fn set_application_resume(
        &self,
        id: Uuid,
        resume_key: &str,
    ) -> Result<Option<Application>, AppError> {
        let mut db = self.inner.write().await;
        Ok(db.applications.iter_mut().find(|a| a.id == id).map(|a| {
            a.resume_key = Some(resume_key.to_string());
            a.updated_at = Utc::now();
            a.clone()
        }))
    }

    async fn save_job(&self, user_id: Uuid, job_id: Uuid) -> Result<(), AppError> {
        let mut db = self.inner.write().await;
        if !db.saved.iter().any(|(u, j, _)| *u == user_id && *j == job_id) {
            db.saved.push((user_id, job_id, Utc::now()));
        }
        Ok(())
    }

    async fn unsave_job(&self, user_id: Uuid, job_id: Uuid) -> Result<(), AppError> {
        let mut db = self.inner.write().await;
        db.saved.retain(|(u, j, _)| !(*u == user_id && *j == job_id));
        Ok(())
    }

    async fn list_saved_jobs(&self, user_id: Uuid) -> Result<Vec<Job>, AppError> {
        let db = self.inner.read().await;
        Ok(db
            .saved
            .iter()
            .rev()
            .filter(|(u, _, _)| *u == user_id)
            .filter_map(|(_, job_id, _)| db.jobs.iter().find(|j| j.id == *job_id).cloned())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::job::{ExperienceLevel, JobType};
    use crate::models::user::Role;

    fn new_user(email: &str, role: Role) -> NewUser {
        NewUser {
            name: "Ada".to_string(),
            email: email.to_string(),
            password_hash: "hash".to_string(),
            role,
            company: None,
        }
    }

    fn new_job(posted_by: Uuid, title: &str) -> NewJob {
        NewJob {
            title: title.to_string(),
            company: "Acme".to_string(),
            location: "Remote".to_string(),
            job_type: JobType::FullTime,
            experience: ExperienceLevel::Mid,
            salary_min: 90_000,
            salary_max: 120_000,
            description: "Build things".to_string(),
            tags: vec!["rust".to_string()],
            requirements: vec![],
            posted_by,
        }
    }

    #[tokio::test]
    async fn duplicate_email_conflicts() {
        let store = MemoryStore::new();
        store
            .create_user(new_user("a@example.com", Role::Candidate))
            .await
            .unwrap();
        let err = store
            .create_user(new_user("a@example.com", Role::Recruiter))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn jobs_list_newest_first_and_filter_by_status() {
        let store = MemoryStore::new();
        let poster = Uuid::new_v4();
        let first = store.create_job(new_job(poster, "First")).await.unwrap();
        let second = store.create_job(new_job(poster, "Second")).await.unwrap();

        let mut closed = first.clone();
        closed.status = JobStatus::Closed;
        store.update_job(&closed).await.unwrap();

        let all = store.list_jobs(None, None).await.unwrap();
        assert_eq!(
            all.iter().map(|j| j.id).collect::<Vec<_>>(),
            vec![second.id, first.id]
        );
        let active = store.list_jobs(Some(JobStatus::Active), None).await.unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].id, second.id);
    }

    #[tokio::test]
    async fn deleting_a_job_cascades() {
        let store = MemoryStore::new();
        let recruiter = Uuid::new_v4();
        let candidate = Uuid::new_v4();
        let job = store.create_job(new_job(recruiter, "Gone")).await.unwrap();
        store
            .create_application(NewApplication {
                job_id: job.id,
                candidate_id: candidate,
                recruiter_id: recruiter,
                job_title: job.title.clone(),
                company: job.company.clone(),
                full_name: "Ada".to_string(),
                email: "ada@example.com".to_string(),
                phone: None,
                cover_letter: None,
            })
            .await
            .unwrap();
        store.save_job(candidate, job.id).await.unwrap();

        assert!(store.delete_job(job.id).await.unwrap());
        assert!(!store.delete_job(job.id).await.unwrap());
        assert!(store
            .find_application(candidate, job.id)
            .await
            .unwrap()
            .is_none());
        assert!(store.list_saved_jobs(candidate).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn status_update_from_a_stale_status_conflicts() {
        use ApplicationStatus::*;

        let store = MemoryStore::new();
        let job = store.create_job(new_job(Uuid::new_v4(), "Contested")).await.unwrap();
        let application = store
            .create_application(NewApplication {
                job_id: job.id,
                candidate_id: Uuid::new_v4(),
                recruiter_id: job.posted_by,
                job_title: job.title.clone(),
                company: job.company.clone(),
                full_name: "Ada".to_string(),
                email: "ada@example.com".to_string(),
                phone: None,
                cover_letter: None,
            })
            .await
            .unwrap();
        store
            .update_application_status(application.id, Pending, Reviewed)
            .await
            .unwrap();

        // Two decisions made against the same Reviewed snapshot.
        let accepted = store
            .update_application_status(application.id, Reviewed, Accepted)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(accepted.status, Accepted);
        let err = store
            .update_application_status(application.id, Reviewed, Rejected)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
        assert_eq!(err.status(), axum::http::StatusCode::CONFLICT);

        let stored = store.get_application(application.id).await.unwrap().unwrap();
        assert_eq!(stored.status, Accepted);
        assert!(store
            .update_application_status(Uuid::new_v4(), Reviewed, Accepted)
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn saving_twice_keeps_one_entry() {
        let store = MemoryStore::new();
        let user = Uuid::new_v4();
        let job = store.create_job(new_job(Uuid::new_v4(), "Saved")).await.unwrap();
        store.save_job(user, job.id).await.unwrap();
        store.save_job(user, job.id).await.unwrap();
        assert_eq!(store.list_saved_jobs(user).await.unwrap().len(), 1);

        store.unsave_job(user, job.id).await.unwrap();
        store.unsave_job(user, job.id).await.unwrap();
        assert!(store.list_saved_jobs(user).await.unwrap().is_empty());
    }
}
