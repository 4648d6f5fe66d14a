use std::collections::HashMap;

use serde::Serialize;
use uuid::Uuid;

use crate::models::application::{Application, ApplicationStatus};
use crate::models::job::{Job, JobStatus};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CandidateStats {
    pub total: usize,
    pub pending: usize,
    pub reviewed: usize,
    pub interview: usize,
    pub accepted: usize,
    pub rejected: usize,
}

pub fn candidate_stats(applications: &[Application]) -> CandidateStats {
    let mut stats = CandidateStats {
        total: applications.len(),
        ..Default::default()
    };
    for application in applications {
        let bucket = match application.status {
            ApplicationStatus::Pending => &mut stats.pending,
            ApplicationStatus::Reviewed => &mut stats.reviewed,
            ApplicationStatus::Interview => &mut stats.interview,
            ApplicationStatus::Accepted => &mut stats.accepted,
            ApplicationStatus::Rejected => &mut stats.rejected,
        };
        *bucket += 1;
    }
    stats
}

#[derive(Debug, Clone, Serialize)]
pub struct PostedJob {
    pub job: Job,
    pub applicant_count: usize,
    /// Applicants still `Pending`.
    pub new_applicant_count: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RecruiterStats {
    pub active_jobs: usize,
    pub closed_jobs: usize,
    pub total_applicants: usize,
    pub pending_review: usize,
}

/// Pairs each posted job with its applicant counts. Job order is preserved.
pub fn recruiter_summary(
    jobs: Vec<Job>,
    applications: &[Application],
) -> (Vec<PostedJob>, RecruiterStats) {
    let mut counts: HashMap<Uuid, (usize, usize)> = HashMap::new();
    for application in applications {
        let entry = counts.entry(application.job_id).or_default();
        entry.0 += 1;
        if application.status == ApplicationStatus::Pending {
            entry.1 += 1;
        }
    }

    let mut stats = RecruiterStats::default();
    let posted: Vec<PostedJob> = jobs
        .into_iter()
        .map(|job| {
            let (applicant_count, new_applicant_count) =
                counts.get(&job.id).copied().unwrap_or_default();
            match job.status {
                JobStatus::Active => stats.active_jobs += 1,
                JobStatus::Closed => stats.closed_jobs += 1,
            }
            stats.total_applicants += applicant_count;
            stats.pending_review += new_applicant_count;
            PostedJob {
                job,
                applicant_count,
                new_applicant_count,
            }
        })
        .collect();

    (posted, stats)
}
