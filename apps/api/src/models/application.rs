use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ApplicationStatus {
    Pending,
    Reviewed,
    Interview,
    Accepted,
    Rejected,
}

impl ApplicationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApplicationStatus::Pending => "Pending",
            ApplicationStatus::Reviewed => "Reviewed",
            ApplicationStatus::Interview => "Interview",
            ApplicationStatus::Accepted => "Accepted",
            ApplicationStatus::Rejected => "Rejected",
        }
    }

    /// Accepted and Rejected are final decisions.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ApplicationStatus::Accepted | ApplicationStatus::Rejected
        )
    }

    /// Whether a recruiter may move an application from `self` to `next`.
    /// Statuses only move forward; staying put is always allowed.
    pub fn can_transition_to(&self, next: ApplicationStatus) -> bool {
        use ApplicationStatus::*;

        if *self == next {
            return true;
        }
        if self.is_terminal() {
            return false;
        }
        match self {
            Pending => next != Pending,
            Reviewed => matches!(next, Interview | Accepted | Rejected),
            Interview => matches!(next, Accepted | Rejected),
            Accepted | Rejected => false,
        }
    }
}

impl FromStr for ApplicationStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Pending" => Ok(ApplicationStatus::Pending),
            "Reviewed" => Ok(ApplicationStatus::Reviewed),
            "Interview" => Ok(ApplicationStatus::Interview),
            "Accepted" => Ok(ApplicationStatus::Accepted),
            "Rejected" => Ok(ApplicationStatus::Rejected),
            other => Err(format!("unknown application status '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Application {
    pub id: Uuid,
    pub job_id: Uuid,
    pub candidate_id: Uuid,
    pub recruiter_id: Uuid,
    pub job_title: String,
    pub company: String,
    pub full_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub cover_letter: Option<String>,
    pub resume_key: Option<String>,
    pub status: ApplicationStatus,
    pub applied_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Application {
    /// The applying candidate and the job's recruiter may see an application.
    pub fn is_visible_to(&self, user_id: Uuid) -> bool {
        self.candidate_id == user_id || self.recruiter_id == user_id
    }
}

#[derive(Debug, Clone)]
pub struct NewApplication {
    pub job_id: Uuid,
    pub candidate_id: Uuid,
    pub recruiter_id: Uuid,
    pub job_title: String,
    pub company: String,
    pub full_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub cover_letter: Option<String>,
}

/// Narrows an application listing. `None` fields do not filter.
#[derive(Debug, Clone, Copy, Default)]
pub struct ApplicationScope {
    pub candidate_id: Option<Uuid>,
    pub recruiter_id: Option<Uuid>,
    pub job_id: Option<Uuid>,
}

#[cfg(test)]
mod tests {
    use super::ApplicationStatus::*;
    use super::*;

    #[test]
    fn pending_can_move_to_any_later_status() {
        for next in [Reviewed, Interview, Accepted, Rejected] {
            assert!(Pending.can_transition_to(next), "Pending -> {next:?}");
        }
    }

    #[test]
    fn statuses_never_move_backwards() {
        assert!(!Reviewed.can_transition_to(Pending));
        assert!(!Interview.can_transition_to(Reviewed));
        assert!(!Interview.can_transition_to(Pending));
    }

    #[test]
    fn decisions_are_final() {
        for terminal in [Accepted, Rejected] {
            assert!(terminal.is_terminal());
            for next in [Pending, Reviewed, Interview] {
                assert!(!terminal.can_transition_to(next));
            }
        }
        assert!(!Accepted.can_transition_to(Rejected));
        assert!(!Rejected.can_transition_to(Accepted));
    }

    #[test]
    fn same_status_is_allowed() {
        for status in [Pending, Reviewed, Interview, Accepted, Rejected] {
            assert!(status.can_transition_to(status));
        }
    }

    #[test]
    fn parses_only_exact_status_names() {
        assert_eq!("Interview".parse::<ApplicationStatus>(), Ok(Interview));
        assert!("interview".parse::<ApplicationStatus>().is_err());
        assert!("Hired".parse::<ApplicationStatus>().is_err());
    }
}
