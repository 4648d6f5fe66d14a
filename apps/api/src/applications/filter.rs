use serde::Deserialize;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::application::{Application, ApplicationStatus};

/// Query string for `GET /api/applications`.
#[derive(Debug, Default, Deserialize)]
pub struct ApplicationListParams {
    pub job_id: Option<Uuid>,
    pub status: Option<String>,
    pub search: Option<String>,
    pub sort: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ApplicantSort {
    #[default]
    Recent,
    Oldest,
    Name,
}

#[derive(Debug, Clone, Default)]
pub struct ApplicantFilter {
    pub status: Option<ApplicationStatus>,
    /// Lowercased.
    pub term: Option<String>,
    pub sort: ApplicantSort,
}

impl ApplicantFilter {
    pub fn from_params(params: &ApplicationListParams) -> Result<Self, AppError> {
        let status = match params.status.as_deref().map(str::trim) {
            None | Some("") | Some("all") => None,
            Some(s) => Some(s.parse::<ApplicationStatus>().map_err(AppError::Validation)?),
        };
        let sort = match params.sort.as_deref().map(str::trim) {
            None | Some("") | Some("recent") => ApplicantSort::Recent,
            Some("oldest") => ApplicantSort::Oldest,
            Some("name") => ApplicantSort::Name,
            Some(other) => {
                return Err(AppError::Validation(format!("unknown sort '{other}'")));
            }
        };
        let term = params
            .search
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_lowercase);

        Ok(ApplicantFilter { status, term, sort })
    }

    pub fn matches(&self, application: &Application) -> bool {
        if let Some(status) = self.status {
            if application.status != status {
                return false;
            }
        }
        if let Some(term) = &self.term {
            if !application.full_name.to_lowercase().contains(term.as_str())
                && !application.email.to_lowercase().contains(term.as_str())
            {
                return false;
            }
        }
        true
    }

    pub fn apply(&self, applications: Vec<Application>) -> Vec<Application> {
        let mut out: Vec<Application> =
            applications.into_iter().filter(|a| self.matches(a)).collect();
        match self.sort {
            ApplicantSort::Recent => out.sort_by(|a, b| b.applied_at.cmp(&a.applied_at)),
            ApplicantSort::Oldest => out.sort_by(|a, b| a.applied_at.cmp(&b.applied_at)),
            ApplicantSort::Name => out.sort_by(|a, b| {
                a.full_name
                    .to_lowercase()
                    .cmp(&b.full_name.to_lowercase())
            }),
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn applicant(name: &str, email: &str, status: ApplicationStatus, days_ago: i64) -> Application {
        let applied_at = Utc::now() - Duration::days(days_ago);
        Application {
            id: Uuid::new_v4(),
            job_id: Uuid::new_v4(),
            candidate_id: Uuid::new_v4(),
            recruiter_id: Uuid::new_v4(),
            job_title: "Engineer".to_string(),
            company: "Acme".to_string(),
            full_name: name.to_string(),
            email: email.to_string(),
            phone: None,
            cover_letter: None,
            resume_key: None,
            status,
            applied_at,
            updated_at: applied_at,
        }
    }

    fn names(apps: &[Application]) -> Vec<&str> {
        apps.iter().map(|a| a.full_name.as_str()).collect()
    }

    fn sample() -> Vec<Application> {
        vec![
            applicant("carol Diaz", "carol@example.com", ApplicationStatus::Pending, 1),
            applicant("Alice Smith", "alice@work.io", ApplicationStatus::Interview, 5),
            applicant("Bob Jones", "bjones@example.com", ApplicationStatus::Pending, 3),
        ]
    }

    #[test]
    fn default_sort_is_most_recent_first() {
        let filter = ApplicantFilter::from_params(&ApplicationListParams::default()).unwrap();
        assert_eq!(
            names(&filter.apply(sample())),
            vec!["carol Diaz", "Bob Jones", "Alice Smith"]
        );
    }

    #[test]
    fn oldest_and_name_sorts() {
        let oldest = ApplicantFilter::from_params(&ApplicationListParams {
            sort: Some("oldest".into()),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(
            names(&oldest.apply(sample())),
            vec!["Alice Smith", "Bob Jones", "carol Diaz"]
        );

        let by_name = ApplicantFilter::from_params(&ApplicationListParams {
            sort: Some("name".into()),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(
            names(&by_name.apply(sample())),
            vec!["Alice Smith", "Bob Jones", "carol Diaz"]
        );
    }

    #[test]
    fn status_and_search_filters() {
        let pending = ApplicantFilter::from_params(&ApplicationListParams {
            status: Some("Pending".into()),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(pending.apply(sample()).len(), 2);

        let by_email = ApplicantFilter::from_params(&ApplicationListParams {
            search: Some("EXAMPLE.COM".into()),
            status: Some("all".into()),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(
            names(&by_email.apply(sample())),
            vec!["carol Diaz", "Bob Jones"]
        );
    }

    #[test]
    fn rejects_unknown_status_or_sort() {
        assert!(ApplicantFilter::from_params(&ApplicationListParams {
            status: Some("Hired".into()),
            ..Default::default()
        })
        .is_err());
        assert!(ApplicantFilter::from_params(&ApplicationListParams {
            sort: Some("salary".into()),
            ..Default::default()
        })
        .is_err());
    }
}
