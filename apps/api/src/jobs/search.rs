//! Job search: filters and ordering for the public listing.
//!
//! Runs over the list the store returns (newest first). Every filter is
//! optional; list-valued filters match when any listed value matches.

use serde::Deserialize;

use crate::errors::AppError;
use crate::models::job::{ExperienceLevel, Job, JobType};

/// Raw query string for `GET /api/jobs`.
#[derive(Debug, Default, Deserialize)]
pub struct JobSearchParams {
    pub search: Option<String>,
    pub location: Option<String>,
    #[serde(rename = "type")]
    pub job_type: Option<String>,
    /// Comma-separated experience levels.
    pub experience: Option<String>,
    /// Comma-separated salary bands.
    pub salary: Option<String>,
    pub sort: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SalaryBand {
    Under50k,
    From50kTo100k,
    From100kTo150k,
    Over150k,
}

impl SalaryBand {
    pub fn parse(s: &str) -> Result<Self, AppError> {
        match s {
            "under-50k" => Ok(SalaryBand::Under50k),
            "50k-100k" => Ok(SalaryBand::From50kTo100k),
            "100k-150k" => Ok(SalaryBand::From100kTo150k),
            "150k-plus" => Ok(SalaryBand::Over150k),
            other => Err(AppError::Validation(format!(
                "unknown salary band '{other}' \
                 (expected under-50k, 50k-100k, 100k-150k or 150k-plus)"
            ))),
        }
    }

    /// The whole advertised range must sit inside the band.
    pub fn contains(&self, min: i64, max: i64) -> bool {
        match self {
            SalaryBand::Under50k => max <= 50_000,
            SalaryBand::From50kTo100k => min >= 50_000 && max <= 100_000,
            SalaryBand::From100kTo150k => min >= 100_000 && max <= 150_000,
            SalaryBand::Over150k => min >= 150_000,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JobSort {
    #[default]
    Relevance,
    Recent,
    SalaryHigh,
    SalaryLow,
}

impl JobSort {
    pub fn parse(s: &str) -> Result<Self, AppError> {
        match s {
            "relevance" => Ok(JobSort::Relevance),
            "recent" => Ok(JobSort::Recent),
            "salary-high" => Ok(JobSort::SalaryHigh),
            "salary-low" => Ok(JobSort::SalaryLow),
            other => Err(AppError::Validation(format!("unknown sort '{other}'"))),
        }
    }
}

/// Parsed, validated search.
#[derive(Debug, Clone, Default)]
pub struct JobSearch {
    /// Lowercased.
    pub term: Option<String>,
    /// Lowercased.
    pub location: Option<String>,
    pub job_type: Option<JobType>,
    pub experience: Vec<ExperienceLevel>,
    pub salary: Vec<SalaryBand>,
    pub sort: JobSort,
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn comma_list(value: Option<&str>) -> impl Iterator<Item = &str> {
    value
        .unwrap_or("")
        .split(',')
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

impl JobSearch {
    pub fn from_params(params: &JobSearchParams) -> Result<Self, AppError> {
        let job_type = match non_empty(params.job_type.as_deref()) {
            None => None,
            Some(t) if t.eq_ignore_ascii_case("all") => None,
            Some(t) => Some(t.parse::<JobType>().map_err(AppError::Validation)?),
        };

        let experience = comma_list(params.experience.as_deref())
            .map(|e| e.parse::<ExperienceLevel>().map_err(AppError::Validation))
            .collect::<Result<Vec<_>, _>>()?;

        let salary = comma_list(params.salary.as_deref())
            .map(SalaryBand::parse)
            .collect::<Result<Vec<_>, _>>()?;

        let sort = match non_empty(params.sort.as_deref()) {
            Some(s) => JobSort::parse(s)?,
            None => JobSort::default(),
        };

        Ok(JobSearch {
            term: non_empty(params.search.as_deref()).map(str::to_lowercase),
            location: non_empty(params.location.as_deref()).map(str::to_lowercase),
            job_type,
            experience,
            salary,
            sort,
        })
    }

    pub fn matches(&self, job: &Job) -> bool {
        if let Some(term) = &self.term {
            if relevance(job, term) == 0 {
                return false;
            }
        }
        if let Some(location) = &self.location {
            if !job.location.to_lowercase().contains(location.as_str()) {
                return false;
            }
        }
        if let Some(job_type) = self.job_type {
            if job.job_type != job_type {
                return false;
            }
        }
        if !self.experience.is_empty() && !self.experience.contains(&job.experience) {
            return false;
        }
        if !self.salary.is_empty()
            && !self
                .salary
                .iter()
                .any(|band| band.contains(job.salary_min, job.salary_max))
        {
            return false;
        }
        true
    }

    /// Filters then orders. Sorts are stable, so ties keep store order.
    pub fn apply(&self, jobs: Vec<Job>) -> Vec<Job> {
        let mut jobs: Vec<Job> = jobs.into_iter().filter(|j| self.matches(j)).collect();
        match self.sort {
            JobSort::Relevance => {
                if let Some(term) = &self.term {
                    jobs.sort_by_key(|j| std::cmp::Reverse(relevance(j, term)));
                }
            }
            JobSort::Recent => jobs.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
            JobSort::SalaryHigh => jobs.sort_by(|a, b| b.salary_max.cmp(&a.salary_max)),
            JobSort::SalaryLow => jobs.sort_by(|a, b| a.salary_min.cmp(&b.salary_min)),
        }
        jobs
    }
}

/// 3 for a title hit, 2 for a tag hit, 1 for a company hit, 0 for none.
/// `term` must already be lowercase.
fn relevance(job: &Job, term: &str) -> u8 {
    if job.title.to_lowercase().contains(term) {
        3
    } else if job.tags.iter().any(|t| t.to_lowercase().contains(term)) {
        2
    } else if job.company.to_lowercase().contains(term) {
        1
    } else {
        0
    }
}
