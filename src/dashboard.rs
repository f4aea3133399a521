//! Dashboard aggregates derived from the live collections.
//!
//! Nothing here is cached; every figure is a point-in-time snapshot computed
//! by scanning the job collection.

use std::fmt;

use serde::Serialize;

use crate::models::{Company, Contact, Job, JobStatus, Task, TaskStatus};
use crate::store::Tracker;

/// Number of jobs in each status; every status is present
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StatusCounts {
    counts: [usize; JobStatus::ALL.len()],
}

impl StatusCounts {
    /// Count the statuses of `jobs`
    #[must_use]
    pub fn from_jobs(jobs: &[Job]) -> Self {
        let mut counts = [0; JobStatus::ALL.len()];
        for job in jobs {
            counts[job.status as usize] += 1;
        }
        Self { counts }
    }

    /// Jobs with `status`
    #[must_use]
    pub const fn get(&self, status: JobStatus) -> usize {
        self.counts[status as usize]
    }

    /// Every status with its count, in pipeline order
    pub fn iter(&self) -> impl Iterator<Item = (JobStatus, usize)> + '_ {
        JobStatus::ALL.iter().map(|status| (*status, self.get(*status)))
    }

    /// Sum over all statuses
    #[must_use]
    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }
}

/// A ratio shown as a percentage
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rate {
    /// Matching jobs
    pub numerator: usize,
    /// All jobs
    pub denominator: usize,
}

impl Rate {
    /// `numerator / denominator`
    #[must_use]
    pub const fn new(numerator: usize, denominator: usize) -> Self {
        Self {
            numerator,
            denominator,
        }
    }

    /// Percentage in tenths, halves rounded up; 0 when there is nothing to divide by
    #[must_use]
    pub const fn tenths(&self) -> usize {
        if self.denominator == 0 {
            return 0;
        }
        (self.numerator * 2000 + self.denominator) / (2 * self.denominator)
    }
}

/// `"0"` with no jobs, otherwise one decimal place, e.g. `"33.3"`
impl fmt::Display for Rate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.denominator == 0 {
            f.write_str("0")
        } else {
            let tenths = self.tenths();
            write!(f, "{}.{}", tenths / 10, tenths % 10)
        }
    }
}

impl Serialize for Rate {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Funnel figures for the job collection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JobFunnel {
    /// Count per status
    pub status_counts: StatusCounts,
    /// All jobs
    pub total_jobs: usize,
    /// Jobs not yet closed
    pub active_pipeline: usize,
    /// Jobs in an interview stage
    pub in_interview_process: usize,
    /// Jobs that reached an offer
    pub total_offers: usize,
}

impl JobFunnel {
    /// Compute from `jobs`
    #[must_use]
    pub fn from_jobs(jobs: &[Job]) -> Self {
        let status_counts = StatusCounts::from_jobs(jobs);
        let total_jobs = jobs.len();
        let sum_where = |pred: fn(JobStatus) -> bool| -> usize {
            status_counts
                .iter()
                .filter(|(status, _)| pred(*status))
                .map(|(_, count)| count)
                .sum()
        };

        Self {
            status_counts,
            total_jobs,
            active_pipeline: total_jobs - sum_where(JobStatus::is_closed),
            in_interview_process: sum_where(JobStatus::is_interview_stage),
            total_offers: sum_where(JobStatus::is_offer),
        }
    }

    /// Offers over all jobs
    #[must_use]
    pub const fn success_rate(&self) -> Rate {
        Rate::new(self.total_offers, self.total_jobs)
    }

    /// Jobs past `applied` over all jobs
    #[must_use]
    pub const fn response_rate(&self) -> Rate {
        Rate::new(self.total_jobs - self.status_counts.get(JobStatus::Applied), self.total_jobs)
    }

    /// Jobs in an interview stage over all jobs
    #[must_use]
    pub const fn interview_rate(&self) -> Rate {
        Rate::new(self.in_interview_process, self.total_jobs)
    }
}

/// Everything the dashboard shows
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardMetrics {
    /// All jobs
    pub total_jobs: usize,
    /// Jobs not yet closed
    pub active_pipeline: usize,
    /// Jobs in an interview stage
    pub in_interview_process: usize,
    /// Jobs that reached an offer
    pub total_offers: usize,
    /// Offers over all jobs
    pub success_rate: Rate,
    /// Jobs past `applied` over all jobs
    pub response_rate: Rate,
    /// Jobs in an interview stage over all jobs
    pub interview_rate: Rate,
    /// Count per status in pipeline order
    pub status_counts: Vec<(JobStatus, usize)>,
    /// Pending tasks
    pub pending_tasks: usize,
    /// Contacts
    pub total_contacts: usize,
    /// Companies
    pub total_companies: usize,
    /// Jobs with at least one note
    pub jobs_with_notes: usize,
}

impl DashboardMetrics {
    /// Compute from the four collections
    #[must_use]
    pub fn compute(jobs: &[Job], contacts: &[Contact], companies: &[Company], tasks: &[Task]) -> Self {
        let funnel = JobFunnel::from_jobs(jobs);
        Self {
            total_jobs: funnel.total_jobs,
            active_pipeline: funnel.active_pipeline,
            in_interview_process: funnel.in_interview_process,
            total_offers: funnel.total_offers,
            success_rate: funnel.success_rate(),
            response_rate: funnel.response_rate(),
            interview_rate: funnel.interview_rate(),
            status_counts: funnel.status_counts.iter().collect(),
            pending_tasks: tasks.iter().filter(|task| task.status == TaskStatus::Pending).count(),
            total_contacts: contacts.len(),
            total_companies: companies.len(),
            jobs_with_notes: jobs.iter().filter(|job| !job.notes_list.is_empty()).count(),
        }
    }
}

impl Tracker {
    /// Funnel figures for the current jobs
    #[must_use]
    pub fn job_funnel(&self) -> JobFunnel {
        JobFunnel::from_jobs(self.jobs())
    }

    /// Dashboard figures for the current collections
    #[must_use]
    pub fn dashboard(&self) -> DashboardMetrics {
        DashboardMetrics::compute(self.jobs(), self.contacts(), self.companies(), self.tasks())
    }
}
