//! Read-only joins between companies and the records that mention them.
//!
//! Jobs and contacts belong to a company by name. Tasks belong to it by name
//! or by a `relatedTo` reference of type `company`. Results are recomputed on
//! every call and keep collection order.

use std::cmp::Reverse;

use chrono::NaiveDate;

use crate::models::{Company, Contact, Job, RelatedKind, Task, TaskStatus};
use crate::store::Tracker;
use crate::utils::names_match;

/// Jobs whose company name matches `company`
#[must_use]
pub fn company_jobs<'a>(jobs: &'a [Job], company: &Company) -> Vec<&'a Job> {
    jobs.iter().filter(|job| names_match(&job.company, &company.name)).collect()
}

/// Contacts whose company name matches `company`
#[must_use]
pub fn company_contacts<'a>(contacts: &'a [Contact], company: &Company) -> Vec<&'a Contact> {
    contacts
        .iter()
        .filter(|contact| names_match(&contact.company, &company.name))
        .collect()
}

/// True when `task` belongs to `company` by name or by reference
#[must_use]
pub fn task_belongs_to(task: &Task, company: &Company) -> bool {
    let by_name = task
        .company
        .as_deref()
        .is_some_and(|name| names_match(name, &company.name));
    let by_reference = task
        .related_to
        .as_ref()
        .is_some_and(|related| related.kind == RelatedKind::Company && related.id == company.id);
    by_name || by_reference
}

/// Tasks belonging to `company`, each at most once
#[must_use]
pub fn company_tasks<'a>(tasks: &'a [Task], company: &Company) -> Vec<&'a Task> {
    tasks.iter().filter(|task| task_belongs_to(task, company)).collect()
}

/// Everything linked to one company
#[derive(Debug, Clone)]
pub struct CompanyOverview<'a> {
    /// The company
    pub company: &'a Company,
    /// Jobs at the company
    pub jobs: Vec<&'a Job>,
    /// Contacts at the company
    pub contacts: Vec<&'a Contact>,
    /// Tasks for the company
    pub tasks: Vec<&'a Task>,
}

impl<'a> CompanyOverview<'a> {
    /// Join `company` against the given collections
    #[must_use]
    pub fn build(company: &'a Company, jobs: &'a [Job], contacts: &'a [Contact], tasks: &'a [Task]) -> Self {
        Self {
            company,
            jobs: company_jobs(jobs, company),
            contacts: company_contacts(contacts, company),
            tasks: company_tasks(tasks, company),
        }
    }

    /// Number of tasks still pending
    #[must_use]
    pub fn pending_task_count(&self) -> usize {
        self.tasks.iter().filter(|task| task.status == TaskStatus::Pending).count()
    }

    /// Up to `n` jobs, most recently applied first; ties keep collection order
    #[must_use]
    pub fn recent_jobs(&self, n: usize) -> Vec<&'a Job> {
        let mut jobs = self.jobs.clone();
        jobs.sort_by_key(|job| Reverse(job.date_applied));
        jobs.truncate(n);
        jobs
    }

    /// Up to `n` pending tasks, soonest due first, undated last
    #[must_use]
    pub fn upcoming_tasks(&self, n: usize) -> Vec<&'a Task> {
        let mut tasks: Vec<&'a Task> = self
            .tasks
            .iter()
            .copied()
            .filter(|task| task.status == TaskStatus::Pending)
            .collect();
        tasks.sort_by_key(|task| (task.due_date.is_none(), task.due_date));
        tasks.truncate(n);
        tasks
    }

    /// Pending tasks due before `today`
    #[must_use]
    pub fn overdue_tasks(&self, today: NaiveDate) -> Vec<&'a Task> {
        self.tasks.iter().copied().filter(|task| task.is_overdue(today)).collect()
    }
}

impl Tracker {
    /// Overview of the company with `id`; `None` when it does not exist
    #[must_use]
    pub fn company_overview(&self, id: &str) -> Option<CompanyOverview<'_>> {
        self.company(id)
            .map(|company| CompanyOverview::build(company, self.jobs(), self.contacts(), self.tasks()))
    }

    /// Overview of the company called `name`, ignoring case
    #[must_use]
    pub fn company_overview_by_name(&self, name: &str) -> Option<CompanyOverview<'_>> {
        self.company_named(name)
            .map(|company| CompanyOverview::build(company, self.jobs(), self.contacts(), self.tasks()))
    }

    /// Tasks whose `relatedTo` points at the given record
    #[must_use]
    pub fn related_tasks(&self, kind: RelatedKind, id: &str) -> Vec<&Task> {
        self.tasks()
            .iter()
            .filter(|task| {
                task.related_to
                    .as_ref()
                    .is_some_and(|related| related.kind == kind && related.id == id)
            })
            .collect()
    }

    /// Pending tasks due before `today`, across all companies
    #[must_use]
    pub fn overdue_tasks(&self, today: NaiveDate) -> Vec<&Task> {
        self.tasks().iter().filter(|task| task.is_overdue(today)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{JobStatus, RelatedTo};

    fn job(id: &str, company: &str, day: u32) -> Job {
        Job {
            id: id.into(),
            title: "Engineer".into(),
            company: company.into(),
            location: String::new(),
            status: JobStatus::Applied,
            date_applied: NaiveDate::from_ymd_opt(2024, 2, day).unwrap(),
            description: None,
            salary: None,
            notes: None,
            notes_list: Vec::new(),
        }
    }

    #[test]
    fn test_task_matching_both_ways_listed_once() {
        let acme = Company::named("c1", "Acme");
        let mut both = Task::new("t1", "Both");
        both.company = Some("ACME".into());
        both.related_to = Some(RelatedTo {
            kind: RelatedKind::Company,
            id: "c1".into(),
        });
        let mut wrong_kind = Task::new("t2", "Job with same id");
        wrong_kind.related_to = Some(RelatedTo {
            kind: RelatedKind::Job,
            id: "c1".into(),
        });
        let tasks = vec![both, wrong_kind];

        let matched = company_tasks(&tasks, &acme);
        assert_eq!(matched.len(), 1);
        assert_eq!(matched[0].id, "t1");
    }

    #[test]
    fn test_recent_jobs_sorted_by_date() {
        let acme = Company::named("c1", "Acme");
        let jobs = vec![job("a", "Acme", 1), job("b", "acme", 20), job("c", "Acme", 10), job("d", "Other", 28)];
        let overview = CompanyOverview::build(&acme, &jobs, &[], &[]);
        let ids: Vec<&str> = overview.recent_jobs(2).iter().map(|j| j.id.as_str()).collect();
        assert_eq!(ids, ["b", "c"]);
        assert_eq!(overview.jobs.len(), 3);
    }

    #[test]
    fn test_upcoming_tasks_undated_last() {
        let acme = Company::named("c1", "Acme");
        let mut undated = Task::new("u", "Undated");
        undated.company = Some("Acme".into());
        let mut soon = Task::new("s", "Soon");
        soon.company = Some("Acme".into());
        soon.due_date = NaiveDate::from_ymd_opt(2024, 3, 1);
        let mut done = Task::new("d", "Done");
        done.company = Some("Acme".into());
        done.status = TaskStatus::Completed;
        let tasks = vec![undated, soon, done];

        let overview = CompanyOverview::build(&acme, &[], &[], &tasks);
        let ids: Vec<&str> = overview.upcoming_tasks(5).iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, ["s", "u"]);
        assert_eq!(overview.pending_task_count(), 2);
    }
}
