use chrono::NaiveDate;
use proptest::prelude::*;

use job_tracker::models::{
    Company, Contact, ContactPatch, Job, JobPatch, JobStatus, NewNote, NoteOwner, NoteType, TaskPatch, TaskStatus,
};
use job_tracker::notes::notes_newest_first;
use job_tracker::utils::names_match;
use job_tracker::{MemoryStore, Task, Tracker, TrackerError};

fn tracker() -> Tracker {
    Tracker::load(Box::new(MemoryStore::new())).expect("Failed to load tracker")
}

fn job(id: &str, company: &str) -> Job {
    Job {
        id: id.to_string(),
        title: "Backend Engineer".to_string(),
        company: company.to_string(),
        location: "Berlin".to_string(),
        status: JobStatus::Applied,
        date_applied: NaiveDate::from_ymd_opt(2024, 6, 3).unwrap(),
        description: None,
        salary: Some("90k".to_string()),
        notes: None,
        notes_list: Vec::new(),
    }
}

fn contact(id: &str, company: &str) -> Contact {
    Contact {
        id: id.to_string(),
        name: "Priya Shah".to_string(),
        company: company.to_string(),
        role: "Recruiter".to_string(),
        email: None,
        phone: None,
        linkedin: None,
        notes: None,
        notes_list: Vec::new(),
    }
}

#[test]
fn test_creating_job_auto_creates_company() {
    let mut t = tracker();
    t.create_job(job("j1", "Acme")).expect("Failed to create job");

    assert_eq!(t.companies().len(), 1);
    let company = &t.companies()[0];
    assert_eq!(company.name, "Acme");
    assert!(company.website.is_none());
    assert!(company.industry.is_none());
    assert!(company.location.is_none());
    assert!(company.notes_list.is_empty());
}

#[test]
fn test_two_jobs_same_company_create_one_record() {
    let mut t = tracker();
    t.create_job(job("j1", "Acme")).unwrap();
    t.create_job(job("j2", "Acme")).unwrap();

    assert_eq!(t.companies().len(), 1);
}

#[test]
fn test_reconciliation_ignores_case_and_keeps_typed_name() {
    let mut t = tracker();
    t.create_job(job("j1", "Acme")).unwrap();
    t.create_contact(contact("c1", "ACME")).unwrap();

    assert_eq!(t.companies().len(), 1);
    assert_eq!(t.companies()[0].name, "Acme");
    assert_eq!(t.contact("c1").unwrap().company, "ACME");
}

#[test]
fn test_contact_update_reconciles_company() {
    let mut t = tracker();
    t.create_contact(contact("c1", "Acme")).unwrap();
    t.update_contact(
        "c1",
        ContactPatch {
            company: Some("Globex".to_string()),
            ..ContactPatch::default()
        },
    )
    .unwrap();

    assert!(t.company_named("globex").is_some());
    assert_eq!(t.companies().len(), 2);
}

#[test]
fn test_update_without_company_does_not_reconcile() {
    let mut t = tracker();
    t.create_job(job("j1", "Acme")).unwrap();
    let acme_id = t.companies()[0].id.clone();
    t.delete_company(&acme_id).unwrap();

    t.update_job(
        "j1",
        JobPatch {
            status: Some(JobStatus::HrScreen),
            ..JobPatch::default()
        },
    )
    .unwrap();

    assert!(t.companies().is_empty());
    assert_eq!(t.job("j1").unwrap().status, JobStatus::HrScreen);
}

#[test]
fn test_update_preserves_unpatched_fields() {
    let mut t = tracker();
    t.create_job(job("j1", "Acme")).unwrap();
    t.update_job(
        "j1",
        JobPatch {
            title: Some("Staff Engineer".to_string()),
            ..JobPatch::default()
        },
    )
    .unwrap();

    let updated = t.job("j1").unwrap();
    assert_eq!(updated.title, "Staff Engineer");
    assert_eq!(updated.location, "Berlin");
    assert_eq!(updated.salary.as_deref(), Some("90k"));
    assert_eq!(updated.company, "Acme");
}

#[test]
fn test_duplicate_ids_rejected_per_collection() {
    let mut t = tracker();
    t.create_contact(contact("same", "Acme")).unwrap();
    assert!(matches!(
        t.create_contact(contact("same", "Acme")),
        Err(TrackerError::DuplicateId { .. })
    ));

    // Different collections keep separate id spaces
    t.create_job(job("same", "Acme")).unwrap();
    assert_eq!(t.contacts().len(), 1);
    assert_eq!(t.jobs().len(), 1);
}

#[test]
fn test_explicit_company_duplicate_is_not_an_error() {
    let mut t = tracker();
    t.create_job(job("j1", "Initech")).unwrap();

    let mut explicit = Company::named("c-explicit", "initech");
    explicit.website = Some("https://initech.example".to_string());
    let inserted = t.add_company(explicit).expect("Duplicate name should not error");

    assert!(!inserted);
    assert_eq!(t.companies().len(), 1);
    assert!(t.companies()[0].website.is_none());
}

#[test]
fn test_unknown_ids_report_not_found() {
    let mut t = tracker();
    assert!(matches!(
        t.update_contact("ghost", ContactPatch::default()),
        Err(TrackerError::NotFound { .. })
    ));
    assert!(matches!(t.delete_task("ghost"), Err(TrackerError::NotFound { .. })));
    assert!(matches!(
        t.add_note(NoteOwner::Job, "ghost", NewNote::new("hello")),
        Err(TrackerError::NotFound { .. })
    ));
}

#[test]
fn test_note_append_only() {
    let mut t = tracker();
    t.create_job(job("j1", "Acme")).unwrap();

    let first = t
        .add_note(NoteOwner::Job, "j1", NewNote::new("Applied via referral"))
        .unwrap();
    let before = t.job("j1").unwrap().clone();

    let second = t
        .add_note(
            NoteOwner::Job,
            "j1",
            NewNote::new("  Phone screen went well ").with_type(NoteType::Interview),
        )
        .unwrap();
    let after = t.job("j1").unwrap();

    assert_eq!(after.notes_list.len(), before.notes_list.len() + 1);
    assert_eq!(after.notes_list[0], first);
    assert_eq!(after.notes_list[0].timestamp, before.notes_list[0].timestamp);
    assert_eq!(after.notes_list[1].content, "Phone screen went well");
    assert_eq!(after.notes_list[1].note_type(), NoteType::Interview);
    assert_ne!(first.id, second.id);

    // Only the ledger changed
    assert_eq!(after.title, before.title);
    assert_eq!(after.status, before.status);
    assert_eq!(after.notes, before.notes);
}

#[test]
fn test_notes_on_contact_and_company() {
    let mut t = tracker();
    t.create_contact(contact("c1", "Acme")).unwrap();
    let acme_id = t.companies()[0].id.clone();

    t.add_note(NoteOwner::Contact, "c1", NewNote::new("Met at meetup")).unwrap();
    t.add_note(NoteOwner::Company, &acme_id, NewNote::new("Series B")).unwrap();
    t.add_note(NoteOwner::Company, &acme_id, NewNote::new("Hiring in Q3").with_type(NoteType::Research))
        .unwrap();

    assert_eq!(t.contact("c1").unwrap().notes_list.len(), 1);
    let company = t.company(&acme_id).unwrap();
    assert_eq!(company.notes_list.len(), 2);

    let newest = notes_newest_first(&company.notes_list);
    assert!(newest[0].timestamp >= newest[1].timestamp);
    assert_eq!(company.notes_list[0].content, "Series B");
}

#[test]
fn test_blank_note_rejected() {
    let mut t = tracker();
    t.create_job(job("j1", "Acme")).unwrap();
    assert!(matches!(
        t.add_note(NoteOwner::Job, "j1", NewNote::new("   ")),
        Err(TrackerError::Validation(_))
    ));
    assert!(t.job("j1").unwrap().notes_list.is_empty());
}

#[test]
fn test_task_completed_date_invariant_through_updates() {
    let mut t = tracker();
    t.create_task(Task::new("t1", "Send portfolio")).unwrap();

    t.update_task(
        "t1",
        TaskPatch {
            status: Some(TaskStatus::Completed),
            ..TaskPatch::default()
        },
    )
    .unwrap();
    let completed_at = t.task("t1").unwrap().completed_date;
    assert!(completed_at.is_some());

    // Unrelated edits keep the first completion time
    t.update_task(
        "t1",
        TaskPatch {
            title: Some("Send portfolio link".to_string()),
            ..TaskPatch::default()
        },
    )
    .unwrap();
    assert_eq!(t.task("t1").unwrap().completed_date, completed_at);

    t.toggle_task_status("t1").unwrap();
    let task = t.task("t1").unwrap();
    assert_eq!(task.status, TaskStatus::Pending);
    assert!(task.completed_date.is_none());
}

#[test]
fn test_created_pending_task_drops_stray_completed_date() {
    let mut t = tracker();
    let mut task = Task::new("t1", "Research");
    task.completed_date = Some(chrono::Utc::now());
    t.create_task(task).unwrap();
    assert!(t.task("t1").unwrap().completed_date.is_none());
}

#[derive(Debug, Clone)]
enum Op {
    Job(String),
    Contact(String),
    Company(String),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    let names = prop::sample::select(vec!["Acme", "acme", "ACME", "Globex", "globex", "Initech", "Umbrella"]);
    (0u8..3, names).prop_map(|(kind, name)| match kind {
        0 => Op::Job(name.to_string()),
        1 => Op::Contact(name.to_string()),
        _ => Op::Company(name.to_string()),
    })
}

proptest! {
    #[test]
    fn prop_company_names_stay_unique(ops in prop::collection::vec(op_strategy(), 0..40)) {
        let mut t = tracker();
        for (i, op) in ops.iter().enumerate() {
            let id = format!("r{i}");
            match op {
                Op::Job(name) => t.create_job(job(&id, name)).unwrap(),
                Op::Contact(name) => t.create_contact(contact(&id, name)).unwrap(),
                Op::Company(name) => {
                    t.add_company(Company::named(id, name.clone())).unwrap();
                }
            }
        }

        let companies = t.companies();
        for (i, a) in companies.iter().enumerate() {
            for b in &companies[i + 1..] {
                prop_assert!(!names_match(&a.name, &b.name), "{} vs {}", a.name, b.name);
            }
        }

        // Every referenced name resolves to a company
        for j in t.jobs() {
            prop_assert!(t.company_named(&j.company).is_some());
        }
        for c in t.contacts() {
            prop_assert!(t.company_named(&c.company).is_some());
        }
    }
}
