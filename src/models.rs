//! Data models for the tracker collections
//!
//! This module contains the four record types (jobs, contacts, companies and
//! tasks), the notes attached to them, and the partial-update patches used by
//! the store. Field names serialize in camelCase because the JSON shape is the
//! interchange format shared with exported backups.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// The four collections owned by the store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    /// Job applications
    Job,
    /// People
    Contact,
    /// Employers
    Company,
    /// To-do items
    Task,
}

impl EntityKind {
    /// Lower-case name used in messages and metric labels
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Job => "job",
            Self::Contact => "contact",
            Self::Company => "company",
            Self::Task => "task",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Record kinds that carry a note ledger
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoteOwner {
    /// A job's notes
    Job,
    /// A contact's notes
    Contact,
    /// A company's notes
    Company,
}

impl From<NoteOwner> for EntityKind {
    fn from(owner: NoteOwner) -> Self {
        match owner {
            NoteOwner::Job => Self::Job,
            NoteOwner::Contact => Self::Contact,
            NoteOwner::Company => Self::Company,
        }
    }
}

/// Stage of a job application
///
/// The first thirteen variants are the current pipeline. `Interviewing` and
/// `Accepted` survive from the earlier five-stage schema so that old data
/// loads and saves unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum JobStatus {
    /// Application submitted, no response yet
    #[default]
    Applied,
    /// Screening call with HR
    HrScreen,
    /// Call with a recruiter
    RecruiterCall,
    /// Interview with the hiring manager
    HiringManager,
    /// Interview with the team
    TeamInterview,
    /// Final interview round
    FinalInterview,
    /// On-site interview
    OnSite,
    /// Offer received
    Offered,
    /// Offer accepted
    OfferAccepted,
    /// Offer declined
    OfferDeclined,
    /// Application rejected
    Rejected,
    /// Waiting on visa sponsorship
    PendingVisa,
    /// Application withdrawn
    Withdrawn,
    /// Legacy: somewhere in the interview process
    Interviewing,
    /// Legacy: offer accepted
    Accepted,
}

impl JobStatus {
    /// Every status, pipeline order first, legacy values last
    pub const ALL: [Self; 15] = [
        Self::Applied,
        Self::HrScreen,
        Self::RecruiterCall,
        Self::HiringManager,
        Self::TeamInterview,
        Self::FinalInterview,
        Self::OnSite,
        Self::Offered,
        Self::OfferAccepted,
        Self::OfferDeclined,
        Self::Rejected,
        Self::PendingVisa,
        Self::Withdrawn,
        Self::Interviewing,
        Self::Accepted,
    ];

    /// The current thirteen-stage pipeline
    pub const PIPELINE: [Self; 13] = [
        Self::Applied,
        Self::HrScreen,
        Self::RecruiterCall,
        Self::HiringManager,
        Self::TeamInterview,
        Self::FinalInterview,
        Self::OnSite,
        Self::Offered,
        Self::OfferAccepted,
        Self::OfferDeclined,
        Self::Rejected,
        Self::PendingVisa,
        Self::Withdrawn,
    ];

    /// Wire name of the status
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Applied => "applied",
            Self::HrScreen => "hr-screen",
            Self::RecruiterCall => "recruiter-call",
            Self::HiringManager => "hiring-manager",
            Self::TeamInterview => "team-interview",
            Self::FinalInterview => "final-interview",
            Self::OnSite => "on-site",
            Self::Offered => "offered",
            Self::OfferAccepted => "offer-accepted",
            Self::OfferDeclined => "offer-declined",
            Self::Rejected => "rejected",
            Self::PendingVisa => "pending-visa",
            Self::Withdrawn => "withdrawn",
            Self::Interviewing => "interviewing",
            Self::Accepted => "accepted",
        }
    }

    /// True for the statuses that count as being in an interview round
    #[must_use]
    pub const fn is_interview_stage(self) -> bool {
        matches!(
            self,
            Self::HrScreen
                | Self::RecruiterCall
                | Self::HiringManager
                | Self::TeamInterview
                | Self::FinalInterview
                | Self::OnSite
                | Self::Interviewing
        )
    }

    /// True once the application can no longer move through the pipeline
    #[must_use]
    pub const fn is_closed(self) -> bool {
        matches!(
            self,
            Self::Rejected | Self::Withdrawn | Self::OfferAccepted | Self::OfferDeclined | Self::Accepted
        )
    }

    /// True for every status that means an offer was made
    #[must_use]
    pub const fn is_offer(self) -> bool {
        matches!(
            self,
            Self::Offered | Self::OfferAccepted | Self::OfferDeclined | Self::Accepted
        )
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Category of a note
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NoteType {
    /// Anything else
    #[default]
    General,
    /// Interview feedback
    Interview,
    /// Follow-up reminder or record
    FollowUp,
    /// Research findings
    Research,
    /// Status update
    Update,
}

/// A timestamped annotation owned by one job, contact or company
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    /// Unique identifier minted when the note is appended
    pub id: String,
    /// Note text, never empty
    pub content: String,
    /// When the note was appended
    pub timestamp: DateTime<Utc>,
    /// Category, `general` when absent
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<NoteType>,
}

impl Note {
    /// Category with the `general` default applied
    #[must_use]
    pub fn note_type(&self) -> NoteType {
        self.kind.unwrap_or_default()
    }
}

/// Caller-supplied part of a note; id and timestamp are minted by the ledger
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewNote {
    /// Note text
    pub content: String,
    /// Optional category
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<NoteType>,
}

impl NewNote {
    /// A general note with the given text
    #[must_use]
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            kind: None,
        }
    }

    /// Set the note category
    #[must_use]
    pub const fn with_type(mut self, kind: NoteType) -> Self {
        self.kind = Some(kind);
        self
    }
}

/// A job application
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    /// Caller-generated identifier
    pub id: String,
    /// Position title
    pub title: String,
    /// Employer name as typed; linked to a company by name
    pub company: String,
    /// Where the job is based
    #[serde(default)]
    pub location: String,
    /// Pipeline stage
    #[serde(default)]
    pub status: JobStatus,
    /// Date the application was sent
    pub date_applied: NaiveDate,
    /// Job description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Salary as free text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub salary: Option<String>,
    /// Legacy single free-text note
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    /// Note ledger in append order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub notes_list: Vec<Note>,
}

/// A person met during the search
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contact {
    /// Caller-generated identifier
    pub id: String,
    /// Full name
    pub name: String,
    /// Employer name as typed; linked to a company by name
    pub company: String,
    /// Job title or relationship
    #[serde(default)]
    pub role: String,
    /// Email address
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Phone number
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    /// LinkedIn profile URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub linkedin: Option<String>,
    /// Legacy single free-text note
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    /// Note ledger in append order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub notes_list: Vec<Note>,
}

/// An employer; its name is the natural key
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Company {
    /// Identifier
    pub id: String,
    /// Company name, unique ignoring case
    pub name: String,
    /// Website URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    /// Industry
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub industry: Option<String>,
    /// Headquarters or office location
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    /// Legacy single free-text note
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    /// Note ledger in append order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub notes_list: Vec<Note>,
}

impl Company {
    /// A company with only a name
    #[must_use]
    pub fn named(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            website: None,
            industry: None,
            location: None,
            notes: None,
            notes_list: Vec::new(),
        }
    }
}

/// Whether a task is done
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    /// Still to do
    #[default]
    Pending,
    /// Done
    Completed,
}

impl TaskStatus {
    /// The other status
    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::Pending => Self::Completed,
            Self::Completed => Self::Pending,
        }
    }
}

/// Task priority
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    /// Low
    Low,
    /// Medium
    #[default]
    Medium,
    /// High
    High,
}

/// What kind of activity a task is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TaskType {
    /// Phone or video call
    Call,
    /// Meeting
    Meeting,
    /// Follow up with someone
    FollowUp,
    /// Research
    Research,
    /// Submit an application
    Application,
    /// Anything else
    Other,
}

impl TaskType {
    /// True for the types that take post-call notes
    #[must_use]
    pub const fn takes_post_call_notes(self) -> bool {
        matches!(self, Self::Call | Self::Meeting)
    }
}

/// Kind of record a task points at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RelatedKind {
    /// A job
    Job,
    /// A contact
    Contact,
    /// A company
    Company,
}

/// Typed weak reference from a task to another record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelatedTo {
    /// Collection the id belongs to
    #[serde(rename = "type")]
    pub kind: RelatedKind,
    /// Id of the target record; may no longer exist
    pub id: String,
}

/// A to-do item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Caller-generated identifier
    pub id: String,
    /// Short summary
    pub title: String,
    /// Longer description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Due date; older saves write `""` when unset
    #[serde(default, deserialize_with = "blank_as_none", skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,
    /// Pending or completed
    #[serde(default)]
    pub status: TaskStatus,
    /// Priority
    #[serde(default)]
    pub priority: Priority,
    /// Activity type; absent in the earlier schema
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<TaskType>,
    /// Company name for filtering
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    /// Typed link to a job, contact or company
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub related_to: Option<RelatedTo>,
    /// Notes taken after a call or meeting
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub post_call_notes: Option<String>,
    /// When the task was completed; set exactly when `status` is completed
    #[serde(default, deserialize_with = "blank_as_none", skip_serializing_if = "Option::is_none")]
    pub completed_date: Option<DateTime<Utc>>,
}

impl Task {
    /// A pending medium-priority task with only a title
    #[must_use]
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: None,
            due_date: None,
            status: TaskStatus::Pending,
            priority: Priority::Medium,
            kind: None,
            company: None,
            related_to: None,
            post_call_notes: None,
            completed_date: None,
        }
    }

    /// True when the task is pending and its due date is before `today`
    #[must_use]
    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        self.status == TaskStatus::Pending && self.due_date.is_some_and(|due| due < today)
    }
}

/// Read a missing, null or blank string as `None`, anything else via `FromStr`
fn blank_as_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: fmt::Display,
{
    match Option::<String>::deserialize(deserializer)? {
        Some(text) if !text.trim().is_empty() => text.trim().parse().map(Some).map_err(serde::de::Error::custom),
        _ => Ok(None),
    }
}

/// Common access for records stored in a collection
pub trait Entity {
    /// Collection this record lives in
    const KIND: EntityKind;

    /// Record identifier
    fn id(&self) -> &str;
}

/// Records that own a note ledger
pub trait Annotated {
    /// Mutable access for appending
    fn notes_list_mut(&mut self) -> &mut Vec<Note>;
}

macro_rules! impl_entity {
    ($ty:ty, $kind:expr) => {
        impl Entity for $ty {
            const KIND: EntityKind = $kind;

            fn id(&self) -> &str {
                &self.id
            }
        }
    };
}

macro_rules! impl_annotated {
    ($ty:ty) => {
        impl Annotated for $ty {
            fn notes_list_mut(&mut self) -> &mut Vec<Note> {
                &mut self.notes_list
            }
        }
    };
}

impl_entity!(Job, EntityKind::Job);
impl_entity!(Contact, EntityKind::Contact);
impl_entity!(Company, EntityKind::Company);
impl_entity!(Task, EntityKind::Task);

impl_annotated!(Job);
impl_annotated!(Contact);
impl_annotated!(Company);

/// Overwrite an optional text field; an empty string clears it
fn merge_optional(slot: &mut Option<String>, value: Option<String>) {
    if let Some(value) = value {
        *slot = if value.trim().is_empty() { None } else { Some(value) };
    }
}

/// Partial update for a [`Job`]; absent fields are left unchanged
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobPatch {
    /// New title
    pub title: Option<String>,
    /// New company name; triggers reconciliation when non-empty
    pub company: Option<String>,
    /// New location
    pub location: Option<String>,
    /// New status
    pub status: Option<JobStatus>,
    /// New application date
    pub date_applied: Option<NaiveDate>,
    /// New description, empty clears
    pub description: Option<String>,
    /// New salary, empty clears
    pub salary: Option<String>,
    /// New legacy note, empty clears
    pub notes: Option<String>,
}

impl JobPatch {
    /// Merge into `job`
    pub fn apply_to(self, job: &mut Job) {
        if let Some(title) = self.title {
            job.title = title;
        }
        if let Some(company) = self.company {
            job.company = company;
        }
        if let Some(location) = self.location {
            job.location = location;
        }
        if let Some(status) = self.status {
            job.status = status;
        }
        if let Some(date) = self.date_applied {
            job.date_applied = date;
        }
        merge_optional(&mut job.description, self.description);
        merge_optional(&mut job.salary, self.salary);
        merge_optional(&mut job.notes, self.notes);
    }
}

/// Partial update for a [`Contact`]; absent fields are left unchanged
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactPatch {
    /// New name
    pub name: Option<String>,
    /// New company name; triggers reconciliation when non-empty
    pub company: Option<String>,
    /// New role
    pub role: Option<String>,
    /// New email, empty clears
    pub email: Option<String>,
    /// New phone, empty clears
    pub phone: Option<String>,
    /// New LinkedIn URL, empty clears
    pub linkedin: Option<String>,
    /// New legacy note, empty clears
    pub notes: Option<String>,
}

impl ContactPatch {
    /// Merge into `contact`
    pub fn apply_to(self, contact: &mut Contact) {
        if let Some(name) = self.name {
            contact.name = name;
        }
        if let Some(company) = self.company {
            contact.company = company;
        }
        if let Some(role) = self.role {
            contact.role = role;
        }
        merge_optional(&mut contact.email, self.email);
        merge_optional(&mut contact.phone, self.phone);
        merge_optional(&mut contact.linkedin, self.linkedin);
        merge_optional(&mut contact.notes, self.notes);
    }
}

/// Partial update for a [`Company`]; absent fields are left unchanged
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyPatch {
    /// New name; must not collide with another company
    pub name: Option<String>,
    /// New website, empty clears
    pub website: Option<String>,
    /// New industry, empty clears
    pub industry: Option<String>,
    /// New location, empty clears
    pub location: Option<String>,
    /// New legacy note, empty clears
    pub notes: Option<String>,
}

impl CompanyPatch {
    /// Merge into `company`
    pub fn apply_to(self, company: &mut Company) {
        if let Some(name) = self.name {
            company.name = name;
        }
        merge_optional(&mut company.website, self.website);
        merge_optional(&mut company.industry, self.industry);
        merge_optional(&mut company.location, self.location);
        merge_optional(&mut company.notes, self.notes);
    }
}

/// Partial update for a [`Task`]; absent fields are left unchanged
///
/// `completedDate` is not patchable. The store keeps it in step with `status`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskPatch {
    /// New title
    pub title: Option<String>,
    /// New description, empty clears
    pub description: Option<String>,
    /// New due date
    pub due_date: Option<NaiveDate>,
    /// New status
    pub status: Option<TaskStatus>,
    /// New priority
    pub priority: Option<Priority>,
    /// New activity type
    #[serde(rename = "type")]
    pub kind: Option<TaskType>,
    /// New company filter, empty clears
    pub company: Option<String>,
    /// New typed link
    pub related_to: Option<RelatedTo>,
    /// New post-call notes, empty clears
    pub post_call_notes: Option<String>,
}

impl TaskPatch {
    /// Merge into `task`, leaving `completed_date` to the caller
    pub fn apply_to(self, task: &mut Task) {
        if let Some(title) = self.title {
            task.title = title;
        }
        merge_optional(&mut task.description, self.description);
        if let Some(due) = self.due_date {
            task.due_date = Some(due);
        }
        if let Some(status) = self.status {
            task.status = status;
        }
        if let Some(priority) = self.priority {
            task.priority = priority;
        }
        if let Some(kind) = self.kind {
            task.kind = Some(kind);
        }
        merge_optional(&mut task.company, self.company);
        if let Some(related) = self.related_to {
            task.related_to = Some(related);
        }
        merge_optional(&mut task.post_call_notes, self.post_call_notes);
    }
}
