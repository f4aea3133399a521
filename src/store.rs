//! The entity store.
//!
//! [`Tracker`] owns the job, contact, company and task collections and every
//! mutation on them. Each mutation validates its input, applies company
//! reconciliation where a company name was supplied, and rewrites the changed
//! slots through the [`KeyValueStore`] it was loaded from.

use std::collections::BTreeSet;
use std::path::Path;

use chrono::Utc;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::config::StorageConfig;
use crate::error::{Result, TrackerError};
use crate::logging::OperationTimer;
use crate::metrics::{self, PersistTimer};
use crate::models::{
    Company, CompanyPatch, Contact, ContactPatch, Entity, EntityKind, Job, JobPatch, NewNote, Note, NoteOwner, Task,
    TaskPatch, TaskStatus,
};
use crate::notes;
use crate::reconcile::{self, find_company};
use crate::repository::{Collection, KeyValueStore, SledStore, DEFAULT_KEY_PREFIX};
use crate::transfer::{self, ExportDocument, ImportSummary};
use crate::utils::{names_match, IdGenerator};
use crate::validation::InputValidator;

/// In-memory collections backed by a key-value store
pub struct Tracker {
    jobs: Vec<Job>,
    contacts: Vec<Contact>,
    companies: Vec<Company>,
    tasks: Vec<Task>,
    backend: Box<dyn KeyValueStore>,
    key_prefix: String,
    ids: IdGenerator,
    dirty: BTreeSet<Collection>,
}

fn read_slot<T: DeserializeOwned>(backend: &dyn KeyValueStore, key: &str) -> Result<Vec<T>> {
    match backend.get(key)? {
        Some(text) if !text.trim().is_empty() => Ok(serde_json::from_str(&text)?),
        _ => Ok(Vec::new()),
    }
}

fn find_index<T: Entity>(records: &[T], id: &str) -> Result<usize> {
    records
        .iter()
        .position(|record| record.id() == id)
        .ok_or_else(|| TrackerError::NotFound {
            kind: T::KIND,
            id: id.to_string(),
        })
}

fn ensure_unique_id<T: Entity>(records: &[T], id: &str) -> Result<()> {
    if records.iter().any(|record| record.id() == id) {
        return Err(TrackerError::DuplicateId {
            kind: T::KIND,
            id: id.to_string(),
        });
    }
    Ok(())
}

/// Keep `completed_date` set exactly while the task is completed
fn sync_completion(task: &mut Task) {
    match task.status {
        TaskStatus::Completed => {
            if task.completed_date.is_none() {
                task.completed_date = Some(Utc::now());
            }
        }
        TaskStatus::Pending => task.completed_date = None,
    }
}

impl Tracker {
    /// Load all four collections from `backend` using the default key prefix
    pub fn load(backend: Box<dyn KeyValueStore>) -> Result<Self> {
        Self::load_with_prefix(backend, DEFAULT_KEY_PREFIX)
    }

    /// Load all four collections from slots named `<prefix>-<collection>`
    pub fn load_with_prefix(backend: Box<dyn KeyValueStore>, key_prefix: &str) -> Result<Self> {
        let timer = OperationTimer::new("load");
        let mut tracker = Self {
            jobs: Vec::new(),
            contacts: Vec::new(),
            companies: Vec::new(),
            tasks: Vec::new(),
            backend,
            key_prefix: key_prefix.to_string(),
            ids: IdGenerator::new(),
            dirty: BTreeSet::new(),
        };
        tracker.reload()?;
        timer.finish();
        Ok(tracker)
    }

    /// Open the sled database named in `config` and load from it
    pub fn open(config: &StorageConfig) -> Result<Self> {
        let store = SledStore::open(Path::new(&config.path), config.flush_on_write)?;
        Self::load_with_prefix(Box::new(store), &config.key_prefix)
    }

    /// Replace the in-memory state with what the backend holds.
    ///
    /// Nothing changes unless all four slots parse.
    pub fn reload(&mut self) -> Result<()> {
        let backend = self.backend.as_ref();
        let jobs = read_slot(backend, &Collection::Jobs.key(&self.key_prefix))?;
        let contacts = read_slot(backend, &Collection::Contacts.key(&self.key_prefix))?;
        let companies = read_slot(backend, &Collection::Companies.key(&self.key_prefix))?;
        let tasks = read_slot(backend, &Collection::Tasks.key(&self.key_prefix))?;

        self.jobs = jobs;
        self.contacts = contacts;
        self.companies = companies;
        self.tasks = tasks;
        self.dirty.clear();
        debug!(
            jobs = self.jobs.len(),
            contacts = self.contacts.len(),
            companies = self.companies.len(),
            tasks = self.tasks.len(),
            "Loaded collections"
        );
        Ok(())
    }

    /// Jobs in insertion order
    #[must_use]
    pub fn jobs(&self) -> &[Job] {
        &self.jobs
    }

    /// Contacts in insertion order
    #[must_use]
    pub fn contacts(&self) -> &[Contact] {
        &self.contacts
    }

    /// Companies in insertion order
    #[must_use]
    pub fn companies(&self) -> &[Company] {
        &self.companies
    }

    /// Tasks in insertion order
    #[must_use]
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    /// Job by id
    #[must_use]
    pub fn job(&self, id: &str) -> Option<&Job> {
        self.jobs.iter().find(|job| job.id == id)
    }

    /// Contact by id
    #[must_use]
    pub fn contact(&self, id: &str) -> Option<&Contact> {
        self.contacts.iter().find(|contact| contact.id == id)
    }

    /// Company by id
    #[must_use]
    pub fn company(&self, id: &str) -> Option<&Company> {
        self.companies.iter().find(|company| company.id == id)
    }

    /// Company by name, ignoring case
    #[must_use]
    pub fn company_named(&self, name: &str) -> Option<&Company> {
        find_company(&self.companies, name)
    }

    /// Task by id
    #[must_use]
    pub fn task(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|task| task.id == id)
    }

    /// Prefix of the storage keys
    #[must_use]
    pub fn key_prefix(&self) -> &str {
        &self.key_prefix
    }

    /// Collections changed in memory whose last write failed
    #[must_use]
    pub fn dirty_collections(&self) -> Vec<Collection> {
        self.dirty.iter().copied().collect()
    }

    /// Mint an id not used by any record
    pub fn new_id(&mut self) -> String {
        loop {
            let id = self.ids.next_id();
            let taken = self.jobs.iter().any(|r| r.id == id)
                || self.contacts.iter().any(|r| r.id == id)
                || self.companies.iter().any(|r| r.id == id)
                || self.tasks.iter().any(|r| r.id == id);
            if !taken {
                return id;
            }
        }
    }

    /// Insert a job and make sure its company exists
    pub fn create_job(&mut self, job: Job) -> Result<()> {
        InputValidator::validate_job(&job)?;
        ensure_unique_id(&self.jobs, &job.id)?;

        debug!(id = %job.id, company = %job.company, "Creating job");
        let company = job.company.clone();
        self.jobs.push(job);
        metrics::record_mutation(EntityKind::Job, "create");

        let mut changed = vec![Collection::Jobs];
        if self.reconcile_company(&company) {
            changed.push(Collection::Companies);
        }
        self.commit(&changed)
    }

    /// Merge `patch` into the job with `id`
    pub fn update_job(&mut self, id: &str, patch: JobPatch) -> Result<()> {
        let index = find_index(&self.jobs, id)?;
        let company = patch.company.clone().filter(|name| !name.is_empty());

        let mut updated = self.jobs[index].clone();
        patch.apply_to(&mut updated);
        InputValidator::validate_job(&updated)?;

        debug!(id, "Updating job");
        self.jobs[index] = updated;
        metrics::record_mutation(EntityKind::Job, "update");

        let mut changed = vec![Collection::Jobs];
        if company.is_some_and(|name| self.reconcile_company(&name)) {
            changed.push(Collection::Companies);
        }
        self.commit(&changed)
    }

    /// Remove the job with `id`; notes go with it, tasks pointing at it stay
    pub fn delete_job(&mut self, id: &str) -> Result<Job> {
        let index = find_index(&self.jobs, id)?;
        let removed = self.jobs.remove(index);
        debug!(id, "Deleted job");
        metrics::record_mutation(EntityKind::Job, "delete");
        self.commit(&[Collection::Jobs])?;
        Ok(removed)
    }

    /// Insert a contact and make sure its company exists
    pub fn create_contact(&mut self, contact: Contact) -> Result<()> {
        InputValidator::validate_contact(&contact)?;
        ensure_unique_id(&self.contacts, &contact.id)?;

        debug!(id = %contact.id, company = %contact.company, "Creating contact");
        let company = contact.company.clone();
        self.contacts.push(contact);
        metrics::record_mutation(EntityKind::Contact, "create");

        let mut changed = vec![Collection::Contacts];
        if self.reconcile_company(&company) {
            changed.push(Collection::Companies);
        }
        self.commit(&changed)
    }

    /// Merge `patch` into the contact with `id`
    pub fn update_contact(&mut self, id: &str, patch: ContactPatch) -> Result<()> {
        let index = find_index(&self.contacts, id)?;
        let company = patch.company.clone().filter(|name| !name.is_empty());

        let mut updated = self.contacts[index].clone();
        patch.apply_to(&mut updated);
        InputValidator::validate_contact(&updated)?;

        debug!(id, "Updating contact");
        self.contacts[index] = updated;
        metrics::record_mutation(EntityKind::Contact, "update");

        let mut changed = vec![Collection::Contacts];
        if company.is_some_and(|name| self.reconcile_company(&name)) {
            changed.push(Collection::Companies);
        }
        self.commit(&changed)
    }

    /// Remove the contact with `id`
    pub fn delete_contact(&mut self, id: &str) -> Result<Contact> {
        let index = find_index(&self.contacts, id)?;
        let removed = self.contacts.remove(index);
        debug!(id, "Deleted contact");
        metrics::record_mutation(EntityKind::Contact, "delete");
        self.commit(&[Collection::Contacts])?;
        Ok(removed)
    }

    /// Insert a company unless one with the same name already exists.
    ///
    /// Returns `false` without error when the name is taken.
    pub fn add_company(&mut self, company: Company) -> Result<bool> {
        InputValidator::validate_company(&company)?;
        if let Some(existing) = find_company(&self.companies, &company.name) {
            debug!(name = %company.name, existing = %existing.id, "Company already exists");
            return Ok(false);
        }
        ensure_unique_id(&self.companies, &company.id)?;

        debug!(id = %company.id, name = %company.name, "Creating company");
        self.companies.push(company);
        metrics::record_mutation(EntityKind::Company, "create");
        self.commit(&[Collection::Companies])?;
        Ok(true)
    }

    /// Merge `patch` into the company with `id`; a rename may not collide
    pub fn update_company(&mut self, id: &str, patch: CompanyPatch) -> Result<()> {
        let index = find_index(&self.companies, id)?;

        let mut updated = self.companies[index].clone();
        patch.apply_to(&mut updated);
        InputValidator::validate_company(&updated)?;
        if self
            .companies
            .iter()
            .any(|other| other.id != id && names_match(&other.name, &updated.name))
        {
            return Err(TrackerError::DuplicateCompany(updated.name));
        }

        debug!(id, "Updating company");
        self.companies[index] = updated;
        metrics::record_mutation(EntityKind::Company, "update");
        self.commit(&[Collection::Companies])
    }

    /// Remove the company with `id`; jobs and contacts keep its name
    pub fn delete_company(&mut self, id: &str) -> Result<Company> {
        let index = find_index(&self.companies, id)?;
        let removed = self.companies.remove(index);
        debug!(id, name = %removed.name, "Deleted company");
        metrics::record_mutation(EntityKind::Company, "delete");
        self.commit(&[Collection::Companies])?;
        Ok(removed)
    }

    /// Insert a task
    pub fn create_task(&mut self, mut task: Task) -> Result<()> {
        InputValidator::validate_task(&task)?;
        ensure_unique_id(&self.tasks, &task.id)?;
        sync_completion(&mut task);

        debug!(id = %task.id, "Creating task");
        self.tasks.push(task);
        metrics::record_mutation(EntityKind::Task, "create");
        self.commit(&[Collection::Tasks])
    }

    /// Merge `patch` into the task with `id`
    pub fn update_task(&mut self, id: &str, patch: TaskPatch) -> Result<()> {
        let index = find_index(&self.tasks, id)?;

        let mut updated = self.tasks[index].clone();
        patch.apply_to(&mut updated);
        InputValidator::validate_task(&updated)?;
        sync_completion(&mut updated);

        debug!(id, status = ?updated.status, "Updating task");
        self.tasks[index] = updated;
        metrics::record_mutation(EntityKind::Task, "update");
        self.commit(&[Collection::Tasks])
    }

    /// Flip a task between pending and completed, returning the new status
    pub fn toggle_task_status(&mut self, id: &str) -> Result<TaskStatus> {
        let index = find_index(&self.tasks, id)?;
        let status = self.tasks[index].status.toggled();
        self.update_task(
            id,
            TaskPatch {
                status: Some(status),
                ..TaskPatch::default()
            },
        )?;
        Ok(status)
    }

    /// Remove the task with `id`
    pub fn delete_task(&mut self, id: &str) -> Result<Task> {
        let index = find_index(&self.tasks, id)?;
        let removed = self.tasks.remove(index);
        debug!(id, "Deleted task");
        metrics::record_mutation(EntityKind::Task, "delete");
        self.commit(&[Collection::Tasks])?;
        Ok(removed)
    }

    /// Append a note to a job, contact or company and return it
    pub fn add_note(&mut self, owner: NoteOwner, parent_id: &str, data: NewNote) -> Result<Note> {
        let note = notes::mint_note(self.ids.next_id(), data)?;
        let (note, collection) = match owner {
            NoteOwner::Job => (notes::append_note(&mut self.jobs, parent_id, note)?, Collection::Jobs),
            NoteOwner::Contact => (
                notes::append_note(&mut self.contacts, parent_id, note)?,
                Collection::Contacts,
            ),
            NoteOwner::Company => (
                notes::append_note(&mut self.companies, parent_id, note)?,
                Collection::Companies,
            ),
        };

        debug!(parent = parent_id, note = %note.id, "Appended note");
        metrics::record_mutation(owner.into(), "add_note");
        self.commit(&[collection])?;
        Ok(note)
    }

    /// Snapshot of all four collections in the export format
    #[must_use]
    pub fn export_document(&self) -> ExportDocument {
        let document = ExportDocument::new(
            self.jobs.clone(),
            self.contacts.clone(),
            self.companies.clone(),
            self.tasks.clone(),
        );
        metrics::record_transfer("export", document.summary().total());
        document
    }

    /// Replace every persisted slot with `document`, then reload from them
    pub fn import(&mut self, document: &ExportDocument) -> Result<ImportSummary> {
        let timer = OperationTimer::new("import");
        transfer::replace_persisted(self.backend.as_mut(), &self.key_prefix, document)?;
        self.reload()?;
        let summary = document.summary();
        metrics::record_transfer("import", summary.total());
        timer.finish();
        Ok(summary)
    }

    /// Write every dirty collection to the backend
    pub fn flush(&mut self) -> Result<()> {
        let pending: Vec<Collection> = self.dirty.iter().copied().collect();
        for collection in pending {
            let payload = self.serialize_collection(collection)?;
            let key = collection.key(&self.key_prefix);
            let timer = PersistTimer::start(collection);
            match self.backend.set(&key, &payload) {
                Ok(()) => {
                    timer.finish(true);
                    self.dirty.remove(&collection);
                }
                Err(err) => {
                    timer.finish(false);
                    warn!(%collection, error = %err, "Failed to persist collection");
                    return Err(err);
                }
            }
        }
        Ok(())
    }

    fn serialize_collection(&self, collection: Collection) -> Result<String> {
        let payload = match collection {
            Collection::Jobs => serde_json::to_string(&self.jobs)?,
            Collection::Contacts => serde_json::to_string(&self.contacts)?,
            Collection::Companies => serde_json::to_string(&self.companies)?,
            Collection::Tasks => serde_json::to_string(&self.tasks)?,
        };
        Ok(payload)
    }

    fn commit(&mut self, changed: &[Collection]) -> Result<()> {
        self.dirty.extend(changed.iter().copied());
        self.flush()
    }

    fn reconcile_company(&mut self, name: &str) -> bool {
        let ids = &mut self.ids;
        let created = reconcile::reconcile(&mut self.companies, name, || ids.next_id()).is_some();
        if created {
            metrics::record_company_reconciled();
        }
        created
    }
}
