//! Export and import of the whole dataset.
//!
//! The export document is a single JSON object holding the four collections
//! plus `exportDate` and `version`. Import accepts the same shape, rejects a
//! document missing any collection, and overwrites every persisted slot.

use std::fs::{create_dir_all, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{Result, TrackerError};
use crate::models::{Company, Contact, Job, Task};
use crate::repository::{Collection, KeyValueStore};

/// Version written into every export
pub const EXPORT_VERSION: &str = "1.0";

/// All four collections plus export metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportDocument {
    /// Every job
    pub jobs: Vec<Job>,
    /// Every contact
    pub contacts: Vec<Contact>,
    /// Every company
    pub companies: Vec<Company>,
    /// Every task
    pub tasks: Vec<Task>,
    /// ISO-8601 time the export was taken
    #[serde(default)]
    pub export_date: String,
    /// Format version
    #[serde(default)]
    pub version: String,
}

/// Shape accepted on import; each collection must be present
#[derive(Deserialize)]
struct IncomingDocument {
    jobs: Option<Vec<Job>>,
    contacts: Option<Vec<Contact>>,
    companies: Option<Vec<Company>>,
    tasks: Option<Vec<Task>>,
    #[serde(rename = "exportDate", default)]
    export_date: Option<String>,
    #[serde(default)]
    version: Option<String>,
}

/// Record counts of a document, shown before an import is confirmed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ImportSummary {
    /// Number of jobs
    pub jobs: usize,
    /// Number of contacts
    pub contacts: usize,
    /// Number of companies
    pub companies: usize,
    /// Number of tasks
    pub tasks: usize,
}

impl ImportSummary {
    /// Records across all collections
    #[must_use]
    pub const fn total(&self) -> usize {
        self.jobs + self.contacts + self.companies + self.tasks
    }
}

impl ExportDocument {
    /// Wrap collections with the current time and version
    #[must_use]
    pub fn new(jobs: Vec<Job>, contacts: Vec<Contact>, companies: Vec<Company>, tasks: Vec<Task>) -> Self {
        Self {
            jobs,
            contacts,
            companies,
            tasks,
            export_date: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            version: EXPORT_VERSION.to_string(),
        }
    }

    /// Record counts
    #[must_use]
    pub fn summary(&self) -> ImportSummary {
        ImportSummary {
            jobs: self.jobs.len(),
            contacts: self.contacts.len(),
            companies: self.companies.len(),
            tasks: self.tasks.len(),
        }
    }

    /// Pretty-printed JSON with two-space indentation
    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Parse and check an import document.
///
/// Any syntax error, missing collection or malformed record is reported as
/// [`TrackerError::InvalidImport`].
pub fn parse_import(text: &str) -> Result<ExportDocument> {
    let incoming: IncomingDocument =
        serde_json::from_str(text).map_err(|e| TrackerError::InvalidImport(format!("not a valid export file: {e}")))?;

    let missing: Vec<&str> = [
        (incoming.jobs.is_none(), Collection::Jobs),
        (incoming.contacts.is_none(), Collection::Contacts),
        (incoming.companies.is_none(), Collection::Companies),
        (incoming.tasks.is_none(), Collection::Tasks),
    ]
    .iter()
    .filter(|(absent, _)| *absent)
    .map(|(_, collection)| collection.name())
    .collect();
    if !missing.is_empty() {
        return Err(TrackerError::InvalidImport(format!(
            "missing collections: {}",
            missing.join(", ")
        )));
    }

    Ok(ExportDocument {
        jobs: incoming.jobs.unwrap_or_default(),
        contacts: incoming.contacts.unwrap_or_default(),
        companies: incoming.companies.unwrap_or_default(),
        tasks: incoming.tasks.unwrap_or_default(),
        export_date: incoming.export_date.unwrap_or_default(),
        version: incoming.version.unwrap_or_default(),
    })
}

/// Read and check an import file
pub fn read_import_file(path: &Path) -> Result<ExportDocument> {
    let text = std::fs::read_to_string(path)?;
    parse_import(&text)
}

/// File name for an export taken today, e.g. `job-tracker-data-2024-05-01.json`
#[must_use]
pub fn export_file_name(prefix: &str) -> String {
    format!("{prefix}-{}.json", Utc::now().format("%Y-%m-%d"))
}

/// Write `document` into `output_dir` and return the file path
pub fn write_export_file(document: &ExportDocument, output_dir: &Path, prefix: &str) -> Result<PathBuf> {
    create_dir_all(output_dir)?;
    let file_path = output_dir.join(export_file_name(prefix));

    let file = File::create(&file_path)?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, document)?;
    writer.flush()?;

    info!(path = %file_path.display(), records = document.summary().total(), "Exported data");
    Ok(file_path)
}

/// Overwrite all four slots with the collections of `document`.
///
/// Every slot is serialized and its previous value read before the first
/// write. If a write fails, the slots already written are put back and the
/// write error is returned. A slot that never existed is restored as blank.
pub fn replace_persisted(backend: &mut dyn KeyValueStore, key_prefix: &str, document: &ExportDocument) -> Result<()> {
    let payloads = [
        (Collection::Jobs, serde_json::to_string(&document.jobs)?),
        (Collection::Contacts, serde_json::to_string(&document.contacts)?),
        (Collection::Companies, serde_json::to_string(&document.companies)?),
        (Collection::Tasks, serde_json::to_string(&document.tasks)?),
    ];
    let previous = payloads
        .iter()
        .map(|(collection, _)| backend.get(&collection.key(key_prefix)))
        .collect::<Result<Vec<Option<String>>>>()?;

    for (written, (collection, payload)) in payloads.iter().enumerate() {
        if let Err(err) = backend.set(&collection.key(key_prefix), payload) {
            warn!(%collection, error = %err, "Import write failed, restoring previous data");
            restore_slots(backend, key_prefix, &payloads[..written], &previous[..written]);
            return Err(err);
        }
    }
    info!(records = document.summary().total(), "Replaced persisted data");
    Ok(())
}

fn restore_slots(
    backend: &mut dyn KeyValueStore,
    key_prefix: &str,
    written: &[(Collection, String)],
    previous: &[Option<String>],
) {
    for ((collection, _), old) in written.iter().zip(previous) {
        let value = old.as_deref().unwrap_or_default();
        if let Err(err) = backend.set(&collection.key(key_prefix), value) {
            warn!(%collection, error = %err, "Failed to restore slot after import failure");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_collection_rejected() {
        let err = parse_import(r#"{"jobs":[],"contacts":[],"companies":[]}"#).unwrap_err();
        match err {
            TrackerError::InvalidImport(message) => assert!(message.contains("tasks")),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_null_collection_rejected() {
        assert!(parse_import(r#"{"jobs":null,"contacts":[],"companies":[],"tasks":[]}"#).is_err());
    }

    #[test]
    fn test_not_json_rejected() {
        assert!(matches!(parse_import("not json"), Err(TrackerError::InvalidImport(_))));
    }

    #[test]
    fn test_metadata_optional_on_import() {
        let doc = parse_import(r#"{"jobs":[],"contacts":[],"companies":[],"tasks":[]}"#).unwrap();
        assert_eq!(doc.summary().total(), 0);
        assert!(doc.version.is_empty());
    }

    #[test]
    fn test_export_shape() {
        let doc = ExportDocument::new(Vec::new(), Vec::new(), Vec::new(), Vec::new());
        let value: serde_json::Value = serde_json::from_str(&doc.to_json_pretty().unwrap()).unwrap();
        assert_eq!(value["version"], "1.0");
        assert!(value["exportDate"].as_str().unwrap().ends_with('Z'));
        for key in ["jobs", "contacts", "companies", "tasks"] {
            assert!(value[key].is_array(), "{key} should be an array");
        }
    }

    #[test]
    fn test_replace_restores_written_slots_on_failure() {
        struct FailingTasks(crate::repository::MemoryStore);

        impl KeyValueStore for FailingTasks {
            fn get(&self, key: &str) -> Result<Option<String>> {
                self.0.get(key)
            }

            fn set(&mut self, key: &str, value: &str) -> Result<()> {
                if key.ends_with("-tasks") {
                    return Err(TrackerError::Storage("disk full".to_string()));
                }
                self.0.set(key, value)
            }
        }

        let mut backend = FailingTasks(crate::repository::MemoryStore::new());
        backend.0.set("p-jobs", "[]").unwrap();
        let doc = ExportDocument::new(Vec::new(), Vec::new(), vec![Company::named("c1", "Acme")], Vec::new());

        assert!(matches!(
            replace_persisted(&mut backend, "p", &doc),
            Err(TrackerError::Storage(_))
        ));
        assert_eq!(backend.get("p-jobs").unwrap().as_deref(), Some("[]"));
        assert_eq!(backend.get("p-contacts").unwrap().as_deref(), Some(""));
        assert_eq!(backend.get("p-companies").unwrap().as_deref(), Some(""));
    }

    #[test]
    fn test_export_file_name() {
        let name = export_file_name("job-tracker-data");
        assert!(name.starts_with("job-tracker-data-"));
        assert!(name.ends_with(".json"));
    }
}
