//! Job Tracker - Application Tracking Store
//!
//! A Rust library holding the data behind a personal job search: job
//! applications, contacts, companies and tasks, linked to each other by
//! company name and persisted as JSON slots in a key-value store.
//!
//! # Features
//!
//! - Create, update and delete records in four collections
//! - Automatic company records for every company name in use
//! - Append-only, timestamped notes on jobs, contacts and companies
//! - Company overviews joining jobs, contacts and tasks
//! - Dashboard funnel counts and rates
//! - JSON export and all-or-nothing import

/// Configuration management
pub mod config;
/// Dashboard aggregates
pub mod dashboard;
/// Error types
pub mod error;
/// Logging setup and utilities
pub mod logging;
/// Metrics collection
pub mod metrics;
/// Data models and structures
pub mod models;
/// Note ledger
pub mod notes;
/// Company reconciliation
pub mod reconcile;
/// Persistence transport
pub mod repository;
/// Company relationship queries
pub mod resolver;
/// Entity store
pub mod store;
/// Export and import
pub mod transfer;
/// Name matching and id generation
pub mod utils;
/// Input validation and sanitization
pub mod validation;

// Re-export key components for easier access
pub use dashboard::{DashboardMetrics, Rate};
pub use error::{Result, TrackerError};
pub use models::{Company, Contact, Job, JobStatus, NewNote, Note, NoteOwner, Task};
pub use repository::{KeyValueStore, MemoryStore, SledStore};
pub use resolver::CompanyOverview;
pub use store::Tracker;
pub use transfer::ExportDocument;
