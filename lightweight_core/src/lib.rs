#![forbid(unsafe_code)]

//! Core domain model and business logic for LightWeight, a workout log.
//!
//! This crate provides:
//! - Domain types (sets, exercise identity)
//! - The set log and the exercise list
//! - Derived statistics (estimated 1RM, best/last set, trends, weekly counts)
//! - Exercise rename and delisting
//! - Persistence, backup import/export and configuration

pub mod types;
pub mod error;
pub mod clock;
pub mod store;
pub mod catalog;
pub mod metrics;
pub mod rename;
pub mod persist;
pub mod backup;
pub mod logbook;
pub mod config;
pub mod logging;

// Re-export commonly used types
pub use error::{Error, Result};
pub use types::*;
pub use clock::{Clock, FixedClock, SystemClock};
pub use store::SetStore;
pub use catalog::ExerciseCatalog;
pub use metrics::{BestSet, ExerciseSummary, Trend};
pub use rename::{RenameAction, RenameOutcome};
pub use persist::{JsonFileBackend, MemoryBackend, Persistence};
pub use backup::BackupDocument;
pub use logbook::{ImportReport, Logbook};
pub use config::Config;
