//! Core domain logic for the resolution tracker.
//! This crate is the single source of truth for resolution data and its
//! persisted schema.

pub mod kv;
pub mod logging;
pub mod model;
pub mod service;
pub mod storage;

pub use kv::{
    open_db, open_db_in_memory, KeyValueStore, KvError, KvResult, MemoryKeyValueStore,
    SqliteKeyValueStore,
};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::id::generate_id;
pub use model::resolution::{
    completion_status, is_complete, CompletionStatus, JournalEntry, Milestone,
    MilestoneProgress, Resolution,
};
pub use service::resolution_service::{
    ResolutionDraft, ResolutionService, SaveOutcome, ServiceError, ServiceResult,
};
pub use storage::migrate::{migrate, StorageDocument, StoredValue};
pub use storage::store::{ResolutionStore, StorageError, StorageResult};
pub use storage::{StorageSchema, CURRENT_SCHEMA_VERSION, STORAGE_KEY};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
