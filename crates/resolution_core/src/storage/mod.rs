//! Versioned persistence of the full resolution collection.
//!
//! # Responsibility
//! - Own the JSON document layout written under `STORAGE_KEY`.
//! - Migrate legacy or foreign documents forward on every load.
//! - Read and write the whole collection through a `KeyValueStore`.
//!
//! # Invariants
//! - Every save rewrites the entire collection in one `set` call.
//! - Reads never fail outward through `ResolutionStore::load`.
//! - Writes always stamp `CURRENT_SCHEMA_VERSION`.

use crate::model::resolution::Resolution;
use serde::{Deserialize, Serialize};

pub mod migrate;
pub mod store;

/// Fixed key addressing the application's data blob.
pub const STORAGE_KEY: &str = "@resolution_tracker_data";

/// Schema version written by this build.
pub const CURRENT_SCHEMA_VERSION: u32 = 1;

/// The sole persisted unit: every resolution plus the schema version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageSchema {
    pub version: u32,
    pub resolutions: Vec<Resolution>,
}
