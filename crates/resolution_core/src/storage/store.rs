//! Load/save of the resolution collection under the fixed storage key.
//!
//! # Invariants
//! - `load` recovers from every read-side failure with an empty list and
//!   an `error` log line.
//! - `save` surfaces serialization and write failures to the caller.
//! - Duplicate resolution ids are rejected before anything is written.
//! - Loaded collections never contain duplicate ids: later duplicates get
//!   a fresh id, so whatever `load` returns can be saved back.

use super::migrate::migrate;
use super::{CURRENT_SCHEMA_VERSION, STORAGE_KEY};
use crate::kv::{KeyValueStore, KvError};
use crate::model::id::generate_id;
use crate::model::resolution::Resolution;
use log::{error, info, warn};
use serde::Serialize;
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Instant;

pub type StorageResult<T> = Result<T, StorageError>;

/// Storage-layer failure.
#[derive(Debug)]
pub enum StorageError {
    /// Key-value backend failed to read or write.
    Kv(KvError),
    /// Stored text is not valid JSON.
    Parse(serde_json::Error),
    /// A migrated resolution does not match the record shape.
    Decode {
        index: usize,
        source: serde_json::Error,
    },
    /// Collection could not be serialized.
    Serialize(serde_json::Error),
    /// Two resolutions share one id.
    DuplicateId(String),
}

impl Display for StorageError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Kv(err) => write!(f, "{err}"),
            Self::Parse(err) => write!(f, "stored data is not valid JSON: {err}"),
            Self::Decode { index, source } => {
                write!(f, "stored resolution #{index} has an invalid shape: {source}")
            }
            Self::Serialize(err) => write!(f, "failed to serialize resolutions: {err}"),
            Self::DuplicateId(id) => write!(f, "duplicate resolution id: {id}"),
        }
    }
}

impl Error for StorageError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Kv(err) => Some(err),
            Self::Parse(err) | Self::Serialize(err) => Some(err),
            Self::Decode { source, .. } => Some(source),
            Self::DuplicateId(_) => None,
        }
    }
}

impl From<KvError> for StorageError {
    fn from(value: KvError) -> Self {
        Self::Kv(value)
    }
}

#[derive(Serialize)]
struct SchemaRef<'a> {
    version: u32,
    resolutions: &'a [Resolution],
}

/// Reads and writes the whole resolution collection.
pub struct ResolutionStore<S: KeyValueStore> {
    kv: S,
}

impl<S: KeyValueStore> ResolutionStore<S> {
    pub fn new(kv: S) -> Self {
        Self { kv }
    }

    /// Returns the underlying key-value store.
    pub fn kv(&self) -> &S {
        &self.kv
    }

    /// Loads every resolution, recovering from any failure.
    ///
    /// An absent key, unreadable backend, malformed JSON or unexpected
    /// shape all yield an empty list. Losing unreadable data is preferred
    /// over blocking the user from creating new data.
    pub fn load(&self) -> Vec<Resolution> {
        match self.try_load() {
            Ok(resolutions) => resolutions,
            Err(err) => {
                error!(
                    "event=storage_load module=storage status=error error_code=load_recovered error={}",
                    err
                );
                Vec::new()
            }
        }
    }

    /// Loads every resolution, returning read-side failures.
    ///
    /// Used by `load` and by diagnostics that need to tell "no data" apart
    /// from "unreadable data".
    pub fn try_load(&self) -> StorageResult<Vec<Resolution>> {
        let started_at = Instant::now();
        let Some(text) = self.kv.get(STORAGE_KEY)? else {
            info!("event=storage_load module=storage status=ok found=false");
            return Ok(Vec::new());
        };

        let raw = serde_json::from_str(&text).map_err(StorageError::Parse)?;
        let mut schema = migrate(raw)
            .into_schema()
            .map_err(|(index, source)| StorageError::Decode { index, source })?;
        reassign_duplicate_ids(&mut schema.resolutions);

        info!(
            "event=storage_load module=storage status=ok found=true resolutions={} duration_ms={}",
            schema.resolutions.len(),
            started_at.elapsed().as_millis()
        );
        Ok(schema.resolutions)
    }

    /// Replaces the stored collection with `resolutions`.
    ///
    /// The write is one `set` on the storage key, so atomicity is whatever
    /// the backend gives a single key.
    ///
    /// # Errors
    /// - `DuplicateId` when two resolutions share an id.
    /// - `Serialize` or `Kv` when the collection cannot be written.
    pub fn save(&self, resolutions: &[Resolution]) -> StorageResult<()> {
        let started_at = Instant::now();
        let result = self.write(resolutions);
        match &result {
            Ok(()) => info!(
                "event=storage_save module=storage status=ok resolutions={} duration_ms={}",
                resolutions.len(),
                started_at.elapsed().as_millis()
            ),
            Err(err) => error!(
                "event=storage_save module=storage status=error duration_ms={} error={}",
                started_at.elapsed().as_millis(),
                err
            ),
        }
        result
    }

    fn write(&self, resolutions: &[Resolution]) -> StorageResult<()> {
        if let Some(id) = first_duplicate_id(resolutions) {
            return Err(StorageError::DuplicateId(id.to_string()));
        }

        let payload = serde_json::to_string(&SchemaRef {
            version: CURRENT_SCHEMA_VERSION,
            resolutions,
        })
        .map_err(StorageError::Serialize)?;

        self.kv.set(STORAGE_KEY, &payload)?;
        Ok(())
    }
}

fn first_duplicate_id(resolutions: &[Resolution]) -> Option<&str> {
    let mut seen = HashSet::with_capacity(resolutions.len());
    resolutions
        .iter()
        .map(|resolution| resolution.id.as_str())
        .find(|id| !seen.insert(*id))
}

fn reassign_duplicate_ids(resolutions: &mut [Resolution]) {
    let mut seen = HashSet::with_capacity(resolutions.len());
    for (index, resolution) in resolutions.iter_mut().enumerate() {
        if seen.insert(resolution.id.clone()) {
            continue;
        }
        let fresh = generate_id();
        warn!(
            "event=storage_load module=storage status=warn reason=duplicate_id index={} id={} new_id={}",
            index, resolution.id, fresh
        );
        seen.insert(fresh.clone());
        resolution.id = fresh;
    }
}
