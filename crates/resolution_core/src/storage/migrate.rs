//! Forward migration of persisted documents.
//!
//! `migrate` is the trust boundary for whatever sits under the storage key:
//! documents from older builds, pre-versioning bare arrays, or corrupted
//! values. It is total and never panics. Input is first classified into
//! the closed `StoredValue` union, and each variant maps to exactly one
//! output rule.
//!
//! Only the version stamp is migrated today. Field-level upgrades for a
//! future schema version belong in `upgrade_fields`.

use super::{StorageSchema, CURRENT_SCHEMA_VERSION};
use crate::model::resolution::Resolution;
use log::{info, warn};
use serde::Serialize;
use serde_json::{Map, Value};

const VERSION_FIELD: &str = "version";
const RESOLUTIONS_FIELD: &str = "resolutions";

/// Shape of a raw persisted value, resolved by inspection.
#[derive(Debug, Clone, PartialEq)]
pub enum StoredValue {
    /// JSON `null`.
    Empty,
    /// Legacy pre-versioning format: the whole value is the resolution list.
    LegacyArray(Vec<Value>),
    /// Object already stamped with `CURRENT_SCHEMA_VERSION`.
    CurrentVersioned(Map<String, Value>),
    /// Object with any other version, a non-integer version, or none.
    OtherVersioned(Map<String, Value>),
    /// A bare string, number or boolean.
    Malformed(Value),
}

impl StoredValue {
    pub fn inspect(raw: Value) -> Self {
        match raw {
            Value::Null => Self::Empty,
            Value::Array(items) => Self::LegacyArray(items),
            Value::Object(fields) => {
                let current = fields.get(VERSION_FIELD).and_then(Value::as_u64)
                    == Some(u64::from(CURRENT_SCHEMA_VERSION));
                if current {
                    Self::CurrentVersioned(fields)
                } else {
                    Self::OtherVersioned(fields)
                }
            }
            other => Self::Malformed(other),
        }
    }

    /// Stable label used in diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Empty => "empty",
            Self::LegacyArray(_) => "legacy_array",
            Self::CurrentVersioned(_) => "current_versioned",
            Self::OtherVersioned(_) => "other_versioned",
            Self::Malformed(_) => "malformed",
        }
    }
}

/// Migrated document with resolutions still in raw JSON form.
///
/// Unknown top-level fields survive migration in `extra`. They are not
/// written back by `ResolutionStore::save`, which only persists
/// `version` and `resolutions`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StorageDocument {
    pub version: u32,
    #[serde(default)]
    pub resolutions: Vec<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl StorageDocument {
    pub fn empty() -> Self {
        Self {
            version: CURRENT_SCHEMA_VERSION,
            resolutions: Vec::new(),
            extra: Map::new(),
        }
    }

    /// Decodes every raw resolution into the typed schema.
    ///
    /// # Errors
    /// - Returns the index and decode error of the first resolution that
    ///   does not match the record shape.
    pub fn into_schema(self) -> Result<StorageSchema, (usize, serde_json::Error)> {
        let resolutions = self
            .resolutions
            .into_iter()
            .enumerate()
            .map(|(index, raw)| {
                serde_json::from_value::<Resolution>(raw).map_err(|err| (index, err))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(StorageSchema {
            version: self.version,
            resolutions,
        })
    }
}

/// Brings any parsed JSON value to the current document layout.
///
/// Rules:
/// - `null`, strings, numbers and booleans yield an empty document.
/// - A bare array becomes the resolution list.
/// - A current-version object is kept as is.
/// - Any other object keeps all fields and gets the current version.
///
/// A missing or non-array `resolutions` field becomes an empty list.
/// Applying `migrate` to its own serialized output is a no-op.
pub fn migrate(raw: Value) -> StorageDocument {
    let stored = StoredValue::inspect(raw);
    let kind = stored.kind();

    match stored {
        StoredValue::Empty => StorageDocument::empty(),
        StoredValue::Malformed(_) => {
            warn!("event=storage_migrate module=storage status=reset kind={kind}");
            StorageDocument::empty()
        }
        StoredValue::LegacyArray(items) => {
            info!(
                "event=storage_migrate module=storage status=ok kind={} resolutions={}",
                kind,
                items.len()
            );
            StorageDocument {
                version: CURRENT_SCHEMA_VERSION,
                resolutions: items,
                extra: Map::new(),
            }
        }
        StoredValue::CurrentVersioned(fields) => document_from_fields(fields),
        StoredValue::OtherVersioned(fields) => {
            info!(
                "event=storage_migrate module=storage status=ok kind={} from_version={}",
                kind,
                fields
                    .get(VERSION_FIELD)
                    .map_or_else(|| "none".to_string(), Value::to_string)
            );
            document_from_fields(upgrade_fields(fields))
        }
    }
}

/// Field-by-field upgrades from older versions. Nothing to rewrite yet.
fn upgrade_fields(fields: Map<String, Value>) -> Map<String, Value> {
    fields
}

fn document_from_fields(mut fields: Map<String, Value>) -> StorageDocument {
    fields.remove(VERSION_FIELD);
    let resolutions = match fields.remove(RESOLUTIONS_FIELD) {
        Some(Value::Array(items)) => items,
        Some(_) => {
            warn!("event=storage_migrate module=storage status=reset field=resolutions reason=not_array");
            Vec::new()
        }
        None => Vec::new(),
    };

    StorageDocument {
        version: CURRENT_SCHEMA_VERSION,
        resolutions,
        extra: fields,
    }
}
