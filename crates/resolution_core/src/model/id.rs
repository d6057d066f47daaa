//! Identifier and timestamp generation for model constructors.

use chrono::{SecondsFormat, Utc};
use uuid::Uuid;

/// Generates a new entity identifier.
///
/// Random v4 UUIDs are unique with overwhelming probability within one
/// installation. Identifiers loaded from legacy data keep whatever form
/// they were written in, so callers must treat ids as opaque strings.
pub fn generate_id() -> String {
    Uuid::new_v4().to_string()
}

/// Returns the current UTC time as an ISO-8601 string with millisecond
/// precision and a `Z` suffix (`2026-01-01T09:30:00.000Z`).
pub fn now_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}
