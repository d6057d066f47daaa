//! FFI use-case API for Flutter-facing calls.
//!
//! # Responsibility
//! - Expose resolution use-cases to Dart via FRB.
//! - Translate core errors into simple response envelopes.
//!
//! # Invariants
//! - Exported functions must not panic across the FFI boundary.
//! - Every call opens the store, works on a freshly loaded collection and
//!   closes it again; no collection state lives on this side.

use log::warn;
use resolution_core::{
    core_version as core_version_inner, init_logging as init_logging_inner, open_db, Milestone,
    Resolution, ResolutionDraft, ResolutionService, SaveOutcome, ServiceResult,
    SqliteKeyValueStore,
};
use std::path::PathBuf;
use std::sync::OnceLock;

const STORE_DB_FILE_NAME: &str = "resolution_tracker.sqlite3";
const STORE_DB_PATH_ENV: &str = "RESOLUTION_TRACKER_DB_PATH";
static STORE_DB_PATH: OnceLock<PathBuf> = OnceLock::new();

/// Expose core crate version through FFI.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// Input semantics:
/// - `level`: one of `trace|debug|info|warn|error` (case-insensitive).
/// - `log_dir`: absolute directory path where rolling logs are written.
///
/// # FFI contract
/// - Safe to call repeatedly with the same `level + log_dir`.
/// - Returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err.to_string(),
    }
}

/// Points the store at the app's documents directory.
///
/// Must be called before the first data call; later calls with the same
/// path are accepted, a different path is rejected.
///
/// # FFI contract
/// - Returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn configure_store_path(db_path: String) -> String {
    let trimmed = db_path.trim();
    if trimmed.is_empty() {
        return "db_path cannot be empty".to_string();
    }
    let requested = PathBuf::from(trimmed);
    let active = STORE_DB_PATH.get_or_init(|| requested.clone());
    if *active == requested {
        String::new()
    } else {
        format!(
            "store already configured at `{}`; refusing to switch to `{}`",
            active.display(),
            requested.display()
        )
    }
}

/// One row of the home list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolutionSummary {
    pub id: String,
    pub title: String,
    pub description: String,
    /// `not_started|in_progress|complete`.
    pub status: String,
    pub completed_milestones: u32,
    pub total_milestones: u32,
}

/// One milestone row of the edit form.
///
/// Rows loaded from an existing resolution carry their `id` and completion
/// state back unchanged; rows added in the form leave `id` empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MilestoneInput {
    pub id: String,
    pub title: String,
    pub target_date: Option<String>,
    pub completed: bool,
    pub completed_at: Option<String>,
}

impl MilestoneInput {
    fn into_milestone(self) -> Milestone {
        let mut milestone = Milestone::new(self.title, self.target_date);
        if !self.id.trim().is_empty() {
            milestone.id = self.id;
        }
        milestone.completed = self.completed;
        milestone.completed_at = if self.completed {
            self.completed_at
        } else {
            None
        };
        milestone
    }
}

/// Result envelope for mutating calls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolutionActionResponse {
    /// Whether the change was persisted.
    pub ok: bool,
    pub resolution_id: Option<String>,
    /// True when this call completed the resolution.
    pub became_complete: bool,
    /// Human-readable message for diagnostics/UI.
    pub message: String,
}

impl ResolutionActionResponse {
    fn success(message: impl Into<String>, resolution_id: String, became_complete: bool) -> Self {
        Self {
            ok: true,
            resolution_id: Some(resolution_id),
            became_complete,
            message: message.into(),
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            resolution_id: None,
            became_complete: false,
            message: message.into(),
        }
    }

    fn from_outcome(
        message: &str,
        operation: &str,
        result: Result<SaveOutcome, String>,
    ) -> Self {
        match result {
            Ok(outcome) => {
                Self::success(message, outcome.resolution.id, outcome.became_complete)
            }
            Err(err) => Self::failure(format!("{operation} failed: {err}")),
        }
    }
}

/// Lists resolutions for the home screen.
///
/// # FFI contract
/// - Never panics; an unreadable store yields an empty list.
#[flutter_rust_bridge::frb(sync)]
pub fn resolutions_list() -> Vec<ResolutionSummary> {
    match with_service(|service| Ok(service.list())) {
        Ok(resolutions) => resolutions.iter().map(to_summary).collect(),
        Err(err) => {
            warn!("event=ffi_call module=ffi status=error op=resolutions_list error={err}");
            Vec::new()
        }
    }
}

/// Returns the full resolution record as camelCase JSON, or `None` when
/// it does not exist or the store cannot be opened.
#[flutter_rust_bridge::frb(sync)]
pub fn resolution_get_json(id: String) -> Option<String> {
    let resolution = with_service(|service| Ok(service.get(&id))).ok()??;
    serde_json::to_string(&resolution).ok()
}

/// Creates a resolution from the edit form.
///
/// Blank milestone titles are dropped; a blank title is rejected.
#[flutter_rust_bridge::frb(sync)]
pub fn resolution_create(
    title: String,
    description: String,
    milestone_titles: Vec<String>,
) -> ResolutionActionResponse {
    let draft = milestone_titles.into_iter().fold(
        ResolutionDraft::new(title, description),
        |draft, milestone_title| draft.with_milestone(Milestone::new(milestone_title, None)),
    );
    match with_service(|service| service.create(draft)) {
        Ok(resolution) => ResolutionActionResponse::success("Resolution created.", resolution.id, false),
        Err(err) => ResolutionActionResponse::failure(format!("resolution_create failed: {err}")),
    }
}

/// Saves the edit form over an existing resolution.
///
/// Title, description and milestones are replaced; journal, "what's next"
/// and the completion stamp are kept. Blank milestone titles are dropped.
#[flutter_rust_bridge::frb(sync)]
pub fn resolution_update(
    id: String,
    title: String,
    description: String,
    milestones: Vec<MilestoneInput>,
) -> ResolutionActionResponse {
    let draft = milestones.into_iter().fold(
        ResolutionDraft::new(title, description),
        |draft, row| draft.with_milestone(row.into_milestone()),
    );
    match with_service(|service| service.update(&id, draft)) {
        Ok(resolution) => ResolutionActionResponse::success("Resolution updated.", resolution.id, false),
        Err(err) => ResolutionActionResponse::failure(format!("resolution_update failed: {err}")),
    }
}

/// Toggles one milestone and reports whether the resolution completed.
#[flutter_rust_bridge::frb(sync)]
pub fn resolution_toggle_milestone(id: String, milestone_id: String) -> ResolutionActionResponse {
    ResolutionActionResponse::from_outcome(
        "Milestone updated.",
        "resolution_toggle_milestone",
        with_service(|service| service.toggle_milestone(&id, &milestone_id)),
    )
}

#[flutter_rust_bridge::frb(sync)]
pub fn resolution_set_whats_next(id: String, text: String) -> ResolutionActionResponse {
    ResolutionActionResponse::from_outcome(
        "What's next saved.",
        "resolution_set_whats_next",
        with_service(|service| service.set_whats_next(&id, &text)),
    )
}

#[flutter_rust_bridge::frb(sync)]
pub fn resolution_add_journal_entry(id: String, text: String) -> ResolutionActionResponse {
    ResolutionActionResponse::from_outcome(
        "Journal entry added.",
        "resolution_add_journal_entry",
        with_service(|service| service.add_journal_entry(&id, &text)),
    )
}

#[flutter_rust_bridge::frb(sync)]
pub fn resolution_delete(id: String) -> ResolutionActionResponse {
    match with_service(|service| service.delete(&id)) {
        Ok(()) => ResolutionActionResponse::success("Resolution deleted.", id, false),
        Err(err) => ResolutionActionResponse::failure(format!("resolution_delete failed: {err}")),
    }
}

fn resolve_store_path() -> PathBuf {
    STORE_DB_PATH
        .get_or_init(|| {
            if let Ok(raw) = std::env::var(STORE_DB_PATH_ENV) {
                let trimmed = raw.trim();
                if !trimmed.is_empty() {
                    return PathBuf::from(trimmed);
                }
            }
            std::env::temp_dir().join(STORE_DB_FILE_NAME)
        })
        .clone()
}

fn with_service<T>(
    f: impl FnOnce(&ResolutionService<SqliteKeyValueStore<'_>>) -> ServiceResult<T>,
) -> Result<T, String> {
    let db_path = resolve_store_path();
    let conn = open_db(&db_path).map_err(|err| format!("store open failed: {err}"))?;
    let service = ResolutionService::new(SqliteKeyValueStore::new(&conn));
    f(&service).map_err(|err| err.to_string())
}

fn to_summary(resolution: &Resolution) -> ResolutionSummary {
    let progress = resolution.progress();
    ResolutionSummary {
        id: resolution.id.clone(),
        title: resolution.title.clone(),
        description: resolution.description.clone(),
        status: resolution.completion_status().as_str().to_string(),
        completed_milestones: u32::try_from(progress.completed).unwrap_or(u32::MAX),
        total_milestones: u32::try_from(progress.total).unwrap_or(u32::MAX),
    }
}
