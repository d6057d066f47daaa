//! Resolution, milestone and journal entry records.
//!
//! # Responsibility
//! - Define the canonical records written under the storage key.
//! - Derive completion state from milestone data.
//!
//! # Invariants
//! - A resolution with zero milestones is never complete.
//! - `Resolution::completed_at` is a one-way stamp; nothing here clears it.
//! - `Milestone::completed_at` follows the last toggle of `completed`.
//! - Journal entries are kept most-recent-first and never edited.
//!
//! Timestamps stay as ISO-8601 text so persisted values round-trip
//! unchanged. Typed accessors parse them on demand.

use super::id::{generate_id, now_timestamp};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Free-text reflection attached to a resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JournalEntry {
    pub id: String,
    /// ISO-8601 creation timestamp.
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub text: String,
}

impl JournalEntry {
    /// Creates an entry stamped with the current time.
    ///
    /// `text` is stored verbatim; trimming and emptiness checks belong to
    /// the caller.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            id: generate_id(),
            created_at: now_timestamp(),
            text: text.into(),
        }
    }

    pub fn created_at_utc(&self) -> Option<DateTime<Utc>> {
        parse_timestamp(&self.created_at)
    }
}

/// One checkable step toward a resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Milestone {
    pub id: String,
    #[serde(default)]
    pub title: String,
    /// Calendar date. Older records carry a full ISO timestamp here; only
    /// the date part is meaningful.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_date: Option<String>,
    #[serde(default)]
    pub completed: bool,
    /// Set on the transition to completed, cleared on the way back.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<String>,
}

impl Milestone {
    /// Creates an open milestone with a generated id.
    pub fn new(title: impl Into<String>, target_date: Option<String>) -> Self {
        Self {
            id: generate_id(),
            title: title.into(),
            target_date,
            completed: false,
            completed_at: None,
        }
    }

    /// Flips `completed`, stamping `completed_at` with `now` when the
    /// milestone becomes complete and clearing it otherwise.
    pub fn toggle(&mut self, now: &str) {
        self.completed = !self.completed;
        self.completed_at = if self.completed {
            Some(now.to_string())
        } else {
            None
        };
    }

    /// Returns the target as a calendar date.
    ///
    /// Accepts both `YYYY-MM-DD` and a full ISO timestamp, taking the date
    /// before the `T` separator.
    pub fn target_day(&self) -> Option<NaiveDate> {
        let raw = self.target_date.as_deref()?;
        let day = raw.split('T').next()?;
        NaiveDate::parse_from_str(day.trim(), "%Y-%m-%d").ok()
    }

    pub fn completed_at_utc(&self) -> Option<DateTime<Utc>> {
        self.completed_at.as_deref().and_then(parse_timestamp)
    }
}

/// A personal goal with its milestones and journal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Resolution {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// "Baby step" prompt the user fills in on the detail view.
    #[serde(default)]
    pub whats_next: String,
    #[serde(default)]
    pub milestones: Vec<Milestone>,
    /// Most recent first.
    #[serde(default)]
    pub journal_entries: Vec<JournalEntry>,
    #[serde(default)]
    pub created_at: String,
    /// Stamped once when the resolution first becomes complete.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<String>,
}

/// Three-way classification of milestone progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompletionStatus {
    /// No milestones, or none of them completed.
    NotStarted,
    /// Some but not all milestones completed.
    InProgress,
    /// At least one milestone, and all of them completed.
    Complete,
}

impl CompletionStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::NotStarted => "not_started",
            Self::InProgress => "in_progress",
            Self::Complete => "complete",
        }
    }
}

/// Completed versus total milestone counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MilestoneProgress {
    pub completed: usize,
    pub total: usize,
}

impl Resolution {
    /// Creates a resolution with a generated id and creation stamp.
    ///
    /// # Invariants
    /// - `whats_next` starts empty.
    /// - Milestone and journal lists start empty.
    /// - `completed_at` starts as `None`.
    /// - No validation is performed on `title` or `description`.
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id: generate_id(),
            title: title.into(),
            description: description.into(),
            whats_next: String::new(),
            milestones: Vec::new(),
            journal_entries: Vec::new(),
            created_at: now_timestamp(),
            completed_at: None,
        }
    }

    pub fn is_complete(&self) -> bool {
        is_complete(self)
    }

    pub fn completion_status(&self) -> CompletionStatus {
        completion_status(self)
    }

    pub fn progress(&self) -> MilestoneProgress {
        MilestoneProgress {
            completed: self.milestones.iter().filter(|m| m.completed).count(),
            total: self.milestones.len(),
        }
    }

    pub fn find_milestone(&self, milestone_id: &str) -> Option<&Milestone> {
        self.milestones.iter().find(|m| m.id == milestone_id)
    }

    /// Toggles one milestone by id. Returns `false` when no milestone
    /// matches.
    pub fn toggle_milestone(&mut self, milestone_id: &str, now: &str) -> bool {
        match self.milestones.iter_mut().find(|m| m.id == milestone_id) {
            Some(milestone) => {
                milestone.toggle(now);
                true
            }
            None => false,
        }
    }

    /// Prepends a journal entry, keeping the list most-recent-first.
    pub fn add_journal_entry(&mut self, entry: JournalEntry) {
        self.journal_entries.insert(0, entry);
    }

    /// Stamps the completion time, overwriting any earlier stamp.
    ///
    /// The service calls this on every incomplete-to-complete edge it sees
    /// against freshly loaded state, so completing again after a regression
    /// re-stamps.
    pub fn mark_completed(&mut self, now: &str) {
        self.completed_at = Some(now.to_string());
    }

    pub fn created_at_utc(&self) -> Option<DateTime<Utc>> {
        parse_timestamp(&self.created_at)
    }

    pub fn completed_at_utc(&self) -> Option<DateTime<Utc>> {
        self.completed_at.as_deref().and_then(parse_timestamp)
    }
}

/// Returns whether every milestone is completed.
///
/// A resolution without milestones is never complete, so an empty goal
/// cannot be trivially finished.
pub fn is_complete(resolution: &Resolution) -> bool {
    !resolution.milestones.is_empty() && resolution.milestones.iter().all(|m| m.completed)
}

/// Classifies progress purely from milestone completion counts.
pub fn completion_status(resolution: &Resolution) -> CompletionStatus {
    let MilestoneProgress { completed, total } = resolution.progress();
    if total == 0 || completed == 0 {
        CompletionStatus::NotStarted
    } else if completed == total {
        CompletionStatus::Complete
    } else {
        CompletionStatus::InProgress
    }
}

fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|stamp| stamp.with_timezone(&Utc))
}
